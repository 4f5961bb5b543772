use crate::error::Result;
use crate::rest::Client;
use crate::rows::{ListRowsParams, RowPage, RowPages};
use serde::Serialize;
use serde_json::Value;
use std::fmt::{self, Display};

/// A table bound to a client
///
/// Every method forwards to the [`Client`] method of the same name with the
/// table id filled in.
#[derive(Clone)]
pub struct Table<'a> {
    id: String,
    client: &'a Client,
}

impl<'a> Table<'a> {
    /// Bind a table id to a client
    pub fn new(id: impl Display, client: &'a Client) -> Self {
        Table {
            id: id.to_string(),
            client,
        }
    }

    /// Get the bound table id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the client this table forwards to
    pub fn client(&self) -> &'a Client {
        self.client
    }

    /// List one page of rows
    pub fn list_rows(&self, params: &ListRowsParams) -> Result<Value> {
        self.client.list_rows(&self.id, params)
    }

    /// List one page of rows as a [`RowPage`]
    pub fn list_rows_page(&self, params: &ListRowsParams) -> Result<RowPage> {
        self.client.list_rows_page(&self.id, params)
    }

    /// Iterate over the rows of every page
    pub fn iter_rows(&self, params: ListRowsParams) -> RowPages<'a> {
        self.client.iter_rows(&self.id, params)
    }

    /// Fetch a single row
    pub fn get_row(&self, row_id: impl Display) -> Result<Value> {
        self.client.get_row(&self.id, row_id)
    }

    /// Create several rows, optionally before row `before`
    pub fn create_rows<R: Serialize>(&self, rows: &[R], before: Option<u64>) -> Result<Value> {
        self.client.create_rows(&self.id, rows, before)
    }

    /// Create a single row, optionally before row `before`
    pub fn create_row<R>(&self, row: &R, before: Option<u64>) -> Result<Value>
    where
        R: Serialize + ?Sized,
    {
        self.client.create_row(&self.id, row, before)
    }

    /// Update several rows; each row must carry its `id`
    pub fn update_rows<R: Serialize>(&self, rows: &[R]) -> Result<Value> {
        self.client.update_rows(&self.id, rows)
    }
}

impl fmt::Debug for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table").field("id", &self.id).finish()
    }
}

impl Client {
    /// Bind a table id to this client
    pub fn table(&self, id: impl Display) -> Table<'_> {
        Table::new(id, self)
    }
}
