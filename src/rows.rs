//! Row endpoints of the database API.
//!
//! Everything here is a thin layer over [`Client::get`], [`Client::post`]
//! and [`Client::patch`]: it formats the endpoint path, assembles the query
//! parameters and wraps batch payloads as `{"items": [...]}`.

use crate::error::{Error, Result};
use crate::rest::{Client, NO_PARAMS};
use indexmap::IndexMap;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use std::mem;

/// A single row: field name (or `field_<id>`) to value
pub type Row = Map<String, Value>;

/// Prefix every field-level filter parameter must start with
pub const FILTER_PREFIX: &str = "filter__";

/// Default page number for list requests
pub const DEFAULT_PAGE: u32 = 1;

/// Default page size for list requests
pub const DEFAULT_PAGE_SIZE: u32 = 100;

fn rows_endpoint(table_id: impl Display) -> String {
    format!("/database/rows/table/{}/", table_id)
}

fn row_endpoint(table_id: impl Display, row_id: impl Display) -> String {
    format!("/database/rows/table/{}/{}/", table_id, row_id)
}

fn batch_endpoint(table_id: impl Display) -> String {
    format!("/database/rows/table/{}/batch/", table_id)
}

fn before_param(before: Option<u64>) -> Vec<(&'static str, String)> {
    before
        .map(|id| vec![("before", id.to_string())])
        .unwrap_or_default()
}

/// Batch request body
#[derive(Serialize)]
struct Items<'a, R> {
    items: &'a [R],
}

/// Query parameters for listing rows
///
/// `page` and `size` are always sent. Every other option is omitted from
/// the query string unless it is `Some`; `Some(String::new())` is sent as
/// an empty value, which the server does not treat like an absent one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRowsParams {
    pub page: u32,
    pub size: u32,
    pub search: Option<String>,
    pub order_by: Option<String>,
    /// JSON encoded filter tree
    pub filters: Option<String>,
    /// `AND` or `OR`, combining the `filter__*` parameters
    pub filter_type: Option<String>,
    pub include: Option<String>,
    pub exclude: Option<String>,
    pub view_id: Option<u64>,
    /// `filter__<field>__<operator>` parameters, in insertion order
    pub extra_filters: IndexMap<String, String>,
}

impl Default for ListRowsParams {
    fn default() -> Self {
        ListRowsParams {
            page: DEFAULT_PAGE,
            size: DEFAULT_PAGE_SIZE,
            search: None,
            order_by: None,
            filters: None,
            filter_type: None,
            include: None,
            exclude: None,
            view_id: None,
            extra_filters: IndexMap::new(),
        }
    }
}

impl ListRowsParams {
    /// Parameters for the first page with the default size
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the 1-based page number
    pub fn page(mut self, page: u32) -> Self {
        self.page = page;
        self
    }

    /// Set the number of rows per page
    pub fn size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    /// Only return rows matching a full-text search
    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    /// Comma separated field names, `-` prefix for descending order
    pub fn order_by(mut self, order_by: impl Into<String>) -> Self {
        self.order_by = Some(order_by.into());
        self
    }

    /// Set the JSON encoded filter tree
    pub fn filters(mut self, filters: impl Into<String>) -> Self {
        self.filters = Some(filters.into());
        self
    }

    /// Combine the `filter__*` parameters with `AND` or `OR`
    pub fn filter_type(mut self, filter_type: impl Into<String>) -> Self {
        self.filter_type = Some(filter_type.into());
        self
    }

    /// Comma separated field names to return
    pub fn include(mut self, include: impl Into<String>) -> Self {
        self.include = Some(include.into());
        self
    }

    /// Comma separated field names to leave out
    pub fn exclude(mut self, exclude: impl Into<String>) -> Self {
        self.exclude = Some(exclude.into());
        self
    }

    /// Apply the filters and sorts of a view
    pub fn view_id(mut self, view_id: u64) -> Self {
        self.view_id = Some(view_id);
        self
    }

    /// Add a field-level filter such as `filter__field_12__contains`
    ///
    /// Keys that do not start with `filter__` are rejected. Adding the same
    /// key twice keeps the position of the first and the value of the last.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if !key.starts_with(FILTER_PREFIX) {
            return Err(Error::InvalidParam(format!(
                "filter key {:?} must start with {:?}",
                key, FILTER_PREFIX
            )));
        }
        self.extra_filters.insert(key, value.into());
        Ok(self)
    }

    /// Build the query string pairs, leaving out every unset option
    pub fn to_query(&self) -> Vec<(String, String)> {
        let optional = [
            ("search", self.search.clone()),
            ("order_by", self.order_by.clone()),
            ("filter_type", self.filter_type.clone()),
            ("include", self.include.clone()),
            ("exclude", self.exclude.clone()),
            ("view_id", self.view_id.map(|id| id.to_string())),
            ("filters", self.filters.clone()),
        ];

        let mut query = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.size.to_string()),
        ];
        query.extend(
            optional
                .into_iter()
                .filter_map(|(key, value)| value.map(|v| (key.to_string(), v))),
        );
        query.extend(
            self.extra_filters
                .iter()
                .map(|(k, v)| (k.clone(), v.clone())),
        );
        query
    }
}

/// One page of a list response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowPage {
    /// Total number of rows matching the query
    #[serde(default)]
    pub count: u64,
    /// Absolute URL of the next page
    #[serde(default)]
    pub next: Option<String>,
    /// Absolute URL of the previous page
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub results: Vec<Row>,
}

impl Client {
    /// List one page of rows of a table
    pub fn list_rows(&self, table_id: impl Display, params: &ListRowsParams) -> Result<Value> {
        self.get(&rows_endpoint(table_id), &params.to_query())
    }

    /// List one page of rows and decode it into a [`RowPage`]
    pub fn list_rows_page(
        &self,
        table_id: impl Display,
        params: &ListRowsParams,
    ) -> Result<RowPage> {
        self.apply(
            Method::GET,
            &rows_endpoint(table_id),
            &params.to_query(),
            None::<&Value>,
        )
    }

    /// Iterate over every row matching `params`, starting at `params.page`
    /// and following the `next` link of each page
    pub fn iter_rows(&self, table_id: impl Display, params: ListRowsParams) -> RowPages<'_> {
        RowPages {
            client: self,
            cursor: Cursor::First {
                endpoint: rows_endpoint(table_id),
                query: params.to_query(),
            },
            buffer: Vec::new().into_iter(),
        }
    }

    /// Fetch a single row
    pub fn get_row(&self, table_id: impl Display, row_id: impl Display) -> Result<Value> {
        self.get(&row_endpoint(table_id, row_id), NO_PARAMS)
    }

    /// Create several rows in one request, optionally before row `before`
    pub fn create_rows<R>(
        &self,
        table_id: impl Display,
        rows: &[R],
        before: Option<u64>,
    ) -> Result<Value>
    where
        R: Serialize,
    {
        self.post(
            &batch_endpoint(table_id),
            &Items { items: rows },
            &before_param(before),
        )
    }

    /// Create a single row, optionally before row `before`
    pub fn create_row<R>(&self, table_id: impl Display, row: &R, before: Option<u64>) -> Result<Value>
    where
        R: Serialize + ?Sized,
    {
        self.post(&rows_endpoint(table_id), row, &before_param(before))
    }

    /// Update several rows in one request; each row must carry its `id`
    pub fn update_rows<R>(&self, table_id: impl Display, rows: &[R]) -> Result<Value>
    where
        R: Serialize,
    {
        self.patch(&batch_endpoint(table_id), &Items { items: rows })
    }
}

enum Cursor {
    First {
        endpoint: String,
        query: Vec<(String, String)>,
    },
    Next(String),
    Done,
}

/// Iterator over the rows of every page of a list query
///
/// Each page costs one request. After an error the iterator yields that
/// error once and then ends.
pub struct RowPages<'a> {
    client: &'a Client,
    cursor: Cursor,
    buffer: std::vec::IntoIter<Row>,
}

impl RowPages<'_> {
    fn fetch(&self, cursor: Cursor) -> Option<Result<RowPage>> {
        match cursor {
            Cursor::First { endpoint, query } => Some(self.client.apply(
                Method::GET,
                &endpoint,
                &query,
                None::<&Value>,
            )),
            Cursor::Next(url) => {
                tracing::debug!(next = %url, "following next page");
                Some(
                    self.client
                        .apply(Method::GET, &url, NO_PARAMS, None::<&Value>),
                )
            }
            Cursor::Done => None,
        }
    }
}

impl Iterator for RowPages<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(row) = self.buffer.next() {
                return Some(Ok(row));
            }

            let cursor = mem::replace(&mut self.cursor, Cursor::Done);
            match self.fetch(cursor)? {
                Ok(page) => {
                    self.cursor = page.next.map(Cursor::Next).unwrap_or(Cursor::Done);
                    self.buffer = page.results.into_iter();
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(query: &[(String, String)]) -> Vec<(&str, &str)> {
        query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn test_default_query_only_has_paging() {
        let query = ListRowsParams::new().to_query();
        assert_eq!(pairs(&query), vec![("page", "1"), ("size", "100")]);
    }

    #[test]
    fn test_query_includes_supplied_options() {
        let params = ListRowsParams::new()
            .page(3)
            .size(25)
            .search("acme")
            .order_by("-Name")
            .filter_type("OR")
            .include("Name,Notes")
            .view_id(42);
        let query = params.to_query();
        assert_eq!(
            pairs(&query),
            vec![
                ("page", "3"),
                ("size", "25"),
                ("search", "acme"),
                ("order_by", "-Name"),
                ("filter_type", "OR"),
                ("include", "Name,Notes"),
                ("view_id", "42"),
            ]
        );
    }

    #[test]
    fn test_empty_string_is_sent() {
        let query = ListRowsParams::new().search("").to_query();
        assert!(pairs(&query).contains(&("search", "")));
        assert!(!query.iter().any(|(k, _)| k == "order_by"));
    }

    #[test]
    fn test_filters_come_last_in_insertion_order() {
        let params = ListRowsParams::new()
            .filters(r#"{"filter_type":"AND","filters":[]}"#)
            .filter("filter__Name__contains", "ac")
            .unwrap()
            .filter("filter__field_12__equal", "1")
            .unwrap();
        let query = params.to_query();
        let tail: Vec<_> = pairs(&query).into_iter().skip(2).collect();
        assert_eq!(
            tail,
            vec![
                ("filters", r#"{"filter_type":"AND","filters":[]}"#),
                ("filter__Name__contains", "ac"),
                ("filter__field_12__equal", "1"),
            ]
        );
    }

    #[test]
    fn test_filter_requires_prefix() {
        let err = ListRowsParams::new().filter("Name__contains", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidParam(_)));

        let err = ListRowsParams::new().filter("filter_Name", "x").unwrap_err();
        assert!(matches!(err, Error::InvalidParam(_)));
    }

    #[test]
    fn test_endpoints() {
        assert_eq!(rows_endpoint(7), "/database/rows/table/7/");
        assert_eq!(row_endpoint(7, 3), "/database/rows/table/7/3/");
        assert_eq!(batch_endpoint("7"), "/database/rows/table/7/batch/");
    }

    #[test]
    fn test_before_param() {
        assert!(before_param(None).is_empty());
        assert_eq!(before_param(Some(5)), vec![("before", "5".to_string())]);
    }

    #[test]
    fn test_items_body() {
        let rows = vec![serde_json::json!({"Name": "a"}), serde_json::json!({"Name": "b"})];
        let body = serde_json::to_value(Items { items: &rows }).unwrap();
        assert_eq!(body, serde_json::json!({"items": [{"Name": "a"}, {"Name": "b"}]}));
    }

    #[test]
    fn test_row_page_deserialization() {
        let json = r#"{
            "count": 2,
            "next": null,
            "previous": null,
            "results": [{"id": 1, "Name": "a"}, {"id": 2, "Name": "b"}]
        }"#;
        let page: RowPage = serde_json::from_str(json).unwrap();
        assert_eq!(page.count, 2);
        assert!(page.next.is_none());
        assert_eq!(page.results[1]["Name"], "b");
    }
}
