//! # basedrow - blocking client for Baserow-style row APIs
//!
//! A small Rust client for the row endpoints of a Baserow-like database
//! REST API. Method calls are turned into HTTP requests, query parameters
//! and JSON bodies are assembled for you, and parsed JSON comes back.
//!
//! ## Features
//!
//! - `get` / `post` / `patch` primitives with token authentication
//! - Row helpers: list, fetch, create (single and batch), batch update
//! - Field-level `filter__*` parameters with omit-if-unset semantics
//! - Iteration over every page of a list query
//! - Pluggable credential providers (static, environment, JSON resource file)
//!
//! ## Basic Usage
//!
//! ```no_run
//! use basedrow::{Client, ListRowsParams};
//! use serde_json::json;
//!
//! fn main() -> basedrow::Result<()> {
//!     let client = Client::new("https://api.baserow.io/api/", "database-token")?;
//!
//!     let params = ListRowsParams::new()
//!         .size(20)
//!         .order_by("-Name")
//!         .filter("filter__Status__single_select_equal", "3")?;
//!     let page = client.list_rows(1234, &params)?;
//!     println!("{}", page["count"]);
//!
//!     let table = client.table(1234);
//!     table.create_rows(&[json!({"Name": "a"}), json!({"Name": "b"})], None)?;
//!     table.update_rows(&[json!({"id": 1, "Name": "renamed"})])?;
//!     Ok(())
//! }
//! ```
//!
//! ## Credentials
//!
//! ```no_run
//! use basedrow::{Client, EnvCredentials, ResourceFile};
//!
//! // BASEROW_URL / BASEROW_TOKEN
//! let client = Client::from_provider(&EnvCredentials::new())?;
//!
//! // {"prod": {"url": "...", "token": "..."}}
//! let client = Client::from_provider(&ResourceFile::new("resources.json").resource("prod"))?;
//! # Ok::<(), basedrow::Error>(())
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod rest;
pub mod rows;
pub mod table;

// Re-export main types for convenience
pub use client::Config;
pub use credentials::{CredentialProvider, Credentials, EnvCredentials, ResourceFile};
pub use error::{Error, Result};
pub use rest::{normalize_endpoint, Client, NO_PARAMS};
pub use rows::{ListRowsParams, Row, RowPage, RowPages};
pub use table::Table;

// Re-export serde_json for convenience
pub use serde_json::json;
