//! Sources for the API base URL and database token.
//!
//! [`Client::from_provider`](crate::Client::from_provider) asks a
//! [`CredentialProvider`] once and never looks at it again, so any secret
//! store can be plugged in without the client depending on it.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

/// Default environment variable holding the API base URL
pub const URL_ENV: &str = "BASEROW_URL";

/// Default environment variable holding the database token
pub const TOKEN_ENV: &str = "BASEROW_TOKEN";

/// API base URL and database token
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub url: String,
    pub token: String,
}

impl Credentials {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Credentials {
            url: url.into(),
            token: token.into(),
        }
    }

    fn validated(self) -> Result<Self> {
        if self.url.is_empty() {
            return Err(Error::Credentials("url is empty".to_string()));
        }
        if self.token.is_empty() {
            return Err(Error::Credentials("token is empty".to_string()));
        }
        Ok(self)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Something that can produce credentials for a client
pub trait CredentialProvider {
    fn credentials(&self) -> Result<Credentials>;
}

impl CredentialProvider for Credentials {
    fn credentials(&self) -> Result<Credentials> {
        self.clone().validated()
    }
}

/// Reads credentials from environment variables
#[derive(Debug, Clone)]
pub struct EnvCredentials {
    url_var: String,
    token_var: String,
}

impl Default for EnvCredentials {
    fn default() -> Self {
        EnvCredentials {
            url_var: URL_ENV.to_string(),
            token_var: TOKEN_ENV.to_string(),
        }
    }
}

impl EnvCredentials {
    /// Read `BASEROW_URL` and `BASEROW_TOKEN`
    pub fn new() -> Self {
        Self::default()
    }

    /// Read custom variable names
    pub fn with_vars(url_var: impl Into<String>, token_var: impl Into<String>) -> Self {
        EnvCredentials {
            url_var: url_var.into(),
            token_var: token_var.into(),
        }
    }
}

fn env_var(name: &str) -> Result<String> {
    env::var(name)
        .map_err(|e| Error::Credentials(format!("environment variable {}: {}", name, e)))
}

impl CredentialProvider for EnvCredentials {
    fn credentials(&self) -> Result<Credentials> {
        Credentials::new(env_var(&self.url_var)?, env_var(&self.token_var)?).validated()
    }
}

/// Reads credentials from a JSON resource file
///
/// The file holds either one `{"url": ..., "token": ...}` object, or an
/// object of such entries keyed by resource id:
///
/// ```json
/// {
///   "prod": {"url": "https://api.baserow.io/api/", "token": "..."},
///   "staging": {"url": "https://baserow.staging.test/api/", "token": "..."}
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ResourceFile {
    path: PathBuf,
    resource: Option<String>,
}

impl ResourceFile {
    /// Use the whole file as a single resource
    pub fn new(path: impl AsRef<Path>) -> Self {
        ResourceFile {
            path: path.as_ref().to_path_buf(),
            resource: None,
        }
    }

    /// Select a named resource inside the file
    pub fn resource(mut self, id: impl Into<String>) -> Self {
        self.resource = Some(id.into());
        self
    }
}

impl CredentialProvider for ResourceFile {
    fn credentials(&self) -> Result<Credentials> {
        let content = fs::read_to_string(&self.path)?;
        let mut root: Value = serde_json::from_str(&content)?;

        let entry = match &self.resource {
            Some(id) => root.get_mut(id).map(Value::take).ok_or_else(|| {
                Error::Credentials(format!(
                    "resource {:?} not found in {}",
                    id,
                    self.path.display()
                ))
            })?,
            None => root,
        };

        let credentials: Credentials = serde_json::from_value(entry).map_err(|e| {
            Error::Credentials(format!("malformed resource in {}: {}", self.path.display(), e))
        })?;
        credentials.validated()
    }
}

/// Provider backed by a closure, see [`from_fn`]
pub struct FnProvider<F>(F);

/// Wrap a closure as a credential provider
///
/// ```
/// use basedrow::credentials::{from_fn, CredentialProvider, Credentials};
///
/// let provider = from_fn(|| Ok(Credentials::new("https://api.baserow.io/api/", "t0k")));
/// assert_eq!(provider.credentials().unwrap().token, "t0k");
/// ```
pub fn from_fn<F>(f: F) -> FnProvider<F>
where
    F: Fn() -> Result<Credentials>,
{
    FnProvider(f)
}

impl<F> CredentialProvider for FnProvider<F>
where
    F: Fn() -> Result<Credentials>,
{
    fn credentials(&self) -> Result<Credentials> {
        (self.0)()?.validated()
    }
}
