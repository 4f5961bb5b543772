use crate::error::{Error, Result};
use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create the HTTP client used for row API requests, with the
/// `Authorization: Token <token>` header installed on every request
pub fn create_http_client(config: &Config) -> Result<Client> {
    let mut headers = HeaderMap::new();
    let mut auth = HeaderValue::from_str(&format!("Token {}", config.token))
        .map_err(|_| Error::Config("token is not a valid header value".to_string()))?;
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);

    ClientBuilder::new()
        .default_headers(headers)
        .user_agent(config.user_agent.clone())
        .pool_max_idle_per_host(50)
        .timeout(config.timeout)
        .connect_timeout(config.connect_timeout)
        .build()
        .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))
}

/// Configuration for the row API client
#[derive(Clone)]
pub struct Config {
    /// API base URL, always ending with `/`
    pub base_url: Url,
    /// Database token sent as `Authorization: Token <token>`
    pub token: String,
    /// Ask the server for field names instead of `field_<id>` keys
    pub user_field_names: bool,
    /// Per-request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// User-Agent header
    pub user_agent: String,
}

impl Config {
    /// Create a new configuration for the given API base URL and token
    ///
    /// The base URL is normalized to end with `/` so that endpoints are
    /// joined below its path rather than replacing the last segment.
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        let mut base_url = Url::parse(base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Config {
            base_url,
            token: token.into(),
            user_field_names: true,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: format!("basedrow/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Set whether responses use field names
    pub fn with_user_field_names(mut self, enabled: bool) -> Self {
        self.user_field_names = enabled;
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set a custom user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Query parameters sent with every request
    pub fn default_params(&self) -> Vec<(String, String)> {
        vec![(
            "user_field_names".to_string(),
            self.user_field_names.to_string(),
        )]
    }
}

// Keep the token out of logs and panic messages
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("base_url", &self.base_url.as_str())
            .field("token", &"<redacted>")
            .field("user_field_names", &self.user_field_names)
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}
