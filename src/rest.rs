use crate::client::{create_http_client, Config};
use crate::credentials::CredentialProvider;
use crate::error::{Error, Result};
use indexmap::IndexMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use url::Url;

/// Empty query parameter list for calls that only need the defaults
pub const NO_PARAMS: &[(&str, &str)] = &[];

/// Check whether an endpoint is already an absolute URL
pub fn is_absolute(endpoint: &str) -> bool {
    endpoint.starts_with("http://") || endpoint.starts_with("https://")
}

/// Normalize an endpoint before it is joined to the base URL
///
/// Absolute URLs (such as the `next` link of a list page) are returned
/// untouched. Anything else loses its leading slashes so that it resolves
/// below the base URL path. Applying this twice gives the same result.
pub fn normalize_endpoint(endpoint: &str) -> &str {
    if is_absolute(endpoint) {
        endpoint
    } else {
        endpoint.trim_start_matches('/')
    }
}

/// Merge query parameters by key
///
/// Pairs already present on `url` come first, then `defaults`, then
/// `params`. A later value for a key replaces the earlier one and keeps
/// the earlier position, so no key is sent twice.
pub fn merge_query<K, V>(
    url: &Url,
    defaults: &[(String, String)],
    params: &[(K, V)],
) -> Vec<(String, String)>
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    let mut query: IndexMap<String, String> = url.query_pairs().into_owned().collect();
    query.extend(defaults.iter().cloned());
    query.extend(
        params
            .iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string())),
    );
    query.into_iter().collect()
}

/// Client for a Baserow-style row API
///
/// Holds the immutable configuration and a pooled HTTP client. Cloning is
/// cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::blocking::Client,
    config: Config,
}

impl Client {
    /// Create a client for the given API base URL and database token
    pub fn new(base_url: &str, token: impl Into<String>) -> Result<Self> {
        Self::with_config(Config::new(base_url, token)?)
    }

    /// Create a client with custom configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Client {
            http: create_http_client(&config)?,
            config,
        })
    }

    /// Resolve credentials once through a provider and create a client
    pub fn from_provider<P>(provider: &P) -> Result<Self>
    where
        P: CredentialProvider + ?Sized,
    {
        let credentials = provider.credentials()?;
        Self::new(&credentials.url, credentials.token)
    }

    /// Get the client configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Build the full URL for an endpoint
    pub fn url(&self, endpoint: &str) -> Result<Url> {
        let endpoint = normalize_endpoint(endpoint);
        if is_absolute(endpoint) {
            Ok(Url::parse(endpoint)?)
        } else {
            Ok(self.config.base_url.join(endpoint)?)
        }
    }

    /// Send a GET request and return the parsed JSON body
    pub fn get<K, V>(&self, endpoint: &str, params: &[(K, V)]) -> Result<Value>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.do_request(Method::GET, endpoint, params, None::<&Value>)
    }

    /// Send a POST request with a JSON body
    pub fn post<B, K, V>(&self, endpoint: &str, body: &B, params: &[(K, V)]) -> Result<Value>
    where
        B: Serialize + ?Sized,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.do_request(Method::POST, endpoint, params, Some(body))
    }

    /// Send a PATCH request with a JSON body
    pub fn patch<B>(&self, endpoint: &str, body: &B) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.do_request(Method::PATCH, endpoint, NO_PARAMS, Some(body))
    }

    /// Make a request and unmarshal the response body into the target type
    ///
    /// # Arguments
    /// * `method` - HTTP method
    /// * `endpoint` - path below the base URL, or an absolute URL
    /// * `params` - query parameters, replacing defaults with the same key
    /// * `body` - optional JSON body
    pub fn apply<T, K, V, B>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(K, V)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
        V: AsRef<str>,
        B: Serialize + ?Sized,
    {
        let value = self.do_request(method, endpoint, params, body)?;
        Ok(serde_json::from_value(value)?)
    }

    /// Execute a request and return the raw JSON body
    ///
    /// A 2xx response with an empty body yields `Value::Null`. Any other
    /// status becomes [`Error::Http`] carrying the status and body text.
    pub fn do_request<K, V, B>(
        &self,
        method: Method,
        endpoint: &str,
        params: &[(K, V)],
        body: Option<&B>,
    ) -> Result<Value>
    where
        K: AsRef<str>,
        V: AsRef<str>,
        B: Serialize + ?Sized,
    {
        let mut url = self.url(endpoint)?;
        let query = merge_query(&url, &self.config.default_params(), params);
        url.set_query(None);

        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .query(&query);

        if let Some(body) = body {
            request = request.json(body);
        }

        let start = Instant::now();
        let http_response = request.send()?;
        let status = http_response.status();
        let bytes = http_response.bytes()?;

        tracing::debug!(
            method = %method,
            path = url.path(),
            status = status.as_u16(),
            elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
            "row API request"
        );

        if !status.is_success() {
            let body = String::from_utf8_lossy(&bytes).into_owned();
            tracing::warn!(
                method = %method,
                path = url.path(),
                status = status.as_u16(),
                "row API request failed"
            );
            return Err(Error::http(status.as_u16(), body));
        }

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_slice(&bytes)?)
    }
}
