//! HTTP adapter for the directions endpoint.

use std::env;
use std::sync::Arc;

use tracing::debug;

use crate::error::TransportError;
use crate::request::Routing;
use crate::traits::Transport;

pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/directions/json";

#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    pub base_url: String,
    /// Language code sent as `language`, e.g. "en".
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            language: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

impl DirectionsConfig {
    /// Defaults overlaid with `DIRECTIONS_*` variables and the process locale.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = env::var("DIRECTIONS_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(timeout) = env::var("DIRECTIONS_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse().ok())
        {
            config.timeout_secs = timeout;
        }

        let language = ["DIRECTIONS_LANGUAGE", "LC_ALL", "LANG"]
            .iter()
            .filter_map(|name| env::var(name).ok())
            .find_map(|value| language_code(&value));
        if let Some(language) = language {
            config.language = language;
        }

        config
    }
}

/// Extracts the language code from a POSIX locale string.
///
/// `"de_DE.UTF-8"` yields `"de"`; `"C"`, `"POSIX"` and empty values yield `None`.
pub fn language_code(locale: &str) -> Option<String> {
    let code = locale
        .split(['_', '-', '.', '@'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if code.is_empty() || code == "c" || code == "posix" {
        None
    } else {
        Some(code)
    }
}

/// [`Transport`] backed by a blocking reqwest client.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout_secs: u64) -> Result<Self, TransportError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn get(&self, url: &str) -> Result<String, TransportError> {
        let response = self.client.get(url).send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::HttpStatus(status.as_u16()));
        }

        Ok(response.text()?)
    }
}

/// Endpoint configuration paired with the transport that reaches it.
#[derive(Clone)]
pub struct DirectionsClient {
    config: DirectionsConfig,
    transport: Arc<dyn Transport>,
}

impl DirectionsClient {
    pub fn new(config: DirectionsConfig) -> Result<Self, TransportError> {
        let transport = HttpTransport::new(config.timeout_secs)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: DirectionsConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &DirectionsConfig {
        &self.config
    }

    pub fn transport(&self) -> Arc<dyn Transport> {
        Arc::clone(&self.transport)
    }

    /// Full request URL for `routing`.
    pub fn url_for(&self, routing: &Routing) -> String {
        let url = routing.url(&self.config);
        debug!(url = %redact_key(&url), "encoded directions request");
        url
    }
}

/// Masks the `key` parameter for logging.
fn redact_key(url: &str) -> String {
    match url.split_once("key=") {
        Some((head, tail)) => {
            let rest = tail.find('&').map(|end| &tail[end..]).unwrap_or_default();
            format!("{}key=<redacted>{}", head, rest)
        }
        None => url.to_string(),
    }
}
