//! `reqwest`-backed transport.

use std::time::Duration;

use apimeta_cache::ResponseHeaders;
use reqwest::blocking::{Client, RequestBuilder};
use url::Url;

use crate::error::{ConfigError, TransportError};
use crate::transport::{Response, Transport};

/// HTTP client with connection pooling and appropriate timeouts.
///
/// - Connect timeout: 10 seconds
/// - Request timeout: 30 seconds
/// - Pool idle timeout: 30 seconds (description fetches are infrequent)
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, ConfigError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(30))
            .pool_idle_timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}@{}",
                option_env!("CARGO_BIN_NAME").unwrap_or("apimeta"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;
        Ok(Self { client })
    }

    /// Use a preconfigured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn send(request: RequestBuilder, headers: &[(&str, &str)]) -> Result<Response, TransportError> {
        let request = headers
            .iter()
            .fold(request, |request, (name, value)| request.header(*name, *value));
        let response = request.send()?;

        let status = response.status().as_u16();
        let headers: ResponseHeaders = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v.to_string())))
            .collect();
        let body = response.bytes()?.to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn head(&self, url: &Url, headers: &[(&str, &str)]) -> Result<Response, TransportError> {
        Self::send(self.client.head(url.as_str()), headers)
    }

    fn get(&self, url: &Url, headers: &[(&str, &str)]) -> Result<Response, TransportError> {
        Self::send(self.client.get(url.as_str()), headers)
    }
}
