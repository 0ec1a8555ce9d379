// src/dialer/http.rs
use super::Dialer;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum DialError {
    #[error("invalid endpoint address: {0}")]
    InvalidAddress(#[from] url::ParseError),

    #[error("probe request failed: {0}")]
    Probe(#[from] reqwest::Error),

    #[error("probe returned HTTP {0}")]
    ProbeStatus(reqwest::StatusCode),
}

/// Dials HTTP(S) upstreams.
///
/// Parses the address, builds a timeout-bound client, and optionally sends
/// one GET to a probe path. A non-success probe status fails the dial, so
/// endpoints that answer TCP but serve errors start out dead.
#[derive(Debug, Clone)]
pub struct HttpDialer {
    timeout: Duration,
    probe_path: Option<String>,
}

/// Connection handle for an HTTP upstream: the parsed base URL plus a
/// reusable client. Cloning is cheap; clones share the underlying
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpConnection {
    base: Url,
    client: Client,
}

impl HttpConnection {
    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

impl HttpDialer {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            probe_path: None,
        }
    }

    /// Probe this path with a GET on every dial.
    pub fn with_probe_path(mut self, path: impl Into<String>) -> Self {
        self.probe_path = Some(path.into());
        self
    }

    async fn probe(&self, client: &Client, base: &Url, path: &str) -> Result<(), DialError> {
        let url = base.join(path)?;
        let response = client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DialError::ProbeStatus(status));
        }
        Ok(())
    }
}

#[async_trait]
impl Dialer for HttpDialer {
    type Conn = HttpConnection;

    async fn dial(&self, address: &str) -> anyhow::Result<HttpConnection> {
        let base = Url::parse(address).map_err(DialError::InvalidAddress)?;
        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(DialError::Probe)?;

        if let Some(path) = &self.probe_path {
            self.probe(&client, &base, path).await?;
            debug!("probe succeeded for {}", base);
        }

        Ok(HttpConnection { base, client })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn dial_without_probe_does_not_touch_the_network() {
        let dialer = HttpDialer::new(Duration::from_secs(1));
        let conn = dialer.dial("http://127.0.0.1:1/").await.unwrap();
        assert_eq!(conn.base().as_str(), "http://127.0.0.1:1/");
    }

    #[tokio::test]
    async fn dial_probes_configured_path() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/health")
            .with_status(200)
            .create_async()
            .await;

        let dialer = HttpDialer::new(Duration::from_secs(1)).with_probe_path("/health");
        dialer.dial(&server.url()).await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn dial_fails_when_probe_returns_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/health")
            .with_status(503)
            .create_async()
            .await;

        let dialer = HttpDialer::new(Duration::from_secs(1)).with_probe_path("/health");
        assert!(dialer.dial(&server.url()).await.is_err());
    }

    #[tokio::test]
    async fn dial_rejects_unparseable_address() {
        let dialer = HttpDialer::new(Duration::from_secs(1));
        assert!(dialer.dial("not a url").await.is_err());
    }
}
