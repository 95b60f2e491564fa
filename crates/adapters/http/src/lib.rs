//! # homesim-adapter-http
//!
//! Bootstrap adapter — reads the initial device population from the
//! backend with `GET <api_url>/api/devices`.
//!
//! A failed attempt (connection error, non-success status, undecodable
//! body) is retried after `2^attempt` seconds plus up to one second of
//! jitter, up to the configured number of attempts.
//!
//! ## Dependency rule
//!
//! Same as other adapters: depends on `homesim-app` and `homesim-domain`.

mod config;
mod error;

pub use config::BootstrapConfig;
pub use error::BootstrapError;

use std::time::Duration;

use serde_json::Value;

use homesim_app::ports::DeviceSource;
use homesim_domain::error::SimError;

const DEVICES_PATH: &str = "/api/devices";

/// Delay before retrying after failed attempt number `attempt` (0-based):
/// `2^attempt + jitter` seconds, with `jitter` in `[0, 1)`.
#[must_use]
pub fn backoff_delay(attempt: u32, jitter: f64) -> Duration {
    let base = 2_u64.saturating_pow(attempt);
    Duration::from_secs(base) + Duration::from_secs_f64(jitter.clamp(0.0, 1.0))
}

/// [`DeviceSource`] backed by the backend's REST API.
pub struct HttpDeviceSource {
    client: reqwest::Client,
    url: String,
    retries: u32,
}

impl HttpDeviceSource {
    /// # Errors
    ///
    /// Returns [`BootstrapError::Client`] when the HTTP client cannot be built.
    pub fn new(config: &BootstrapConfig) -> Result<Self, BootstrapError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("homesim/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(BootstrapError::Client)?;
        Ok(Self {
            client,
            url: format!("{}{DEVICES_PATH}", config.api_url.trim_end_matches('/')),
            retries: config.retries.max(1),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// One attempt, no retry.
    async fn fetch_once(&self) -> Result<Vec<Value>, BootstrapError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(BootstrapError::Request)?;
        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            let body = response.text().await.unwrap_or_default();
            return Err(BootstrapError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response.json().await.map_err(BootstrapError::Decode)
    }

    /// Fetch with retries.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Exhausted`] when every attempt failed.
    #[tracing::instrument(skip(self), fields(url = %self.url))]
    pub async fn fetch(&self) -> Result<Vec<Value>, BootstrapError> {
        let mut attempt = 0;
        loop {
            match self.fetch_once().await {
                Ok(devices) => {
                    tracing::info!(count = devices.len(), "devices fetched");
                    return Ok(devices);
                }
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.retries {
                        return Err(BootstrapError::Exhausted {
                            attempts: attempt,
                            last: Box::new(err),
                        });
                    }
                    let delay = backoff_delay(attempt - 1, rand::random::<f64>());
                    tracing::error!(
                        error = %err,
                        attempt,
                        retries = self.retries,
                        delay_secs = delay.as_secs_f64(),
                        "failed to get devices, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

impl DeviceSource for HttpDeviceSource {
    async fn fetch_devices(&self) -> Result<Vec<Value>, SimError> {
        Ok(self.fetch().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve exactly one canned HTTP response on a random local port.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0_u8; 1024];
            let _ = socket.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn source(api_url: String, retries: u32) -> HttpDeviceSource {
        HttpDeviceSource::new(&BootstrapConfig {
            api_url,
            retries,
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[test]
    fn should_double_delay_per_attempt() {
        assert_eq!(backoff_delay(0, 0.0), Duration::from_secs(1));
        assert_eq!(backoff_delay(1, 0.0), Duration::from_secs(2));
        assert_eq!(backoff_delay(4, 0.5), Duration::from_millis(16_500));
    }

    #[test]
    fn should_build_devices_url_without_double_slash() {
        let source = source("http://backend:5200/".to_string(), 1);
        assert_eq!(source.url(), "http://backend:5200/api/devices");
    }

    #[tokio::test]
    async fn should_fetch_device_list() {
        let url = serve_once(
            "200 OK",
            r#"[{"id":"l1","room":"hall","name":"Lamp","type":"light"}]"#,
        )
        .await;
        let devices = source(url, 1).fetch_devices().await.unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0]["id"], "l1");
    }

    #[tokio::test]
    async fn should_fail_on_server_error() {
        let url = serve_once("500 Internal Server Error", "boom").await;
        let err = source(url, 1).fetch().await.unwrap_err();
        let BootstrapError::Exhausted { attempts, last } = err else {
            panic!("expected exhausted error");
        };
        assert_eq!(attempts, 1);
        assert!(matches!(*last, BootstrapError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn should_fail_when_backend_unreachable() {
        let err = source("http://127.0.0.1:1".to_string(), 1).fetch().await.unwrap_err();
        let BootstrapError::Exhausted { last, .. } = err else {
            panic!("expected exhausted error");
        };
        assert!(matches!(*last, BootstrapError::Request(_)));
    }
}
