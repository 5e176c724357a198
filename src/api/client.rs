//! HTTP client for the backup service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

use super::DashboardApi;
use super::models::{
    BackupExport, BackupListing, BackupStatus, HealthReport, Schedule, Server, ServerSnapshot,
    SystemInfo, Volume, VolumeSnapshot,
};
use super::requests::{CommandRequest, Envelope};

/// Longest slice of a non-JSON error body carried into an error message.
const MAX_ERROR_BODY: usize = 200;

/// Error returned by API client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Server URL cannot carry a path
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
    /// Connection, timeout or body transfer failure
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Non-success status on a read endpoint
    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
    /// Body was not the expected JSON
    #[error("failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),
    /// The request group was cancelled before the response arrived
    #[error("request cancelled")]
    Cancelled,
}

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: String,
    /// Per-request timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

/// `reqwest`-backed implementation of [`DashboardApi`].
#[derive(Clone)]
pub struct ApiClient {
    http: Client,
    base: Url,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let base = Url::parse(config.server_url.trim())
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", config.server_url, e)))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.server_url.clone()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self { http, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url<S: AsRef<str>>(&self, segments: &[S]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| ClientError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty();
            path.extend(segments);
        }
        Ok(url)
    }

    async fn fetch(
        &self,
        method: Method,
        segments: &[&str],
    ) -> Result<(StatusCode, Body), ClientError> {
        let url = self.url(segments)?;
        let response = self.http.request(method.clone(), url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(
            %method,
            path = %format!("/{}", segments.join("/")),
            status = status.as_u16(),
            "Response received"
        );
        Ok((status, Body(body.to_vec())))
    }

    /// GET a read endpoint and decode it; any non-2xx status is an error.
    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let (status, body) = self.fetch(Method::GET, segments).await?;
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: body.error_text(),
            });
        }
        serde_json::from_slice(&body.0).map_err(ClientError::Decode)
    }
}

/// Raw response body with helpers for error reporting.
struct Body(Vec<u8>);

impl Body {
    /// Best description of a failed response: the envelope's `error`, else the
    /// start of the body text.
    fn error_text(&self) -> String {
        let envelope_error = serde_json::from_slice::<Envelope>(&self.0)
            .ok()
            .and_then(|envelope| envelope.error)
            .filter(|error| !error.trim().is_empty());
        if let Some(error) = envelope_error {
            return error;
        }

        let text = String::from_utf8_lossy(&self.0);
        let text = text.trim();
        if text.is_empty() {
            return "empty response".to_string();
        }
        text.chars().take(MAX_ERROR_BODY).collect()
    }
}

#[async_trait]
impl DashboardApi for ApiClient {
    async fn health(&self) -> Result<HealthReport, ClientError> {
        // The backend reports unhealthy with a 500 and a normal body.
        let (status, body) = self.fetch(Method::GET, &["api", "health"]).await?;
        match serde_json::from_slice::<HealthReport>(&body.0) {
            Ok(report) => Ok(report),
            Err(_) if !status.is_success() => Err(ClientError::Status {
                status: status.as_u16(),
                message: body.error_text(),
            }),
            Err(e) => Err(ClientError::Decode(e)),
        }
    }

    async fn system_info(&self) -> Result<SystemInfo, ClientError> {
        self.get_json(&["api", "info"]).await
    }

    async fn volumes(&self) -> Result<Vec<Volume>, ClientError> {
        self.get_json(&["api", "volumes"]).await
    }

    async fn backups(&self) -> Result<BackupListing, ClientError> {
        self.get_json(&["api", "backups"]).await
    }

    async fn schedules(&self) -> Result<Vec<Schedule>, ClientError> {
        self.get_json(&["api", "schedules"]).await
    }

    async fn server_snapshots(&self) -> Result<Vec<ServerSnapshot>, ClientError> {
        self.get_json(&["api", "server-snapshots"]).await
    }

    async fn volume_snapshots(&self) -> Result<Vec<VolumeSnapshot>, ClientError> {
        self.get_json(&["api", "volume-snapshots"]).await
    }

    async fn servers(&self) -> Result<Vec<Server>, ClientError> {
        self.get_json(&["api", "servers"]).await
    }

    async fn backup_status(&self, backup_id: &str) -> Result<BackupStatus, ClientError> {
        self.get_json(&["api", "backup", backup_id, "status"]).await
    }

    async fn export_backup(&self, backup_id: &str) -> Result<BackupExport, ClientError> {
        self.get_json(&["api", "backup", backup_id, "export"]).await
    }

    async fn execute(&self, request: &CommandRequest) -> Result<Envelope, ClientError> {
        let url = self.url(&request.segments)?;
        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = Body(response.bytes().await?.to_vec());
        debug!(
            method = %request.method,
            path = %request.path(),
            status = status.as_u16(),
            "Command response received"
        );

        // Envelopes arrive with error statuses too; only a non-JSON body is a
        // transport-level failure.
        match serde_json::from_slice::<Envelope>(&body.0) {
            Ok(envelope) => Ok(envelope),
            Err(e) => {
                warn!(
                    path = %request.path(),
                    status = status.as_u16(),
                    error = %e,
                    "Command response was not an envelope"
                );
                if status.is_success() {
                    Err(ClientError::Decode(e))
                } else {
                    Err(ClientError::Status {
                        status: status.as_u16(),
                        message: body.error_text(),
                    })
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(url: &str) -> ApiClient {
        ApiClient::new(&ClientConfig {
            server_url: url.to_string(),
            timeout: None,
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_unparseable_url() {
        let result = ApiClient::new(&ClientConfig {
            server_url: "not a url".into(),
            timeout: None,
        });
        assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_joins_segments() {
        let c = client("http://127.0.0.1:5000");
        let url = c.url(&["api", "volumes"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/volumes");
    }

    #[test]
    fn test_url_keeps_base_prefix() {
        let c = client("http://backup.internal/console/");
        let url = c.url(&["api", "health"]).unwrap();
        assert_eq!(url.as_str(), "http://backup.internal/console/api/health");
    }

    #[test]
    fn test_url_encodes_ids() {
        let c = client("http://127.0.0.1:5000");
        let url = c.url(&["api", "backup", "a/b c"]).unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:5000/api/backup/a%2Fb%20c");
    }

    #[test]
    fn test_error_text_prefers_envelope() {
        let body = Body(br#"{"error":"quota exceeded"}"#.to_vec());
        assert_eq!(body.error_text(), "quota exceeded");

        let body = Body(b"<html>Bad Gateway</html>".to_vec());
        assert_eq!(body.error_text(), "<html>Bad Gateway</html>");

        let body = Body(Vec::new());
        assert_eq!(body.error_text(), "empty response");
    }
}
