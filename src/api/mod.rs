//! HTTP/JSON boundary to the backup service.
//!
//! ## Architecture
//!
//! - `models`: entities returned by the list endpoints
//! - `requests`: mutating request bodies and the `{success, message, error}` envelope
//! - `client`: `reqwest` implementation of [`DashboardApi`]
//!
//! The dashboard core only talks to [`DashboardApi`], so it runs unchanged
//! against the real service or an in-memory fake.

pub mod client;
pub mod models;
pub mod requests;

use async_trait::async_trait;

pub use client::{ApiClient, ClientConfig, ClientError};
pub use models::{
    Backup, BackupExport, BackupKind, BackupListing, BackupStatus, HealthReport, Schedule,
    ScheduleType, Server, ServerSnapshot, SystemInfo, Volume, VolumeSnapshot,
};
pub use requests::{CommandRequest, Envelope};

/// Read and write operations the dashboard needs from the backend.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/health`. Unhealthy bodies are `Ok`; only transport failures are `Err`.
    async fn health(&self) -> Result<HealthReport, ClientError>;

    /// `GET /api/info`.
    async fn system_info(&self) -> Result<SystemInfo, ClientError>;

    async fn volumes(&self) -> Result<Vec<Volume>, ClientError>;

    async fn backups(&self) -> Result<BackupListing, ClientError>;

    async fn schedules(&self) -> Result<Vec<Schedule>, ClientError>;

    async fn server_snapshots(&self) -> Result<Vec<ServerSnapshot>, ClientError>;

    async fn volume_snapshots(&self) -> Result<Vec<VolumeSnapshot>, ClientError>;

    async fn servers(&self) -> Result<Vec<Server>, ClientError>;

    /// `GET /api/backup/{id}/status`. An unknown backup is a 404 `Status` error.
    async fn backup_status(&self, backup_id: &str) -> Result<BackupStatus, ClientError>;

    /// `GET /api/backup/{id}/export`.
    async fn export_backup(&self, backup_id: &str) -> Result<BackupExport, ClientError>;

    /// Send one mutating request and return the decoded envelope.
    async fn execute(&self, request: &CommandRequest) -> Result<Envelope, ClientError>;
}
