//! In-memory [`DashboardApi`] for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::api::models::BackupKind;
use crate::api::{
    Backup, BackupExport, BackupListing, BackupStatus, ClientError, CommandRequest, DashboardApi,
    Envelope, HealthReport, Schedule, ScheduleType, Server, ServerSnapshot, SystemInfo, Volume,
    VolumeSnapshot,
};

use super::poller::Resource;

#[derive(Default)]
struct Inner {
    volumes: Vec<Volume>,
    backups: Vec<Backup>,
    schedules: Vec<Schedule>,
    server_snapshots: Vec<ServerSnapshot>,
    volume_snapshots: Vec<VolumeSnapshot>,
    servers: Vec<Server>,
    health: HealthReport,
    failing: HashSet<Resource>,
    hits: Vec<String>,
    executed: Vec<CommandRequest>,
    response: Option<Envelope>,
}

#[derive(Default)]
pub struct FakeApi {
    inner: Mutex<Inner>,
}

impl FakeApi {
    pub fn with_sample_data() -> Self {
        let volume = |id: &str, status: &str, backupable: bool| Volume {
            id: id.into(),
            name: Some(format!("disk-{}", id)),
            size: Some(10),
            status: status.into(),
            backupable,
            created_at: Some("2024-01-01T00:00:00".into()),
        };
        let backup = |id: &str, kind: BackupKind, status: &str| Backup {
            id: id.into(),
            volume_id: Some("v1".into()),
            size: Some(10),
            status: status.into(),
            backup_type: Some(kind.as_str().into()),
            ..Default::default()
        };

        let inner = Inner {
            volumes: vec![volume("v1", "available", true), volume("v2", "error", false)],
            backups: vec![
                backup("b1", BackupKind::Full, "available"),
                backup("b2", BackupKind::Incremental, "available"),
                backup("b3", BackupKind::Full, "creating"),
            ],
            schedules: vec![Schedule {
                id: "s1".into(),
                name: Some("nightly".into()),
                schedule_type: ScheduleType::Daily,
                schedule_time: "02:00".into(),
                volume_ids: vec!["v1".into()],
                enabled: true,
                ..Default::default()
            }],
            server_snapshots: vec![ServerSnapshot {
                id: "ss1".into(),
                server_id: Some("srv1".into()),
                status: "active".into(),
                ..Default::default()
            }],
            volume_snapshots: vec![VolumeSnapshot {
                id: "vs1".into(),
                volume_id: Some("v1".into()),
                status: "available".into(),
                ..Default::default()
            }],
            servers: vec![Server {
                id: "srv1".into(),
                name: Some("web".into()),
                status: "ACTIVE".into(),
            }],
            health: HealthReport {
                status: "healthy".into(),
                volume_count: Some(2),
                ..Default::default()
            },
            ..Default::default()
        };
        Self {
            inner: Mutex::new(inner),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap()
    }

    /// Make the list endpoint for `resource` fail until further notice.
    pub fn fail(&self, resource: Resource) {
        self.lock().failing.insert(resource);
    }

    pub fn set_health(&self, report: HealthReport) {
        self.lock().health = report;
    }

    /// Envelope returned by every subsequent `execute`.
    pub fn respond_with(&self, envelope: Envelope) {
        self.lock().response = Some(envelope);
    }

    pub fn set_volumes(&self, volumes: Vec<Volume>) {
        self.lock().volumes = volumes;
    }

    /// Paths of list requests served so far.
    pub fn hits(&self) -> Vec<String> {
        self.lock().hits.clone()
    }

    pub fn executed(&self) -> Vec<CommandRequest> {
        self.lock().executed.clone()
    }

    fn list<T>(
        &self,
        resource: Resource,
        pick: impl FnOnce(&Inner) -> T,
    ) -> Result<T, ClientError> {
        let mut inner = self.lock();
        inner.hits.push(resource.path().to_string());
        if inner.failing.contains(&resource) {
            return Err(ClientError::Status {
                status: 500,
                message: "Internal Server Error".into(),
            });
        }
        Ok(pick(&*inner))
    }

    fn find_backup(&self, backup_id: &str) -> Result<Backup, ClientError> {
        self.lock()
            .backups
            .iter()
            .find(|b| b.id == backup_id)
            .cloned()
            .ok_or_else(|| ClientError::Status {
                status: 404,
                message: "Backup not found".into(),
            })
    }
}

#[async_trait]
impl DashboardApi for FakeApi {
    async fn health(&self) -> Result<HealthReport, ClientError> {
        Ok(self.lock().health.clone())
    }

    async fn system_info(&self) -> Result<SystemInfo, ClientError> {
        let inner = self.lock();
        let mut info = SystemInfo::default();
        info.volume_stats.total = inner.volumes.len() as u64;
        info.backup_stats.total = inner.backups.len() as u64;
        Ok(info)
    }

    async fn volumes(&self) -> Result<Vec<Volume>, ClientError> {
        self.list(Resource::Volumes, |i| i.volumes.clone())
    }

    async fn backups(&self) -> Result<BackupListing, ClientError> {
        self.list(Resource::Backups, |i| BackupListing {
            all_backups: i.backups.clone(),
            ..Default::default()
        })
    }

    async fn schedules(&self) -> Result<Vec<Schedule>, ClientError> {
        self.list(Resource::Schedules, |i| i.schedules.clone())
    }

    async fn server_snapshots(&self) -> Result<Vec<ServerSnapshot>, ClientError> {
        self.list(Resource::ServerSnapshots, |i| i.server_snapshots.clone())
    }

    async fn volume_snapshots(&self) -> Result<Vec<VolumeSnapshot>, ClientError> {
        self.list(Resource::VolumeSnapshots, |i| i.volume_snapshots.clone())
    }

    async fn servers(&self) -> Result<Vec<Server>, ClientError> {
        self.list(Resource::Servers, |i| i.servers.clone())
    }

    async fn backup_status(&self, backup_id: &str) -> Result<BackupStatus, ClientError> {
        let backup = self.find_backup(backup_id)?;
        Ok(BackupStatus {
            is_incremental: Some(backup.kind() == BackupKind::Incremental),
            id: backup.id,
            name: backup.name,
            status: backup.status,
            created_at: backup.created_at,
            size: backup.size,
            ..Default::default()
        })
    }

    async fn export_backup(&self, backup_id: &str) -> Result<BackupExport, ClientError> {
        let backup = self.find_backup(backup_id)?;
        Ok(BackupExport {
            backup_service: "cinder.backup.drivers.swift".into(),
            backup_url: format!("export-{}", backup.id),
        })
    }

    async fn execute(&self, request: &CommandRequest) -> Result<Envelope, ClientError> {
        let mut inner = self.lock();
        inner.executed.push(request.clone());
        Ok(inner
            .response
            .clone()
            .unwrap_or_else(|| Envelope::ok("done")))
    }
}
