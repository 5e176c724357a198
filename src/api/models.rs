//! Entities mirrored from the backend's list endpoints.
//!
//! Everything except `id` is optional on the wire; the backend builds these
//! from OpenStack objects and omits or nulls fields freely.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub backupable: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Full or incremental backup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackupKind {
    #[default]
    Full,
    Incremental,
}

impl BackupKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupKind::Full => "full",
            BackupKind::Incremental => "incremental",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BackupKind::Full => "Full",
            BackupKind::Incremental => "Incremental",
        }
    }
}

impl fmt::Display for BackupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Backup {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub volume_id: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub backup_type: Option<String>,
    #[serde(default)]
    pub is_incremental: Option<bool>,
}

impl Backup {
    /// Resolve the backup kind. `backup_type` wins over `is_incremental`;
    /// anything unrecognised counts as full.
    pub fn kind(&self) -> BackupKind {
        match self.backup_type.as_deref() {
            Some("incremental") => BackupKind::Incremental,
            Some("full") => BackupKind::Full,
            _ if self.is_incremental == Some(true) => BackupKind::Incremental,
            _ => BackupKind::Full,
        }
    }
}

/// Body of `GET /api/backups`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackupListing {
    #[serde(default)]
    pub full_backups: Vec<Backup>,
    #[serde(default)]
    pub incremental_backups: Vec<Backup>,
    #[serde(default)]
    pub all_backups: Vec<Backup>,
}

impl BackupListing {
    /// Flatten the three buckets into one list, each backup appearing once.
    ///
    /// `all_backups` keeps its order; bucket membership fills in the kind when
    /// the backup itself does not carry one. Bucket entries missing from
    /// `all_backups` are appended.
    pub fn into_backups(self) -> Vec<Backup> {
        let tag = |mut backup: Backup, kind: BackupKind| {
            if backup.backup_type.is_none() {
                backup.backup_type = Some(kind.as_str().to_string());
            }
            backup
        };

        let full_ids: HashSet<String> = self.full_backups.iter().map(|b| b.id.clone()).collect();
        let incremental_ids: HashSet<String> = self
            .incremental_backups
            .iter()
            .map(|b| b.id.clone())
            .collect();

        let mut seen = HashSet::new();
        let mut merged = Vec::with_capacity(self.all_backups.len());

        for backup in self.all_backups {
            if !seen.insert(backup.id.clone()) {
                continue;
            }
            let backup = if incremental_ids.contains(&backup.id) {
                tag(backup, BackupKind::Incremental)
            } else if full_ids.contains(&backup.id) {
                tag(backup, BackupKind::Full)
            } else {
                backup
            };
            merged.push(backup);
        }

        let buckets = self
            .full_backups
            .into_iter()
            .map(|b| (b, BackupKind::Full))
            .chain(
                self.incremental_backups
                    .into_iter()
                    .map(|b| (b, BackupKind::Incremental)),
            );
        for (backup, kind) in buckets {
            if seen.insert(backup.id.clone()) {
                merged.push(tag(backup, kind));
            }
        }

        merged
    }
}

/// How often a schedule fires.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleType {
    Daily,
    #[default]
    Weekly,
}

impl ScheduleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleType::Daily => "daily",
            ScheduleType::Weekly => "weekly",
        }
    }
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub backup_type: BackupKind,
    #[serde(default)]
    pub schedule_type: ScheduleType,
    #[serde(default)]
    pub schedule_time: String,
    /// ISO weekday numbers, Monday = 1 through Sunday = 7.
    #[serde(default)]
    pub weekdays: Vec<u8>,
    #[serde(default)]
    pub volume_ids: Vec<String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub last_run: Option<String>,
    #[serde(default)]
    pub next_run: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerSnapshot {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub server_id: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeSnapshot {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub volume_id: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: String,
}

/// Body of `GET /api/health`, sent with 200 when healthy and 500 otherwise.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub volume_count: Option<u64>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub openstack_connected: Option<bool>,
    #[serde(default)]
    pub openstack_version: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VolumeStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub available: u64,
    #[serde(default)]
    pub in_use: u64,
    #[serde(default)]
    pub error: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackupStats {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub full: u64,
    #[serde(default)]
    pub incremental: u64,
    #[serde(default)]
    pub available: u64,
    #[serde(default)]
    pub creating: u64,
    #[serde(default)]
    pub error: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RetentionPolicy {
    #[serde(default)]
    pub full_backup_retention: Option<u64>,
    #[serde(default)]
    pub incremental_backup_retention: Option<u64>,
}

/// Body of `GET /api/backup/{id}/status`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BackupStatus {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_incremental: Option<bool>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub fail_reason: Option<String>,
}

impl BackupStatus {
    pub fn kind(&self) -> BackupKind {
        if self.is_incremental.unwrap_or(false) {
            BackupKind::Incremental
        } else {
            BackupKind::Full
        }
    }
}

/// Body of `GET /api/backup/{id}/export`: the record `import` takes back.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BackupExport {
    pub backup_service: String,
    pub backup_url: String,
}

/// Body of `GET /api/info`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SystemInfo {
    #[serde(default)]
    pub openstack_version: Option<String>,
    #[serde(default)]
    pub volume_stats: VolumeStats,
    #[serde(default)]
    pub backup_stats: BackupStats,
    #[serde(default)]
    pub retention_policy: RetentionPolicy,
}
