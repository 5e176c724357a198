//! User commands and their translation into one mutating request each.
//!
//! [`Command::prepare`] does all validation against the current state. A
//! command that fails validation never produces a request.

use std::time::Duration;

use crate::api::models::{BackupKind, ScheduleType};
use crate::api::requests::{
    CleanupBackupsBody, CreateBackupBody, CreateScheduleBody, CreateServerSnapshotBody,
    CreateVolumeSnapshotBody, ImportBackupBody, RestoreBackupBody, RetentionBody, VolumeIdsBody,
};
use crate::api::CommandRequest;

use super::state::AppState;
use super::validate::{
    clean_ids, collect_volume_policies, normalize_weekdays, parse_retention_days,
    parse_schedule_time, require_id, ValidationError,
};

/// Which snapshot collection a cleanup targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotTarget {
    Server,
    Volume,
}

impl SnapshotTarget {
    fn collection(&self) -> &'static str {
        match self {
            SnapshotTarget::Server => "server-snapshots",
            SnapshotTarget::Volume => "volume-snapshots",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SnapshotTarget::Server => "server",
            SnapshotTarget::Volume => "volume",
        }
    }
}

/// Backup cleanup input, as typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupMode {
    Global { retention_days: String },
    /// `(volume_id, raw days)` pairs
    PerVolume { entries: Vec<(String, String)> },
}

/// Form a command belongs to; closed when the command succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    BackupName,
    RestoreBackup,
    CleanupBackups,
    CreateSchedule,
    ScheduleVolumes,
    CreateServerSnapshot,
    CreateVolumeSnapshot,
    CleanupSnapshots,
}

/// How long to wait after a successful command before refreshing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settle {
    Short,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Back up the current volume selection
    CreateBackup {
        kind: BackupKind,
        name: Option<String>,
    },
    DeleteBackup {
        backup_id: String,
    },
    RestoreBackup {
        backup_id: String,
        volume_id: Option<String>,
        name: Option<String>,
    },
    /// Register a backup from an export record.
    ImportBackup {
        backup_service: String,
        backup_url: String,
        name: Option<String>,
    },
    CleanupBackups(CleanupMode),
    CreateSchedule {
        name: String,
        backup_type: BackupKind,
        schedule_type: ScheduleType,
        schedule_time: String,
        weekdays: Vec<u8>,
        volume_ids: Vec<String>,
    },
    ToggleSchedule {
        schedule_id: String,
    },
    DeleteSchedule {
        schedule_id: String,
    },
    AddScheduleVolumes {
        schedule_id: String,
        volume_ids: Vec<String>,
    },
    RemoveScheduleVolumes {
        schedule_id: String,
        volume_ids: Vec<String>,
    },
    CreateServerSnapshot {
        server_ids: Vec<String>,
        name: String,
        description: String,
    },
    DeleteServerSnapshot {
        snapshot_id: String,
    },
    CreateVolumeSnapshot {
        volume_ids: Vec<String>,
        name: String,
        description: String,
        force: bool,
    },
    DeleteVolumeSnapshot {
        snapshot_id: String,
    },
    CleanupSnapshots {
        target: SnapshotTarget,
        retention_days: String,
    },
}

/// A validated command, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    pub request: CommandRequest,
    /// Shown when the server fails without an error text
    pub fallback: &'static str,
    pub settle: Settle,
    pub modal: Option<Modal>,
    pub clears_selection: bool,
}

impl Prepared {
    fn new(request: CommandRequest, fallback: &'static str, settle: Settle) -> Self {
        Self {
            request,
            fallback,
            settle,
            modal: None,
            clears_selection: false,
        }
    }

    fn closing(mut self, modal: Modal) -> Self {
        self.modal = Some(modal);
        self
    }
}

/// Result of dispatching one command.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// Validation failed; nothing was sent
    Rejected(ValidationError),
    Succeeded {
        message: String,
        closes: Option<Modal>,
        refresh_after: Duration,
    },
    Failed {
        message: String,
    },
    Cancelled,
}

impl CommandOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, CommandOutcome::Succeeded { .. })
    }
}

fn optional_text(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

impl Command {
    /// Short name for logs and notices.
    pub fn describe(&self) -> &'static str {
        match self {
            Command::CreateBackup { .. } => "create backup",
            Command::DeleteBackup { .. } => "delete backup",
            Command::RestoreBackup { .. } => "restore backup",
            Command::ImportBackup { .. } => "import backup",
            Command::CleanupBackups(_) => "clean up backups",
            Command::CreateSchedule { .. } => "create schedule",
            Command::ToggleSchedule { .. } => "toggle schedule",
            Command::DeleteSchedule { .. } => "delete schedule",
            Command::AddScheduleVolumes { .. } => "add schedule volumes",
            Command::RemoveScheduleVolumes { .. } => "remove schedule volumes",
            Command::CreateServerSnapshot { .. } => "create server snapshot",
            Command::DeleteServerSnapshot { .. } => "delete server snapshot",
            Command::CreateVolumeSnapshot { .. } => "create volume snapshot",
            Command::DeleteVolumeSnapshot { .. } => "delete volume snapshot",
            Command::CleanupSnapshots { .. } => "clean up snapshots",
        }
    }

    /// Question to ask before running a destructive command.
    pub fn confirmation(&self) -> Option<String> {
        match self {
            Command::DeleteBackup { backup_id } => {
                Some(format!("Delete backup {}? This cannot be undone.", backup_id))
            }
            Command::RestoreBackup { backup_id, .. } => {
                Some(format!("Restore backup {}?", backup_id))
            }
            Command::CleanupBackups(CleanupMode::Global { retention_days }) => Some(format!(
                "Delete all backups older than {} days? This cannot be undone.",
                retention_days.trim()
            )),
            Command::CleanupBackups(CleanupMode::PerVolume { .. }) => Some(
                "Delete backups older than each volume's retention period? This cannot be undone."
                    .to_string(),
            ),
            Command::DeleteSchedule { schedule_id } => {
                Some(format!("Delete schedule {}?", schedule_id))
            }
            Command::RemoveScheduleVolumes {
                schedule_id,
                volume_ids,
            } => Some(format!(
                "Remove {} volume(s) from schedule {}?",
                volume_ids.len(),
                schedule_id
            )),
            Command::DeleteServerSnapshot { snapshot_id } => Some(format!(
                "Delete server snapshot {}? This cannot be undone.",
                snapshot_id
            )),
            Command::DeleteVolumeSnapshot { snapshot_id } => Some(format!(
                "Delete volume snapshot {}? This cannot be undone.",
                snapshot_id
            )),
            Command::CleanupSnapshots {
                target,
                retention_days,
            } => Some(format!(
                "Delete {} snapshots older than {} days? This cannot be undone.",
                target.label(),
                retention_days.trim()
            )),
            _ => None,
        }
    }

    pub fn needs_confirmation(&self) -> bool {
        self.confirmation().is_some()
    }

    /// Validate against `state` and build the single request this command sends.
    pub fn prepare(&self, state: &AppState) -> Result<Prepared, ValidationError> {
        let prepared = match self {
            Command::CreateBackup { kind, name } => {
                let volume_ids = state.selected_volumes();
                if volume_ids.is_empty() {
                    return Err(ValidationError::NoVolumesSelected);
                }
                let request = CommandRequest::post(["api", "backup", kind.as_str()]).with_body(
                    CreateBackupBody {
                        volume_ids,
                        name: optional_text(name.as_deref()),
                    },
                );
                let mut prepared = Prepared::new(request, "Failed to create backup", Settle::Long)
                    .closing(Modal::BackupName);
                prepared.clears_selection = true;
                prepared
            }

            Command::DeleteBackup { backup_id } => {
                let id = require_id(backup_id)?;
                Prepared::new(
                    CommandRequest::delete(["api".to_string(), "backup".to_string(), id]),
                    "Failed to delete backup",
                    Settle::Short,
                )
            }

            Command::RestoreBackup {
                backup_id,
                volume_id,
                name,
            } => {
                let id = require_id(backup_id)?;
                let backup = state
                    .backup(&id)
                    .ok_or_else(|| ValidationError::UnknownBackup(id.clone()))?;
                if backup.status != "available" {
                    return Err(ValidationError::BackupNotAvailable(id));
                }
                let segments = ["api".to_string(), "backup".to_string(), id, "restore".to_string()];
                let request = CommandRequest::post(segments).with_body(RestoreBackupBody {
                    volume_id: optional_text(volume_id.as_deref()),
                    name: optional_text(name.as_deref()),
                });
                Prepared::new(request, "Failed to restore backup", Settle::Long)
                    .closing(Modal::RestoreBackup)
            }

            Command::ImportBackup {
                backup_service,
                backup_url,
                name,
            } => {
                let backup_service = backup_service.trim();
                let backup_url = backup_url.trim();
                if backup_service.is_empty() || backup_url.is_empty() {
                    return Err(ValidationError::IncompleteImportRecord);
                }
                let request = CommandRequest::post(["api", "backup", "import"]).with_body(
                    ImportBackupBody {
                        backup_service: backup_service.to_string(),
                        backup_url: backup_url.to_string(),
                        name: optional_text(name.as_deref()),
                    },
                );
                Prepared::new(request, "Failed to import backup", Settle::Long)
            }

            Command::CleanupBackups(mode) => {
                let body = match mode {
                    CleanupMode::Global { retention_days } => CleanupBackupsBody::Global {
                        retention_days: parse_retention_days(retention_days)?,
                    },
                    CleanupMode::PerVolume { entries } => CleanupBackupsBody::PerVolume {
                        volume_policies: collect_volume_policies(
                            entries.iter().map(|(v, d)| (v.as_str(), d.as_str())),
                        )?,
                    },
                };
                let request = CommandRequest::post(["api", "backup", "cleanup"]).with_body(body);
                Prepared::new(request, "Failed to clean up backups", Settle::Long)
                    .closing(Modal::CleanupBackups)
            }

            Command::CreateSchedule {
                name,
                backup_type,
                schedule_type,
                schedule_time,
                weekdays,
                volume_ids,
            } => {
                let volume_ids = clean_ids(volume_ids);
                if volume_ids.is_empty() {
                    return Err(ValidationError::NoVolumesSelected);
                }
                let weekdays = match schedule_type {
                    ScheduleType::Weekly => {
                        let days = normalize_weekdays(weekdays)?;
                        if days.is_empty() {
                            return Err(ValidationError::NoWeekdays);
                        }
                        days
                    }
                    ScheduleType::Daily => Vec::new(),
                };
                let request = CommandRequest::post(["api", "schedules"]).with_body(
                    CreateScheduleBody {
                        volume_ids,
                        backup_type: *backup_type,
                        schedule_type: *schedule_type,
                        schedule_time: parse_schedule_time(schedule_time)?,
                        weekdays,
                        name: name.trim().to_string(),
                    },
                );
                Prepared::new(request, "Failed to create schedule", Settle::Short)
                    .closing(Modal::CreateSchedule)
            }

            Command::ToggleSchedule { schedule_id } => {
                let id = require_id(schedule_id)?;
                let segments = ["api".to_string(), "schedules".to_string(), id, "toggle".to_string()];
                Prepared::new(
                    CommandRequest::post(segments),
                    "Failed to update schedule",
                    Settle::Short,
                )
            }

            Command::DeleteSchedule { schedule_id } => {
                let id = require_id(schedule_id)?;
                Prepared::new(
                    CommandRequest::delete(["api".to_string(), "schedules".to_string(), id]),
                    "Failed to delete schedule",
                    Settle::Short,
                )
            }

            Command::AddScheduleVolumes {
                schedule_id,
                volume_ids,
            }
            | Command::RemoveScheduleVolumes {
                schedule_id,
                volume_ids,
            } => {
                let id = require_id(schedule_id)?;
                let volume_ids = clean_ids(volume_ids);
                if volume_ids.is_empty() {
                    return Err(ValidationError::NoVolumesSelected);
                }
                let segments = ["api".to_string(), "schedules".to_string(), id, "volumes".to_string()];
                let (request, fallback) = if matches!(self, Command::AddScheduleVolumes { .. }) {
                    (CommandRequest::post(segments), "Failed to add volumes to schedule")
                } else {
                    (
                        CommandRequest::delete(segments),
                        "Failed to remove volumes from schedule",
                    )
                };
                let request = request.with_body(VolumeIdsBody { volume_ids });
                Prepared::new(request, fallback, Settle::Short).closing(Modal::ScheduleVolumes)
            }

            Command::CreateServerSnapshot {
                server_ids,
                name,
                description,
            } => {
                let server_ids = clean_ids(server_ids);
                if server_ids.is_empty() {
                    return Err(ValidationError::NoServersSelected);
                }
                let request = CommandRequest::post(["api", "server-snapshots"]).with_body(
                    CreateServerSnapshotBody {
                        server_ids,
                        name: name.trim().to_string(),
                        description: description.trim().to_string(),
                    },
                );
                Prepared::new(request, "Failed to create server snapshot", Settle::Short)
                    .closing(Modal::CreateServerSnapshot)
            }

            Command::DeleteServerSnapshot { snapshot_id } => {
                let id = require_id(snapshot_id)?;
                Prepared::new(
                    CommandRequest::delete(["api".to_string(), "server-snapshots".to_string(), id]),
                    "Failed to delete server snapshot",
                    Settle::Short,
                )
            }

            Command::CreateVolumeSnapshot {
                volume_ids,
                name,
                description,
                force,
            } => {
                let volume_ids = clean_ids(volume_ids);
                if volume_ids.is_empty() {
                    return Err(ValidationError::NoVolumesSelected);
                }
                let request = CommandRequest::post(["api", "volume-snapshots"]).with_body(
                    CreateVolumeSnapshotBody {
                        volume_ids,
                        name: name.trim().to_string(),
                        description: description.trim().to_string(),
                        force: *force,
                    },
                );
                Prepared::new(request, "Failed to create volume snapshot", Settle::Short)
                    .closing(Modal::CreateVolumeSnapshot)
            }

            Command::DeleteVolumeSnapshot { snapshot_id } => {
                let id = require_id(snapshot_id)?;
                Prepared::new(
                    CommandRequest::delete(["api".to_string(), "volume-snapshots".to_string(), id]),
                    "Failed to delete volume snapshot",
                    Settle::Short,
                )
            }

            Command::CleanupSnapshots {
                target,
                retention_days,
            } => {
                let retention_days = parse_retention_days(retention_days)?;
                let request = CommandRequest::post(["api", target.collection(), "cleanup"])
                    .with_body(RetentionBody { retention_days });
                Prepared::new(request, "Failed to clean up snapshots", Settle::Short)
                    .closing(Modal::CleanupSnapshots)
            }
        };
        Ok(prepared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Backup, Volume};
    use reqwest::Method;
    use serde_json::json;

    fn state() -> AppState {
        AppState {
            volumes: vec![
                Volume {
                    id: "v1".into(),
                    status: "available".into(),
                    backupable: true,
                    ..Default::default()
                },
                Volume {
                    id: "v2".into(),
                    status: "error".into(),
                    backupable: false,
                    ..Default::default()
                },
            ],
            backups: vec![
                Backup {
                    id: "b1".into(),
                    status: "available".into(),
                    ..Default::default()
                },
                Backup {
                    id: "b2".into(),
                    status: "creating".into(),
                    ..Default::default()
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_create_backup_requires_selection() {
        let mut state = state();
        let command = Command::CreateBackup {
            kind: BackupKind::Full,
            name: None,
        };
        assert_eq!(command.prepare(&state), Err(ValidationError::NoVolumesSelected));

        // An ineligible id in the raw set still counts as nothing selected.
        state.selection.volumes.insert("v2".into());
        assert_eq!(command.prepare(&state), Err(ValidationError::NoVolumesSelected));

        state.toggle_volume("v1").unwrap();
        let prepared = command.prepare(&state).unwrap();
        assert_eq!(prepared.request.method, Method::POST);
        assert_eq!(prepared.request.path(), "/api/backup/full");
        assert_eq!(prepared.request.json_body().unwrap(), Some(json!({"volume_ids": ["v1"]})));
        assert_eq!(prepared.settle, Settle::Long);
        assert!(prepared.clears_selection);
    }

    #[test]
    fn test_create_incremental_backup_with_name() {
        let mut state = state();
        state.toggle_volume("v1").unwrap();
        let prepared = Command::CreateBackup {
            kind: BackupKind::Incremental,
            name: Some(" weekly ".into()),
        }
        .prepare(&state)
        .unwrap();

        assert_eq!(prepared.request.path(), "/api/backup/incremental");
        assert_eq!(
            prepared.request.json_body().unwrap(),
            Some(json!({"volume_ids": ["v1"], "name": "weekly"}))
        );
    }

    #[test]
    fn test_toggle_ignores_local_state() {
        let prepared = Command::ToggleSchedule {
            schedule_id: "s1".into(),
        }
        .prepare(&AppState::default())
        .unwrap();

        assert_eq!(prepared.request.method, Method::POST);
        assert_eq!(prepared.request.path(), "/api/schedules/s1/toggle");
        assert!(prepared.request.body.is_none());
        assert_eq!(prepared.settle, Settle::Short);
    }

    #[test]
    fn test_weekly_schedule_needs_weekdays() {
        let command = |schedule_type, weekdays: Vec<u8>| Command::CreateSchedule {
            name: "nightly".into(),
            backup_type: BackupKind::Full,
            schedule_type,
            schedule_time: "2:00".into(),
            weekdays,
            volume_ids: vec!["v1".into()],
        };

        assert_eq!(
            command(ScheduleType::Weekly, vec![]).prepare(&state()),
            Err(ValidationError::NoWeekdays)
        );
        assert_eq!(
            command(ScheduleType::Weekly, vec![9]).prepare(&state()),
            Err(ValidationError::InvalidWeekday(9))
        );

        let prepared = command(ScheduleType::Weekly, vec![3, 1])
            .prepare(&state())
            .unwrap();
        assert_eq!(
            prepared.request.json_body().unwrap(),
            Some(json!({
                "volume_ids": ["v1"],
                "backup_type": "full",
                "schedule_type": "weekly",
                "schedule_time": "02:00",
                "weekdays": [1, 3],
                "name": "nightly"
            }))
        );

        // Daily schedules drop any weekdays.
        let prepared = command(ScheduleType::Daily, vec![1]).prepare(&state()).unwrap();
        assert_eq!(prepared.request.json_body().unwrap().unwrap()["weekdays"], json!([]));
    }

    #[test]
    fn test_schedule_requires_volumes() {
        let command = Command::CreateSchedule {
            name: String::new(),
            backup_type: BackupKind::Incremental,
            schedule_type: ScheduleType::Daily,
            schedule_time: "01:00".into(),
            weekdays: vec![],
            volume_ids: vec![" ".into()],
        };
        assert_eq!(command.prepare(&state()), Err(ValidationError::NoVolumesSelected));
    }

    #[test]
    fn test_cleanup_backups_modes() {
        let global = Command::CleanupBackups(CleanupMode::Global {
            retention_days: "366".into(),
        });
        assert!(matches!(
            global.prepare(&state()),
            Err(ValidationError::InvalidRetentionDays(_))
        ));

        let per_volume = Command::CleanupBackups(CleanupMode::PerVolume {
            entries: vec![
                ("v1".into(), "14".into()),
                ("v2".into(), "0".into()),
            ],
        });
        let prepared = per_volume.prepare(&state()).unwrap();
        assert_eq!(prepared.request.path(), "/api/backup/cleanup");
        assert_eq!(
            prepared.request.json_body().unwrap(),
            Some(json!({"volume_policies": {"v1": 14}}))
        );
        assert_eq!(prepared.settle, Settle::Long);
        assert!(per_volume.needs_confirmation());
    }

    #[test]
    fn test_restore_requires_available_backup() {
        let restore = |id: &str| Command::RestoreBackup {
            backup_id: id.into(),
            volume_id: None,
            name: Some("restored".into()),
        };

        assert_eq!(
            restore("b2").prepare(&state()),
            Err(ValidationError::BackupNotAvailable("b2".into()))
        );
        assert_eq!(
            restore("b9").prepare(&state()),
            Err(ValidationError::UnknownBackup("b9".into()))
        );

        let prepared = restore("b1").prepare(&state()).unwrap();
        assert_eq!(prepared.request.path(), "/api/backup/b1/restore");
        assert_eq!(prepared.request.json_body().unwrap(), Some(json!({"name": "restored"})));
        assert_eq!(prepared.modal, Some(Modal::RestoreBackup));
    }

    #[test]
    fn test_import_needs_full_export_record() {
        let import = |service: &str, url: &str| Command::ImportBackup {
            backup_service: service.into(),
            backup_url: url.into(),
            name: Some("  ".into()),
        };

        assert_eq!(
            import("cinder.backup.drivers.swift", " ").prepare(&state()),
            Err(ValidationError::IncompleteImportRecord)
        );
        assert_eq!(
            import("", "eyJ9").prepare(&state()),
            Err(ValidationError::IncompleteImportRecord)
        );

        let prepared = import(" cinder.backup.drivers.swift ", "eyJ9")
            .prepare(&state())
            .unwrap();
        assert_eq!(prepared.request.method, Method::POST);
        assert_eq!(prepared.request.path(), "/api/backup/import");
        assert_eq!(
            prepared.request.json_body().unwrap(),
            Some(json!({"backup_service": "cinder.backup.drivers.swift", "backup_url": "eyJ9"}))
        );
        assert_eq!(prepared.settle, Settle::Long);
        assert!(!import("s", "u").needs_confirmation());
    }

    #[test]
    fn test_schedule_volume_membership() {
        let add = Command::AddScheduleVolumes {
            schedule_id: "s1".into(),
            volume_ids: vec!["v1".into(), "v1".into()],
        };
        let prepared = add.prepare(&state()).unwrap();
        assert_eq!(prepared.request.method, Method::POST);
        assert_eq!(prepared.request.json_body().unwrap(), Some(json!({"volume_ids": ["v1"]})));

        let remove = Command::RemoveScheduleVolumes {
            schedule_id: "s1".into(),
            volume_ids: vec!["v1".into()],
        };
        let prepared = remove.prepare(&state()).unwrap();
        assert_eq!(prepared.request.method, Method::DELETE);
        assert_eq!(prepared.request.path(), "/api/schedules/s1/volumes");

        let empty = Command::AddScheduleVolumes {
            schedule_id: "s1".into(),
            volume_ids: vec![],
        };
        assert_eq!(empty.prepare(&state()), Err(ValidationError::NoVolumesSelected));
    }

    #[test]
    fn test_snapshot_commands() {
        let none = Command::CreateServerSnapshot {
            server_ids: vec![],
            name: "snap".into(),
            description: String::new(),
        };
        assert_eq!(none.prepare(&state()), Err(ValidationError::NoServersSelected));

        let volume = Command::CreateVolumeSnapshot {
            volume_ids: vec!["v1".into()],
            name: "snap".into(),
            description: "before upgrade".into(),
            force: true,
        };
        let prepared = volume.prepare(&state()).unwrap();
        assert_eq!(prepared.request.path(), "/api/volume-snapshots");
        assert_eq!(prepared.request.json_body().unwrap().unwrap()["force"], json!(true));

        let cleanup = Command::CleanupSnapshots {
            target: SnapshotTarget::Server,
            retention_days: "7".into(),
        };
        let prepared = cleanup.prepare(&state()).unwrap();
        assert_eq!(prepared.request.path(), "/api/server-snapshots/cleanup");
        assert_eq!(prepared.request.json_body().unwrap(), Some(json!({"retention_days": 7})));

        let delete = Command::DeleteVolumeSnapshot {
            snapshot_id: "vs1".into(),
        };
        let prepared = delete.prepare(&state()).unwrap();
        assert_eq!(prepared.request.method, Method::DELETE);
        assert_eq!(prepared.request.path(), "/api/volume-snapshots/vs1");
    }

    #[test]
    fn test_delete_requires_id() {
        let command = Command::DeleteBackup {
            backup_id: "  ".into(),
        };
        assert_eq!(command.prepare(&state()), Err(ValidationError::MissingId));
        assert!(command.needs_confirmation());
        assert!(!Command::ToggleSchedule {
            schedule_id: "s1".into()
        }
        .needs_confirmation());
    }
}
