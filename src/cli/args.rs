//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::api::models::{BackupKind, ScheduleType};
use crate::dashboard::commands::{CleanupMode, Command, SnapshotTarget};
use crate::dashboard::validate::DEFAULT_RETENTION_DAYS;

#[derive(Parser, Debug)]
#[command(name = "cinderdash")]
#[command(about = "Terminal dashboard for a Cinder backup service", long_about = None, version)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The terminal UI runs when no subcommand (or `dashboard`) is given.
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Dashboard))
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Options shared by every subcommand. Set values override the config file.
#[derive(Args, Serialize, Debug, Default)]
pub struct GlobalArgs {
    /// Config file (default: ./cinderdash.toml when present)
    #[serde(skip)]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL of the backup service
    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    pub server_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long = "poll-interval", value_name = "SECS", global = true)]
    pub poll_interval_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long = "timeout", value_name = "SECS", global = true)]
    pub request_timeout_secs: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long = "health-interval", value_name = "SECS", global = true)]
    pub health_interval_secs: Option<u64>,

    #[serde(skip_serializing_if = "is_false")]
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[serde(skip_serializing_if = "is_false")]
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive dashboard (default)
    Dashboard,
    /// Check service health
    Status,
    /// Show volume and backup statistics
    Info,
    /// Print one resource table
    List {
        #[arg(value_enum)]
        resource: ListResource,
    },
    #[command(subcommand)]
    Backup(BackupCommand),
    #[command(subcommand)]
    Schedule(ScheduleCommand),
    #[command(subcommand)]
    Snapshot(SnapshotCommand),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListResource {
    Volumes,
    Backups,
    Schedules,
    ServerSnapshots,
    VolumeSnapshots,
    Servers,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindArg {
    #[default]
    Full,
    Incremental,
}

impl From<KindArg> for BackupKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Full => BackupKind::Full,
            KindArg::Incremental => BackupKind::Incremental,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RepeatArg {
    #[default]
    Daily,
    Weekly,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetArg {
    #[default]
    Server,
    Volume,
}

#[derive(Subcommand, Debug)]
pub enum BackupCommand {
    /// Back up volumes
    Create {
        #[arg(long, value_enum, default_value_t = KindArg::Full)]
        kind: KindArg,
        #[arg(long)]
        name: Option<String>,
        /// Select every backupable volume
        #[arg(long, conflicts_with = "volume_ids")]
        all: bool,
        volume_ids: Vec<String>,
    },
    Delete {
        backup_id: String,
    },
    /// Restore an available backup
    Restore {
        backup_id: String,
        /// Restore into this volume instead of a new one
        #[arg(long)]
        volume_id: Option<String>,
        #[arg(long)]
        name: Option<String>,
    },
    /// Delete backups older than a retention period
    Cleanup {
        #[arg(long, conflicts_with = "policies")]
        days: Option<String>,
        /// Per-volume retention, repeatable
        #[arg(long = "policy", value_name = "VOLUME=DAYS")]
        policies: Vec<String>,
    },
    /// Show the current status of one backup
    Status {
        backup_id: String,
    },
    /// Print the export record needed to import a backup elsewhere
    Export {
        backup_id: String,
    },
    /// Register a backup from an export record
    Import {
        #[arg(long)]
        backup_service: String,
        #[arg(long)]
        backup_url: String,
        #[arg(long)]
        name: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ScheduleCommand {
    Create {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, value_enum, default_value_t = KindArg::Full)]
        kind: KindArg,
        #[arg(long, value_enum, default_value_t = RepeatArg::Daily)]
        every: RepeatArg,
        /// Time of day, HH:MM
        #[arg(long, default_value = "02:00")]
        at: String,
        /// ISO weekday (1 = Monday), repeatable
        #[arg(long = "weekday")]
        weekdays: Vec<u8>,
        volume_ids: Vec<String>,
    },
    /// Pause or resume a schedule
    Toggle {
        schedule_id: String,
    },
    Delete {
        schedule_id: String,
    },
    AddVolumes {
        schedule_id: String,
        volume_ids: Vec<String>,
    },
    RemoveVolumes {
        schedule_id: String,
        volume_ids: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum SnapshotCommand {
    CreateServer {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        server_ids: Vec<String>,
    },
    CreateVolume {
        #[arg(long, default_value = "")]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        /// Snapshot in-use volumes
        #[arg(long)]
        force: bool,
        volume_ids: Vec<String>,
    },
    DeleteServer {
        snapshot_id: String,
    },
    DeleteVolume {
        snapshot_id: String,
    },
    /// Delete snapshots older than a retention period
    Cleanup {
        #[arg(long, value_enum, default_value_t = TargetArg::Server)]
        target: TargetArg,
        #[arg(long)]
        days: Option<String>,
    },
}

/// What a `backup` subcommand does: read one backup, or send a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupAction {
    Status(String),
    Export(String),
    Send(Command, VolumeSelection),
}

/// Volumes to select before a backup is created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VolumeSelection {
    None,
    All,
    Ids(Vec<String>),
}

fn retention_text(days: Option<String>) -> String {
    days.unwrap_or_else(|| DEFAULT_RETENTION_DAYS.to_string())
}

/// Split `VOLUME=DAYS`. A missing `=` leaves the days empty, which validation drops.
fn parse_policy(raw: &str) -> (String, String) {
    match raw.split_once('=') {
        Some((volume, days)) => (volume.trim().to_string(), days.trim().to_string()),
        None => (raw.trim().to_string(), String::new()),
    }
}

impl BackupCommand {
    pub fn into_action(self) -> BackupAction {
        let (command, selection) = match self {
            BackupCommand::Create {
                kind,
                name,
                all,
                volume_ids,
            } => {
                let selection = if all {
                    VolumeSelection::All
                } else if volume_ids.is_empty() {
                    VolumeSelection::None
                } else {
                    VolumeSelection::Ids(volume_ids)
                };
                (
                    Command::CreateBackup {
                        kind: kind.into(),
                        name,
                    },
                    selection,
                )
            }
            BackupCommand::Delete { backup_id } => {
                (Command::DeleteBackup { backup_id }, VolumeSelection::None)
            }
            BackupCommand::Restore {
                backup_id,
                volume_id,
                name,
            } => (
                Command::RestoreBackup {
                    backup_id,
                    volume_id,
                    name,
                },
                VolumeSelection::None,
            ),
            BackupCommand::Cleanup { days, policies } => {
                let mode = if policies.is_empty() {
                    CleanupMode::Global {
                        retention_days: retention_text(days),
                    }
                } else {
                    CleanupMode::PerVolume {
                        entries: policies.iter().map(|p| parse_policy(p)).collect(),
                    }
                };
                (Command::CleanupBackups(mode), VolumeSelection::None)
            }
            BackupCommand::Status { backup_id } => return BackupAction::Status(backup_id),
            BackupCommand::Export { backup_id } => return BackupAction::Export(backup_id),
            BackupCommand::Import {
                backup_service,
                backup_url,
                name,
            } => (
                Command::ImportBackup {
                    backup_service,
                    backup_url,
                    name,
                },
                VolumeSelection::None,
            ),
        };
        BackupAction::Send(command, selection)
    }
}

impl From<ScheduleCommand> for Command {
    fn from(command: ScheduleCommand) -> Self {
        match command {
            ScheduleCommand::Create {
                name,
                kind,
                every,
                at,
                weekdays,
                volume_ids,
            } => Command::CreateSchedule {
                name,
                backup_type: kind.into(),
                schedule_type: match every {
                    RepeatArg::Daily => ScheduleType::Daily,
                    RepeatArg::Weekly => ScheduleType::Weekly,
                },
                schedule_time: at,
                weekdays,
                volume_ids,
            },
            ScheduleCommand::Toggle { schedule_id } => Command::ToggleSchedule { schedule_id },
            ScheduleCommand::Delete { schedule_id } => Command::DeleteSchedule { schedule_id },
            ScheduleCommand::AddVolumes {
                schedule_id,
                volume_ids,
            } => Command::AddScheduleVolumes {
                schedule_id,
                volume_ids,
            },
            ScheduleCommand::RemoveVolumes {
                schedule_id,
                volume_ids,
            } => Command::RemoveScheduleVolumes {
                schedule_id,
                volume_ids,
            },
        }
    }
}

impl From<SnapshotCommand> for Command {
    fn from(command: SnapshotCommand) -> Self {
        match command {
            SnapshotCommand::CreateServer {
                name,
                description,
                server_ids,
            } => Command::CreateServerSnapshot {
                server_ids,
                name,
                description,
            },
            SnapshotCommand::CreateVolume {
                name,
                description,
                force,
                volume_ids,
            } => Command::CreateVolumeSnapshot {
                volume_ids,
                name,
                description,
                force,
            },
            SnapshotCommand::DeleteServer { snapshot_id } => {
                Command::DeleteServerSnapshot { snapshot_id }
            }
            SnapshotCommand::DeleteVolume { snapshot_id } => {
                Command::DeleteVolumeSnapshot { snapshot_id }
            }
            SnapshotCommand::Cleanup { target, days } => Command::CleanupSnapshots {
                target: match target {
                    TargetArg::Server => SnapshotTarget::Server,
                    TargetArg::Volume => SnapshotTarget::Volume,
                },
                retention_days: retention_text(days),
            },
        }
    }
}
