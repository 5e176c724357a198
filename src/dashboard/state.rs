//! Application state owned by the dashboard controller.
//!
//! Collections are a disposable cache of the last successful fetch. The only
//! client-side mutation besides full replacement is the volume selection.

use std::collections::{BTreeSet, VecDeque};

use chrono::{DateTime, Local};

use crate::api::models::{
    Backup, Schedule, Server, ServerSnapshot, SystemInfo, Volume, VolumeSnapshot,
};

use super::validate::ValidationError;

/// Notices kept for the footer/history; older ones are dropped.
const MAX_NOTICES: usize = 50;

/// Health banner shown in the header.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Banner {
    /// No health check has completed yet
    #[default]
    Pending,
    Healthy {
        volume_count: u64,
        openstack_version: Option<String>,
    },
    Unhealthy {
        reason: String,
    },
}

impl Banner {
    pub fn headline(&self) -> String {
        match self {
            Banner::Pending => "Checking service health...".to_string(),
            Banner::Healthy { volume_count, .. } => {
                format!("Service healthy - OpenStack connected, {} volumes", volume_count)
            }
            Banner::Unhealthy { reason } => format!("Service unhealthy - {}", reason),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self, Banner::Healthy { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A user-facing message: command results, validation warnings, poll failures.
#[derive(Debug, Clone, PartialEq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub text: String,
    pub at: DateTime<Local>,
}

impl Notice {
    pub fn new(level: NoticeLevel, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            text: text.into(),
            at: Local::now(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    entries: VecDeque<Notice>,
}

impl MessageLog {
    pub fn push(&mut self, notice: Notice) {
        if self.entries.len() == MAX_NOTICES {
            self.entries.pop_front();
        }
        self.entries.push_back(notice);
    }

    pub fn latest(&self) -> Option<&Notice> {
        self.entries.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Volumes picked for backup creation.
///
/// The raw set may hold stale or ineligible ids; [`AppState::selected_volumes`]
/// is the only view commands consume.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    pub volumes: BTreeSet<String>,
}

/// Everything the renderer and commands read.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub volumes: Vec<Volume>,
    pub backups: Vec<Backup>,
    pub schedules: Vec<Schedule>,
    pub server_snapshots: Vec<ServerSnapshot>,
    pub volume_snapshots: Vec<VolumeSnapshot>,
    pub servers: Vec<Server>,
    pub system_info: Option<SystemInfo>,
    pub banner: Banner,
    pub selection: Selection,
    pub messages: MessageLog,
    /// A command or refresh is in flight
    pub loading: bool,
    pub last_refresh: Option<DateTime<Local>>,
}

impl AppState {
    pub fn volume(&self, id: &str) -> Option<&Volume> {
        self.volumes.iter().find(|v| v.id == id)
    }

    pub fn backup(&self, id: &str) -> Option<&Backup> {
        self.backups.iter().find(|b| b.id == id)
    }

    pub fn schedule(&self, id: &str) -> Option<&Schedule> {
        self.schedules.iter().find(|s| s.id == id)
    }

    /// Selected volume ids that exist and are backupable, in volume-list order.
    pub fn selected_volumes(&self) -> Vec<String> {
        self.volumes
            .iter()
            .filter(|v| v.backupable && self.selection.volumes.contains(&v.id))
            .map(|v| v.id.clone())
            .collect()
    }

    pub fn is_selected(&self, volume_id: &str) -> bool {
        self.selection.volumes.contains(volume_id)
    }

    /// Flip one volume's selection. Returns the new checked state.
    pub fn toggle_volume(&mut self, volume_id: &str) -> Result<bool, ValidationError> {
        let volume = self
            .volume(volume_id)
            .ok_or_else(|| ValidationError::UnknownVolume(volume_id.to_string()))?;
        if !volume.backupable {
            return Err(ValidationError::NotBackupable(volume_id.to_string()));
        }

        if self.selection.volumes.remove(volume_id) {
            Ok(false)
        } else {
            self.selection.volumes.insert(volume_id.to_string());
            Ok(true)
        }
    }

    /// Check or uncheck every backupable volume.
    pub fn select_all_volumes(&mut self, checked: bool) {
        if checked {
            let eligible: Vec<String> = self
                .volumes
                .iter()
                .filter(|v| v.backupable)
                .map(|v| v.id.clone())
                .collect();
            self.selection.volumes.extend(eligible);
        } else {
            self.selection.volumes.clear();
        }
    }

    /// True when every backupable volume is selected (and there is at least one).
    pub fn all_volumes_selected(&self) -> bool {
        let mut eligible = self.volumes.iter().filter(|v| v.backupable).peekable();
        eligible.peek().is_some() && eligible.all(|v| self.selection.volumes.contains(&v.id))
    }

    pub fn clear_selection(&mut self) {
        self.selection.volumes.clear();
    }

    /// Drop selected ids that vanished or stopped being backupable.
    pub fn prune_selection(&mut self) {
        let volumes = &self.volumes;
        self.selection
            .volumes
            .retain(|id| volumes.iter().any(|v| &v.id == id && v.backupable));
    }

    pub fn notify(&mut self, level: NoticeLevel, title: impl Into<String>, text: impl Into<String>) {
        self.messages.push(Notice::new(level, title, text));
    }
}
