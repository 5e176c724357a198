//! Pure projection from [`AppState`] to table views and picker lists.
//!
//! Nothing here touches the terminal; the TUI and the one-shot printer both
//! draw from these views.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDateTime};

use crate::api::models::{Backup, BackupKind, Schedule, ScheduleType, Volume};

use super::state::AppState;
use super::validate::DEFAULT_RETENTION_DAYS;

pub const UNNAMED: &str = "Unnamed";
pub const UNKNOWN: &str = "unknown";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const WEEKDAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Colour class of a status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Primary,
    Danger,
    Warning,
    Secondary,
}

/// Fixed status → severity mapping. Unknown statuses are secondary.
pub fn status_severity(status: &str) -> Severity {
    match status {
        "available" => Severity::Success,
        "in-use" => Severity::Primary,
        "error" => Severity::Danger,
        "creating" => Severity::Warning,
        "deleting" => Severity::Secondary,
        _ => Severity::Secondary,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Delete,
    /// Pause when the schedule is enabled, resume otherwise
    Toggle { enabled: bool },
    Manage,
    Restore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowAction {
    pub kind: ActionKind,
    pub enabled: bool,
}

impl RowAction {
    fn new(kind: ActionKind, enabled: bool) -> Self {
        Self { kind, enabled }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    /// Identifier, drawn monospaced/dim
    Code(String),
    Badge {
        text: String,
        severity: Severity,
        /// Extra check mark (backupable volumes)
        marker: bool,
    },
    ScheduleState {
        enabled: bool,
    },
    Checkbox {
        checked: bool,
        enabled: bool,
    },
    Actions(Vec<RowAction>),
}

impl Cell {
    /// Plain-text form of the cell.
    pub fn text(&self) -> String {
        match self {
            Cell::Text(t) | Cell::Code(t) => t.clone(),
            Cell::Badge { text, marker, .. } => {
                if *marker {
                    format!("{} ✓", text)
                } else {
                    text.clone()
                }
            }
            Cell::ScheduleState { enabled } => schedule_state_label(*enabled).to_string(),
            Cell::Checkbox { checked, enabled } => match (enabled, checked) {
                (false, _) => "[-]".to_string(),
                (true, true) => "[x]".to_string(),
                (true, false) => "[ ]".to_string(),
            },
            Cell::Actions(actions) => actions
                .iter()
                .filter(|a| a.enabled)
                .map(|a| action_label(a.kind))
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

pub fn action_label(kind: ActionKind) -> &'static str {
    match kind {
        ActionKind::Delete => "delete",
        ActionKind::Toggle { enabled: true } => "pause",
        ActionKind::Toggle { enabled: false } => "resume",
        ActionKind::Manage => "manage",
        ActionKind::Restore => "restore",
    }
}

pub fn schedule_state_label(enabled: bool) -> &'static str {
    if enabled { "Enabled" } else { "Disabled" }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Row {
    /// Stands in for an empty collection and spans every column
    Placeholder { text: String, span: usize },
    Item { id: String, cells: Vec<Cell> },
}

impl Row {
    pub fn id(&self) -> Option<&str> {
        match self {
            Row::Item { id, .. } => Some(id),
            Row::Placeholder { .. } => None,
        }
    }

    /// The row's action of the given kind, if it has one.
    pub fn action(&self, matches: impl Fn(ActionKind) -> bool) -> Option<RowAction> {
        match self {
            Row::Item { cells, .. } => cells.iter().find_map(|cell| match cell {
                Cell::Actions(actions) => actions.iter().copied().find(|a| matches(a.kind)),
                _ => None,
            }),
            Row::Placeholder { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub title: &'static str,
    pub columns: Vec<&'static str>,
    pub rows: Vec<Row>,
}

impl TableView {
    fn build<T>(
        title: &'static str,
        columns: Vec<&'static str>,
        empty_text: &str,
        items: &[T],
        row: impl Fn(&T) -> Row,
    ) -> Self {
        let rows = if items.is_empty() {
            vec![Row::Placeholder {
                text: empty_text.to_string(),
                span: columns.len(),
            }]
        } else {
            items.iter().map(row).collect()
        };
        Self {
            title,
            columns,
            rows,
        }
    }

    /// Ids of item rows, in display order.
    pub fn item_ids(&self) -> Vec<&str> {
        self.rows.iter().filter_map(Row::id).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| matches!(r, Row::Placeholder { .. }))
    }
}

fn display_name(name: Option<&str>) -> String {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(UNNAMED)
        .to_string()
}

fn badge(status: &str, marker: bool) -> Cell {
    Cell::Badge {
        text: status.to_string(),
        severity: status_severity(status),
        marker,
    }
}

/// Render a backend timestamp in local time.
///
/// RFC 3339 values are converted to the local zone; naive ISO values are
/// taken as already local. Missing values read `unknown`, unparseable ones
/// are shown as sent.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return UNKNOWN.to_string();
    };

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return naive.format(TIMESTAMP_FORMAT).to_string();
        }
    }
    raw.to_string()
}

pub fn weekday_name(day: u8) -> Option<&'static str> {
    usize::from(day)
        .checked_sub(1)
        .and_then(|i| WEEKDAY_NAMES.get(i).copied())
}

/// Human-readable cadence: `Daily 02:00`, `Weekly 02:00` or `Weekly (Mon, Thu) 02:00`.
pub fn schedule_cadence(schedule: &Schedule) -> String {
    match schedule.schedule_type {
        ScheduleType::Daily => format!("Daily {}", schedule.schedule_time),
        ScheduleType::Weekly => {
            let days: Vec<&str> = schedule
                .weekdays
                .iter()
                .filter_map(|d| weekday_name(*d))
                .collect();
            if days.is_empty() {
                format!("Weekly {}", schedule.schedule_time)
            } else {
                format!("Weekly ({}) {}", days.join(", "), schedule.schedule_time)
            }
        }
    }
}

fn size_gb(size: Option<u64>, missing: &str) -> String {
    size.map(|s| format!("{} GB", s))
        .unwrap_or_else(|| missing.to_string())
}

pub fn volumes_table(state: &AppState) -> TableView {
    TableView::build(
        "Volumes",
        vec!["", "ID", "Name", "Size", "Status", "Created"],
        "No volumes",
        &state.volumes,
        |volume: &Volume| Row::Item {
            id: volume.id.clone(),
            cells: vec![
                Cell::Checkbox {
                    checked: volume.backupable && state.is_selected(&volume.id),
                    enabled: volume.backupable,
                },
                Cell::Code(volume.id.clone()),
                Cell::Text(display_name(volume.name.as_deref())),
                Cell::Text(size_gb(volume.size, UNKNOWN)),
                badge(&volume.status, volume.backupable),
                Cell::Text(format_timestamp(volume.created_at.as_deref())),
            ],
        },
    )
}

const BACKUP_COLUMNS: [&str; 7] = ["ID", "Name", "Volume", "Size", "Status", "Created", "Actions"];

fn backup_row(backup: &Backup) -> Row {
    let available = backup.status == "available";
    Row::Item {
        id: backup.id.clone(),
        cells: vec![
            Cell::Code(backup.id.clone()),
            Cell::Text(display_name(backup.name.as_deref())),
            Cell::Code(backup.volume_id.clone().unwrap_or_else(|| UNKNOWN.to_string())),
            Cell::Text(size_gb(backup.size, UNKNOWN)),
            badge(&backup.status, false),
            Cell::Text(format_timestamp(backup.created_at.as_deref())),
            Cell::Actions(vec![
                RowAction::new(ActionKind::Restore, available),
                RowAction::new(ActionKind::Delete, available),
            ]),
        ],
    }
}

/// Split backups by kind. Every backup lands in exactly one of the two lists.
pub fn partition_backups(backups: &[Backup]) -> (Vec<Backup>, Vec<Backup>) {
    backups
        .iter()
        .cloned()
        .partition(|b| b.kind() == BackupKind::Full)
}

/// Full and incremental backup tables.
pub fn backup_tables(state: &AppState) -> (TableView, TableView) {
    let (full, incremental) = partition_backups(&state.backups);
    (
        TableView::build(
            "Full Backups",
            BACKUP_COLUMNS.to_vec(),
            "No full backups",
            &full,
            backup_row,
        ),
        TableView::build(
            "Incremental Backups",
            BACKUP_COLUMNS.to_vec(),
            "No incremental backups",
            &incremental,
            backup_row,
        ),
    )
}

pub fn full_backups_table(state: &AppState) -> TableView {
    backup_tables(state).0
}

pub fn incremental_backups_table(state: &AppState) -> TableView {
    backup_tables(state).1
}

pub fn schedules_table(state: &AppState) -> TableView {
    TableView::build(
        "Schedules",
        vec!["Name", "Type", "Volumes", "Cadence", "State", "Created", "Actions"],
        "No schedules",
        &state.schedules,
        |schedule: &Schedule| Row::Item {
            id: schedule.id.clone(),
            cells: vec![
                Cell::Text(display_name(schedule.name.as_deref())),
                Cell::Text(format!("{} backup", schedule.backup_type.label())),
                Cell::Text(schedule.volume_ids.len().to_string()),
                Cell::Text(schedule_cadence(schedule)),
                Cell::ScheduleState {
                    enabled: schedule.enabled,
                },
                Cell::Text(format_timestamp(schedule.created_at.as_deref())),
                Cell::Actions(vec![
                    RowAction::new(
                        ActionKind::Toggle {
                            enabled: schedule.enabled,
                        },
                        true,
                    ),
                    RowAction::new(ActionKind::Manage, true),
                    RowAction::new(ActionKind::Delete, true),
                ]),
            ],
        },
    )
}

fn snapshot_actions() -> Cell {
    Cell::Actions(vec![RowAction::new(ActionKind::Delete, true)])
}

pub fn server_snapshots_table(state: &AppState) -> TableView {
    TableView::build(
        "Server Snapshots",
        vec!["ID", "Name", "Server", "Size", "Status", "Created", "Actions"],
        "No server snapshots",
        &state.server_snapshots,
        |snapshot| Row::Item {
            id: snapshot.id.clone(),
            cells: vec![
                Cell::Code(snapshot.id.clone()),
                Cell::Text(display_name(snapshot.name.as_deref())),
                Cell::Code(snapshot.server_id.clone().unwrap_or_else(|| UNKNOWN.to_string())),
                // Image size as reported, no unit
                Cell::Text(snapshot.size.unwrap_or(0).to_string()),
                badge(&snapshot.status, false),
                Cell::Text(format_timestamp(snapshot.created_at.as_deref())),
                snapshot_actions(),
            ],
        },
    )
}

pub fn volume_snapshots_table(state: &AppState) -> TableView {
    TableView::build(
        "Volume Snapshots",
        vec!["ID", "Name", "Volume", "Size", "Status", "Created", "Actions"],
        "No volume snapshots",
        &state.volume_snapshots,
        |snapshot| Row::Item {
            id: snapshot.id.clone(),
            cells: vec![
                Cell::Code(snapshot.id.clone()),
                Cell::Text(display_name(snapshot.name.as_deref())),
                Cell::Code(snapshot.volume_id.clone().unwrap_or_else(|| UNKNOWN.to_string())),
                Cell::Text(size_gb(Some(snapshot.size.unwrap_or(0)), "0")),
                badge(&snapshot.status, false),
                Cell::Text(format_timestamp(snapshot.created_at.as_deref())),
                snapshot_actions(),
            ],
        },
    )
}

pub fn servers_table(state: &AppState) -> TableView {
    TableView::build(
        "Servers",
        vec!["ID", "Name", "Status"],
        "No servers",
        &state.servers,
        |server| Row::Item {
            id: server.id.clone(),
            cells: vec![
                Cell::Code(server.id.clone()),
                Cell::Text(display_name(server.name.as_deref())),
                badge(&server.status, false),
            ],
        },
    )
}

/// One checkable entry in a form picker.
#[derive(Debug, Clone, PartialEq)]
pub struct PickerItem {
    pub id: String,
    pub label: String,
}

fn volume_label(volume: &Volume) -> String {
    format!(
        "{} ({}) - {} - {}",
        display_name(volume.name.as_deref()),
        volume.id,
        size_gb(volume.size, UNKNOWN),
        volume.status
    )
}

/// Volumes a new schedule may cover: backupable ones only.
pub fn schedule_volume_picker(state: &AppState) -> Vec<PickerItem> {
    state
        .volumes
        .iter()
        .filter(|v| v.backupable)
        .map(|v| PickerItem {
            id: v.id.clone(),
            label: volume_label(v),
        })
        .collect()
}

/// Current members of a schedule and the volumes that could be added.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipView {
    pub current: Vec<PickerItem>,
    pub available: Vec<PickerItem>,
}

pub fn schedule_membership(state: &AppState, schedule_id: &str) -> Option<MembershipView> {
    let schedule = state.schedule(schedule_id)?;

    // Members the volume list no longer knows stay removable.
    let current = schedule
        .volume_ids
        .iter()
        .map(|id| PickerItem {
            id: id.clone(),
            label: state
                .volume(id)
                .map(volume_label)
                .unwrap_or_else(|| format!("{} (unknown volume)", id)),
        })
        .collect();

    let available = state
        .volumes
        .iter()
        .filter(|v| v.backupable && !schedule.volume_ids.contains(&v.id))
        .map(|v| PickerItem {
            id: v.id.clone(),
            label: volume_label(v),
        })
        .collect();

    Some(MembershipView { current, available })
}

/// A volume row in the per-volume cleanup form.
#[derive(Debug, Clone, PartialEq)]
pub struct PolicyEntry {
    pub volume_id: String,
    pub label: String,
    pub backup_count: usize,
    pub default_days: u32,
}

/// Volumes owning at least one backup, in order of first appearance.
pub fn cleanup_policy_entries(state: &AppState) -> Vec<PolicyEntry> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for backup in &state.backups {
        let Some(volume_id) = backup.volume_id.as_deref() else {
            continue;
        };
        let count = counts.entry(volume_id).or_insert(0);
        if *count == 0 {
            order.push(volume_id);
        }
        *count += 1;
    }

    order
        .into_iter()
        .map(|volume_id| {
            let name = match state.volume(volume_id) {
                Some(v) => display_name(v.name.as_deref()),
                None => UNKNOWN.to_string(),
            };
            PolicyEntry {
                volume_id: volume_id.to_string(),
                label: format!("{} ({})", name, volume_id),
                backup_count: counts.get(volume_id).copied().unwrap_or(0),
                default_days: DEFAULT_RETENTION_DAYS,
            }
        })
        .collect()
}

pub fn server_picker(state: &AppState) -> Vec<PickerItem> {
    state
        .servers
        .iter()
        .map(|s| PickerItem {
            id: s.id.clone(),
            label: format!(
                "{} ({}) - {}",
                display_name(s.name.as_deref()),
                s.id,
                s.status
            ),
        })
        .collect()
}

/// Volumes offered for snapshot creation: every volume.
pub fn volume_snapshot_picker(state: &AppState) -> Vec<PickerItem> {
    state
        .volumes
        .iter()
        .map(|v| PickerItem {
            id: v.id.clone(),
            label: volume_label(v),
        })
        .collect()
}
