//! Input validation for commands. Failures never reach the network.

use std::collections::BTreeMap;

use chrono::NaiveTime;
use thiserror::Error;

/// Smallest accepted retention threshold, in days.
pub const MIN_RETENTION_DAYS: u32 = 1;
/// Largest accepted retention threshold, in days.
pub const MAX_RETENTION_DAYS: u32 = 365;
/// Pre-filled retention value for cleanup forms.
pub const DEFAULT_RETENTION_DAYS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Select at least one backupable volume first")]
    NoVolumesSelected,
    #[error("Select at least one server first")]
    NoServersSelected,
    #[error("Select at least one weekday for a weekly schedule")]
    NoWeekdays,
    #[error("Weekday {0} is out of range (1 = Monday .. 7 = Sunday)")]
    InvalidWeekday(u8),
    #[error("Schedule time '{0}' is not a valid HH:MM time")]
    InvalidScheduleTime(String),
    #[error("Enter a valid retention period (1-365 days), got '{0}'")]
    InvalidRetentionDays(String),
    #[error("Set a valid retention period (1-365 days) for at least one volume")]
    NoValidVolumePolicy,
    #[error("Volume {0} cannot be backed up in its current state")]
    NotBackupable(String),
    #[error("Volume {0} is not known to the dashboard")]
    UnknownVolume(String),
    #[error("Backup {0} is not known to the dashboard")]
    UnknownBackup(String),
    #[error("Backup {0} is not available")]
    BackupNotAvailable(String),
    #[error("An id is required")]
    MissingId,
    #[error("Both the backup service and the backup URL are required to import a backup")]
    IncompleteImportRecord,
}

/// Parse a retention threshold typed by the user.
///
/// The trimmed text must be an integer that fits `i64` and lies in
/// `MIN_RETENTION_DAYS..=MAX_RETENTION_DAYS`.
pub fn parse_retention_days(raw: &str) -> Result<u32, ValidationError> {
    let invalid = || ValidationError::InvalidRetentionDays(raw.trim().to_string());
    let days: i64 = raw.trim().parse().map_err(|_| invalid())?;
    if !(i64::from(MIN_RETENTION_DAYS)..=i64::from(MAX_RETENTION_DAYS)).contains(&days) {
        return Err(invalid());
    }
    u32::try_from(days).map_err(|_| invalid())
}

/// Build a per-volume retention map from `(volume_id, raw days)` entries.
///
/// Entries with an invalid day count are dropped silently; the map only has
/// to end up non-empty.
pub fn collect_volume_policies<'a, I>(entries: I) -> Result<BTreeMap<String, u32>, ValidationError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let policies: BTreeMap<String, u32> = entries
        .into_iter()
        .filter(|(volume_id, _)| !volume_id.trim().is_empty())
        .filter_map(|(volume_id, raw)| {
            parse_retention_days(raw)
                .ok()
                .map(|days| (volume_id.trim().to_string(), days))
        })
        .collect();

    if policies.is_empty() {
        return Err(ValidationError::NoValidVolumePolicy);
    }
    Ok(policies)
}

/// Normalize a schedule time to zero-padded `HH:MM`.
pub fn parse_schedule_time(raw: &str) -> Result<String, ValidationError> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M")
        .map_err(|_| ValidationError::InvalidScheduleTime(raw.trim().to_string()))?;
    Ok(time.format("%H:%M").to_string())
}

/// Deduplicate and range-check ISO weekdays, returning them sorted.
pub fn normalize_weekdays(weekdays: &[u8]) -> Result<Vec<u8>, ValidationError> {
    if let Some(bad) = weekdays.iter().find(|d| !(1..=7).contains(*d)) {
        return Err(ValidationError::InvalidWeekday(*bad));
    }
    let mut days = weekdays.to_vec();
    days.sort_unstable();
    days.dedup();
    Ok(days)
}

/// Trim an id and reject it when empty.
pub fn require_id(id: &str) -> Result<String, ValidationError> {
    let id = id.trim();
    if id.is_empty() {
        return Err(ValidationError::MissingId);
    }
    Ok(id.to_string())
}

/// Trim ids, drop blanks and duplicates, keep first-seen order.
pub fn clean_ids<S: AsRef<str>>(ids: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(ids.len());
    for id in ids {
        let id = id.as_ref().trim();
        if !id.is_empty() && !out.iter().any(|seen| seen == id) {
            out.push(id.to_string());
        }
    }
    out
}
