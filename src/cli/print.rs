//! Plain-text output for the one-shot subcommands.

use tabled::builder::Builder;
use tabled::settings::Style;

use crate::api::{BackupExport, BackupStatus, SystemInfo};
use crate::dashboard::render::{self, Row, TableView};
use crate::dashboard::state::Banner;

/// Render a table as text. Empty tables print their placeholder.
pub fn format_table(view: &TableView) -> String {
    if view.is_empty() {
        let placeholder = view.rows.iter().find_map(|row| match row {
            Row::Placeholder { text, .. } => Some(text.as_str()),
            Row::Item { .. } => None,
        });
        return format!(
            "{}\n  {}\n",
            view.title,
            placeholder.unwrap_or("Nothing to show")
        );
    }

    // Skip blank headers (checkbox and action columns)
    let keep: Vec<usize> = (0..view.columns.len())
        .filter(|&i| !view.columns[i].is_empty())
        .collect();

    let mut builder = Builder::default();
    builder.push_record(keep.iter().map(|&i| view.columns[i].to_string()));
    for row in &view.rows {
        if let Row::Item { cells, .. } = row {
            builder.push_record(
                keep.iter()
                    .map(|&i| cells.get(i).map(|c| c.text()).unwrap_or_default()),
            );
        }
    }

    let mut table = builder.build();
    table.with(Style::modern());
    format!("{}\n{}\n", view.title, table)
}

pub fn format_banner(banner: &Banner) -> String {
    let symbol = match banner {
        Banner::Pending => "•",
        Banner::Healthy { .. } => "✓",
        Banner::Unhealthy { .. } => "✗",
    };
    format!("{} {}", symbol, banner.headline())
}

/// Summary lines for `/api/info`, shared with the terminal UI.
pub fn system_info_lines(info: &SystemInfo) -> Vec<String> {
    let days = |d: Option<u64>| d.map(|d| format!("{} days", d)).unwrap_or_else(|| "-".into());
    let v = &info.volume_stats;
    let b = &info.backup_stats;
    vec![
        format!(
            "OpenStack: {}",
            info.openstack_version.as_deref().unwrap_or("unknown")
        ),
        format!(
            "Volumes: {} total, {} available, {} in use, {} error",
            v.total, v.available, v.in_use, v.error
        ),
        format!(
            "Backups: {} total ({} full, {} incremental), {} available, {} creating, {} error",
            b.total, b.full, b.incremental, b.available, b.creating, b.error
        ),
        format!(
            "Retention: full {}, incremental {}",
            days(info.retention_policy.full_backup_retention),
            days(info.retention_policy.incremental_backup_retention)
        ),
    ]
}

/// Lines for `backup status`.
pub fn backup_status_lines(backup: &BackupStatus) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Backup {} ({})",
            backup.id,
            backup.name.as_deref().filter(|n| !n.is_empty()).unwrap_or("unnamed")
        ),
        format!("Status: {}", backup.status),
        format!("Type: {}", backup.kind()),
        format!(
            "Size: {}",
            backup
                .size
                .map(|s| format!("{} GB", s))
                .unwrap_or_else(|| "-".into())
        ),
        format!(
            "Created: {}",
            render::format_timestamp(backup.created_at.as_deref())
        ),
    ];
    if let Some(description) = backup.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(format!("Description: {}", description));
    }
    if let Some(reason) = backup.fail_reason.as_deref().filter(|r| !r.is_empty()) {
        lines.push(format!("Failure: {}", reason));
    }
    lines
}

/// Lines for `backup export`, in the flag form `backup import` accepts.
pub fn export_lines(export: &BackupExport) -> Vec<String> {
    vec![
        format!("--backup-service {}", export.backup_service),
        format!("--backup-url {}", export.backup_url),
    ]
}
