//! Modal forms that collect command input.
//!
//! A form is a flat list of fields. Submitting turns the field values into
//! one or more [`Command`]s; validation happens when the command is prepared.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use crate::api::models::{BackupKind, ScheduleType};
use crate::dashboard::commands::{CleanupMode, Command, Modal, SnapshotTarget};
use crate::dashboard::render::{MembershipView, PickerItem, PolicyEntry, weekday_name};
use crate::dashboard::validate::DEFAULT_RETENTION_DAYS;

use super::app::Action;
use super::ui::centered_rect;

/// Result of feeding an action to a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Continue,
    Cancel,
    Submit,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Text(String),
    Toggle(bool),
    Choice {
        options: Vec<&'static str>,
        selected: usize,
    },
    Heading,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub key: String,
    pub label: String,
    pub kind: FieldKind,
}

impl Field {
    fn text(key: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: FieldKind::Text(value.into()),
        }
    }

    fn toggle(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind: FieldKind::Toggle(false),
        }
    }

    fn choice(key: &str, label: &str, options: Vec<&'static str>) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind: FieldKind::Choice {
                options,
                selected: 0,
            },
        }
    }

    fn heading(label: impl Into<String>) -> Self {
        Self {
            key: String::new(),
            label: label.into(),
            kind: FieldKind::Heading,
        }
    }

    fn focusable(&self) -> bool {
        !matches!(self.kind, FieldKind::Heading)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormKind {
    BackupName(BackupKind),
    Restore { backup_id: String },
    CleanupBackups,
    CreateSchedule,
    ScheduleVolumes { schedule_id: String },
    ServerSnapshot,
    VolumeSnapshot,
    SnapshotCleanup,
}

impl FormKind {
    /// The command modal this form stands for.
    pub fn modal(&self) -> Modal {
        match self {
            FormKind::BackupName(_) => Modal::BackupName,
            FormKind::Restore { .. } => Modal::RestoreBackup,
            FormKind::CleanupBackups => Modal::CleanupBackups,
            FormKind::CreateSchedule => Modal::CreateSchedule,
            FormKind::ScheduleVolumes { .. } => Modal::ScheduleVolumes,
            FormKind::ServerSnapshot => Modal::CreateServerSnapshot,
            FormKind::VolumeSnapshot => Modal::CreateVolumeSnapshot,
            FormKind::SnapshotCleanup => Modal::CleanupSnapshots,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Form {
    pub kind: FormKind,
    pub title: String,
    pub fields: Vec<Field>,
    focus: usize,
    pub error: Option<String>,
}

impl Form {
    fn new(kind: FormKind, title: impl Into<String>, fields: Vec<Field>) -> Self {
        let focus = fields.iter().position(Field::focusable).unwrap_or(0);
        Self {
            kind,
            title: title.into(),
            fields,
            focus,
            error: None,
        }
    }

    pub fn backup_name(kind: BackupKind, selected: usize) -> Self {
        Self::new(
            FormKind::BackupName(kind),
            format!("Create {} backup ({} volumes)", kind.as_str(), selected),
            vec![Field::text("name", "Backup name (optional)", "")],
        )
    }

    pub fn restore(backup_id: &str) -> Self {
        Self::new(
            FormKind::Restore {
                backup_id: backup_id.to_string(),
            },
            format!("Restore backup {}", backup_id),
            vec![
                Field::text("volume_id", "Target volume id (empty for new volume)", ""),
                Field::text("name", "New volume name (optional)", ""),
            ],
        )
    }

    pub fn cleanup_backups(entries: &[PolicyEntry]) -> Self {
        let mut fields = vec![
            Field::choice("mode", "Mode", vec!["All volumes", "Per volume"]),
            Field::text("days", "Retention days", DEFAULT_RETENTION_DAYS.to_string()),
            Field::heading("Per-volume retention days"),
        ];
        if entries.is_empty() {
            fields.push(Field::heading("  No volumes with backups"));
        }
        fields.extend(entries.iter().map(|entry| {
            Field::text(
                format!("days:{}", entry.volume_id),
                format!("{} - {} backups", entry.label, entry.backup_count),
                entry.default_days.to_string(),
            )
        }));
        Self::new(FormKind::CleanupBackups, "Clean up backups", fields)
    }

    pub fn create_schedule(volumes: &[PickerItem]) -> Self {
        let mut fields = vec![
            Field::text("name", "Name", ""),
            Field::choice("backup_type", "Backup type", vec!["Full", "Incremental"]),
            Field::choice("schedule_type", "Repeat", vec!["Daily", "Weekly"]),
            Field::text("time", "Time (HH:MM)", "02:00"),
            Field::heading("Weekdays (weekly only)"),
        ];
        fields.extend((1..=7u8).filter_map(|day| {
            weekday_name(day).map(|name| Field::toggle(format!("weekday:{}", day), name))
        }));
        fields.push(Field::heading("Volumes"));
        push_picker(&mut fields, "volume", volumes, "  No backupable volumes");
        Self::new(FormKind::CreateSchedule, "Create schedule", fields)
    }

    pub fn schedule_volumes(schedule_id: &str, view: &MembershipView) -> Self {
        let mut fields = vec![Field::heading("Current volumes (check to remove)")];
        push_picker(&mut fields, "remove", &view.current, "  None");
        fields.push(Field::heading("Available volumes (check to add)"));
        push_picker(&mut fields, "add", &view.available, "  None");
        Self::new(
            FormKind::ScheduleVolumes {
                schedule_id: schedule_id.to_string(),
            },
            format!("Manage volumes of schedule {}", schedule_id),
            fields,
        )
    }

    pub fn server_snapshot(servers: &[PickerItem]) -> Self {
        let mut fields = vec![
            Field::text("name", "Snapshot name", ""),
            Field::text("description", "Description", ""),
            Field::heading("Servers"),
        ];
        push_picker(&mut fields, "server", servers, "  No servers");
        Self::new(FormKind::ServerSnapshot, "Create server snapshot", fields)
    }

    pub fn volume_snapshot(volumes: &[PickerItem]) -> Self {
        let mut fields = vec![
            Field::text("name", "Snapshot name", ""),
            Field::text("description", "Description", ""),
            Field::toggle("force", "Force (allow in-use volumes)"),
            Field::heading("Volumes"),
        ];
        push_picker(&mut fields, "volume", volumes, "  No volumes");
        Self::new(FormKind::VolumeSnapshot, "Create volume snapshot", fields)
    }

    pub fn snapshot_cleanup(target: SnapshotTarget) -> Self {
        let mut form = Self::new(
            FormKind::SnapshotCleanup,
            "Clean up snapshots",
            vec![
                Field::choice("target", "Snapshots", vec!["Server", "Volume"]),
                Field::text("days", "Retention days", DEFAULT_RETENTION_DAYS.to_string()),
            ],
        );
        if target == SnapshotTarget::Volume {
            form.set_choice("target", 1);
        }
        form
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    fn field(&self, key: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn text(&self, key: &str) -> &str {
        match self.field(key).map(|f| &f.kind) {
            Some(FieldKind::Text(value)) => value,
            _ => "",
        }
    }

    pub fn set_text(&mut self, key: &str, value: &str) {
        if let Some(FieldKind::Text(text)) = self
            .fields
            .iter_mut()
            .find(|f| f.key == key)
            .map(|f| &mut f.kind)
        {
            *text = value.to_string();
        }
    }

    pub fn choice(&self, key: &str) -> usize {
        match self.field(key).map(|f| &f.kind) {
            Some(FieldKind::Choice { selected, .. }) => *selected,
            _ => 0,
        }
    }

    pub fn set_choice(&mut self, key: &str, index: usize) {
        if let Some(FieldKind::Choice { options, selected }) = self
            .fields
            .iter_mut()
            .find(|f| f.key == key)
            .map(|f| &mut f.kind)
        {
            if index < options.len() {
                *selected = index;
            }
        }
    }

    pub fn checked(&self, key: &str) -> bool {
        matches!(self.field(key).map(|f| &f.kind), Some(FieldKind::Toggle(true)))
    }

    pub fn set_checked(&mut self, key: &str, value: bool) {
        if let Some(FieldKind::Toggle(checked)) = self
            .fields
            .iter_mut()
            .find(|f| f.key == key)
            .map(|f| &mut f.kind)
        {
            *checked = value;
        }
    }

    /// Ids of checked toggles whose key is `<prefix>:<id>`.
    pub fn checked_ids(&self, prefix: &str) -> Vec<String> {
        self.fields
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Toggle(true)))
            .filter_map(|f| f.key.strip_prefix(prefix)?.strip_prefix(':'))
            .map(str::to_string)
            .collect()
    }

    /// `(id, text)` of every text field whose key is `<prefix>:<id>`.
    fn texts_with_prefix(&self, prefix: &str) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|f| {
                let id = f.key.strip_prefix(prefix)?.strip_prefix(':')?;
                match &f.kind {
                    FieldKind::Text(value) => Some((id.to_string(), value.clone())),
                    _ => None,
                }
            })
            .collect()
    }

    /// Commands this form submits, in order.
    pub fn commands(&self) -> Vec<Command> {
        match &self.kind {
            FormKind::BackupName(kind) => vec![Command::CreateBackup {
                kind: *kind,
                name: Some(self.text("name").to_string()),
            }],
            FormKind::Restore { backup_id } => vec![Command::RestoreBackup {
                backup_id: backup_id.clone(),
                volume_id: Some(self.text("volume_id").to_string()),
                name: Some(self.text("name").to_string()),
            }],
            FormKind::CleanupBackups => {
                let mode = if self.choice("mode") == 0 {
                    CleanupMode::Global {
                        retention_days: self.text("days").to_string(),
                    }
                } else {
                    CleanupMode::PerVolume {
                        entries: self.texts_with_prefix("days"),
                    }
                };
                vec![Command::CleanupBackups(mode)]
            }
            FormKind::CreateSchedule => {
                let weekdays = self
                    .checked_ids("weekday")
                    .iter()
                    .filter_map(|d| d.parse().ok())
                    .collect();
                vec![Command::CreateSchedule {
                    name: self.text("name").to_string(),
                    backup_type: if self.choice("backup_type") == 0 {
                        BackupKind::Full
                    } else {
                        BackupKind::Incremental
                    },
                    schedule_type: if self.choice("schedule_type") == 0 {
                        ScheduleType::Daily
                    } else {
                        ScheduleType::Weekly
                    },
                    schedule_time: self.text("time").to_string(),
                    weekdays,
                    volume_ids: self.checked_ids("volume"),
                }]
            }
            FormKind::ScheduleVolumes { schedule_id } => {
                let add = self.checked_ids("add");
                let remove = self.checked_ids("remove");
                let mut commands = Vec::new();
                if !remove.is_empty() {
                    commands.push(Command::RemoveScheduleVolumes {
                        schedule_id: schedule_id.clone(),
                        volume_ids: remove,
                    });
                }
                // Nothing checked still yields an add so validation can say so.
                if !add.is_empty() || commands.is_empty() {
                    commands.push(Command::AddScheduleVolumes {
                        schedule_id: schedule_id.clone(),
                        volume_ids: add,
                    });
                }
                commands
            }
            FormKind::ServerSnapshot => vec![Command::CreateServerSnapshot {
                server_ids: self.checked_ids("server"),
                name: self.text("name").to_string(),
                description: self.text("description").to_string(),
            }],
            FormKind::VolumeSnapshot => vec![Command::CreateVolumeSnapshot {
                volume_ids: self.checked_ids("volume"),
                name: self.text("name").to_string(),
                description: self.text("description").to_string(),
                force: self.checked("force"),
            }],
            FormKind::SnapshotCleanup => vec![Command::CleanupSnapshots {
                target: if self.choice("target") == 0 {
                    SnapshotTarget::Server
                } else {
                    SnapshotTarget::Volume
                },
                retention_days: self.text("days").to_string(),
            }],
        }
    }

    fn move_focus(&mut self, forward: bool) {
        let len = self.fields.len();
        if len == 0 {
            return;
        }
        let mut index = self.focus;
        for _ in 0..len {
            index = if forward {
                (index + 1) % len
            } else {
                (index + len - 1) % len
            };
            if self.fields[index].focusable() {
                self.focus = index;
                return;
            }
        }
    }

    pub fn handle(&mut self, action: Action) -> FormAction {
        match action {
            Action::Back => return FormAction::Cancel,
            Action::Submit => return FormAction::Submit,
            Action::Down => self.move_focus(true),
            Action::Up => self.move_focus(false),
            _ => {}
        }

        let Some(field) = self.fields.get_mut(self.focus) else {
            return FormAction::Continue;
        };
        match (&mut field.kind, action) {
            (FieldKind::Text(value), Action::Char(c)) => value.push(c),
            (FieldKind::Text(value), Action::Backspace) => {
                value.pop();
            }
            (FieldKind::Toggle(checked), Action::Char(' ')) => *checked = !*checked,
            (FieldKind::Choice { options, selected }, Action::Right | Action::Char(' ')) => {
                *selected = (*selected + 1) % options.len().max(1);
            }
            (FieldKind::Choice { options, selected }, Action::Left) => {
                let len = options.len().max(1);
                *selected = (*selected + len - 1) % len;
            }
            _ => {}
        }
        FormAction::Continue
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let area = centered_rect(70, 80, area);
        frame.render_widget(Clear, area);

        let mut lines: Vec<Line> = Vec::with_capacity(self.fields.len() + 4);
        for (i, field) in self.fields.iter().enumerate() {
            let focused = i == self.focus;
            let style = if focused {
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let marker = if focused { "> " } else { "  " };

            let line = match &field.kind {
                FieldKind::Heading => Line::from(Span::styled(
                    field.label.clone(),
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )),
                FieldKind::Text(value) => Line::from(vec![
                    Span::raw(marker),
                    Span::styled(format!("{}: ", field.label), Style::default().fg(Color::Cyan)),
                    Span::styled(
                        if focused { format!("{}_", value) } else { value.clone() },
                        style,
                    ),
                ]),
                FieldKind::Toggle(checked) => Line::from(vec![
                    Span::raw(marker),
                    Span::styled(
                        format!("[{}] {}", if *checked { "x" } else { " " }, field.label),
                        style,
                    ),
                ]),
                FieldKind::Choice { options, selected } => Line::from(vec![
                    Span::raw(marker),
                    Span::styled(format!("{}: ", field.label), Style::default().fg(Color::Cyan)),
                    Span::styled(
                        format!("< {} >", options.get(*selected).copied().unwrap_or("-")),
                        style,
                    ),
                ]),
            };
            lines.push(line);
        }

        lines.push(Line::from(""));
        if let Some(error) = &self.error {
            lines.push(Line::from(Span::styled(
                format!("  {}", error),
                Style::default().fg(Color::Red),
            )));
        }
        lines.push(Line::from(Span::styled(
            "  [↑↓] Field  [Space] Toggle  [←→] Choose  [Enter] Submit  [Esc] Cancel",
            Style::default().fg(Color::DarkGray),
        )));

        let block = Block::default()
            .title(self.title.clone())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false })
            .scroll((self.scroll_offset(area.height), 0));
        frame.render_widget(paragraph, area);
    }

    /// Keep the focused field visible in a box of `height` rows.
    fn scroll_offset(&self, height: u16) -> u16 {
        let visible = usize::from(height.saturating_sub(2)).max(1);
        let offset = (self.focus + 1).saturating_sub(visible);
        u16::try_from(offset).unwrap_or(u16::MAX)
    }
}

fn push_picker(fields: &mut Vec<Field>, prefix: &str, items: &[PickerItem], empty: &str) {
    if items.is_empty() {
        fields.push(Field::heading(empty));
        return;
    }
    fields.extend(
        items
            .iter()
            .map(|item| Field::toggle(format!("{}:{}", prefix, item.id), item.label.clone())),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picker(ids: &[&str]) -> Vec<PickerItem> {
        ids.iter()
            .map(|id| PickerItem {
                id: id.to_string(),
                label: format!("disk-{}", id),
            })
            .collect()
    }

    fn type_text(form: &mut Form, text: &str) {
        for c in text.chars() {
            form.handle(Action::Char(c));
        }
    }

    #[test]
    fn test_focus_skips_headings() {
        let mut form = Form::server_snapshot(&picker(&["srv1"]));
        assert_eq!(form.focus(), 0);

        form.handle(Action::Down);
        form.handle(Action::Down);
        // Heading "Servers" is skipped.
        assert_eq!(form.fields[form.focus()].key, "server:srv1");

        form.handle(Action::Down);
        assert_eq!(form.focus(), 0);
    }

    #[test]
    fn test_text_editing_and_submit() {
        let mut form = Form::backup_name(BackupKind::Incremental, 2);
        type_text(&mut form, "nightly!");
        form.handle(Action::Backspace);

        assert_eq!(form.handle(Action::Submit), FormAction::Submit);
        assert_eq!(
            form.commands(),
            vec![Command::CreateBackup {
                kind: BackupKind::Incremental,
                name: Some("nightly".into()),
            }]
        );
        assert_eq!(form.handle(Action::Back), FormAction::Cancel);
    }

    #[test]
    fn test_schedule_form_collects_checked_items() {
        let mut form = Form::create_schedule(&picker(&["v1", "v2"]));
        form.set_text("name", "weekly");
        form.set_choice("schedule_type", 1);
        form.set_checked("weekday:1", true);
        form.set_checked("weekday:5", true);
        form.set_checked("volume:v2", true);

        match form.commands().remove(0) {
            Command::CreateSchedule {
                name,
                schedule_type,
                weekdays,
                volume_ids,
                schedule_time,
                ..
            } => {
                assert_eq!(name, "weekly");
                assert_eq!(schedule_type, ScheduleType::Weekly);
                assert_eq!(weekdays, vec![1, 5]);
                assert_eq!(volume_ids, vec!["v2"]);
                assert_eq!(schedule_time, "02:00");
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_space_toggles_focused_checkbox() {
        let mut form = Form::volume_snapshot(&picker(&["v1"]));
        form.handle(Action::Down);
        form.handle(Action::Down);
        form.handle(Action::Char(' '));

        assert!(form.checked("force"));
        form.handle(Action::Down);
        form.handle(Action::Char(' '));
        assert_eq!(form.checked_ids("volume"), vec!["v1"]);
    }

    #[test]
    fn test_cleanup_form_modes() {
        let entries = vec![PolicyEntry {
            volume_id: "v1".into(),
            label: "disk (v1)".into(),
            backup_count: 3,
            default_days: 30,
        }];
        let mut form = Form::cleanup_backups(&entries);
        assert_eq!(
            form.commands(),
            vec![Command::CleanupBackups(CleanupMode::Global {
                retention_days: "30".into()
            })]
        );

        form.handle(Action::Right);
        form.set_text("days:v1", "7");
        assert_eq!(
            form.commands(),
            vec![Command::CleanupBackups(CleanupMode::PerVolume {
                entries: vec![("v1".into(), "7".into())]
            })]
        );
    }

    #[test]
    fn test_membership_form_splits_add_and_remove() {
        let view = MembershipView {
            current: picker(&["v1"]),
            available: picker(&["v2"]),
        };
        let mut form = Form::schedule_volumes("s1", &view);
        assert_eq!(
            form.commands(),
            vec![Command::AddScheduleVolumes {
                schedule_id: "s1".into(),
                volume_ids: vec![]
            }]
        );

        form.set_checked("remove:v1", true);
        form.set_checked("add:v2", true);
        let commands = form.commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], Command::RemoveScheduleVolumes { .. }));
        assert!(matches!(commands[1], Command::AddScheduleVolumes { .. }));
    }

    #[test]
    fn test_snapshot_cleanup_target() {
        let form = Form::snapshot_cleanup(SnapshotTarget::Volume);
        assert_eq!(
            form.commands(),
            vec![Command::CleanupSnapshots {
                target: SnapshotTarget::Volume,
                retention_days: "30".into()
            }]
        );
    }
}
