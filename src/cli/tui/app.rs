//! TUI application state and logic.

use crate::api::models::BackupKind;
use crate::api::DashboardApi;
use crate::dashboard::commands::{Command, CommandOutcome, SnapshotTarget};
use crate::dashboard::render::{self, ActionKind, TableView};
use crate::dashboard::state::NoticeLevel;
use crate::dashboard::Dashboard;

use super::forms::{Form, FormAction};

/// Table shown in the content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Volumes,
    FullBackups,
    IncrementalBackups,
    Schedules,
    ServerSnapshots,
    VolumeSnapshots,
}

impl Tab {
    pub const ALL: [Tab; 6] = [
        Tab::Volumes,
        Tab::FullBackups,
        Tab::IncrementalBackups,
        Tab::Schedules,
        Tab::ServerSnapshots,
        Tab::VolumeSnapshots,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Volumes => "Volumes",
            Tab::FullBackups => "Full Backups",
            Tab::IncrementalBackups => "Incremental",
            Tab::Schedules => "Schedules",
            Tab::ServerSnapshots => "Server Snapshots",
            Tab::VolumeSnapshots => "Volume Snapshots",
        }
    }

    pub fn index(&self) -> usize {
        Tab::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    fn offset(&self, step: isize) -> Tab {
        let len = Tab::ALL.len() as isize;
        let index = (self.index() as isize + step).rem_euclid(len);
        Tab::ALL[index as usize]
    }
}

/// Popup drawn above everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum Dialog {
    Confirm {
        prompt: String,
        commands: Vec<Command>,
    },
    Message {
        level: NoticeLevel,
        title: String,
        text: String,
    },
    SystemInfo,
}

/// Actions that can be triggered by user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    Up,
    Down,
    Left,
    Right,
    NextTab,
    PrevTab,
    Back,
    Submit,
    Char(char),
    Backspace,
    Refresh,
    ToggleSelect,
    SelectAll,
    CreateBackup(BackupKind),
    NewSchedule,
    ToggleSchedule,
    ManageSchedule,
    Delete,
    Cleanup,
    NewSnapshot,
    Restore,
    ShowInfo,
}

/// Which key map applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Browse,
    Form,
    Confirm,
    Message,
}

/// Main TUI application state.
pub struct TuiApp<A> {
    pub dashboard: Dashboard<A>,
    pub server_url: String,
    pub tab: Tab,
    /// Cursor row per tab
    cursors: [usize; 6],
    pub form: Option<Form>,
    pub dialog: Option<Dialog>,
    pub running: bool,
}

impl<A: DashboardApi> TuiApp<A> {
    pub fn new(dashboard: Dashboard<A>, server_url: impl Into<String>) -> Self {
        Self {
            dashboard,
            server_url: server_url.into(),
            tab: Tab::Volumes,
            cursors: [0; 6],
            form: None,
            dialog: None,
            running: true,
        }
    }

    /// Initial health check and data fetch.
    pub async fn init(&mut self) {
        self.dashboard.start().await;
        // Statistics are optional; a failure is already logged.
        let _ = self.dashboard.load_system_info().await;
    }

    /// Run any refresh that has come due.
    pub async fn tick(&mut self) {
        if self.dashboard.tick().await.is_some() {
            self.clamp_cursor();
        }
    }

    pub fn input_mode(&self) -> InputMode {
        match (&self.dialog, &self.form) {
            (Some(Dialog::Confirm { .. }), _) => InputMode::Confirm,
            (Some(_), _) => InputMode::Message,
            (None, Some(_)) => InputMode::Form,
            (None, None) => InputMode::Browse,
        }
    }

    /// Table for the current tab.
    pub fn table(&self) -> TableView {
        table_for(self.tab, self.dashboard.state())
    }

    pub fn cursor(&self) -> usize {
        self.cursors[self.tab.index()]
    }

    fn set_cursor(&mut self, row: usize) {
        self.cursors[self.tab.index()] = row;
    }

    fn clamp_cursor(&mut self) {
        let rows = self.table().item_ids().len();
        let cursor = self.cursor().min(rows.saturating_sub(1));
        self.set_cursor(cursor);
    }

    /// Id of the row under the cursor.
    pub fn selected_id(&self) -> Option<String> {
        self.table()
            .item_ids()
            .get(self.cursor())
            .map(|id| id.to_string())
    }

    fn selected_action(&self, matches: impl Fn(ActionKind) -> bool) -> Option<(String, bool)> {
        let table = self.table();
        let id = table.item_ids().get(self.cursor())?.to_string();
        let row = table.rows.iter().find(|r| r.id() == Some(id.as_str()))?;
        let action = row.action(matches)?;
        Some((id, action.enabled))
    }

    fn show_message(&mut self, level: NoticeLevel, title: &str, text: impl Into<String>) {
        self.dialog = Some(Dialog::Message {
            level,
            title: title.to_string(),
            text: text.into(),
        });
    }

    /// Handle an action and update state accordingly.
    pub async fn handle_action(&mut self, action: Action) {
        if action == Action::Quit {
            self.dashboard.shutdown();
            self.running = false;
            return;
        }

        match self.input_mode() {
            InputMode::Confirm => self.handle_confirm(action).await,
            InputMode::Message => {
                if matches!(action, Action::Back | Action::Submit) {
                    self.dialog = None;
                }
            }
            InputMode::Form => self.handle_form(action).await,
            InputMode::Browse => self.handle_browse(action).await,
        }
    }

    async fn handle_confirm(&mut self, action: Action) {
        match action {
            Action::Submit | Action::Char('y') => {
                if let Some(Dialog::Confirm { commands, .. }) = self.dialog.take() {
                    self.execute(commands).await;
                }
            }
            Action::Back | Action::Char('n') => self.dialog = None,
            _ => {}
        }
    }

    async fn handle_form(&mut self, action: Action) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        match form.handle(action) {
            FormAction::Continue => {}
            FormAction::Cancel => self.form = None,
            FormAction::Submit => {
                let commands = form.commands();
                self.submit(commands).await;
            }
        }
    }

    async fn handle_browse(&mut self, action: Action) {
        match action {
            Action::Up => {
                let cursor = self.cursor().saturating_sub(1);
                self.set_cursor(cursor);
            }
            Action::Down => {
                let rows = self.table().item_ids().len();
                if self.cursor() + 1 < rows {
                    self.set_cursor(self.cursor() + 1);
                }
            }
            Action::NextTab | Action::Right => self.tab = self.tab.offset(1),
            Action::PrevTab | Action::Left => self.tab = self.tab.offset(-1),
            Action::Refresh => {
                self.dashboard.manual_refresh().await;
                let _ = self.dashboard.load_system_info().await;
                self.clamp_cursor();
            }
            Action::ToggleSelect => self.toggle_selected_volume(),
            Action::SelectAll => {
                let state = self.dashboard.state_mut();
                let checked = !state.all_volumes_selected();
                state.select_all_volumes(checked);
            }
            Action::CreateBackup(kind) => {
                let selected = self.dashboard.state().selected_volumes().len();
                if selected == 0 {
                    // Goes straight to validation, which rejects it with a warning.
                    self.submit(vec![Command::CreateBackup { kind, name: None }])
                        .await;
                } else {
                    self.form = Some(Form::backup_name(kind, selected));
                }
            }
            Action::NewSchedule => {
                let volumes = render::schedule_volume_picker(self.dashboard.state());
                self.form = Some(Form::create_schedule(&volumes));
            }
            Action::ToggleSchedule => {
                if self.tab == Tab::Schedules {
                    if let Some(id) = self.selected_id() {
                        self.submit(vec![Command::ToggleSchedule { schedule_id: id }])
                            .await;
                    }
                }
            }
            Action::ManageSchedule => {
                if self.tab == Tab::Schedules {
                    if let Some(id) = self.selected_id() {
                        if let Some(view) = render::schedule_membership(self.dashboard.state(), &id)
                        {
                            self.form = Some(Form::schedule_volumes(&id, &view));
                        }
                    }
                }
            }
            Action::Delete => self.delete_selected().await,
            Action::Cleanup => match self.tab {
                Tab::ServerSnapshots => {
                    self.form = Some(Form::snapshot_cleanup(SnapshotTarget::Server))
                }
                Tab::VolumeSnapshots => {
                    self.form = Some(Form::snapshot_cleanup(SnapshotTarget::Volume))
                }
                _ => {
                    let entries = render::cleanup_policy_entries(self.dashboard.state());
                    self.form = Some(Form::cleanup_backups(&entries));
                }
            },
            Action::NewSnapshot => match self.tab {
                Tab::ServerSnapshots => {
                    let servers = render::server_picker(self.dashboard.state());
                    self.form = Some(Form::server_snapshot(&servers));
                }
                _ => {
                    let volumes = render::volume_snapshot_picker(self.dashboard.state());
                    self.form = Some(Form::volume_snapshot(&volumes));
                }
            },
            Action::Restore => {
                if let Some((id, enabled)) =
                    self.selected_action(|k| k == ActionKind::Restore)
                {
                    if enabled {
                        self.form = Some(Form::restore(&id));
                    } else {
                        self.show_message(
                            NoticeLevel::Warning,
                            "Warning",
                            "Only available backups can be restored",
                        );
                    }
                }
            }
            Action::ShowInfo => self.dialog = Some(Dialog::SystemInfo),
            _ => {}
        }
    }

    fn toggle_selected_volume(&mut self) {
        if self.tab != Tab::Volumes {
            return;
        }
        let Some(id) = self.selected_id() else {
            return;
        };
        if let Err(e) = self.dashboard.state_mut().toggle_volume(&id) {
            self.dashboard
                .state_mut()
                .notify(NoticeLevel::Warning, "Warning", e.to_string());
        }
    }

    async fn delete_selected(&mut self) {
        let Some((id, enabled)) = self.selected_action(|k| k == ActionKind::Delete) else {
            return;
        };
        if !enabled {
            self.show_message(
                NoticeLevel::Warning,
                "Warning",
                "Only available backups can be deleted",
            );
            return;
        }
        let command = match self.tab {
            Tab::FullBackups | Tab::IncrementalBackups => Command::DeleteBackup { backup_id: id },
            Tab::Schedules => Command::DeleteSchedule { schedule_id: id },
            Tab::ServerSnapshots => Command::DeleteServerSnapshot { snapshot_id: id },
            Tab::VolumeSnapshots => Command::DeleteVolumeSnapshot { snapshot_id: id },
            Tab::Volumes => return,
        };
        self.submit(vec![command]).await;
    }

    /// Ask for confirmation when any command needs it, otherwise run now.
    async fn submit(&mut self, commands: Vec<Command>) {
        let prompts: Vec<String> = commands.iter().filter_map(Command::confirmation).collect();
        if prompts.is_empty() {
            self.execute(commands).await;
        } else {
            self.dialog = Some(Dialog::Confirm {
                prompt: prompts.join("\n"),
                commands,
            });
        }
    }

    /// Dispatch commands in order, stopping at the first one that does not succeed.
    async fn execute(&mut self, commands: Vec<Command>) {
        let mut last_success = None;
        for command in &commands {
            match self.dashboard.dispatch(command).await {
                CommandOutcome::Succeeded { message, closes, .. } => {
                    last_success = Some((message, closes));
                }
                CommandOutcome::Rejected(e) => {
                    match self.form.as_mut() {
                        Some(form) => form.error = Some(e.to_string()),
                        None => self.show_message(NoticeLevel::Warning, "Warning", e.to_string()),
                    }
                    return;
                }
                CommandOutcome::Failed { message } => {
                    self.show_message(NoticeLevel::Error, "Error", message);
                    return;
                }
                CommandOutcome::Cancelled => return,
            }
        }

        if let Some((message, closes)) = last_success {
            if self
                .form
                .as_ref()
                .is_some_and(|form| Some(form.kind.modal()) == closes)
            {
                self.form = None;
            }
            self.show_message(NoticeLevel::Success, "Success", message);
        }
    }
}

/// Table view for `tab`.
pub fn table_for(tab: Tab, state: &crate::dashboard::state::AppState) -> TableView {
    match tab {
        Tab::Volumes => render::volumes_table(state),
        Tab::FullBackups => render::full_backups_table(state),
        Tab::IncrementalBackups => render::incremental_backups_table(state),
        Tab::Schedules => render::schedules_table(state),
        Tab::ServerSnapshots => render::server_snapshots_table(state),
        Tab::VolumeSnapshots => render::volume_snapshots_table(state),
    }
}
