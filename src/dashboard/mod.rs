//! Dashboard core: state, polling, commands and their projections.
//!
//! ## Architecture
//!
//! - `state`: collections, selection, banner and message log
//! - `poller`: concurrent refresh of the six collections and the refresh clock
//! - `health`: health check → banner
//! - `commands`: validated user commands → one mutating request each
//! - `render`: pure table and picker projections of the state
//!
//! [`Dashboard`] owns the state and drives all of the above against any
//! [`DashboardApi`]. Front ends (TUI, one-shot CLI) only call into it.

pub mod commands;
pub mod health;
pub mod poller;
pub mod render;
pub mod state;
pub mod validate;

#[cfg(test)]
pub(crate) mod testing;

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::api::{BackupExport, BackupStatus, ClientError, DashboardApi};

use commands::{Command, CommandOutcome, Settle};
use poller::{RefreshReport, RefreshSchedule, guarded, refresh_all};
use state::{AppState, NoticeLevel};

/// Timing knobs for the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub poll_interval: Duration,
    pub settle_short: Duration,
    pub settle_long: Duration,
    /// Periodic health check; `None` checks only at start and on manual refresh
    pub health_interval: Option<Duration>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(30),
            settle_short: Duration::from_millis(1000),
            settle_long: Duration::from_millis(2000),
            health_interval: None,
        }
    }
}

pub struct Dashboard<A> {
    api: A,
    state: AppState,
    config: DashboardConfig,
    schedule: RefreshSchedule,
    root: CancellationToken,
}

impl<A: DashboardApi> Dashboard<A> {
    pub fn new(api: A, config: DashboardConfig) -> Self {
        let schedule =
            RefreshSchedule::new(Instant::now(), config.poll_interval, config.health_interval);
        Self {
            api,
            state: AppState::default(),
            config,
            schedule,
            root: CancellationToken::new(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Token cancelled by [`Dashboard::shutdown`]; front ends may watch it.
    pub fn shutdown_token(&self) -> CancellationToken {
        self.root.clone()
    }

    /// Initial health check followed by the first full refresh.
    pub async fn start(&mut self) -> RefreshReport {
        info!(
            poll_interval_secs = self.config.poll_interval.as_secs(),
            "Starting dashboard"
        );
        self.check_health().await;
        self.refresh().await
    }

    /// Refresh all six collections now.
    pub async fn refresh(&mut self) -> RefreshReport {
        let cancel = self.root.child_token();
        self.state.loading = true;
        let report = refresh_all(&self.api, &mut self.state, &cancel).await;
        self.state.loading = false;

        if !report.cancelled {
            self.schedule.polled(Instant::now());
        }
        report
    }

    /// User-requested refresh: health check plus full refresh.
    pub async fn manual_refresh(&mut self) -> RefreshReport {
        self.check_health().await;
        self.refresh().await
    }

    pub async fn check_health(&mut self) {
        let cancel = self.root.child_token();
        if let Some(banner) = health::check(&self.api, &cancel).await {
            self.state.banner = banner;
            self.schedule.health_checked(Instant::now());
        }
    }

    /// Fetch `/api/info` into the state.
    pub async fn load_system_info(&mut self) -> Result<(), ClientError> {
        let cancel = self.root.child_token();
        match guarded(&cancel, self.api.system_info()).await {
            Ok(info) => {
                self.state.system_info = Some(info);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Failed to load system info");
                Err(e)
            }
        }
    }

    /// Detailed status of one backup, fetched on demand.
    pub async fn backup_status(&self, backup_id: &str) -> Result<BackupStatus, ClientError> {
        let cancel = self.root.child_token();
        guarded(&cancel, self.api.backup_status(backup_id))
            .await
            .inspect_err(|e| warn!(backup_id, error = %e, "Failed to fetch backup status"))
    }

    /// Export record for one backup, to be fed back through an import.
    pub async fn export_backup(&self, backup_id: &str) -> Result<BackupExport, ClientError> {
        let cancel = self.root.child_token();
        let export = guarded(&cancel, self.api.export_backup(backup_id))
            .await
            .inspect_err(|e| warn!(backup_id, error = %e, "Failed to export backup"))?;
        info!(backup_id, backup_service = %export.backup_service, "Backup exported");
        Ok(export)
    }

    /// Validate and send one command, then fold its outcome into the state.
    pub async fn dispatch(&mut self, command: &Command) -> CommandOutcome {
        let prepared = match command.prepare(&self.state) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(command = command.describe(), reason = %e, "Command rejected");
                self.state.notify(NoticeLevel::Warning, "Warning", e.to_string());
                return CommandOutcome::Rejected(e);
            }
        };

        info!(
            command = command.describe(),
            method = %prepared.request.method,
            path = %prepared.request.path(),
            "Sending command"
        );

        let cancel = self.root.child_token();
        self.state.loading = true;
        let result = guarded(&cancel, self.api.execute(&prepared.request)).await;
        self.state.loading = false;

        match result {
            Ok(envelope) if envelope.success => {
                let fallback = format!("Request to {} accepted", command.describe());
                let message = envelope.message_or(&fallback);
                if prepared.clears_selection {
                    self.state.clear_selection();
                }

                let refresh_after = self.settle_delay(prepared.settle);
                self.schedule.settle(Instant::now(), refresh_after);
                debug!(delay_ms = refresh_after.as_millis() as u64, "Refresh scheduled");

                info!(command = command.describe(), %message, "Command succeeded");
                self.state.notify(NoticeLevel::Success, "Success", message.clone());
                CommandOutcome::Succeeded {
                    message,
                    closes: prepared.modal,
                    refresh_after,
                }
            }
            Ok(envelope) => {
                let message = envelope.error_or(prepared.fallback);
                warn!(command = command.describe(), %message, "Command failed");
                self.state.notify(NoticeLevel::Error, "Error", message.clone());
                CommandOutcome::Failed { message }
            }
            Err(ClientError::Cancelled) => {
                debug!(command = command.describe(), "Command cancelled");
                CommandOutcome::Cancelled
            }
            Err(e) => {
                let message = format!("{}: {}", prepared.fallback, e);
                warn!(command = command.describe(), error = %e, "Command request failed");
                self.state.notify(NoticeLevel::Error, "Error", message.clone());
                CommandOutcome::Failed { message }
            }
        }
    }

    pub fn settle_delay(&self, settle: Settle) -> Duration {
        match settle {
            Settle::Short => self.config.settle_short,
            Settle::Long => self.config.settle_long,
        }
    }

    /// Run whatever is due: periodic health check, interval or settle refresh.
    pub async fn tick(&mut self) -> Option<RefreshReport> {
        let now = Instant::now();
        if self.schedule.health_due(now) {
            self.check_health().await;
        }
        if self.schedule.poll_due(now) {
            return Some(self.refresh().await);
        }
        None
    }

    /// Time until [`Dashboard::tick`] has work to do.
    pub fn time_until_due(&self) -> Duration {
        self.schedule.until_next(Instant::now())
    }

    /// Abandon in-flight requests. Later requests are cancelled immediately.
    pub fn shutdown(&self) {
        info!("Shutting down dashboard");
        self.root.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::BackupKind;
    use crate::api::{Envelope, HealthReport};
    use commands::Modal;
    use state::Banner;
    use testing::FakeApi;

    fn dashboard() -> Dashboard<FakeApi> {
        Dashboard::new(FakeApi::with_sample_data(), DashboardConfig::default())
    }

    #[tokio::test]
    async fn test_start_checks_health_and_refreshes() {
        let mut dash = dashboard();
        let report = dash.start().await;

        assert!(report.is_complete());
        assert!(dash.state().banner.is_healthy());
        assert_eq!(dash.state().volumes.len(), 2);
        assert!(!dash.state().loading);
    }

    #[tokio::test]
    async fn test_zero_selection_makes_no_request() {
        let mut dash = dashboard();
        dash.start().await;

        let outcome = dash
            .dispatch(&Command::CreateBackup {
                kind: BackupKind::Full,
                name: None,
            })
            .await;

        assert!(matches!(outcome, CommandOutcome::Rejected(_)));
        assert!(dash.api().executed().is_empty());
        let notice = dash.state().messages.latest().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_toggle_posts_once_per_call() {
        let mut dash = dashboard();
        dash.start().await;

        let toggle = Command::ToggleSchedule {
            schedule_id: "s1".into(),
        };
        dash.dispatch(&toggle).await;
        dash.dispatch(&toggle).await;

        let executed = dash.api().executed();
        assert_eq!(executed.len(), 2);
        for request in executed {
            assert_eq!(request.method, reqwest::Method::POST);
            assert_eq!(request.path(), "/api/schedules/s1/toggle");
        }
    }

    #[tokio::test]
    async fn test_failure_uses_server_error_or_fallback() {
        let mut dash = dashboard();
        dash.start().await;

        dash.api().respond_with(Envelope::failed("Schedule not found"));
        let outcome = dash
            .dispatch(&Command::DeleteSchedule {
                schedule_id: "s1".into(),
            })
            .await;
        assert_eq!(
            outcome,
            CommandOutcome::Failed {
                message: "Schedule not found".into()
            }
        );

        dash.api().respond_with(Envelope::default());
        let outcome = dash
            .dispatch(&Command::DeleteBackup {
                backup_id: "b1".into(),
            })
            .await;
        assert_eq!(
            outcome,
            CommandOutcome::Failed {
                message: "Failed to delete backup".into()
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_backup_success_clears_selection_and_settles() {
        let mut dash = dashboard();
        dash.start().await;
        assert_eq!(dash.api().hits().len(), 6);

        dash.state_mut().toggle_volume("v1").unwrap();
        dash.api().respond_with(Envelope::ok("Backup started"));
        let outcome = dash
            .dispatch(&Command::CreateBackup {
                kind: BackupKind::Full,
                name: None,
            })
            .await;

        assert_eq!(
            outcome,
            CommandOutcome::Succeeded {
                message: "Backup started".into(),
                closes: Some(Modal::BackupName),
                refresh_after: Duration::from_secs(2),
            }
        );
        assert!(dash.state().selection.volumes.is_empty());
        assert!(dash.tick().await.is_none());

        tokio::time::advance(Duration::from_secs(2)).await;
        let report = dash.tick().await.expect("settle refresh");
        assert!(report.is_complete());
        assert_eq!(dash.api().hits().len(), 12);
        assert_eq!(dash.time_until_due(), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn test_unhealthy_banner() {
        let mut dash = dashboard();
        dash.api().set_health(HealthReport {
            status: "unhealthy".into(),
            error: Some("auth failed".into()),
            ..Default::default()
        });
        dash.check_health().await;

        assert_eq!(
            dash.state().banner,
            Banner::Unhealthy {
                reason: "auth failed".into()
            }
        );
    }

    #[tokio::test]
    async fn test_shutdown_cancels_requests() {
        let mut dash = dashboard();
        dash.shutdown();

        let report = dash.refresh().await;
        assert!(report.cancelled);

        let outcome = dash
            .dispatch(&Command::ToggleSchedule {
                schedule_id: "s1".into(),
            })
            .await;
        assert_eq!(outcome, CommandOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_volume_refresh_prunes_selection() {
        let mut dash = dashboard();
        dash.start().await;
        dash.state_mut().toggle_volume("v1").unwrap();

        dash.api().set_volumes(vec![]);
        dash.refresh().await;

        assert!(dash.state().selection.volumes.is_empty());
    }

    #[tokio::test]
    async fn test_system_info() {
        let mut dash = dashboard();
        dash.load_system_info().await.unwrap();

        let info = dash.state().system_info.as_ref().unwrap();
        assert_eq!(info.volume_stats.total, 2);
        assert_eq!(info.backup_stats.total, 3);
    }

    #[tokio::test]
    async fn test_backup_lookups() {
        let dash = dashboard();

        let status = dash.backup_status("b2").await.unwrap();
        assert_eq!(status.status, "available");
        assert_eq!(status.kind(), BackupKind::Incremental);

        let export = dash.export_backup("b1").await.unwrap();
        assert_eq!(export.backup_url, "export-b1");

        assert!(matches!(
            dash.backup_status("missing").await,
            Err(ClientError::Status { status: 404, .. })
        ));
        // Lookups are reads; nothing is sent as a command
        assert!(dash.api().executed().is_empty());
    }

    #[tokio::test]
    async fn test_import_schedules_long_settle() {
        let mut dash = dashboard();
        dash.start().await;

        let outcome = dash
            .dispatch(&Command::ImportBackup {
                backup_service: "cinder.backup.drivers.swift".into(),
                backup_url: "export-b1".into(),
                name: None,
            })
            .await;

        match outcome {
            CommandOutcome::Succeeded { refresh_after, .. } => {
                assert_eq!(refresh_after, dash.config().settle_long);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        assert_eq!(dash.api().executed()[0].path(), "/api/backup/import");
    }
}
