//! Command-line entry points: the terminal UI and one-shot subcommands.

pub mod args;
pub mod print;
pub mod tui;

use anyhow::{Context, Result, anyhow, bail};
use tracing::{debug, info};

use crate::api::{ApiClient, DashboardApi};
use crate::config::AppConfig;
use crate::dashboard::Dashboard;
use crate::dashboard::commands::{Command, CommandOutcome};
use crate::dashboard::poller::Resource;
use crate::dashboard::render::{self, TableView};

use args::{BackupAction, Cli, Commands, ListResource, VolumeSelection};

/// Dispatch the parsed command line against the configured service.
pub async fn run(cli: Cli, config: AppConfig) -> Result<()> {
    let client = ApiClient::new(&config.client_config()).context("Failed to create API client")?;
    let dashboard = Dashboard::new(client, config.dashboard_config());
    info!(server_url = %config.server_url, "Using backup service");

    match cli.command {
        None | Some(Commands::Dashboard) => tui::run(dashboard, &config.server_url)
            .await
            .context("Terminal UI failed"),
        Some(Commands::Status) => run_status(dashboard).await,
        Some(Commands::Info) => run_info(dashboard).await,
        Some(Commands::List { resource }) => run_list(dashboard, resource).await,
        Some(Commands::Backup(command)) => match command.into_action() {
            BackupAction::Status(backup_id) => run_backup_status(dashboard, &backup_id).await,
            BackupAction::Export(backup_id) => run_backup_export(dashboard, &backup_id).await,
            BackupAction::Send(command, selection) => {
                run_command(dashboard, command, selection).await
            }
        },
        Some(Commands::Schedule(command)) => {
            run_command(dashboard, command.into(), VolumeSelection::None).await
        }
        Some(Commands::Snapshot(command)) => {
            run_command(dashboard, command.into(), VolumeSelection::None).await
        }
    }
}

async fn run_status<A: DashboardApi>(mut dashboard: Dashboard<A>) -> Result<()> {
    dashboard.check_health().await;
    let banner = &dashboard.state().banner;
    println!("{}", print::format_banner(banner));
    if !banner.is_healthy() {
        bail!("backup service is unhealthy");
    }
    Ok(())
}

async fn run_info<A: DashboardApi>(mut dashboard: Dashboard<A>) -> Result<()> {
    dashboard
        .load_system_info()
        .await
        .context("Failed to load system info")?;
    if let Some(info) = &dashboard.state().system_info {
        for line in print::system_info_lines(info) {
            println!("{}", line);
        }
    }
    Ok(())
}

async fn run_backup_status<A: DashboardApi>(
    dashboard: Dashboard<A>,
    backup_id: &str,
) -> Result<()> {
    let backup = dashboard
        .backup_status(backup_id)
        .await
        .with_context(|| format!("Failed to load backup {}", backup_id))?;
    for line in print::backup_status_lines(&backup) {
        println!("{}", line);
    }
    Ok(())
}

async fn run_backup_export<A: DashboardApi>(
    dashboard: Dashboard<A>,
    backup_id: &str,
) -> Result<()> {
    let export = dashboard
        .export_backup(backup_id)
        .await
        .with_context(|| format!("Failed to export backup {}", backup_id))?;
    for line in print::export_lines(&export) {
        println!("{}", line);
    }
    Ok(())
}

fn resource_of(list: ListResource) -> Resource {
    match list {
        ListResource::Volumes => Resource::Volumes,
        ListResource::Backups => Resource::Backups,
        ListResource::Schedules => Resource::Schedules,
        ListResource::ServerSnapshots => Resource::ServerSnapshots,
        ListResource::VolumeSnapshots => Resource::VolumeSnapshots,
        ListResource::Servers => Resource::Servers,
    }
}

/// Tables printed for a resource. Backups split into full and incremental.
pub fn tables_for(list: ListResource, state: &crate::dashboard::state::AppState) -> Vec<TableView> {
    match list {
        ListResource::Volumes => vec![render::volumes_table(state)],
        ListResource::Backups => {
            let (full, incremental) = render::backup_tables(state);
            vec![full, incremental]
        }
        ListResource::Schedules => vec![render::schedules_table(state)],
        ListResource::ServerSnapshots => vec![render::server_snapshots_table(state)],
        ListResource::VolumeSnapshots => vec![render::volume_snapshots_table(state)],
        ListResource::Servers => vec![render::servers_table(state)],
    }
}

async fn run_list<A: DashboardApi>(mut dashboard: Dashboard<A>, list: ListResource) -> Result<()> {
    let report = dashboard.refresh().await;
    let resource = resource_of(list);
    if let Some((_, error)) = report.failed.iter().find(|(r, _)| *r == resource) {
        bail!("Failed to load {}: {}", resource.label(), error);
    }

    let tables = tables_for(list, dashboard.state());
    let text = tables
        .iter()
        .map(print::format_table)
        .collect::<Vec<_>>()
        .join("\n");
    print!("{}", text);
    Ok(())
}

/// Apply the requested volume selection to freshly loaded state.
pub fn apply_selection<A: DashboardApi>(
    dashboard: &mut Dashboard<A>,
    selection: &VolumeSelection,
) -> Result<()> {
    let state = dashboard.state_mut();
    match selection {
        VolumeSelection::None => {}
        VolumeSelection::All => state.select_all_volumes(true),
        VolumeSelection::Ids(ids) => {
            for id in ids {
                state
                    .toggle_volume(id)
                    .with_context(|| format!("Cannot select volume {}", id))?;
            }
        }
    }
    debug!(selected = state.selected_volumes().len(), "Volume selection applied");
    Ok(())
}

/// Load current state, send one command and report its outcome.
///
/// Commands given on the command line are taken as confirmed.
pub async fn execute<A: DashboardApi>(
    dashboard: &mut Dashboard<A>,
    command: &Command,
    selection: &VolumeSelection,
) -> Result<String> {
    let report = dashboard.refresh().await;
    for (resource, error) in &report.failed {
        debug!(resource = resource.label(), %error, "Refresh before command failed");
    }
    apply_selection(dashboard, selection)?;

    match dashboard.dispatch(command).await {
        CommandOutcome::Succeeded { message, .. } => Ok(message),
        CommandOutcome::Rejected(e) => Err(anyhow!(e)),
        CommandOutcome::Failed { message } => Err(anyhow!(message)),
        CommandOutcome::Cancelled => bail!("{} was cancelled", command.describe()),
    }
}

async fn run_command<A: DashboardApi>(
    mut dashboard: Dashboard<A>,
    command: Command,
    selection: VolumeSelection,
) -> Result<()> {
    let message = execute(&mut dashboard, &command, &selection).await?;
    println!("✓ {}", message);
    Ok(())
}
