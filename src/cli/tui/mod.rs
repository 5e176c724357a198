//! Interactive TUI for cinderdash.
//!
//! Tabbed tables over the dashboard state with forms for every command.
//! Data refreshes on the poll interval and shortly after each successful
//! command.

mod app;
mod forms;
mod input;
mod ui;

use std::io::{self, stdout};
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event, execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::api::DashboardApi;
use crate::dashboard::Dashboard;

use app::TuiApp;

/// Upper bound on how long the loop blocks waiting for input.
const INPUT_POLL: Duration = Duration::from_millis(250);

/// Run the TUI until the user quits.
pub async fn run<A: DashboardApi>(dashboard: Dashboard<A>, server_url: &str) -> Result<()> {
    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = TuiApp::new(dashboard, server_url);
    let result = run_app(&mut terminal, &mut app).await;
    app.dashboard.shutdown();

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

async fn run_app<A: DashboardApi>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp<A>,
) -> Result<()> {
    // Draw once so the user sees something while the first fetch runs
    terminal.draw(|frame| ui::render(frame, app))?;
    app.init().await;

    while app.running {
        terminal.draw(|frame| ui::render(frame, app))?;

        let timeout = app.dashboard.time_until_due().min(INPUT_POLL);
        if event::poll(timeout)? {
            let event = event::read()?;
            if let Some(action) = input::handle_event(event, app.input_mode()) {
                app.handle_action(action).await;
            }
        }

        if app.running {
            app.tick().await;
        }
    }

    Ok(())
}
