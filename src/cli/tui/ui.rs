//! UI rendering for the TUI.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell as TableCell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap},
};

use crate::api::DashboardApi;
use crate::cli::print;
use crate::dashboard::render::{Cell, Row as ViewRow, Severity, TableView};
use crate::dashboard::state::{Banner, NoticeLevel};

use super::app::{Dialog, Tab, TuiApp};

/// Main render function: layout, then overlays on top.
pub fn render<A: DashboardApi>(frame: &mut Frame, app: &TuiApp<A>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Tabs
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer/help
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_table(frame, app, chunks[2]);
    render_footer(frame, app, chunks[3]);

    if let Some(form) = &app.form {
        let area = frame.area();
        form.render(frame, area);
    }
    if let Some(dialog) = &app.dialog {
        render_dialog(frame, app, dialog);
    }
}

fn render_header<A: DashboardApi>(frame: &mut Frame, app: &TuiApp<A>, area: Rect) {
    let state = app.dashboard.state();
    let (color, symbol) = match &state.banner {
        Banner::Pending => (Color::Yellow, "•"),
        Banner::Healthy { .. } => (Color::Green, "✓"),
        Banner::Unhealthy { .. } => (Color::Red, "✗"),
    };

    let mut spans = vec![
        Span::styled(format!(" {} ", symbol), Style::default().fg(color)),
        Span::styled(state.banner.headline(), Style::default().fg(color)),
    ];
    if let Some(at) = state.last_refresh {
        spans.push(Span::styled(
            format!("   Updated {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        ));
    }
    if state.loading {
        spans.push(Span::styled("   Loading...", Style::default().fg(Color::Yellow)));
    }

    let block = Block::default()
        .title(format!("cinderdash  {}", app.server_url))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_tabs<A: DashboardApi>(frame: &mut Frame, app: &TuiApp<A>, area: Rect) {
    let titles: Vec<&str> = Tab::ALL.iter().map(Tab::title).collect();
    let tabs = Tabs::new(titles)
        .select(app.tab.index())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Success => Color::Green,
        Severity::Primary => Color::Blue,
        Severity::Danger => Color::Red,
        Severity::Warning => Color::Yellow,
        Severity::Secondary => Color::Gray,
    }
}

fn table_cell(cell: &Cell) -> TableCell<'static> {
    match cell {
        Cell::Code(_) => TableCell::from(cell.text()).style(Style::default().fg(Color::DarkGray)),
        Cell::Badge { severity, .. } => {
            TableCell::from(cell.text()).style(Style::default().fg(severity_color(*severity)))
        }
        Cell::ScheduleState { enabled } => {
            let color = if *enabled { Color::Green } else { Color::DarkGray };
            TableCell::from(cell.text()).style(Style::default().fg(color))
        }
        Cell::Checkbox { enabled: false, .. } => {
            TableCell::from(cell.text()).style(Style::default().fg(Color::DarkGray))
        }
        _ => TableCell::from(cell.text()),
    }
}

fn render_table<A: DashboardApi>(frame: &mut Frame, app: &TuiApp<A>, area: Rect) {
    let view: TableView = app.table();
    let block = Block::default()
        .title(view.title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if view.is_empty() {
        let text = view
            .rows
            .iter()
            .find_map(|row| match row {
                ViewRow::Placeholder { text, .. } => Some(text.clone()),
                ViewRow::Item { .. } => None,
            })
            .unwrap_or_default();
        let paragraph = Paragraph::new(format!("  {}", text))
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(view.columns.iter().map(|c| TableCell::from(*c))).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );
    let rows = view.rows.iter().filter_map(|row| match row {
        ViewRow::Item { cells, .. } => Some(Row::new(cells.iter().map(table_cell))),
        ViewRow::Placeholder { .. } => None,
    });
    let widths: Vec<Constraint> = view
        .columns
        .iter()
        .map(|c| if c.is_empty() { Constraint::Length(3) } else { Constraint::Fill(1) })
        .collect();

    let table = Table::new(rows, widths)
        .header(header)
        .block(block)
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut state = TableState::default().with_selected(Some(app.cursor()));
    frame.render_stateful_widget(table, area, &mut state);
}

fn help_text(tab: Tab) -> &'static str {
    match tab {
        Tab::Volumes => {
            "[Space] Select  [a] All  [f/i] Full/Incr backup  [s] Schedule  [n] Snapshot  [c] Cleanup  [r] Refresh  [q] Quit"
        }
        Tab::FullBackups | Tab::IncrementalBackups => {
            "[↑↓] Navigate  [o] Restore  [d] Delete  [c] Cleanup  [I] Info  [r] Refresh  [q] Quit"
        }
        Tab::Schedules => {
            "[↑↓] Navigate  [s] New  [t] Pause/Resume  [m] Volumes  [d] Delete  [r] Refresh  [q] Quit"
        }
        Tab::ServerSnapshots | Tab::VolumeSnapshots => {
            "[↑↓] Navigate  [n] New  [d] Delete  [c] Cleanup  [r] Refresh  [q] Quit"
        }
    }
}

fn notice_color(level: NoticeLevel) -> Color {
    match level {
        NoticeLevel::Success => Color::Green,
        NoticeLevel::Info => Color::Cyan,
        NoticeLevel::Warning => Color::Yellow,
        NoticeLevel::Error => Color::Red,
    }
}

fn render_footer<A: DashboardApi>(frame: &mut Frame, app: &TuiApp<A>, area: Rect) {
    let mut spans = vec![Span::raw(format!("  {}", help_text(app.tab)))];

    if let Some(notice) = app.dashboard.state().messages.latest() {
        spans.push(Span::styled(
            format!("  {}: {}", notice.title, notice.text),
            Style::default().fg(notice_color(notice.level)),
        ));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let paragraph = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(paragraph, area);
}

fn render_dialog<A: DashboardApi>(frame: &mut Frame, app: &TuiApp<A>, dialog: &Dialog) {
    let (title, color, mut lines) = match dialog {
        Dialog::Confirm { prompt, .. } => (
            "Confirm".to_string(),
            Color::Yellow,
            prompt.lines().map(|l| Line::from(l.to_string())).collect::<Vec<_>>(),
        ),
        Dialog::Message { level, title, text } => (
            title.clone(),
            notice_color(*level),
            vec![Line::from(text.clone())],
        ),
        Dialog::SystemInfo => ("System info".to_string(), Color::Cyan, system_info_lines(app)),
    };

    let hint = match dialog {
        Dialog::Confirm { .. } => "[y/Enter] Yes  [n/Esc] No",
        _ => "[Enter/Esc] Close",
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))));

    let area = centered_rect(60, 40, frame.area());
    frame.render_widget(Clear, area);
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

fn system_info_lines<A: DashboardApi>(app: &TuiApp<A>) -> Vec<Line<'static>> {
    match &app.dashboard.state().system_info {
        Some(info) => print::system_info_lines(info)
            .into_iter()
            .map(Line::from)
            .collect(),
        None => vec![Line::from("System information unavailable")],
    }
}

/// A rectangle of `percent_x` by `percent_y` centered in `area`.
pub fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
