//! Frame rendering
//!
//! A pure function of dashboard state and theme: widgets are rebuilt on
//! every draw and nothing is cached between frames, so the same state
//! always produces the same buffer.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use devdeck_core::catalog::{CommandEntry, ServiceEntry};
use devdeck_core::dashboard::{Dashboard, Tab};
use devdeck_core::view::{ListEntry, ListView};

use crate::ui::theme::Theme;

/// Braille spinner shown while a command runs
const SPINNER_FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Draw one frame of the dashboard
pub fn render(frame: &mut Frame, app: &Dashboard, theme: &Theme) {
    // Nothing sensible to draw before the first resize arrives
    if app.width == 0 {
        frame.render_widget(Paragraph::new("Loading..."), frame.area());
        return;
    }

    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Length(1), // Tab bar
            Constraint::Min(1),    // Content
            Constraint::Length(1), // Footer
        ])
        .split(frame.area());

    draw_header(frame, app, theme, outer[0]);
    draw_tabs(frame, app, theme, outer[1]);
    match app.tab {
        Tab::Services => draw_services(frame, app, theme, outer[2]),
        Tab::Commands => draw_commands(frame, app, theme, outer[2]),
        Tab::Logs => draw_logs(frame, app, theme, outer[2]),
    }
    draw_footer(frame, theme, outer[3]);
}

fn draw_header(frame: &mut Frame, app: &Dashboard, theme: &Theme, area: Rect) {
    let header = Line::from(vec![
        Span::styled(" devdeck ", theme.header()),
        Span::raw(" "),
        Span::styled(app.catalog.name.clone(), theme.title()),
    ]);
    frame.render_widget(Paragraph::new(header), area);
}

// The active tab wears brackets, inactive ones are plain and dim.
fn draw_tabs(frame: &mut Frame, app: &Dashboard, theme: &Theme, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for tab in Tab::all() {
        let active = tab == app.tab;
        let label = if active {
            format!("[{}]", tab.label())
        } else {
            tab.label().to_string()
        };
        spans.push(Span::styled(label, theme.tab(active)));
        spans.push(Span::raw(" "));
    }
    if app.loading {
        spans.push(Span::styled(spinner_frame(app), theme.accent()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_services(frame: &mut Frame, app: &Dashboard, theme: &Theme, area: Rect) {
    let area = draw_filter_row(frame, &app.services, theme, area);
    let items: Vec<ListItem> = app
        .services
        .visible()
        .into_iter()
        .map(|svc| service_item(svc, theme))
        .collect();
    draw_list(frame, items, app.services.selected_index(), theme, area);
}

fn draw_commands(frame: &mut Frame, app: &Dashboard, theme: &Theme, area: Rect) {
    let mut area = draw_filter_row(frame, &app.commands, theme, area);
    if app.loading {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(0)])
            .split(area);
        let overlay = Line::from(vec![
            Span::styled(format!(" {} ", spinner_frame(app)), theme.accent()),
            Span::raw("Executing command..."),
        ]);
        frame.render_widget(Paragraph::new(overlay), rows[0]);
        area = rows[1];
    }

    let items: Vec<ListItem> = app
        .commands
        .visible()
        .into_iter()
        .map(|cmd| command_item(cmd, theme))
        .collect();
    draw_list(frame, items, app.commands.selected_index(), theme, area);
}

fn draw_logs(frame: &mut Frame, app: &Dashboard, theme: &Theme, area: Rect) {
    let lines: Vec<Line> = app
        .logs
        .visible_lines(area.width, area.height)
        .into_iter()
        .map(|text| {
            if text.starts_with('✓') {
                Line::from(Span::styled(text, theme.ok()))
            } else if text.starts_with('✗') {
                Line::from(Span::styled(text, theme.fail()))
            } else {
                Line::from(Span::raw(text))
            }
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

fn draw_footer(frame: &mut Frame, theme: &Theme, area: Rect) {
    let footer = Span::styled(
        " tab: switch • enter: execute • r: refresh • /: filter • q: quit",
        theme.dim(),
    );
    frame.render_widget(Paragraph::new(Line::from(footer)), area);
}

/// Carve the filter prompt row off the top of `area` when the filter is
/// open or still applied; returns the remaining area
fn draw_filter_row<T: ListEntry>(
    frame: &mut Frame,
    list: &ListView<T>,
    theme: &Theme,
    area: Rect,
) -> Rect {
    if !list.is_filtering() && list.filter().is_empty() {
        return area;
    }

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);

    let mut spans = vec![
        Span::styled(" / ", theme.accent()),
        Span::raw(list.filter().to_string()),
    ];
    if list.is_filtering() {
        spans.push(Span::styled("▌", theme.accent()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), rows[0]);
    rows[1]
}

fn draw_list(frame: &mut Frame, items: Vec<ListItem>, selected: usize, theme: &Theme, area: Rect) {
    if items.is_empty() {
        frame.render_widget(
            Paragraph::new(Span::styled(" No matches", theme.dim())),
            area,
        );
        return;
    }

    let list = List::new(items)
        .highlight_style(theme.selected())
        .highlight_symbol("▶ ");
    let mut state = ListState::default();
    state.select(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn service_item(svc: &ServiceEntry, theme: &Theme) -> ListItem<'static> {
    let title = Line::from(vec![
        Span::raw(svc.name.clone()),
        Span::styled(format!("  [{}]", svc.category.label()), theme.dim()),
    ]);

    let mut tail = format!(" - {}", svc.description);
    if let Some(port) = svc.port {
        tail.push_str(&format!(" | Port: {}", port));
    }
    let desc = Line::from(vec![
        Span::styled(
            format!("  {} {}", svc.status.icon(), svc.status.label()),
            theme.status(svc.status),
        ),
        Span::styled(tail, theme.dim()),
    ]);

    ListItem::new(vec![title, desc])
}

fn command_item(cmd: &CommandEntry, theme: &Theme) -> ListItem<'static> {
    let title = Line::from(Span::raw(cmd.name.clone()));
    let desc = Line::from(Span::styled(
        format!("  [{}] {}", cmd.category, cmd.description),
        theme.dim(),
    ));
    ListItem::new(vec![title, desc])
}

fn spinner_frame(app: &Dashboard) -> &'static str {
    SPINNER_FRAMES[app.ticks % SPINNER_FRAMES.len()]
}
