//! Common UI components shared across views.
//!
//! This module contains the header bar, tab bar, status bar, and help overlay.

use latwatch_types::{Provider, Status};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Tabs},
    Frame,
};

use crate::app::{App, View};
use crate::data::duration::format_duration;

/// Render the header bar with the latency overview.
///
/// Displays: fetch indicator, counts per status, mean latency, provider filter chips.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let bold = Style::default().add_modifier(Modifier::BOLD);

    if app.snapshot().is_none() {
        let line = Line::from(vec![
            Span::styled(" LATWATCH ", bold),
            Span::raw("| Waiting for first snapshot..."),
        ]);
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let summary = app.summary();
    let indicator = if app.status.is_fetching {
        Span::styled(" ◌ ", Style::default().fg(app.theme.highlight))
    } else if summary.high > 0 {
        Span::styled(" ● ", app.theme.status_style(Status::High))
    } else {
        Span::styled(" ● ", app.theme.status_style(Status::Low))
    };

    let mut spans = vec![
        indicator,
        Span::styled("LATWATCH ", bold),
        Span::raw("│ "),
    ];

    for status in Status::ALL {
        let count = summary.count(status);
        let style = if count > 0 {
            app.theme.status_style(status)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        spans.push(Span::styled(count.to_string(), style));
        spans.push(Span::raw(format!(" {} ", status.symbol().to_lowercase())));
    }

    spans.push(Span::raw("│ "));
    spans.push(Span::styled(summary.total.to_string(), bold));
    spans.push(Span::raw(format!(" links avg {:.0}ms │ ", summary.mean_ms)));

    for (i, provider) in Provider::ALL.into_iter().enumerate() {
        let active = app.filter.is_provider_active(provider);
        let mut style = if active {
            Style::default().fg(app.theme.provider_color(provider))
        } else {
            app.theme.hidden
        };
        if i == app.provider_cursor {
            style = style.add_modifier(Modifier::REVERSED);
        }
        let mark = if active { "■" } else { "□" };
        spans.push(Span::styled(format!("{}{}", mark, provider), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Render the tab bar showing available views.
pub fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = [View::Connections, View::Trends, View::Globe]
        .iter()
        .enumerate()
        .map(|(i, view)| Line::from(format!(" {}:{} ", i + 1, view.label())))
        .collect();

    let selected = match app.current_view {
        View::Connections => 0,
        View::Trends => 1,
        View::Globe => 2,
    };

    let tabs = Tabs::new(titles)
        .select(selected)
        .style(app.theme.tab_inactive)
        .highlight_style(app.theme.tab_active)
        .divider("|");

    frame.render_widget(tabs, area);
}

/// Render the status bar at the bottom.
///
/// Shows the source, cycle count, last error and context-sensitive controls.
/// Temporary status messages take precedence.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    if let Some(err) = app.last_error() {
        let paragraph = Paragraph::new(format!(" Error: {} | r:retry q:quit", err))
            .style(app.theme.status_style(Status::High));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = match app.current_view {
        View::Connections => "↑↓:select x:exchange p/space:provider c:links ?:help q:quit",
        View::Trends => "↑↓:pair t:range r:refresh e:export ?:help q:quit",
        View::Globe => "←→:rotate ↑↓:select c:links ?:help q:quit",
    };

    let status = format!(
        " {} | every {} | cycle {} | {}",
        app.source_description(),
        format_duration(app.feed().config().interval),
        app.status.cycles,
        controls,
    );

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the current view.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let section = |title: &'static str| {
        Line::from(vec![Span::styled(title, Style::default().add_modifier(Modifier::BOLD))])
    };

    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        section(" Navigation"),
        Line::from("  1/2/3 Tab   Switch views"),
        Line::from("  ↑/↓ j/k     Select exchange or pair"),
        Line::from("  ←/→ h/l     Rotate globe / switch views"),
        Line::from("  Home/End    Jump to first/last"),
        Line::from(""),
        section(" Filters"),
        Line::from("  p           Move provider cursor"),
        Line::from("  space       Toggle provider"),
        Line::from("  x           Toggle selected exchange"),
        Line::from("  c           Show/hide connections"),
        Line::from("  0           Reset filters"),
        Line::from(""),
        section(" General"),
        Line::from("  t           Cycle trend range"),
        Line::from("  r           Refresh now"),
        Line::from("  e           Export to JSON"),
        Line::from("  q           Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_width = 46u16.min(area.width.saturating_sub(4));
    let help_height = 25u16.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(help_width)) / 2;
    let y = area.y + (area.height.saturating_sub(help_height)) / 2;
    let help_area = Rect::new(x, y, help_width, help_height);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}
