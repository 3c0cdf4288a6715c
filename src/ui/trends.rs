//! Trends view rendering.
//!
//! A list of every exchange/region pair on the left; the selected pair's
//! statistics and sparkline over the current time range on the right.

use latwatch_types::Status;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Sparkline},
    Frame,
};

use crate::app::App;
use crate::data::TimeRange;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks =
        Layout::horizontal([Constraint::Percentage(40), Constraint::Percentage(60)]).split(area);

    render_pair_list(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
}

fn render_pair_list(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app.pairs().iter().map(|p| ListItem::new(p.name.clone())).collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!(" Pairs ({}) ", app.pairs().len()))
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(app.selected_pair_index));
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([Constraint::Length(5), Constraint::Min(3)]).split(area);

    let trend = app.selected_trend();
    let pair_name = app.selected_pair().map(|p| p.name.as_str()).unwrap_or("-");

    let ranges: Vec<Span> = TimeRange::ALL
        .iter()
        .map(|r| {
            if *r == app.time_range {
                Span::styled(format!("[{}]", r.label()), app.theme.tab_active)
            } else {
                Span::styled(format!(" {} ", r.label()), app.theme.tab_inactive)
            }
        })
        .collect();

    let stat = |label: &'static str, value: u32| {
        vec![
            Span::raw(format!("{}: ", label)),
            Span::styled(format!("{}ms", value), Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  "),
        ]
    };

    let mut stats_line = Vec::new();
    stats_line.extend(stat("min", trend.stats.min));
    stats_line.extend(stat("max", trend.stats.max));
    stats_line.extend(stat("avg", trend.stats.avg));
    stats_line.push(Span::raw(format!("samples: {}", trend.series.len())));

    let info = Paragraph::new(vec![Line::from(ranges), Line::from(stats_line)]).block(
        Block::default()
            .title(format!(" {} ", pair_name))
            .borders(Borders::ALL)
            .border_type(app.theme.border_type)
            .border_style(Style::default().fg(app.theme.border)),
    );
    frame.render_widget(info, chunks[0]);

    let block = Block::default()
        .title(format!(" Latency, last {} (t:range) ", app.time_range))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    if trend.is_empty() {
        let empty = Paragraph::new("No readings in this window yet")
            .style(Style::default().add_modifier(Modifier::DIM))
            .block(block);
        frame.render_widget(empty, chunks[1]);
        return;
    }

    // Keep the most recent points that fit the chart width.
    let values = trend.values();
    let width = chunks[1].width.saturating_sub(2) as usize;
    let start = values.len().saturating_sub(width);
    let latest = trend.series.last().map(|p| p.status).unwrap_or(Status::Low);

    let sparkline = Sparkline::default()
        .block(block)
        .data(&values[start..])
        .style(Style::default().fg(app.theme.status_color(latest)));
    frame.render_widget(sparkline, chunks[1]);
}
