//! Connections view rendering.
//!
//! One row per exchange, one column per region. Each cell shows the latest
//! latency for the pair, colored by status. Filtered-out exchanges stay in
//! the table, dimmed, so they can be toggled back on.

use ratatui::{
    layout::{Constraint, Rect},
    style::Style,
    text::Span,
    widgets::{Block, Borders, Cell, Row, Table, TableState},
    Frame,
};

use crate::app::App;

/// Render the exchange × region latency grid.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let topology = app.topology();
    let visible = app.visible_readings();

    let mut header_cells = vec![Cell::from("Exchange"), Cell::from("Provider")];
    for region in topology.regions() {
        let style = if app.filter.is_provider_active(region.provider) {
            Style::default()
        } else {
            app.theme.hidden
        };
        header_cells.push(Cell::from(Span::styled(region.code.clone(), style)));
    }
    let header = Row::new(header_cells).height(1).style(app.theme.header);

    let rows: Vec<Row> = topology
        .exchanges()
        .iter()
        .map(|exchange| {
            let shown = app.filter.is_provider_active(exchange.provider)
                && app.filter.is_exchange_active(exchange.id.as_str());
            let name_style = if shown { Style::default() } else { app.theme.hidden };

            let mut cells = vec![
                Cell::from(Span::styled(exchange.name.clone(), name_style)),
                Cell::from(Span::styled(
                    exchange.provider.label(),
                    Style::default().fg(app.theme.provider_color(exchange.provider)),
                )),
            ];

            for region in topology.regions() {
                let reading = visible
                    .iter()
                    .find(|r| r.is_pair(exchange.id.as_str(), region.id.as_str()));
                cells.push(match reading {
                    Some(r) => Cell::from(format!("{}ms", r.ms()))
                        .style(app.theme.status_style(r.status())),
                    None => Cell::from("·").style(app.theme.hidden),
                });
            }

            Row::new(cells)
        })
        .collect();

    let mut widths = vec![Constraint::Fill(2), Constraint::Length(8)];
    widths.extend(topology.regions().iter().map(|_| Constraint::Fill(1)));

    let selected = app.selected_exchange_index.min(topology.exchanges().len().saturating_sub(1));
    let links = if app.filter.show_connections() { "" } else { " [links hidden]" };
    let title = format!(
        " Connections ({} visible){} [{}/{}] ",
        visible.len(),
        links,
        selected + 1,
        topology.exchanges().len()
    );

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(app.theme.border_type)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .row_highlight_style(app.theme.selected)
        .highlight_symbol("▶ ");

    let mut state = TableState::default();
    state.select(Some(selected));

    frame.render_stateful_widget(table, area, &mut state);
}
