//! Globe view rendering.
//!
//! Sites and connection arcs are projected with [`crate::geo`] and drawn
//! orthographically onto a braille canvas. The far hemisphere is culled.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        canvas::{Canvas, Circle, Line as CanvasLine, Points},
        Block, Borders,
    },
    Frame,
};

use latwatch_types::current_timestamp_ms;

use crate::app::App;
use crate::geo::{self, Vec3, ARC_SEGMENTS, GLOBE_RADIUS};

/// Canvas half-extent, leaving room for arcs and labels outside the disk.
const VIEW_EXTENT: f64 = GLOBE_RADIUS * 1.45;

/// Latitudes drawn as graticule rings.
const GRATICULE_LATS: [f64; 5] = [-60.0, -30.0, 0.0, 30.0, 60.0];

/// Shortest time a pulse takes to cross an arc.
const MIN_PULSE_PERIOD_MS: f64 = 250.0;

/// Rotate a point so that `center_lon` faces the viewer (+z), y stays up.
fn orient(p: Vec3, center_lon: f64) -> Vec3 {
    let theta = (-(90.0 + center_lon)).to_radians();
    let (sin, cos) = theta.sin_cos();
    Vec3::new(p.x * cos + p.z * sin, p.y, -p.x * sin + p.z * cos)
}

/// Whether an oriented point is visible: in front of the globe, or outside
/// its silhouette.
fn is_visible(p: Vec3) -> bool {
    p.z >= 0.0 || p.x * p.x + p.y * p.y > GLOBE_RADIUS * GLOBE_RADIUS
}

/// Index of the arc point a pulse sits on at `now_ms`.
///
/// A pulse crosses the arc in `speed` seconds, so slower links pulse slower.
fn pulse_index(len: usize, speed: f64, now_ms: u64) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let period_ms = (speed * 1000.0).max(MIN_PULSE_PERIOD_MS);
    let phase = (now_ms as f64 % period_ms) / period_ms;
    let index = (phase * (len - 1) as f64).round() as usize;
    Some(index.min(len - 1))
}

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let topology = app.topology();
    let center = app.globe_yaw;
    let theme = &app.theme;

    let now_ms = current_timestamp_ms();

    let graticule: Vec<(f64, f64)> = GRATICULE_LATS
        .iter()
        .flat_map(|&lat| {
            (0..72).map(move |i| geo::project(lat, -180.0 + i as f64 * 5.0, GLOBE_RADIUS))
        })
        .map(|p| orient(p, center))
        .filter(|p| p.z >= 0.0)
        .map(|p| (p.x, p.y))
        .collect();

    // Oriented arc polylines with their status color and line weight.
    let arcs: Vec<_> = app
        .snapshot()
        .map(|snapshot| app.filter.visible_connections(topology, snapshot))
        .unwrap_or_default()
        .into_iter()
        .map(|c| {
            let points: Vec<Vec3> = geo::connection_arc(c.start, c.end, ARC_SEGMENTS)
                .into_iter()
                .map(|p| orient(p, center))
                .collect();
            let status = c.reading.status();
            let pulse = pulse_index(points.len(), c.reading.pulse_speed(), now_ms)
                .map(|i| points[i])
                .filter(|p| is_visible(*p));
            (points, theme.status_color(status), status.line_width(), pulse)
        })
        .collect();

    let selected_id = app.selected_exchange().map(|e| e.id.clone());
    let exchanges: Vec<_> = app
        .filter
        .visible_exchanges(topology)
        .into_iter()
        .map(|e| {
            let selected = selected_id.as_ref() == Some(&e.id);
            (orient(geo::marker_position(e), center), e.name.clone(), e.provider, selected)
        })
        .filter(|(p, ..)| p.z >= 0.0)
        .collect();
    let regions: Vec<_> = app
        .filter
        .visible_regions(topology)
        .into_iter()
        .map(|r| (orient(geo::marker_position(r), center), r.code.clone(), r.provider))
        .filter(|(p, ..)| p.z >= 0.0)
        .collect();

    let title = format!(
        " Globe, centered on {:.0}° [←→:rotate] ({} arcs) ",
        normalize_lon(center),
        arcs.len()
    );

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_type(theme.border_type)
                .border_style(Style::default().fg(theme.border)),
        )
        .marker(Marker::Braille)
        .x_bounds([-VIEW_EXTENT, VIEW_EXTENT])
        .y_bounds([-VIEW_EXTENT, VIEW_EXTENT])
        .paint(move |ctx| {
            ctx.draw(&Circle {
                x: 0.0,
                y: 0.0,
                radius: GLOBE_RADIUS,
                color: theme.globe,
            });
            ctx.draw(&Points {
                coords: &graticule,
                color: theme.border,
            });
            ctx.layer();

            for (points, color, width, pulse) in &arcs {
                for pair in points.windows(2) {
                    if !(is_visible(pair[0]) && is_visible(pair[1])) {
                        continue;
                    }
                    ctx.draw(&CanvasLine {
                        x1: pair[0].x,
                        y1: pair[0].y,
                        x2: pair[1].x,
                        y2: pair[1].y,
                        color: *color,
                    });
                    // Heavy arcs get a second, offset stroke.
                    if *width > 2 {
                        ctx.draw(&CanvasLine {
                            x1: pair[0].x,
                            y1: pair[0].y + 0.02,
                            x2: pair[1].x,
                            y2: pair[1].y + 0.02,
                            color: *color,
                        });
                    }
                }
                if let Some(p) = pulse {
                    ctx.draw(&Points {
                        coords: &[(p.x, p.y)],
                        color: *color,
                    });
                }
            }
            ctx.layer();

            for (p, code, provider) in &regions {
                let style = Style::default().fg(theme.provider_color(*provider));
                ctx.print(p.x, p.y, Span::styled(format!("■ {}", code), style));
            }
            for (p, name, provider, selected) in &exchanges {
                let mut style = Style::default().fg(theme.provider_color(*provider));
                if *selected {
                    style = style.add_modifier(Modifier::BOLD | Modifier::REVERSED);
                }
                ctx.print(p.x, p.y, Span::styled(format!("◆ {}", name), style));
            }
        });

    frame.render_widget(canvas, area);
}

/// Map a longitude in degrees into [-180, 180).
fn normalize_lon(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
