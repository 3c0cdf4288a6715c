//! Application state and navigation logic.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use latwatch_types::{current_timestamp_ms, Exchange, LatencyReading, Provider, Snapshot};
use tokio::sync::watch;
use tracing::debug;

use crate::data::{FilterState, SnapshotSummary, TimeRange, Trend};
use crate::error::ExportError;
use crate::export::ExportReport;
use crate::feed::{FeedStatus, LiveFeed};
use crate::topology::{ConnectionPair, Topology};
use crate::ui::Theme;

/// Default file written by the in-app export key.
pub const DEFAULT_EXPORT_PATH: &str = "latwatch_export.json";

/// Degrees the globe turns per rotate key press.
const GLOBE_STEP_DEG: f64 = 15.0;

/// How long a status message stays visible.
const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Exchange × region latency grid.
    Connections,
    /// Per-pair history over the selected time range.
    Trends,
    /// Projected markers and connection arcs.
    Globe,
}

impl View {
    pub fn next(self) -> Self {
        match self {
            View::Connections => View::Trends,
            View::Trends => View::Globe,
            View::Globe => View::Connections,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            View::Connections => View::Globe,
            View::Trends => View::Connections,
            View::Globe => View::Trends,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            View::Connections => "Connections",
            View::Trends => "Trends",
            View::Globe => "Globe",
        }
    }
}

/// Main application state.
///
/// Owns the user's filter selection and navigation state; everything else
/// is read from the feed.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    feed: LiveFeed,
    status_rx: watch::Receiver<FeedStatus>,
    /// Latest status received from the feed.
    pub status: FeedStatus,
    pairs: Vec<ConnectionPair>,

    pub filter: FilterState,
    pub time_range: TimeRange,

    // Navigation state
    pub selected_exchange_index: usize,
    pub selected_pair_index: usize,
    /// Index into [`Provider::ALL`] for the provider toggle.
    pub provider_cursor: usize,
    /// Globe rotation around the polar axis, in degrees.
    pub globe_yaw: f64,

    pub export_path: PathBuf,

    // UI
    pub theme: Theme,

    // Status message (temporary feedback)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an App over a feed, detecting the terminal theme.
    pub fn new(feed: LiveFeed, time_range: TimeRange) -> Self {
        let mut app = Self::with_theme(feed, Theme::auto_detect());
        app.time_range = time_range;
        app
    }

    pub fn with_theme(feed: LiveFeed, theme: Theme) -> Self {
        let mut status_rx = feed.subscribe();
        let status = status_rx.borrow_and_update().clone();
        let topology = feed.topology().clone();

        Self {
            running: true,
            current_view: View::Connections,
            show_help: false,
            status_rx,
            status,
            pairs: topology.pairs(),
            filter: FilterState::new(&topology),
            time_range: TimeRange::default(),
            selected_exchange_index: 0,
            selected_pair_index: 0,
            provider_cursor: 0,
            globe_yaw: 0.0,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
            theme,
            status_message: None,
            feed,
        }
    }

    pub fn topology(&self) -> &Arc<Topology> {
        self.feed.topology()
    }

    pub fn feed(&self) -> &LiveFeed {
        &self.feed
    }

    pub fn source_description(&self) -> String {
        self.feed.description()
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.status.snapshot.as_deref()
    }

    pub fn pairs(&self) -> &[ConnectionPair] {
        &self.pairs
    }

    /// Pick up the latest feed status if it changed.
    ///
    /// Returns true when a new status was received.
    pub fn poll_feed(&mut self) -> bool {
        if !self.status_rx.has_changed().unwrap_or(false) {
            return false;
        }
        self.status = self.status_rx.borrow_and_update().clone();
        true
    }

    /// Run a cycle immediately instead of waiting for the next tick.
    pub fn refresh_now(&mut self) {
        match self.feed.refresh_now() {
            Ok(_) => self.set_status_message("Refreshed".to_string()),
            Err(e) => self.set_status_message(format!("Refresh failed: {}", e)),
        }
        self.poll_feed();
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        match &self.status_message {
            Some((msg, time)) if time.elapsed() < STATUS_MESSAGE_TTL => Some(msg),
            _ => None,
        }
    }

    /// Readings that pass the current filter.
    pub fn visible_readings(&self) -> Vec<&LatencyReading> {
        match self.snapshot() {
            Some(snapshot) => self.filter.visible_readings(self.topology(), snapshot),
            None => Vec::new(),
        }
    }

    /// Summary over the whole latest snapshot, for the header. Filters
    /// don't change it.
    pub fn summary(&self) -> SnapshotSummary {
        self.snapshot()
            .map(|s| SnapshotSummary::from_readings(s.readings()))
            .unwrap_or_default()
    }

    pub fn next_view(&mut self) {
        self.current_view = self.current_view.next();
    }

    pub fn prev_view(&mut self) {
        self.current_view = self.current_view.prev();
    }

    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
    }

    pub fn select_next(&mut self) {
        self.select_next_n(1);
    }

    pub fn select_prev(&mut self) {
        self.select_prev_n(1);
    }

    pub fn select_next_n(&mut self, n: usize) {
        match self.current_view {
            View::Connections | View::Globe => {
                let max = self.topology().exchanges().len().saturating_sub(1);
                self.selected_exchange_index = (self.selected_exchange_index + n).min(max);
            }
            View::Trends => {
                let max = self.pairs.len().saturating_sub(1);
                self.selected_pair_index = (self.selected_pair_index + n).min(max);
            }
        }
    }

    pub fn select_prev_n(&mut self, n: usize) {
        match self.current_view {
            View::Connections | View::Globe => {
                self.selected_exchange_index = self.selected_exchange_index.saturating_sub(n);
            }
            View::Trends => {
                self.selected_pair_index = self.selected_pair_index.saturating_sub(n);
            }
        }
    }

    pub fn select_first(&mut self) {
        match self.current_view {
            View::Connections | View::Globe => self.selected_exchange_index = 0,
            View::Trends => self.selected_pair_index = 0,
        }
    }

    pub fn select_last(&mut self) {
        match self.current_view {
            View::Connections | View::Globe => {
                self.selected_exchange_index = self.topology().exchanges().len().saturating_sub(1);
            }
            View::Trends => self.selected_pair_index = self.pairs.len().saturating_sub(1),
        }
    }

    pub fn selected_exchange(&self) -> Option<&Exchange> {
        self.topology().exchanges().get(self.selected_exchange_index)
    }

    pub fn selected_pair(&self) -> Option<&ConnectionPair> {
        self.pairs.get(self.selected_pair_index)
    }

    /// The provider under the toggle cursor.
    pub fn cursor_provider(&self) -> Provider {
        Provider::ALL[self.provider_cursor % Provider::ALL.len()]
    }

    pub fn cycle_provider_cursor(&mut self) {
        self.provider_cursor = (self.provider_cursor + 1) % Provider::ALL.len();
    }

    pub fn toggle_cursor_provider(&mut self) {
        let provider = self.cursor_provider();
        self.filter.toggle_provider(provider);
        let state = if self.filter.is_provider_active(provider) { "shown" } else { "hidden" };
        debug!(%provider, state, "Provider toggled");
        self.set_status_message(format!("{} {}", provider, state));
    }

    pub fn toggle_selected_exchange(&mut self) {
        let Some(exchange) = self.selected_exchange() else {
            return;
        };
        let id = exchange.id.clone();
        let name = exchange.name.clone();
        self.filter.toggle_exchange(&id);
        let state = if self.filter.is_exchange_active(id.as_str()) { "shown" } else { "hidden" };
        self.set_status_message(format!("{} {}", name, state));
    }

    pub fn toggle_connections(&mut self) {
        self.filter.toggle_connections();
        let state = if self.filter.show_connections() { "shown" } else { "hidden" };
        self.set_status_message(format!("Connections {}", state));
    }

    pub fn reset_filters(&mut self) {
        let topology = self.topology().clone();
        self.filter.reset(&topology);
        self.set_status_message("Filters reset".to_string());
    }

    pub fn cycle_time_range(&mut self) {
        self.time_range = self.time_range.next();
    }

    /// Trend for the selected pair over the current time range.
    pub fn selected_trend(&self) -> Trend {
        let Some(pair) = self.selected_pair() else {
            return Trend::default();
        };
        self.feed.history().query(
            pair.exchange_id.as_str(),
            pair.region_id.as_str(),
            self.time_range.duration(),
            current_timestamp_ms(),
        )
    }

    pub fn rotate_globe(&mut self, steps: i32) {
        self.globe_yaw = (self.globe_yaw + f64::from(steps) * GLOBE_STEP_DEG).rem_euclid(360.0);
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export current state to a file.
    pub fn export_state(&self, path: &Path) -> Result<(), ExportError> {
        ExportReport::capture(&self.feed, self.time_range).write_to(path)
    }

    /// Whether the last cycle failed.
    pub fn last_error(&self) -> Option<&str> {
        self.status.last_error.as_deref()
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("current_view", &self.current_view)
            .field("filter", &self.filter)
            .field("time_range", &self.time_range)
            .field("cycles", &self.status.cycles)
            .finish_non_exhaustive()
    }
}
