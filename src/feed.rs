//! The live feed: periodic snapshot generation with a watch subscription.
//!
//! A [`LiveFeed`] owns the source, the history buffer and the latest
//! status. [`LiveFeed::start`] spawns one tokio task that runs a cycle
//! immediately and then once per interval until the returned
//! [`FeedHandle`] is stopped or dropped.
//!
//! ```text
//! tick ──▶ source.generate() ──▶ history.append()
//!                            └──▶ status.send_modify() ──▶ subscribers
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use latwatch_types::{LatencyReading, Snapshot};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::data::{HistoryBuffer, Trend, DEFAULT_HISTORY_CAPACITY};
use crate::error::{ConfigError, FeedError, GenerateError};
use crate::source::LatencySource;
use crate::topology::Topology;

/// Default time between generation cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(7_000);

/// Scheduling and retention settings for a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedConfig {
    pub interval: Duration,
    pub history_capacity: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval.is_zero() {
            return Err(ConfigError::ZeroInterval);
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// What subscribers see. Published at the start and end of every cycle.
#[derive(Debug, Clone, Default)]
pub struct FeedStatus {
    /// Latest successful snapshot; `None` until the first cycle succeeds.
    pub snapshot: Option<Arc<Snapshot>>,
    pub is_fetching: bool,
    /// Completed cycles, successful or not.
    pub cycles: u64,
    pub failures: u64,
    /// Message from the most recent cycle, cleared on success.
    pub last_error: Option<String>,
}

#[derive(Debug)]
struct Shared {
    topology: Arc<Topology>,
    source: Mutex<Box<dyn LatencySource>>,
    history: RwLock<HistoryBuffer>,
    status: watch::Sender<FeedStatus>,
    /// Set while a periodic task owns this feed.
    running: AtomicBool,
}

/// Clears `is_fetching` however the cycle exits.
struct FetchGuard<'a>(&'a watch::Sender<FeedStatus>);

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.send_if_modified(|status| std::mem::replace(&mut status.is_fetching, false));
    }
}

impl Shared {
    /// Run one cycle. Returns `Ok(None)` when `cancelled` was set before
    /// the result could be committed.
    fn cycle(&self, cancelled: &AtomicBool) -> Result<Option<Arc<Snapshot>>, GenerateError> {
        if cancelled.load(Ordering::SeqCst) {
            return Ok(None);
        }

        self.status.send_modify(|status| status.is_fetching = true);
        let _guard = FetchGuard(&self.status);

        let generated = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut source = self.source.lock();
            source.generate(self.topology.exchanges(), self.topology.regions())
        }))
        .unwrap_or_else(|payload| Err(GenerateError::Panicked(panic_message(payload))));

        // History and status are committed together under the write lock,
        // so a stop that takes this lock afterwards sees no further commits.
        let mut history = self.history.write();
        if cancelled.load(Ordering::SeqCst) {
            debug!("Discarding cycle result after stop");
            return Ok(None);
        }

        match generated {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                history.append(snapshot.readings().iter().cloned());
                self.status.send_modify(|status| {
                    status.snapshot = Some(snapshot.clone());
                    status.is_fetching = false;
                    status.cycles += 1;
                    status.last_error = None;
                });
                debug!(
                    readings = snapshot.len(),
                    history = history.len(),
                    "Published latency snapshot"
                );
                Ok(Some(snapshot))
            }
            Err(e) => {
                warn!(error = %e, "Latency generation failed, keeping previous snapshot");
                self.status.send_modify(|status| {
                    status.is_fetching = false;
                    status.cycles += 1;
                    status.failures += 1;
                    status.last_error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Owns the source, history and status for one topology.
///
/// Cheap to clone; clones share the same state.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use latwatch::{FeedConfig, LiveFeed, SimulatedSource, Topology};
///
/// let feed = LiveFeed::new(
///     Arc::new(Topology::builtin()),
///     Box::new(SimulatedSource::seeded(1)),
///     FeedConfig::default(),
/// )
/// .unwrap();
///
/// let snapshot = feed.refresh_now().unwrap();
/// assert_eq!(snapshot.len(), 30);
/// assert_eq!(feed.history().len(), 30);
/// assert!(!feed.status().is_fetching);
/// ```
#[derive(Debug, Clone)]
pub struct LiveFeed {
    shared: Arc<Shared>,
    config: FeedConfig,
}

impl LiveFeed {
    /// Create a feed. The config is validated here so that a running feed
    /// never has a zero interval or capacity.
    pub fn new(
        topology: Arc<Topology>,
        source: Box<dyn LatencySource>,
        config: FeedConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (status, _) = watch::channel(FeedStatus::default());
        Ok(Self {
            shared: Arc::new(Shared {
                topology,
                source: Mutex::new(source),
                history: RwLock::new(HistoryBuffer::new(config.history_capacity)),
                status,
                running: AtomicBool::new(false),
            }),
            config,
        })
    }

    pub fn topology(&self) -> &Arc<Topology> {
        &self.shared.topology
    }

    pub fn config(&self) -> FeedConfig {
        self.config
    }

    /// Description of the underlying source.
    pub fn description(&self) -> String {
        self.shared.source.lock().description().to_string()
    }

    /// Run one cycle on the calling thread.
    ///
    /// On failure the previous snapshot stays published and the error is
    /// recorded in [`FeedStatus::last_error`] as well as returned.
    pub fn refresh_now(&self) -> Result<Arc<Snapshot>, GenerateError> {
        let never = AtomicBool::new(false);
        self.shared
            .cycle(&never)?
            .ok_or_else(|| GenerateError::Failed("cycle cancelled".to_string()))
    }

    /// Start periodic generation on the current tokio runtime.
    ///
    /// The first cycle runs immediately. Cycles never overlap. A feed (or
    /// any clone of it) runs at most one periodic task at a time; start it
    /// again only after the previous handle was stopped.
    pub fn start(&self) -> Result<FeedHandle, FeedError> {
        if self
            .shared
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Latency feed already running, ignoring start");
            return Err(FeedError::AlreadyRunning);
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let cancelled = Arc::new(AtomicBool::new(false));

        let shared = self.shared.clone();
        let flag = cancelled.clone();
        let period = self.config.interval;

        info!(
            interval_ms = period.as_millis() as u64,
            history_capacity = self.config.history_capacity,
            "Starting latency feed"
        );

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        // Failures are logged and recorded in the status.
                        let _ = shared.cycle(&flag);
                    }
                }
            }
            debug!("Latency feed stopped");
        });

        Ok(FeedHandle {
            stop_tx,
            cancelled,
            task: Some(task),
            shared: self.shared.clone(),
        })
    }

    /// Subscribe to status updates. The receiver starts with the current value.
    pub fn subscribe(&self) -> watch::Receiver<FeedStatus> {
        self.shared.status.subscribe()
    }

    /// Copy of the current status.
    pub fn status(&self) -> FeedStatus {
        self.shared.status.borrow().clone()
    }

    /// Latest successful snapshot.
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.shared.status.borrow().snapshot.clone()
    }

    /// Read-only access to the history buffer.
    pub fn history(&self) -> HistoryView {
        HistoryView {
            shared: self.shared.clone(),
        }
    }
}

/// Read-only view of a feed's history. Each call takes a short read lock.
#[derive(Debug, Clone)]
pub struct HistoryView {
    shared: Arc<Shared>,
}

impl HistoryView {
    /// Copy of all readings, oldest first.
    pub fn readings(&self) -> Vec<LatencyReading> {
        self.shared.history.read().to_vec()
    }

    pub fn len(&self) -> usize {
        self.shared.history.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.history.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.shared.history.read().capacity()
    }

    /// Trend for one pair over `window` ending at `now_ms`.
    pub fn query(
        &self,
        exchange_id: &str,
        region_id: &str,
        window: Duration,
        now_ms: u64,
    ) -> Trend {
        self.shared
            .history
            .read()
            .trend(exchange_id, region_id, window, now_ms)
    }
}

/// Handle for controlling a running feed.
///
/// Dropping the handle stops the feed; [`FeedHandle::shutdown`] also waits
/// for the task to exit.
#[derive(Debug)]
pub struct FeedHandle {
    stop_tx: watch::Sender<bool>,
    cancelled: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
    shared: Arc<Shared>,
}

impl FeedHandle {
    /// Stop the feed. Once this returns no further cycle is committed.
    pub fn stop(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        // Wait out any commit that started before the flag was set.
        drop(self.shared.history.write());
        self.shared.running.store(false, Ordering::SeqCst);
        let _ = self.stop_tx.send(true);
        debug!("Latency feed stop requested");
    }

    pub fn is_stopped(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Stop the feed and wait for its task to finish.
    pub async fn shutdown(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Latency feed task ended abnormally");
            }
        }
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SimulatedSource;
    use latwatch_types::{Exchange, Region};
    use tokio::time::Instant;

    /// Fails while `fail` is set, otherwise delegates to a seeded source.
    #[derive(Debug)]
    struct FlakySource {
        inner: SimulatedSource,
        fail: Arc<AtomicBool>,
    }

    impl LatencySource for FlakySource {
        fn generate(
            &mut self,
            exchanges: &[Exchange],
            regions: &[Region],
        ) -> Result<Snapshot, GenerateError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(GenerateError::Failed("probe timed out".to_string()));
            }
            self.inner.generate(exchanges, regions)
        }

        fn description(&self) -> &str {
            "flaky"
        }
    }

    #[derive(Debug)]
    struct PanickingSource;

    impl LatencySource for PanickingSource {
        fn generate(&mut self, _: &[Exchange], _: &[Region]) -> Result<Snapshot, GenerateError> {
            panic!("source exploded");
        }

        fn description(&self) -> &str {
            "panicking"
        }
    }

    /// Records the published `is_fetching` flag from inside `generate`.
    #[derive(Debug)]
    struct WatchingSource {
        inner: SimulatedSource,
        status: Arc<Mutex<Option<watch::Receiver<FeedStatus>>>>,
        seen: Arc<Mutex<Vec<bool>>>,
    }

    impl LatencySource for WatchingSource {
        fn generate(
            &mut self,
            exchanges: &[Exchange],
            regions: &[Region],
        ) -> Result<Snapshot, GenerateError> {
            if let Some(rx) = self.status.lock().as_ref() {
                self.seen.lock().push(rx.borrow().is_fetching);
            }
            self.inner.generate(exchanges, regions)
        }

        fn description(&self) -> &str {
            "watching"
        }
    }

    fn feed_with(source: Box<dyn LatencySource>, config: FeedConfig) -> LiveFeed {
        LiveFeed::new(Arc::new(Topology::builtin()), source, config).unwrap()
    }

    fn simulated_feed(config: FeedConfig) -> LiveFeed {
        feed_with(Box::new(SimulatedSource::seeded(11)), config)
    }

    #[test]
    fn default_config() {
        let config = FeedConfig::default();
        assert_eq!(config.interval, Duration::from_millis(7_000));
        assert_eq!(config.history_capacity, 500);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn config_rejects_zero_values() {
        let zero_capacity = FeedConfig {
            history_capacity: 0,
            ..FeedConfig::default()
        };
        assert!(matches!(zero_capacity.validate(), Err(ConfigError::ZeroCapacity)));

        let zero_interval = FeedConfig {
            interval: Duration::ZERO,
            ..FeedConfig::default()
        };
        assert!(matches!(zero_interval.validate(), Err(ConfigError::ZeroInterval)));
    }

    #[test]
    fn refresh_now_publishes_snapshot() {
        let feed = simulated_feed(FeedConfig::default());
        let rx = feed.subscribe();
        assert!(rx.borrow().snapshot.is_none());

        let snapshot = feed.refresh_now().unwrap();

        let status = rx.borrow().clone();
        assert!(!status.is_fetching);
        assert_eq!(status.cycles, 1);
        assert_eq!(status.snapshot.as_deref(), Some(snapshot.as_ref()));
        assert_eq!(feed.history().len(), 30);
    }

    #[test]
    fn failure_keeps_previous_snapshot() {
        let fail = Arc::new(AtomicBool::new(false));
        let source = FlakySource {
            inner: SimulatedSource::seeded(2),
            fail: fail.clone(),
        };
        let feed = feed_with(Box::new(source), FeedConfig::default());

        let first = feed.refresh_now().unwrap();
        fail.store(true, Ordering::SeqCst);
        let err = feed.refresh_now().unwrap_err();
        assert!(matches!(err, GenerateError::Failed(_)));

        let status = feed.status();
        assert!(!status.is_fetching);
        assert_eq!(status.snapshot.as_deref(), Some(first.as_ref()));
        assert_eq!(status.failures, 1);
        assert_eq!(status.last_error.as_deref(), Some("sample generation failed: probe timed out"));
        assert_eq!(feed.history().len(), 30);

        fail.store(false, Ordering::SeqCst);
        feed.refresh_now().unwrap();
        assert!(feed.status().last_error.is_none());
        assert_eq!(feed.history().len(), 60);
    }

    #[test]
    fn panic_in_source_is_contained() {
        let feed = feed_with(Box::new(PanickingSource), FeedConfig::default());

        let err = feed.refresh_now().unwrap_err();
        assert!(matches!(err, GenerateError::Panicked(ref msg) if msg == "source exploded"));

        let status = feed.status();
        assert!(!status.is_fetching);
        assert!(status.snapshot.is_none());
        assert!(feed.history().is_empty());
    }

    #[test]
    fn history_is_capped() {
        let feed = simulated_feed(FeedConfig {
            history_capacity: 45,
            ..FeedConfig::default()
        });
        feed.refresh_now().unwrap();
        feed.refresh_now().unwrap();

        let history = feed.history();
        assert_eq!(history.len(), 45);
        assert_eq!(history.capacity(), 45);
    }

    #[test]
    fn history_query_uses_buffer() {
        let feed = simulated_feed(FeedConfig::default());
        let snapshot = feed.refresh_now().unwrap();
        let reading = snapshot.get("okx_eu_w", "gcp_eu_w").unwrap();

        let trend = feed.history().query(
            "okx_eu_w",
            "gcp_eu_w",
            Duration::from_secs(3_600),
            snapshot.timestamp_ms(),
        );
        assert_eq!(trend.series.len(), 1);
        assert_eq!(trend.stats.min, reading.ms());
        assert_eq!(trend.stats.avg, reading.ms());
    }

    #[tokio::test(start_paused = true)]
    async fn start_runs_immediately_then_on_interval() {
        let feed = simulated_feed(FeedConfig::default());
        let mut rx = feed.subscribe();
        let started = Instant::now();
        let handle = feed.start().unwrap();

        rx.wait_for(|s| s.cycles >= 1).await.unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));

        rx.wait_for(|s| s.cycles >= 2).await.unwrap();
        assert!(started.elapsed() >= DEFAULT_INTERVAL);

        rx.wait_for(|s| s.cycles >= 3).await.unwrap();
        assert!(started.elapsed() >= DEFAULT_INTERVAL * 2);
        assert_eq!(feed.history().len(), 90);

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn no_cycles_after_shutdown() {
        let feed = simulated_feed(FeedConfig {
            interval: Duration::from_secs(1),
            ..FeedConfig::default()
        });
        let mut rx = feed.subscribe();
        let handle = feed.start().unwrap();

        rx.wait_for(|s| s.cycles >= 2).await.unwrap();
        handle.shutdown().await;
        let cycles = feed.status().cycles;
        let history = feed.history().len();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(feed.status().cycles, cycles);
        assert_eq!(feed.history().len(), history);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_feed() {
        let feed = simulated_feed(FeedConfig {
            interval: Duration::from_secs(1),
            ..FeedConfig::default()
        });
        let mut rx = feed.subscribe();
        let handle = feed.start().unwrap();

        rx.wait_for(|s| s.cycles >= 1).await.unwrap();
        assert!(!handle.is_stopped());
        drop(handle);
        let cycles = feed.status().cycles;

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(feed.status().cycles, cycles);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_cycles_keep_running() {
        let fail = Arc::new(AtomicBool::new(true));
        let source = FlakySource {
            inner: SimulatedSource::seeded(4),
            fail: fail.clone(),
        };
        let feed = feed_with(
            Box::new(source),
            FeedConfig {
                interval: Duration::from_secs(1),
                ..FeedConfig::default()
            },
        );
        let mut rx = feed.subscribe();
        let handle = feed.start().unwrap();

        rx.wait_for(|s| s.failures >= 2).await.unwrap();
        assert!(feed.snapshot().is_none());

        fail.store(false, Ordering::SeqCst);
        rx.wait_for(|s| s.snapshot.is_some()).await.unwrap();
        let status = feed.status();
        assert!(!status.is_fetching);
        assert!(status.last_error.is_none());

        handle.shutdown().await;
    }

    #[test]
    fn new_rejects_invalid_config() {
        let build = |config| {
            LiveFeed::new(
                Arc::new(Topology::builtin()),
                Box::new(SimulatedSource::seeded(1)),
                config,
            )
        };

        let zero_interval = FeedConfig {
            interval: Duration::ZERO,
            ..FeedConfig::default()
        };
        assert!(matches!(build(zero_interval), Err(ConfigError::ZeroInterval)));

        let zero_capacity = FeedConfig {
            history_capacity: 0,
            ..FeedConfig::default()
        };
        assert!(matches!(build(zero_capacity), Err(ConfigError::ZeroCapacity)));
    }

    #[test]
    fn is_fetching_is_published_during_generation() {
        let slot = Arc::new(Mutex::new(None));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let source = WatchingSource {
            inner: SimulatedSource::seeded(6),
            status: slot.clone(),
            seen: seen.clone(),
        };
        let feed = feed_with(Box::new(source), FeedConfig::default());
        *slot.lock() = Some(feed.subscribe());

        feed.refresh_now().unwrap();
        feed.refresh_now().unwrap();

        assert_eq!(*seen.lock(), vec![true, true]);
        assert!(!feed.status().is_fetching);
    }

    #[tokio::test(start_paused = true)]
    async fn second_start_is_rejected_until_stopped() {
        let feed = simulated_feed(FeedConfig {
            interval: Duration::from_secs(1),
            ..FeedConfig::default()
        });
        let mut rx = feed.subscribe();

        let handle = feed.start().unwrap();
        assert!(matches!(feed.start(), Err(FeedError::AlreadyRunning)));
        assert!(matches!(feed.clone().start(), Err(FeedError::AlreadyRunning)));

        rx.wait_for(|s| s.cycles >= 3).await.unwrap();
        // One timer: three cycles in, the history holds exactly three snapshots.
        assert_eq!(feed.history().len(), 90);
        handle.shutdown().await;

        let cycles = feed.status().cycles;
        let handle = feed.start().unwrap();
        rx.wait_for(|s| s.cycles > cycles).await.unwrap();
        handle.shutdown().await;
    }
}
