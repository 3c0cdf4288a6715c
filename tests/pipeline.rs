//! End-to-end: source → feed → history → filter → trend → projection.

use std::sync::Arc;
use std::time::Duration;

use latwatch::data::trend;
use latwatch::geo::{self, GLOBE_RADIUS, MARKER_OFFSET};
use latwatch::{
    ExchangeId, FeedConfig, FilterState, LatencySource, LiveFeed, Provider, SimulatedSource, Status,
    TimeRange, Topology,
};

fn feed(capacity: usize) -> LiveFeed {
    LiveFeed::new(
        Arc::new(Topology::builtin()),
        Box::new(SimulatedSource::seeded(2024)),
        FeedConfig {
            interval: Duration::from_secs(7),
            history_capacity: capacity,
        },
    )
    .unwrap()
}

#[test]
fn one_cycle_covers_every_pair() {
    let feed = feed(500);
    let snapshot = feed.refresh_now().unwrap();

    assert_eq!(snapshot.len(), 30);
    for reading in snapshot.iter() {
        assert_eq!(reading.timestamp_ms(), snapshot.timestamp_ms());
        assert_eq!(reading.status(), Status::from_ms(reading.ms()));
        assert!((5..200).contains(&reading.ms()));
    }
    assert_eq!(feed.history().readings().len(), 30);
}

#[test]
fn history_evicts_oldest_past_capacity() {
    let feed = feed(500);
    for _ in 0..17 {
        feed.refresh_now().unwrap();
    }

    // 17 × 30 = 510 appended, 10 evicted.
    let readings = feed.history().readings();
    assert_eq!(readings.len(), 500);

    let first_cycle_ts = readings[0].timestamp_ms();
    let last = readings.last().unwrap();
    assert_eq!(Some(last.timestamp_ms()), feed.snapshot().map(|s| s.timestamp_ms()));
    assert!(first_cycle_ts <= last.timestamp_ms());
}

#[test]
fn filter_then_trend_then_project() {
    let feed = feed(500);
    for _ in 0..3 {
        feed.refresh_now().unwrap();
    }
    let topology = feed.topology();
    let snapshot = feed.snapshot().unwrap();

    let mut filter = FilterState::new(topology);
    filter.toggle_provider(Provider::Azure);
    filter.toggle_exchange(&ExchangeId::new("deribit_eu"));

    let visible = filter.visible_readings(topology, &snapshot);
    // Bybit (Azure) and Deribit drop out: 4 exchanges × 5 regions.
    assert_eq!(visible.len(), 20);
    assert_eq!(filter.visible_regions(topology).len(), 4);

    let now = snapshot.timestamp_ms();
    let window = TimeRange::Hour.duration();
    let trend = feed.history().query("okx_eu_w", "gcp_eu_w", window, now);
    assert_eq!(trend.series.len(), 3);
    assert!(trend.stats.min <= trend.stats.avg && trend.stats.avg <= trend.stats.max);

    // The free function agrees with the accessor.
    let readings = feed.history().readings();
    assert_eq!(trend::query(&readings, "okx_eu_w", "gcp_eu_w", window, now), trend);

    for connection in filter.visible_connections(topology, &snapshot) {
        let radius = GLOBE_RADIUS + MARKER_OFFSET;
        assert!((connection.start.length() - radius).abs() < 1e-9);
        assert!((connection.end.length() - radius).abs() < 1e-9);
        let arc = geo::connection_arc(connection.start, connection.end, geo::ARC_SEGMENTS);
        assert_eq!(arc.first(), Some(&connection.start));
        assert_eq!(arc.last(), Some(&connection.end));
    }
}

#[test]
fn seeded_sources_replay() {
    let topology = Topology::builtin();
    let mut a = SimulatedSource::seeded(77);
    let mut b = SimulatedSource::seeded(77);

    for _ in 0..5 {
        let sa = a.generate(topology.exchanges(), topology.regions()).unwrap();
        let sb = b.generate(topology.exchanges(), topology.regions()).unwrap();
        let ma: Vec<u32> = sa.iter().map(|r| r.ms()).collect();
        let mb: Vec<u32> = sb.iter().map(|r| r.ms()).collect();
        assert_eq!(ma, mb);
    }
}

#[tokio::test(start_paused = true)]
async fn background_feed_publishes_until_shutdown() {
    let feed = feed(500);
    let mut rx = feed.subscribe();
    let handle = feed.start().unwrap();

    rx.wait_for(|s| s.cycles >= 3).await.unwrap();
    handle.shutdown().await;

    let status = feed.status();
    assert!(!status.is_fetching);
    assert!(status.snapshot.is_some());
    assert_eq!(feed.history().len() as u64, status.cycles * 30);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(feed.status().cycles, status.cycles);
}
