use std::sync::Arc;

use rand::Rng;
use terranova_core::error::CoreError;
use terranova_core::feed::{AlertFeed, FeedConfig};
use terranova_core::history::HistoryStore;
use terranova_core::metrics::ReadingSnapshot;
use terranova_core::series::{ChartSeries, Period};
use terranova_core::simulator::MetricsSimulator;
use terranova_core::thresholds::ThresholdTable;
use terranova_events::EventBus;
use tokio::sync::{watch, Mutex, RwLock};

use crate::clock::Clock;
use crate::config::ServerConfig;
use crate::reply::{ChatService, ReplyGenerator};

/// An alert feed shared between the feed router, the sweep task and handlers.
pub type SharedFeed = Arc<Mutex<AlertFeed>>;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Event bus for readings and alert lifecycle events.
    pub event_bus: Arc<EventBus>,
    /// Latest simulated readings. Only the simulator task writes.
    pub readings: watch::Receiver<ReadingSnapshot>,
    /// Alert bounds per metric. Immutable after startup.
    pub thresholds: Arc<ThresholdTable>,
    /// Transient notifications (threshold alerts only).
    pub notifications: SharedFeed,
    /// Persistent, capped activity list (threshold alerts and farm activity).
    pub activity: SharedFeed,
    /// Historical readings table.
    pub history: Arc<RwLock<HistoryStore>>,
    /// Rolling live chart series.
    pub live_series: Arc<RwLock<ChartSeries>>,
    /// Chat conversation front-end.
    pub chat: Arc<ChatService>,
    /// Time source for readings, history and alert lifetimes.
    pub clock: Clock,
}

/// Write side of the current readings, owned by the simulator task.
pub struct ReadingsWriter {
    simulator: MetricsSimulator,
    sender: watch::Sender<ReadingSnapshot>,
    clock: Clock,
}

impl ReadingsWriter {
    /// Advance the simulator and publish the new snapshot to every reader.
    pub fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> ReadingSnapshot {
        let snapshot = self.simulator.tick(rng, self.clock.now()).clone();
        self.sender.send_replace(snapshot.clone());
        snapshot
    }
}

impl AppState {
    /// Build the in-memory state: seeded readings, feeds, backfilled history
    /// and an initial live chart.
    ///
    /// Returns the readings writer separately so exactly one task owns it.
    pub fn build(
        config: ServerConfig,
        generator: Arc<dyn ReplyGenerator>,
    ) -> Result<(Self, ReadingsWriter), CoreError> {
        let dashboard = &config.dashboard;
        dashboard.validate()?;
        let clock = Clock::start();
        let now = clock.now();

        let notifications = AlertFeed::new(FeedConfig::new(dashboard.alert_lifetime, None)?);
        let activity = AlertFeed::new(FeedConfig::new(
            dashboard.activity_lifetime,
            Some(dashboard.activity_capacity),
        )?);

        let thresholds =
            ThresholdTable::default().with_legacy_air_quality(dashboard.legacy_air_quality);

        let simulator = MetricsSimulator::new(now);
        let (sender, readings) = watch::channel(simulator.snapshot().clone());

        let mut rng = rand::rng();
        let mut history = HistoryStore::new();
        history.backfill(dashboard.history_backfill, now, &mut rng);
        let live_series = ChartSeries::generate(Period::Day, now, &mut rng);

        tracing::debug!(
            history_rows = history.len(),
            legacy_air_quality = dashboard.legacy_air_quality,
            "Dashboard state initialised"
        );

        let state = Self {
            config: Arc::new(config),
            event_bus: Arc::new(EventBus::default()),
            readings,
            thresholds: Arc::new(thresholds),
            notifications: Arc::new(Mutex::new(notifications)),
            activity: Arc::new(Mutex::new(activity)),
            history: Arc::new(RwLock::new(history)),
            live_series: Arc::new(RwLock::new(live_series)),
            chat: Arc::new(ChatService::new(generator)),
            clock,
        };

        Ok((
            state,
            ReadingsWriter {
                simulator,
                sender,
                clock,
            },
        ))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState").finish_non_exhaustive()
    }
}

impl std::fmt::Debug for ReadingsWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadingsWriter").finish_non_exhaustive()
    }
}
