use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use super::fetch::{FetchError, SnapshotSource};
use super::snapshot::GraphSnapshot;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

type FetchResult = Result<GraphSnapshot, FetchError>;
type Waker = Arc<dyn Fn() + Send + Sync>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedStatus {
    Loading,
    Ready,
    Error,
}

impl FeedStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "live",
            Self::Error => "error",
        }
    }
}

/// Latest known graph state. Only the last fetch outcome decides `status`;
/// `snapshot` keeps the last good data across failures.
#[derive(Clone, Debug)]
pub struct FeedState {
    pub status: FeedStatus,
    pub snapshot: Option<Arc<GraphSnapshot>>,
    pub last_update: Option<SystemTime>,
    pub error: Option<String>,
    pub revision: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            status: FeedStatus::Loading,
            snapshot: None,
            last_update: None,
            error: None,
            revision: 0,
        }
    }
}

pub struct SnapshotFeed {
    source: Arc<dyn SnapshotSource>,
    interval: Duration,
    state: FeedState,
    next_tick: Option<Instant>,
    in_flight: Option<Receiver<FetchResult>>,
    waker: Option<Waker>,
    skipped_ticks: u64,
}

impl SnapshotFeed {
    pub fn new(source: Arc<dyn SnapshotSource>, interval: Duration) -> Self {
        Self {
            source,
            interval,
            state: FeedState::default(),
            next_tick: None,
            in_flight: None,
            waker: None,
            skipped_ticks: 0,
        }
    }

    /// Called from the worker thread after every completed fetch.
    pub fn with_waker(mut self, waker: impl Fn() + Send + Sync + 'static) -> Self {
        self.waker = Some(Arc::new(waker));
        self
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn endpoint(&self) -> &str {
        self.source.endpoint()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.next_tick.is_some()
    }

    pub fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn skipped_ticks(&self) -> u64 {
        self.skipped_ticks
    }

    /// Issues the first fetch right away and keeps ticking every `interval`.
    pub fn start(&mut self, now: Instant) {
        if self.is_running() {
            return;
        }

        log::info!(
            "polling {} every {} ms",
            self.source.endpoint(),
            self.interval.as_millis()
        );
        self.next_tick = Some(now);
        self.poll(now);
    }

    pub fn stop(&mut self) {
        if self.in_flight.take().is_some() {
            log::debug!("abandoning in-flight snapshot request");
        }
        if self.next_tick.take().is_some() {
            log::info!("stopped polling {}", self.source.endpoint());
        }
    }

    /// One unscheduled tick. Returns `false` when the feed is stopped or a fetch
    /// is already pending.
    pub fn refresh_now(&mut self) -> bool {
        if !self.is_running() {
            log::debug!("manual refresh ignored, polling is stopped");
            return false;
        }
        if self.in_flight.is_some() {
            log::debug!("manual refresh ignored, a fetch is already in flight");
            return false;
        }

        self.spawn_fetch();
        true
    }

    /// Drains a finished fetch and fires the schedule when due.
    /// Returns `true` when `state()` changed.
    pub fn poll(&mut self, now: Instant) -> bool {
        let changed = self.collect_in_flight();

        if let Some(due) = self.next_tick
            && now >= due
        {
            if self.in_flight.is_some() {
                self.skipped_ticks += 1;
                log::debug!("previous snapshot request still pending, skipping tick");
            } else {
                self.spawn_fetch();
            }

            let mut next = due + self.interval;
            if next <= now {
                next = now + self.interval;
            }
            self.next_tick = Some(next);
        }

        changed
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.next_tick.map(|due| due.saturating_duration_since(now))
    }

    fn spawn_fetch(&mut self) {
        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        let waker = self.waker.clone();

        thread::spawn(move || {
            let result = source.fetch();
            let _ = tx.send(result);
            if let Some(waker) = waker {
                waker();
            }
        });

        self.in_flight = Some(rx);
    }

    fn collect_in_flight(&mut self) -> bool {
        let Some(rx) = self.in_flight.take() else {
            return false;
        };

        match rx.try_recv() {
            Ok(result) => {
                self.apply(result);
                true
            }
            Err(TryRecvError::Empty) => {
                self.in_flight = Some(rx);
                false
            }
            Err(TryRecvError::Disconnected) => {
                self.apply_error("snapshot worker disconnected".to_owned());
                true
            }
        }
    }

    fn apply(&mut self, result: FetchResult) {
        match result {
            Ok(snapshot) => {
                log::debug!(
                    "snapshot received: {} nodes, {} edges, route of {}",
                    snapshot.nodes.len(),
                    snapshot.edges.len(),
                    snapshot.best_route.len()
                );
                if self.state.status == FeedStatus::Error {
                    log::info!("snapshot feed recovered");
                }
                self.state.status = FeedStatus::Ready;
                self.state.snapshot = Some(Arc::new(snapshot));
                self.state.last_update = Some(SystemTime::now());
                self.state.error = None;
                self.state.revision += 1;
            }
            Err(error) => self.apply_error(error.to_string()),
        }
    }

    fn apply_error(&mut self, message: String) {
        log::warn!("snapshot fetch failed: {message}");
        self.state.status = FeedStatus::Error;
        self.state.error = Some(message);
    }

    #[cfg(test)]
    pub(super) fn wait_for_fetch(&mut self, timeout: Duration) -> bool {
        let Some(rx) = self.in_flight.take() else {
            return false;
        };

        match rx.recv_timeout(timeout) {
            Ok(result) => {
                self.apply(result);
                true
            }
            Err(_) => {
                self.in_flight = Some(rx);
                false
            }
        }
    }
}

impl Drop for SnapshotFeed {
    fn drop(&mut self) {
        self.stop();
    }
}
