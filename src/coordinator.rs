//! Periodic snapshot refresh with a shared cache
//!
//! The coordinator fetches at most once per interval and hands the same
//! `Arc<Snapshot>` to every caller in between. Refreshes are single-flight:
//! callers that arrive while a fetch is running wait for it and receive its
//! outcome instead of starting a second fetch.

use crate::client::{Snapshot, SnapshotSource};
use crate::error::{LuxtronikError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Outcome of the most recent refresh, as published to subscribers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UpdateStatus {
    /// No refresh has completed yet
    Idle,
    Updated {
        readings: usize,
        at: DateTime<Utc>,
    },
    Failed {
        error: String,
        at: DateTime<Utc>,
    },
}

impl UpdateStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, UpdateStatus::Failed { .. })
    }
}

/// Counters since the coordinator was created
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoordinatorStats {
    pub fetches: u64,
    pub failures: u64,
    pub cache_hits: u64,
}

#[derive(Default)]
struct Counters {
    fetches: AtomicU64,
    failures: AtomicU64,
    cache_hits: AtomicU64,
}

#[derive(Default)]
struct CacheState {
    /// Last good snapshot
    snapshot: Option<Arc<Snapshot>>,
    /// Start of the last attempt, successful or not
    attempted_at: Option<Instant>,
    /// Bumped after every attempt
    generation: u64,
    /// Message of the last attempt if it failed
    last_error: Option<String>,
}

impl CacheState {
    fn is_fresh(&self, interval: Duration) -> bool {
        self.attempted_at
            .map(|at| at.elapsed() < interval)
            .unwrap_or(false)
    }

    /// What a caller gets without fetching
    fn outcome(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = &self.snapshot {
            return Ok(Arc::clone(snapshot));
        }

        let message = self
            .last_error
            .clone()
            .unwrap_or_else(|| "No snapshot available".to_string());
        Err(LuxtronikError::update_failed(message))
    }
}

/// Time-boxed, single-flight cache around a [`SnapshotSource`]
pub struct SnapshotCoordinator {
    source: Arc<dyn SnapshotSource>,
    interval: Duration,
    state: RwLock<CacheState>,
    refresh_lock: Mutex<()>,
    counters: Counters,
    status_tx: watch::Sender<UpdateStatus>,
}

impl SnapshotCoordinator {
    pub fn new(source: Arc<dyn SnapshotSource>, interval: Duration) -> Self {
        let (status_tx, _) = watch::channel(UpdateStatus::Idle);
        Self {
            source,
            interval,
            state: RwLock::new(CacheState::default()),
            refresh_lock: Mutex::new(()),
            counters: Counters::default(),
            status_tx,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Return the cached snapshot, refreshing first if the interval elapsed.
    ///
    /// A caller that waited on a refresh already in flight gets that
    /// refresh's outcome: on failure this is `UpdateFailed` even when an
    /// older good snapshot exists (use [`Self::last_snapshot`] for it).
    /// A caller arriving after a failed attempt, still within the interval,
    /// gets the last good snapshot; with none available the failure is
    /// returned again.
    pub async fn get_snapshot(&self) -> Result<Arc<Snapshot>> {
        let seen_generation = {
            let state = self.state.read().await;
            if state.is_fresh(self.interval) {
                self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
                return state.outcome();
            }
            state.generation
        };

        let _guard = self.refresh_lock.lock().await;

        {
            let state = self.state.read().await;
            if state.generation != seen_generation {
                debug!("Joined refresh completed while waiting");
                self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
                return match &state.last_error {
                    Some(error) => Err(LuxtronikError::update_failed(error.clone())),
                    None => state.outcome(),
                };
            }
        }

        self.refresh_locked().await
    }

    /// Fetch now regardless of the interval
    pub async fn refresh(&self) -> Result<Arc<Snapshot>> {
        let _guard = self.refresh_lock.lock().await;
        self.refresh_locked().await
    }

    /// Last good snapshot, even if later refreshes failed
    pub async fn last_snapshot(&self) -> Option<Arc<Snapshot>> {
        self.state.read().await.snapshot.clone()
    }

    /// Watch refresh outcomes
    pub fn subscribe(&self) -> watch::Receiver<UpdateStatus> {
        self.status_tx.subscribe()
    }

    pub fn stats(&self) -> CoordinatorStats {
        CoordinatorStats {
            fetches: self.counters.fetches.load(Ordering::Relaxed),
            failures: self.counters.failures.load(Ordering::Relaxed),
            cache_hits: self.counters.cache_hits.load(Ordering::Relaxed),
        }
    }

    /// Refresh on every tick of the interval.
    ///
    /// Stops after `rounds` refreshes when given, otherwise runs until the
    /// task is dropped or aborted. Failures are logged and published; the
    /// loop keeps going.
    pub async fn run(&self, rounds: Option<usize>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut completed = 0usize;
        loop {
            if rounds.is_some_and(|limit| completed >= limit) {
                break;
            }
            ticker.tick().await;

            if let Err(e) = self.refresh().await {
                debug!("Polling round {} failed: {}", completed + 1, e);
            }
            completed += 1;
        }

        info!("Polling stopped after {} rounds", completed);
    }

    /// Run [`Self::run`] in a background task
    pub fn spawn_polling(self: &Arc<Self>) -> JoinHandle<()> {
        let coordinator = Arc::clone(self);
        tokio::spawn(async move { coordinator.run(None).await })
    }

    /// Caller must hold `refresh_lock`
    async fn refresh_locked(&self) -> Result<Arc<Snapshot>> {
        let started = Instant::now();
        self.counters.fetches.fetch_add(1, Ordering::Relaxed);

        let result = self.source.fetch_snapshot().await;

        let mut state = self.state.write().await;
        state.attempted_at = Some(started);
        state.generation += 1;

        match result {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                state.snapshot = Some(Arc::clone(&snapshot));
                state.last_error = None;
                drop(state);

                info!(
                    readings = snapshot.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Snapshot refreshed"
                );
                self.status_tx.send_replace(UpdateStatus::Updated {
                    readings: snapshot.len(),
                    at: snapshot.fetched_at(),
                });
                Ok(snapshot)
            }
            Err(e) => {
                let message = e.to_string();
                state.last_error = Some(message.clone());
                drop(state);

                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                warn!(error_type = e.error_type(), "Snapshot refresh failed: {}", message);
                self.status_tx.send_replace(UpdateStatus::Failed {
                    error: e.sanitized_message(),
                    at: Utc::now(),
                });
                Err(LuxtronikError::update_failed(message))
            }
        }
    }
}
