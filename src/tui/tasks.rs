//! Background work spawned by the event loop.
//!
//! Every task reports back by sending an `Action` over the std mpsc channel
//! the loop drains each iteration. A failed send means the loop has exited,
//! so the task stops there.

use std::sync::{Arc, mpsc};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::api::{Backend, clear_and_refresh, fetch_status};
use crate::core::action::Action;

/// Poll health and cache stats: once at startup, held back until
/// `loader_min` has passed, then every `every`.
///
/// `emit` returns false once nobody is listening, which ends the loop.
pub async fn poll_loop<F>(backend: Arc<dyn Backend>, every: Duration, loader_min: Duration, mut emit: F)
where
    F: FnMut(Action) -> bool,
{
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; later ticks are `every` apart.
    ticker.tick().await;

    let started = Instant::now();
    let result = fetch_status(backend.as_ref()).await;
    tokio::time::sleep_until(started + loader_min).await;
    info!(
        "Initial status poll settled after {:?} (ok={})",
        started.elapsed(),
        result.is_ok()
    );
    if !emit(Action::StatusPolled {
        initial: true,
        result,
    }) {
        debug!("Poller stopping: receiver dropped");
        return;
    }

    loop {
        ticker.tick().await;
        let result = fetch_status(backend.as_ref()).await;
        if !emit(Action::StatusPolled {
            initial: false,
            result,
        }) {
            debug!("Poller stopping: receiver dropped");
            return;
        }
    }
}

pub fn spawn_poller(
    backend: Arc<dyn Backend>,
    every: Duration,
    loader_min: Duration,
    tx: mpsc::Sender<Action>,
) -> JoinHandle<()> {
    info!("Starting status poller (every {:?}, loader floor {:?})", every, loader_min);
    tokio::spawn(poll_loop(backend, every, loader_min, move |action| {
        tx.send(action).is_ok()
    }))
}

pub fn spawn_query(
    backend: Arc<dyn Backend>,
    entry_id: Uuid,
    repo_url: String,
    query: String,
    tx: mpsc::Sender<Action>,
) -> JoinHandle<()> {
    info!("Spawning query request (entry={})", entry_id);
    tokio::spawn(async move {
        let result = backend.query(&repo_url, &query).await;
        if tx.send(Action::QueryFinished { entry_id, result }).is_err() {
            warn!("Dropping query result for entry {}: receiver dropped", entry_id);
        }
    })
}

pub fn spawn_clear_cache(backend: Arc<dyn Backend>, tx: mpsc::Sender<Action>) -> JoinHandle<()> {
    info!("Spawning cache clear");
    tokio::spawn(async move {
        let outcome = clear_and_refresh(backend.as_ref()).await;
        if tx.send(Action::CacheCleared(outcome)).is_err() {
            warn!("Dropping cache clear outcome: receiver dropped");
        }
    })
}
