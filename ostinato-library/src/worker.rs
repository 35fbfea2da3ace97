//! Background load worker with supersession
//!
//! Decoding happens off the UI thread. Every request is stamped with a
//! monotonically increasing generation ticket; an outcome may only be
//! installed while its ticket is still the latest one issued. A slow first
//! file can therefore never clobber a fast second file requested after it -
//! the stale result is dropped, buffers and all, when it finally lands.

use crate::loader::{LoadError, LoadedTrack, TrackLoader};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

struct LoadRequest {
    generation: u64,
    path: PathBuf,
}

/// A finished load, stamped with the ticket of the request that started it
pub struct LoadOutcome {
    pub generation: u64,
    pub path: PathBuf,
    pub result: Result<LoadedTrack, LoadError>,
}

/// Handle to the background loader thread
pub struct LoadWorker {
    request_tx: Sender<LoadRequest>,
    outcome_rx: Receiver<LoadOutcome>,
    /// Ticket of the most recently issued request
    latest: Arc<AtomicU64>,
    _handle: JoinHandle<()>,
}

impl LoadWorker {
    /// Spawn the worker thread around a [`TrackLoader`]
    pub fn spawn(loader: TrackLoader) -> Self {
        Self::spawn_with(move |path| loader.load(path))
    }

    /// Spawn with an injected load function (used by tests)
    pub fn spawn_with<F>(load_fn: F) -> Self
    where
        F: Fn(&Path) -> Result<LoadedTrack, LoadError> + Send + 'static,
    {
        let (request_tx, request_rx) = unbounded::<LoadRequest>();
        let (outcome_tx, outcome_rx) = unbounded::<LoadOutcome>();

        let handle = thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                let result = load_fn(&request.path);
                let outcome = LoadOutcome {
                    generation: request.generation,
                    path: request.path,
                    result,
                };
                if outcome_tx.send(outcome).is_err() {
                    break;
                }
            }
        });

        Self {
            request_tx,
            outcome_rx,
            latest: Arc::new(AtomicU64::new(0)),
            _handle: handle,
        }
    }

    /// Issue a load request, superseding any request still in flight.
    ///
    /// Returns the generation ticket stamped on the eventual outcome.
    pub fn request(&self, path: PathBuf) -> u64 {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(path = %path.display(), generation, "load requested");
        let _ = self.request_tx.send(LoadRequest { generation, path });
        generation
    }

    /// Ticket of the most recently issued request
    pub fn latest(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    /// Whether an outcome belongs to the current request
    pub fn is_current(&self, outcome: &LoadOutcome) -> bool {
        outcome.generation == self.latest()
    }

    /// Non-blocking poll for the next finished load that is still current.
    ///
    /// Superseded outcomes are silently discarded here; dropping them
    /// releases their decoded buffers.
    pub fn poll_current(&self) -> Option<LoadOutcome> {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            if self.is_current(&outcome) {
                return Some(outcome);
            }
            tracing::debug!(
                path = %outcome.path.display(),
                generation = outcome.generation,
                latest = self.latest(),
                "discarding stale load result"
            );
        }
        None
    }
}
