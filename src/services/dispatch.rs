// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Publish-time trigger for adventure ingestion.

use crate::models::{Publishable, TripId};
use crate::services::ingest::{IngestOutcome, Ingestor};
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::Instrument;

/// Per-trip run locks, shared by every dispatcher clone.
///
/// An entry lives only while some run holds or waits on it.
pub type TripLocks = Arc<DashMap<TripId, Arc<Mutex<()>>>>;

/// Starts background ingestion when an adventure is published.
#[derive(Clone)]
pub struct PublishDispatcher {
    ingestor: Ingestor,
    locks: TripLocks,
}

impl PublishDispatcher {
    pub fn new(ingestor: Ingestor) -> Self {
        Self {
            ingestor,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Handle a publish event without blocking the caller.
    ///
    /// Returns the handle of the spawned run, or `None` when the event is
    /// not for an adventure or no runtime is available. Failures are logged
    /// by the task and never reach the publisher.
    pub fn on_publish(&self, event: &Publishable) -> Option<JoinHandle<()>> {
        let Some(trip_id) = event.as_trip() else {
            tracing::debug!(?event, "Ignoring publish of non-adventure page");
            return None;
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::error!(trip_id, error = %e, "No async runtime for ingestion");
                return None;
            }
        };

        let this = self.clone();
        let span = tracing::info_span!("ingest", trip_id);
        Some(runtime.spawn(async move { this.run_locked(trip_id).await }.instrument(span)))
    }

    /// Trips that currently have a run holding or waiting on their lock.
    pub fn tracked_trips(&self) -> usize {
        self.locks.len()
    }

    async fn run_locked(&self, trip_id: TripId) {
        match self.ingestor.has_pending(trip_id).await {
            Ok(true) => {}
            Ok(false) => {
                tracing::debug!(trip_id, "Nothing to ingest");
                return;
            }
            Err(e) => {
                tracing::error!(trip_id, error = %e, "Could not list activity files");
                return;
            }
        }

        let lock = self
            .locks
            .entry(trip_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        // A run that held the lock before us may already have done the work;
        // Ingestor::run re-checks pending files and skips in that case.
        let result = {
            let _guard = lock.lock().await;
            self.ingestor.run(trip_id).await
        };

        // Drop the entry once no other run holds a clone of it
        drop(lock);
        self.locks
            .remove_if(&trip_id, |_, lock| Arc::strong_count(lock) == 1);

        match result {
            Ok(IngestOutcome::Skipped) => {
                tracing::debug!(trip_id, "Nothing to ingest");
            }
            Ok(IngestOutcome::Completed {
                files_processed,
                files_reused,
                ..
            }) => {
                tracing::info!(trip_id, files_processed, files_reused, "Ingestion complete");
            }
            Err(e) => {
                tracing::error!(
                    trip_id,
                    file_id = ?e.file_id(),
                    error = %e,
                    "Ingestion failed"
                );
            }
        }
    }
}
