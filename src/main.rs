// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Adventure-Tracks API Server
//!
//! Receives publish notifications from the CMS and keeps each adventure's
//! stats and merged route in sync with its uploaded activity files.

use adventure_tracks::{
    config::Config,
    db::{FirestoreDb, MemoryStore, TripStore},
    services::{Ingestor, MediaRoot, PublishDispatcher},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Adventure-Tracks API");

    let db: Arc<dyn TripStore> = match &config.gcp_project_id {
        Some(project_id) => Arc::new(
            FirestoreDb::new(project_id)
                .await
                .expect("Failed to connect to Firestore"),
        ),
        None => {
            tracing::warn!("GCP_PROJECT_ID not set, adventures are kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    tracing::info!(path = %config.media_root.display(), "Using media root");
    let media = Arc::new(MediaRoot::new(config.media_root.clone()));

    let ingestor = Ingestor::new(db.clone(), media);
    let dispatcher = PublishDispatcher::new(ingestor);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
        dispatcher,
    });

    // Build router
    let app = adventure_tracks::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("adventure_tracks=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
