// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Adventure-Tracks: activity file ingestion for trip pages
//!
//! This crate parses uploaded FIT and GPX tracks attached to an adventure,
//! keeps per-file stats and routes, and maintains the adventure's
//! aggregate stats and merged route whenever the page is published.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::TripStore;
use services::PublishDispatcher;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Arc<dyn TripStore>,
    pub dispatcher: PublishDispatcher,
}
