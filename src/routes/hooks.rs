// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CMS hook endpoints.

use crate::models::Publishable;
use crate::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

/// Hook routes. Token auth is applied in routes/mod.rs.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/hooks/publish", post(handle_publish))
}

/// Publish notification sent by the CMS after a page goes live.
#[derive(Debug, Deserialize)]
pub struct PublishEvent {
    /// Page type, e.g. "adventure" or "blog_post"
    pub kind: String,
    pub id: u64,
}

/// Handle a publish notification.
///
/// Always answers 202: publishing has already happened on the CMS side and
/// ingestion problems are only logged.
async fn handle_publish(
    State(state): State<Arc<AppState>>,
    Json(event): Json<PublishEvent>,
) -> StatusCode {
    tracing::info!(kind = %event.kind, id = event.id, "Publish event received");

    let publishable = Publishable::from_kind(&event.kind, event.id);
    if state.dispatcher.on_publish(&publishable).is_some() {
        tracing::debug!(trip_id = event.id, "Ingestion scheduled");
    }

    StatusCode::ACCEPTED
}
