// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Adventure API routes.

use crate::error::{AppError, Result};
use crate::models::{ActivityFile, FileStats, Trip, TripEditorFields, TripId, Waypoint};
use crate::services::geometry;
use crate::time_utils::{format_duration, format_utc_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Read-only routes, public like the published pages they back.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/trips/{id}", get(get_trip))
        .route("/api/trips/{id}/route", get(get_route))
}

/// CMS write routes. Token auth is applied in routes/mod.rs.
pub fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/trips/{id}", put(put_trip))
        .route("/api/trips/{id}/files", post(register_file))
}

// ─── Trip Summary ────────────────────────────────────────────

/// Per-file state shown next to the adventure.
#[derive(Debug, Serialize)]
pub struct FileSummary {
    pub id: u64,
    pub file_name: String,
    pub file_type: String,
    pub sort_order: i32,
    pub processed: bool,
    pub processed_at: Option<String>,
    pub stats: Option<FileStats>,
}

impl From<&ActivityFile> for FileSummary {
    fn from(file: &ActivityFile) -> Self {
        Self {
            id: file.id,
            file_name: file.file_name.clone(),
            file_type: file.file_type.clone(),
            sort_order: file.sort_order,
            processed: file.is_processed(),
            processed_at: file.processed_at.map(format_utc_rfc3339),
            stats: file.parsed_stats,
        }
    }
}

/// Adventure as displayed: overrides applied, durations formatted.
#[derive(Debug, Serialize)]
pub struct TripSummary {
    pub id: TripId,
    pub title: String,
    pub distance_km: Option<f64>,
    pub elevation_gain_m: Option<i64>,
    pub moving_time: String,
    pub elapsed_time: String,
    pub computed_stats: Option<FileStats>,
    pub waypoints: Vec<Waypoint>,
    pub files: Vec<FileSummary>,
}

async fn load_trip(state: &AppState, trip_id: TripId) -> Result<Trip> {
    state
        .db
        .get_trip(trip_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Adventure {} not found", trip_id)))
}

/// Get an adventure with its display stats and file states.
async fn get_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<TripSummary>> {
    let trip = load_trip(&state, trip_id).await?;
    let files = state.db.list_activity_files(trip_id).await?;
    let stats = trip.computed_stats.as_ref();

    Ok(Json(TripSummary {
        id: trip.id,
        distance_km: trip.effective_distance_km(),
        elevation_gain_m: trip.effective_elevation_gain_m(),
        moving_time: format_duration(stats.map(|s| s.moving_time_s)),
        elapsed_time: format_duration(stats.map(|s| s.elapsed_time_s)),
        computed_stats: trip.computed_stats,
        files: files.iter().map(FileSummary::from).collect(),
        title: trip.title,
        waypoints: trip.waypoints,
    }))
}

/// Get the merged route; empty until a file has been processed.
async fn get_route(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<TripId>,
) -> Result<Json<FeatureCollection>> {
    let trip = load_trip(&state, trip_id).await?;
    Ok(Json(
        trip.merged_route_geojson
            .unwrap_or_else(|| geometry::merge(Vec::new())),
    ))
}

// ─── CMS Writes ──────────────────────────────────────────────

/// Create an adventure, or update the editor fields of an existing one.
///
/// Derived stats and the merged route belong to ingestion and are never
/// written here.
async fn put_trip(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<TripId>,
    Json(fields): Json<TripEditorFields>,
) -> Result<StatusCode> {
    if fields.title.trim().is_empty() {
        return Err(AppError::BadRequest("title must not be empty".to_string()));
    }

    let status = match state.db.create_trip(&fields.clone().into_trip(trip_id)).await {
        Ok(()) => StatusCode::CREATED,
        Err(AppError::Conflict(_)) => {
            state.db.update_trip_editor_fields(trip_id, &fields).await?;
            StatusCode::OK
        }
        Err(e) => return Err(e),
    };

    tracing::info!(trip_id, created = status == StatusCode::CREATED, "Adventure saved");
    Ok(status)
}

/// Registration of an uploaded file.
#[derive(Debug, Deserialize)]
pub struct FileInput {
    pub id: u64,
    /// Media storage key of the upload
    pub file_name: String,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Attach an uploaded file to an adventure.
///
/// The format is fixed from the file name here; without an explicit sort
/// order the file goes last.
async fn register_file(
    State(state): State<Arc<AppState>>,
    Path(trip_id): Path<TripId>,
    Json(input): Json<FileInput>,
) -> Result<(StatusCode, Json<FileSummary>)> {
    if input.file_name.trim().is_empty() {
        return Err(AppError::BadRequest("file_name must not be empty".to_string()));
    }
    load_trip(&state, trip_id).await?;

    let sort_order = match input.sort_order {
        Some(order) => order,
        None => next_sort_order(&state.db.list_activity_files(trip_id).await?),
    };

    // File IDs are global: an ID owned by any adventure is rejected here
    // rather than re-registered.
    let file = ActivityFile::new(input.id, trip_id, input.file_name, sort_order);
    state.db.create_activity_file(&file).await?;

    tracing::info!(
        trip_id,
        file_id = file.id,
        format = %file.file_type,
        sort_order,
        "Activity file registered"
    );

    Ok((StatusCode::CREATED, Json(FileSummary::from(&file))))
}

/// Position after the last file, or 0 for the first one.
fn next_sort_order(files: &[ActivityFile]) -> i32 {
    files
        .iter()
        .map(|file| file.sort_order.saturating_add(1))
        .max()
        .unwrap_or(0)
}
