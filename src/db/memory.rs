// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process store for local runs without GCP and for tests.

use crate::db::{sort_files, TripStore};
use crate::error::AppError;
use crate::models::{
    ActivityFile, FileId, ProcessedFile, Trip, TripComputed, TripEditorFields, TripId,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{self, BoxFuture};
use futures_util::FutureExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Trips and files held in concurrent maps.
///
/// Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    trips: Arc<DashMap<TripId, Trip>>,
    files: Arc<DashMap<FileId, ActivityFile>>,
    computed_writes: Arc<AtomicU64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `update_trip_computed` calls that succeeded.
    pub fn computed_writes(&self) -> u64 {
        self.computed_writes.load(Ordering::SeqCst)
    }

    fn files_for(&self, trip_id: TripId) -> Vec<ActivityFile> {
        let mut files: Vec<ActivityFile> = self
            .files
            .iter()
            .filter(|entry| entry.trip_id == trip_id)
            .map(|entry| entry.value().clone())
            .collect();
        sort_files(&mut files);
        files
    }

    fn insert_trip(&self, trip: &Trip) -> Result<(), AppError> {
        match self.trips.entry(trip.id) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!("Adventure {}", trip.id))),
            Entry::Vacant(slot) => {
                slot.insert(trip.clone());
                Ok(())
            }
        }
    }

    fn insert_file(&self, file: &ActivityFile) -> Result<(), AppError> {
        match self.files.entry(file.id) {
            Entry::Occupied(_) => Err(AppError::Conflict(format!("Activity file {}", file.id))),
            Entry::Vacant(slot) => {
                slot.insert(file.clone());
                Ok(())
            }
        }
    }

    fn apply_editor_fields(
        &self,
        trip_id: TripId,
        fields: &TripEditorFields,
    ) -> Result<(), AppError> {
        let mut trip = self
            .trips
            .get_mut(&trip_id)
            .ok_or_else(|| AppError::NotFound(format!("Adventure {}", trip_id)))?;

        trip.title = fields.title.clone();
        trip.distance_km = fields.distance_km;
        trip.elevation_gain_m = fields.elevation_gain_m;
        trip.waypoints = fields.waypoints.clone();
        Ok(())
    }

    fn apply_file_result(&self, file_id: FileId, result: &ProcessedFile) -> Result<(), AppError> {
        let mut file = self
            .files
            .get_mut(&file_id)
            .ok_or_else(|| AppError::NotFound(format!("Activity file {}", file_id)))?;

        file.parsed_stats = Some(result.parsed_stats);
        file.route_geojson = Some(result.route_geojson.clone());
        file.processed_at = Some(result.processed_at);
        Ok(())
    }

    fn apply_trip_computed(&self, trip_id: TripId, computed: &TripComputed) -> Result<(), AppError> {
        let mut trip = self
            .trips
            .get_mut(&trip_id)
            .ok_or_else(|| AppError::NotFound(format!("Adventure {}", trip_id)))?;

        trip.computed_stats = computed.computed_stats;
        trip.merged_route_geojson = computed.merged_route_geojson.clone();
        self.computed_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl TripStore for MemoryStore {
    fn get_trip(&self, trip_id: TripId) -> BoxFuture<'_, Result<Option<Trip>, AppError>> {
        let trip = self.trips.get(&trip_id).map(|t| t.value().clone());
        future::ready(Ok(trip)).boxed()
    }

    fn create_trip<'a>(&'a self, trip: &'a Trip) -> BoxFuture<'a, Result<(), AppError>> {
        future::ready(self.insert_trip(trip)).boxed()
    }

    fn update_trip_editor_fields<'a>(
        &'a self,
        trip_id: TripId,
        fields: &'a TripEditorFields,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        future::ready(self.apply_editor_fields(trip_id, fields)).boxed()
    }

    fn list_activity_files(
        &self,
        trip_id: TripId,
    ) -> BoxFuture<'_, Result<Vec<ActivityFile>, AppError>> {
        future::ready(Ok(self.files_for(trip_id))).boxed()
    }

    fn create_activity_file<'a>(
        &'a self,
        file: &'a ActivityFile,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        future::ready(self.insert_file(file)).boxed()
    }

    fn update_file_result<'a>(
        &'a self,
        file_id: FileId,
        result: &'a ProcessedFile,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        future::ready(self.apply_file_result(file_id, result)).boxed()
    }

    fn update_trip_computed<'a>(
        &'a self,
        trip_id: TripId,
        computed: &'a TripComputed,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        future::ready(self.apply_trip_computed(trip_id, computed)).boxed()
    }
}
