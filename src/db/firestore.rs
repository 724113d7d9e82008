// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Adventures (editor fields plus derived stats and merged route)
//! - Activity files (upload records plus per-file parse results)
//!
//! Firestore rejects arrays nested directly inside arrays, which is exactly
//! what GeoJSON coordinates are, so route geometry is stored as a JSON
//! string and decoded on read.

use crate::db::{collections, sort_files, TripStore};
use crate::error::AppError;
use crate::models::{
    ActivityFile, FileId, FileStats, ProcessedFile, Trip, TripComputed, TripEditorFields, TripId,
    Waypoint,
};
use chrono::{DateTime, Utc};
use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // Emulator takes no credentials
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    // ─── Trip Operations ─────────────────────────────────────────

    async fn fetch_trip_doc(&self, trip_id: TripId) -> Result<Option<TripDoc>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TRIPS)
            .obj()
            .one(&trip_id.to_string())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }


    /// Get an adventure by ID.
    pub async fn get_trip(&self, trip_id: TripId) -> Result<Option<Trip>, AppError> {
        self.fetch_trip_doc(trip_id)
            .await?
            .map(TripDoc::into_trip)
            .transpose()
    }

    /// Create an adventure. Fails with `Conflict` if the ID is taken.
    pub async fn create_trip(&self, trip: &Trip) -> Result<(), AppError> {
        let doc = TripDoc::from_trip(trip)?;
        let _: TripDoc = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::TRIPS)
            .document_id(trip.id.to_string())
            .object(&doc)
            .execute()
            .await
            .map_err(|e| write_error(e, format!("Adventure {}", trip.id)))?;
        Ok(())
    }

    /// Replace the editor fields of an existing adventure, leaving derived
    /// fields alone.
    pub async fn update_trip_editor_fields(
        &self,
        trip_id: TripId,
        fields: &TripEditorFields,
    ) -> Result<(), AppError> {
        let doc = TripEditorDoc {
            title: fields.title.clone(),
            distance_km: fields.distance_km,
            elevation_gain_m: fields.elevation_gain_m,
            waypoints: fields.waypoints.clone(),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(TripEditorDoc::{
                title,
                distance_km,
                elevation_gain_m,
                waypoints
            }))
            .in_col(collections::TRIPS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(trip_id.to_string())
            .object(&doc)
            .execute()
            .await
            .map_err(|e| write_error(e, format!("Adventure {}", trip_id)))?;
        Ok(())
    }

    /// Replace the derived fields of an adventure, leaving editor fields alone.
    pub async fn update_trip_computed(
        &self,
        trip_id: TripId,
        computed: &TripComputed,
    ) -> Result<(), AppError> {
        let doc = TripComputedDoc {
            computed_stats: computed.computed_stats,
            merged_route_geojson: computed
                .merged_route_geojson
                .as_ref()
                .map(encode_json)
                .transpose()?,
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(TripComputedDoc::{
                computed_stats,
                merged_route_geojson
            }))
            .in_col(collections::TRIPS)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(trip_id.to_string())
            .object(&doc)
            .execute()
            .await
            .map_err(|e| write_error(e, format!("Adventure {}", trip_id)))?;
        Ok(())
    }

    // ─── Activity File Operations ────────────────────────────────

    /// Get all files of an adventure, in display order.
    pub async fn list_activity_files(&self, trip_id: TripId) -> Result<Vec<ActivityFile>, AppError> {
        let docs: Vec<ActivityFileDoc> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::ACTIVITY_FILES)
            .filter(move |q| q.for_all([q.field("trip_id").eq(trip_id)]))
            .order_by([("sort_order", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let mut files = docs
            .into_iter()
            .map(ActivityFileDoc::into_file)
            .collect::<Result<Vec<_>, _>>()?;
        // Ties on sort_order come back in arbitrary order
        sort_files(&mut files);
        Ok(files)
    }

    /// Register an activity file.
    ///
    /// File IDs are document IDs, so they are unique across adventures; an
    /// ID already in use fails with `Conflict` instead of moving the record.
    pub async fn create_activity_file(&self, file: &ActivityFile) -> Result<(), AppError> {
        let doc = ActivityFileDoc::from_file(file)?;
        let _: ActivityFileDoc = self
            .get_client()?
            .fluent()
            .insert()
            .into(collections::ACTIVITY_FILES)
            .document_id(file.id.to_string())
            .object(&doc)
            .execute()
            .await
            .map_err(|e| write_error(e, format!("Activity file {}", file.id)))?;
        Ok(())
    }

    /// Store the parse result of one file, leaving the upload fields alone.
    pub async fn update_file_result(
        &self,
        file_id: FileId,
        result: &ProcessedFile,
    ) -> Result<(), AppError> {
        let doc = FileResultDoc {
            parsed_stats: Some(result.parsed_stats),
            route_geojson: Some(encode_json(&result.route_geojson)?),
            processed_at: Some(result.processed_at),
        };

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(firestore::paths!(FileResultDoc::{
                parsed_stats,
                route_geojson,
                processed_at
            }))
            .in_col(collections::ACTIVITY_FILES)
            .precondition(FirestoreWritePrecondition::Exists(true))
            .document_id(file_id.to_string())
            .object(&doc)
            .execute()
            .await
            .map_err(|e| write_error(e, format!("Activity file {}", file_id)))?;
        Ok(())
    }
}

impl TripStore for FirestoreDb {
    fn get_trip(&self, trip_id: TripId) -> BoxFuture<'_, Result<Option<Trip>, AppError>> {
        FirestoreDb::get_trip(self, trip_id).boxed()
    }

    fn create_trip<'a>(&'a self, trip: &'a Trip) -> BoxFuture<'a, Result<(), AppError>> {
        FirestoreDb::create_trip(self, trip).boxed()
    }

    fn update_trip_editor_fields<'a>(
        &'a self,
        trip_id: TripId,
        fields: &'a TripEditorFields,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        FirestoreDb::update_trip_editor_fields(self, trip_id, fields).boxed()
    }

    fn list_activity_files(
        &self,
        trip_id: TripId,
    ) -> BoxFuture<'_, Result<Vec<ActivityFile>, AppError>> {
        FirestoreDb::list_activity_files(self, trip_id).boxed()
    }

    fn create_activity_file<'a>(
        &'a self,
        file: &'a ActivityFile,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        FirestoreDb::create_activity_file(self, file).boxed()
    }

    fn update_file_result<'a>(
        &'a self,
        file_id: FileId,
        result: &'a ProcessedFile,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        FirestoreDb::update_file_result(self, file_id, result).boxed()
    }

    fn update_trip_computed<'a>(
        &'a self,
        trip_id: TripId,
        computed: &'a TripComputed,
    ) -> BoxFuture<'a, Result<(), AppError>> {
        FirestoreDb::update_trip_computed(self, trip_id, computed).boxed()
    }
}

// ─── Stored Documents ────────────────────────────────────────

/// Adventure as stored, with the merged route as a JSON string.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TripDoc {
    id: TripId,
    title: String,
    #[serde(default)]
    distance_km: Option<f64>,
    #[serde(default)]
    elevation_gain_m: Option<i64>,
    #[serde(default)]
    computed_stats: Option<FileStats>,
    #[serde(default)]
    merged_route_geojson: Option<String>,
    #[serde(default)]
    waypoints: Vec<Waypoint>,
}

impl TripDoc {
    fn from_trip(trip: &Trip) -> Result<Self, AppError> {
        Ok(Self {
            id: trip.id,
            title: trip.title.clone(),
            distance_km: trip.distance_km,
            elevation_gain_m: trip.elevation_gain_m,
            computed_stats: trip.computed_stats,
            merged_route_geojson: trip
                .merged_route_geojson
                .as_ref()
                .map(encode_json)
                .transpose()?,
            waypoints: trip.waypoints.clone(),
        })
    }

    fn into_trip(self) -> Result<Trip, AppError> {
        Ok(Trip {
            id: self.id,
            title: self.title,
            distance_km: self.distance_km,
            elevation_gain_m: self.elevation_gain_m,
            computed_stats: self.computed_stats,
            merged_route_geojson: self
                .merged_route_geojson
                .as_deref()
                .map(decode_json)
                .transpose()?,
            waypoints: self.waypoints,
        })
    }
}

/// Activity file as stored, with the route as a JSON string.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ActivityFileDoc {
    id: FileId,
    trip_id: TripId,
    file_name: String,
    file_type: String,
    #[serde(default)]
    sort_order: i32,
    #[serde(default)]
    parsed_stats: Option<FileStats>,
    #[serde(default)]
    route_geojson: Option<String>,
    /// RFC3339 string, as chrono serializes it
    #[serde(default)]
    processed_at: Option<DateTime<Utc>>,
}

impl ActivityFileDoc {
    fn from_file(file: &ActivityFile) -> Result<Self, AppError> {
        Ok(Self {
            id: file.id,
            trip_id: file.trip_id,
            file_name: file.file_name.clone(),
            file_type: file.file_type.clone(),
            sort_order: file.sort_order,
            parsed_stats: file.parsed_stats,
            route_geojson: file.route_geojson.as_ref().map(encode_json).transpose()?,
            processed_at: file.processed_at,
        })
    }

    fn into_file(self) -> Result<ActivityFile, AppError> {
        Ok(ActivityFile {
            id: self.id,
            trip_id: self.trip_id,
            file_name: self.file_name,
            file_type: self.file_type,
            sort_order: self.sort_order,
            parsed_stats: self.parsed_stats,
            route_geojson: self.route_geojson.as_deref().map(decode_json).transpose()?,
            processed_at: self.processed_at,
        })
    }
}

/// Field mask for [`FirestoreDb::update_trip_editor_fields`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TripEditorDoc {
    title: String,
    distance_km: Option<f64>,
    elevation_gain_m: Option<i64>,
    waypoints: Vec<Waypoint>,
}

/// Field mask for [`FirestoreDb::update_trip_computed`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TripComputedDoc {
    computed_stats: Option<FileStats>,
    merged_route_geojson: Option<String>,
}

/// Field mask for [`FirestoreDb::update_file_result`].
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FileResultDoc {
    parsed_stats: Option<FileStats>,
    route_geojson: Option<String>,
    processed_at: Option<DateTime<Utc>>,
}

/// Map write failures so a taken ID or a missing record reach the caller
/// as such.
fn write_error(err: FirestoreError, what: String) -> AppError {
    match err {
        FirestoreError::DataConflictError(_) => AppError::Conflict(what),
        FirestoreError::DataNotFoundError(_) => AppError::NotFound(what),
        other => AppError::Database(other.to_string()),
    }
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, AppError> {
    serde_json::to_string(value)
        .map_err(|e| AppError::Database(format!("Failed to encode GeoJSON: {}", e)))
}

fn decode_json<T: DeserializeOwned>(raw: &str) -> Result<T, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Database(format!("Stored GeoJSON is corrupt: {}", e)))
}
