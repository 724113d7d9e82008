//! Database layer (Firestore, or in-memory for local runs and tests).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryStore;

use crate::error::AppError;
use crate::models::{
    ActivityFile, FileId, ProcessedFile, Trip, TripComputed, TripEditorFields, TripId,
};
use futures_util::future::BoxFuture;

/// Collection names as constants.
pub mod collections {
    pub const TRIPS: &str = "adventures";
    pub const ACTIVITY_FILES: &str = "activity_files";
}

/// Persistence for trips and their activity files.
///
/// Records are created once and never replaced whole. After creation every
/// write is a partial update: editors own the fields in
/// [`TripEditorFields`], ingestion owns the parse results and the derived
/// trip fields, and neither side can overwrite the other.
pub trait TripStore: Send + Sync {
    fn get_trip(&self, trip_id: TripId) -> BoxFuture<'_, Result<Option<Trip>, AppError>>;

    /// Insert a new trip; `AppError::Conflict` if the id is taken.
    fn create_trip<'a>(&'a self, trip: &'a Trip) -> BoxFuture<'a, Result<(), AppError>>;

    /// Replace the editor-owned fields of an existing trip.
    fn update_trip_editor_fields<'a>(
        &'a self,
        trip_id: TripId,
        fields: &'a TripEditorFields,
    ) -> BoxFuture<'a, Result<(), AppError>>;

    /// All files attached to a trip, ordered by `sort_order`.
    fn list_activity_files(
        &self,
        trip_id: TripId,
    ) -> BoxFuture<'_, Result<Vec<ActivityFile>, AppError>>;

    /// Insert a new file record; `AppError::Conflict` if the id is taken by
    /// any trip.
    fn create_activity_file<'a>(
        &'a self,
        file: &'a ActivityFile,
    ) -> BoxFuture<'a, Result<(), AppError>>;

    /// Record the outcome of parsing one file.
    fn update_file_result<'a>(
        &'a self,
        file_id: FileId,
        result: &'a ProcessedFile,
    ) -> BoxFuture<'a, Result<(), AppError>>;

    /// Record trip-level derived values.
    fn update_trip_computed<'a>(
        &'a self,
        trip_id: TripId,
        computed: &'a TripComputed,
    ) -> BoxFuture<'a, Result<(), AppError>>;
}

/// Stable ordering for files: `sort_order`, then id for ties.
pub(crate) fn sort_files(files: &mut [ActivityFile]) {
    files.sort_by_key(|file| (file.sort_order, file.id));
}
