// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Adventure ingestion: parse new activity files and refresh the trip's
//! derived stats and merged route.
//!
//! A run walks the trip's files in sort order. Files already processed are
//! reused as stored; new ones are decoded, and their results committed one
//! at a time. Any failure stops the run before the trip-level write, so the
//! trip keeps its previous derived values while successfully processed
//! files stay processed.

use crate::db::TripStore;
use crate::error::AppError;
use crate::models::{
    ActivityFile, FileFormat, FileId, FileStats, ParsedTrack, ProcessedFile, TripComputed, TripId,
};
use crate::services::aggregate::aggregate;
use crate::services::geometry;
use crate::services::media::BlobStore;
use crate::services::track::{ParseError, TrackParser};
use geojson::Feature;
use std::sync::Arc;

/// Why a run stopped.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Activity file {file_id} could not be read: {reason}")]
    UnreadableSource { file_id: FileId, reason: String },

    #[error("Activity file {file_id} has unsupported format {tag:?}")]
    UnsupportedFormat { file_id: FileId, tag: String },

    #[error("Activity file {file_id} is malformed: {source}")]
    MalformedTrackData {
        file_id: FileId,
        #[source]
        source: ParseError,
    },

    #[error("Adventure {0} not found")]
    TripNotFound(TripId),

    #[error("Storage error: {0}")]
    Storage(#[from] AppError),
}

impl IngestError {
    fn from_parse(file_id: FileId, err: ParseError) -> Self {
        match err {
            ParseError::Unreadable(reason) => IngestError::UnreadableSource { file_id, reason },
            source => IngestError::MalformedTrackData { file_id, source },
        }
    }

    /// File that caused the failure, if any.
    pub fn file_id(&self) -> Option<FileId> {
        match self {
            IngestError::UnreadableSource { file_id, .. }
            | IngestError::UnsupportedFormat { file_id, .. }
            | IngestError::MalformedTrackData { file_id, .. } => Some(*file_id),
            IngestError::TripNotFound(_) | IngestError::Storage(_) => None,
        }
    }
}

/// Result of a run that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// Every file was already processed; nothing was written.
    Skipped,
    Completed {
        files_processed: usize,
        files_reused: usize,
        stats: Option<FileStats>,
    },
}

/// Runs ingestion for one trip at a time.
///
/// Callers serialize runs per trip; see
/// [`PublishDispatcher`](crate::services::PublishDispatcher).
#[derive(Clone)]
pub struct Ingestor {
    db: Arc<dyn TripStore>,
    media: Arc<dyn BlobStore>,
    parser: TrackParser,
}

impl Ingestor {
    pub fn new(db: Arc<dyn TripStore>, media: Arc<dyn BlobStore>) -> Self {
        Self::with_parser(db, media, TrackParser::default())
    }

    pub fn with_parser(
        db: Arc<dyn TripStore>,
        media: Arc<dyn BlobStore>,
        parser: TrackParser,
    ) -> Self {
        Self { db, media, parser }
    }

    /// Whether the trip has any file still waiting to be parsed.
    pub async fn has_pending(&self, trip_id: TripId) -> Result<bool, IngestError> {
        let files = self.db.list_activity_files(trip_id).await?;
        Ok(files.iter().any(|file| !file.is_processed()))
    }

    /// Process all pending files of a trip and refresh its derived fields.
    pub async fn run(&self, trip_id: TripId) -> Result<IngestOutcome, IngestError> {
        let files = self.db.list_activity_files(trip_id).await?;

        if files.iter().all(ActivityFile::is_processed) {
            tracing::debug!(trip_id, "No pending activity files");
            return Ok(IngestOutcome::Skipped);
        }

        if self.db.get_trip(trip_id).await?.is_none() {
            return Err(IngestError::TripNotFound(trip_id));
        }

        tracing::info!(trip_id, files = files.len(), "Processing activity files");

        let mut all_stats = Vec::with_capacity(files.len());
        let mut lines: Vec<Feature> = Vec::with_capacity(files.len());
        let mut files_processed = 0;
        let mut files_reused = 0;

        for file in files {
            if file.is_processed() {
                match (file.parsed_stats, file.route_geojson) {
                    (Some(stats), Some(route)) => {
                        all_stats.push(stats);
                        lines.push(route);
                        files_reused += 1;
                    }
                    _ => tracing::warn!(
                        trip_id,
                        file_id = file.id,
                        "Processed file has no stored results"
                    ),
                }
                continue;
            }

            let processed = self.process_file(&file).await?;
            all_stats.push(processed.parsed_stats);
            lines.push(processed.route_geojson);
            files_processed += 1;
        }

        let stats = aggregate(&all_stats);
        let computed = TripComputed {
            computed_stats: stats,
            merged_route_geojson: if lines.is_empty() {
                None
            } else {
                Some(geometry::merge(lines))
            },
        };
        self.db.update_trip_computed(trip_id, &computed).await?;

        tracing::info!(
            trip_id,
            files_processed,
            files_reused,
            distance_km = stats.map(|s| s.distance_km).unwrap_or(0.0),
            "Adventure stats updated"
        );

        Ok(IngestOutcome::Completed {
            files_processed,
            files_reused,
            stats,
        })
    }

    /// Decode one file and commit its result.
    async fn process_file(&self, file: &ActivityFile) -> Result<ProcessedFile, IngestError> {
        let format = file
            .format()
            .map_err(|tag| IngestError::UnsupportedFormat {
                file_id: file.id,
                tag,
            })?;

        let track = self.decode(file.id, &file.file_name, format).await?;
        let result = ProcessedFile {
            parsed_stats: track.stats,
            route_geojson: geometry::to_line(&track.points),
            processed_at: chrono::Utc::now(),
        };

        self.db.update_file_result(file.id, &result).await?;

        tracing::debug!(
            file_id = file.id,
            format = %format,
            points = track.points.len(),
            distance_km = track.stats.distance_km,
            "Activity file processed"
        );

        Ok(result)
    }

    /// Read and parse on the blocking pool.
    async fn decode(
        &self,
        file_id: FileId,
        key: &str,
        format: FileFormat,
    ) -> Result<ParsedTrack, IngestError> {
        let media = Arc::clone(&self.media);
        let parser = self.parser.clone();
        let key = key.to_string();

        tokio::task::spawn_blocking(move || {
            let bytes = media
                .read_all(&key)
                .map_err(|e| IngestError::UnreadableSource {
                    file_id,
                    reason: e.to_string(),
                })?;
            parser
                .parse(&bytes, format)
                .map_err(|e| IngestError::from_parse(file_id, e))
        })
        .await
        .map_err(|e| {
            IngestError::Storage(AppError::Internal(anyhow::anyhow!(
                "Decode task for file {} failed: {}",
                file_id,
                e
            )))
        })?
    }
}
