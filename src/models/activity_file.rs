// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Uploaded activity file attached to an adventure.

use crate::models::stats::FileStats;
use chrono::{DateTime, Utc};
use geojson::Feature;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub type FileId = u64;

/// Track file formats we know how to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// Garmin FIT binary
    Fit,
    /// GPX 1.1 XML
    Gpx,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileFormat::Fit => "fit",
            FileFormat::Gpx => "gpx",
        }
    }

    /// Infer the format from a file name extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Option<Self> {
        let (_, ext) = name.rsplit_once('.')?;
        ext.parse().ok()
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fit" => Ok(FileFormat::Fit),
            "gpx" => Ok(FileFormat::Gpx),
            other => Err(other.to_string()),
        }
    }
}

/// Stored activity file record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityFile {
    /// File ID (also used as document ID)
    pub id: FileId,
    /// Owning adventure
    pub trip_id: u64,
    /// Key of the raw upload in media storage
    pub file_name: String,
    /// Format tag ("fit" or "gpx"), fixed at creation
    pub file_type: String,
    /// Position among the adventure's files
    pub sort_order: i32,
    /// Per-file stats, set when processed
    pub parsed_stats: Option<FileStats>,
    /// Route as a GeoJSON LineString feature, set when processed
    pub route_geojson: Option<Feature>,
    /// When this file was processed
    pub processed_at: Option<DateTime<Utc>>,
}

impl ActivityFile {
    /// Register a newly uploaded file.
    ///
    /// The format tag comes from the file extension; anything that is not
    /// `.fit` falls back to `gpx`.
    pub fn new(id: FileId, trip_id: u64, file_name: impl Into<String>, sort_order: i32) -> Self {
        let file_name = file_name.into();
        let format = FileFormat::from_file_name(&file_name).unwrap_or(FileFormat::Gpx);
        Self {
            id,
            trip_id,
            file_name,
            file_type: format.as_str().to_string(),
            sort_order,
            parsed_stats: None,
            route_geojson: None,
            processed_at: None,
        }
    }

    pub fn is_processed(&self) -> bool {
        self.processed_at.is_some()
    }

    /// Decode the stored format tag.
    pub fn format(&self) -> Result<FileFormat, String> {
        self.file_type.parse()
    }
}

/// Fields written back when a file has been processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessedFile {
    pub parsed_stats: FileStats,
    pub route_geojson: Feature,
    pub processed_at: DateTime<Utc>,
}
