// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Format dispatch for activity file decoding.

use crate::models::{FileFormat, ParsedTrack};
use crate::services::fit;
use crate::services::gpx::{self, ClimbProfile, MovingData, SmoothedClimb, StoppedSpeedFilter};
use std::sync::Arc;

/// Decoder for uploaded track files.
///
/// GPX statistics depend on two pluggable algorithms (moving time and
/// climbing); FIT files carry their own totals.
#[derive(Clone)]
pub struct TrackParser {
    moving: Arc<dyn MovingData>,
    climb: Arc<dyn ClimbProfile>,
}

impl Default for TrackParser {
    fn default() -> Self {
        Self {
            moving: Arc::new(StoppedSpeedFilter::default()),
            climb: Arc::new(SmoothedClimb),
        }
    }
}

impl TrackParser {
    pub fn with_strategies(moving: Arc<dyn MovingData>, climb: Arc<dyn ClimbProfile>) -> Self {
        Self { moving, climb }
    }

    /// Decode raw file bytes according to the stored format tag.
    pub fn parse(&self, bytes: &[u8], format: FileFormat) -> Result<ParsedTrack, ParseError> {
        match format {
            FileFormat::Fit => fit::parse_fit(bytes),
            FileFormat::Gpx => gpx::parse_gpx(bytes, self.moving.as_ref(), self.climb.as_ref()),
        }
    }
}

/// Errors from track decoding.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Malformed FIT data: {0}")]
    MalformedFit(String),

    #[error("Malformed GPX data: {0}")]
    MalformedGpx(String),

    #[error("Unreadable track data: {0}")]
    Unreadable(String),
}
