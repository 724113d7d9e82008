// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Decoded track data shared by the FIT and GPX parsers.

use crate::models::stats::{round_to, FileStats};

/// A single GPS fix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackPoint {
    pub longitude: f64,
    pub latitude: f64,
    pub elevation_m: f64,
}

impl TrackPoint {
    /// Build a point, rounding coordinates to 7 decimals and elevation to 1.
    pub fn new(longitude: f64, latitude: f64, elevation_m: f64) -> Self {
        Self {
            longitude: round_to(longitude, 7),
            latitude: round_to(latitude, 7),
            elevation_m: round_to(elevation_m, 1),
        }
    }

    /// GeoJSON position `[lon, lat, ele]`.
    pub fn position(&self) -> Vec<f64> {
        vec![self.longitude, self.latitude, self.elevation_m]
    }
}

/// Result of decoding one activity file.
#[derive(Debug, Clone)]
pub struct ParsedTrack {
    pub stats: FileStats,
    /// Points in recording order
    pub points: Vec<TrackPoint>,
}
