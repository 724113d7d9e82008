// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Adventure (trip) model and the publish event wrapper.

use crate::models::stats::FileStats;
use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};

pub type TripId = u64;

/// Manually entered point of interest. Carried along, never processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Stored adventure page record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    /// Page ID (also used as document ID)
    pub id: TripId,
    /// Page title
    pub title: String,
    /// Manual distance override (km)
    #[serde(default)]
    pub distance_km: Option<f64>,
    /// Manual elevation gain override (m)
    #[serde(default)]
    pub elevation_gain_m: Option<i64>,
    /// Aggregate of all processed activity files
    #[serde(default)]
    pub computed_stats: Option<FileStats>,
    /// All processed routes as one GeoJSON FeatureCollection
    #[serde(default)]
    pub merged_route_geojson: Option<FeatureCollection>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

impl Trip {
    pub fn new(id: TripId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            distance_km: None,
            elevation_gain_m: None,
            computed_stats: None,
            merged_route_geojson: None,
            waypoints: Vec::new(),
        }
    }

    /// Distance to display: the manual override wins over the computed value.
    pub fn effective_distance_km(&self) -> Option<f64> {
        self.distance_km
            .or_else(|| self.computed_stats.as_ref().map(|s| s.distance_km))
    }

    /// Elevation gain to display: the manual override wins over the computed value.
    pub fn effective_elevation_gain_m(&self) -> Option<i64> {
        self.elevation_gain_m
            .or_else(|| self.computed_stats.as_ref().map(|s| s.elevation_gain_m))
    }
}

/// Editor-owned trip fields, written by the CMS and never by ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripEditorFields {
    pub title: String,
    #[serde(default)]
    pub distance_km: Option<f64>,
    #[serde(default)]
    pub elevation_gain_m: Option<i64>,
    #[serde(default)]
    pub waypoints: Vec<Waypoint>,
}

impl TripEditorFields {
    /// A fresh trip carrying these fields and no derived values.
    pub fn into_trip(self, id: TripId) -> Trip {
        Trip {
            title: self.title,
            distance_km: self.distance_km,
            elevation_gain_m: self.elevation_gain_m,
            waypoints: self.waypoints,
            ..Trip::new(id, "")
        }
    }
}

impl From<&Trip> for TripEditorFields {
    fn from(trip: &Trip) -> Self {
        Self {
            title: trip.title.clone(),
            distance_km: trip.distance_km,
            elevation_gain_m: trip.elevation_gain_m,
            waypoints: trip.waypoints.clone(),
        }
    }
}

/// Derived trip fields, always written together.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TripComputed {
    pub computed_stats: Option<FileStats>,
    pub merged_route_geojson: Option<FeatureCollection>,
}

/// Content that just went public.
///
/// Only adventures carry activity files; every other page type is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Publishable {
    Trip(TripId),
    Other { kind: String, id: u64 },
}

impl Publishable {
    /// Page kind name used by the CMS for adventures.
    pub const TRIP_KIND: &'static str = "adventure";

    pub fn from_kind(kind: &str, id: u64) -> Self {
        if kind == Self::TRIP_KIND {
            Publishable::Trip(id)
        } else {
            Publishable::Other {
                kind: kind.to_string(),
                id,
            }
        }
    }

    pub fn as_trip(&self) -> Option<TripId> {
        match self {
            Publishable::Trip(id) => Some(*id),
            Publishable::Other { .. } => None,
        }
    }
}
