// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GeoJSON route building.

use crate::models::TrackPoint;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

/// Wrap a point sequence as a LineString feature with empty properties.
///
/// Coordinates are `[lon, lat, ele]`, in the order given.
pub fn to_line(points: &[TrackPoint]) -> Feature {
    let coordinates = points.iter().map(TrackPoint::position).collect();

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coordinates))),
        id: None,
        properties: Some(JsonObject::new()),
        foreign_members: None,
    }
}

/// Collect line features into one FeatureCollection, order preserved.
pub fn merge(lines: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: lines,
        foreign_members: None,
    }
}

/// Number of vertices in a LineString feature (0 for anything else).
pub fn line_len(feature: &Feature) -> usize {
    match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::LineString(coords)) => coords.len(),
        _ => 0,
    }
}
