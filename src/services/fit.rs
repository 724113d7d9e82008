// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FIT (Flexible and Interoperable Data Transfer) decoding.
//!
//! Only two message kinds matter here:
//! - `record`: one per GPS fix, becomes a [`TrackPoint`]
//! - `session`: device-computed totals, becomes [`FileStats`]

use crate::models::stats::round_to;
use crate::models::{FileStats, ParsedTrack, TrackPoint};
use crate::services::track::ParseError;
use fitparser::profile::MesgNum;
use fitparser::{FitDataRecord, Value};

/// Anything faster than 80 km/h on a hike or ride is a GPS spike.
const MAX_PLAUSIBLE_SPEED_MPS: f64 = 22.2;

const MPS_TO_KMH: f64 = 3.6;

/// Convert a FIT semicircle value to decimal degrees.
pub fn semicircles_to_degrees(semicircles: f64) -> f64 {
    semicircles * (180.0 / 2_f64.powi(31))
}

/// Decode a FIT file into points and session totals.
pub fn parse_fit(bytes: &[u8]) -> Result<ParsedTrack, ParseError> {
    let records =
        fitparser::de::from_bytes(bytes).map_err(|e| ParseError::MalformedFit(e.to_string()))?;

    Ok(summarize(records.iter().filter_map(FitMessage::from_record)))
}

/// Message kinds we care about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMessageKind {
    Record,
    Session,
}

/// A decoded FIT data message reduced to its numeric fields.
#[derive(Debug, Clone)]
pub struct FitMessage {
    pub kind: FitMessageKind,
    fields: Vec<(String, f64)>,
}

impl FitMessage {
    pub fn new(kind: FitMessageKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
        }
    }

    /// Builder-style field setter.
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.fields.push((name.to_string(), value));
        self
    }

    /// First value recorded under `name`.
    pub fn field(&self, name: &str) -> Option<f64> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| *value)
    }

    /// Value of `name`, falling back to its `enhanced_` variant.
    ///
    /// Decoders may expand a base field into its enhanced component only.
    fn field_or_enhanced(&self, name: &str) -> Option<f64> {
        self.field(name)
            .or_else(|| self.field(&format!("enhanced_{}", name)))
    }

    fn from_record(record: &FitDataRecord) -> Option<Self> {
        let kind = match record.kind() {
            MesgNum::Record => FitMessageKind::Record,
            MesgNum::Session => FitMessageKind::Session,
            _ => return None,
        };

        let fields = record
            .fields()
            .iter()
            .filter_map(|field| {
                fit_value_to_f64(field.value()).map(|value| (field.name().to_string(), value))
            })
            .collect();

        Some(Self { kind, fields })
    }
}

fn fit_value_to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Float32(v) => Some(*v as f64),
        Value::Float64(v) => Some(*v),
        Value::SInt8(v) => Some(*v as f64),
        Value::UInt8(v) => Some(*v as f64),
        Value::UInt8z(v) => Some(*v as f64),
        Value::Byte(v) => Some(*v as f64),
        Value::SInt16(v) => Some(*v as f64),
        Value::UInt16(v) => Some(*v as f64),
        Value::UInt16z(v) => Some(*v as f64),
        Value::SInt32(v) => Some(*v as f64),
        Value::UInt32(v) => Some(*v as f64),
        Value::UInt32z(v) => Some(*v as f64),
        Value::SInt64(v) => Some(*v as f64),
        Value::UInt64(v) => Some(*v as f64),
        Value::UInt64z(v) => Some(*v as f64),
        Value::Array(values) => values.iter().find_map(fit_value_to_f64),
        _ => None,
    }
}

/// Fold decoded messages into a track.
///
/// Records without a position are skipped. If the file has several
/// sessions the last one wins; with none, the stats are all zero.
pub fn summarize<I>(messages: I) -> ParsedTrack
where
    I: IntoIterator<Item = FitMessage>,
{
    let mut points = Vec::new();
    let mut session_stats = None;

    for message in messages {
        match message.kind {
            FitMessageKind::Record => {
                if let Some(point) = record_point(&message) {
                    points.push(point);
                }
            }
            FitMessageKind::Session => session_stats = Some(session_to_stats(&message)),
        }
    }

    ParsedTrack {
        stats: session_stats.unwrap_or_else(FileStats::zeroed_fit),
        points,
    }
}

fn record_point(message: &FitMessage) -> Option<TrackPoint> {
    let lat = message.field("position_lat")?;
    let lon = message.field("position_long")?;

    let elevation = message
        .field("enhanced_altitude")
        .or_else(|| message.field("altitude"))
        .unwrap_or(0.0);

    Some(TrackPoint::new(
        semicircles_to_degrees(lon),
        semicircles_to_degrees(lat),
        elevation,
    ))
}

fn session_to_stats(session: &FitMessage) -> FileStats {
    let elapsed = session.field("total_elapsed_time").unwrap_or(0.0);
    // Only a missing timer falls back; a recorded zero stays zero
    let moving = session.field("total_timer_time").unwrap_or(elapsed);

    let mut max_speed = session.field_or_enhanced("max_speed").unwrap_or(0.0);
    if max_speed > MAX_PLAUSIBLE_SPEED_MPS {
        max_speed = 0.0;
    }
    let avg_speed = session.field_or_enhanced("avg_speed").unwrap_or(0.0);

    FileStats {
        distance_km: round_to(session.field("total_distance").unwrap_or(0.0) / 1000.0, 3),
        elevation_gain_m: session.field("total_ascent").unwrap_or(0.0) as i64,
        elevation_loss_m: session.field("total_descent").unwrap_or(0.0) as i64,
        elapsed_time_s: round_to(elapsed, 1),
        moving_time_s: round_to(moving, 1),
        calories: Some(session.field("total_calories").unwrap_or(0.0) as i64),
        avg_speed_kmh: round_to(avg_speed * MPS_TO_KMH, 2),
        max_speed_kmh: round_to(max_speed * MPS_TO_KMH, 2),
    }
}
