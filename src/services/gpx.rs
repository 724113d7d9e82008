// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GPX decoding.
//!
//! Points are emitted for every track, segment and point in document
//! order. Unlike FIT, GPX carries no device totals, so distance, moving
//! time and climbing are derived from the points through the
//! [`MovingData`] and [`ClimbProfile`] strategies.

use crate::models::stats::{average_speed_kmh, round_to};
use crate::models::{FileStats, ParsedTrack, TrackPoint};
use crate::services::track::ParseError;
use geo::{Distance, Haversine, Point};
use time::OffsetDateTime;

/// Below this speed an interval between two fixes counts as stopped.
const STOPPED_SPEED_THRESHOLD_KMH: f64 = 1.0;

/// One GPX point with the optional data the strategies need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedFix {
    pub longitude: f64,
    pub latitude: f64,
    pub elevation: Option<f64>,
    /// Unix time in seconds
    pub time: Option<f64>,
}

/// Distance and duration spent moving within one segment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovingSummary {
    pub distance_m: f64,
    pub moving_time_s: f64,
}

/// Total climbing within one segment.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClimbSummary {
    pub uphill_m: f64,
    pub downhill_m: f64,
}

/// Computes moving distance and time, excluding stationary intervals.
pub trait MovingData: Send + Sync {
    fn moving_data(&self, segment: &[TimedFix]) -> MovingSummary;
}

/// Computes total ascent and descent over an elevation profile.
pub trait ClimbProfile: Send + Sync {
    fn uphill_downhill(&self, segment: &[TimedFix]) -> ClimbSummary;
}

/// Counts an interval as moving when its speed exceeds a threshold.
#[derive(Debug, Clone, Copy)]
pub struct StoppedSpeedFilter {
    pub threshold_kmh: f64,
}

impl Default for StoppedSpeedFilter {
    fn default() -> Self {
        Self {
            threshold_kmh: STOPPED_SPEED_THRESHOLD_KMH,
        }
    }
}

impl MovingData for StoppedSpeedFilter {
    fn moving_data(&self, segment: &[TimedFix]) -> MovingSummary {
        let mut summary = MovingSummary::default();

        for pair in segment.windows(2) {
            let (prev, curr) = (&pair[0], &pair[1]);
            let (Some(t0), Some(t1)) = (prev.time, curr.time) else {
                continue;
            };

            let seconds = t1 - t0;
            let distance = distance_m(prev, curr);
            let speed_kmh = if seconds > 0.0 {
                (distance / 1000.0) / (seconds / 3600.0)
            } else {
                0.0
            };

            if speed_kmh > self.threshold_kmh {
                summary.distance_m += distance;
                summary.moving_time_s += seconds;
            }
        }

        summary
    }
}

/// Sums elevation deltas after a 0.3/0.4/0.3 smoothing pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct SmoothedClimb;

impl ClimbProfile for SmoothedClimb {
    fn uphill_downhill(&self, segment: &[TimedFix]) -> ClimbSummary {
        let elevations: Vec<f64> = segment.iter().filter_map(|fix| fix.elevation).collect();
        let n = elevations.len();

        let smoothed: Vec<f64> = (0..n)
            .map(|i| {
                if i > 0 && i + 1 < n {
                    elevations[i - 1] * 0.3 + elevations[i] * 0.4 + elevations[i + 1] * 0.3
                } else {
                    elevations[i]
                }
            })
            .collect();

        let mut summary = ClimbSummary::default();
        for pair in smoothed.windows(2) {
            let delta = pair[1] - pair[0];
            if delta > 0.0 {
                summary.uphill_m += delta;
            } else {
                summary.downhill_m -= delta;
            }
        }
        summary
    }
}

/// Great-circle distance, including the vertical component when both
/// fixes have an elevation.
fn distance_m(a: &TimedFix, b: &TimedFix) -> f64 {
    let flat = Haversine::distance(
        Point::new(a.longitude, a.latitude),
        Point::new(b.longitude, b.latitude),
    );
    match (a.elevation, b.elevation) {
        (Some(e0), Some(e1)) => (flat.powi(2) + (e1 - e0).powi(2)).sqrt(),
        _ => flat,
    }
}

fn unix_seconds(time: OffsetDateTime) -> f64 {
    time.unix_timestamp_nanos() as f64 / 1_000_000_000.0
}

/// Decode a GPX document into points and derived totals.
pub fn parse_gpx(
    bytes: &[u8],
    moving: &dyn MovingData,
    climb: &dyn ClimbProfile,
) -> Result<ParsedTrack, ParseError> {
    let text = std::str::from_utf8(bytes).map_err(|e| ParseError::Unreadable(e.to_string()))?;
    let doc = gpx::read(text.as_bytes()).map_err(|e| ParseError::MalformedGpx(e.to_string()))?;

    let mut points = Vec::new();
    let mut moving_total = MovingSummary::default();
    let mut climb_total = ClimbSummary::default();
    let mut elapsed_time_s = 0.0;

    for track in doc.tracks {
        let mut first_time: Option<f64> = None;
        let mut last_time: Option<f64> = None;

        for segment in track.segments {
            let fixes: Vec<TimedFix> = segment
                .points
                .into_iter()
                .map(|point| {
                    let position = point.point();
                    TimedFix {
                        longitude: position.x(),
                        latitude: position.y(),
                        elevation: point.elevation,
                        time: point.time.map(|t| unix_seconds(t.into())),
                    }
                })
                .collect();

            for fix in &fixes {
                points.push(TrackPoint::new(
                    fix.longitude,
                    fix.latitude,
                    fix.elevation.unwrap_or(0.0),
                ));
                if let Some(t) = fix.time {
                    first_time.get_or_insert(t);
                    last_time = Some(t);
                }
            }

            let segment_moving = moving.moving_data(&fixes);
            moving_total.distance_m += segment_moving.distance_m;
            moving_total.moving_time_s += segment_moving.moving_time_s;

            let segment_climb = climb.uphill_downhill(&fixes);
            climb_total.uphill_m += segment_climb.uphill_m;
            climb_total.downhill_m += segment_climb.downhill_m;
        }

        if let (Some(start), Some(end)) = (first_time, last_time) {
            elapsed_time_s += end - start;
        }
    }

    let distance_km = round_to(moving_total.distance_m / 1000.0, 3);
    let moving_time_s = round_to(moving_total.moving_time_s, 1);

    let stats = FileStats {
        distance_km,
        elevation_gain_m: climb_total.uphill_m as i64,
        elevation_loss_m: climb_total.downhill_m as i64,
        elapsed_time_s: round_to(elapsed_time_s, 1),
        moving_time_s,
        calories: None,
        avg_speed_kmh: average_speed_kmh(distance_km, moving_time_s),
        max_speed_kmh: 0.0,
    };

    Ok(ParsedTrack { stats, points })
}
