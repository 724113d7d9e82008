//! Summary statistics for a single activity file or a whole trip.
//!
//! The same shape is used for per-file results (as parsed from FIT/GPX)
//! and for the trip-level aggregate cached on the adventure page.

use serde::{Deserialize, Serialize};

/// Distance, climbing, timing and speed totals.
///
/// `moving_time_s <= elapsed_time_s` is not guaranteed: devices report
/// whatever they measured and we keep it as-is.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FileStats {
    /// Total distance (km)
    #[serde(default)]
    pub distance_km: f64,
    /// Total ascent (m)
    #[serde(default)]
    pub elevation_gain_m: i64,
    /// Total descent (m)
    #[serde(default)]
    pub elevation_loss_m: i64,
    /// Wall-clock duration (s)
    #[serde(default)]
    pub elapsed_time_s: f64,
    /// Time spent moving (s)
    #[serde(default)]
    pub moving_time_s: f64,
    /// Energy (kcal). FIT files report it; GPX files never do.
    #[serde(default)]
    pub calories: Option<i64>,
    /// Average moving speed (km/h)
    #[serde(default)]
    pub avg_speed_kmh: f64,
    /// Maximum speed (km/h), 0 when unknown or discarded as a GPS spike
    #[serde(default)]
    pub max_speed_kmh: f64,
}

impl FileStats {
    /// Stats for a FIT file without a session message.
    pub fn zeroed_fit() -> Self {
        Self {
            calories: Some(0),
            ..Self::default()
        }
    }
}

/// Round to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Average speed in km/h from a distance and a moving time.
///
/// Returns 0 when there is no moving time.
pub fn average_speed_kmh(distance_km: f64, moving_time_s: f64) -> f64 {
    if moving_time_s > 0.0 {
        round_to(distance_km / moving_time_s * 3600.0, 2)
    } else {
        0.0
    }
}
