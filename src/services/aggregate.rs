// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Trip-level statistics from per-file stats.

use crate::models::stats::{average_speed_kmh, round_to};
use crate::models::FileStats;

/// Combine per-file stats into trip totals.
///
/// Returns `None` for an empty list so "no data" stays distinguishable
/// from "all zero". Calories are summed over the files that report them
/// and are always present in the result. Average speed is recomputed from
/// the totals rather than averaged.
pub fn aggregate(stats: &[FileStats]) -> Option<FileStats> {
    if stats.is_empty() {
        return None;
    }

    let distance_km: f64 = stats.iter().map(|s| s.distance_km).sum();
    let elevation_gain_m: i64 = stats.iter().map(|s| s.elevation_gain_m).sum();
    let elevation_loss_m: i64 = stats.iter().map(|s| s.elevation_loss_m).sum();
    let elapsed_time_s: f64 = stats.iter().map(|s| s.elapsed_time_s).sum();
    let moving_time_s: f64 = stats.iter().map(|s| s.moving_time_s).sum();
    let calories: i64 = stats.iter().filter_map(|s| s.calories).sum();
    let max_speed_kmh = stats
        .iter()
        .map(|s| s.max_speed_kmh)
        .fold(0.0_f64, f64::max);

    Some(FileStats {
        distance_km: round_to(distance_km, 3),
        elevation_gain_m,
        elevation_loss_m,
        elapsed_time_s: round_to(elapsed_time_s, 1),
        moving_time_s: round_to(moving_time_s, 1),
        calories: Some(calories),
        avg_speed_kmh: average_speed_kmh(distance_km, moving_time_s),
        max_speed_kmh: round_to(max_speed_kmh, 2),
    })
}
