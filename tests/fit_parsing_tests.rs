// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! FIT decoding against encoded binary files.

use adventure_tracks::models::{FileFormat, FileStats};
use adventure_tracks::services::{ParseError, TrackParser};

mod common;
use common::{FitBuilder, FitSession};

fn parse(bytes: &[u8]) -> Result<adventure_tracks::models::ParsedTrack, ParseError> {
    TrackParser::default().parse(bytes, FileFormat::Fit)
}

#[test]
fn test_session_totals() {
    let track = parse(&common::simple_fit()).unwrap();
    let stats = track.stats;

    assert_eq!(stats.distance_km, 5.0);
    assert_eq!(stats.elevation_gain_m, 100);
    assert_eq!(stats.elevation_loss_m, 95);
    assert_eq!(stats.elapsed_time_s, 2000.0);
    assert_eq!(stats.moving_time_s, 1800.0);
    assert_eq!(stats.calories, Some(300));
    assert_eq!(stats.avg_speed_kmh, 10.0);
    assert_eq!(stats.max_speed_kmh, 36.0);
}

#[test]
fn test_records_become_points() {
    let track = parse(&common::simple_fit()).unwrap();

    assert_eq!(track.points.len(), 2);
    let first = track.points[0];
    assert_eq!(first.latitude, 45.9237);
    assert_eq!(first.longitude, 6.8694);
    assert_eq!(first.elevation_m, 1035.0);
    assert_eq!(track.points[1].elevation_m, 1060.0);
}

#[test]
fn test_spike_max_speed_is_dropped() {
    let bytes = FitBuilder::new()
        .record(45.0, 6.0, 500.0)
        .session(FitSession {
            elapsed_s: 60.0,
            timer_s: 60.0,
            distance_m: 100.0,
            max_speed_mps: 25.0,
            ..FitSession::default()
        })
        .build();

    assert_eq!(parse(&bytes).unwrap().stats.max_speed_kmh, 0.0);
}

#[test]
fn test_file_without_session_has_zero_stats() {
    let bytes = FitBuilder::new()
        .record(45.0, 6.0, 500.0)
        .record(45.001, 6.001, 510.0)
        .build();

    let track = parse(&bytes).unwrap();
    assert_eq!(track.points.len(), 2);
    assert_eq!(track.stats, FileStats::zeroed_fit());
    assert_eq!(track.stats.calories, Some(0));
}

#[test]
fn test_session_only_file_has_no_points() {
    let bytes = FitBuilder::new()
        .session(FitSession {
            elapsed_s: 600.0,
            timer_s: 540.0,
            distance_m: 1234.0,
            ..FitSession::default()
        })
        .build();

    let track = parse(&bytes).unwrap();
    assert!(track.points.is_empty());
    assert_eq!(track.stats.distance_km, 1.234);
    assert_eq!(track.stats.moving_time_s, 540.0);
}

#[test]
fn test_zero_timer_is_kept() {
    let bytes = FitBuilder::new()
        .session(FitSession {
            elapsed_s: 600.0,
            timer_s: 0.0,
            distance_m: 1000.0,
            ..FitSession::default()
        })
        .build();

    let stats = parse(&bytes).unwrap().stats;
    assert_eq!(stats.elapsed_time_s, 600.0);
    assert_eq!(stats.moving_time_s, 0.0);
}

#[test]
fn test_corrupted_file_is_malformed() {
    let mut bytes = common::simple_fit();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    assert!(matches!(parse(&bytes), Err(ParseError::MalformedFit(_))));
}

#[test]
fn test_truncated_file_is_malformed() {
    let bytes = common::simple_fit();
    assert!(matches!(
        parse(&bytes[..bytes.len() / 2]),
        Err(ParseError::MalformedFit(_))
    ));
}
