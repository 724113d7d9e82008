// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST set); otherwise they are skipped.

use adventure_tracks::db::TripStore;
use adventure_tracks::error::AppError;
use adventure_tracks::models::{
    ActivityFile, ProcessedFile, Trip, TripComputed, TripEditorFields, Waypoint,
};
use adventure_tracks::services::{geometry, Ingestor, MemoryBlobs};
use std::sync::Arc;

mod common;
use common::{test_db, unique_id};

#[tokio::test]
async fn test_trip_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let trip_id = unique_id();

    assert!(db.get_trip(trip_id).await.unwrap().is_none());

    let mut trip = Trip::new(trip_id, "Dolomites Alta Via 1");
    trip.distance_km = Some(120.0);
    trip.waypoints.push(Waypoint {
        name: "Rifugio Lagazuoi".to_string(),
        description: String::new(),
        latitude: 46.5275,
        longitude: 12.0087,
    });
    db.create_trip(&trip).await.unwrap();

    let stored = db.get_trip(trip_id).await.unwrap().expect("trip stored");
    assert_eq!(stored.title, "Dolomites Alta Via 1");
    assert_eq!(stored.distance_km, Some(120.0));
    assert_eq!(stored.waypoints.len(), 1);
    assert!(stored.computed_stats.is_none());
}

#[tokio::test]
async fn test_file_result_is_a_partial_update() {
    require_emulator!();

    let db = test_db().await;
    let trip_id = unique_id();
    let file_id = trip_id + 1;

    db.create_trip(&Trip::new(trip_id, "Partial")).await.unwrap();
    db.create_activity_file(&ActivityFile::new(file_id, trip_id, "activity_files/p.fit", 3))
        .await
        .unwrap();

    let result = ProcessedFile {
        parsed_stats: Default::default(),
        route_geojson: geometry::to_line(&[]),
        processed_at: chrono::Utc::now(),
    };
    db.update_file_result(file_id, &result).await.unwrap();

    let files = db.list_activity_files(trip_id).await.unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].file_name, "activity_files/p.fit");
    assert_eq!(files[0].file_type, "fit");
    assert_eq!(files[0].sort_order, 3);
    assert!(files[0].is_processed());
    assert_eq!(files[0].route_geojson, Some(result.route_geojson));
}

#[tokio::test]
async fn test_trip_computed_keeps_editor_fields() {
    require_emulator!();

    let db = test_db().await;
    let trip_id = unique_id();

    let mut trip = Trip::new(trip_id, "GR20");
    trip.elevation_gain_m = Some(13000);
    db.create_trip(&trip).await.unwrap();

    let computed = TripComputed {
        computed_stats: Some(Default::default()),
        merged_route_geojson: Some(geometry::merge(vec![geometry::to_line(&[])])),
    };
    db.update_trip_computed(trip_id, &computed).await.unwrap();

    let stored = db.get_trip(trip_id).await.unwrap().unwrap();
    assert_eq!(stored.title, "GR20");
    assert_eq!(stored.elevation_gain_m, Some(13000));
    assert_eq!(stored.merged_route_geojson.unwrap().features.len(), 1);
}

#[tokio::test]
async fn test_editor_fields_keep_computed_values() {
    require_emulator!();

    let db = test_db().await;
    let trip_id = unique_id();
    db.create_trip(&Trip::new(trip_id, "Draft")).await.unwrap();

    let stale = TripEditorFields::from(&db.get_trip(trip_id).await.unwrap().unwrap());
    let computed = TripComputed {
        computed_stats: Some(Default::default()),
        merged_route_geojson: Some(geometry::merge(vec![geometry::to_line(&[])])),
    };
    db.update_trip_computed(trip_id, &computed).await.unwrap();

    let edited = TripEditorFields {
        title: "Via Alpina".to_string(),
        ..stale
    };
    db.update_trip_editor_fields(trip_id, &edited).await.unwrap();

    let stored = db.get_trip(trip_id).await.unwrap().unwrap();
    assert_eq!(stored.title, "Via Alpina");
    assert!(stored.computed_stats.is_some());
    assert!(stored.merged_route_geojson.is_some());
}

#[tokio::test]
async fn test_ids_are_never_reused() {
    require_emulator!();

    let db = test_db().await;
    let trip_id = unique_id();
    let other_trip = trip_id + 1;
    let file_id = trip_id + 2;

    db.create_trip(&Trip::new(trip_id, "Owner")).await.unwrap();
    assert!(matches!(
        db.create_trip(&Trip::new(trip_id, "Again")).await,
        Err(AppError::Conflict(_))
    ));

    db.create_activity_file(&ActivityFile::new(file_id, trip_id, "activity_files/a.gpx", 0))
        .await
        .unwrap();
    let moved = ActivityFile::new(file_id, other_trip, "activity_files/b.gpx", 0);
    assert!(matches!(
        db.create_activity_file(&moved).await,
        Err(AppError::Conflict(_))
    ));
    assert_eq!(db.list_activity_files(trip_id).await.unwrap().len(), 1);

    // Partial updates never create records
    let missing = unique_id() + 100;
    assert!(matches!(
        db.update_trip_computed(missing, &TripComputed::default()).await,
        Err(AppError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_ingestion_against_firestore() {
    require_emulator!();

    let db = Arc::new(test_db().await);
    let blobs = MemoryBlobs::new();
    let trip_id = unique_id();

    db.create_trip(&Trip::new(trip_id, "Emulator run")).await.unwrap();
    for (offset, name, bytes) in [
        (1, "activity_files/e1.fit", common::simple_fit()),
        (2, "activity_files/e2.gpx", common::simple_gpx()),
    ] {
        blobs.insert(name, bytes);
        db.create_activity_file(&ActivityFile::new(trip_id + offset, trip_id, name, offset as i32))
            .await
            .unwrap();
    }

    let ingestor = Ingestor::new(db.clone(), Arc::new(blobs));
    ingestor.run(trip_id).await.unwrap();

    let stored = db.get_trip(trip_id).await.unwrap().unwrap();
    assert_eq!(stored.computed_stats.unwrap().calories, Some(300));
    assert_eq!(stored.merged_route_geojson.unwrap().features.len(), 2);
}
