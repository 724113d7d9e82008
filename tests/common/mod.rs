// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use adventure_tracks::config::Config;
use adventure_tracks::db::{FirestoreDb, MemoryStore, TripStore};
use adventure_tracks::models::{ActivityFile, FileId, Trip, TripId};
use adventure_tracks::routes::create_router;
use adventure_tracks::services::gpx::{
    ClimbProfile, ClimbSummary, MovingData, MovingSummary, TimedFix,
};
use adventure_tracks::services::{Ingestor, MemoryBlobs, PublishDispatcher, TrackParser};
use adventure_tracks::AppState;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Generate a unique ID for test isolation.
#[allow(dead_code)]
pub fn unique_id() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

// ─── App / Ingestion Fixtures ────────────────────────────────

/// Everything a test needs to drive the app and inspect its storage.
#[allow(dead_code)]
pub struct TestApp {
    pub router: axum::Router,
    pub state: Arc<AppState>,
    pub db: MemoryStore,
    pub blobs: MemoryBlobs,
}

/// Create a test app backed by in-memory storage.
#[allow(dead_code)]
pub fn create_test_app() -> TestApp {
    let db = MemoryStore::new();
    let blobs = MemoryBlobs::new();
    let ingestor = Ingestor::new(Arc::new(db.clone()), Arc::new(blobs.clone()));

    let state = Arc::new(AppState {
        config: Config::test_default(),
        db: Arc::new(db.clone()),
        dispatcher: PublishDispatcher::new(ingestor),
    });

    TestApp {
        router: create_router(state.clone()),
        state,
        db,
        blobs,
    }
}

/// Ingestor over in-memory storage with the default parser.
#[allow(dead_code)]
pub fn test_ingestor(db: &MemoryStore, blobs: &MemoryBlobs) -> Ingestor {
    Ingestor::new(Arc::new(db.clone()), Arc::new(blobs.clone()))
}

/// Ingestor whose GPX statistics come from fixed strategies.
#[allow(dead_code)]
pub fn fixed_gpx_ingestor(
    db: &MemoryStore,
    blobs: &MemoryBlobs,
    moving: FixedMoving,
    climb: FixedClimb,
) -> Ingestor {
    Ingestor::with_parser(
        Arc::new(db.clone()),
        Arc::new(blobs.clone()),
        TrackParser::with_strategies(Arc::new(moving), Arc::new(climb)),
    )
}

/// Store a trip and attach files in the given order, uploading their bytes.
#[allow(dead_code)]
pub async fn seed_trip(
    db: &MemoryStore,
    blobs: &MemoryBlobs,
    trip_id: TripId,
    files: Vec<(FileId, &str, Vec<u8>)>,
) {
    db.create_trip(&Trip::new(trip_id, format!("Trip {}", trip_id)))
        .await
        .unwrap();

    for (sort_order, (file_id, name, bytes)) in files.into_iter().enumerate() {
        let key = format!("activity_files/{}", name);
        blobs.insert(key.clone(), bytes);
        db.create_activity_file(&ActivityFile::new(file_id, trip_id, key, sort_order as i32))
            .await
            .unwrap();
    }
}

/// Moving data strategy with a fixed answer per segment.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct FixedMoving {
    pub distance_m: f64,
    pub moving_time_s: f64,
}

impl MovingData for FixedMoving {
    fn moving_data(&self, _segment: &[TimedFix]) -> MovingSummary {
        MovingSummary {
            distance_m: self.distance_m,
            moving_time_s: self.moving_time_s,
        }
    }
}

/// Climb strategy with a fixed answer per segment.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy)]
pub struct FixedClimb {
    pub uphill_m: f64,
    pub downhill_m: f64,
}

impl ClimbProfile for FixedClimb {
    fn uphill_downhill(&self, _segment: &[TimedFix]) -> ClimbSummary {
        ClimbSummary {
            uphill_m: self.uphill_m,
            downhill_m: self.downhill_m,
        }
    }
}

// ─── GPX Fixtures ────────────────────────────────────────────

/// One `<trkpt>`: latitude, longitude, optional elevation and RFC3339 time.
#[allow(dead_code)]
pub type GpxPoint<'a> = (f64, f64, Option<f64>, Option<&'a str>);

/// Build a GPX 1.1 document: tracks of segments of points.
#[allow(dead_code)]
pub fn gpx_document(tracks: &[Vec<Vec<GpxPoint>>]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <gpx version=\"1.1\" creator=\"adventure-tracks tests\" \
         xmlns=\"http://www.topografix.com/GPX/1/1\">\n",
    );

    for (i, track) in tracks.iter().enumerate() {
        xml.push_str(&format!("  <trk>\n    <name>Track {}</name>\n", i + 1));
        for segment in track {
            xml.push_str("    <trkseg>\n");
            for (lat, lon, ele, time) in segment {
                xml.push_str(&format!("      <trkpt lat=\"{}\" lon=\"{}\">", lat, lon));
                if let Some(ele) = ele {
                    xml.push_str(&format!("<ele>{}</ele>", ele));
                }
                if let Some(time) = time {
                    xml.push_str(&format!("<time>{}</time>", time));
                }
                xml.push_str("</trkpt>\n");
            }
            xml.push_str("    </trkseg>\n");
        }
        xml.push_str("  </trk>\n");
    }

    xml.push_str("</gpx>\n");
    xml
}

/// Single-track, single-segment GPX with a short timed climb.
#[allow(dead_code)]
pub fn simple_gpx() -> Vec<u8> {
    gpx_document(&[vec![vec![
        (45.9237, 6.8694, Some(1035.0), Some("2024-07-01T08:00:00Z")),
        (45.9247, 6.8704, Some(1060.0), Some("2024-07-01T08:05:00Z")),
        (45.9257, 6.8714, Some(1090.0), Some("2024-07-01T08:10:00Z")),
    ]]])
    .into_bytes()
}

// ─── FIT Fixtures ────────────────────────────────────────────

const FIT_CRC_TABLE: [u16; 16] = [
    0x0000, 0xCC01, 0xD801, 0x1400, 0xF001, 0x3C00, 0x2800, 0xE401, 0xA001, 0x6C00, 0x7800,
    0xB401, 0x5000, 0x9C01, 0x8801, 0x4400,
];

#[allow(dead_code)]
fn fit_crc(bytes: &[u8]) -> u16 {
    let mut crc = 0u16;
    for &byte in bytes {
        for nibble in [byte & 0x0F, byte >> 4] {
            let tmp = FIT_CRC_TABLE[(crc & 0x0F) as usize];
            crc = ((crc >> 4) & 0x0FFF) ^ tmp ^ FIT_CRC_TABLE[nibble as usize];
        }
    }
    crc
}

const MESG_SESSION: u16 = 18;
const MESG_RECORD: u16 = 20;

const BASE_UINT16: u8 = 0x84;
const BASE_SINT32: u8 = 0x85;
const BASE_UINT32: u8 = 0x86;

const LOCAL_RECORD: u8 = 0;
const LOCAL_SESSION: u8 = 1;

/// Device totals written into a FIT session message.
#[allow(dead_code)]
#[derive(Debug, Clone, Copy, Default)]
pub struct FitSession {
    pub elapsed_s: f64,
    pub timer_s: f64,
    pub distance_m: f64,
    pub calories: u16,
    pub avg_speed_mps: f64,
    pub max_speed_mps: f64,
    pub ascent_m: u16,
    pub descent_m: u16,
}

/// Minimal FIT encoder producing record and session messages.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct FitBuilder {
    data: Vec<u8>,
    record_defined: bool,
    session_defined: bool,
}

#[allow(dead_code)]
impl FitBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn define(&mut self, local: u8, global: u16, fields: &[(u8, u8, u8)]) {
        self.data.push(0x40 | local);
        self.data.push(0); // reserved
        self.data.push(0); // little endian
        self.data.extend_from_slice(&global.to_le_bytes());
        self.data.push(fields.len() as u8);
        for &(num, size, base) in fields {
            self.data.extend_from_slice(&[num, size, base]);
        }
    }

    /// GPS fix in degrees; altitude in meters.
    pub fn record(mut self, lat: f64, lon: f64, altitude_m: f64) -> Self {
        if !self.record_defined {
            self.define(
                LOCAL_RECORD,
                MESG_RECORD,
                &[(0, 4, BASE_SINT32), (1, 4, BASE_SINT32), (2, 2, BASE_UINT16)],
            );
            self.record_defined = true;
        }

        let to_semicircles = |deg: f64| (deg * 2_f64.powi(31) / 180.0).round() as i32;
        let altitude = ((altitude_m + 500.0) * 5.0).round() as u16;

        self.data.push(LOCAL_RECORD);
        self.data.extend_from_slice(&to_semicircles(lat).to_le_bytes());
        self.data.extend_from_slice(&to_semicircles(lon).to_le_bytes());
        self.data.extend_from_slice(&altitude.to_le_bytes());
        self
    }

    pub fn session(mut self, session: FitSession) -> Self {
        if !self.session_defined {
            self.define(
                LOCAL_SESSION,
                MESG_SESSION,
                &[
                    (7, 4, BASE_UINT32),  // total_elapsed_time, s * 1000
                    (8, 4, BASE_UINT32),  // total_timer_time, s * 1000
                    (9, 4, BASE_UINT32),  // total_distance, m * 100
                    (11, 2, BASE_UINT16), // total_calories
                    (14, 2, BASE_UINT16), // avg_speed, m/s * 1000
                    (15, 2, BASE_UINT16), // max_speed, m/s * 1000
                    (22, 2, BASE_UINT16), // total_ascent
                    (23, 2, BASE_UINT16), // total_descent
                ],
            );
            self.session_defined = true;
        }

        let scaled32 = |value: f64, scale: f64| ((value * scale).round() as u32).to_le_bytes();
        let scaled16 = |value: f64, scale: f64| ((value * scale).round() as u16).to_le_bytes();

        self.data.push(LOCAL_SESSION);
        self.data.extend_from_slice(&scaled32(session.elapsed_s, 1000.0));
        self.data.extend_from_slice(&scaled32(session.timer_s, 1000.0));
        self.data.extend_from_slice(&scaled32(session.distance_m, 100.0));
        self.data.extend_from_slice(&session.calories.to_le_bytes());
        self.data.extend_from_slice(&scaled16(session.avg_speed_mps, 1000.0));
        self.data.extend_from_slice(&scaled16(session.max_speed_mps, 1000.0));
        self.data.extend_from_slice(&session.ascent_m.to_le_bytes());
        self.data.extend_from_slice(&session.descent_m.to_le_bytes());
        self
    }

    /// Wrap the messages in a FIT 2.0 header and trailing CRC.
    pub fn build(self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.data.len() + 16);
        bytes.push(14); // header size
        bytes.push(0x20); // protocol 2.0
        bytes.extend_from_slice(&2132u16.to_le_bytes()); // profile 21.32
        bytes.extend_from_slice(&(self.data.len() as u32).to_le_bytes());
        bytes.extend_from_slice(b".FIT");
        let header_crc = fit_crc(&bytes);
        bytes.extend_from_slice(&header_crc.to_le_bytes());

        bytes.extend_from_slice(&self.data);
        let file_crc = fit_crc(&bytes);
        bytes.extend_from_slice(&file_crc.to_le_bytes());
        bytes
    }
}

/// FIT file with two fixes and the end-to-end session totals
/// (5 km, 100 m up, 300 kcal, 10 m/s max).
#[allow(dead_code)]
pub fn simple_fit() -> Vec<u8> {
    FitBuilder::new()
        .record(45.9237, 6.8694, 1035.0)
        .record(45.9247, 6.8704, 1060.0)
        .session(FitSession {
            elapsed_s: 2000.0,
            timer_s: 1800.0,
            distance_m: 5000.0,
            calories: 300,
            avg_speed_mps: 2.778,
            max_speed_mps: 10.0,
            ascent_m: 100,
            descent_m: 95,
        })
        .build()
}
