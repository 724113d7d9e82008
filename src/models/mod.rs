// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity_file;
pub mod stats;
pub mod track;
pub mod trip;

pub use activity_file::{ActivityFile, FileFormat, FileId, ProcessedFile};
pub use stats::FileStats;
pub use track::{ParsedTrack, TrackPoint};
pub use trip::{Publishable, Trip, TripComputed, TripEditorFields, TripId, Waypoint};
