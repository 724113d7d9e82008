// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod aggregate;
pub mod dispatch;
pub mod fit;
pub mod geometry;
pub mod gpx;
pub mod ingest;
pub mod media;
pub mod track;

pub use dispatch::PublishDispatcher;
pub use ingest::{IngestError, IngestOutcome, Ingestor};
pub use media::{BlobStore, MediaRoot, MemoryBlobs};
pub use track::{ParseError, TrackParser};
