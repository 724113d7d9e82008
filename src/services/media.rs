// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Raw upload storage.

use dashmap::DashMap;
use std::io::{self, Cursor, Read};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Read access to uploaded files by storage key.
pub trait BlobStore: Send + Sync {
    fn open(&self, key: &str) -> io::Result<Box<dyn Read + Send>>;

    fn read_all(&self, key: &str) -> io::Result<Vec<u8>> {
        let mut bytes = Vec::new();
        self.open(key)?.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// Files under a local media directory, keyed by relative path.
#[derive(Debug, Clone)]
pub struct MediaRoot {
    root: PathBuf,
}

impl MediaRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a key, refusing anything that could escape the root.
    fn resolve(&self, key: &str) -> io::Result<PathBuf> {
        let relative = Path::new(key);
        let plain = relative
            .components()
            .all(|component| matches!(component, Component::Normal(_)));

        if key.is_empty() || !plain {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid media key: {:?}", key),
            ));
        }
        Ok(self.root.join(relative))
    }
}

impl BlobStore for MediaRoot {
    fn open(&self, key: &str) -> io::Result<Box<dyn Read + Send>> {
        let file = std::fs::File::open(self.resolve(key)?)?;
        Ok(Box::new(io::BufReader::new(file)))
    }
}

/// In-memory blobs, for tests and fixtures. Clones share data.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobs {
    blobs: Arc<DashMap<String, Arc<Vec<u8>>>>,
}

impl MemoryBlobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.blobs.insert(key.into(), Arc::new(bytes.into()));
    }
}

impl BlobStore for MemoryBlobs {
    fn open(&self, key: &str) -> io::Result<Box<dyn Read + Send>> {
        let bytes = self
            .blobs
            .get(key)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, format!("no blob {:?}", key)))?;
        Ok(Box::new(Cursor::new(ArcBytes(bytes))))
    }
}

/// Shared byte buffer usable with [`Cursor`].
struct ArcBytes(Arc<Vec<u8>>);

impl AsRef<[u8]> for ArcBytes {
    fn as_ref(&self) -> &[u8] {
        self.0.as_slice()
    }
}
