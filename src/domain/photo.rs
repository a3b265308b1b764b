use std::fmt;
use std::path::Path;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use uuid::Uuid;

use crate::domain::poi::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoId(Uuid);

impl PhotoId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PhotoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Temporary on-disk rendition of a photo used by previews.
/// The backing file is removed when the handle is dropped.
#[derive(Debug)]
pub struct PreviewHandle {
    file: NamedTempFile,
}

impl PreviewHandle {
    pub fn new(file: NamedTempFile) -> Self {
        Self { file }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

/// Location and capture time recovered from a photo's EXIF block.
/// Coordinates are either complete or absent.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PhotoMetadata {
    pub coordinates: Option<Coordinates>,
    pub date_visited: Option<NaiveDateTime>,
}

/// One user-selected image plus what was derived from it at ingestion time.
#[derive(Debug)]
pub struct UploadedPhoto {
    pub id: PhotoId,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub preview: PreviewHandle,
    pub metadata: PhotoMetadata,
}

impl UploadedPhoto {
    pub fn new(file_name: String, bytes: Vec<u8>, preview: PreviewHandle, metadata: PhotoMetadata) -> Self {
        Self {
            id: PhotoId::new(),
            file_name,
            bytes,
            preview,
            metadata,
        }
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.metadata.coordinates
    }

    pub fn latitude(&self) -> Option<f64> {
        self.metadata.coordinates.map(|c| c.lat)
    }

    pub fn longitude(&self) -> Option<f64> {
        self.metadata.coordinates.map(|c| c.lng)
    }

    pub fn date_visited(&self) -> Option<NaiveDateTime> {
        self.metadata.date_visited
    }

    pub fn has_gps(&self) -> bool {
        self.metadata.coordinates.is_some()
    }
}
