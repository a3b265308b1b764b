use thiserror::Error;

use crate::domain::photo::PhotoId;
use crate::repository::errors::ApiError;

/// Rejections raised while grouping photos into POIs. None of them leave
/// partial state behind.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error("A map can have up to 25 POIs")]
    TooManyPois,
    #[error("Select at least one photo for this POI")]
    NoPhotosSelected,
    #[error("A POI can have up to 3 photos")]
    TooManyPhotos,
    #[error("Choose a primary photo")]
    NoPrimaryPhoto,
    #[error("POI name is required")]
    MissingName,
    #[error("Choose a location for this POI")]
    MissingCoordinates,
    #[error("A map can have up to 75 photos")]
    TooManyUploads,
    #[error("photo {0} is not available")]
    PhotoUnavailable(PhotoId),
    #[error("photo {0} is already part of a POI")]
    PhotoAssigned(PhotoId),
    #[error("photo {0} has no GPS data")]
    PhotoWithoutGps(PhotoId),
    #[error("primary photo index {0} is out of range")]
    PrimaryOutOfRange(usize),
    #[error("coordinates out of range: {lat}, {lng}")]
    InvalidCoordinates { lat: f64, lng: f64 },
    #[error("tag {0:?} is empty or already added")]
    InvalidTag(String),
    #[error("POI #{0} does not exist")]
    UnknownPoi(usize),
    #[error("{0} photo(s) are not assigned to a POI yet")]
    UnassignedPhotos(usize),
    #[error("Add at least one POI")]
    NoPois,
    #[error("Map name is required")]
    MissingMapName,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("photo ingestion cancelled")]
    Cancelled,
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to create preview: {0}")]
    Preview(String),
    #[error("extraction task failed: {0}")]
    Join(String),
}

#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("failed to create map: {0}")]
    CreateMap(#[source] ApiError),
    #[error("submission cancelled after map {map_id} was created")]
    Cancelled { map_id: String },
}
