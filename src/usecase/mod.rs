pub mod assembly;
pub mod contracts;
pub mod error;
pub mod exif;
pub mod geojson_export;
pub mod ingest;
pub mod preview;
pub mod submission;
