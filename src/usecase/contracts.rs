use crate::domain::remote::{CreatedMap, CreatedPoi, PhotoUpload, PhotoUploadResult, PoiPayload};
use crate::repository::errors::{ApiError, MetadataError};
use crate::usecase::exif::ExifTags;

#[cfg_attr(test, mockall::automock)]
pub trait MetadataReader: Send + Sync {
    fn read_tags(&self, bytes: &[u8]) -> Result<ExifTags, MetadataError>;
}

#[allow(async_fn_in_trait)]
#[cfg_attr(test, mockall::automock)]
pub trait MapApi: Send + Sync {
    async fn create_map(&self, name: &str, pois: &[PoiPayload]) -> Result<CreatedMap, ApiError>;
    async fn list_pois_by_map(&self, map_id: &str) -> Result<Vec<CreatedPoi>, ApiError>;
    async fn upload_photo(&self, upload: PhotoUpload) -> Result<PhotoUploadResult, ApiError>;
}
