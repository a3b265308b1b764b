use std::path::Path;
use std::sync::Arc;

use futures::future::join_all;
use tokio_util::sync::CancellationToken;

use crate::domain::photo::{PhotoMetadata, UploadedPhoto};
use crate::usecase::contracts::MetadataReader;
use crate::usecase::error::IngestError;
use crate::usecase::preview::create_preview;

/// Raw file as selected by the user.
#[derive(Debug, Clone)]
pub struct PhotoFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl PhotoFile {
    pub async fn read(path: &Path) -> Result<Self, IngestError> {
        let bytes = tokio::fs::read(path).await.map_err(|source| IngestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self { file_name, bytes })
    }
}

pub struct PhotoIngestor<M>
where
    M: MetadataReader,
{
    reader: Arc<M>,
    preview_width: u32,
}

impl<M> PhotoIngestor<M>
where
    M: MetadataReader + 'static,
{
    pub fn new(reader: M, preview_width: u32) -> Self {
        Self {
            reader: Arc::new(reader),
            preview_width,
        }
    }

    /// Reads location and date from one image. Unreadable metadata yields an
    /// empty record instead of an error.
    pub fn extract_metadata(&self, bytes: &[u8]) -> PhotoMetadata {
        extract_metadata(self.reader.as_ref(), bytes)
    }

    /// Extracts metadata and previews for every file concurrently and waits
    /// for all of them. Output order matches input order.
    #[tracing::instrument(skip_all, fields(file_count = files.len()))]
    pub async fn ingest(
        &self,
        files: Vec<PhotoFile>,
        cancel: &CancellationToken,
    ) -> Result<Vec<UploadedPhoto>, IngestError> {
        tracing::debug!("starting photo ingestion");

        let tasks = files.into_iter().map(|file| {
            let reader = Arc::clone(&self.reader);
            let preview_width = self.preview_width;
            tokio::task::spawn_blocking(move || ingest_one(reader.as_ref(), file, preview_width))
        });

        let joined = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!("photo ingestion cancelled");
                return Err(IngestError::Cancelled);
            }
            joined = join_all(tasks) => joined,
        };

        let photos = joined
            .into_iter()
            .map(|res| res.map_err(|e| IngestError::Join(e.to_string()))?)
            .collect::<Result<Vec<_>, _>>()?;

        let with_gps = photos.iter().filter(|p| p.has_gps()).count();
        tracing::info!(
            total = photos.len(),
            with_gps,
            "photo ingestion finished"
        );
        Ok(photos)
    }
}

fn extract_metadata<M: MetadataReader + ?Sized>(reader: &M, bytes: &[u8]) -> PhotoMetadata {
    match reader.read_tags(bytes) {
        Ok(tags) => tags.to_metadata(),
        Err(e) => {
            tracing::debug!(error = %e, "no usable metadata, manual positioning required");
            PhotoMetadata::default()
        }
    }
}

fn ingest_one<M: MetadataReader + ?Sized>(
    reader: &M,
    file: PhotoFile,
    preview_width: u32,
) -> Result<UploadedPhoto, IngestError> {
    let metadata = extract_metadata(reader, &file.bytes);
    let preview = create_preview(&file.bytes, preview_width)?;

    let photo = UploadedPhoto::new(file.file_name, file.bytes, preview, metadata);
    tracing::debug!(
        photo_id = %photo.id,
        file_name = %photo.file_name,
        has_gps = photo.has_gps(),
        has_date = photo.date_visited().is_some(),
        "photo ingested"
    );
    Ok(photo)
}
