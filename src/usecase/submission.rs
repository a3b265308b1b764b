use chrono::Local;
use tokio_util::sync::CancellationToken;

use crate::domain::map::MapDraft;
use crate::domain::photo::PhotoId;
use crate::domain::poi::Coordinates;
use crate::domain::remote::{CreatedPoi, PhotoUpload};
use crate::usecase::contracts::MapApi;
use crate::usecase::error::SubmitError;

/// Maximum per-axis difference for a created POI to count as the same place.
pub const COORDINATE_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, PartialEq)]
pub struct FailedUpload {
    pub poi_name: String,
    pub photo_id: PhotoId,
    pub file_name: String,
    pub reason: String,
}

/// Outcome of a submission whose map record was created. Per-item failures
/// are collected here rather than aborting the run.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionReport {
    pub map_id: String,
    pub uploaded_photos: usize,
    pub failed_uploads: Vec<FailedUpload>,
    pub unresolved_pois: Vec<String>,
}

impl SubmissionReport {
    fn new(map_id: String) -> Self {
        Self {
            map_id,
            uploaded_photos: 0,
            failed_uploads: Vec::new(),
            unresolved_pois: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.failed_uploads.is_empty() && self.unresolved_pois.is_empty()
    }
}

pub struct MapSubmitter<A>
where
    A: MapApi,
{
    api: A,
}

impl<A> MapSubmitter<A>
where
    A: MapApi,
{
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Persists a finished draft.
    ///
    /// The map is created first with one coordinate entry per POI; the
    /// backend creates the POI records itself. Those records are then
    /// re-fetched, matched back to the draft POIs, and each photo is uploaded
    /// against its match, one at a time. Only a failed map creation fails the
    /// whole call.
    #[tracing::instrument(skip(self, draft, cancel), fields(map_name = %draft.name(), poi_count = draft.pois().len()))]
    pub async fn submit(
        &self,
        draft: &MapDraft,
        cancel: &CancellationToken,
    ) -> Result<SubmissionReport, SubmitError> {
        tracing::debug!(photo_count = draft.photo_count(), "submitting map");

        let payloads = draft.poi_payloads(Local::now().naive_local());
        let created_map = self
            .api
            .create_map(draft.name(), &payloads)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "map creation failed");
                SubmitError::CreateMap(e)
            })?;
        let map_id = created_map.id;
        tracing::info!(%map_id, "map created");

        let refetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(%map_id, "submission cancelled before POIs were fetched");
                return Err(SubmitError::Cancelled { map_id: map_id.clone() });
            }
            result = self.api.list_pois_by_map(&map_id) => result,
        };

        let created_pois = match refetched {
            Ok(pois) => pois,
            Err(e) => {
                tracing::warn!(%map_id, error = %e, "failed to fetch created POIs, photos will not be uploaded");
                Vec::new()
            }
        };

        let mut report = SubmissionReport::new(map_id.clone());

        for (poi_index, (poi, payload)) in draft.pois().iter().zip(&payloads).enumerate() {
            let Some(created) = resolve_created_poi(poi_index, poi.coordinates(), &created_pois)
            else {
                tracing::warn!(poi_index, name = %poi.name(), "no created POI matches draft, skipping its photos");
                report.unresolved_pois.push(poi.name().to_string());
                continue;
            };

            for photo in poi.photos() {
                let upload = PhotoUpload {
                    poi_id: created.id.clone(),
                    file_name: photo.file_name.clone(),
                    bytes: photo.bytes.clone(),
                    crop: None,
                    is_primary: photo.id == poi.primary_photo_id(),
                    date_visited: payload.date_visited,
                };

                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::info!(%map_id, "submission cancelled");
                        return Err(SubmitError::Cancelled { map_id });
                    }
                    result = self.api.upload_photo(upload) => result,
                };

                let failure = match result {
                    Ok(res) if res.success => {
                        report.uploaded_photos += 1;
                        tracing::debug!(poi_index, photo_id = %photo.id, "photo uploaded");
                        continue;
                    }
                    Ok(_) => "server rejected the photo".to_string(),
                    Err(e) => e.to_string(),
                };

                tracing::warn!(poi_index, photo_id = %photo.id, reason = %failure, "photo upload failed, skipping");
                report.failed_uploads.push(FailedUpload {
                    poi_name: poi.name().to_string(),
                    photo_id: photo.id,
                    file_name: photo.file_name.clone(),
                    reason: failure,
                });
            }
        }

        tracing::info!(
            %map_id,
            uploaded = report.uploaded_photos,
            failed = report.failed_uploads.len(),
            unresolved = report.unresolved_pois.len(),
            "map submission finished"
        );
        Ok(report)
    }
}

/// Finds the backend record for the draft POI at `index`.
///
/// The record at the same position is used when its coordinates agree;
/// otherwise the first record within tolerance is taken. Several matches
/// cannot be told apart and are only reported.
pub fn resolve_created_poi(
    index: usize,
    coordinates: Coordinates,
    created: &[CreatedPoi],
) -> Option<&CreatedPoi> {
    let matches = |poi: &CreatedPoi| poi.coordinates().approx_eq(&coordinates, COORDINATE_TOLERANCE);

    if let Some(candidate) = created.get(index) {
        if matches(candidate) {
            return Some(candidate);
        }
    }

    let mut candidates = created.iter().filter(|poi| matches(poi));
    let first = candidates.next()?;
    if candidates.next().is_some() {
        tracing::warn!(index, "several created POIs share these coordinates, using the first");
    }
    tracing::debug!(index, poi_id = %first.id, "matched created POI by coordinates");
    Some(first)
}
