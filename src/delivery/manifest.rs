use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::domain::photo::PhotoId;
use crate::domain::poi::Coordinates;
use crate::usecase::assembly::UploadSession;
use crate::usecase::error::AssemblyError;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read manifest {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid manifest: {0}")]
    Validation(String),
    #[error("POI {poi:?}: photo {path} was not ingested")]
    UnknownPhoto { poi: String, path: String },
    #[error("POI {poi:?}: location photo index {index} is out of range")]
    LocationOutOfRange { poi: String, index: usize },
    #[error("POI {poi:?}: {source}")]
    Poi {
        poi: String,
        #[source]
        source: AssemblyError,
    },
}

/// Location for a manifest POI: a pinned point, or the GPS of one of its photos.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum ManifestLocation {
    Photo { photo: usize },
    Manual { lat: f64, lng: f64 },
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ManifestPoi {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date_visited: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[validate(length(min = 1))]
    pub photos: Vec<PathBuf>,
    #[serde(default)]
    pub primary: usize,
    pub location: ManifestLocation,
}

/// Scripted upload session: the map name and, per POI, which photos to group
/// and how to fill in the POI form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UploadManifest {
    #[validate(length(min = 1, max = 200))]
    pub map_name: String,
    #[validate(length(min = 1), nested)]
    pub pois: Vec<ManifestPoi>,
}

impl UploadManifest {
    /// Photo paths are resolved against `base_dir`.
    pub fn parse(content: &str, base_dir: &Path) -> Result<Self, ManifestError> {
        let mut manifest: UploadManifest = serde_json::from_str(content)?;

        if let Err(validation_errors) = manifest.validate() {
            tracing::warn!(?validation_errors, "manifest validation failed");
            return Err(ManifestError::Validation(validation_errors.to_string()));
        }

        for poi in &mut manifest.pois {
            for photo in &mut poi.photos {
                *photo = base_dir.join(&*photo);
            }
        }
        Ok(manifest)
    }

    #[tracing::instrument]
    pub async fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ManifestError::Read {
                path: path.display().to_string(),
                source,
            })?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

        let manifest = Self::parse(&content, base_dir)?;
        tracing::info!(
            map_name = %manifest.map_name,
            poi_count = manifest.pois.len(),
            "manifest loaded"
        );
        Ok(manifest)
    }

    /// Every referenced photo once, in first-mention order.
    pub fn photo_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = Vec::new();
        for path in self.pois.iter().flat_map(|poi| &poi.photos) {
            if !paths.contains(path) {
                paths.push(path.clone());
            }
        }
        paths
    }
}

/// Replays the manifest against a session through the same steps a user
/// would take: select photos, pick the primary, choose a location, fill in
/// the form, commit.
#[tracing::instrument(skip_all, fields(poi_count = manifest.pois.len()))]
pub fn apply_manifest(
    session: &mut UploadSession,
    manifest: &UploadManifest,
    photo_ids: &HashMap<PathBuf, PhotoId>,
) -> Result<(), ManifestError> {
    session.set_map_name(manifest.map_name.as_str());

    for poi in &manifest.pois {
        let in_poi = |source: AssemblyError| ManifestError::Poi {
            poi: poi.name.clone(),
            source,
        };

        let ids = poi
            .photos
            .iter()
            .map(|path| {
                photo_ids
                    .get(path)
                    .copied()
                    .ok_or_else(|| ManifestError::UnknownPhoto {
                        poi: poi.name.clone(),
                        path: path.display().to_string(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for id in &ids {
            session.select_photo(*id).map_err(in_poi)?;
        }
        session.set_primary(poi.primary).map_err(in_poi)?;

        match poi.location {
            ManifestLocation::Photo { photo } => {
                let id = ids.get(photo).ok_or_else(|| ManifestError::LocationOutOfRange {
                    poi: poi.name.clone(),
                    index: photo,
                })?;
                session.use_photo_coordinates(*id).map_err(in_poi)?;
            }
            ManifestLocation::Manual { lat, lng } => {
                session
                    .use_manual_coordinates(Coordinates::new(lat, lng))
                    .map_err(in_poi)?;
            }
        }

        session.set_poi_name(poi.name.as_str());
        if let Some(description) = &poi.description {
            session.set_poi_description(description.as_str());
        }
        if poi.date_visited.is_some() {
            session.set_poi_date(poi.date_visited);
        }
        for tag in &poi.tags {
            session.add_tag(tag).map_err(in_poi)?;
        }

        session.commit_poi().map_err(in_poi)?;
    }

    tracing::debug!(
        committed = session.pois().len(),
        unassigned = session.unassigned_photos().len(),
        "manifest applied"
    );
    Ok(())
}
