use std::path::Path;
use std::time::Duration;

use image::ImageFormat;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::domain::remote::{CreatedMap, CreatedPoi, PhotoUpload, PhotoUploadResult, PoiPayload};
use crate::repository::errors::ApiError;
use crate::usecase::contracts::MapApi;

const LOGIN_PATH: &str = "/api/auth/login";
const MAPS_PATH: &str = "/api/maps";
const POIS_BY_MAP_PATH: &str = "/api/pois/map";
const PHOTO_UPLOAD_PATH: &str = "/api/photos/upload";

#[derive(Serialize)]
struct CreateMapRequest<'a> {
    name: &'a str,
    coordinates: &'a [PoiPayload],
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// REST client for the trip-map backend. Authentication is a cookie session,
/// so one client instance must be reused for login and every later call.
pub struct HttpMapApi {
    client: Client,
    base_url: String,
}

impl HttpMapApi {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("trip-uploader/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let base_url = base_url.trim_end_matches('/').to_string();
        tracing::info!(%base_url, "map API client created");

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<(), ApiError> {
        let url = format!("{}{}", self.base_url, LOGIN_PATH);
        tracing::debug!(%url, "logging in");

        let response = self
            .client
            .post(&url)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(request_error)?;
        check_status(response).await?;

        tracing::info!("session established");
        Ok(())
    }
}

impl MapApi for HttpMapApi {
    #[tracing::instrument(skip(self, pois), fields(poi_count = pois.len()))]
    async fn create_map(&self, name: &str, pois: &[PoiPayload]) -> Result<CreatedMap, ApiError> {
        let url = format!("{}{}", self.base_url, MAPS_PATH);
        tracing::debug!(%url, "creating map");

        let response = self
            .client
            .post(&url)
            .json(&CreateMapRequest {
                name,
                coordinates: pois,
            })
            .send()
            .await
            .map_err(request_error)?;

        let created: CreatedMap = decode(response).await?;
        tracing::debug!(map_id = %created.id, "map created");
        Ok(created)
    }

    #[tracing::instrument(skip(self))]
    async fn list_pois_by_map(&self, map_id: &str) -> Result<Vec<CreatedPoi>, ApiError> {
        let url = format!("{}{}/{}", self.base_url, POIS_BY_MAP_PATH, map_id);

        let response = self.client.get(&url).send().await.map_err(request_error)?;

        let pois: Vec<CreatedPoi> = decode(response).await?;
        tracing::debug!(count = pois.len(), "fetched POIs for map");
        Ok(pois)
    }

    #[tracing::instrument(skip(self, upload), fields(poi_id = %upload.poi_id, file_name = %upload.file_name, is_primary = upload.is_primary))]
    async fn upload_photo(&self, upload: PhotoUpload) -> Result<PhotoUploadResult, ApiError> {
        let url = format!("{}{}", self.base_url, PHOTO_UPLOAD_PATH);
        let size = upload.bytes.len();

        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone())
            .mime_str(mime_for(&upload.file_name))
            .map_err(request_error)?;

        let mut form = Form::new()
            .text("poiId", upload.poi_id)
            .text("isPrimary", upload.is_primary.to_string())
            .text(
                "dateVisited",
                upload.date_visited.format("%Y-%m-%dT%H:%M:%S").to_string(),
            )
            .part("photo", part);

        if let Some(crop) = upload.crop {
            let crop_json =
                serde_json::to_string(&crop).map_err(|e| ApiError::Request(e.to_string()))?;
            form = form.text("cropData", crop_json);
        }

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(request_error)?;

        let result: PhotoUploadResult = decode(response).await?;
        tracing::debug!(size, success = result.success, "photo uploaded");
        Ok(result)
    }
}

fn mime_for(file_name: &str) -> &'static str {
    ImageFormat::from_path(Path::new(file_name))
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream")
}

fn request_error(e: reqwest::Error) -> ApiError {
    tracing::error!(error = %e, "map API request failed");
    ApiError::Request(e.to_string())
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::error!(%status, %body, "map API returned error");
        return Err(ApiError::Status {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let response = check_status(response).await?;
    response.json().await.map_err(|e| {
        tracing::error!(error = %e, "failed to parse map API response");
        ApiError::Decode(e.to_string())
    })
}
