use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::poi::Coordinates;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoiPayload {
    pub lat: f64,
    pub lng: f64,
    #[serde(rename = "locationName")]
    pub location_name: String,
    pub description: String,
    pub date_visited: NaiveDateTime,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "CreatedMapBody")]
pub struct CreatedMap {
    #[serde(rename = "mapId")]
    pub id: String,
}

/// Map-create response as sent. `mapId` is preferred, the document's own
/// `_id` is the fallback.
#[derive(Deserialize)]
struct CreatedMapBody {
    #[serde(rename = "mapId")]
    map_id: Option<String>,
    #[serde(rename = "_id")]
    document_id: Option<String>,
}

impl TryFrom<CreatedMapBody> for CreatedMap {
    type Error = String;

    fn try_from(body: CreatedMapBody) -> Result<Self, Self::Error> {
        body.map_id
            .or(body.document_id)
            .map(|id| Self { id })
            .ok_or_else(|| "map response has neither `mapId` nor `_id`".to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatedPoi {
    #[serde(rename = "_id")]
    pub id: String,
    pub lat: f64,
    pub lng: f64,
}

impl CreatedPoi {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Crop rectangle in source pixels, sent alongside a photo upload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropData {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhotoUpload {
    pub poi_id: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub crop: Option<CropData>,
    pub is_primary: bool,
    pub date_visited: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoUploadResult {
    pub success: bool,
    #[serde(rename = "photoId", default)]
    pub photo_id: Option<String>,
}
