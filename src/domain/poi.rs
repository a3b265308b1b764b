use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::photo::{PhotoId, UploadedPhoto};

pub const MAX_POIS: usize = 25;
pub const MAX_PHOTOS_PER_POI: usize = 3;
pub const MAX_PHOTOS_PER_MAP: usize = MAX_POIS * MAX_PHOTOS_PER_POI;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn approx_eq(&self, other: &Coordinates, tolerance: f64) -> bool {
        (self.lat - other.lat).abs() <= tolerance && (self.lng - other.lng).abs() <= tolerance
    }
}

/// Where a POI's position comes from. Exactly one source is active at a time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CoordinateSource {
    Photo(PhotoId),
    Manual(Coordinates),
}

/// A committed, not yet persisted point of interest.
#[derive(Debug, Clone)]
pub struct DraftPoi {
    name: String,
    description: Option<String>,
    date_visited: Option<NaiveDate>,
    tags: Vec<String>,
    photos: Vec<Arc<UploadedPhoto>>,
    primary_photo: PhotoId,
    coordinates: Coordinates,
}

impl DraftPoi {
    pub(crate) fn new(
        name: String,
        description: Option<String>,
        date_visited: Option<NaiveDate>,
        tags: Vec<String>,
        photos: Vec<Arc<UploadedPhoto>>,
        primary_photo: PhotoId,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            name,
            description,
            date_visited,
            tags,
            photos,
            primary_photo,
            coordinates,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn date_visited(&self) -> Option<NaiveDate> {
        self.date_visited
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn photos(&self) -> &[Arc<UploadedPhoto>] {
        &self.photos
    }

    pub fn primary_photo_id(&self) -> PhotoId {
        self.primary_photo
    }

    pub fn primary_photo(&self) -> Option<&Arc<UploadedPhoto>> {
        self.photos.iter().find(|p| p.id == self.primary_photo)
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn contains(&self, id: PhotoId) -> bool {
        self.photos.iter().any(|p| p.id == id)
    }

    /// Visit time sent to the backend; a blank date becomes `now`.
    pub fn visited_at_or(&self, now: NaiveDateTime) -> NaiveDateTime {
        self.date_visited
            .map(|d| d.and_time(NaiveTime::MIN))
            .unwrap_or(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        assert_eq!(MAX_POIS, 25);
        assert_eq!(MAX_PHOTOS_PER_POI, 3);
        assert_eq!(MAX_PHOTOS_PER_MAP, 75);
    }

    #[test]
    fn test_coordinates_validity() {
        assert!(Coordinates::new(48.8584, 2.2945).is_valid());
        assert!(Coordinates::new(-90.0, 180.0).is_valid());
        assert!(!Coordinates::new(90.5, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, -180.5).is_valid());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_coordinates_approx_eq() {
        let a = Coordinates::new(48.8584, 2.2945);
        assert!(a.approx_eq(&Coordinates::new(48.858405, 2.294495), 1e-5));
        assert!(!a.approx_eq(&Coordinates::new(48.8585, 2.2945), 1e-5));
    }

    #[test]
    fn test_visited_at_falls_back_to_now() {
        let now = NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let mut poi = DraftPoi::new(
            "x".to_string(),
            None,
            None,
            vec![],
            vec![],
            PhotoId::new(),
            Coordinates::new(0.0, 0.0),
        );
        assert_eq!(poi.visited_at_or(now), now);

        poi.date_visited = NaiveDate::from_ymd_opt(2024, 5, 1);
        assert_eq!(
            poi.visited_at_or(now),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_time(NaiveTime::MIN)
        );
    }
}
