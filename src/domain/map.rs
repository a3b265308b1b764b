use chrono::NaiveDateTime;

use crate::domain::poi::DraftPoi;
use crate::domain::remote::PoiPayload;

/// A finished upload session: named, non-empty, every photo assigned.
#[derive(Debug, Clone)]
pub struct MapDraft {
    name: String,
    pois: Vec<DraftPoi>,
}

impl MapDraft {
    pub(crate) fn new(name: String, pois: Vec<DraftPoi>) -> Self {
        Self { name, pois }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pois(&self) -> &[DraftPoi] {
        &self.pois
    }

    pub fn photo_count(&self) -> usize {
        self.pois.iter().map(|p| p.photos().len()).sum()
    }

    /// Coordinate array for map creation, one entry per POI in draft order.
    pub fn poi_payloads(&self, now: NaiveDateTime) -> Vec<PoiPayload> {
        self.pois
            .iter()
            .map(|poi| PoiPayload {
                lat: poi.coordinates().lat,
                lng: poi.coordinates().lng,
                location_name: poi.name().to_string(),
                description: poi.description().unwrap_or_default().to_string(),
                date_visited: poi.visited_at_or(now),
                tags: poi.tags().to_vec(),
            })
            .collect()
    }
}
