use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use serde_json::json;

use crate::domain::map::MapDraft;
use crate::domain::poi::DraftPoi;

/// Renders a draft as a FeatureCollection with one Point per POI, in draft
/// order. The map name is carried as the collection's `name` member.
pub fn map_to_geojson(draft: &MapDraft) -> FeatureCollection {
    let features: Vec<Feature> = draft.pois().iter().map(poi_to_feature).collect();

    let mut foreign_members = JsonObject::new();
    foreign_members.insert("name".to_string(), json!(draft.name()));

    tracing::debug!(
        map_name = %draft.name(),
        feature_count = features.len(),
        "rendered draft map as GeoJSON"
    );

    FeatureCollection {
        bbox: None,
        features,
        foreign_members: Some(foreign_members),
    }
}

fn poi_to_feature(poi: &DraftPoi) -> Feature {
    let coordinates = poi.coordinates();

    let mut properties = JsonObject::new();
    properties.insert("name".to_string(), json!(poi.name()));
    properties.insert("description".to_string(), json!(poi.description()));
    properties.insert(
        "date_visited".to_string(),
        json!(poi.date_visited().map(|d| d.to_string())),
    );
    properties.insert("tags".to_string(), json!(poi.tags()));
    properties.insert("photo_count".to_string(), json!(poi.photos().len()));
    properties.insert(
        "primary_photo".to_string(),
        json!(poi.primary_photo().map(|p| p.file_name.as_str())),
    );

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![coordinates.lng, coordinates.lat]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
