use chrono::NaiveDateTime;

use crate::domain::photo::PhotoMetadata;
use crate::domain::poi::Coordinates;

const EXIF_DATETIME_FORMAT: &str = "%Y:%m:%d %H:%M:%S";

/// Sexagesimal coordinate as stored in a GPS IFD.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dms {
    pub degrees: f64,
    pub minutes: f64,
    pub seconds: f64,
}

/// The subset of EXIF tags ingestion cares about. Every field is
/// independently optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExifTags {
    pub gps_latitude: Option<Dms>,
    pub gps_latitude_ref: Option<String>,
    pub gps_longitude: Option<Dms>,
    pub gps_longitude_ref: Option<String>,
    pub date_time_original: Option<String>,
    pub date_time: Option<String>,
    pub create_date: Option<String>,
}

impl ExifTags {
    /// Both axes or nothing; a lone latitude or longitude is discarded, and
    /// so is a pair that is not finite or falls outside the valid range.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let (Some(lat), Some(lng)) = (self.gps_latitude, self.gps_longitude) else {
            return None;
        };
        let coordinates = Coordinates::new(
            dms_to_decimal(lat, self.gps_latitude_ref.as_deref()),
            dms_to_decimal(lng, self.gps_longitude_ref.as_deref()),
        );
        if !coordinates.is_valid() {
            tracing::debug!(?coordinates, "discarding out-of-range GPS coordinates");
            return None;
        }
        Some(coordinates)
    }

    /// DateTimeOriginal, then DateTime, then CreateDate; first one that parses wins.
    /// The result is naive local time, the camera's clock with no zone applied.
    pub fn date_visited(&self) -> Option<NaiveDateTime> {
        [&self.date_time_original, &self.date_time, &self.create_date]
            .into_iter()
            .flatten()
            .find_map(|raw| parse_exif_datetime(raw))
    }

    pub fn to_metadata(&self) -> PhotoMetadata {
        PhotoMetadata {
            coordinates: self.coordinates(),
            date_visited: self.date_visited(),
        }
    }
}

/// `degrees + minutes/60 + seconds/3600`, negated for the southern and
/// western hemispheres.
pub fn dms_to_decimal(dms: Dms, hemisphere_ref: Option<&str>) -> f64 {
    let decimal = dms.degrees + dms.minutes / 60.0 + dms.seconds / 3600.0;
    match hemisphere_ref.map(str::trim) {
        Some("S") | Some("W") => -decimal,
        _ => decimal,
    }
}

/// Parses `YYYY:MM:DD HH:MM:SS`.
pub fn parse_exif_datetime(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim().trim_matches('"');
    match NaiveDateTime::parse_from_str(raw, EXIF_DATETIME_FORMAT) {
        Ok(dt) => Some(dt),
        Err(e) => {
            tracing::debug!(%raw, error = %e, "unparseable EXIF date");
            None
        }
    }
}
