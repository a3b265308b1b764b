use std::io::Cursor;

use exif::{Exif, In, Reader, Tag, Value};

use crate::repository::errors::MetadataError;
use crate::usecase::contracts::MetadataReader;
use crate::usecase::exif::{Dms, ExifTags};

/// EXIF reader backed by kamadak-exif. Accepts any container it recognises
/// (JPEG, TIFF, HEIF, PNG, WebP).
#[derive(Debug, Clone, Copy, Default)]
pub struct KamadakExifReader;

impl MetadataReader for KamadakExifReader {
    fn read_tags(&self, bytes: &[u8]) -> Result<ExifTags, MetadataError> {
        let mut cursor = Cursor::new(bytes);
        let exif = Reader::new()
            .read_from_container(&mut cursor)
            .map_err(|e| MetadataError::Read(e.to_string()))?;

        let tags = ExifTags {
            gps_latitude: read_dms(&exif, Tag::GPSLatitude),
            gps_latitude_ref: read_ascii(&exif, Tag::GPSLatitudeRef),
            gps_longitude: read_dms(&exif, Tag::GPSLongitude),
            gps_longitude_ref: read_ascii(&exif, Tag::GPSLongitudeRef),
            date_time_original: read_ascii(&exif, Tag::DateTimeOriginal),
            date_time: read_ascii(&exif, Tag::DateTime),
            // EXIF records the "created" moment as DateTimeDigitized
            create_date: read_ascii(&exif, Tag::DateTimeDigitized),
        };

        tracing::trace!(?tags, "read EXIF tags");
        Ok(tags)
    }
}

fn read_dms(exif: &Exif, tag: Tag) -> Option<Dms> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    // A zero denominator would turn into NaN or infinity.
    let parts: Option<Vec<f64>> = match &field.value {
        Value::Rational(values) => values
            .iter()
            .map(|r| (r.denom != 0).then(|| r.to_f64()))
            .collect(),
        Value::SRational(values) => values
            .iter()
            .map(|r| (r.denom != 0).then(|| r.to_f64()))
            .collect(),
        other => {
            tracing::debug!(%tag, ?other, "unexpected value type for GPS coordinate");
            return None;
        }
    };

    let Some(parts) = parts else {
        tracing::debug!(%tag, "GPS coordinate has a zero denominator");
        return None;
    };

    match parts.as_slice() {
        [degrees, minutes, seconds, ..] => Some(Dms {
            degrees: *degrees,
            minutes: *minutes,
            seconds: *seconds,
        }),
        _ => {
            tracing::debug!(%tag, components = parts.len(), "incomplete GPS coordinate");
            None
        }
    }
}

fn read_ascii(exif: &Exif, tag: Tag) -> Option<String> {
    match &exif.get_field(tag, In::PRIMARY)?.value {
        Value::Ascii(values) => values
            .first()
            .map(|v| String::from_utf8_lossy(v).trim_end_matches('\0').trim().to_string())
            .filter(|s| !s.is_empty()),
        _ => None,
    }
}
