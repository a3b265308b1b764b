use std::io::{Cursor, Write};

use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat};

use crate::domain::photo::PreviewHandle;
use crate::usecase::error::IngestError;

/// Writes a preview rendition of `data` to a temporary file.
///
/// Decodable images are downscaled to at most `max_width` pixels wide and
/// re-encoded as JPEG. Anything the decoder rejects is copied verbatim so the
/// photo stays usable.
pub fn create_preview(data: &[u8], max_width: u32) -> Result<PreviewHandle, IngestError> {
    let (contents, suffix) = match render_thumbnail(data, max_width) {
        Ok(jpeg) => (jpeg, ".jpg"),
        Err(e) => {
            tracing::debug!(error = %e, "image not decodable, using original bytes as preview");
            (data.to_vec(), ".bin")
        }
    };

    let mut file = tempfile::Builder::new()
        .prefix("poi-preview-")
        .suffix(suffix)
        .tempfile()
        .map_err(|e| IngestError::Preview(e.to_string()))?;
    file.write_all(&contents)
        .map_err(|e| IngestError::Preview(e.to_string()))?;

    tracing::trace!(path = %file.path().display(), size = contents.len(), "preview written");
    Ok(PreviewHandle::new(file))
}

fn render_thumbnail(data: &[u8], max_width: u32) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(data)?;

    let img = if max_width > 0 && img.width() > max_width {
        let ratio = max_width as f64 / img.width() as f64;
        let new_height = ((img.height() as f64 * ratio) as u32).max(1);
        tracing::debug!(
            original_width = img.width(),
            original_height = img.height(),
            new_width = max_width,
            new_height,
            "resizing preview"
        );
        img.resize_exact(max_width, new_height, FilterType::Triangle)
    } else {
        img
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let mut buf = Cursor::new(Vec::new());
    rgb.write_to(&mut buf, ImageFormat::Jpeg)?;
    Ok(buf.into_inner())
}
