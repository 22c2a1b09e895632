//! Raster image extraction from PDF page resources.
//!
//! JPEG and JPEG 2000 streams are passed through as-is. Other streams are
//! decoded and re-encoded as PNG when they hold plain 8-bit RGB or grayscale
//! samples; anything else is skipped.

use docmill_core::{EmbeddedImage, ExtractError, ExtractResult};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use lopdf::xobject::PdfImage;
use lopdf::Document;
use tracing::{debug, warn};

/// Extract every decodable image, page by page.
///
/// A failure on one image is logged and skipped; a failure to enumerate a
/// page's images skips that page.
pub fn extract_images(doc: &Document) -> Vec<EmbeddedImage> {
    let mut images = Vec::new();

    for (page_number, page_id) in doc.get_pages() {
        let page_images = match doc.get_page_images(page_id) {
            Ok(page_images) => page_images,
            Err(e) => {
                warn!(page = page_number, error = %e, "Failed to list page images");
                continue;
            }
        };

        // Skipped images keep their slot so later indexes match page order.
        for (index, image) in page_images.iter().enumerate() {
            match encode_image(doc, image) {
                Ok((data, ext)) => {
                    images.push(EmbeddedImage {
                        data,
                        ext: ext.to_string(),
                        page: page_number,
                        index,
                    });
                }
                Err(e) => {
                    warn!(page = page_number, object = ?image.id, error = %e, "Skipping image");
                }
            }
        }
    }

    debug!(count = images.len(), "Extracted PDF images");
    images
}

fn encode_image(doc: &Document, image: &PdfImage) -> ExtractResult<(Vec<u8>, &'static str)> {
    let filters = image.filters.as_deref().unwrap_or_default();

    if filters.iter().any(|f| f == "DCTDecode") {
        return Ok((image.content.to_vec(), "jpg"));
    }
    if filters.iter().any(|f| f == "JPXDecode") {
        return Ok((image.content.to_vec(), "jp2"));
    }

    let samples = if filters.is_empty() {
        image.content.to_vec()
    } else {
        doc.get_object(image.id)
            .and_then(|object| object.as_stream())
            .and_then(|stream| stream.decompressed_content())
            .map_err(|e| ExtractError::Pdf(format!("Failed to decode image stream: {}", e)))?
    };

    let (color, channels) = match (image.color_space.as_deref(), image.bits_per_component) {
        (Some("DeviceRGB"), Some(8)) => (ExtendedColorType::Rgb8, 3),
        (Some("DeviceGray"), Some(8)) => (ExtendedColorType::L8, 1),
        (space, bits) => {
            return Err(ExtractError::Pdf(format!(
                "Unsupported image format: color space {:?}, {:?} bits",
                space, bits
            )))
        }
    };

    let width = u32::try_from(image.width)
        .map_err(|_| ExtractError::Pdf(format!("Invalid image width {}", image.width)))?;
    let height = u32::try_from(image.height)
        .map_err(|_| ExtractError::Pdf(format!("Invalid image height {}", image.height)))?;
    let expected = width as usize * height as usize * channels;
    if samples.len() != expected {
        return Err(ExtractError::Pdf(format!(
            "Image data is {} bytes, expected {}",
            samples.len(),
            expected
        )));
    }

    let mut png = Vec::new();
    PngEncoder::new(&mut png)
        .write_image(&samples, width, height, color)
        .map_err(|e| ExtractError::Pdf(format!("Failed to encode PNG: {}", e)))?;

    Ok((png, "png"))
}
