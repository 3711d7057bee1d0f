use anyhow::{anyhow, Context, Result};
use image::DynamicImage;
use lopdf::{Document, Object, Stream};
use tesseract::Tesseract;

/// Run OCR over every image embedded in a PDF and return the recognized text.
///
/// Scanned PDFs carry one full-page image per page; object order follows page
/// order in scanner output, so the concatenated text keeps the page sequence.
pub fn extract_scanned_text(bytes: &[u8]) -> Result<String> {
    let doc = Document::load_mem(bytes).context("failed to parse PDF structure")?;

    let mut text = String::new();
    let mut images = 0usize;

    for (id, object) in doc.objects.iter() {
        let Object::Stream(stream) = object else {
            continue;
        };
        if !is_image_stream(stream) {
            continue;
        }
        images += 1;

        match image_bytes(stream) {
            Ok(buf) => match ocr_image(&buf) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Err(e) => log::warn!("OCR failed for image object {:?}: {}", id, e),
            },
            Err(e) => log::warn!("Cannot decode image object {:?}: {}", id, e),
        }
    }

    if images == 0 {
        return Err(anyhow!("PDF contains no embedded page images to OCR"));
    }

    Ok(text.trim().to_string())
}

fn is_image_stream(stream: &Stream) -> bool {
    matches!(stream.dict.get(b"Subtype"), Ok(Object::Name(name)) if name == b"Image")
}

fn filter_name(stream: &Stream) -> Option<&[u8]> {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => Some(name.as_slice()),
        // When filters are chained the final one determines the sample encoding
        Ok(Object::Array(filters)) => match filters.last() {
            Some(Object::Name(name)) => Some(name.as_slice()),
            _ => None,
        },
        _ => None,
    }
}

/// Produce an encoded image (JPEG or PNG) the OCR engine can read directly.
fn image_bytes(stream: &Stream) -> Result<Vec<u8>> {
    // DCTDecode streams already hold a complete JPEG
    if filter_name(stream) == Some(b"DCTDecode") {
        return Ok(stream.content.clone());
    }

    // Flate-compressed raw samples: rebuild an image from the declared geometry
    let data = stream
        .decompressed_content()
        .context("unsupported image stream encoding")?;
    let width = dict_u32(stream, b"Width")?;
    let height = dict_u32(stream, b"Height")?;

    let grayscale = matches!(
        stream.dict.get(b"ColorSpace"),
        Ok(Object::Name(name)) if name == b"DeviceGray"
    );

    let img = if grayscale {
        image::GrayImage::from_raw(width, height, data).map(DynamicImage::ImageLuma8)
    } else {
        image::RgbImage::from_raw(width, height, data).map(DynamicImage::ImageRgb8)
    }
    .ok_or_else(|| anyhow!("image data does not match declared {}x{} geometry", width, height))?;

    let mut buf = Vec::new();
    img.write_to(
        &mut std::io::Cursor::new(&mut buf),
        image::ImageOutputFormat::Png,
    )?;
    Ok(buf)
}

fn dict_u32(stream: &Stream, key: &[u8]) -> Result<u32> {
    stream
        .dict
        .get(key)
        .and_then(Object::as_i64)
        .map(|v| v as u32)
        .map_err(|e| anyhow!("missing image {}: {}", String::from_utf8_lossy(key), e))
}

fn ocr_image(encoded: &[u8]) -> Result<String> {
    let text = Tesseract::new(None, Some("eng"))?
        .set_image_from_mem(encoded)?
        .get_text()?;
    Ok(text)
}
