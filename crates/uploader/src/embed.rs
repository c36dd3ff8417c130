//! Image to PDF conversion.
//!
//! Each image becomes a single A4 page with the image anchored at the top
//! left corner. Images wider than [`MAX_IMAGE_WIDTH`] are scaled down
//! proportionally; narrower ones keep their pixel size in points.

use image::{ColorType, DynamicImage, GenericImageView, ImageFormat as CodecFormat};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use tracing::debug;

use crate::document::{EmbedFuture, ImageFormat, PdfEmbedder};
use crate::error::UploadError;

/// A4 page size in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

/// Widest an image is drawn, in points.
pub const MAX_IMAGE_WIDTH: f32 = 595.0;

/// Resource name of the image on the page.
const IMAGE_NAME: &[u8] = b"Im0";

/// [`PdfEmbedder`] that builds the PDF in-process.
///
/// Decoding and PDF assembly run on the blocking thread pool.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImagePdfEmbedder;

impl PdfEmbedder for ImagePdfEmbedder {
    fn embed_image<'a>(&'a self, image: &'a [u8], format: ImageFormat) -> EmbedFuture<'a> {
        Box::pin(async move {
            let bytes = image.to_vec();
            tokio::task::spawn_blocking(move || image_to_pdf(&bytes, format))
                .await
                .map_err(|e| UploadError::Embed(format!("conversion task failed: {e}")))?
        })
    }
}

/// Drawn size of a `width` x `height` pixel image.
pub fn fit_to_page_width(width: u32, height: u32) -> (f32, f32) {
    let (w, h) = (width as f32, height as f32);
    if w > MAX_IMAGE_WIDTH {
        let scale = MAX_IMAGE_WIDTH / w;
        (MAX_IMAGE_WIDTH, h * scale)
    } else {
        (w, h)
    }
}

/// Wraps a PNG or JPEG image into a one-page PDF.
pub fn image_to_pdf(image: &[u8], format: ImageFormat) -> Result<Vec<u8>, UploadError> {
    let codec = match format {
        ImageFormat::Png => CodecFormat::Png,
        ImageFormat::Jpeg => CodecFormat::Jpeg,
    };
    let decoded = image::load_from_memory_with_format(image, codec)
        .map_err(|e| UploadError::Embed(format!("cannot decode {format:?} image: {e}")))?;
    let (width, height) = decoded.dimensions();
    let (draw_width, draw_height) = fit_to_page_width(width, height);

    let mut doc = Document::with_version("1.7");

    let xobject = match format {
        // JPEG data is embedded as-is; PDF readers decode DCT natively.
        ImageFormat::Jpeg => jpeg_xobject(image, &decoded),
        ImageFormat::Png => raw_xobject(&mut doc, &decoded),
    };
    let image_id = doc.add_object(xobject);

    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    Object::Real(draw_width),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Real(draw_height),
                    Object::Integer(0),
                    Object::Real(PAGE_HEIGHT - draw_height),
                ],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content
        .encode()
        .map_err(|e| UploadError::Embed(format!("cannot encode page content: {e}")))?;
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content_bytes));

    let pages_id = doc.new_object_id();
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(PAGE_WIDTH),
            Object::Real(PAGE_HEIGHT),
        ],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! {
                "Im0" => image_id,
            },
        },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1i64,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", Object::Reference(catalog_id));
    doc.compress();

    let mut pdf = Vec::new();
    doc.save_to(&mut pdf)
        .map_err(|e| UploadError::Embed(format!("cannot write PDF: {e}")))?;

    debug!(
        ?format,
        width,
        height,
        pdf_bytes = pdf.len(),
        "built single-page PDF"
    );
    Ok(pdf)
}

fn image_dict(decoded: &DynamicImage, color_space: &str) -> Dictionary {
    let (width, height) = decoded.dimensions();
    dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => color_space,
        "BitsPerComponent" => 8i64,
    }
}

fn jpeg_xobject(jpeg: &[u8], decoded: &DynamicImage) -> Stream {
    let color_space = match decoded.color() {
        ColorType::L8 | ColorType::L16 => "DeviceGray",
        _ => "DeviceRGB",
    };
    let mut dict = image_dict(decoded, color_space);
    dict.set("Filter", Object::Name(b"DCTDecode".to_vec()));
    Stream::new(dict, jpeg.to_vec()).with_compression(false)
}

/// Stores decoded RGB samples, with the alpha channel as a soft mask.
fn raw_xobject(doc: &mut Document, decoded: &DynamicImage) -> Stream {
    let mut dict = image_dict(decoded, "DeviceRGB");

    if decoded.color().has_alpha() {
        let alpha: Vec<u8> = decoded.to_rgba8().pixels().map(|p| p.0[3]).collect();
        let mask_id = doc.add_object(Stream::new(image_dict(decoded, "DeviceGray"), alpha));
        dict.set("SMask", Object::Reference(mask_id));
    }

    Stream::new(dict, decoded.to_rgb8().into_raw())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(img: DynamicImage, format: CodecFormat) -> Vec<u8> {
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    fn image_streams(doc: &Document) -> Vec<&Stream> {
        doc.objects
            .values()
            .filter_map(|o| o.as_stream().ok())
            .filter(|s| {
                s.dict
                    .get(b"Subtype")
                    .and_then(|v| v.as_name())
                    .is_ok_and(|n| n == b"Image")
            })
            .collect()
    }

    #[test]
    fn narrow_image_keeps_size() {
        assert_eq!(fit_to_page_width(100, 50), (100.0, 50.0));
        assert_eq!(fit_to_page_width(595, 10), (595.0, 10.0));
    }

    #[test]
    fn wide_image_scaled_to_page_width() {
        assert_eq!(fit_to_page_width(1190, 100), (595.0, 50.0));
    }

    #[test]
    fn png_becomes_single_page_pdf() {
        let png = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 2, Rgb([200, 10, 10]))),
            CodecFormat::Png,
        );

        let pdf = image_to_pdf(&png, ImageFormat::Png).unwrap();
        assert!(pdf.starts_with(b"%PDF-1.7"));

        let doc = Document::load_mem(&pdf).unwrap();
        assert_eq!(doc.get_pages().len(), 1);

        let images = image_streams(&doc);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].dict.get(b"Width").unwrap().as_i64().unwrap(), 4);
        assert_eq!(images[0].dict.get(b"Height").unwrap().as_i64().unwrap(), 2);
        assert!(images[0].dict.get(b"SMask").is_err());
    }

    #[test]
    fn png_alpha_becomes_soft_mask() {
        let png = encode(
            DynamicImage::ImageRgba8(RgbaImage::from_pixel(3, 3, Rgba([0, 0, 255, 128]))),
            CodecFormat::Png,
        );

        let pdf = image_to_pdf(&png, ImageFormat::Png).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();

        // Color image plus its grayscale mask.
        assert_eq!(image_streams(&doc).len(), 2);
        assert!(
            image_streams(&doc)
                .iter()
                .any(|s| s.dict.get(b"SMask").is_ok())
        );
    }

    #[test]
    fn jpeg_embedded_with_dct_filter() {
        let jpeg = encode(
            DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([30, 120, 60]))),
            CodecFormat::Jpeg,
        );

        let pdf = image_to_pdf(&jpeg, ImageFormat::Jpeg).unwrap();
        let doc = Document::load_mem(&pdf).unwrap();

        let images = image_streams(&doc);
        assert_eq!(images.len(), 1);
        assert_eq!(
            images[0].dict.get(b"Filter").unwrap().as_name().unwrap(),
            b"DCTDecode"
        );
        assert_eq!(images[0].content, jpeg);
    }

    #[test]
    fn garbage_is_an_embed_error() {
        let err = image_to_pdf(b"not an image", ImageFormat::Png).unwrap_err();
        assert!(matches!(err, UploadError::Embed(_)));
    }

    #[test]
    fn wrong_format_is_an_embed_error() {
        let png = encode(
            DynamicImage::ImageRgb8(RgbImage::new(2, 2)),
            CodecFormat::Png,
        );
        let err = image_to_pdf(&png, ImageFormat::Jpeg).unwrap_err();
        assert!(matches!(err, UploadError::Embed(_)));
    }

    #[tokio::test]
    async fn embedder_runs_conversion() {
        let png = encode(
            DynamicImage::ImageRgb8(RgbImage::new(2, 2)),
            CodecFormat::Png,
        );
        let pdf = ImagePdfEmbedder
            .embed_image(&png, ImageFormat::Png)
            .await
            .unwrap();
        assert!(pdf.starts_with(b"%PDF-"));
    }
}
