//! Raster images as PDF image XObjects
//!
//! Any format the `image` crate decodes is converted to 8-bit RGB with an
//! optional soft mask for transparency, both Flate compressed.

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::document::{ImagePlacement, OperationError, Rect, Result};

/// Resolution assumed when placing an image at its natural size
pub const DEFAULT_DPI: f32 = 96.0;

/// Decoded pixel data
#[derive(Debug, Clone)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    rgb: Vec<u8>,
    /// Present only when some pixel is not fully opaque
    alpha: Option<Vec<u8>>,
}

impl RasterImage {
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes)
            .map_err(|e| OperationError::UnsupportedImage(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width == 0 || height == 0 {
            return Err(OperationError::UnsupportedImage("image has no pixels".to_string()));
        }

        let pixels = rgba.into_raw();
        let mut rgb = Vec::with_capacity(pixels.len() / 4 * 3);
        let mut alpha = Vec::with_capacity(pixels.len() / 4);
        for px in pixels.chunks_exact(4) {
            rgb.extend_from_slice(&px[..3]);
            alpha.push(px[3]);
        }
        let alpha = alpha.iter().any(|&a| a < u8::MAX).then_some(alpha);

        Ok(Self {
            width,
            height,
            rgb,
            alpha,
        })
    }

    /// Size in points at [`DEFAULT_DPI`]
    pub fn natural_size(&self) -> (f32, f32) {
        let scale = 72.0 / DEFAULT_DPI;
        (self.width as f32 * scale, self.height as f32 * scale)
    }

    /// Displayed rect the image occupies for a placement
    ///
    /// A fitted image keeps its aspect ratio and is centered in the box.
    pub fn target_rect(&self, placement: ImagePlacement) -> Rect {
        let (natural_w, natural_h) = self.natural_size();
        match placement {
            ImagePlacement::At(p) => Rect::new(p.x, p.y, p.x + natural_w, p.y + natural_h),
            ImagePlacement::Fit(rect) => {
                let rect = rect.normalized();
                let scale = (rect.width() / natural_w).min(rect.height() / natural_h);
                let (w, h) = (natural_w * scale, natural_h * scale);
                let x0 = rect.x0 + (rect.width() - w) / 2.0;
                let y0 = rect.y0 + (rect.height() - h) / 2.0;
                Rect::new(x0, y0, x0 + w, y0 + h)
            }
        }
    }

    /// Add the image (and its soft mask) to the document
    pub fn add_to(&self, doc: &mut Document) -> Result<ObjectId> {
        let mut dict = self.image_dictionary(b"DeviceRGB");
        if let Some(alpha) = &self.alpha {
            let mask = Stream::new(self.image_dictionary(b"DeviceGray"), deflate(alpha)?);
            let mask_id = doc.add_object(mask);
            dict.set("SMask", Object::Reference(mask_id));
        }
        Ok(doc.add_object(Stream::new(dict, deflate(&self.rgb)?)))
    }

    fn image_dictionary(&self, color_space: &[u8]) -> Dictionary {
        Dictionary::from_iter([
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", Object::Integer(i64::from(self.width))),
            ("Height", Object::Integer(i64::from(self.height))),
            ("ColorSpace", Object::Name(color_space.to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(b"FlateDecode".to_vec())),
        ])
    }
}

fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}
