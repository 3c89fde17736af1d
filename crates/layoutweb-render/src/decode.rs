//! Image decoding for export.
//!
//! Every image source in a layout is decoded concurrently before rasterizing.
//! A source that cannot be decoded is reported per element; callers draw a
//! placeholder for it instead of failing the export.

use crate::error::DecodeError;
use futures::future::{BoxFuture, FutureExt, join_all};
use layoutweb_core::elements::{Element, ElementId, ElementKind, ImageSource};
use std::collections::HashMap;
use std::path::PathBuf;
use tiny_skia::{IntSize, Pixmap};

/// Straight-alpha RGBA pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    /// 4 bytes per pixel, not premultiplied.
    pub rgba: Vec<u8>,
}

impl DecodedImage {
    /// Decode encoded PNG/JPEG/WebP bytes.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, DecodeError> {
        let decoded = image::load_from_memory(bytes).map_err(|e| DecodeError::Image(e.to_string()))?;
        let rgba = decoded.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            width,
            height,
            rgba: rgba.into_vec(),
        })
    }

    /// Premultiplied pixmap for drawing. `None` for empty or inconsistent images.
    pub fn to_pixmap(&self) -> Option<Pixmap> {
        let size = IntSize::from_wh(self.width, self.height)?;
        let mut data = self.rgba.clone();
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            for c in &mut px[..3] {
                *c = ((u16::from(*c) * a + 127) / 255) as u8;
            }
        }
        Pixmap::from_vec(data, size)
    }
}

/// Turns an image source into pixels.
pub trait ImageDecoder: Send + Sync {
    fn decode<'a>(&'a self, source: &'a ImageSource) -> BoxFuture<'a, Result<DecodedImage, DecodeError>>;
}

/// Decodes `data:` URLs and local files.
///
/// Relative paths resolve against `base_dir`; remote URLs are unsupported.
#[derive(Debug, Clone, Default)]
pub struct DefaultImageDecoder {
    base_dir: Option<PathBuf>,
}

impl DefaultImageDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    /// Raw encoded bytes behind `source`.
    pub fn read_bytes(&self, source: &ImageSource) -> Result<Vec<u8>, DecodeError> {
        if source.is_empty() {
            return Err(DecodeError::Empty);
        }
        if source.is_data_url() {
            return source.inline_bytes().ok_or(DecodeError::MalformedDataUrl);
        }

        let reference = source.as_str();
        if reference.contains("://") && !reference.starts_with("file://") {
            return Err(DecodeError::Unsupported(reference.to_string()));
        }
        let path = PathBuf::from(reference.strip_prefix("file://").unwrap_or(reference));
        let path = match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path,
        };
        std::fs::read(&path).map_err(|e| DecodeError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

impl ImageDecoder for DefaultImageDecoder {
    fn decode<'a>(&'a self, source: &'a ImageSource) -> BoxFuture<'a, Result<DecodedImage, DecodeError>> {
        async move {
            let bytes = self.read_bytes(source)?;
            DecodedImage::from_encoded(&bytes)
        }
        .boxed()
    }
}

/// Decode results keyed by element.
pub type DecodedImages = HashMap<ElementId, Result<DecodedImage, DecodeError>>;

/// Decode the sources of every image element concurrently.
///
/// Elements without a source are left out.
pub async fn decode_all(decoder: &dyn ImageDecoder, elements: &[Element]) -> DecodedImages {
    let jobs = elements
        .iter()
        .filter(|element| element.kind() == ElementKind::Image)
        .filter_map(|element| {
            let source = element.image.as_ref().filter(|source| !source.is_empty())?;
            let id = element.id();
            Some(async move { (id, decoder.decode(source).await) })
        });

    let results = join_all(jobs).await;
    for (id, result) in &results {
        if let Err(e) = result {
            log::warn!("image #{} will be a placeholder: {}", id, e);
        }
    }
    results.into_iter().collect()
}
