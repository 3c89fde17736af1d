//! LayoutWeb Render Library
//!
//! Export of a layout to static HTML/CSS and to a flattened PNG.
//! Rasterization uses tiny-skia with system fonts located through fontdb.

mod error;

pub mod decode;
pub mod glyphs;
pub mod markup;
pub mod raster;

pub use decode::{DecodedImage, DecodedImages, DefaultImageDecoder, ImageDecoder, decode_all};
pub use error::{DecodeError, ExportError, ExportResult};
pub use glyphs::{FontBook, FontTextMeasurer};
pub use markup::{ImageAsset, MarkupExport, MarkupExporter, image_assets};
pub use raster::{RasterOptions, Rasterizer, encode_png};
