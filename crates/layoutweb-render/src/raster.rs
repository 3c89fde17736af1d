//! Flattening a layout into a PNG.

use crate::decode::{DecodedImages, ImageDecoder, decode_all};
use crate::error::{ExportError, ExportResult};
use crate::glyphs::{FontBook, line_width, middle_to_baseline, text_path};
use kurbo::{Affine, BezPath, PathEl, Point, Rect, Size};
use layoutweb_core::elements::{
    Element, ElementKind, Fill, FontWeight, SerializableColor, TextAlign, TextBlock,
};
use tiny_skia::{
    Color, FillRule, FilterQuality, GradientStop, LinearGradient, Paint, PathBuilder, Pattern,
    Pixmap, SpreadMode, Stroke, Transform,
};

const PLACEHOLDER_FILL: SerializableColor = SerializableColor {
    r: 0xf0,
    g: 0xf0,
    b: 0xf0,
    a: 255,
};
const PLACEHOLDER_TEXT: SerializableColor = SerializableColor {
    r: 0x99,
    g: 0x99,
    b: 0x99,
    a: 255,
};
const PLACEHOLDER_CAPTION: &str = "No Image";
const PLACEHOLDER_FONT_SIZE: f64 = 14.0;

/// Output size and background of a raster export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterOptions {
    pub width: u32,
    pub height: u32,
    pub background: SerializableColor,
}

impl RasterOptions {
    /// One pixel per viewport unit on white.
    pub fn for_viewport(viewport: Size) -> ExportResult<Self> {
        let invalid = || ExportError::InvalidViewport {
            width: viewport.width,
            height: viewport.height,
        };
        let pixels = |v: f64| -> Option<u32> {
            let v = v.round();
            (v.is_finite() && v >= 1.0 && v <= f64::from(u32::MAX)).then_some(v as u32)
        };
        Ok(Self {
            width: pixels(viewport.width).ok_or_else(invalid)?,
            height: pixels(viewport.height).ok_or_else(invalid)?,
            background: SerializableColor::white(),
        })
    }
}

/// Draws elements back to front onto a pixmap.
#[derive(Debug, Clone, Copy)]
pub struct Rasterizer<'a> {
    fonts: &'a FontBook,
    options: RasterOptions,
}

impl<'a> Rasterizer<'a> {
    pub fn new(fonts: &'a FontBook, options: RasterOptions) -> Self {
        Self { fonts, options }
    }

    pub fn options(&self) -> RasterOptions {
        self.options
    }

    /// Decode every image concurrently, draw, and encode as PNG.
    pub async fn render_png(
        &self,
        elements: &[Element],
        decoder: &dyn ImageDecoder,
    ) -> ExportResult<Vec<u8>> {
        let images = decode_all(decoder, elements).await;
        let pixmap = self.render(elements, &images)?;
        let png = encode_png(&pixmap)?;
        log::info!(
            "rasterized {} element(s) into a {}x{} PNG ({} bytes)",
            elements.len(),
            self.options.width,
            self.options.height,
            png.len()
        );
        Ok(png)
    }

    /// [`Self::render_png`] for callers without an executor.
    pub fn render_png_blocking(
        &self,
        elements: &[Element],
        decoder: &dyn ImageDecoder,
    ) -> ExportResult<Vec<u8>> {
        pollster::block_on(self.render_png(elements, decoder))
    }

    /// Draw `elements` with already decoded images.
    pub fn render(&self, elements: &[Element], images: &DecodedImages) -> ExportResult<Pixmap> {
        let RasterOptions { width, height, background } = self.options;
        let mut pixmap = Pixmap::new(width, height).ok_or(ExportError::Pixmap { width, height })?;
        pixmap.fill(skia_color(background));

        for element in elements {
            self.draw_element(&mut pixmap, element, images);
        }
        Ok(pixmap)
    }

    fn draw_element(&self, pixmap: &mut Pixmap, element: &Element, images: &DecodedImages) {
        let transform = skia_transform(element.transform());
        match element.kind() {
            ElementKind::Text => self.draw_text(pixmap, element, transform),
            ElementKind::Image => {
                let decoded = images.get(&element.id()).and_then(|result| result.as_ref().ok());
                match decoded.and_then(|image| image.to_pixmap()) {
                    Some(image) => draw_image(pixmap, element, &image, transform),
                    None => self.draw_placeholder(pixmap, element, transform),
                }
            }
            ElementKind::Line => {
                if let (Some(path), Some(paint)) =
                    (skia_path(&element.outline_path()), fill_paint(&element.fill, element.bounds()))
                {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
                }
            }
            _ => {
                let Some(path) = skia_path(&element.outline_path()) else {
                    return;
                };
                if let Some(paint) = fill_paint(&element.fill, element.bounds()) {
                    pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
                }
                stroke_border(pixmap, &path, element, transform);
            }
        }
    }

    fn draw_text(&self, pixmap: &mut Pixmap, element: &Element, transform: Transform) {
        let Some(text) = element.text.as_ref() else {
            return;
        };
        if !(text.font_size.is_finite() && text.font_size > 0.0) {
            return;
        }
        let lines: Vec<&str> = text.lines().collect();
        let line_height = text.line_height();
        let center = element.center();
        let first_middle = center.y - lines.len() as f64 * line_height / 2.0 + line_height / 2.0;

        for (i, line) in lines.iter().enumerate() {
            let anchor = match text.text_align {
                // Single lines have nothing to justify against
                TextAlign::Left | TextAlign::Justify => element.x + TextBlock::PADDING,
                TextAlign::Center => center.x,
                TextAlign::Right => element.x + element.width - TextBlock::PADDING,
            };
            let middle = Point::new(anchor, first_middle + i as f64 * line_height);
            self.draw_line(pixmap, line, text, middle, transform);
        }
    }

    /// Draw one line whose alignment anchor and vertical middle sit at `at`.
    fn draw_line(&self, pixmap: &mut Pixmap, line: &str, text: &TextBlock, at: Point, transform: Transform) {
        let Some(font) = self.fonts.font(&text.font_family, text.font_weight) else {
            return;
        };
        let size = text.font_size as f32;
        let width = f64::from(line_width(&font, line, size));
        let x = match text.text_align {
            TextAlign::Left | TextAlign::Justify => at.x,
            TextAlign::Center => at.x - width / 2.0,
            TextAlign::Right => at.x - width,
        };
        let baseline = at.y as f32 + middle_to_baseline(&font, size);
        let Some(path) = text_path(&font, line, size, x as f32, baseline) else {
            return;
        };
        if let Some(paint) = solid_paint(text.font_color) {
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
    }

    fn draw_placeholder(&self, pixmap: &mut Pixmap, element: &Element, transform: Transform) {
        let rect = element.bounds();
        if let (Some(rect), Some(paint)) = (skia_rect(rect), solid_paint(PLACEHOLDER_FILL)) {
            pixmap.fill_rect(rect, &paint, transform, None);
        }
        let caption = TextBlock {
            content: PLACEHOLDER_CAPTION.to_string(),
            font_size: PLACEHOLDER_FONT_SIZE,
            font_color: PLACEHOLDER_TEXT,
            font_weight: FontWeight::Normal,
            text_align: TextAlign::Center,
            font_family: TextBlock::DEFAULT_FAMILY.to_string(),
        };
        self.draw_line(pixmap, PLACEHOLDER_CAPTION, &caption, element.center(), transform);
    }
}

/// Stretch `image` over the element box, clipped to its rounded outline.
fn draw_image(pixmap: &mut Pixmap, element: &Element, image: &Pixmap, transform: Transform) {
    let Some(path) = skia_path(&element.outline_path()) else {
        return;
    };
    let sx = (element.width / f64::from(image.width())) as f32;
    let sy = (element.height / f64::from(image.height())) as f32;
    let mut paint = Paint::default();
    paint.shader = Pattern::new(
        image.as_ref(),
        SpreadMode::Pad,
        FilterQuality::Bilinear,
        1.0,
        Transform::from_row(sx, 0.0, 0.0, sy, element.x as f32, element.y as f32),
    );
    pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    stroke_border(pixmap, &path, element, transform);
}

fn stroke_border(pixmap: &mut Pixmap, path: &tiny_skia::Path, element: &Element, transform: Transform) {
    if !(element.border_width > 0.0 && element.border_width.is_finite()) {
        return;
    }
    let Some(paint) = solid_paint(element.border_color) else {
        return;
    };
    let stroke = Stroke {
        width: element.border_width as f32,
        ..Stroke::default()
    };
    pixmap.stroke_path(path, &paint, &stroke, transform, None);
}

fn skia_color(color: SerializableColor) -> Color {
    Color::from_rgba8(color.r, color.g, color.b, color.a)
}

fn solid_paint(color: SerializableColor) -> Option<Paint<'static>> {
    if color.a == 0 {
        return None;
    }
    let mut paint = Paint::default();
    paint.set_color(skia_color(color));
    Some(paint)
}

/// Paint for `fill` over `bounds`. `None` when nothing would be visible.
fn fill_paint(fill: &Fill, bounds: Rect) -> Option<Paint<'static>> {
    if !fill.is_visible() {
        return None;
    }
    match fill {
        Fill::None => None,
        Fill::Solid { color } => solid_paint(*color),
        Fill::LinearGradient { angle, from, to } => {
            // CSS angles: 0deg points up, 90deg points right
            let radians = f64::from(*angle).to_radians();
            let (sin, cos) = radians.sin_cos();
            let half = (bounds.width() * sin.abs() + bounds.height() * cos.abs()) / 2.0;
            let center = bounds.center();
            let start = center - kurbo::Vec2::new(sin, -cos) * half;
            let end = center + kurbo::Vec2::new(sin, -cos) * half;

            let shader = LinearGradient::new(
                tiny_skia::Point::from_xy(start.x as f32, start.y as f32),
                tiny_skia::Point::from_xy(end.x as f32, end.y as f32),
                vec![
                    GradientStop::new(0.0, skia_color(*from)),
                    GradientStop::new(1.0, skia_color(*to)),
                ],
                SpreadMode::Pad,
                Transform::identity(),
            );
            match shader {
                Some(shader) => {
                    let mut paint = Paint::default();
                    paint.shader = shader;
                    Some(paint)
                }
                None => solid_paint(*from),
            }
        }
    }
}

fn skia_transform(affine: Affine) -> Transform {
    let [a, b, c, d, e, f] = affine.as_coeffs();
    Transform::from_row(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32)
}

fn skia_rect(rect: Rect) -> Option<tiny_skia::Rect> {
    tiny_skia::Rect::from_xywh(rect.x0 as f32, rect.y0 as f32, rect.width() as f32, rect.height() as f32)
}

/// Convert a kurbo path. `None` for empty or degenerate paths.
fn skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p) => builder.quad_to(p1.x as f32, p1.y as f32, p.x as f32, p.y as f32),
            PathEl::CurveTo(p1, p2, p) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p.x as f32,
                p.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

/// Encode a pixmap as an 8-bit RGBA PNG.
pub fn encode_png(pixmap: &Pixmap) -> ExportResult<Vec<u8>> {
    let mut rgba = Vec::with_capacity(pixmap.data().len());
    for pixel in pixmap.pixels() {
        let color = pixel.demultiply();
        rgba.extend_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        writer
            .write_image_data(&rgba)
            .map_err(|e| ExportError::Encode(e.to_string()))?;
    }
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::{DecodedImage, DefaultImageDecoder};
    use layoutweb_core::canvas::Canvas;
    use layoutweb_core::elements::{ElementPatch, ImageSource};
    use std::collections::HashMap;

    fn rgba(pixmap: &Pixmap, x: u32, y: u32) -> [u8; 4] {
        let c = pixmap.pixel(x, y).unwrap().demultiply();
        [c.red(), c.green(), c.blue(), c.alpha()]
    }

    fn place(canvas: &mut Canvas, kind: ElementKind, rect: Rect) -> layoutweb_core::elements::ElementId {
        let id = canvas.create(kind, Some(rect.origin()));
        canvas.update(&[id], &ElementPatch::geometry(rect), true);
        id
    }

    fn render(canvas: &Canvas, images: &DecodedImages) -> Pixmap {
        let fonts = FontBook::empty();
        let options = RasterOptions::for_viewport(Size::new(200.0, 200.0)).unwrap();
        Rasterizer::new(&fonts, options).render(canvas.elements(), images).unwrap()
    }

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const BLACK: [u8; 4] = [0, 0, 0, 255];

    #[test]
    fn test_viewport_options() {
        let options = RasterOptions::for_viewport(Size::new(1280.4, 720.0)).unwrap();
        assert_eq!((options.width, options.height), (1280, 720));
        assert!(RasterOptions::for_viewport(Size::new(0.0, 720.0)).is_err());
        assert!(RasterOptions::for_viewport(Size::new(f64::INFINITY, 720.0)).is_err());
    }

    #[test]
    fn test_empty_layout_is_white() {
        let pixmap = render(&Canvas::new(), &HashMap::new());
        assert_eq!((pixmap.width(), pixmap.height()), (200, 200));
        assert_eq!(rgba(&pixmap, 0, 0), WHITE);
        assert_eq!(rgba(&pixmap, 199, 199), WHITE);
    }

    #[test]
    fn test_rectangle_and_circle() {
        let mut canvas = Canvas::new();
        place(&mut canvas, ElementKind::Rectangle, Rect::new(10.0, 10.0, 50.0, 50.0));
        place(&mut canvas, ElementKind::Circle, Rect::new(100.0, 100.0, 180.0, 180.0));
        let pixmap = render(&canvas, &HashMap::new());

        assert_eq!(rgba(&pixmap, 30, 30), BLACK);
        assert_eq!(rgba(&pixmap, 5, 5), WHITE);
        assert_eq!(rgba(&pixmap, 140, 140), BLACK);
        // Bounding-box corner lies outside the ellipse
        assert_eq!(rgba(&pixmap, 102, 102), WHITE);
    }

    #[test]
    fn test_rotation_about_center() {
        let mut canvas = Canvas::new();
        let id = place(&mut canvas, ElementKind::Rectangle, Rect::new(50.0, 95.0, 150.0, 105.0));
        canvas.update(&[id], &ElementPatch::rotation(90), true);
        let pixmap = render(&canvas, &HashMap::new());

        assert_eq!(rgba(&pixmap, 100, 60), BLACK);
        assert_eq!(rgba(&pixmap, 60, 100), WHITE);
    }

    #[test]
    fn test_border_and_later_elements_on_top() {
        let mut canvas = Canvas::new();
        let a = place(&mut canvas, ElementKind::Rectangle, Rect::new(20.0, 20.0, 120.0, 120.0));
        canvas.update(
            &[a],
            &ElementPatch {
                fill: Fill::parse("#00ff00"),
                border_width: Some(6.0),
                border_color: SerializableColor::from_hex("#0000ff"),
                ..ElementPatch::default()
            },
            true,
        );
        place(&mut canvas, ElementKind::Rectangle, Rect::new(60.0, 60.0, 160.0, 160.0));
        let pixmap = render(&canvas, &HashMap::new());

        assert_eq!(rgba(&pixmap, 40, 40), [0, 255, 0, 255]);
        assert_eq!(rgba(&pixmap, 20, 70), [0, 0, 255, 255]);
        assert_eq!(rgba(&pixmap, 100, 100), BLACK);
    }

    #[test]
    fn test_gradient_runs_left_to_right() {
        let mut canvas = Canvas::new();
        let id = place(&mut canvas, ElementKind::Rectangle, Rect::new(0.0, 0.0, 200.0, 50.0));
        canvas.update(
            &[id],
            &ElementPatch::fill(Fill::LinearGradient {
                angle: 90,
                from: SerializableColor::new(255, 0, 0, 255),
                to: SerializableColor::new(0, 0, 255, 255),
            }),
            true,
        );
        let pixmap = render(&canvas, &HashMap::new());
        let left = rgba(&pixmap, 2, 25);
        let right = rgba(&pixmap, 197, 25);
        assert!(left[0] > 240 && left[2] < 15);
        assert!(right[2] > 240 && right[0] < 15);
    }

    #[test]
    fn test_image_and_placeholder() {
        let mut canvas = Canvas::new();
        let shown = place(&mut canvas, ElementKind::Image, Rect::new(0.0, 0.0, 100.0, 50.0));
        let broken = place(&mut canvas, ElementKind::Image, Rect::new(100.0, 100.0, 200.0, 200.0));
        canvas.update(
            &[shown, broken],
            &ElementPatch {
                image: Some(ImageSource::new("x.png")),
                ..ElementPatch::default()
            },
            true,
        );

        let mut images: DecodedImages = HashMap::new();
        images.insert(
            shown,
            Ok(DecodedImage {
                width: 2,
                height: 1,
                rgba: vec![255, 0, 0, 255, 0, 0, 255, 255],
            }),
        );
        images.insert(broken, Err(crate::error::DecodeError::Empty));
        let pixmap = render(&canvas, &images);

        let left = rgba(&pixmap, 5, 25);
        let right = rgba(&pixmap, 95, 25);
        assert!(left[0] > 250 && left[2] < 5);
        assert!(right[2] > 250 && right[0] < 5);
        assert_eq!(rgba(&pixmap, 105, 105), [0xf0, 0xf0, 0xf0, 255]);
    }

    #[test]
    fn test_text_without_fonts_draws_nothing() {
        let mut canvas = Canvas::new();
        let id = canvas.create(ElementKind::Text, Some(Point::new(0.0, 0.0)));
        canvas.update(
            &[id],
            &ElementPatch {
                content: Some("Hello\nWorld".into()),
                ..ElementPatch::default()
            },
            true,
        );
        let pixmap = render(&canvas, &HashMap::new());
        assert!(pixmap.pixels().iter().all(|p| p.demultiply().red() == 255));
    }

    #[test]
    fn test_justified_text_draws_like_left() {
        let fonts = FontBook::system();
        let draw = |align: TextAlign| {
            let mut canvas = Canvas::new();
            let id = canvas.create(ElementKind::Text, Some(Point::new(0.0, 0.0)));
            canvas.update(
                &[id],
                &ElementPatch {
                    content: Some("Hi".into()),
                    text_align: Some(align),
                    ..ElementPatch::default()
                },
                true,
            );
            let options = RasterOptions::for_viewport(Size::new(200.0, 60.0)).unwrap();
            Rasterizer::new(&fonts, options)
                .render(canvas.elements(), &HashMap::new())
                .unwrap()
        };
        assert_eq!(draw(TextAlign::Justify).data(), draw(TextAlign::Left).data());
    }

    #[test]
    fn test_png_output() {
        let mut canvas = Canvas::new();
        place(&mut canvas, ElementKind::Star, Rect::new(10.0, 10.0, 190.0, 190.0));
        let fonts = FontBook::empty();
        let options = RasterOptions::for_viewport(Size::new(320.0, 240.0)).unwrap();
        let png = Rasterizer::new(&fonts, options)
            .render_png_blocking(canvas.elements(), &DefaultImageDecoder::new())
            .unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 240));
    }
}
