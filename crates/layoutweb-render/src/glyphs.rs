//! Font lookup, glyph outlines and font-backed text measurement.

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use layoutweb_core::elements::{FontWeight, TextBlock};
use layoutweb_core::measure::{ApproxTextMeasurer, TextMeasurer, wrap_line};
use rusttype::{Font, OutlineBuilder, Scale, point};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tiny_skia::{Path, PathBuilder};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    family: String,
    bold: bool,
}

/// Font database plus a cache of parsed faces.
pub struct FontBook {
    db: Database,
    cache: Mutex<HashMap<FontKey, Option<Arc<Font<'static>>>>>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook").field("faces", &self.db.len()).finish()
    }
}

impl Default for FontBook {
    fn default() -> Self {
        Self::empty()
    }
}

impl FontBook {
    /// No fonts at all; text falls back to approximations.
    pub fn empty() -> Self {
        Self::from_database(Database::new())
    }

    /// Fonts installed on the system.
    pub fn system() -> Self {
        let mut db = Database::new();
        db.load_system_fonts();
        log::debug!("loaded {} system font face(s)", db.len());
        Self::from_database(db)
    }

    pub fn from_database(db: Database) -> Self {
        Self {
            db,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Register an additional font file's bytes.
    pub fn load_font_data(&mut self, data: Vec<u8>) {
        self.db.load_font_data(data);
        self.cache.lock().unwrap_or_else(|p| p.into_inner()).clear();
    }

    pub fn face_count(&self) -> usize {
        self.db.len()
    }

    /// Best face for `family`, falling back to any sans-serif face.
    pub fn font(&self, family: &str, weight: FontWeight) -> Option<Arc<Font<'static>>> {
        let key = FontKey {
            family: family.to_string(),
            bold: weight.is_bold(),
        };
        let mut cache = self.cache.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(cached) = cache.get(&key) {
            return cached.clone();
        }

        let loaded = self.load(family, weight).map(Arc::new);
        if loaded.is_none() {
            log::warn!("no font face for {:?}", family);
        }
        cache.insert(key, loaded.clone());
        loaded
    }

    fn load(&self, family: &str, weight: FontWeight) -> Option<Font<'static>> {
        let families = [Family::Name(family), Family::SansSerif];
        let query = Query {
            families: &families,
            weight: if weight.is_bold() { Weight::BOLD } else { Weight::NORMAL },
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| Font::try_from_vec_and_index(data.to_vec(), index))
            .flatten()
    }
}

/// Scale at which one em equals `size` pixels, like a CSS font size.
pub fn em_scale(font: &Font<'_>, size: f32) -> Scale {
    let units = f32::from(font.units_per_em());
    let metrics = font.v_metrics_unscaled();
    let height = metrics.ascent - metrics.descent;
    if units <= 0.0 || height <= 0.0 {
        return Scale::uniform(size);
    }
    Scale::uniform(size * height / units)
}

/// Advance width of a single line of text.
pub fn line_width(font: &Font<'_>, text: &str, size: f32) -> f32 {
    let scale = em_scale(font, size);
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map_or(0.0, |glyph| glyph.position().x + glyph.unpositioned().h_metrics().advance_width)
}

/// Distance from a line's vertical middle down to its baseline.
pub fn middle_to_baseline(font: &Font<'_>, size: f32) -> f32 {
    let metrics = font.v_metrics(em_scale(font, size));
    (metrics.ascent + metrics.descent) / 2.0
}

struct PathSink {
    builder: PathBuilder,
    dx: f32,
    dy: f32,
}

impl OutlineBuilder for PathSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(x + self.dx, y + self.dy);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(x + self.dx, y + self.dy);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.builder
            .quad_to(x1 + self.dx, y1 + self.dy, x + self.dx, y + self.dy);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.cubic_to(
            x1 + self.dx,
            y1 + self.dy,
            x2 + self.dx,
            y2 + self.dy,
            x + self.dx,
            y + self.dy,
        );
    }

    fn close(&mut self) {
        self.builder.close();
    }
}

/// Outline of `text` with its baseline starting at (`x`, `baseline`).
///
/// `None` when nothing in the text has an outline (e.g. only spaces).
pub fn text_path(font: &Font<'_>, text: &str, size: f32, x: f32, baseline: f32) -> Option<Path> {
    let scale = em_scale(font, size);
    let mut sink = PathSink {
        builder: PathBuilder::new(),
        dx: 0.0,
        dy: 0.0,
    };
    for glyph in font.layout(text, scale, point(x, baseline)) {
        let position = glyph.position();
        sink.dx = position.x;
        sink.dy = position.y;
        glyph.unpositioned().build_outline(&mut sink);
    }
    sink.builder.finish()
}

/// Measures wrapped text with real glyph advances.
///
/// Families without any matching face are measured by [`ApproxTextMeasurer`].
#[derive(Debug, Clone)]
pub struct FontTextMeasurer {
    fonts: Arc<FontBook>,
    fallback: ApproxTextMeasurer,
}

impl FontTextMeasurer {
    pub fn new(fonts: Arc<FontBook>) -> Self {
        Self {
            fonts,
            fallback: ApproxTextMeasurer::default(),
        }
    }
}

impl TextMeasurer for FontTextMeasurer {
    fn measure(
        &self,
        content: &str,
        width: f64,
        font_size: f64,
        font_family: &str,
        weight: FontWeight,
    ) -> f64 {
        if !font_size.is_finite() || font_size <= 0.0 {
            return 0.0;
        }
        let Some(font) = self.fonts.font(font_family, weight) else {
            return self
                .fallback
                .measure(content, width, font_size, font_family, weight);
        };

        let size = font_size as f32;
        let inner = (width - 2.0 * TextBlock::PADDING).max(1.0);
        let line_count: usize = content
            .split('\n')
            .map(|line| wrap_line(line, inner, |s| f64::from(line_width(&font, s, size))).len())
            .sum();
        line_count as f64 * font_size * TextBlock::LINE_HEIGHT + 2.0 * TextBlock::PADDING
    }
}
