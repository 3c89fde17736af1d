//! Element definitions for the layout surface.

mod image;
mod polygon;
mod style;
mod text;

pub use image::{ImageFormat, ImageSource};
pub use polygon::{normalized_points, polygon_path, svg_points};
pub use style::{Fill, SerializableColor};
pub use text::{FontWeight, TextAlign, TextBlock};

use kurbo::{Affine, BezPath, Ellipse, Point, Rect, RoundedRect, Shape as _, Size};
use serde::{Deserialize, Serialize};

/// Element identifier. Minted by the document, never reused within a session.
pub type ElementId = u64;

/// Smallest width or height reachable through interactive resize.
pub const MIN_SIZE: f64 = 20.0;

/// Corner radius applied to lines so their ends look soft.
pub const LINE_RADIUS: f64 = 2.0;

/// Every kind of element the editor can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementKind {
    Rectangle,
    RoundedRect,
    Circle,
    Oval,
    Triangle,
    Pentagon,
    Hexagon,
    Star,
    Line,
    Text,
    Image,
}

impl ElementKind {
    pub fn all() -> &'static [ElementKind] {
        &[
            ElementKind::Rectangle,
            ElementKind::RoundedRect,
            ElementKind::Circle,
            ElementKind::Oval,
            ElementKind::Triangle,
            ElementKind::Pentagon,
            ElementKind::Hexagon,
            ElementKind::Star,
            ElementKind::Line,
            ElementKind::Text,
            ElementKind::Image,
        ]
    }

    /// Display name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Rectangle => "Rectangle",
            ElementKind::RoundedRect => "Rounded Rectangle",
            ElementKind::Circle => "Circle",
            ElementKind::Oval => "Oval",
            ElementKind::Triangle => "Triangle",
            ElementKind::Pentagon => "Pentagon",
            ElementKind::Hexagon => "Hexagon",
            ElementKind::Star => "Star",
            ElementKind::Line => "Line",
            ElementKind::Text => "Text",
            ElementKind::Image => "Image",
        }
    }

    pub fn is_polygon(&self) -> bool {
        matches!(
            self,
            ElementKind::Triangle | ElementKind::Pentagon | ElementKind::Hexagon | ElementKind::Star
        )
    }

    pub fn is_ellipse(&self) -> bool {
        matches!(self, ElementKind::Circle | ElementKind::Oval)
    }

    /// Size given to freshly created elements.
    pub fn default_size(&self) -> Size {
        match self {
            ElementKind::Text => Size::new(200.0, 50.0),
            ElementKind::Line => Size::new(200.0, 4.0),
            ElementKind::Oval => Size::new(150.0, 100.0),
            _ => Size::new(150.0, 150.0),
        }
    }

    fn default_radius(&self) -> f64 {
        match self {
            ElementKind::RoundedRect => 20.0,
            _ => 0.0,
        }
    }
}

/// A single placed element.
///
/// Position in the owning sequence is its z-order; the last element is drawn on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub(crate) id: ElementId,
    #[serde(rename = "type")]
    pub(crate) kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Clockwise degrees about the center. Any integer, read mod 360.
    #[serde(default)]
    pub rotation: i32,
    #[serde(default)]
    pub fill: Fill,
    #[serde(default = "SerializableColor::black")]
    pub border_color: SerializableColor,
    #[serde(default)]
    pub border_width: f64,
    #[serde(default)]
    pub corner_radius: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<TextBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSource>,
    #[serde(default)]
    pub locked: bool,
}

impl Element {
    /// Element of `kind` with its creation defaults, top-left at `origin`.
    pub(crate) fn new(id: ElementId, kind: ElementKind, origin: Point) -> Self {
        let size = kind.default_size();
        let fill = match kind {
            ElementKind::Text | ElementKind::Image => Fill::None,
            _ => Fill::default(),
        };
        Self {
            id,
            kind,
            x: origin.x,
            y: origin.y,
            width: size.width,
            height: size.height,
            rotation: 0,
            fill,
            border_color: SerializableColor::black(),
            border_width: 0.0,
            corner_radius: kind.default_radius(),
            text: (kind == ElementKind::Text).then(TextBlock::default),
            image: (kind == ElementKind::Image).then(ImageSource::default),
            locked: false,
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Unrotated bounding box.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.origin(), self.size())
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Rotation about the center, in radians.
    pub fn rotation_radians(&self) -> f64 {
        f64::from(self.rotation).to_radians()
    }

    /// Transform mapping the unrotated box onto its drawn position.
    pub fn transform(&self) -> Affine {
        Affine::rotate_about(self.rotation_radians(), self.center())
    }

    /// Hit test against the rotated box.
    pub fn contains_point(&self, point: Point) -> bool {
        let local = self.transform().inverse() * point;
        self.bounds().contains(local)
    }

    /// Corner radius actually used when drawing.
    pub fn effective_radius(&self) -> f64 {
        let radius = match self.kind {
            ElementKind::Line => LINE_RADIUS,
            ElementKind::RoundedRect | ElementKind::Image | ElementKind::Rectangle => {
                self.corner_radius.max(0.0)
            }
            _ => 0.0,
        };
        radius.min(self.width.min(self.height) / 2.0).max(0.0)
    }

    /// Outline of the unrotated element.
    pub fn outline_path(&self) -> BezPath {
        let rect = self.bounds();
        if let Some(path) = polygon_path(self.kind, rect) {
            return path;
        }
        if self.kind.is_ellipse() {
            return Ellipse::from_rect(rect).to_path(0.1);
        }
        let radius = self.effective_radius();
        if radius > 0.0 {
            RoundedRect::from_rect(rect, radius).to_path(0.1)
        } else {
            rect.to_path(0.1)
        }
    }

    pub fn is_text(&self) -> bool {
        self.kind == ElementKind::Text
    }

    pub fn is_image(&self) -> bool {
        self.kind == ElementKind::Image
    }
}

/// Detached copy of an element without an identity, as held by the clipboard.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSnapshot(Element);

impl ElementSnapshot {
    pub fn of(element: &Element) -> Self {
        let mut element = element.clone();
        element.id = 0;
        Self(element)
    }

    pub fn element(&self) -> &Element {
        &self.0
    }

    /// Materialize the snapshot under a fresh id.
    pub(crate) fn with_id(&self, id: ElementId) -> Element {
        let mut element = self.0.clone();
        element.id = id;
        element
    }
}

/// Field delta applied uniformly to a set of elements.
///
/// `None` leaves a field untouched. Text fields only affect text elements,
/// the image source only affects image elements.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<i32>,
    pub fill: Option<Fill>,
    pub border_color: Option<SerializableColor>,
    pub border_width: Option<f64>,
    pub corner_radius: Option<f64>,
    pub locked: Option<bool>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub font_color: Option<SerializableColor>,
    pub font_weight: Option<FontWeight>,
    pub text_align: Option<TextAlign>,
    pub font_family: Option<String>,
    pub image: Option<ImageSource>,
}

impl ElementPatch {
    pub fn position(origin: Point) -> Self {
        Self {
            x: Some(origin.x),
            y: Some(origin.y),
            ..Self::default()
        }
    }

    pub fn geometry(rect: Rect) -> Self {
        Self {
            x: Some(rect.x0),
            y: Some(rect.y0),
            width: Some(rect.width()),
            height: Some(rect.height()),
            ..Self::default()
        }
    }

    pub fn rotation(degrees: i32) -> Self {
        Self {
            rotation: Some(degrees),
            ..Self::default()
        }
    }

    pub fn locked(locked: bool) -> Self {
        Self {
            locked: Some(locked),
            ..Self::default()
        }
    }

    pub fn fill(fill: Fill) -> Self {
        Self {
            fill: Some(fill),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Write every set field into `element`. Non-finite numbers are ignored.
    pub fn apply(&self, element: &mut Element) {
        let finite = |v: Option<f64>| v.filter(|v| v.is_finite());

        if let Some(x) = finite(self.x) {
            element.x = x;
        }
        if let Some(y) = finite(self.y) {
            element.y = y;
        }
        if let Some(width) = finite(self.width) {
            element.width = width.max(0.0);
        }
        if let Some(height) = finite(self.height) {
            element.height = height.max(0.0);
        }
        if let Some(rotation) = self.rotation {
            element.rotation = rotation;
        }
        if let Some(fill) = &self.fill {
            element.fill = fill.clone();
        }
        if let Some(color) = self.border_color {
            element.border_color = color;
        }
        if let Some(width) = finite(self.border_width) {
            element.border_width = width.max(0.0);
        }
        if let Some(radius) = finite(self.corner_radius) {
            element.corner_radius = radius.max(0.0);
        }
        if let Some(locked) = self.locked {
            element.locked = locked;
        }

        if let Some(text) = element.text.as_mut() {
            if let Some(content) = &self.content {
                text.content = content.clone();
            }
            if let Some(size) = finite(self.font_size).filter(|s| *s > 0.0) {
                text.font_size = size;
            }
            if let Some(color) = self.font_color {
                text.font_color = color;
            }
            if let Some(weight) = self.font_weight {
                text.font_weight = weight;
            }
            if let Some(align) = self.text_align {
                text.text_align = align;
            }
            if let Some(family) = &self.font_family {
                text.font_family = family.clone();
            }
        }

        if element.kind == ElementKind::Image {
            if let Some(source) = &self.image {
                element.image = Some(source.clone());
            }
        }
    }
}
