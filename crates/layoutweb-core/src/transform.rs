//! Drag, resize and rotate gestures.
//!
//! Every gesture captures what it needs on press, produces uncommitted
//! patches on move and is committed once by the editor on release.

use crate::canvas::CanvasDocument;
use crate::elements::{Element, ElementId, ElementPatch, MIN_SIZE};
use crate::measure::{TextMeasurer, fitted_height};
use crate::selection::ResizeHandle;
use crate::snap::GridSettings;
use kurbo::{Point, Rect, Vec2};

/// One element moved by a drag, with the pointer-to-origin offset captured at press.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DragTarget {
    id: ElementId,
    offset: Vec2,
}

/// Moves a set of elements with the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    targets: Vec<DragTarget>,
}

impl DragGesture {
    /// Capture offsets for every unlocked element in `ids`.
    pub fn begin(document: &CanvasDocument, ids: &[ElementId], pointer: Point) -> Option<Self> {
        let targets: Vec<DragTarget> = document
            .elements_in(ids)
            .filter(|element| !element.locked)
            .map(|element| DragTarget {
                id: element.id(),
                offset: pointer - element.origin(),
            })
            .collect();
        (!targets.is_empty()).then_some(Self { targets })
    }

    pub fn ids(&self) -> Vec<ElementId> {
        self.targets.iter().map(|target| target.id).collect()
    }

    /// New origins for the pointer position, clamped to the positive quadrant and snapped.
    pub fn update(&self, pointer: Point, grid: &GridSettings) -> Vec<(ElementId, ElementPatch)> {
        self.targets
            .iter()
            .map(|target| {
                let raw = pointer - target.offset;
                let origin = grid.snap_point(Point::new(raw.x.max(0.0), raw.y.max(0.0)));
                (target.id, ElementPatch::position(origin))
            })
            .collect()
    }
}

/// Resizes one element from one of its handles.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeGesture {
    id: ElementId,
    handle: ResizeHandle,
    start_pointer: Point,
    start: Rect,
}

impl ResizeGesture {
    pub fn begin(element: &Element, handle: ResizeHandle, pointer: Point) -> Option<Self> {
        if element.locked || !ResizeHandle::available_for(element.kind()).contains(&handle) {
            return None;
        }
        Some(Self {
            id: element.id(),
            handle,
            start_pointer: pointer,
            start: element.bounds(),
        })
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn handle(&self) -> ResizeHandle {
        self.handle
    }

    /// Box for the pointer position, before text auto-height.
    ///
    /// Sizes never drop below [`MIN_SIZE`]; west and north handles move the
    /// origin with the pointer and keep the opposite edge anchored once clamped.
    pub fn resized_rect(&self, pointer: Point) -> Rect {
        let delta = pointer - self.start_pointer;
        let delta = Vec2::new(
            if delta.x.is_finite() { delta.x } else { 0.0 },
            if delta.y.is_finite() { delta.y } else { 0.0 },
        );
        let (x0, y0) = (self.start.x0, self.start.y0);
        let (w0, h0) = (self.start.width(), self.start.height());

        let (mut x, mut y, mut w, mut h) = (x0, y0, w0, h0);
        if self.handle.has_east() {
            w = (w0 + delta.x).max(MIN_SIZE);
        }
        // West and north edges follow the pointer until the floor, then the
        // opposite edge stays put instead of snapping back to the start origin
        if self.handle.has_west() {
            w = (w0 - delta.x).max(MIN_SIZE);
            x = x0 + (w0 - w);
        }
        if self.handle.has_south() {
            h = (h0 + delta.y).max(MIN_SIZE);
        }
        if self.handle.has_north() {
            h = (h0 - delta.y).max(MIN_SIZE);
            y = y0 + (h0 - h);
        }
        Rect::new(x, y, x + w, y + h)
    }

    /// Patch for the pointer position.
    ///
    /// Text elements resized horizontally get their height from `measurer`.
    pub fn update(
        &self,
        element: &Element,
        pointer: Point,
        measurer: &dyn TextMeasurer,
    ) -> ElementPatch {
        let rect = self.resized_rect(pointer);
        let mut patch = ElementPatch::geometry(rect);
        if let Some(text) = element.text.as_ref() {
            if self.handle.is_horizontal() {
                patch.height = Some(fitted_height(measurer, text, rect.width()));
            }
        }
        patch
    }
}

/// Rotates one element around its center.
#[derive(Debug, Clone, PartialEq)]
pub struct RotateGesture {
    id: ElementId,
    center: Point,
}

impl RotateGesture {
    pub fn begin(element: &Element) -> Option<Self> {
        if element.locked {
            return None;
        }
        Some(Self {
            id: element.id(),
            center: element.center(),
        })
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn update(&self, pointer: Point) -> ElementPatch {
        ElementPatch::rotation(rotation_angle(self.center, pointer))
    }
}

/// Angle in whole degrees that points the element's top towards `pointer`.
///
/// A pointer straight above the center yields 0. Not normalized: the result
/// lies in (-90, 270].
pub fn rotation_angle(center: Point, pointer: Point) -> i32 {
    let dx = pointer.x - center.x;
    let dy = pointer.y - center.y;
    if !(dx.is_finite() && dy.is_finite()) {
        return 0;
    }
    // atan2(0, 0) is 0, so a pointer on the center gives 90
    let degrees = dy.atan2(dx).to_degrees() + 90.0;
    (degrees + 0.5).floor() as i32
}

/// The active pointer gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Drag(DragGesture),
    Resize(ResizeGesture),
    Rotate(RotateGesture),
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Drag(_) => "drag",
            Gesture::Resize(_) => "resize",
            Gesture::Rotate(_) => "rotate",
        }
    }

    /// Patches produced by moving the pointer to `pointer`.
    pub fn update(
        &self,
        document: &CanvasDocument,
        pointer: Point,
        grid: &GridSettings,
        measurer: &dyn TextMeasurer,
    ) -> Vec<(ElementId, ElementPatch)> {
        match self {
            Gesture::Drag(drag) => drag.update(pointer, grid),
            Gesture::Resize(resize) => document
                .get(resize.id)
                .map(|element| vec![(resize.id, resize.update(element, pointer, measurer))])
                .unwrap_or_default(),
            Gesture::Rotate(rotate) => vec![(rotate.id, rotate.update(pointer))],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementKind, TextBlock};
    use crate::measure::ApproxTextMeasurer;

    fn document_with(kind: ElementKind, origin: Point) -> (CanvasDocument, ElementId) {
        let mut document = CanvasDocument::new();
        let id = document.add(kind, origin);
        (document, id)
    }

    #[test]
    fn test_drag_snaps_to_grid() {
        let (document, id) = document_with(ElementKind::Rectangle, Point::new(40.0, 40.0));
        let grid = GridSettings {
            snap: true,
            ..GridSettings::default()
        };
        let drag = DragGesture::begin(&document, &[id], Point::new(50.0, 50.0)).unwrap();

        for pointer in [Point::new(73.0, 91.0), Point::new(118.5, 64.2), Point::new(301.0, 9.0)] {
            for (_, patch) in drag.update(pointer, &grid) {
                let (x, y) = (patch.x.unwrap(), patch.y.unwrap());
                assert_eq!(x % 20.0, 0.0);
                assert_eq!(y % 20.0, 0.0);
            }
        }
    }

    #[test]
    fn test_drag_clamps_at_zero() {
        let (document, id) = document_with(ElementKind::Rectangle, Point::new(10.0, 10.0));
        let drag = DragGesture::begin(&document, &[id], Point::new(20.0, 20.0)).unwrap();
        let patches = drag.update(Point::new(0.0, 5.0), &GridSettings::default());
        assert_eq!(patches[0].1, ElementPatch::position(Point::new(0.0, 0.0)));
    }

    #[test]
    fn test_drag_skips_locked() {
        let mut document = CanvasDocument::new();
        let free = document.add(ElementKind::Rectangle, Point::ZERO);
        let locked = document.add(ElementKind::Rectangle, Point::ZERO);
        document.get_mut(locked).unwrap().locked = true;

        let drag = DragGesture::begin(&document, &[free, locked], Point::ZERO).unwrap();
        assert_eq!(drag.ids(), vec![free]);
        assert!(DragGesture::begin(&document, &[locked], Point::ZERO).is_none());
    }

    #[test]
    fn test_resize_west_floor() {
        let (document, id) = document_with(ElementKind::Rectangle, Point::new(100.0, 100.0));
        let element = document.get(id).unwrap();
        let resize = ResizeGesture::begin(element, ResizeHandle::W, Point::new(100.0, 150.0)).unwrap();

        let rect = resize.resized_rect(Point::new(130.0, 150.0));
        assert_eq!(rect.x0, 130.0);
        assert_eq!(rect.width(), 120.0);

        let mut last_x = None;
        for dx in [130.0, 131.0, 200.0, 500.0] {
            let rect = resize.resized_rect(Point::new(100.0 + dx, 150.0));
            assert_eq!(rect.width(), 20.0);
            assert_eq!(rect.x1, 250.0);
            if let Some(x) = last_x {
                assert_eq!(rect.x0, x);
            }
            last_x = Some(rect.x0);
        }
    }

    #[test]
    fn test_resize_corner() {
        let (document, id) = document_with(ElementKind::Oval, Point::new(0.0, 0.0));
        let element = document.get(id).unwrap();
        let resize = ResizeGesture::begin(element, ResizeHandle::Se, Point::new(150.0, 100.0)).unwrap();
        let rect = resize.resized_rect(Point::new(200.0, 60.0));
        assert_eq!(rect, Rect::new(0.0, 0.0, 200.0, 60.0));

        let resize = ResizeGesture::begin(element, ResizeHandle::N, Point::new(75.0, 0.0)).unwrap();
        let rect = resize.resized_rect(Point::new(75.0, -30.0));
        assert_eq!(rect, Rect::new(0.0, -30.0, 150.0, 100.0));
    }

    #[test]
    fn test_line_rejects_vertical_handles() {
        let (document, id) = document_with(ElementKind::Line, Point::ZERO);
        let element = document.get(id).unwrap();
        assert!(ResizeGesture::begin(element, ResizeHandle::N, Point::ZERO).is_none());
        assert!(ResizeGesture::begin(element, ResizeHandle::E, Point::ZERO).is_some());
    }

    #[test]
    fn test_text_auto_height_on_width_resize() {
        let (mut document, id) = document_with(ElementKind::Text, Point::ZERO);
        document.get_mut(id).unwrap().text = Some(TextBlock::new("Hello\nWorld"));
        let element = document.get(id).unwrap();
        let resize = ResizeGesture::begin(element, ResizeHandle::E, Point::new(200.0, 25.0)).unwrap();

        let patch = resize.update(element, Point::new(80.0, 25.0), &ApproxTextMeasurer::default());
        assert_eq!(patch.width, Some(80.0));
        assert!(patch.height.unwrap() >= 57.6);
    }

    #[test]
    fn test_rotation_angle() {
        let center = Point::new(100.0, 100.0);
        assert_eq!(rotation_angle(center, Point::new(100.0, 0.0)), 0);
        assert_eq!(rotation_angle(center, Point::new(200.0, 100.0)), 90);
        assert_eq!(rotation_angle(center, Point::new(100.0, 200.0)), 180);
        assert_eq!(rotation_angle(center, Point::new(0.0, 100.0)), 270);
        assert_eq!(rotation_angle(center, Point::new(0.0, 99.0)).rem_euclid(360), 271 % 360);
    }

    #[test]
    fn test_rotation_sweep_is_continuous_mod_360() {
        let center = Point::new(0.0, 0.0);
        let mut previous = rotation_angle(center, Point::new(0.0, -100.0));
        for step in 1..=360 {
            let theta = f64::from(step).to_radians();
            let pointer = Point::new(100.0 * theta.sin(), -100.0 * theta.cos());
            let angle = rotation_angle(center, pointer);
            let diff = (angle - previous).rem_euclid(360);
            assert!(diff <= 2, "jump of {diff} at step {step}");
            previous = angle;
        }
    }

    #[test]
    fn test_locked_elements_reject_gestures() {
        let (mut document, id) = document_with(ElementKind::Rectangle, Point::ZERO);
        document.get_mut(id).unwrap().locked = true;
        let element = document.get(id).unwrap();
        assert!(RotateGesture::begin(element).is_none());
        assert!(ResizeGesture::begin(element, ResizeHandle::E, Point::ZERO).is_none());
    }
}
