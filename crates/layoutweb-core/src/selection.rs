//! Selection set and manipulation handles.

use crate::elements::{Element, ElementId, ElementKind};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Handle hit tolerance in surface units.
pub const HANDLE_HIT_TOLERANCE: f64 = 8.0;

/// Distance from the element's top edge to the rotation handle.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Ordered set of selected element ids.
///
/// Insertion order is kept so the first selected element is well defined.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<ElementId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ids(ids: impl IntoIterator<Item = ElementId>) -> Self {
        let mut selection = Self::new();
        for id in ids {
            selection.insert(id);
        }
        selection
    }

    pub fn ids(&self) -> &[ElementId] {
        &self.ids
    }

    pub fn first(&self) -> Option<ElementId> {
        self.ids.first().copied()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// The only selected id, if exactly one is selected.
    pub fn single(&self) -> Option<ElementId> {
        match self.ids.as_slice() {
            [id] => Some(*id),
            _ => None,
        }
    }

    /// Add `id` at the end unless already present.
    pub fn insert(&mut self, id: ElementId) {
        if !self.contains(id) {
            self.ids.push(id);
        }
    }

    pub fn remove(&mut self, id: ElementId) {
        self.ids.retain(|&selected| selected != id);
    }

    /// Add or remove `id` (shift-click).
    pub fn toggle(&mut self, id: ElementId) {
        if self.contains(id) {
            self.remove(id);
        } else {
            self.ids.push(id);
        }
    }

    /// Replace the selection with exactly `id`.
    pub fn set_single(&mut self, id: ElementId) {
        self.ids.clear();
        self.ids.push(id);
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Drop ids that are not present in `elements`.
    pub fn retain_existing(&mut self, elements: &[Element]) {
        self.ids
            .retain(|id| elements.iter().any(|element| element.id() == *id));
    }
}

/// Compass point of a resize handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Nw,
        ResizeHandle::N,
        ResizeHandle::Ne,
        ResizeHandle::E,
        ResizeHandle::Se,
        ResizeHandle::S,
        ResizeHandle::Sw,
        ResizeHandle::W,
    ];

    /// Handles offered for an element kind. Lines only stretch horizontally.
    pub fn available_for(kind: ElementKind) -> &'static [ResizeHandle] {
        match kind {
            ElementKind::Line => &[ResizeHandle::E, ResizeHandle::W],
            _ => &Self::ALL,
        }
    }

    pub fn has_north(&self) -> bool {
        matches!(self, ResizeHandle::N | ResizeHandle::Ne | ResizeHandle::Nw)
    }

    pub fn has_south(&self) -> bool {
        matches!(self, ResizeHandle::S | ResizeHandle::Se | ResizeHandle::Sw)
    }

    pub fn has_east(&self) -> bool {
        matches!(self, ResizeHandle::E | ResizeHandle::Ne | ResizeHandle::Se)
    }

    pub fn has_west(&self) -> bool {
        matches!(self, ResizeHandle::W | ResizeHandle::Nw | ResizeHandle::Sw)
    }

    /// Whether the handle changes the width.
    pub fn is_horizontal(&self) -> bool {
        self.has_east() || self.has_west()
    }

    /// Offset from the center as a fraction of the half size.
    fn unit_offset(&self) -> Vec2 {
        let x = if self.has_east() {
            1.0
        } else if self.has_west() {
            -1.0
        } else {
            0.0
        };
        let y = if self.has_south() {
            1.0
        } else if self.has_north() {
            -1.0
        } else {
            0.0
        };
        Vec2::new(x, y)
    }

}

/// Type of manipulation handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Resize(ResizeHandle),
    Rotate,
}

/// A handle with its position on the surface.
#[derive(Debug, Clone, Copy)]
pub struct Handle {
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// Resize and rotation handles of an element, following its rotation.
pub fn get_handles(element: &Element) -> Vec<Handle> {
    let center = element.center();
    let half = Vec2::new(element.width / 2.0, element.height / 2.0);
    let rotation = element.rotation_radians();
    let rotate_point = |offset: Vec2| -> Point {
        let (sin_r, cos_r) = rotation.sin_cos();
        Point::new(
            center.x + offset.x * cos_r - offset.y * sin_r,
            center.y + offset.x * sin_r + offset.y * cos_r,
        )
    };

    let mut handles: Vec<Handle> = ResizeHandle::available_for(element.kind())
        .iter()
        .map(|&handle| {
            let unit = handle.unit_offset();
            let offset = Vec2::new(unit.x * half.x, unit.y * half.y);
            Handle::new(rotate_point(offset), HandleKind::Resize(handle))
        })
        .collect();
    handles.push(Handle::new(
        rotate_point(Vec2::new(0.0, -half.y - ROTATE_HANDLE_OFFSET)),
        HandleKind::Rotate,
    ));
    handles
}

/// Find the handle of `element` under `point`, rotation first.
pub fn hit_test_handles(element: &Element, point: Point, tolerance: f64) -> Option<HandleKind> {
    let handles = get_handles(element);
    handles
        .iter()
        .rev()
        .find(|handle| handle.hit_test(point, tolerance))
        .map(|handle| handle.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Element {
        Element::new(1, ElementKind::Rectangle, Point::new(0.0, 0.0))
    }

    #[test]
    fn test_selection_keeps_insertion_order() {
        let mut selection = Selection::new();
        selection.insert(3);
        selection.insert(1);
        selection.insert(3);
        assert_eq!(selection.ids(), &[3, 1]);
        assert_eq!(selection.first(), Some(3));
        assert_eq!(selection.single(), None);

        selection.toggle(3);
        assert_eq!(selection.ids(), &[1]);
        assert_eq!(selection.single(), Some(1));
    }

    #[test]
    fn test_retain_existing() {
        let mut selection = Selection::from_ids([1, 2]);
        selection.retain_existing(&[square()]);
        assert_eq!(selection.ids(), &[1]);
    }

    #[test]
    fn test_line_handles() {
        let line = Element::new(1, ElementKind::Line, Point::ZERO);
        let kinds: Vec<HandleKind> = get_handles(&line).iter().map(|h| h.kind).collect();
        assert_eq!(
            kinds,
            vec![
                HandleKind::Resize(ResizeHandle::E),
                HandleKind::Resize(ResizeHandle::W),
                HandleKind::Rotate,
            ]
        );
    }

    #[test]
    fn test_handle_positions() {
        let handles = get_handles(&square());
        let se = handles
            .iter()
            .find(|h| h.kind == HandleKind::Resize(ResizeHandle::Se))
            .map(|h| h.position);
        assert_eq!(se, Some(Point::new(150.0, 150.0)));

        let rotate = handles.last().map(|h| h.position);
        assert_eq!(rotate, Some(Point::new(75.0, -25.0)));
    }

    #[test]
    fn test_hit_test_rotated_handles() {
        let mut element = square();
        element.rotation = 90;
        // East handle moves to the bottom center after a quarter turn
        assert_eq!(
            hit_test_handles(&element, Point::new(75.0, 150.0), HANDLE_HIT_TOLERANCE),
            Some(HandleKind::Resize(ResizeHandle::E))
        );
        assert_eq!(hit_test_handles(&element, Point::new(75.0, 75.0), HANDLE_HIT_TOLERANCE), None);
    }
}
