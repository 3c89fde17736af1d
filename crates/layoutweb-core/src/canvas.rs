//! Canvas document and state management.

use crate::clipboard::Clipboard;
use crate::config::EditorConfig;
use crate::elements::{
    Element, ElementId, ElementKind, ElementPatch, ElementSnapshot, Fill, ImageSource,
    SerializableColor,
};
use crate::history::History;
use crate::selection::Selection;
use kurbo::{Point, Rect, Size, Vec2};

/// Largest width or height of a freshly placed image.
pub const MAX_IMAGE_SIZE: f64 = 400.0;

/// Offset of a duplicate from its source, on both axes.
pub const DUPLICATE_OFFSET: f64 = 20.0;

/// Ordered element sequence plus the id counter.
///
/// The sequence order is the z-order (back to front).
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasDocument {
    elements: Vec<Element>,
    next_id: ElementId,
}

impl Default for CanvasDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            elements: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild a document from persisted parts.
    ///
    /// The counter is raised past every existing id so minted ids stay unique.
    pub fn from_parts(elements: Vec<Element>, next_id: ElementId) -> Self {
        let mut document = Self { elements, next_id };
        document.raise_counter(document.id_floor());
        document
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn next_id(&self) -> ElementId {
        self.next_id
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn mint_id(&mut self) -> ElementId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append a new element of `kind` at `origin` and return its id.
    pub fn add(&mut self, kind: ElementKind, origin: Point) -> ElementId {
        let id = self.mint_id();
        self.elements.push(Element::new(id, kind, origin));
        id
    }

    /// Append a copy of `snapshot` at `origin` under a freshly minted id.
    pub fn add_copy(&mut self, snapshot: &ElementSnapshot, origin: Point) -> ElementId {
        let id = self.mint_id();
        let mut element = snapshot.with_id(id);
        element.x = origin.x;
        element.y = origin.y;
        self.elements.push(element);
        id
    }

    pub fn get(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|element| element.id() == id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|element| element.id() == id)
    }

    pub fn index_of(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|element| element.id() == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index_of(id).is_some()
    }

    /// Elements whose id is in `ids`, in sequence order.
    pub fn elements_in<'a>(&'a self, ids: &'a [ElementId]) -> impl Iterator<Item = &'a Element> {
        self.elements
            .iter()
            .filter(move |element| ids.contains(&element.id()))
    }

    /// Remove every element in `ids`. Returns how many were removed.
    pub fn remove(&mut self, ids: &[ElementId]) -> usize {
        let before = self.elements.len();
        self.elements.retain(|element| !ids.contains(&element.id()));
        before - self.elements.len()
    }

    /// Replace the element sequence, keeping the id counter.
    /// Replace the elements with a history snapshot.
    ///
    /// The counter only grows, so ids minted after an undo stay unique.
    pub(crate) fn restore(&mut self, elements: &[Element]) {
        self.elements = elements.to_vec();
        self.raise_counter(self.id_floor());
    }

    fn id_floor(&self) -> ElementId {
        self.elements.iter().map(Element::id).max().map_or(1, |max| max + 1)
    }

    fn raise_counter(&mut self, floor: ElementId) {
        self.next_id = self.next_id.max(floor);
    }

    /// Move the elements in `ids` to the end of the sequence, keeping their relative order.
    pub fn bring_to_front(&mut self, ids: &[ElementId]) -> bool {
        let (selected, others): (Vec<Element>, Vec<Element>) = self
            .elements
            .drain(..)
            .partition(|element| ids.contains(&element.id()));
        let changed = !selected.is_empty();
        self.elements = others;
        self.elements.extend(selected);
        changed
    }

    /// Move the elements in `ids` to the start of the sequence, keeping their relative order.
    pub fn send_to_back(&mut self, ids: &[ElementId]) -> bool {
        let (mut selected, others): (Vec<Element>, Vec<Element>) = self
            .elements
            .drain(..)
            .partition(|element| ids.contains(&element.id()));
        let changed = !selected.is_empty();
        selected.extend(others);
        self.elements = selected;
        changed
    }

    /// Swap an element with its successor.
    /// Returns true if the element was moved, false if already at front.
    pub fn move_up(&mut self, id: ElementId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos + 1 < self.elements.len() => {
                self.elements.swap(pos, pos + 1);
                true
            }
            _ => false,
        }
    }

    /// Swap an element with its predecessor.
    /// Returns true if the element was moved, false if already at back.
    pub fn move_down(&mut self, id: ElementId) -> bool {
        match self.index_of(id) {
            Some(pos) if pos > 0 => {
                self.elements.swap(pos, pos - 1);
                true
            }
            _ => false,
        }
    }

    /// Elements under `point`, front to back.
    pub fn elements_at_point(&self, point: Point) -> Vec<ElementId> {
        self.elements
            .iter()
            .rev()
            .filter(|element| element.contains_point(point))
            .map(Element::id)
            .collect()
    }

    /// Elements whose unrotated box strictly overlaps `rect` (touching edges don't count).
    pub fn elements_overlapping(&self, rect: Rect) -> Vec<ElementId> {
        let rect = rect.abs();
        self.elements
            .iter()
            .filter(|element| {
                let b = element.bounds();
                b.x0 < rect.x1 && b.x1 > rect.x0 && b.y0 < rect.y1 && b.y1 > rect.y0
            })
            .map(Element::id)
            .collect()
    }

    /// Elements whose center lies inside `rect`.
    pub fn elements_centered_in(&self, rect: Rect) -> Vec<ElementId> {
        let rect = rect.abs();
        self.elements
            .iter()
            .filter(|element| {
                let c = element.center();
                c.x >= rect.x0 && c.x <= rect.x1 && c.y >= rect.y0 && c.y <= rect.y1
            })
            .map(Element::id)
            .collect()
    }

    /// Get the bounding box of all elements.
    pub fn bounds(&self) -> Option<Rect> {
        self.elements
            .iter()
            .map(Element::bounds)
            .reduce(|acc, bounds| acc.union(bounds))
    }
}

/// Runtime editing state: the document plus selection, history and clipboard.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// The document being edited.
    pub document: CanvasDocument,
    /// Currently selected element ids.
    pub selection: Selection,
    /// Viewport size, used for placement and export.
    pub viewport_size: Size,
    config: EditorConfig,
    history: History,
    clipboard: Clipboard,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    /// Create a new canvas with an empty document.
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let config = config.sanitized();
        Self {
            document: CanvasDocument::new(),
            selection: Selection::new(),
            viewport_size: Size::new(800.0, 600.0),
            history: History::new(config.history_limit),
            clipboard: Clipboard::new(),
            config,
        }
    }

    /// Set the viewport size.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport_size = Size::new(width, height);
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn elements(&self) -> &[Element] {
        self.document.elements()
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    fn snap(&self, point: Point) -> Point {
        self.config.grid.snap_point(point)
    }

    /// Default origin of new elements: slightly up-left of the viewport center.
    fn default_origin(&self) -> Point {
        self.snap(Point::new(
            self.viewport_size.width / 2.0 - 75.0,
            self.viewport_size.height / 2.0 - 75.0,
        ))
    }

    /// Add an element of `kind`, select it alone and record history.
    pub fn create(&mut self, kind: ElementKind, position: Option<Point>) -> ElementId {
        let origin = position.map_or_else(|| self.default_origin(), |p| self.snap(p));
        let id = self.document.add(kind, origin);
        self.selection.set_single(id);
        log::debug!("created {} #{}", kind.name(), id);
        self.commit_history();
        id
    }

    /// Add an image sized from its natural dimensions, fitted into 400×400
    /// and centered on the viewport.
    pub fn create_image(&mut self, source: ImageSource, natural: Size) -> ElementId {
        let size = fit_image_size(natural);
        let origin = self.snap(Point::new(
            self.viewport_size.width / 2.0 - size.width / 2.0,
            self.viewport_size.height / 2.0 - size.height / 2.0,
        ));
        let id = self.document.add(ElementKind::Image, origin);
        if let Some(element) = self.document.get_mut(id) {
            element.width = size.width;
            element.height = size.height;
            element.image = Some(source);
        }
        self.selection.set_single(id);
        log::debug!("created image #{} at {}x{}", id, size.width, size.height);
        self.commit_history();
        id
    }

    /// Apply the same patch to every element in `ids`.
    ///
    /// With `commit == false` the change is live only; the caller commits once
    /// when its gesture ends.
    pub fn update(&mut self, ids: &[ElementId], patch: &ElementPatch, commit: bool) -> usize {
        let mut touched = 0;
        for element in self.document.elements.iter_mut() {
            if ids.contains(&element.id()) {
                patch.apply(element);
                touched += 1;
            }
        }
        if commit && touched > 0 {
            self.commit_history();
        }
        touched
    }

    /// Apply a distinct patch per element as one batch.
    pub fn update_each(&mut self, updates: &[(ElementId, ElementPatch)], commit: bool) -> usize {
        let mut touched = 0;
        for (id, patch) in updates {
            if let Some(element) = self.document.get_mut(*id) {
                patch.apply(element);
                touched += 1;
            }
        }
        if commit && touched > 0 {
            self.commit_history();
        }
        touched
    }

    /// Snapshot the current elements into the undo history.
    pub fn commit_history(&mut self) {
        self.history.commit(self.document.elements());
    }

    /// Remove elements and drop them from the selection.
    pub fn delete(&mut self, ids: &[ElementId]) -> usize {
        let removed = self.document.remove(ids);
        if removed > 0 {
            self.selection.retain_existing(self.document.elements());
            log::debug!("deleted {} element(s)", removed);
            self.commit_history();
        }
        removed
    }

    /// Delete selected elements.
    pub fn delete_selected(&mut self) -> usize {
        let ids = self.selection.ids().to_vec();
        let removed = self.delete(&ids);
        self.selection.clear();
        removed
    }

    pub fn bring_to_front(&mut self) -> bool {
        let ids = self.selection.ids().to_vec();
        let changed = self.document.bring_to_front(&ids);
        if changed {
            self.commit_history();
        }
        changed
    }

    pub fn send_to_back(&mut self) -> bool {
        let ids = self.selection.ids().to_vec();
        let changed = self.document.send_to_back(&ids);
        if changed {
            self.commit_history();
        }
        changed
    }

    /// Move the single selected element one step towards the front.
    pub fn move_up(&mut self) -> bool {
        let Some(id) = self.selection.single() else {
            return false;
        };
        let moved = self.document.move_up(id);
        if moved {
            self.commit_history();
        }
        moved
    }

    /// Move the single selected element one step towards the back.
    pub fn move_down(&mut self) -> bool {
        let Some(id) = self.selection.single() else {
            return false;
        };
        let moved = self.document.move_down(id);
        if moved {
            self.commit_history();
        }
        moved
    }

    /// Copy the selection to the clipboard in sequence order.
    pub fn copy(&mut self) -> usize {
        let ids = self.selection.ids().to_vec();
        let copied = self.clipboard.store(self.document.elements_in(&ids));
        log::debug!("clipboard holds {} element(s)", copied);
        copied
    }

    /// Paste the clipboard under fresh ids and select the result.
    ///
    /// Without a target every copy is offset; with one, every copy is placed at it.
    pub fn paste(&mut self, target: Option<Point>) -> Vec<ElementId> {
        if self.clipboard.is_empty() {
            return Vec::new();
        }
        let grid = self.config.grid;
        let offset = Vec2::new(self.config.paste_offset, self.config.paste_offset);
        let items = self.clipboard.items().to_vec();
        let ids: Vec<ElementId> = items
            .iter()
            .map(|snapshot| {
                let origin = target.unwrap_or_else(|| snapshot.element().origin() + offset);
                self.document.add_copy(snapshot, grid.snap_point(origin))
            })
            .collect();
        self.selection = Selection::from_ids(ids.iter().copied());
        self.commit_history();
        ids
    }

    /// Copy and offset the selection without touching the clipboard.
    pub fn duplicate(&mut self) -> Vec<ElementId> {
        let ids = self.selection.ids().to_vec();
        let snapshots: Vec<ElementSnapshot> = self
            .document
            .elements_in(&ids)
            .map(ElementSnapshot::of)
            .collect();
        if snapshots.is_empty() {
            return Vec::new();
        }
        let grid = self.config.grid;
        let offset = Vec2::new(DUPLICATE_OFFSET, DUPLICATE_OFFSET);
        let new_ids: Vec<ElementId> = snapshots
            .iter()
            .map(|snapshot| {
                let origin = grid.snap_point(snapshot.element().origin() + offset);
                self.document.add_copy(snapshot, origin)
            })
            .collect();
        self.selection = Selection::from_ids(new_ids.iter().copied());
        self.commit_history();
        new_ids
    }

    /// Set every selected element's lock to the inverse of the first selected one.
    pub fn toggle_lock(&mut self) -> Option<bool> {
        let first = self.selection.first()?;
        let locked = !self.document.get(first)?.locked;
        let ids = self.selection.ids().to_vec();
        self.update(&ids, &ElementPatch::locked(locked), true);
        Some(locked)
    }

    /// Select an element (clears previous selection).
    pub fn select(&mut self, id: ElementId) {
        if self.document.contains(id) {
            self.selection.set_single(id);
        }
    }

    /// Add or remove an element from the selection.
    pub fn toggle_selection(&mut self, id: ElementId) {
        if self.document.contains(id) {
            self.selection.toggle(id);
        }
    }

    /// Replace the selection, ignoring unknown ids.
    pub fn set_selection(&mut self, ids: &[ElementId]) {
        self.selection = Selection::from_ids(ids.iter().copied());
        self.selection.retain_existing(self.document.elements());
    }

    /// Select all elements.
    pub fn select_all(&mut self) {
        self.selection = Selection::from_ids(self.document.elements().iter().map(Element::id));
    }

    /// Clear selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(id)
    }

    /// Selected elements in sequence order.
    pub fn selected_elements(&self) -> Vec<&Element> {
        self.document.elements_in(self.selection.ids()).collect()
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(elements) = self.history.undo() else {
            return false;
        };
        self.document.restore(elements);
        self.selection.retain_existing(self.document.elements());
        true
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(elements) = self.history.redo() else {
            return false;
        };
        self.document.restore(elements);
        self.selection.retain_existing(self.document.elements());
        true
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Replace the whole document, clear the selection and record history.
    pub fn load(&mut self, mut document: CanvasDocument) {
        // Ids minted before the load may come back through undo
        document.raise_counter(self.document.next_id());
        self.document = document;
        self.selection.clear();
        self.commit_history();
    }

    /// Set the selection's fill from a CSS value. Malformed input is rejected.
    pub fn set_fill(&mut self, css: &str) -> bool {
        let Some(fill) = Fill::parse(css) else {
            log::debug!("rejected fill {:?}", css);
            return false;
        };
        let ids = self.selection.ids().to_vec();
        self.update(&ids, &ElementPatch::fill(fill), true) > 0
    }

    /// Set the selection's border color from `#rrggbb[aa]`.
    pub fn set_border_color(&mut self, css: &str) -> bool {
        self.apply_color(css, |color| ElementPatch {
            border_color: Some(color),
            ..ElementPatch::default()
        })
    }

    /// Set the selection's font color from `#rrggbb[aa]`.
    pub fn set_font_color(&mut self, css: &str) -> bool {
        self.apply_color(css, |color| ElementPatch {
            font_color: Some(color),
            ..ElementPatch::default()
        })
    }

    fn apply_color(&mut self, css: &str, patch: impl FnOnce(SerializableColor) -> ElementPatch) -> bool {
        let Some(color) = SerializableColor::from_hex(css) else {
            log::debug!("rejected color {:?}", css);
            return false;
        };
        let ids = self.selection.ids().to_vec();
        self.update(&ids, &patch(color), true) > 0
    }
}

/// Scale natural image dimensions down to fit a 400×400 box, rounding to whole units.
pub fn fit_image_size(natural: Size) -> Size {
    let (width, height) = (natural.width, natural.height);
    if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
        return ElementKind::Image.default_size();
    }
    if width > MAX_IMAGE_SIZE || height > MAX_IMAGE_SIZE {
        let ratio = (MAX_IMAGE_SIZE / width).min(MAX_IMAGE_SIZE / height);
        Size::new((width * ratio).round(), (height * ratio).round())
    } else {
        natural
    }
}
