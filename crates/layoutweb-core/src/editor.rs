//! Pointer routing with a single active interaction.

use crate::area::{AreaRelease, AreaSession};
use crate::canvas::Canvas;
use crate::elements::{ElementId, ElementPatch};
use crate::input::{Command, Modifiers, MouseButton, PointerEvent, PointerTarget};
use crate::measure::{ApproxTextMeasurer, TextMeasurer, fitted_height};
use crate::selection::{HANDLE_HIT_TOLERANCE, HandleKind, hit_test_handles};
use crate::transform::{DragGesture, Gesture, ResizeGesture, RotateGesture};
use kurbo::Point;

/// Height changes at or below this are ignored while typing.
const TEXT_HEIGHT_EPSILON: f64 = 1.0;

/// The one thing the pointer is currently doing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    Gesture(Gesture),
    Area(AreaSession),
    TextEdit { id: ElementId, dirty: bool },
}

/// Editing engine: a canvas plus the interaction driving it.
pub struct Editor {
    canvas: Canvas,
    interaction: Interaction,
    measurer: Box<dyn TextMeasurer>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Canvas::new())
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("canvas", &self.canvas)
            .field("interaction", &self.interaction)
            .finish_non_exhaustive()
    }
}

impl Editor {
    pub fn new(canvas: Canvas) -> Self {
        Self::with_measurer(canvas, Box::new(ApproxTextMeasurer::default()))
    }

    pub fn with_measurer(canvas: Canvas, measurer: Box<dyn TextMeasurer>) -> Self {
        Self {
            canvas,
            interaction: Interaction::Idle,
            measurer,
        }
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// Direct access for toolbar-style operations.
    ///
    /// Any running interaction is finished first so it cannot act on stale state.
    pub fn canvas_mut(&mut self) -> &mut Canvas {
        self.finish_interaction();
        &mut self.canvas
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn area_session(&self) -> Option<&AreaSession> {
        match &self.interaction {
            Interaction::Area(session) => Some(session),
            _ => None,
        }
    }

    pub fn editing_text(&self) -> Option<ElementId> {
        match self.interaction {
            Interaction::TextEdit { id, .. } => Some(id),
            _ => None,
        }
    }

    /// Resolve what lies under `point`.
    ///
    /// Priority: the box of a ready area session, handles of selected unlocked
    /// elements, element bodies (topmost first), then empty canvas.
    pub fn hit_test(&self, point: Point) -> PointerTarget {
        if let Interaction::Area(session) = &self.interaction {
            if !matches!(session, AreaSession::Selecting { .. }) && session.box_contains(point) {
                return PointerTarget::AreaBox;
            }
        }

        let document = &self.canvas.document;
        for element in document.elements().iter().rev() {
            if element.locked || !self.canvas.is_selected(element.id()) {
                continue;
            }
            if let Some(kind) = hit_test_handles(element, point, HANDLE_HIT_TOLERANCE) {
                return PointerTarget::Handle(element.id(), kind);
            }
        }

        document
            .elements_at_point(point)
            .first()
            .map_or(PointerTarget::Canvas, |&id| PointerTarget::Element(id))
    }

    /// Dispatch a pointer event.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            PointerEvent::Move { position } => self.pointer_move(position),
            PointerEvent::Up { .. } | PointerEvent::Leave => self.pointer_up(),
            PointerEvent::DoubleClick { position } => {
                self.double_click(position);
            }
        }
    }

    pub fn pointer_down(&mut self, position: Point, button: MouseButton, modifiers: Modifiers) {
        match button {
            MouseButton::Left => {}
            MouseButton::Right => {
                self.secondary_click(position);
                return;
            }
            MouseButton::Middle => return,
        }

        if matches!(self.interaction, Interaction::TextEdit { .. }) {
            self.end_text_edit();
        }

        let target = self.hit_test(position);

        if let Interaction::Area(session) = std::mem::take(&mut self.interaction) {
            match target {
                PointerTarget::AreaBox => {
                    self.interaction = Interaction::Area(session.begin_drag(&self.canvas.document, position));
                    return;
                }
                PointerTarget::Element(id) if session.is_captured(id) => {
                    self.interaction = Interaction::Area(session.begin_drag(&self.canvas.document, position));
                    return;
                }
                PointerTarget::Handle(..) => {
                    log::debug!("area session ended by handle press");
                }
                PointerTarget::Element(_) => {
                    self.canvas.clear_selection();
                }
                PointerTarget::Canvas => {
                    self.canvas.clear_selection();
                    return;
                }
            }
        }

        match target {
            PointerTarget::Handle(id, kind) => self.begin_handle_gesture(id, kind, position),
            PointerTarget::Element(id) => self.press_element(id, position, modifiers),
            PointerTarget::Canvas => {
                self.canvas.clear_selection();
                self.interaction = Interaction::Area(AreaSession::start(position));
            }
            PointerTarget::AreaBox => {}
        }
    }

    fn begin_handle_gesture(&mut self, id: ElementId, kind: HandleKind, position: Point) {
        let Some(element) = self.canvas.document.get(id) else {
            return;
        };
        let gesture = match kind {
            HandleKind::Resize(handle) => {
                ResizeGesture::begin(element, handle, position).map(Gesture::Resize)
            }
            HandleKind::Rotate => RotateGesture::begin(element).map(Gesture::Rotate),
        };
        if let Some(gesture) = gesture {
            log::debug!("begin {} on #{}", gesture.name(), id);
            self.interaction = Interaction::Gesture(gesture);
        }
    }

    fn press_element(&mut self, id: ElementId, position: Point, modifiers: Modifiers) {
        let Some(element) = self.canvas.document.get(id) else {
            return;
        };
        if element.locked {
            return;
        }
        if modifiers.shift {
            self.canvas.toggle_selection(id);
            return;
        }

        let ids = if self.canvas.is_selected(id) {
            self.canvas.selection.ids().to_vec()
        } else {
            self.canvas.select(id);
            vec![id]
        };
        if let Some(drag) = DragGesture::begin(&self.canvas.document, &ids, position) {
            log::debug!("begin drag of {} element(s)", ids.len());
            self.interaction = Interaction::Gesture(Gesture::Drag(drag));
        }
    }

    pub fn pointer_move(&mut self, position: Point) {
        let grid = self.canvas.config().grid;
        let patches = match &mut self.interaction {
            Interaction::Gesture(gesture) => {
                gesture.update(&self.canvas.document, position, &grid, self.measurer.as_ref())
            }
            Interaction::Area(session) => session.pointer_move(position, &grid),
            Interaction::Idle | Interaction::TextEdit { .. } => return,
        };
        if !patches.is_empty() {
            self.canvas.update_each(&patches, false);
        }
    }

    /// Release (or leave): commit a finished gesture once and settle area sessions.
    pub fn pointer_up(&mut self) {
        match std::mem::take(&mut self.interaction) {
            Interaction::Gesture(gesture) => {
                log::debug!("commit {}", gesture.name());
                self.canvas.commit_history();
            }
            Interaction::Area(session) => {
                let config = self.canvas.config().clone();
                match session.release(&self.canvas.document, config.marquee, config.min_area_size) {
                    AreaRelease::Discarded => {}
                    AreaRelease::Ready(session) => {
                        self.canvas.set_selection(session.captured());
                        self.interaction = Interaction::Area(session);
                    }
                    AreaRelease::Selected(ids) => self.canvas.set_selection(&ids),
                    AreaRelease::Moved(session) => {
                        log::debug!("commit area drag");
                        self.canvas.commit_history();
                        self.interaction = Interaction::Area(session);
                    }
                }
            }
            other => self.interaction = other,
        }
    }

    /// Open the text editor on a double-clicked text element.
    pub fn double_click(&mut self, position: Point) -> bool {
        match self.hit_test(position) {
            PointerTarget::Element(id) => self.begin_text_edit(id),
            _ => false,
        }
    }

    /// Secondary (context) click. Returns the ids the context action addresses.
    ///
    /// Inside a ready area session the box and its captured elements address
    /// the whole captured set. Otherwise an unselected element becomes the sole
    /// selection and the selection is returned.
    pub fn secondary_click(&mut self, position: Point) -> Vec<ElementId> {
        let target = self.hit_test(position);
        if let Interaction::Area(session) = &self.interaction {
            let captured = session.captured();
            let on_captured = target.element().is_some_and(|id| session.is_captured(id));
            if !captured.is_empty() && (session.box_contains(position) || on_captured) {
                return captured.to_vec();
            }
        }
        if let Some(id) = target.element() {
            if !self.canvas.is_selected(id) {
                self.canvas.select(id);
            }
        }
        self.canvas.selection.ids().to_vec()
    }

    /// Start editing the content of a text element.
    pub fn begin_text_edit(&mut self, id: ElementId) -> bool {
        let editable = self
            .canvas
            .document
            .get(id)
            .is_some_and(|element| element.is_text() && !element.locked);
        if !editable {
            return false;
        }
        self.finish_interaction();
        self.canvas.select(id);
        self.interaction = Interaction::TextEdit { id, dirty: false };
        true
    }

    /// Replace the edited text live, re-fitting the height around the vertical center.
    pub fn edit_text(&mut self, content: &str) -> bool {
        let Interaction::TextEdit { id, dirty } = &mut self.interaction else {
            return false;
        };
        let id = *id;
        let Some(element) = self.canvas.document.get(id) else {
            return false;
        };
        let Some(mut text) = element.text.clone() else {
            return false;
        };
        text.content = content.to_string();
        let new_height = fitted_height(self.measurer.as_ref(), &text, element.width);
        let diff = new_height - element.height;

        let mut patch = ElementPatch {
            content: Some(text.content),
            ..ElementPatch::default()
        };
        if diff.abs() > TEXT_HEIGHT_EPSILON {
            patch.height = Some(new_height);
            patch.y = Some(element.y - diff / 2.0);
        }
        *dirty = true;
        self.canvas.update(&[id], &patch, false);
        true
    }

    /// Close the text editor, committing once if anything changed.
    pub fn end_text_edit(&mut self) -> bool {
        match std::mem::take(&mut self.interaction) {
            Interaction::TextEdit { dirty, .. } => {
                if dirty {
                    self.canvas.commit_history();
                }
                true
            }
            other => {
                self.interaction = other;
                false
            }
        }
    }

    /// Commit whatever is in flight and return to idle.
    pub fn finish_interaction(&mut self) {
        match std::mem::take(&mut self.interaction) {
            Interaction::Gesture(_) | Interaction::TextEdit { dirty: true, .. } => {
                self.canvas.commit_history();
            }
            Interaction::Area(session) if session.is_dragging() => {
                self.canvas.commit_history();
            }
            _ => {}
        }
    }

    /// Run a keyboard command. `Save` and `Load` belong to the host and return false.
    pub fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::Undo => self.canvas_mut().undo(),
            Command::Redo => self.canvas_mut().redo(),
            Command::Copy => self.canvas_mut().copy() > 0,
            Command::Paste => !self.canvas_mut().paste(None).is_empty(),
            Command::Duplicate => !self.canvas_mut().duplicate().is_empty(),
            Command::Delete => self.canvas_mut().delete_selected() > 0,
            Command::SelectAll => {
                self.canvas_mut().select_all();
                true
            }
            Command::Deselect => {
                self.canvas_mut().clear_selection();
                true
            }
            Command::Save | Command::Load => false,
        }
    }
}
