//! Rubber-band area selection and group drag.
//!
//! A session starts when the pointer is pressed on empty canvas. Releasing a
//! large enough box over some elements leaves a `Ready` session whose box can
//! then be dragged to move every captured element at once.

use crate::canvas::CanvasDocument;
use crate::config::MarqueeMode;
use crate::elements::{ElementId, ElementPatch};
use crate::snap::GridSettings;
use kurbo::{Point, Rect, Vec2};

/// Tagged area-selection state.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaSession {
    /// Box being drawn from `anchor` to `current`.
    Selecting { anchor: Point, current: Point },
    /// Box finished over `captured`, waiting for a drag.
    Ready { rect: Rect, captured: Vec<ElementId> },
    /// Captured elements following the pointer.
    Dragging {
        rect: Rect,
        captured: Vec<ElementId>,
        box_origin: Point,
        anchor: Point,
        starts: Vec<(ElementId, Point)>,
    },
}

/// What releasing the pointer did to a session.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaRelease {
    /// Box too small or empty; the session is over.
    Discarded,
    /// Box captured elements; the session waits for a drag.
    Ready(AreaSession),
    /// Instant marquee finished with these elements selected.
    Selected(Vec<ElementId>),
    /// Group drag finished; the caller commits and keeps the returned `Ready` session.
    Moved(AreaSession),
}

impl AreaSession {
    pub fn start(anchor: Point) -> Self {
        AreaSession::Selecting {
            anchor,
            current: anchor,
        }
    }

    /// Current box in surface coordinates.
    pub fn rect(&self) -> Rect {
        match self {
            AreaSession::Selecting { anchor, current } => Rect::from_points(*anchor, *current),
            AreaSession::Ready { rect, .. } | AreaSession::Dragging { rect, .. } => *rect,
        }
    }

    /// Ids held by the session; empty while selecting.
    pub fn captured(&self) -> &[ElementId] {
        match self {
            AreaSession::Selecting { .. } => &[],
            AreaSession::Ready { captured, .. } | AreaSession::Dragging { captured, .. } => captured,
        }
    }

    pub fn is_captured(&self, id: ElementId) -> bool {
        self.captured().contains(&id)
    }

    /// Whether `point` lies on the box (edges included).
    pub fn box_contains(&self, point: Point) -> bool {
        let rect = self.rect();
        point.x >= rect.x0 && point.x <= rect.x1 && point.y >= rect.y0 && point.y <= rect.y1
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, AreaSession::Ready { .. })
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, AreaSession::Dragging { .. })
    }

    /// Elements a live box currently touches, for highlighting while drawing.
    pub fn preview(&self, document: &CanvasDocument, mode: MarqueeMode) -> Vec<ElementId> {
        match self {
            AreaSession::Selecting { .. } => match mode {
                MarqueeMode::Session => document.elements_overlapping(self.rect()),
                MarqueeMode::Instant => document.elements_centered_in(self.rect()),
            },
            _ => self.captured().to_vec(),
        }
    }

    /// Turn a `Ready` session into a group drag anchored at `pointer`.
    ///
    /// Locked captured elements stay where they are. Other states are returned unchanged.
    pub fn begin_drag(self, document: &CanvasDocument, pointer: Point) -> Self {
        match self {
            AreaSession::Ready { rect, captured } => {
                let starts = document
                    .elements_in(&captured)
                    .filter(|element| !element.locked)
                    .map(|element| (element.id(), element.origin()))
                    .collect();
                log::debug!("area drag of {} element(s)", captured.len());
                AreaSession::Dragging {
                    box_origin: rect.origin(),
                    rect,
                    captured,
                    anchor: pointer,
                    starts,
                }
            }
            other => other,
        }
    }

    /// Follow the pointer.
    ///
    /// While dragging, returns the batched position patches for the captured elements.
    pub fn pointer_move(&mut self, pointer: Point, grid: &GridSettings) -> Vec<(ElementId, ElementPatch)> {
        match self {
            AreaSession::Selecting { current, .. } => {
                *current = pointer;
                Vec::new()
            }
            AreaSession::Ready { .. } => Vec::new(),
            AreaSession::Dragging {
                rect,
                box_origin,
                anchor,
                starts,
                ..
            } => {
                let delta = pointer - *anchor;
                let delta = if delta.x.is_finite() && delta.y.is_finite() {
                    delta
                } else {
                    Vec2::ZERO
                };
                *rect = Rect::from_origin_size(*box_origin + delta, rect.size());
                starts
                    .iter()
                    .map(|(id, start)| {
                        let moved = *start + delta;
                        let origin = grid.snap_point(Point::new(moved.x.max(0.0), moved.y.max(0.0)));
                        (*id, ElementPatch::position(origin))
                    })
                    .collect()
            }
        }
    }

    /// Finish the current pointer stroke.
    pub fn release(self, document: &CanvasDocument, mode: MarqueeMode, min_size: f64) -> AreaRelease {
        match self {
            AreaSession::Selecting { .. } => {
                let rect = self.rect();
                if rect.width() < min_size || rect.height() < min_size {
                    return AreaRelease::Discarded;
                }
                match mode {
                    MarqueeMode::Instant => {
                        AreaRelease::Selected(document.elements_centered_in(rect))
                    }
                    MarqueeMode::Session => {
                        let captured = document.elements_overlapping(rect);
                        if captured.is_empty() {
                            AreaRelease::Discarded
                        } else {
                            AreaRelease::Ready(AreaSession::Ready { rect, captured })
                        }
                    }
                }
            }
            AreaSession::Dragging { rect, captured, .. } => {
                AreaRelease::Moved(AreaSession::Ready { rect, captured })
            }
            ready @ AreaSession::Ready { .. } => AreaRelease::Ready(ready),
        }
    }
}
