//! Pointer and keyboard input vocabulary of the editor.

use crate::elements::ElementId;
use crate::selection::HandleKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// What lies under the pointer, as resolved by hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// A handle of a selected element.
    Handle(ElementId, HandleKind),
    /// The box of a ready area session.
    AreaBox,
    /// The body of an element.
    Element(ElementId),
    /// Empty canvas.
    Canvas,
}

impl PointerTarget {
    pub fn element(&self) -> Option<ElementId> {
        match self {
            PointerTarget::Handle(id, _) | PointerTarget::Element(id) => Some(*id),
            PointerTarget::AreaBox | PointerTarget::Canvas => None,
        }
    }
}

/// Pointer event in surface coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
    },
    Up {
        position: Point,
    },
    /// Pointer left the surface; ends any gesture like a release.
    Leave,
    DoubleClick {
        position: Point,
    },
}

/// Editor command bound to a keyboard shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Undo,
    Redo,
    Copy,
    Paste,
    Duplicate,
    Delete,
    SelectAll,
    Deselect,
    Save,
    Load,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone, Copy)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub shift: bool,
    pub command: Command,
    pub description: &'static str,
}

impl Shortcut {
    const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        command: Command,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            command,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+S").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl");
        }
        if self.shift {
            parts.push("Shift");
        }
        parts.push(self.key);
        parts.join("+")
    }
}

/// All keyboard shortcuts, most specific first.
pub const SHORTCUTS: &[Shortcut] = &[
    Shortcut::new("Z", true, true, Command::Redo, "Redo"),
    Shortcut::new("Z", true, false, Command::Undo, "Undo"),
    Shortcut::new("Y", true, false, Command::Redo, "Redo"),
    Shortcut::new("C", true, false, Command::Copy, "Copy elements"),
    Shortcut::new("V", true, false, Command::Paste, "Paste elements"),
    Shortcut::new("D", true, false, Command::Duplicate, "Duplicate elements"),
    Shortcut::new("A", true, false, Command::SelectAll, "Select all elements"),
    Shortcut::new("S", true, false, Command::Save, "Save project"),
    Shortcut::new("O", true, false, Command::Load, "Load project"),
    Shortcut::new("Delete", false, false, Command::Delete, "Delete selected elements"),
    Shortcut::new("Backspace", false, false, Command::Delete, "Delete selected elements"),
    Shortcut::new("Escape", false, false, Command::Deselect, "Clear selection"),
];

impl Command {
    /// Resolve a key press. Letter keys are matched case-insensitively.
    pub fn from_key(key: &str, modifiers: Modifiers) -> Option<Command> {
        SHORTCUTS
            .iter()
            .find(|shortcut| {
                shortcut.key.eq_ignore_ascii_case(key)
                    && shortcut.ctrl == modifiers.command()
                    && (!shortcut.ctrl || shortcut.shift == modifiers.shift)
            })
            .map(|shortcut| shortcut.command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_keys() {
        assert_eq!(Command::from_key("z", Modifiers::CTRL), Some(Command::Undo));
        let ctrl_shift = Modifiers {
            shift: true,
            ..Modifiers::CTRL
        };
        assert_eq!(Command::from_key("Z", ctrl_shift), Some(Command::Redo));
        assert_eq!(Command::from_key("y", Modifiers::CTRL), Some(Command::Redo));
    }

    #[test]
    fn test_plain_keys() {
        assert_eq!(Command::from_key("Backspace", Modifiers::NONE), Some(Command::Delete));
        assert_eq!(Command::from_key("Escape", Modifiers::SHIFT), Some(Command::Deselect));
        assert_eq!(Command::from_key("z", Modifiers::NONE), None);
    }

    #[test]
    fn test_meta_acts_as_ctrl() {
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert_eq!(Command::from_key("s", meta), Some(Command::Save));
    }

    #[test]
    fn test_shortcut_format() {
        assert_eq!(SHORTCUTS[0].format(), "Ctrl+Shift+Z");
        assert_eq!(PointerTarget::Element(4).element(), Some(4));
        assert_eq!(PointerTarget::AreaBox.element(), None);
    }
}
