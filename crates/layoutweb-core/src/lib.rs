//! LayoutWeb Core Library
//!
//! Platform-agnostic document model and editing logic for the LayoutWeb page designer.

pub mod area;
pub mod canvas;
pub mod clipboard;
pub mod config;
pub mod editor;
pub mod elements;
pub mod history;
pub mod input;
pub mod measure;
pub mod selection;
pub mod snap;
pub mod storage;
pub mod transform;

pub use area::{AreaRelease, AreaSession};
pub use canvas::{Canvas, CanvasDocument, DUPLICATE_OFFSET, MAX_IMAGE_SIZE, fit_image_size};
pub use clipboard::Clipboard;
pub use config::{EditorConfig, MarqueeMode};
pub use editor::{Editor, Interaction};
pub use elements::{
    Element, ElementId, ElementKind, ElementPatch, ElementSnapshot, Fill, FontWeight,
    ImageFormat, ImageSource, SerializableColor, TextAlign, TextBlock,
};
pub use history::History;
pub use input::{Command, Modifiers, MouseButton, PointerEvent, PointerTarget, SHORTCUTS};
pub use measure::{ApproxTextMeasurer, TextMeasurer, fitted_height};
pub use selection::{Handle, HandleKind, ResizeHandle, Selection, get_handles};
pub use snap::{GRID_SIZE, GridSettings, snap_to_grid, snap_value};
pub use storage::{KeyValueStore, MemoryStore, PROJECT_KEY, Project, StorageError, StorageResult};
pub use transform::{DragGesture, Gesture, ResizeGesture, RotateGesture, rotation_angle};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStore;
