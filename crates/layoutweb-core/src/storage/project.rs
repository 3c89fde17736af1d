//! Saved project format.

use super::{KeyValueStore, StorageError, StorageResult};
use crate::canvas::{Canvas, CanvasDocument};
use crate::elements::{Element, ElementId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Key the editor saves its single project under.
pub const PROJECT_KEY: &str = "layout-web-project";

/// A saved canvas: elements in z-order, the id counter and the save time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub elements: Vec<Element>,
    pub id_counter: ElementId,
    pub timestamp: DateTime<Utc>,
}

impl Project {
    /// Snapshot `document`, stamped with the current time.
    pub fn from_document(document: &CanvasDocument) -> Self {
        Self {
            elements: document.elements().to_vec(),
            id_counter: document.next_id(),
            timestamp: Utc::now(),
        }
    }

    pub fn into_document(self) -> CanvasDocument {
        CanvasDocument::from_parts(self.elements, self.id_counter)
    }

    pub fn to_json(&self) -> StorageResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    pub fn from_json(json: &str) -> StorageResult<Self> {
        serde_json::from_str(json).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}

/// Save the canvas document under [`PROJECT_KEY`].
pub async fn save_project(store: &dyn KeyValueStore, canvas: &Canvas) -> StorageResult<Project> {
    let project = Project::from_document(&canvas.document);
    store.set(PROJECT_KEY, project.to_json()?).await?;
    log::info!("saved project with {} element(s)", project.elements.len());
    Ok(project)
}

/// Replace the canvas document with the saved project.
///
/// Clears the selection and records a history entry. A missing project is
/// reported as [`StorageError::NotFound`] and leaves the canvas untouched.
pub async fn load_project(store: &dyn KeyValueStore, canvas: &mut Canvas) -> StorageResult<usize> {
    let json = store.get(PROJECT_KEY).await?;
    let project = Project::from_json(&json)?;
    let count = project.elements.len();
    canvas.load(project.into_document());
    log::info!("loaded project with {} element(s)", count);
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementKind, ElementPatch};
    use crate::storage::MemoryStore;
    use kurbo::Point;
    use pollster::block_on;

    #[test]
    fn test_save_load_round_trip() {
        let store = MemoryStore::new();
        let mut canvas = Canvas::new();
        let a = canvas.create(ElementKind::Star, Some(Point::new(10.0, 20.0)));
        let b = canvas.create(ElementKind::Text, Some(Point::new(30.0, 40.0)));
        canvas.update(
            &[b],
            &ElementPatch {
                rotation: Some(-45),
                content: Some("Title".into()),
                ..ElementPatch::default()
            },
            true,
        );
        canvas.select_all();
        canvas.bring_to_front();
        block_on(save_project(&store, &canvas)).unwrap();

        let mut restored = Canvas::new();
        assert_eq!(block_on(load_project(&store, &mut restored)).unwrap(), 2);
        assert_eq!(restored.elements(), canvas.elements());
        assert_eq!(restored.document.next_id(), 3);
        assert!(restored.selection.is_empty());
        assert!(restored.can_undo());

        let c = restored.create(ElementKind::Circle, None);
        assert!(c > a && c > b);
    }

    #[test]
    fn test_load_missing_project() {
        let store = MemoryStore::new();
        let mut canvas = Canvas::new();
        canvas.create(ElementKind::Rectangle, None);

        let result = block_on(load_project(&store, &mut canvas));
        assert!(matches!(result, Err(StorageError::NotFound(key)) if key == PROJECT_KEY));
        assert_eq!(canvas.elements().len(), 1);
    }

    #[test]
    fn test_project_json_shape() {
        let json = r#"{
            "elements": [
                {"id": 4, "type": "rectangle", "x": 1, "y": 2, "width": 30, "height": 40}
            ],
            "idCounter": 2,
            "timestamp": "2024-05-01T12:00:00.000Z"
        }"#;
        let project = Project::from_json(json).unwrap();
        assert_eq!(project.id_counter, 2);
        let document = project.into_document();
        // Counter never falls behind the ids in use
        assert_eq!(document.next_id(), 5);
        assert_eq!(document.elements()[0].width, 30.0);

        assert!(matches!(Project::from_json("{"), Err(StorageError::Serialization(_))));
    }
}
