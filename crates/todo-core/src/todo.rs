use serde::{Deserialize, Serialize};

use crate::ids::TodoId;
use crate::pagination::PageWindow;

/// A single task, as stored and as returned on the wire.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    #[serde(rename = "uuid")]
    pub id: TodoId,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub created_at: String,
}

/// Body of `POST /api/v1/tasks`.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoCreate {
    pub title: String,
    pub description: String,
}

/// Body of `PATCH /api/v1/tasks/{uuid}`. Absent fields are left untouched.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

/// Response body of the filtered listing endpoint.
#[derive(Clone, Debug, Serialize)]
pub struct TodoPage {
    pub todos: Vec<Todo>,
    pub metadata: PageWindow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn todo_serializes_with_wire_names() {
        let todo = Todo {
            id: TodoId::from_raw("todo_0191f2f8-0000-7000-8000-000000000000"),
            title: "title".into(),
            description: "description".into(),
            completed: false,
            created_at: "2023-01-01T00:00:00+00:00".into(),
        };
        let json = serde_json::to_value(&todo).unwrap();
        assert_eq!(json["uuid"], "todo_0191f2f8-0000-7000-8000-000000000000");
        assert_eq!(json["createdAt"], "2023-01-01T00:00:00+00:00");
        assert!(json.get("id").is_none());
    }

    #[test]
    fn patch_deserializes_partial_bodies() {
        let patch: TodoPatch = serde_json::from_str(r#"{"completed": true}"#).unwrap();
        assert_eq!(patch.completed, Some(true));
        assert!(patch.title.is_none());
        assert!(!patch.is_empty());
    }

    #[test]
    fn empty_patch_detected() {
        let patch: TodoPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }
}
