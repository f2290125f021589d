use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod suggestion;

pub use suggestion::{Suggestion, SuggestionSet};

/// Chip color used when the backend has none on record
pub const DEFAULT_TAG_COLOR: &str = "#e9ecef";

/// Identifier of a movie in the library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub i64);

impl Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagId(pub i64);

impl Display for TagId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tag known to the backend (predefined or user-created)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Predefined tags may be listed before they exist in the database
    #[serde(default)]
    pub id: Option<TagId>,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: None,
        }
    }

    pub fn display_color(&self) -> &str {
        self.color.as_deref().unwrap_or(DEFAULT_TAG_COLOR)
    }
}

/// A tag attached to one movie
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttachedTag {
    pub id: TagId,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub added_by: Option<i64>,
}

// ============================================================================
// Backend wire types
// ============================================================================

/// Response from GET /api/tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TagListResponse {
    #[serde(default)]
    pub tags: Vec<Tag>,
}

/// Response from GET /api/movies/{id}/tags
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieTagsResponse {
    #[serde(default)]
    pub tags: Vec<AttachedTag>,
}

/// Body of POST /api/movies/{id}/tags
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTagRequest {
    pub name: String,
}

/// Response from POST /api/movies/{id}/tags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddTagResponse {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub tag_id: Option<TagId>,
    #[serde(default)]
    pub tag_name: Option<String>,
}

impl AddTagResponse {
    pub fn accepted() -> Self {
        Self {
            ok: true,
            ..Default::default()
        }
    }

    pub fn rejected(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_id_display() {
        assert_eq!(format!("{}", MovieId(42)), "42");
    }

    #[test]
    fn test_movie_id_serde_transparent() {
        let json = serde_json::to_string(&MovieId(7)).unwrap();
        assert_eq!(json, "7");
    }

    #[test]
    fn test_tag_list_deserialization_predefined() {
        let json = r##"{
            "tags": [
                {"name": "Classic", "color": "#fff2cc"},
                {"id": 3, "name": "Obscure"}
            ]
        }"##;

        let response: TagListResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.tags.len(), 2);
        assert_eq!(response.tags[0].id, None);
        assert_eq!(response.tags[0].display_color(), "#fff2cc");
        assert_eq!(response.tags[1].id, Some(TagId(3)));
        assert_eq!(response.tags[1].display_color(), DEFAULT_TAG_COLOR);
    }

    #[test]
    fn test_movie_tags_missing_array_is_empty() {
        let response: MovieTagsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.tags.is_empty());
    }

    #[test]
    fn test_attached_tag_deserialization() {
        let json = r##"{"id": 12, "name": "Drama", "color": "#f3e8ff", "added_by": 4}"##;

        let tag: AttachedTag = serde_json::from_str(json).unwrap();
        assert_eq!(tag.id, TagId(12));
        assert_eq!(tag.name, "Drama");
        assert_eq!(tag.added_by, Some(4));
    }

    #[test]
    fn test_add_tag_response_rejection() {
        let json = r#"{"ok": false, "error": "Tag name required"}"#;

        let response: AddTagResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response, AddTagResponse::rejected("Tag name required"));
    }

    #[test]
    fn test_add_tag_response_already_attached() {
        let json = r#"{"ok": true, "message": "Tag already exists for this movie"}"#;

        let response: AddTagResponse = serde_json::from_str(json).unwrap();
        assert!(response.ok);
        assert_eq!(
            response.message.as_deref(),
            Some("Tag already exists for this movie")
        );
    }
}
