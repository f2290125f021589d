use serde::Serialize;

use super::{MovieId, Tag};

/// One row of the suggestion dropdown
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Suggestion {
    /// Known tag whose name contains the query
    Existing(Tag),
    /// Known tag that looks like a near-duplicate of the query
    Similar(Tag),
    /// Offer to create the query as a new tag
    CreateNew { name: String },
}

impl Suggestion {
    /// Name submitted to `add_tag` when the row is picked
    pub fn tag_name(&self) -> &str {
        match self {
            Suggestion::Existing(tag) | Suggestion::Similar(tag) => &tag.name,
            Suggestion::CreateNew { name } => name,
        }
    }

    /// Text shown in the dropdown
    pub fn label(&self) -> String {
        match self {
            Suggestion::Existing(tag) => tag.name.clone(),
            Suggestion::Similar(tag) => format!("{} (similar)", tag.name),
            Suggestion::CreateNew { name } => format!("Add \"{}\"", name),
        }
    }

    /// Row colour; `None` for the create row, which has no tag yet
    pub fn color(&self) -> Option<&str> {
        match self {
            Suggestion::Existing(tag) | Suggestion::Similar(tag) => Some(tag.display_color()),
            Suggestion::CreateNew { .. } => None,
        }
    }

    pub fn is_similar(&self) -> bool {
        matches!(self, Suggestion::Similar(_))
    }
}

/// Ranked suggestions for one movie card; empty means the dropdown is hidden
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionSet {
    pub movie_id: MovieId,
    pub query: String,
    pub items: Vec<Suggestion>,
}

impl SuggestionSet {
    pub fn empty(movie_id: MovieId, query: impl Into<String>) -> Self {
        Self {
            movie_id,
            query: query.into(),
            items: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(Suggestion::tag_name).collect()
    }
}
