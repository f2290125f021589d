use serde::Serialize;

use crate::models::{AttachedTag, MovieId, SuggestionSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Success,
    Danger,
}

/// A transient, user-visible message (toast)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Danger,
            message: message.into(),
        }
    }
}

/// Label for the per-card tag counter
pub fn tag_counter_label(count: usize) -> String {
    if count == 1 {
        "1 tag selected".to_string()
    } else {
        format!("{} tags selected", count)
    }
}

/// Presentation surface refreshed after every cache-affecting operation
///
/// Implementations must treat a movie card that is no longer mounted as a
/// silent no-op, never as an error.
pub trait TagRenderer: Send + Sync {
    /// Replaces the suggestion dropdown; an empty set hides it
    fn render_suggestions(&self, suggestions: &SuggestionSet);

    /// Replaces the tag chips and the counter of one movie card
    fn render_tags(&self, movie_id: MovieId, tags: &[AttachedTag], counter_label: &str);

    fn notify(&self, notification: Notification);
}
