use std::collections::HashSet;
use std::io::Write;
use std::sync::{Arc, Mutex};

use super::render::{Notification, NotificationLevel, TagRenderer};
use crate::models::{AttachedTag, MovieId, Suggestion, SuggestionSet};

fn suggestion_line(position: usize, item: &Suggestion) -> String {
    match item.color() {
        Some(color) => format!("  {}. {} ({})", position, item.label(), color),
        None => format!("  {}. {}", position, item.label()),
    }
}

/// Terminal renderer used by the `movie-tags` binary
///
/// Only movies that were mounted receive output; everything else is dropped
/// the same way a removed card would be.
#[derive(Clone, Default)]
pub struct ConsoleRenderer {
    mounted: Arc<Mutex<HashSet<MovieId>>>,
}

impl ConsoleRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mount(&self, movie_id: MovieId) {
        if let Ok(mut mounted) = self.mounted.lock() {
            mounted.insert(movie_id);
        }
    }

    pub fn unmount(&self, movie_id: MovieId) {
        if let Ok(mut mounted) = self.mounted.lock() {
            mounted.remove(&movie_id);
        }
    }

    fn is_mounted(&self, movie_id: MovieId) -> bool {
        self.mounted
            .lock()
            .map(|mounted| mounted.contains(&movie_id))
            .unwrap_or(false)
    }

    fn print(&self, text: &str) {
        let mut stdout = std::io::stdout().lock();
        let _ = writeln!(stdout, "{}", text);
    }
}

impl TagRenderer for ConsoleRenderer {
    fn render_suggestions(&self, suggestions: &SuggestionSet) {
        if !self.is_mounted(suggestions.movie_id) {
            return;
        }
        if suggestions.is_empty() {
            self.print("  (no suggestions)");
            return;
        }
        for (i, item) in suggestions.items.iter().enumerate() {
            self.print(&suggestion_line(i + 1, item));
        }
    }

    fn render_tags(&self, movie_id: MovieId, tags: &[AttachedTag], counter_label: &str) {
        if !self.is_mounted(movie_id) {
            return;
        }
        let chips: Vec<String> = tags
            .iter()
            .map(|t| format!("[{} #{}]", t.name, t.id))
            .collect();
        self.print(&format!("movie {}: {} ({})", movie_id, chips.join(" "), counter_label));
    }

    fn notify(&self, notification: Notification) {
        let prefix = match notification.level {
            NotificationLevel::Success => "ok",
            NotificationLevel::Danger => "error",
        };
        self.print(&format!("{}: {}", prefix, notification.message));
    }
}
