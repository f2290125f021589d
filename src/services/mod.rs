pub mod backend;
pub mod debounce;
pub mod similarity;
pub mod suggestions;

pub use backend::{HttpTagBackend, TagBackend};
pub use debounce::{Debouncer, SUGGESTION_DEBOUNCE};
pub use similarity::{are_tags_similar, edit_distance};
pub use suggestions::{rank_suggestions, TagSuggestionEngine};
