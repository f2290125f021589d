//! Client-side tag suggestions for the movie library.
//!
//! [`TagSuggestionEngine`] talks to the library backend through a
//! [`TagBackend`], keeps the tag caches for one session and pushes results to
//! a [`api::TagRenderer`].

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use error::{AppError, AppResult};
pub use services::{HttpTagBackend, TagBackend, TagSuggestionEngine};
