/// Movie library backend abstraction
///
/// The tag engine only depends on this trait, so the REST client can be swapped
/// for a fake in tests or for another transport.
use crate::{
    error::AppResult,
    models::{AddTagResponse, AttachedTag, MovieId, Tag, TagId},
};

pub mod http;
pub mod request_id;

pub use http::HttpTagBackend;
pub use request_id::{RequestId, REQUEST_ID_HEADER};

/// Tag endpoints of the movie library backend
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TagBackend: Send + Sync {
    /// Every tag the backend knows about, predefined and user-created
    async fn list_all_tags(&self) -> AppResult<Vec<Tag>>;

    /// Tags currently attached to one movie, in backend order
    async fn list_movie_tags(&self, movie_id: MovieId) -> AppResult<Vec<AttachedTag>>;

    /// Creates the tag if needed and attaches it to the movie
    ///
    /// Application-level rejections come back as `Ok` with `ok: false`;
    /// only transport and unexpected status failures are `Err`.
    async fn add_tag(&self, movie_id: MovieId, name: &str) -> AppResult<AddTagResponse>;

    /// Detaches a tag from the movie
    async fn remove_tag(&self, movie_id: MovieId, tag_id: TagId) -> AppResult<()>;

    /// Backend name for logging and debugging
    fn name(&self) -> &'static str;
}
