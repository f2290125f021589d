/// REST client for the movie library backend
///
/// Endpoints used:
/// 1. All tags: `GET /api/tags` (configurable, see `Config::tags_path`)
/// 2. Movie tags: `GET /api/movies/{id}/tags`
/// 3. Attach: `POST /api/movies/{id}/tags` with `{"name": ...}`
/// 4. Detach: `DELETE /api/movies/{id}/tags/{tag_id}`
///
/// No timeouts and no retries; a failed call is reported once to the caller.
use reqwest::{header::COOKIE, Client as HttpClient, RequestBuilder, Response};
use tracing::instrument;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        AddTagRequest, AddTagResponse, AttachedTag, MovieId, MovieTagsResponse, Tag, TagId,
        TagListResponse,
    },
    services::backend::{RequestId, TagBackend, REQUEST_ID_HEADER},
};

#[derive(Clone)]
pub struct HttpTagBackend {
    http_client: HttpClient,
    api_url: String,
    tags_path: String,
    session_cookie: Option<String>,
}

impl HttpTagBackend {
    pub fn new(api_url: impl Into<String>, session_cookie: Option<String>) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            tags_path: "/api/tags".to_string(),
            session_cookie,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_base_url.clone(), config.session_cookie.clone())
            .with_tags_path(config.tags_path.clone())
    }

    /// Points the tag listing at another route, e.g. `/api/tags/predefined`
    pub fn with_tags_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.tags_path = if path.starts_with('/') {
            path
        } else {
            format!("/{}", path)
        };
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// Adds the session cookie and a fresh request ID
    fn prepare(&self, builder: RequestBuilder) -> (RequestBuilder, RequestId) {
        let request_id = RequestId::new();
        let mut builder = builder;

        if let Some(value) = request_id.header_value() {
            builder = builder.header(REQUEST_ID_HEADER, value);
        }
        if let Some(cookie) = &self.session_cookie {
            builder = builder.header(COOKIE, cookie);
        }

        (builder, request_id)
    }

    async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        let (builder, request_id) = self.prepare(builder);

        let response = builder.send().await.map_err(|e| {
            tracing::error!(error = %e, request_id = %request_id, "Backend request failed");
            AppError::from(e)
        })?;

        tracing::debug!(
            request_id = %request_id,
            status = %response.status(),
            url = %response.url(),
            "Backend responded"
        );

        Ok(response)
    }

    /// Turns a non-success response into `AppError::ExternalApi`
    async fn ensure_success(response: Response) -> AppResult<Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(AppError::ExternalApi(format!(
            "Backend returned status {}: {}",
            status, body
        )))
    }
}

#[async_trait::async_trait]
impl TagBackend for HttpTagBackend {
    #[instrument(skip(self))]
    async fn list_all_tags(&self) -> AppResult<Vec<Tag>> {
        let response = self.send(self.http_client.get(self.url(&self.tags_path))).await?;
        let listing: TagListResponse = Self::ensure_success(response).await?.json().await?;

        tracing::info!(tags = listing.tags.len(), "Fetched all tags");

        Ok(listing.tags)
    }

    #[instrument(skip(self))]
    async fn list_movie_tags(&self, movie_id: MovieId) -> AppResult<Vec<AttachedTag>> {
        let url = self.url(&format!("/api/movies/{}/tags", movie_id));
        let response = self.send(self.http_client.get(url)).await?;
        let listing: MovieTagsResponse = Self::ensure_success(response).await?.json().await?;

        tracing::debug!(tags = listing.tags.len(), "Fetched movie tags");

        Ok(listing.tags)
    }

    #[instrument(skip(self))]
    async fn add_tag(&self, movie_id: MovieId, name: &str) -> AppResult<AddTagResponse> {
        let url = self.url(&format!("/api/movies/{}/tags", movie_id));
        let body = AddTagRequest {
            name: name.to_string(),
        };

        let response = self.send(self.http_client.post(url).json(&body)).await?;
        let status = response.status();
        let text = response.text().await?;

        // Rejections (400 "Tag name required", 500 "Database error") still carry
        // an `{ok, error}` body worth showing to the user
        match serde_json::from_str::<AddTagResponse>(&text) {
            Ok(parsed) if status.is_success() || !parsed.ok => Ok(parsed),
            Err(e) if status.is_success() => {
                tracing::warn!(error = %e, status = %status, "Unparseable add-tag response body");
                Ok(AddTagResponse::default())
            }
            _ => Err(AppError::ExternalApi(format!(
                "Backend returned status {}: {}",
                status, text
            ))),
        }
    }

    #[instrument(skip(self))]
    async fn remove_tag(&self, movie_id: MovieId, tag_id: TagId) -> AppResult<()> {
        let url = self.url(&format!("/api/movies/{}/tags/{}", movie_id, tag_id));
        let response = self.send(self.http_client.delete(url)).await?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
