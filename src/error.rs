/// Client-side errors for tag operations
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("External API error: {0}")]
    ExternalApi(String),

    /// The backend answered `ok: false`
    #[error("Rejected by backend: {0}")]
    Rejected(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the failure happened below the application layer
    /// (transport error or non-success status).
    pub fn is_transport(&self) -> bool {
        matches!(self, AppError::HttpClient(_) | AppError::ExternalApi(_))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_display() {
        let err = AppError::Rejected("Tag name required".to_string());
        assert_eq!(err.to_string(), "Rejected by backend: Tag name required");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_external_api_is_transport() {
        let err = AppError::ExternalApi("status 502".to_string());
        assert!(err.is_transport());
    }
}
