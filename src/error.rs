use thiserror::Error;

/// Failure while turning a file on disk into a [`Dataset`](crate::dataset::Dataset)
#[derive(Debug, Error)]
pub enum LoadError {
    /// The extension does not map to any parser
    #[error("Unsupported file format{}", extension_suffix(.extension))]
    UnsupportedFormat { extension: Option<String> },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

fn extension_suffix(extension: &Option<String>) -> String {
    match extension {
        Some(ext) => format!(": .{}", ext),
        None => String::new(),
    }
}

impl LoadError {
    pub fn is_unsupported(&self) -> bool {
        matches!(self, LoadError::UnsupportedFormat { .. })
    }
}

/// Failure of a single `POST /api/analyze` request
#[cfg(feature = "web")]
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("No file uploaded")]
    MissingFile,

    #[error("Invalid multipart body: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    #[error("Unsupported file format")]
    UnsupportedFormat,

    /// Parsing failed; the message is forwarded to the client
    #[error("{0}")]
    Processing(LoadError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("parser task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[cfg(feature = "web")]
impl From<LoadError> for AnalyzeError {
    fn from(err: LoadError) -> Self {
        match err {
            LoadError::UnsupportedFormat { .. } => AnalyzeError::UnsupportedFormat,
            other => AnalyzeError::Processing(other),
        }
    }
}

#[cfg(feature = "web")]
impl axum::response::IntoResponse for AnalyzeError {
    fn into_response(self) -> axum::response::Response {
        use axum::{Json, http::StatusCode};
        use serde_json::json;

        let (status, body) = match &self {
            AnalyzeError::UnsupportedFormat => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Unsupported file format" }),
            ),
            AnalyzeError::MissingFile => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "No file uploaded" }),
            ),
            AnalyzeError::Multipart(e) => (
                e.status(),
                json!({ "error": "Invalid multipart body", "details": e.body_text() }),
            ),
            AnalyzeError::Processing(_) | AnalyzeError::Io(_) | AnalyzeError::Join(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Error processing file", "details": self.to_string() }),
            ),
        };

        if status.is_server_error() {
            tracing::error!(%status, error = %self, "analyze request failed");
        } else {
            tracing::warn!(%status, error = %self, "analyze request rejected");
        }

        (status, Json(body)).into_response()
    }
}
