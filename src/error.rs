use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures surfaced by the adapters and the gateway.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Error getting media by id: media type '{0}' does not exist")]
    UnknownMediaType(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    InvalidArgument(String),

    /// The upstream answered with a non-success status.
    #[error("{context}: {status}")]
    Upstream { context: String, status: String },

    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{context}: malformed upstream response: {source}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Caller-facing classification of a [`MediaError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidArgument,
    NotFound,
    Unavailable,
    Internal,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Unavailable => "UNAVAILABLE",
            ErrorCode::Internal => "INTERNAL",
        }
    }

    pub fn http_status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidArgument => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Unavailable => StatusCode::BAD_GATEWAY,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl MediaError {
    pub fn code(&self) -> ErrorCode {
        match self {
            MediaError::UnknownMediaType(_) | MediaError::InvalidArgument(_) => {
                ErrorCode::InvalidArgument
            }
            MediaError::NotFound(_) => ErrorCode::NotFound,
            MediaError::Upstream { .. } | MediaError::Transport { .. } => ErrorCode::Unavailable,
            MediaError::Decode { .. } => ErrorCode::Internal,
        }
    }

    pub(crate) fn upstream(context: impl Into<String>, status: reqwest::StatusCode) -> Self {
        MediaError::Upstream {
            context: context.into(),
            status: status_text(status),
        }
    }

    /// The request URL is stripped from `source`; it can carry the movie API key.
    pub(crate) fn transport(context: impl Into<String>, source: reqwest::Error) -> Self {
        MediaError::Transport {
            context: context.into(),
            source: source.without_url(),
        }
    }

    pub(crate) fn decode(context: impl Into<String>, source: serde_json::Error) -> Self {
        MediaError::Decode {
            context: context.into(),
            source,
        }
    }
}

/// Reason phrase of an HTTP status, falling back to the numeric code.
pub(crate) fn status_text(status: reqwest::StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: &'static str,
    message: String,
}

impl IntoResponse for MediaError {
    fn into_response(self) -> Response {
        let code = self.code();
        match code {
            ErrorCode::InvalidArgument | ErrorCode::NotFound => {
                tracing::warn!(code = code.as_str(), "{}", self)
            }
            ErrorCode::Unavailable | ErrorCode::Internal => {
                tracing::error!(code = code.as_str(), "{}", self)
            }
        }
        let body = ErrorBody {
            code: code.as_str(),
            message: self.to_string(),
        };
        (code.http_status(), Json(body)).into_response()
    }
}
