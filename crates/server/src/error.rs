//! Mapping of failures to HTTP responses.
use inkpost_domain::Error as DomainError;
use inkpost_notify::MailError;
use salvo::http::ParseError;
use salvo::prelude::*;
use serde_json::json;
use thiserror::Error;

/// Body of a 401 response.
pub const NOT_AUTHENTICATED: &str = "Authentication credentials were not provided.";
/// Body of a 403 response.
pub const PERMISSION_DENIED: &str = "You do not have permission to perform this action.";

/// Error returned by the HTTP handlers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ApiError {
    /// Failure raised by the domain layer.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// The request is malformed; rendered as `{"error": ...}`.
    #[error("{0}")]
    BadRequest(String),
    /// The request body could not be parsed.
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// The mail sender failed.
    #[error(transparent)]
    Mail(#[from] MailError),
    /// Anything else that should never reach a client in detail.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    /// Create a `BadRequest` error.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// Create an `Internal` error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Status code and JSON body for this error.
    pub fn to_parts(&self) -> (StatusCode, serde_json::Value) {
        match self {
            Self::Domain(DomainError::Validation(errors)) => (StatusCode::BAD_REQUEST, json!(errors)),
            Self::Domain(DomainError::NotFound(message)) => {
                (StatusCode::NOT_FOUND, json!({ "message": message }))
            }
            Self::Domain(DomainError::Unauthorized) => {
                (StatusCode::UNAUTHORIZED, json!({ "detail": NOT_AUTHENTICATED }))
            }
            Self::Domain(DomainError::Forbidden) => (StatusCode::FORBIDDEN, json!({ "detail": PERMISSION_DENIED })),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, json!({ "error": message })),
            Self::Parse(e) => (StatusCode::BAD_REQUEST, json!({ "detail": format!("JSON parse error - {e}") })),
            Self::Domain(_) | Self::Mail(_) | Self::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "detail": "Internal server error" }),
            ),
        }
    }
}

#[async_trait]
impl Writer for ApiError {
    async fn write(self, _req: &mut Request, _depot: &mut Depot, res: &mut Response) {
        let (status, body) = self.to_parts();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "request rejected");
        }
        res.status_code(status);
        res.render(Json(body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_and_body() {
        let (status, body) = ApiError::from(DomainError::invalid("comment", "This field may not be blank.")).to_parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"comment": ["This field may not be blank."]}));

        let (status, body) = ApiError::from(DomainError::not_found("Comment does not exist")).to_parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({"message": "Comment does not exist"}));

        let (status, body) = ApiError::from(DomainError::Unauthorized).to_parts();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["detail"], NOT_AUTHENTICATED);

        let (status, _) = ApiError::from(DomainError::Forbidden).to_parts();
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = ApiError::bad_request("Title is required.").to_parts();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({"error": "Title is required."}));

        let (status, body) = ApiError::from(DomainError::Store("disk on fire".into())).to_parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"detail": "Internal server error"}));
    }
}
