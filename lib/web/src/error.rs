use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rdf_transform::TransformError;
use tracing::{error, warn};

#[derive(thiserror::Error, Debug)]
pub enum TransformServerError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("Content Negotiation Failed: {0}")]
    ContentNegotiation(String),
    #[error("Method not allowed: {0}")]
    MethodNotAllowed(String),
    #[error("Internal server error: {0}")]
    Internal(anyhow::Error),
}

impl From<TransformError> for TransformServerError {
    fn from(error: TransformError) -> Self {
        match error {
            TransformError::TransformNotFound { .. } => Self::NotFound(error.to_string()),
            TransformError::UnsupportedTransformKind { .. } => {
                Self::UnsupportedMediaType(error.to_string())
            }
            error if error.is_client_error() => Self::BadRequest(error.to_string()),
            error => Self::Internal(error.into()),
        }
    }
}

impl IntoResponse for TransformServerError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            TransformServerError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            TransformServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            TransformServerError::UnsupportedMediaType(msg) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg)
            }
            TransformServerError::ContentNegotiation(msg) => (StatusCode::NOT_ACCEPTABLE, msg),
            TransformServerError::MethodNotAllowed(msg) => (StatusCode::METHOD_NOT_ALLOWED, msg),
            TransformServerError::Internal(e) => {
                error!(error = format!("{e:#}"), "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
        };
        if status.is_client_error() {
            warn!(%status, message = message.as_str(), "Rejected request");
        }

        (status, message).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdf_transform::{EvaluationCause, StoreError};
    use rdf_transform_model::{ProgramKey, ResourcePath};
    use rdf_transform_sparql::QueryEvaluationError;

    fn status(error: TransformError) -> StatusCode {
        TransformServerError::from(error).into_response().status()
    }

    #[test]
    fn test_transform_errors_to_status() {
        assert_eq!(
            status(TransformError::TransformNotFound {
                resource_path: ResourcePath::new("/a"),
                key: ProgramKey::new("default").unwrap(),
            }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status(TransformError::UnsupportedTransformKind {
                declared: "text/plain".to_owned()
            }),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            status(TransformError::EvaluationFailed {
                cause: EvaluationCause::StructuredQuery(QueryEvaluationError::NotImplemented(
                    "GRAPH".to_owned()
                ))
            }),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status(StoreError::Unavailable("poisoned".to_owned()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
