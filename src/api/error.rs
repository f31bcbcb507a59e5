use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use super::models::ErrorResponse;
use crate::artifacts::ArtifactError;
use crate::evalscript::IndexError;
use crate::geometry::GeometryError;
use crate::provider::ProviderError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("{0}")]
    UnsupportedIndex(String),
    #[error("provider authentication failed: {0}")]
    ProviderAuth(String),
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),
    #[error("provider timed out")]
    ProviderTimeout,
    #[error("provider quota exceeded: {0}")]
    ProviderQuota(String),
    #[error("provider rejected request: {0}")]
    ProviderRejected(String),
    #[error("provider failure: {0}")]
    ProviderFailure(String),
    #[error("artifact error: {0}")]
    Artifact(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidGeometry(_) => StatusCode::BAD_REQUEST,
            ApiError::UnsupportedIndex(_) => StatusCode::BAD_REQUEST,
            ApiError::ProviderAuth(_) => StatusCode::BAD_GATEWAY,
            ApiError::ProviderUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ProviderTimeout => StatusCode::GATEWAY_TIMEOUT,
            ApiError::ProviderQuota(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ProviderRejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::ProviderFailure(_) => StatusCode::BAD_GATEWAY,
            ApiError::Artifact(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidGeometry(_) => "INVALID_GEOMETRY",
            ApiError::UnsupportedIndex(_) => "UNSUPPORTED_INDEX",
            ApiError::ProviderAuth(_) => "PROVIDER_AUTH",
            ApiError::ProviderUnavailable(_) => "PROVIDER_UNAVAILABLE",
            ApiError::ProviderTimeout => "PROVIDER_TIMEOUT",
            ApiError::ProviderQuota(_) => "PROVIDER_QUOTA",
            ApiError::ProviderRejected(_) => "PROVIDER_REJECTED",
            ApiError::ProviderFailure(_) => "PROVIDER_FAILURE",
            ApiError::Artifact(_) => "ARTIFACT_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(code = self.code(), error = %self, "Request failed");
        } else {
            tracing::warn!(code = self.code(), error = %self, "Request rejected");
        }

        let body = ErrorResponse {
            code: self.code(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<GeometryError> for ApiError {
    fn from(value: GeometryError) -> Self {
        ApiError::InvalidGeometry(value.to_string())
    }
}

impl From<IndexError> for ApiError {
    fn from(value: IndexError) -> Self {
        ApiError::UnsupportedIndex(value.to_string())
    }
}

impl From<ProviderError> for ApiError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::Auth(msg) => ApiError::ProviderAuth(msg),
            ProviderError::Network(msg) => ApiError::ProviderUnavailable(msg),
            ProviderError::Unavailable { status, message } => {
                ApiError::ProviderUnavailable(format!("HTTP {}: {}", status, message))
            }
            ProviderError::Timeout => ApiError::ProviderTimeout,
            ProviderError::Quota(msg) => ApiError::ProviderQuota(msg),
            ProviderError::Rejected { status, message } => {
                ApiError::ProviderRejected(format!("HTTP {}: {}", status, message))
            }
            err @ (ProviderError::EmptyResult(_) | ProviderError::Malformed(_)) => {
                ApiError::ProviderFailure(err.to_string())
            }
        }
    }
}

impl From<ArtifactError> for ApiError {
    fn from(value: ArtifactError) -> Self {
        ApiError::Artifact(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_errors_are_client_errors() {
        let err: ApiError = IndexError::Unknown("evi".into()).into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.code(), "UNSUPPORTED_INDEX");
        assert!(err.to_string().contains("evi"));

        let err: ApiError = GeometryError::EmptyPolygon.into();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_error_mapping() {
        let cases = [
            (ProviderError::Auth("expired".into()), StatusCode::BAD_GATEWAY),
            (ProviderError::Network("refused".into()), StatusCode::SERVICE_UNAVAILABLE),
            (ProviderError::Timeout, StatusCode::GATEWAY_TIMEOUT),
            (ProviderError::Quota("limit".into()), StatusCode::TOO_MANY_REQUESTS),
            (
                ProviderError::Rejected {
                    status: 400,
                    message: "bad bbox".into(),
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (ProviderError::EmptyResult("none".into()), StatusCode::BAD_GATEWAY),
            (ProviderError::Malformed("json".into()), StatusCode::BAD_GATEWAY),
        ];

        for (provider_err, expected) in cases {
            let err: ApiError = provider_err.into();
            assert_eq!(err.status_code(), expected, "{}", err);
        }
    }

    #[test]
    fn test_artifact_error_is_server_error() {
        let err: ApiError = ArtifactError::Missing("ndvi/x/response.png".into()).into();
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "ARTIFACT_ERROR");
    }
}
