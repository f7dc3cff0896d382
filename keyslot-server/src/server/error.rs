use crate::cluster::ClusterError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

impl ClusterError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::EmptyInput(_) | Self::InvalidConfiguration(_) | Self::InvalidSlot(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

/// Implement IntoResponse for Axum integration
impl IntoResponse for ClusterError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
