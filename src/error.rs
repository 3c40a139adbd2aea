//! Error handling

use axum::response::IntoResponse;
use tracing::info;

/// definitions for the picstory application.
#[derive(Debug)]
pub enum PicstoryError {
    /// When the form submission wasn't what we expected
    BadRequest,
    /// Missing or invalid CSRF token
    Unauthorized,
    /// When an internal server error occurs
    InternalServerError(String),
}

impl From<std::io::Error> for PicstoryError {
    fn from(err: std::io::Error) -> Self {
        PicstoryError::InternalServerError(err.to_string())
    }
}

impl From<axum::http::Error> for PicstoryError {
    fn from(err: axum::http::Error) -> Self {
        PicstoryError::InternalServerError(err.to_string())
    }
}

impl From<tower_sessions::session::Error> for PicstoryError {
    fn from(err: tower_sessions::session::Error) -> Self {
        PicstoryError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for PicstoryError {
    fn into_response(self) -> axum::response::Response {
        match self {
            PicstoryError::BadRequest => {
                info!("Bad request received");
                let mut response =
                    axum::response::Response::new(axum::body::Body::from("Bad Request"));
                *response.status_mut() = axum::http::StatusCode::BAD_REQUEST;
                response
            }
            PicstoryError::Unauthorized => {
                info!("Unauthorized request received");
                let mut response = axum::response::Response::new(axum::body::Body::from(
                    "Unauthorized: invalid or missing session.",
                ));
                *response.status_mut() = axum::http::StatusCode::UNAUTHORIZED;
                response
            }
            PicstoryError::InternalServerError(message) => {
                tracing::error!("Internal server error: {}", message);
                let mut response =
                    axum::response::Response::new(axum::body::Body::from("Internal server error"));
                *response.status_mut() = axum::http::StatusCode::INTERNAL_SERVER_ERROR;
                response
            }
        }
    }
}
