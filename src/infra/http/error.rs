use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use newsdesk_api_types::Envelope;

use crate::application::articles::ArticleError;
use crate::application::error::ErrorReport;

pub mod messages {
    pub const SUCCESS: &str = "Success";
    pub const CREATED: &str = "News created successfully";
    pub const UPDATED: &str = "News updated successfully";
    pub const DELETED: &str = "News deleted successfully";
    pub const INVALID_ID: &str = "Invalid ID";
    pub const INVALID_INPUT: &str = "Invalid input";
    pub const NOT_FOUND: &str = "News not found";
    pub const FETCH_FAILED: &str = "Failed to fetch news";
    pub const CREATE_FAILED: &str = "Failed to create news";
    pub const UPDATE_FAILED: &str = "Failed to update news";
    pub const DELETE_FAILED: &str = "Failed to delete news";
}

/// Error leaving a `/news` handler, rendered as an envelope without data.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
    report: ErrorReport,
}

impl ApiError {
    pub fn new(
        source: &'static str,
        status: StatusCode,
        message: &'static str,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            status,
            message,
            report: ErrorReport::from_message(source, status, detail),
        }
    }

    pub fn invalid_id(detail: impl Into<String>) -> Self {
        Self::new(
            "infra::http::path",
            StatusCode::BAD_REQUEST,
            messages::INVALID_ID,
            detail,
        )
    }

    pub fn invalid_input(detail: impl Into<String>) -> Self {
        Self::new(
            "infra::http::body",
            StatusCode::BAD_REQUEST,
            messages::INVALID_INPUT,
            detail,
        )
    }

    /// Map a coordinator failure; `failure` is the public message for store errors.
    pub fn from_article(err: ArticleError, failure: &'static str) -> Self {
        const SOURCE: &str = "application::articles";
        match err {
            ArticleError::NotFound { .. } => Self::new(
                SOURCE,
                StatusCode::NOT_FOUND,
                messages::NOT_FOUND,
                err.to_string(),
            ),
            ArticleError::Store(ref inner) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: failure,
                report: ErrorReport::from_error(SOURCE, StatusCode::INTERNAL_SERVER_ERROR, inner),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body: Envelope<()> = Envelope::without_data(self.status.as_u16(), self.message);
        let mut response = (self.status, Json(body)).into_response();
        self.report.attach(&mut response);
        response
    }
}
