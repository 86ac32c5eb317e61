mod articles;
mod error;
mod middleware;

pub use error::{ApiError, messages};
pub use middleware::RequestContext;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Router, middleware as axum_middleware};
use sqlx::Error as SqlxError;

use crate::application::articles::ArticleService;
use crate::application::error::ErrorReport;
use crate::infra::db::PostgresRepositories;

#[derive(Clone)]
pub struct HttpState {
    pub articles: Arc<ArticleService>,
}

impl HttpState {
    pub fn new(articles: ArticleService) -> Self {
        Self {
            articles: Arc::new(articles),
        }
    }
}

/// Routes for the `/news` resource.
pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route(
            "/news",
            get(articles::list_news).post(articles::create_news),
        )
        .route(
            "/news/{id}",
            get(articles::get_news)
                .put(articles::update_news)
                .delete(articles::delete_news),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

/// Liveness of the relational store, served outside the envelope.
pub fn build_health_router(repositories: Arc<PostgresRepositories>) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(repositories)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn(middleware::set_request_context))
}

async fn health(State(repositories): State<Arc<PostgresRepositories>>) -> Response {
    db_health_response(repositories.health_check().await)
}

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
