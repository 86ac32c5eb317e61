use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use newsdesk_api_types::{Envelope, NewsRequest};

use crate::domain::articles::{ArticleDraft, parse_article_id};
use crate::domain::entities::ArticleRecord;

use super::HttpState;
use super::error::{ApiError, messages};

type Reply<T> = Result<(StatusCode, Json<Envelope<T>>), ApiError>;

fn ok<T>(status: StatusCode, message: &str, data: T) -> (StatusCode, Json<Envelope<T>>) {
    (status, Json(Envelope::with_data(status.as_u16(), message, data)))
}

fn article_id(raw: &str) -> Result<i64, ApiError> {
    parse_article_id(raw).map_err(|err| ApiError::invalid_id(err.to_string()))
}

fn draft(body: Result<Json<NewsRequest>, JsonRejection>) -> Result<ArticleDraft, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::invalid_input(rejection.body_text()))?;
    ArticleDraft::new(request.title, request.content)
        .map_err(|err| ApiError::invalid_input(err.to_string()))
}

pub(super) async fn list_news(State(state): State<HttpState>) -> Reply<Vec<ArticleRecord>> {
    let articles = state
        .articles
        .list()
        .await
        .map_err(|err| ApiError::from_article(err, messages::FETCH_FAILED))?;
    Ok(ok(StatusCode::OK, messages::SUCCESS, articles))
}

pub(super) async fn get_news(
    State(state): State<HttpState>,
    Path(raw): Path<String>,
) -> Reply<ArticleRecord> {
    let id = article_id(&raw)?;
    let article = state
        .articles
        .get(id)
        .await
        .map_err(|err| ApiError::from_article(err, messages::FETCH_FAILED))?;
    Ok(ok(StatusCode::OK, messages::SUCCESS, article))
}

pub(super) async fn create_news(
    State(state): State<HttpState>,
    body: Result<Json<NewsRequest>, JsonRejection>,
) -> Reply<ArticleRecord> {
    let draft = draft(body)?;
    let article = state
        .articles
        .create(draft)
        .await
        .map_err(|err| ApiError::from_article(err, messages::CREATE_FAILED))?;
    Ok(ok(StatusCode::CREATED, messages::CREATED, article))
}

pub(super) async fn update_news(
    State(state): State<HttpState>,
    Path(raw): Path<String>,
    body: Result<Json<NewsRequest>, JsonRejection>,
) -> Reply<ArticleRecord> {
    let id = article_id(&raw)?;
    let draft = draft(body)?;
    let article = state
        .articles
        .update(id, draft)
        .await
        .map_err(|err| ApiError::from_article(err, messages::UPDATE_FAILED))?;
    Ok(ok(StatusCode::OK, messages::UPDATED, article))
}

pub(super) async fn delete_news(
    State(state): State<HttpState>,
    Path(raw): Path<String>,
) -> Result<(StatusCode, Json<Envelope<()>>), ApiError> {
    let id = article_id(&raw)?;
    state
        .articles
        .delete(id)
        .await
        .map_err(|err| ApiError::from_article(err, messages::DELETE_FAILED))?;
    Ok((
        StatusCode::OK,
        Json(Envelope::without_data(StatusCode::OK.as_u16(), messages::DELETED)),
    ))
}
