//! Message CRUD endpoints.
//!
//! Each handler is one service call; absence becomes 404 here, validation
//! failures become 400 through [`ServerError`].

use std::sync::Arc;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use missive_core::MessageView;
use utoipa::OpenApi;

use crate::error::ServerError;
use crate::schemas::message::{ErrorBody, MessageBody, SearchQuery};
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        list_messages,
        get_message,
        random_message,
        latest_message,
        create_message,
        update_message,
        delete_message,
        search_messages
    ),
    components(schemas(MessageView, MessageBody, ErrorBody))
)]
pub struct MessagesApi;

/// Register message routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/messages",        get(list_messages).post(create_message))
        .route("/messages/search", get(search_messages))
        .route(
            "/messages/{id}",
            get(get_message).put(update_message).delete(delete_message),
        )
        // `POST /message` is kept as a shorthand for `POST /messages`.
        .route("/message",         get(random_message).post(create_message))
        .route("/message/latest",  get(latest_message))
}

fn not_found(id: i64) -> ServerError {
    ServerError::NotFound(format!("message {id} not found"))
}

fn content_of(payload: Result<Json<MessageBody>, JsonRejection>) -> Result<String, ServerError> {
    let Json(body) = payload?;
    body.content
        .ok_or_else(|| ServerError::BadRequest("content is required".to_owned()))
}

#[utoipa::path(
    get,
    path = "/messages",
    tag = "messages",
    responses(
        (status = 200, description = "All messages (possibly empty)", body = Vec<MessageView>),
        (status = 500, description = "Store error", body = ErrorBody),
    )
)]
pub async fn list_messages(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<MessageView>>, ServerError> {
    Ok(Json(state.messages.list_all().await?))
}

#[utoipa::path(
    get,
    path = "/messages/{id}",
    tag = "messages",
    params(("id" = i64, Path, description = "Message id")),
    responses(
        (status = 200, description = "The message", body = MessageView),
        (status = 400, description = "Id is not an integer", body = ErrorBody),
        (status = 404, description = "No message with this id", body = ErrorBody),
    )
)]
pub async fn get_message(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageView>, ServerError> {
    let Path(id) = path?;
    state
        .messages
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

#[utoipa::path(
    get,
    path = "/message",
    tag = "messages",
    responses(
        (status = 200, description = "A uniformly random message", body = MessageView),
        (status = 404, description = "No messages stored", body = ErrorBody),
    )
)]
pub async fn random_message(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageView>, ServerError> {
    state
        .messages
        .get_random()
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound("no messages stored".to_owned()))
}

#[utoipa::path(
    get,
    path = "/message/latest",
    tag = "messages",
    responses(
        (status = 200, description = "The most recently created message", body = MessageView),
        (status = 404, description = "No messages stored", body = ErrorBody),
    )
)]
pub async fn latest_message(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageView>, ServerError> {
    state
        .messages
        .get_latest()
        .await?
        .map(Json)
        .ok_or_else(|| ServerError::NotFound("no messages stored".to_owned()))
}

#[utoipa::path(
    post,
    path = "/messages",
    tag = "messages",
    request_body = MessageBody,
    responses(
        (status = 200, description = "Message created", body = MessageView),
        (status = 400, description = "Content missing or blank", body = ErrorBody),
    )
)]
pub async fn create_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<MessageBody>, JsonRejection>,
) -> Result<Json<MessageView>, ServerError> {
    let content = content_of(payload)?;
    Ok(Json(state.messages.create(&content).await?))
}

#[utoipa::path(
    put,
    path = "/messages/{id}",
    tag = "messages",
    params(("id" = i64, Path, description = "Message id")),
    request_body = MessageBody,
    responses(
        (status = 200, description = "Message updated", body = MessageView),
        (status = 400, description = "Content missing or blank, or id is not an integer", body = ErrorBody),
        (status = 404, description = "No message with this id", body = ErrorBody),
    )
)]
pub async fn update_message(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<MessageBody>, JsonRejection>,
) -> Result<Json<MessageView>, ServerError> {
    let Path(id) = path?;
    let content = content_of(payload)?;
    state
        .messages
        .update(id, &content)
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

#[utoipa::path(
    delete,
    path = "/messages/{id}",
    tag = "messages",
    params(("id" = i64, Path, description = "Message id")),
    responses(
        (status = 204, description = "Message deleted"),
        (status = 400, description = "Id is not an integer", body = ErrorBody),
        (status = 404, description = "No message with this id", body = ErrorBody),
    )
)]
pub async fn delete_message(
    State(state): State<Arc<AppState>>,
    path: Result<Path<i64>, PathRejection>,
) -> Result<StatusCode, ServerError> {
    let Path(id) = path?;
    if state.messages.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

#[utoipa::path(
    get,
    path = "/messages/search",
    tag = "messages",
    params(SearchQuery),
    responses(
        (status = 200, description = "Messages containing the text", body = Vec<MessageView>),
        (status = 400, description = "Search text missing or blank", body = ErrorBody),
    )
)]
pub async fn search_messages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<MessageView>>, ServerError> {
    let text = query.q.unwrap_or_default();
    Ok(Json(state.messages.search(&text).await?))
}

// ── Tests ──────────────────────────────────────────────────────────────────────
