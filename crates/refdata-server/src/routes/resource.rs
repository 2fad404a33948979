//! Generic handlers shared by every resource family.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use refdata_api::{ApiError, ApiResponse, Envelope};
use refdata_core::{Record, RecordKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::service::{DeleteReply, ResourceService, ServiceError, Shape};

/// Optional paging on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

/// `POST`/`GET` on the collection and `GET`/`PUT`/`DELETE` on `/{id}`,
/// with and without a trailing slash on the collection.
pub fn resource_routes<R: Record>(base: &str, service: Arc<ResourceService<R>>) -> Router {
    Router::new()
        .route(base, post(create::<R>).get(list::<R>))
        .route(&format!("{base}/"), post(create::<R>).get(list::<R>))
        .route(
            &format!("{base}/{{id}}"),
            get(read::<R>).put(update::<R>).delete(remove::<R>),
        )
        .with_state(service)
}

pub(crate) fn parse_key<R: Record>(raw: &str) -> Result<RecordKey, ApiError> {
    RecordKey::parse(R::SCHEMA.key_kind, raw)
        .map_err(|e| ApiError::unprocessable_entity(e.to_string()))
}

/// Wraps `data` the way the binding asks for.
pub(crate) fn shaped<T: Serialize>(shape: Shape, data: T) -> Response {
    match shape {
        Shape::Bare => ApiResponse::ok(data).into_response(),
        Shape::Enveloped => ApiResponse::ok(Envelope::ok(data)).into_response(),
    }
}

fn rejected<R: Record>(err: ServiceError) -> ApiError {
    err.into_api_error(R::LABEL, StatusCode::NOT_FOUND)
}

pub(crate) async fn create<R: Record>(
    State(service): State<Arc<ResourceService<R>>>,
    Json(input): Json<R>,
) -> Result<Response, ApiError> {
    let record = service
        .create(&input)
        .await
        .map_err(rejected::<R>)?;
    Ok(shaped(service.binding().item_shape, record))
}

pub(crate) async fn read<R: Record>(
    State(service): State<Arc<ResourceService<R>>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let key = parse_key::<R>(&id)?;
    let binding = service.binding();
    let record = service
        .get(&key)
        .await
        .map_err(|e| e.into_api_error(R::LABEL, binding.missing_on_get))?;
    Ok(shaped(binding.item_shape, record))
}

pub(crate) async fn update<R: Record>(
    State(service): State<Arc<ResourceService<R>>>,
    Path(id): Path<String>,
    Json(input): Json<R>,
) -> Result<Response, ApiError> {
    let key = parse_key::<R>(&id)?;
    let record = service
        .update(&key, &input)
        .await
        .map_err(rejected::<R>)?;
    Ok(shaped(service.binding().item_shape, record))
}

pub(crate) async fn remove<R: Record>(
    State(service): State<Arc<ResourceService<R>>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let key = parse_key::<R>(&id)?;
    let deleted = service
        .delete(&key)
        .await
        .map_err(rejected::<R>)?;

    let binding = service.binding();
    Ok(match (binding.delete_reply, binding.item_shape) {
        (DeleteReply::Deleted, shape) => shaped(shape, deleted),
        (DeleteReply::Empty, Shape::Enveloped) => {
            ApiResponse::ok(Envelope::<Value>::empty()).into_response()
        }
        (DeleteReply::Empty, Shape::Bare) => ApiResponse::ok(Value::Null).into_response(),
    })
}

pub(crate) async fn list<R: Record>(
    State(service): State<Arc<ResourceService<R>>>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let params = service.limits().window(query.skip, query.limit);
    let records = service
        .list(&params)
        .await
        .map_err(rejected::<R>)?;
    Ok(shaped(service.binding().list_shape, records))
}
