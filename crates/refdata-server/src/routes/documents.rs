//! Country document routes: generic CRUD plus upload, per-country listing
//! and file download.

use std::io;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRef, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use refdata_api::ApiError;
use refdata_core::{CountryDocument, Record};

use super::resource::{ListQuery, list, parse_key, read, remove, shaped};
use crate::attachments::DocumentService;
use crate::service::{ResourceService, ServiceError};

#[derive(Clone, FromRef)]
pub struct DocumentState {
    pub documents: Arc<DocumentService>,
    pub records: Arc<ResourceService<CountryDocument>>,
}

impl DocumentState {
    pub fn new(documents: Arc<DocumentService>) -> Self {
        Self {
            records: Arc::clone(documents.records()),
            documents,
        }
    }
}

pub fn document_routes(base: &str, state: DocumentState) -> Router {
    Router::new()
        .route(base, post(upload).get(list::<CountryDocument>))
        .route(
            &format!("{base}/"),
            post(upload).get(list::<CountryDocument>),
        )
        .route(
            &format!("{base}/{{id}}"),
            get(read::<CountryDocument>)
                .put(update)
                .delete(remove::<CountryDocument>),
        )
        .route(&format!("{base}/{{id}}/list"), get(list_for_country))
        .route(&format!("{base}/{{id}}/file"), get(download))
        .with_state(state)
}

fn rejected(err: ServiceError) -> ApiError {
    err.into_api_error(CountryDocument::LABEL, StatusCode::NOT_FOUND)
}

async fn upload(
    State(documents): State<Arc<DocumentService>>,
    Json(input): Json<CountryDocument>,
) -> Result<Response, ApiError> {
    let record = documents.create(input).await.map_err(rejected)?;
    Ok(shaped(documents.records().binding().item_shape, record))
}

async fn update(
    State(documents): State<Arc<DocumentService>>,
    Path(id): Path<String>,
    Json(input): Json<CountryDocument>,
) -> Result<Response, ApiError> {
    let key = parse_key::<CountryDocument>(&id)?;
    let record = documents.update(&key, input).await.map_err(rejected)?;
    Ok(shaped(documents.records().binding().item_shape, record))
}

/// `GET /{country_id}/list`
async fn list_for_country(
    State(documents): State<Arc<DocumentService>>,
    Path(country_id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let records = documents.records();
    let params = records.limits().window(query.skip, query.limit);
    let found = documents
        .list_for_country(&country_id, &params)
        .await
        .map_err(rejected)?;
    Ok(shaped(records.binding().list_shape, found))
}

/// `GET /{id}/file`
async fn download(
    State(documents): State<Arc<DocumentService>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let key = parse_key::<CountryDocument>(&id)?;
    let file = match documents.file(&key).await {
        Ok(file) => file,
        Err(ServiceError::NotFound) => return Err(ApiError::not_found("File not found")),
        Err(err) => return Err(rejected(err)),
    };

    let bytes = match tokio::fs::read(&file.path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::warn!(path = %file.path.display(), "document row has no file");
            return Err(ApiError::not_found("File not found"));
        }
        Err(e) => return Err(rejected(e.into())),
    };

    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            ),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(&file.download_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// `attachment; filename="..."` with characters unsafe in a quoted header
/// parameter replaced by `_`.
fn content_disposition(name: &str) -> HeaderValue {
    let safe: String = name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    HeaderValue::from_str(&format!("attachment; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
