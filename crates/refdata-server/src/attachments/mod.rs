//! Country document uploads and downloads.
//!
//! Upload flow:
//! 1. decode the base64 payload carried in `filename`
//! 2. check size and content type
//! 3. stage the bytes next to `<root>/<id[0]>/<id>`
//! 4. insert the row inside a store transaction
//! 5. move the staged file into place, then commit
//!
//! A rejected insert discards the staged file, so an existing document's
//! bytes are never replaced by a failed upload. A crash between step 5's
//! move and its commit can still leave a file with no row.

mod sniff;
mod storage;

pub use sniff::{ContentSniffer, PDF_MAGIC, PdfSniffer, decode_base64};
pub use storage::{DocumentStorage, StagedFile};

use std::path::PathBuf;
use std::sync::Arc;

use refdata_core::{CountryDocument, Record, RecordKey, generate_id};
use refdata_storage::ListParams;
use serde_json::Value;

use crate::service::{ResourceService, ServiceError};

pub const DEFAULT_DOCUMENT_LABEL: &str = "Country Document";
pub const DEFAULT_EXTENSION: &str = "pdf";

/// A stored document ready to be sent back.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub path: PathBuf,
    pub download_name: String,
}

pub struct DocumentService {
    records: Arc<ResourceService<CountryDocument>>,
    storage: DocumentStorage,
    sniffer: Box<dyn ContentSniffer>,
    max_upload_bytes: usize,
}

impl DocumentService {
    pub fn new(
        records: Arc<ResourceService<CountryDocument>>,
        storage: DocumentStorage,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            records,
            storage,
            sniffer: Box::new(PdfSniffer),
            max_upload_bytes,
        }
    }

    pub fn with_sniffer(mut self, sniffer: impl ContentSniffer + 'static) -> Self {
        self.sniffer = Box::new(sniffer);
        self
    }

    pub fn records(&self) -> &Arc<ResourceService<CountryDocument>> {
        &self.records
    }

    pub fn storage(&self) -> &DocumentStorage {
        &self.storage
    }

    /// Validates and stores the upload, then records it. `filesize` is
    /// always the decoded byte count; any caller-supplied value is ignored.
    pub async fn create(&self, mut input: CountryDocument) -> Result<CountryDocument, ServiceError> {
        let bytes = input
            .filename
            .take()
            .and_then(|payload| decode_base64(&payload))
            .ok_or_else(|| ServiceError::validation("not valid base64"))?;
        if bytes.len() > self.max_upload_bytes {
            return Err(ServiceError::validation("file too large"));
        }
        if !self.sniffer.matches(&bytes) {
            return Err(ServiceError::validation(self.sniffer.rejection()));
        }

        let id = *input.id.get_or_insert_with(generate_id);
        input.filesize = Some(i64::try_from(bytes.len()).unwrap_or(i64::MAX));
        let row = serde_json::to_value(&input)?;

        let staged = self.storage.stage(&id.to_string(), &bytes).await?;
        let stored = match self.insert_and_persist(&row, &staged).await {
            Ok(stored) => stored,
            Err(err) => {
                staged.discard().await;
                return Err(err);
            }
        };

        tracing::info!(document_id = %id, filesize = bytes.len(), "document stored");
        self.records.created(stored).await
    }

    async fn insert_and_persist(
        &self,
        row: &Value,
        staged: &StagedFile,
    ) -> Result<Value, ServiceError> {
        let mut tx = self.records.store().begin_transaction().await?;

        let stored = match tx.insert(CountryDocument::SCHEMA, row).await {
            Ok(stored) => stored,
            Err(err) => {
                if let Err(e) = tx.rollback().await {
                    tracing::warn!(error = %e, "rollback after failed document insert");
                }
                return Err(err.into());
            }
        };

        if let Err(err) = staged.persist().await {
            if let Err(e) = tx.rollback().await {
                tracing::warn!(error = %e, "rollback after failed file move");
            }
            return Err(err.into());
        }

        tx.commit().await.map_err(|err| {
            tracing::error!(
                path = %staged.target().display(),
                error = %err,
                "document commit failed after the file was moved into place"
            );
            ServiceError::from(err)
        })?;
        Ok(stored)
    }

    /// Replaces the metadata of document `id`. The stored file is left as is:
    /// `filesize` keeps its recorded value, a payload in `filename` is
    /// ignored, and the id cannot change since it names the file on disk.
    pub async fn update(
        &self,
        id: &RecordKey,
        mut input: CountryDocument,
    ) -> Result<CountryDocument, ServiceError> {
        if let Some(new_id) = input.id {
            if *id != RecordKey::Uuid(new_id) {
                return Err(ServiceError::validation("document id cannot be changed"));
            }
        }

        let row = self
            .records
            .store()
            .fetch(CountryDocument::SCHEMA, id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let current: CountryDocument = serde_json::from_value(row)?;

        input.filename = None;
        input.filesize = current.filesize;
        self.records.update(id, &input).await
    }

    /// Documents attached to one country.
    pub async fn list_for_country(
        &self,
        country_id: &str,
        params: &ListParams,
    ) -> Result<Vec<CountryDocument>, ServiceError> {
        self.records
            .list_by("country_id", &Value::String(country_id.to_string()), params)
            .await
    }

    /// Resolves the file of document `id` and its download name.
    pub async fn file(&self, id: &RecordKey) -> Result<DocumentFile, ServiceError> {
        let row = self
            .records
            .store()
            .fetch(CountryDocument::SCHEMA, id)
            .await?
            .ok_or(ServiceError::NotFound)?;
        let document: CountryDocument = serde_json::from_value(row)?;
        Ok(DocumentFile {
            path: self.storage.path_for(&id.to_string()),
            download_name: download_name(&document),
        })
    }
}

/// `"<name> <id> - Attachment - <document_type>.<ext>"`, with the id
/// left-padded to six characters.
pub fn download_name(document: &CountryDocument) -> String {
    let label = document
        .name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(DEFAULT_DOCUMENT_LABEL);
    let id = document.id.map(|id| id.to_string()).unwrap_or_default();
    let document_type = document.document_type.as_deref().unwrap_or_default();
    let extension = document
        .filetype
        .as_deref()
        .map(|ext| ext.trim_start_matches('.'))
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_EXTENSION);
    format!("{label} {id:0>6} - Attachment - {document_type}.{extension}")
}
