use thiserror::Error;

use super::domain::{CanonicalRecord, RecordPatch, UserId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("stored record could not be decoded: {0}")]
    Corrupt(String),
}

/// Persistence boundary for canonical records. `save` must apply the
/// patch with merge semantics (untouched sections survive) and return
/// the merged record; a missing record is created from the patch.
pub trait RecordStore: Send + Sync {
    fn save(&self, user_id: &UserId, patch: RecordPatch) -> Result<CanonicalRecord, StoreError>;
    fn fetch(&self, user_id: &UserId) -> Result<Option<CanonicalRecord>, StoreError>;
}

/// An uploaded document on its way to blob storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Where an upload landed; `reference` is what gets stored in the record
/// as a document ref.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub reference: String,
    pub download_url: Option<String>,
}

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob backend rejected the upload: {0}")]
    Backend(String),
    #[error("blob runtime unavailable: {0}")]
    Runtime(String),
}

/// Boundary to the document blob backend.
pub trait BlobStore: Send + Sync {
    fn upload(&self, user_id: &UserId, upload: BlobUpload) -> Result<StoredBlob, BlobError>;
}
