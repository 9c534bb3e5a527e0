use std::io::Cursor;

use google_drive3::{api::File, api::Scope, DriveHub};
use tokio::runtime::Runtime;

use crate::workflows::intake::domain::UserId;
use crate::workflows::intake::store::{BlobError, BlobStore, BlobUpload, StoredBlob};

/// Google Drive-backed document storage. Wraps the generated async
/// client behind the synchronous `BlobStore` boundary so the intake flow
/// never sees async details.
pub struct DriveDocumentStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    hub: DriveHub<C>,
    runtime: Runtime,
    root_folder_id: Option<String>,
}

impl<C> DriveDocumentStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    pub fn new(hub: DriveHub<C>, runtime: Runtime, root_folder_id: Option<String>) -> Self {
        Self {
            hub,
            runtime,
            root_folder_id,
        }
    }

    pub fn with_runtime(hub: DriveHub<C>, root_folder_id: Option<String>) -> Result<Self, BlobError> {
        let runtime = Runtime::new().map_err(|err| BlobError::Runtime(err.to_string()))?;
        Ok(Self::new(hub, runtime, root_folder_id))
    }

    fn map_error<E: std::fmt::Display>(err: E) -> BlobError {
        BlobError::Backend(err.to_string())
    }
}

impl<C> std::fmt::Debug for DriveDocumentStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriveDocumentStore").finish_non_exhaustive()
    }
}

impl<C> BlobStore for DriveDocumentStore<C>
where
    C: google_drive3::common::Connector + Send + Sync + 'static,
{
    fn upload(&self, user_id: &UserId, upload: BlobUpload) -> Result<StoredBlob, BlobError> {
        let metadata = File {
            name: Some(format!("{}-{}", user_id.0, upload.file_name)),
            mime_type: Some(upload.content_type.clone()),
            parents: self
                .root_folder_id
                .as_ref()
                .map(|parent| vec![parent.clone()]),
            ..File::default()
        };
        let media_type = upload
            .content_type
            .parse::<mime::Mime>()
            .unwrap_or(mime::APPLICATION_OCTET_STREAM);
        let cursor = Cursor::new(upload.bytes);

        let result = self.runtime.block_on(async {
            self.hub
                .files()
                .create(metadata)
                .param("fields", "id,webViewLink")
                .supports_all_drives(true)
                .add_scope(Scope::File)
                .upload(cursor, media_type)
                .await
        });

        let (_, file) = result.map_err(DriveDocumentStore::<C>::map_error)?;
        let reference = file
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| BlobError::Backend("upload returned no file id".to_string()))?;
        Ok(StoredBlob {
            reference,
            download_url: file.web_view_link,
        })
    }
}
