//! Multipart upload handling
//!
//! The uploaded file is streamed to a uniquely named file in the upload
//! directory. The file belongs to the request that received it and is
//! removed from disk when the [`TempUpload`] is dropped, whatever the
//! outcome of the request.

use std::path::Path;

use axum::extract::Multipart;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::config::AppConfig;
use crate::error::ServerError;

/// Form field carrying the PDF
pub const UPLOAD_FIELD: &str = "pdfFile";

/// An uploaded file on disk, deleted on drop
#[derive(Debug)]
pub struct TempUpload {
    file: NamedTempFile,
    size: usize,
    original_name: String,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// File name reported by the client
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    pub async fn read(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.path()).await
    }
}

/// Stream the `pdfFile` field of a multipart body into the upload directory
///
/// Other fields, and a `pdfFile` part without a file name, are skipped.
/// Fails with [`ServerError::PayloadTooLarge`] as soon as the file grows
/// past `config.max_upload_bytes`; the partial file is removed on the way
/// out.
pub async fn receive_upload(
    multipart: &mut Multipart,
    config: &AppConfig,
) -> Result<TempUpload, ServerError> {
    while let Some(mut field) = multipart.next_field().await? {
        // Only file parts count; a plain text value named `pdfFile` is skipped
        let original_name = match (field.name(), field.file_name()) {
            (Some(UPLOAD_FIELD), Some(file_name)) => file_name.to_owned(),
            (name, _) => {
                debug!("Skipping form field {:?}", name);
                continue;
            }
        };

        let temp = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(&config.upload_dir)?;
        let mut writer = tokio::fs::File::from_std(temp.reopen()?);

        let mut size = 0usize;
        while let Some(chunk) = field.chunk().await? {
            size += chunk.len();
            if size > config.max_upload_bytes {
                return Err(ServerError::PayloadTooLarge(config.max_upload_bytes));
            }
            writer.write_all(&chunk).await?;
        }
        writer.flush().await?;

        debug!("Stored {} byte upload at {}", size, temp.path().display());

        return Ok(TempUpload {
            file: temp,
            size,
            original_name,
        });
    }

    Err(ServerError::MissingFile(UPLOAD_FIELD))
}
