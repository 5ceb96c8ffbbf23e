use std::path::Path;

use anyhow::Context;
use bytes::Bytes;

use crate::error::{ClientError, ClientResult};

/// A captured photo staged for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageRef {
    pub uri: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageRef {
    /// Content type is taken from the extension of `uri`.
    pub fn new(uri: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let uri = uri.into();
        let content_type = mime_from_ext(&uri).to_string();
        Self {
            uri,
            content_type,
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("reading image {}", path.display()))?;
        if bytes.is_empty() {
            return Err(ClientError::Validation(format!("{} is empty", path.display())).into());
        }
        Ok(Self::new(path.display().to_string(), bytes))
    }

    /// Lowercased extension, `jpg` when the name has none.
    pub fn extension(&self) -> String {
        extension_of(&self.uri).unwrap_or_else(|| "jpg".to_string())
    }

    pub(crate) fn check(&self) -> ClientResult<()> {
        if self.bytes.is_empty() {
            return Err(ClientError::Validation(format!("{} has no image data", self.uri)));
        }
        Ok(())
    }
}

fn extension_of(uri: &str) -> Option<String> {
    let name = uri.rsplit(['/', '\\']).next()?;
    let (_, ext) = name.rsplit_once('.')?;
    (!ext.is_empty()).then(|| ext.to_ascii_lowercase())
}

pub fn mime_from_ext(uri: &str) -> &'static str {
    match extension_of(uri).as_deref() {
        Some("png") => "image/png",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        _ => "image/jpeg",
    }
}
