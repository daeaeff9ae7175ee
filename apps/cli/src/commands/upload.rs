//! Turning local files into dashboard uploads.

use anyhow::{Context, Result};
use lathe_training::encode_upload;
use std::path::Path;

/// Read `path` and wrap it as a `data:<mime>;base64,...` blob.
pub fn read_as_data_uri(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    tracing::debug!(path = %path.display(), mime = %mime, bytes = bytes.len(), "encoding upload");
    Ok(encode_upload(mime.essence_str(), &bytes))
}
