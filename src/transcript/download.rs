//! Poster downloads: decode the `data:` URL returned by the poster endpoint
//! and write it next to the user's other downloads.

use std::path::{Path, PathBuf};

use base64::Engine as _;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageSaveError {
    #[error("image payload is not a base64 data URL")]
    NotDataUrl,

    #[error("invalid base64 image data: {0}")]
    Decode(#[from] base64::DecodeError),

    #[error("cannot write image: {0}")]
    Io(#[from] std::io::Error),
}

/// Split `data:<mime>;base64,<data>` into its MIME type and decoded bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), ImageSaveError> {
    let rest = url.strip_prefix("data:").ok_or(ImageSaveError::NotDataUrl)?;
    let (meta, data) = rest.split_once(',').ok_or(ImageSaveError::NotDataUrl)?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or(ImageSaveError::NotDataUrl)?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim())?;
    Ok((mime.to_string(), bytes))
}

pub fn download_file_name(unix_millis: i64) -> String {
    format!("DesiScribe_Ad_{unix_millis}.jpg")
}

/// Write the poster into `dir`, returning the path of the new file.
pub fn save_image(url: &str, dir: &Path) -> Result<PathBuf, ImageSaveError> {
    let (_mime, bytes) = decode_data_url(url)?;
    std::fs::create_dir_all(dir)?;
    let path = dir.join(download_file_name(chrono::Utc::now().timestamp_millis()));
    std::fs::write(&path, bytes)?;
    log::info!("poster saved to {}", path.display());
    Ok(path)
}
