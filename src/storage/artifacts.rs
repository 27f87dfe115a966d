// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Processed image artifacts written under the static directory
//!
//! File names follow `<prefix>_<YYYYMMDDHHMMSS>_<suffix>.jpg`. The random
//! suffix keeps two requests finishing in the same second from overwriting
//! each other.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use image::DynamicImage;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::vision::image_utils::{encode_jpeg, ImageError, JPEG_QUALITY};

/// Sub-directory of the static root holding processed images
pub const PROCESSED_SUBDIR: &str = "processed";

/// URL path under which the static root is served
pub const STATIC_URL_PATH: &str = "static";

/// Errors raised while persisting an artifact
#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("Failed to encode artifact: {0}")]
    Encode(#[from] ImageError),

    #[error("Failed to write artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid public URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Configuration for the artifact store
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    /// Root directory served under `/static`
    pub static_dir: PathBuf,
    /// Externally reachable base URL of the detection service
    pub public_base_url: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            static_dir: PathBuf::from("./static"),
            public_base_url: "http://localhost:5000".to_string(),
        }
    }
}

/// A persisted output image and its public URL
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedArtifact {
    pub file_path: PathBuf,
    pub file_url: String,
}

/// Writes processed images and builds their public URLs
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    processed_dir: PathBuf,
    base_url: Url,
}

impl ArtifactStore {
    /// Create the store, making sure the processed directory exists
    pub fn new(config: &ArtifactConfig) -> Result<Self, ArtifactError> {
        let processed_dir = config.static_dir.join(PROCESSED_SUBDIR);
        fs::create_dir_all(&processed_dir).map_err(|source| ArtifactError::Io {
            path: processed_dir.clone(),
            source,
        })?;

        // A trailing slash makes `join` append instead of replacing the last segment
        let mut base = config.public_base_url.trim_end_matches('/').to_string();
        base.push('/');

        Ok(Self {
            processed_dir,
            base_url: Url::parse(&base)?,
        })
    }

    /// Directory holding processed images
    pub fn processed_dir(&self) -> &Path {
        &self.processed_dir
    }

    /// Encode and write `image` as `<prefix>_<timestamp>_<suffix>.jpg`
    pub fn persist(&self, image: &DynamicImage, prefix: &str) -> Result<PersistedArtifact, ArtifactError> {
        self.persist_at(image, prefix, Local::now())
    }

    /// Same as [`persist`](Self::persist) with an explicit clock reading
    pub fn persist_at(
        &self,
        image: &DynamicImage,
        prefix: &str,
        now: DateTime<Local>,
    ) -> Result<PersistedArtifact, ArtifactError> {
        let filename = artifact_filename(prefix, now);
        let jpeg = encode_jpeg(image, JPEG_QUALITY)?;

        let file_path = self.processed_dir.join(&filename);
        write_atomically(&file_path, &jpeg)?;

        let file_url = self.url_for(&filename)?;
        debug!("Persisted artifact {} ({} bytes)", file_path.display(), jpeg.len());

        Ok(PersistedArtifact {
            file_path,
            file_url,
        })
    }

    /// Public URL of a processed file
    pub fn url_for(&self, filename: &str) -> Result<String, ArtifactError> {
        let url = self
            .base_url
            .join(&format!("{}/{}/{}", STATIC_URL_PATH, PROCESSED_SUBDIR, filename))?;
        Ok(url.to_string())
    }
}

/// `<prefix>_<YYYYMMDDHHMMSS>_<8 hex>.jpg`
pub fn artifact_filename(prefix: &str, now: DateTime<Local>) -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}.jpg", prefix, now.format("%Y%m%d%H%M%S"), &suffix[..8])
}

/// Write to a hidden temp file in the same directory, then rename into place
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), ArtifactError> {
    let io_err = |source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.part", file_name));

    fs::write(&tmp_path, bytes).map_err(io_err)?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(io_err(e));
    }

    Ok(())
}
