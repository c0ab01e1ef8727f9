// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! On-disk storage for patient photos.
//!
//! Files live flat in one directory under random names and are addressed
//! publicly as `/fotos/<file name>`.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::ApiError;

/// Public URL prefix the photo directory is served under.
pub const PUBLIC_PREFIX: &str = "/fotos";

/// Largest accepted upload, in bytes.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Content types accepted for upload.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/png", "image/jpeg", "image/jpg"];

/// An uploaded file as received from a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    /// The declared content type.
    pub content_type: Option<String>,
    /// The client's file name, used only for its extension.
    pub original_name: Option<String>,
    /// The raw file contents.
    pub bytes: Vec<u8>,
}

/// A photo written to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPhoto {
    /// The generated file name.
    pub file_name: String,
    /// The public path recorded on the patient.
    pub public_path: String,
}

/// Photo contents ready to be sent to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoContent {
    /// The content type derived from the file extension.
    pub content_type: &'static str,
    /// The raw file contents.
    pub bytes: Vec<u8>,
}

/// Directory-backed photo storage.
#[derive(Debug, Clone)]
pub struct PhotoStore {
    dir: PathBuf,
}

impl PhotoStore {
    /// Opens the store, creating `dir` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Internal` if the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, ApiError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| {
            ApiError::Internal(format!(
                "Failed to create photo directory {}: {e}",
                dir.display()
            ))
        })?;
        info!(dir = %dir.display(), "Photo store ready");
        Ok(Self { dir })
    }

    /// The directory photos are written to.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validates and writes an upload under a random name.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ValidationError` for a missing, empty, oversized,
    /// or non-image file, and `ApiError::Internal` if the write fails.
    pub fn save(&self, upload: &PhotoUpload) -> Result<StoredPhoto, ApiError> {
        let content_type = upload
            .content_type
            .as_deref()
            .map(str::to_ascii_lowercase)
            .filter(|ct| ALLOWED_CONTENT_TYPES.contains(&ct.as_str()))
            .ok_or_else(|| ApiError::validation("foto", "invalid file"))?;
        if upload.bytes.is_empty() {
            return Err(ApiError::validation("foto", "invalid file"));
        }
        if upload.bytes.len() > MAX_PHOTO_BYTES {
            return Err(ApiError::validation(
                "foto",
                format!("file exceeds {MAX_PHOTO_BYTES} bytes"),
            ));
        }

        let extension = upload
            .original_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .filter(|ext| content_type_for_extension(ext).is_some())
            .unwrap_or_else(|| default_extension(&content_type).to_string());

        let file_name = format!("{}.{extension}", Uuid::new_v4());
        let path = self.dir.join(&file_name);
        std::fs::write(&path, &upload.bytes).map_err(|e| {
            ApiError::Internal(format!("Failed to write photo {}: {e}", path.display()))
        })?;

        debug!(file_name, size = upload.bytes.len(), "Photo written");
        Ok(StoredPhoto {
            public_path: format!("{PUBLIC_PREFIX}/{file_name}"),
            file_name,
        })
    }

    /// Deletes a stored photo. Failures are logged, not returned.
    pub fn discard(&self, photo: &StoredPhoto) {
        let path = self.dir.join(&photo.file_name);
        if let Err(e) = std::fs::remove_file(&path) {
            warn!(path = %path.display(), error = %e, "Failed to remove orphaned photo");
        }
    }

    /// Reads the photo a patient's `photo_path` points at.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` if the path is not a photo in this store
    /// or the file is gone.
    pub fn read(&self, public_path: &str) -> Result<PhotoContent, ApiError> {
        let not_found = || ApiError::NotFound {
            resource: String::from("Photo"),
            message: String::from("Photo not found"),
        };

        let file_name = public_path
            .strip_prefix(PUBLIC_PREFIX)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|name| is_plain_file_name(name))
            .ok_or_else(not_found)?;
        let content_type = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| content_type_for_extension(&ext.to_ascii_lowercase()))
            .ok_or_else(not_found)?;

        let bytes = std::fs::read(self.dir.join(file_name)).map_err(|e| {
            warn!(file_name, error = %e, "Photo file missing");
            not_found()
        })?;

        Ok(PhotoContent {
            content_type,
            bytes,
        })
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.')
}

fn default_extension(content_type: &str) -> &'static str {
    if content_type == "image/png" { "png" } else { "jpg" }
}

/// Maps a lowercase file extension to its image content type.
#[must_use]
pub fn content_type_for_extension(extension: &str) -> Option<&'static str> {
    match extension {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}
