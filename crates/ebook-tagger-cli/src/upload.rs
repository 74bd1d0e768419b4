// SPDX-License-Identifier: AGPL-3.0-or-later
//! Input file checks and output naming

use crate::settings::UploadLimits;
use std::path::Path;

const ALLOWED_EXTENSIONS: [&str; 1] = ["docx"];

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("missing file name")]
    MissingName,

    #[error("{0} is not a .docx file")]
    Extension(String),

    #[error("file is too large ({size} bytes), maximum is {limit} MB")]
    TooLarge { size: u64, limit: u64 },

    #[error("file is empty")]
    Empty,
}

/// Accept only `.docx` names, case-insensitively
pub fn validate_name(path: &Path) -> Result<(), UploadError> {
    if path.file_name().is_none() {
        return Err(UploadError::MissingName);
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(())
    } else {
        Err(UploadError::Extension(path.display().to_string()))
    }
}

/// Size limit first, then emptiness
pub fn validate_size(size: u64, limits: &UploadLimits) -> Result<(), UploadError> {
    if size > limits.max_bytes() {
        return Err(UploadError::TooLarge {
            size,
            limit: limits.max_megabytes,
        });
    }
    if size == 0 {
        return Err(UploadError::Empty);
    }
    Ok(())
}

/// `<input stem><suffix>`
pub fn output_name(input: &Path, suffix: &str) -> Result<String, UploadError> {
    let stem = input.file_stem().ok_or(UploadError::MissingName)?;
    Ok(format!("{}{suffix}", stem.to_string_lossy()))
}
