// SPDX-License-Identifier: AGPL-3.0-or-later
//! Command implementations for document operations

use crate::settings::{Settings, UploadLimits};
use crate::upload::{output_name, validate_name, validate_size, UploadError};
use ebook_tagger_core::{
    ConversionError, Converter, Document, DocumentLoader, DocxLoader, LoadError,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Failure classes reported with distinct exit codes
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("invalid upload")]
    Upload(#[from] UploadError),

    #[error("could not read document")]
    Load(#[from] LoadError),

    #[error("conversion failed")]
    Conversion(#[from] ConversionError),

    #[error("IO error")]
    Io(#[from] std::io::Error),

    #[error("JSON error")]
    Json(#[from] serde_json::Error),
}

impl CommandError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Upload(_) => 2,
            Self::Conversion(_) => 3,
            Self::Load(_) => 4,
            Self::Io(_) | Self::Json(_) => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// Shape of the converted output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Tagged lines as plain text (default)
    #[default]
    Text,
    /// `{"html": <tagged text>}`
    Json,
}

impl OutputFormat {
    /// Appended to the input stem to name the output file
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Text => ".txt",
            Self::Json => "-contentHTML.json",
        }
    }
}

#[derive(Serialize)]
struct HtmlExport<'a> {
    html: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentMeta {
    pub path: String,
    pub format: &'static str,
    pub bytes: u64,
    pub paragraphs: usize,
    pub media: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentData {
    pub meta: DocumentMeta,
    pub document: Document,
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversionResult {
    pub content: String,
    /// `<input stem>.txt` or `<input stem>-contentHTML.json`
    pub output_name: String,
    pub lines: usize,
}

/// Validate and read an upload
pub fn read_upload(path: &Path, limits: &UploadLimits) -> Result<Vec<u8>> {
    validate_name(path)?;
    let size = std::fs::metadata(path)?.len();
    validate_size(size, limits)?;
    Ok(std::fs::read(path)?)
}

/// Load a document from the filesystem
pub fn load_document(path: &Path, limits: &UploadLimits) -> Result<DocumentData> {
    let bytes = read_upload(path, limits)?;
    let loader = DocxLoader::new();
    let document = loader.load_bytes(&bytes)?;

    Ok(DocumentData {
        meta: DocumentMeta {
            path: path.display().to_string(),
            format: loader.format(),
            bytes: bytes.len() as u64,
            paragraphs: document.len(),
            media: document.media.len(),
        },
        document,
    })
}

/// Convert a document into its tagged text, wrapped as `format` asks
pub fn convert_document(
    path: &Path,
    settings: &Settings,
    format: OutputFormat,
) -> Result<ConversionResult> {
    let data = load_document(path, &settings.upload)?;
    let lines = Converter::new(settings.convert.clone()).convert_lines(&data.document)?;
    debug!(path = %path.display(), lines = lines.len(), ?format, "converted");

    let text = lines.join("\n");
    let content = match format {
        OutputFormat::Text => text,
        OutputFormat::Json => serde_json::to_string(&HtmlExport { html: &text })?,
    };

    Ok(ConversionResult {
        content,
        output_name: output_name(path, format.suffix())?,
        lines: lines.len(),
    })
}

/// Pretty JSON dump of the loaded paragraphs
pub fn inspect_document(path: &Path, limits: &UploadLimits) -> Result<String> {
    let data = load_document(path, limits)?;
    Ok(serde_json::to_string_pretty(&data)?)
}

/// Where the converted text goes: `output` itself, `<output>/<name>` when it
/// is a directory, or next to the input
pub fn output_path(input: &Path, output: Option<&Path>, name: &str) -> PathBuf {
    match output {
        Some(dir) if dir.is_dir() => dir.join(name),
        Some(file) => file.to_path_buf(),
        None => input
            .parent()
            .map(|parent| parent.join(name))
            .unwrap_or_else(|| PathBuf::from(name)),
    }
}

/// Save converted text to the filesystem
pub fn save_result(result: &ConversionResult, path: &Path) -> Result<()> {
    std::fs::write(path, &result.content)?;
    info!(path = %path.display(), lines = result.lines, "wrote output");
    Ok(())
}
