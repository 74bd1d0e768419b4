// SPDX-License-Identifier: AGPL-3.0-or-later
//! Loader trait, error types and conversion configuration

use crate::document::Document;
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// The manuscript could not be turned into a paragraph sequence
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid document archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Missing document part: {0}")]
    MissingPart(String),

    #[error("Malformed XML in {part}: {message}")]
    Xml { part: String, message: String },
}

/// Structural failure while rendering one paragraph
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("paragraph {index} does not exist")]
    MissingParagraph { index: usize },

    #[error("paragraph {index} has no ':' separated segment: {text:?}")]
    MissingColon { index: usize, text: String },

    #[error("paragraph {index} has a link placeholder but no <...> delimiters")]
    MissingLinkDelimiters { index: usize },
}

/// Domain-level conversion failure; aborts the whole conversion
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    #[error("Failed to process paragraph {index}: {source}")]
    Paragraph {
        index: usize,
        #[source]
        source: RenderError,
    },
}

impl ConversionError {
    pub fn paragraph_index(&self) -> usize {
        match self {
            Self::Paragraph { index, .. } => *index,
        }
    }
}

/// Error of the byte and path entry points
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Conversion(#[from] ConversionError),
}

pub type Result<T> = std::result::Result<T, Error>;

pub const FIGURE_PLACEHOLDER: &str =
    "https://i.pinimg.com/736x/be/09/97/be0997e2d5732322bf552c6f2883c86e.jpg";

pub const TABLE_PLACEHOLDER: &str = "%3Ctable%20style='border-collapse:%20collapse;%20width:%20100%25;'%20border='1'%3E%0A%3Ctbody%3E%0A%3Ctr%3E%0A%3Ctd%20style='width:%20100%25;'%3EQuadro%3C/td%3E%0A%3C/tr%3E%0A%3C/tbody%3E%0A%3C/table%3E";

pub const GREEN_BOX_IMAGE: &str =
    "https://dbunicv.realize.pro.br/files/bbe7a7d8253ab4d19c641e74a008e50d.jpg";

pub const BLUE_BOX_IMAGE: &str =
    "https://dbunicv.realize.pro.br/files/851d95d42b89c5b0b24155447cf81d6b.jpg";

/// Configuration for one conversion
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Image URL used by figures
    pub figure_placeholder: String,
    /// Percent-encoded table embedded in `quadro` blocks
    pub table_placeholder: String,
    /// Illustration of the reading-tip box
    pub green_box_image: String,
    /// Illustration of the film / web box
    pub blue_box_image: String,
    /// Figures consume the package media images in order, as data URIs
    pub embed_media_images: bool,
    /// Replace straight double quotes with opening/closing curly quotes
    pub curly_quotes: bool,
    /// Render paragraphs again on their own after a block already holds them
    pub echo_block_paragraphs: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            figure_placeholder: FIGURE_PLACEHOLDER.to_string(),
            table_placeholder: TABLE_PLACEHOLDER.to_string(),
            green_box_image: GREEN_BOX_IMAGE.to_string(),
            blue_box_image: BLUE_BOX_IMAGE.to_string(),
            embed_media_images: false,
            curly_quotes: false,
            echo_block_paragraphs: false,
        }
    }
}

impl ConvertConfig {
    pub fn from_toml_str(input: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(input)
    }
}

/// Loader trait: turn a stored manuscript into a paragraph sequence
pub trait DocumentLoader: Send + Sync {
    /// Short name of the container format
    fn format(&self) -> &'static str;

    /// Load a document from its raw bytes
    fn load_bytes(&self, bytes: &[u8]) -> std::result::Result<Document, LoadError>;
}

/// Extension trait for reader and path input (not dyn-compatible)
pub trait LoaderExt: DocumentLoader {
    fn load_reader<R: Read>(&self, reader: R) -> std::result::Result<Document, LoadError> {
        let mut bytes = Vec::new();
        let mut reader = reader;
        reader.read_to_end(&mut bytes)?;
        self.load_bytes(&bytes)
    }

    fn load_path<P: AsRef<Path>>(&self, path: P) -> std::result::Result<Document, LoadError> {
        let bytes = std::fs::read(path)?;
        self.load_bytes(&bytes)
    }
}

impl<T: DocumentLoader> LoaderExt for T {}
