// SPDX-License-Identifier: AGPL-3.0-or-later
//! Ebook Tagger Core - tagged manuscript to e-book text conversion
//!
//! This crate provides:
//! - A paragraph/run document model and a DOCX loader producing it
//! - The block classifier that recognizes author tags such as `#Introdução#`
//! - Run, box-text and formula formatters
//! - The conversion driver emitting one interaction fragment or paragraph per line

pub mod box_text;
pub mod classifier;
pub mod convert;
pub mod document;
pub mod formats;
pub mod formula;
pub mod inline;
pub mod plain;
pub mod quotes;
pub mod tags;
pub mod traits;

use std::path::Path;

pub use classifier::TraversalContext;
pub use convert::{Converter, OutputLines};
pub use document::{Document, MediaImage, Paragraph, Run};
pub use formats::DocxLoader;
pub use tags::{Fragment, TagRule, TAG_RULES};
pub use traits::{
    ConversionError, ConvertConfig, DocumentLoader, Error, LoadError, LoaderExt, RenderError,
    Result,
};

/// Convert a loaded document with the default configuration
pub fn convert(document: &Document) -> std::result::Result<String, ConversionError> {
    Converter::default().convert(document)
}

/// Convert DOCX bytes with the default configuration
pub fn convert_bytes(bytes: &[u8]) -> Result<String> {
    Converter::default().convert_bytes(bytes)
}

/// Convert a DOCX file with the default configuration
pub fn convert_path(path: impl AsRef<Path>) -> Result<String> {
    Converter::default().convert_path(path)
}
