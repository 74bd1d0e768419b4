// SPDX-License-Identifier: AGPL-3.0-or-later
//! Conversion driver
//!
//! Walks the paragraphs once with a fresh [`TraversalContext`], dispatches each
//! one to the first matching tag rule or to the plain renderer, and gathers the
//! fragments into output lines.

use crate::classifier::{is_marker_shape, normalize_marker_text, TraversalContext};
use crate::document::Document;
use crate::formats::DocxLoader;
use crate::plain::render_plain;
use crate::tags::{find_rule, Fragment, TagInput};
use crate::traits::{ConversionError, ConvertConfig, DocumentLoader, LoaderExt, Result};
use std::path::Path;
use tracing::{debug, info, trace};

/// Output lines with consecutive duplicates suppressed
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct OutputLines {
    lines: Vec<String>,
}

impl OutputLines {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `line` unless it repeats the previous line. Returns whether it was kept.
    pub fn push(&mut self, line: String) -> bool {
        if self.lines.last() == Some(&line) {
            return false;
        }
        self.lines.push(line);
        true
    }

    /// Append a renderer result
    ///
    /// Single fragments that are empty or a bare `<p></p>` are dropped; lines
    /// of a multi-line fragment are only dropped when empty.
    pub fn push_fragment(&mut self, fragment: Fragment) {
        match fragment {
            Fragment::Single(line) => {
                if !line.is_empty() && line != "<p></p>" {
                    self.push(line);
                }
            }
            Fragment::Many(lines) => {
                for line in lines.into_iter().filter(|l| !l.is_empty()) {
                    self.push(line);
                }
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    pub fn join(&self) -> String {
        self.lines.join("\n")
    }
}

/// Converts documents with a fixed configuration
///
/// A converter holds no scan state, so one instance can serve many
/// conversions, including concurrent ones.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConvertConfig,
}

impl Converter {
    pub fn new(config: ConvertConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConvertConfig {
        &self.config
    }

    /// Convert a loaded document into the newline-joined tagged text
    pub fn convert(&self, document: &Document) -> std::result::Result<String, ConversionError> {
        Ok(self.convert_lines(document)?.join("\n"))
    }

    /// Convert a loaded document into its output lines
    pub fn convert_lines(
        &self,
        document: &Document,
    ) -> std::result::Result<Vec<String>, ConversionError> {
        let total = document.len();
        let mut ctx = TraversalContext::new();
        let mut output = OutputLines::new();
        let mut tags = 0usize;

        for (index, paragraph) in document.paragraphs.iter().enumerate() {
            let text = normalize_marker_text(&paragraph.text);
            let block = ctx.open_block(document, index, &text);
            if !block.is_empty() {
                debug!(index, marker = %text, paragraphs = block.len(), "opened block");
            }
            let next_index = index + 1;
            ctx.track_marker(index, &text);

            let echo = self.config.echo_block_paragraphs;
            if ctx.is_claimed(index) && !is_marker_shape(&text) && !echo {
                trace!(index, "already rendered inside a block");
                continue;
            }

            let lower = text.to_lowercase();
            let fragment = match find_rule(&text, &lower) {
                Some(rule) => {
                    debug!(index, tag = rule.name, "dispatching tag");
                    tags += 1;
                    let input = TagInput {
                        document,
                        config: &self.config,
                        text: &text,
                        lower: &lower,
                        index,
                        next_index,
                        block: &block,
                    };
                    (rule.render)(&input, &mut ctx)
                        .map_err(|source| ConversionError::Paragraph { index, source })?
                }
                None => {
                    trace!(index, "plain paragraph");
                    render_plain(document, next_index)
                }
            };
            output.push_fragment(fragment);
        }

        info!(paragraphs = total, tags, lines = output.len(), "conversion finished");
        Ok(output.into_lines())
    }

    /// Load DOCX bytes and convert them
    pub fn convert_bytes(&self, bytes: &[u8]) -> Result<String> {
        let document = DocxLoader::new().load_bytes(bytes)?;
        Ok(self.convert(&document)?)
    }

    /// Load a DOCX file and convert it
    pub fn convert_path(&self, path: impl AsRef<Path>) -> Result<String> {
        let document = DocxLoader::new().load_path(path)?;
        Ok(self.convert(&document)?)
    }
}
