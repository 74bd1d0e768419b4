// SPDX-License-Identifier: AGPL-3.0-or-later
//! Loaded manuscript model
//!
//! A document is an ordered list of paragraphs, each with the raw text, the
//! resolved paragraph style name and the direct runs carrying character
//! formatting. The converter only reads this model; formatted output is always
//! produced as fresh strings.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Smallest styled text unit of a paragraph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub text: String,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub subscript: bool,
    #[serde(default)]
    pub superscript: bool,
}

impl Run {
    /// Create an unstyled run
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn subscript(mut self) -> Self {
        self.subscript = true;
        self
    }

    pub fn superscript(mut self) -> Self {
        self.superscript = true;
        self
    }

    /// A run holding exactly one space is never wrapped in style markers
    pub fn is_single_space(&self) -> bool {
        self.text == " "
    }
}

/// One body paragraph of the manuscript
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paragraph {
    /// Full paragraph text, hyperlink text included
    pub text: String,
    /// Resolved style name ("Normal", "List Paragraph", ...)
    #[serde(default = "default_style")]
    pub style: String,
    /// Direct runs (runs nested in hyperlinks are not listed here)
    #[serde(default)]
    pub runs: Vec<Run>,
}

fn default_style() -> String {
    "Normal".to_string()
}

impl Paragraph {
    /// Paragraph with a single unstyled run
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            runs: vec![Run::new(text.clone())],
            text,
            style: default_style(),
        }
    }

    /// Paragraph whose text is the concatenation of its runs
    pub fn from_runs(runs: Vec<Run>) -> Self {
        Self {
            text: runs.iter().map(|r| r.text.as_str()).collect(),
            style: default_style(),
            runs,
        }
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = style.into();
        self
    }

    /// Override the text while keeping the runs, as happens when a hyperlink
    /// contributes text that no direct run carries
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Empty or whitespace-only
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub fn is_list(&self) -> bool {
        self.style.starts_with("List")
    }
}

/// Image stored in the package media folder
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaImage {
    /// Archive path, e.g. `word/media/image1.png`
    pub name: String,
    pub mime: String,
    #[serde(skip)]
    pub data: Vec<u8>,
}

impl MediaImage {
    /// MIME type guessed from the file extension
    pub fn mime_for(name: &str) -> String {
        let ext = name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" => "image/jpeg".to_string(),
            "svg" => "image/svg+xml".to_string(),
            "" => "application/octet-stream".to_string(),
            other => format!("image/{other}"),
        }
    }

    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.data))
    }
}

/// The root document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub paragraphs: Vec<Paragraph>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaImage>,
}

impl Document {
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            media: Vec::new(),
        }
    }

    /// Build a document of unstyled paragraphs, one per line
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(lines.into_iter().map(Paragraph::new).collect())
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn paragraph(&self, index: usize) -> Option<&Paragraph> {
        self.paragraphs.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_runs_concatenates_text() {
        let p = Paragraph::from_runs(vec![Run::new("Olá, ").bold(), Run::new("mundo")]);
        assert_eq!(p.text, "Olá, mundo");
        assert_eq!(p.runs.len(), 2);
        assert!(p.runs[0].bold);
    }

    #[test]
    fn test_blank_and_list() {
        assert!(Paragraph::new(" \t").is_blank());
        assert!(Paragraph::new("").is_blank());
        assert!(!Paragraph::new("x").is_blank());
        assert!(Paragraph::new("x").with_style("List Paragraph").is_list());
        assert!(!Paragraph::new("x").with_style("Normal").is_list());
    }

    #[test]
    fn test_media_data_uri() {
        let image = MediaImage {
            name: "word/media/image1.jpg".to_string(),
            mime: MediaImage::mime_for("word/media/image1.jpg"),
            data: b"abc".to_vec(),
        };
        assert_eq!(image.mime, "image/jpeg");
        assert_eq!(image.data_uri(), "data:image/jpeg;base64,YWJj");
        assert_eq!(MediaImage::mime_for("a.PNG"), "image/png");
    }
}
