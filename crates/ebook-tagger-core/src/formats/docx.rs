// SPDX-License-Identifier: AGPL-3.0-or-later
//! DOCX loader
//!
//! Reads `word/document.xml` with a streaming XML reader and keeps only what the
//! converter needs: the body-level paragraphs, their direct runs with
//! bold/italic/underline/vertical-alignment flags, the resolved paragraph style
//! name, and the images stored under `word/media/`.
//!
//! Text of runs nested in hyperlinks counts towards the paragraph text but those
//! runs are not listed as paragraph runs. Paragraphs inside tables, text boxes
//! and content controls are not part of the paragraph sequence.

use crate::document::{Document, MediaImage, Paragraph, Run};
use crate::traits::{DocumentLoader, LoadError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

const DOCUMENT_PART: &str = "word/document.xml";
const STYLES_PART: &str = "word/styles.xml";
const MEDIA_PREFIX: &str = "word/media/";

/// Loader for Office Open XML word-processing packages
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxLoader;

impl DocxLoader {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentLoader for DocxLoader {
    fn format(&self) -> &'static str {
        "docx"
    }

    fn load_bytes(&self, bytes: &[u8]) -> Result<Document, LoadError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let body = read_part(&mut archive, DOCUMENT_PART)?
            .ok_or_else(|| LoadError::MissingPart(DOCUMENT_PART.to_string()))?;
        let styles = match read_part(&mut archive, STYLES_PART)? {
            Some(xml) => StyleNames::parse(&xml)?,
            None => StyleNames::default(),
        };

        let paragraphs = BodyWalker::new(&styles).walk(&body)?;
        let media = read_media(&mut archive)?;
        debug!(
            paragraphs = paragraphs.len(),
            media = media.len(),
            "loaded docx package"
        );
        Ok(Document { paragraphs, media })
    }
}

/// Read a package part as UTF-8; `None` when the part does not exist
fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, LoadError> {
    let mut file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(Some(content))
}

/// Every file under `word/media/`, in archive order
fn read_media<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<MediaImage>, LoadError> {
    let mut media = Vec::new();
    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        if file.is_dir() || !file.name().starts_with(MEDIA_PREFIX) {
            continue;
        }
        let name = file.name().to_string();
        let mut data = Vec::new();
        file.read_to_end(&mut data)?;
        media.push(MediaImage {
            mime: MediaImage::mime_for(&name),
            name,
            data,
        });
    }
    Ok(media)
}

fn xml_error(part: &str, err: impl std::fmt::Display) -> LoadError {
    LoadError::Xml {
        part: part.to_string(),
        message: err.to_string(),
    }
}

fn get_attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .map(|attr| String::from_utf8_lossy(&attr.value).into_owned())
}

/// Toggle properties are on unless `w:val` says otherwise
fn toggle_on(e: &BytesStart<'_>) -> bool {
    !matches!(get_attr(e, b"w:val").as_deref(), Some("0" | "false" | "off"))
}

/// `styleId` to display name map from `word/styles.xml`
#[derive(Debug, Default)]
struct StyleNames {
    names: HashMap<String, String>,
    default_paragraph: Option<String>,
}

impl StyleNames {
    fn parse(xml: &str) -> Result<Self, LoadError> {
        let mut styles = Self::default();
        let mut reader = Reader::from_str(xml);
        reader.trim_text(true);
        let mut buf = Vec::new();
        // (styleId, is the default paragraph style)
        let mut current: Option<(String, bool)> = None;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) if e.name().as_ref() == b"w:style" => {
                    let id = get_attr(&e, b"w:styleId").unwrap_or_default();
                    let is_default = get_attr(&e, b"w:type").as_deref() == Some("paragraph")
                        && matches!(get_attr(&e, b"w:default").as_deref(), Some("1" | "true" | "on"));
                    current = Some((id, is_default));
                }
                Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == b"w:name" => {
                    if let (Some((id, is_default)), Some(name)) = (&current, get_attr(&e, b"w:val")) {
                        if *is_default {
                            styles.default_paragraph = Some(name.clone());
                        }
                        styles.names.insert(id.clone(), name);
                    }
                }
                Ok(Event::End(e)) if e.name().as_ref() == b"w:style" => current = None,
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(STYLES_PART, e)),
                _ => {}
            }
            buf.clear();
        }
        Ok(styles)
    }

    fn resolve(&self, style_id: Option<&str>) -> String {
        match style_id {
            Some(id) => self.names.get(id).cloned().unwrap_or_else(|| id.to_string()),
            None => self
                .default_paragraph
                .clone()
                .unwrap_or_else(|| "Normal".to_string()),
        }
    }
}

struct OpenParagraph {
    /// Stack depth of the `w:p` element
    depth: usize,
    style_id: Option<String>,
    text: String,
    runs: Vec<Run>,
}

struct OpenRun {
    depth: usize,
    run: Run,
    /// Child of the paragraph itself, not of a hyperlink or field
    direct: bool,
}

struct BodyWalker<'s> {
    styles: &'s StyleNames,
    stack: Vec<Vec<u8>>,
    paragraph: Option<OpenParagraph>,
    run: Option<OpenRun>,
    in_text: bool,
    paragraphs: Vec<Paragraph>,
}

impl<'s> BodyWalker<'s> {
    fn new(styles: &'s StyleNames) -> Self {
        Self {
            styles,
            stack: Vec::new(),
            paragraph: None,
            run: None,
            in_text: false,
            paragraphs: Vec::new(),
        }
    }

    fn walk(mut self, xml: &str) -> Result<Vec<Paragraph>, LoadError> {
        let mut reader = Reader::from_str(xml);
        reader.trim_text(false);
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(e)) => {
                    self.element(&e, false);
                    self.stack.push(e.name().as_ref().to_vec());
                }
                Ok(Event::Empty(e)) => self.element(&e, true),
                Ok(Event::Text(e)) if self.in_text => {
                    let text = e.unescape().map_err(|err| xml_error(DOCUMENT_PART, err))?;
                    self.push_text(&text);
                }
                Ok(Event::End(_)) => self.close(),
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(DOCUMENT_PART, e)),
                _ => {}
            }
            buf.clear();
        }
        Ok(self.paragraphs)
    }

    fn parent_is(&self, name: &[u8]) -> bool {
        self.stack.last().map(Vec::as_slice) == Some(name)
    }

    /// Handle an opening or self-closing element before it is pushed
    fn element(&mut self, e: &BytesStart<'_>, empty: bool) {
        let depth = self.stack.len();
        match e.name().as_ref() {
            b"w:p" if self.paragraph.is_none() && self.parent_is(b"w:body") => {
                let open = OpenParagraph {
                    depth,
                    style_id: None,
                    text: String::new(),
                    runs: Vec::new(),
                };
                if empty {
                    self.finish_paragraph(open);
                } else {
                    self.paragraph = Some(open);
                }
            }
            b"w:pStyle" => {
                let in_ppr = self.parent_is(b"w:pPr");
                if let Some(paragraph) = &mut self.paragraph {
                    if in_ppr && depth == paragraph.depth + 2 {
                        paragraph.style_id = get_attr(e, b"w:val");
                    }
                }
            }
            b"w:r" if !empty && self.run.is_none() => {
                if let Some(paragraph) = &self.paragraph {
                    self.run = Some(OpenRun {
                        depth,
                        run: Run::default(),
                        direct: depth == paragraph.depth + 1,
                    });
                }
            }
            name @ (b"w:b" | b"w:i" | b"w:u" | b"w:vertAlign") => self.run_property(name, e),
            name @ (b"w:t" | b"w:tab" | b"w:br" | b"w:cr" | b"w:noBreakHyphen") => {
                if !self.in_run_content() {
                    return;
                }
                match name {
                    b"w:t" => self.in_text = !empty,
                    b"w:tab" => self.push_text("\t"),
                    b"w:br" => {
                        if matches!(get_attr(e, b"w:type").as_deref(), None | Some("textWrapping")) {
                            self.push_text("\n");
                        }
                    }
                    b"w:cr" => self.push_text("\n"),
                    _ => self.push_text("-"),
                }
            }
            _ => {}
        }
    }

    /// Directly inside the open run
    fn in_run_content(&self) -> bool {
        match &self.run {
            Some(run) => self.stack.len() == run.depth + 1,
            None => false,
        }
    }

    fn run_property(&mut self, name: &[u8], e: &BytesStart<'_>) {
        let depth = self.stack.len();
        let in_rpr = self.parent_is(b"w:rPr");
        let Some(open) = &mut self.run else {
            return;
        };
        if depth != open.depth + 2 || !in_rpr {
            return;
        }
        let run = &mut open.run;
        match name {
            b"w:b" => run.bold = toggle_on(e),
            b"w:i" => run.italic = toggle_on(e),
            b"w:u" => run.underline = get_attr(e, b"w:val").as_deref() != Some("none"),
            _ => {
                let align = get_attr(e, b"w:val");
                run.superscript = align.as_deref() == Some("superscript");
                run.subscript = align.as_deref() == Some("subscript");
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(open) = &mut self.run {
            open.run.text.push_str(text);
        }
        if let Some(paragraph) = &mut self.paragraph {
            paragraph.text.push_str(text);
        }
    }

    fn close(&mut self) {
        let Some(name) = self.stack.pop() else {
            return;
        };
        let depth = self.stack.len();
        match name.as_slice() {
            b"w:t" => self.in_text = false,
            b"w:r" if self.run.as_ref().is_some_and(|r| r.depth == depth) => {
                if let Some(open) = self.run.take() {
                    if let (true, Some(paragraph)) = (open.direct, &mut self.paragraph) {
                        paragraph.runs.push(open.run);
                    }
                }
            }
            b"w:p" if self.paragraph.as_ref().is_some_and(|p| p.depth == depth) => {
                if let Some(open) = self.paragraph.take() {
                    self.finish_paragraph(open);
                }
            }
            _ => {}
        }
    }

    fn finish_paragraph(&mut self, open: OpenParagraph) {
        let style = self.styles.resolve(open.style_id.as_deref());
        self.paragraphs.push(Paragraph {
            text: open.text,
            style,
            runs: open.runs,
        });
    }
}
