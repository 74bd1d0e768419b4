// SPDX-License-Identifier: AGPL-3.0-or-later
//! In-memory DOCX fixtures

#![allow(dead_code)]

use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// One `w:r` element; `props` is the raw content of `w:rPr`
pub fn run(text: &str, props: &str) -> String {
    format!(
        r#"<w:r><w:rPr>{props}</w:rPr><w:t xml:space="preserve">{}</w:t></w:r>"#,
        escape(text)
    )
}

pub fn bold(text: &str) -> String {
    run(text, "<w:b/>")
}

pub fn italic(text: &str) -> String {
    run(text, "<w:i/>")
}

pub fn plain(text: &str) -> String {
    run(text, "")
}

#[derive(Debug, Default)]
pub struct DocxBuilder {
    body: String,
    styles: String,
    media: Vec<(String, Vec<u8>)>,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Paragraph with a single unstyled run
    pub fn text(self, text: &str) -> Self {
        let runs = if text.is_empty() { String::new() } else { plain(text) };
        self.runs(&runs)
    }

    pub fn lines(self, lines: &[&str]) -> Self {
        lines.iter().fold(self, |builder, line| builder.text(line))
    }

    /// Paragraph made of pre-built run elements
    pub fn runs(mut self, runs: &str) -> Self {
        self.body.push_str(&format!("<w:p>{runs}</w:p>"));
        self
    }

    /// Paragraph using a named style, registered in `styles.xml`
    pub fn styled(mut self, style_id: &str, style_name: &str, runs: &str) -> Self {
        self.styles.push_str(&format!(
            r#"<w:style w:type="paragraph" w:styleId="{style_id}"><w:name w:val="{style_name}"/></w:style>"#
        ));
        self.body.push_str(&format!(
            r#"<w:p><w:pPr><w:pStyle w:val="{style_id}"/></w:pPr>{runs}</w:p>"#
        ));
        self
    }

    pub fn raw(mut self, xml: &str) -> Self {
        self.body.push_str(xml);
        self
    }

    pub fn media(mut self, name: &str, data: &[u8]) -> Self {
        self.media.push((format!("word/media/{name}"), data.to_vec()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        zip.start_file("word/document.xml", options).unwrap();
        write!(
            zip,
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{W_NS}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
            self.body
        )
        .unwrap();

        zip.start_file("word/styles.xml", options).unwrap();
        write!(
            zip,
            r#"<w:styles xmlns:w="{W_NS}"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>{}</w:styles>"#,
            self.styles
        )
        .unwrap();

        for (name, data) in &self.media {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }
}
