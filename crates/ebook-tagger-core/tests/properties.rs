// SPDX-License-Identifier: AGPL-3.0-or-later
//! Property-based checks of the conversion driver

mod common;

use common::DocxBuilder;
use ebook_tagger_core::{convert, convert_bytes, Converter, Document, Paragraph, Run};
use proptest::prelude::*;

/// Paragraph texts mixing markers, headings, figures and ordinary prose
fn paragraph_text() -> impl Strategy<Value = String> {
    prop_oneof![
        prop::sample::select(vec![
            "#Introdução#",
            "#Conclusão#",
            "#Dica#",
            "#Caixa#",
            "#Glossário#",
            "#Saiba Mais#",
            "#Na Web#",
            "#Dica de Livro#",
            "#Infográfico Interativo#",
            "#Video#https://youtu.be/abc",
            "#Forca PALAVRA",
            "%nota #Reflita# fim",
            "UNIDADE 2",
            "1 Título",
            "1.2 Subtítulo",
            "Figura 1: Legenda",
            "Fonte: Autor (2024)",
            "Termo: definição",
            "https://exemplo.org",
            "",
            "   ",
            "Texto comum.",
            "Texto comum.",
        ])
        .prop_map(str::to_string),
        "[a-zA-Z ,.\"%{}^_:]{0,40}",
    ]
}

fn paragraph() -> impl Strategy<Value = Paragraph> {
    (paragraph_text(), any::<bool>(), any::<bool>()).prop_map(|(text, bold, italic)| {
        let mut run = Run::new(text);
        run.bold = bold;
        run.italic = italic;
        Paragraph::from_runs(vec![run])
    })
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::vec(paragraph(), 0..24).prop_map(Document::new)
}

#[test]
fn proptest_conversion_is_deterministic() {
    proptest!(|(doc in document())| {
        prop_assert_eq!(convert(&doc), convert(&doc));
    });
}

#[test]
fn proptest_no_consecutive_duplicate_lines() {
    proptest!(|(doc in document())| {
        if let Ok(lines) = Converter::default().convert_lines(&doc) {
            for pair in lines.windows(2) {
                prop_assert_ne!(&pair[0], &pair[1]);
            }
        }
    });
}

#[test]
fn proptest_docx_bytes_convert_identically() {
    proptest!(ProptestConfig::with_cases(32), |(texts in prop::collection::vec(paragraph_text(), 0..12))| {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let bytes = DocxBuilder::new().lines(&refs).build();
        let first = convert_bytes(&bytes).map_err(|e| e.to_string());
        let second = convert_bytes(&bytes).map_err(|e| e.to_string());
        prop_assert_eq!(first, second);
    });
}

#[test]
fn proptest_arbitrary_bytes_never_panic() {
    proptest!(|(bytes in prop::collection::vec(any::<u8>(), 0..256))| {
        let _ = convert_bytes(&bytes);
    });
}
