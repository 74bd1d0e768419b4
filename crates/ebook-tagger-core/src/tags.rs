// SPDX-License-Identifier: AGPL-3.0-or-later
//! Tag renderers
//!
//! Every recognized tag is a [`TagRule`]: a predicate over the normalized
//! paragraph text and a renderer producing the interaction fragment
//! `<div class="TAG" data-interaction="true"><div>{payload}</div>Label</div>`.
//! Rules are tried in order and the first match wins.

use crate::box_text::{format_box_text, format_reference_text, STRONG_CLOSE};
use crate::classifier::TraversalContext;
use crate::document::{Document, Paragraph};
use crate::traits::{ConvertConfig, RenderError};

/// Justified paragraph opener inside a payload
pub const P_OPEN: &str = "%3Cp%20style='text-align:%20justify;'%3E";
/// Paragraph closer plus encoded newline
pub const P_CLOSE: &str = "%3C/p%3E%0A";

const LI_OPEN: &str = "%3Cli%20style='text-align:%20justify;'%3E";
const LI_CLOSE: &str = "%3Cbr%20/%3E%3Cbr%20/%3E%3C/li%3E%0A";

/// Output of one dispatched paragraph
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Single(String),
    Many(Vec<String>),
}

impl Fragment {
    pub fn empty() -> Self {
        Self::Single(String::new())
    }
}

/// Everything a renderer may look at for the current paragraph
#[derive(Debug, Clone, Copy)]
pub struct TagInput<'a> {
    pub document: &'a Document,
    pub config: &'a ConvertConfig,
    /// Normalized, trimmed paragraph text
    pub text: &'a str,
    /// `text` lowercased
    pub lower: &'a str,
    pub index: usize,
    pub next_index: usize,
    /// Paragraphs collected for a block opened at this paragraph
    pub block: &'a [usize],
}

impl<'a> TagInput<'a> {
    pub fn paragraph(&self, index: usize) -> Result<&'a Paragraph, RenderError> {
        self.document
            .paragraph(index)
            .ok_or(RenderError::MissingParagraph { index })
    }

    fn block_paragraphs(
        &self,
    ) -> impl Iterator<Item = Result<(usize, &'a Paragraph), RenderError>> + '_ {
        self.block
            .iter()
            .map(move |&index| self.paragraph(index).map(|p| (index, p)))
    }

    fn box_text(&self, paragraph: &Paragraph) -> String {
        format_box_text(&paragraph.runs, self.config.curly_quotes)
    }
}

pub type RenderFn = fn(&TagInput<'_>, &mut TraversalContext) -> Result<Fragment, RenderError>;

pub struct TagRule {
    pub name: &'static str,
    pub matches: fn(text: &str, lower: &str) -> bool,
    pub render: RenderFn,
}

impl std::fmt::Debug for TagRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TagRule").field("name", &self.name).finish()
    }
}

/// Recognized tags in precedence order
#[rustfmt::skip]
pub static TAG_RULES: &[TagRule] = &[
    TagRule { name: "unidade", matches: is_unit_title, render: render_unit_title },
    TagRule { name: "numbered-heading", matches: is_numbered_heading, render: render_numbered_heading },
    TagRule { name: "introducao", matches: |_, l| l.contains("#introdução#"), render: render_introduction },
    TagRule { name: "conclusao", matches: |_, l| l.contains("#conclusão#"), render: render_conclusion },
    TagRule { name: "referencias", matches: |_, l| l.contains("#referências#"), render: render_references },
    TagRule {
        name: "destaque",
        matches: |_, l| l.contains("#apresentação#") || l.contains("#destaque#"),
        render: render_highlight,
    },
    TagRule { name: "citacao", matches: |_, l| l.contains("#citação#"), render: render_quotation },
    TagRule { name: "caixa", matches: |_, l| l.contains("#caixa#"), render: render_box_list },
    TagRule { name: "glossario", matches: |_, l| l.contains("#glossário#"), render: render_glossary },
    TagRule { name: "video", matches: |_, l| l.contains("#video#"), render: render_video },
    TagRule { name: "figura", matches: |_, l| l.starts_with("figura "), render: render_figure },
    TagRule { name: "quadro", matches: |_, l| l.starts_with("quadro "), render: render_table },
    TagRule { name: "reflita", matches: |_, l| l.contains("#reflita#"), render: render_reflect },
    TagRule { name: "saiba-mais", matches: |_, l| l.contains("#saiba mais#"), render: render_learn_more },
    TagRule { name: "atencao", matches: |_, l| l.contains("#atenção#"), render: render_attention },
    TagRule { name: "dica", matches: |_, l| l.contains("#dica#"), render: render_tip },
    TagRule { name: "tecnico", matches: |_, l| l.contains("#técnico#"), render: render_technical },
    TagRule { name: "green-box", matches: |_, l| green_box_title(l).is_some(), render: render_green_box },
    TagRule { name: "blue-box", matches: |_, l| blue_box_title(l).is_some(), render: render_blue_box },
    TagRule {
        name: "infografico",
        matches: |_, l| l.contains("#infográfico interativo#"),
        render: render_infographic,
    },
    TagRule { name: "forca", matches: |_, l| l.starts_with("#forca"), render: render_hangman },
];

/// First rule matching the paragraph, if any
pub fn find_rule(text: &str, lower: &str) -> Option<&'static TagRule> {
    TAG_RULES.iter().find(|rule| (rule.matches)(text, lower))
}

fn open_div(class: &str, payload_start: &str) -> String {
    format!(r#"<div class="{class}" data-interaction="true"><div>{payload_start}"#)
}

/// Remove every ASCII-case-insensitive occurrence of `marker`, then trim
fn strip_marker(text: &str, marker: &str) -> String {
    let folded = text.to_ascii_lowercase();
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (start, _) in folded.match_indices(marker) {
        out.push_str(&text[last..start]);
        last = start + marker.len();
    }
    out.push_str(&text[last..]);
    out.trim().to_string()
}

/// Segment between the first and second `:` of a paragraph's raw text
fn colon_segment(index: usize, paragraph: &Paragraph) -> Result<&str, RenderError> {
    paragraph
        .text
        .split(':')
        .nth(1)
        .ok_or_else(|| RenderError::MissingColon {
            index,
            text: paragraph.text.clone(),
        })
}

fn is_unit_title(text: &str, _lower: &str) -> bool {
    text.to_uppercase().starts_with("UNIDADE")
}

fn render_unit_title(
    input: &TagInput<'_>,
    _ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    Ok(Fragment::Single(format!(
        r#"<h2 class="title-vg">{}</h2>"#,
        input.text.to_uppercase()
    )))
}

fn is_numbered_heading(text: &str, _lower: &str) -> bool {
    text.starts_with(|c: char| c.is_ascii_digit()) && text.contains(char::is_whitespace)
}

fn render_numbered_heading(
    input: &TagInput<'_>,
    _ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    let Some((number, title)) = input.text.split_once(char::is_whitespace) else {
        return Ok(Fragment::empty());
    };
    let html = match number.replace('.', "").chars().count() {
        1 => format!(r#"<h4 class="subtitlei-vg">{title}</h4>"#),
        2 => format!(r#"<p></p><h5 class="subtitleii-vg">{title}</h5>"#),
        _ => format!(r#"<p></p><h6 class="subtitleiii-vg">{title}</h6>"#),
    };
    Ok(Fragment::Single(html))
}

/// Block whose body is the justified box text of each collected paragraph
fn paragraph_box(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
    class: &str,
    payload_start: &str,
    payload_end: &str,
) -> Result<Fragment, RenderError> {
    let mut out = open_div(class, payload_start);
    for item in input.block_paragraphs() {
        let (_, paragraph) = item?;
        out.push_str(P_OPEN);
        out.push_str(&input.box_text(paragraph));
        out.push_str(P_CLOSE);
    }
    ctx.claim(input.block.iter().copied());
    out.push_str(payload_end);
    Ok(Fragment::Single(out))
}

fn render_introduction(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    paragraph_box(input, ctx, "L-INTRODUCAO", r#"{"texto":""#, r#""}</div>Introdução</div>"#)
}

fn render_conclusion(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    paragraph_box(input, ctx, "L-CONCLUSION", r#"{"texto":""#, r#""}</div>Conclusão</div>"#)
}

fn render_highlight(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    paragraph_box(input, ctx, "D-DESTAQUE", r#"{"destaque":""#, r#""}</div>Destaque</div>"#)
}

fn render_quotation(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    paragraph_box(input, ctx, "D-CDIRETA", r#"{"texto":""#, r#""}</div>Recuo</div>"#)
}

fn render_reflect(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    paragraph_box(
        input,
        ctx,
        "B-REFLITA",
        r#"{"conteudo":""#,
        r#"","link":"","pdf":""}</div>Reflita</div>"#,
    )
}

fn render_attention(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    paragraph_box(input, ctx, "U-ATENCAO", r#"{"conteudo":""#, r#"","pdf":""}</div>Atenção</div>"#)
}

fn render_tip(input: &TagInput<'_>, ctx: &mut TraversalContext) -> Result<Fragment, RenderError> {
    paragraph_box(input, ctx, "B-DICA", r#"{"conteudo":""#, r#"","imagem":""}</div>Dica</div>"#)
}

fn render_technical(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    paragraph_box(input, ctx, "D-PROGRAMACAO", r#"{"texto":""#, r#""}</div>Técnico</div>"#)
}

fn green_box_title(lower: &str) -> Option<&'static str> {
    if lower.contains("#dica de livro#") {
        Some("Dica de Livro")
    } else if lower.contains("#dica de leitura#") {
        Some("Dica de Leitura")
    } else if lower.contains("#dica do professor#") {
        Some("Dica do Professor(a)")
    } else {
        None
    }
}

fn render_green_box(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    let title = green_box_title(input.lower).unwrap_or_default();
    let start = format!(r#"{{"titulo":"{title}","conteudo":""#);
    let end = format!(
        r#"","imagem":"{}"}}</div>Esquerda</div>"#,
        input.config.green_box_image
    );
    paragraph_box(input, ctx, "B-GREEN", &start, &end)
}

fn render_references(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    let mut out = open_div("L-REFERENCIASBB", r#"{"texto":""#);
    for item in input.block_paragraphs() {
        let (index, paragraph) = item?;
        let mut entry = format!("{P_OPEN}{}{P_CLOSE}", format_reference_text(&paragraph.runs));
        if entry.contains("<>") {
            let link = paragraph
                .text
                .split_once('<')
                .map(|(_, rest)| rest.split('>').next().unwrap_or_default())
                .ok_or(RenderError::MissingLinkDelimiters { index })?;
            let anchor = format!(
                "%3Ca%20href='{link}'%20target='_blank'%20rel='noopener'%3E{link}%3C/a%3E"
            );
            entry = entry.replace("<>", &anchor);
        }
        out.push_str(&entry);
    }
    ctx.claim(input.block.iter().copied());
    out.push_str(r#""}</div>Referências Bibliográficas</div><p></p>"#);
    Ok(Fragment::Single(out))
}

fn render_box_list(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    let mut out = open_div("D-CAIXA", r#"{"caixa":""#);
    for (position, item) in input.block_paragraphs().enumerate() {
        let (_, paragraph) = item?;
        let text = input.box_text(paragraph);
        if position == 0 {
            out.push_str(&format!("{P_OPEN}{text}%3C/p%3E%0A%3Cul%3E%0A"));
        } else {
            out.push_str(&format!("{LI_OPEN}{text}{LI_CLOSE}"));
        }
    }
    ctx.claim(input.block.iter().copied());
    out.push_str(r#"%3C/ul%3E"}</div>Caixa</div>"#);
    Ok(Fragment::Single(out))
}

fn render_glossary(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    let mut out = open_div("U-SEARCHBLOCK", r#"{"title":"Glossário","conteudo":"%3Col%3E%0A"#);
    for item in input.block_paragraphs() {
        let (_, paragraph) = item?;
        let entry = input
            .box_text(paragraph)
            .replacen(": ", &format!(": {STRONG_CLOSE}"), 1);
        out.push_str(&format!("{LI_OPEN}%3Cstrong%3E{entry}{LI_CLOSE}"));
    }
    ctx.claim(input.block.iter().copied());
    out.push_str(r#"%3C/ol%3E"}</div>Bloco Busca</div>"#);
    Ok(Fragment::Single(out))
}

fn video_fragment(link: &str) -> String {
    format!(
        r#"<div class="T-VIDEO" data-interaction="true"><div>{{"link":"{link}","video":"","pdf":""}}</div>Vídeo</div>"#
    )
}

fn render_video(
    input: &TagInput<'_>,
    _ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    Ok(Fragment::Single(video_fragment(&strip_marker(input.text, "#video#"))))
}

fn render_learn_more(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    let mut out = open_div("U-SAIBAMAIS", r#"{"conteudo":""#);
    for item in input.block_paragraphs() {
        let (index, paragraph) = item?;
        ctx.claim([index]);
        if paragraph.text.starts_with("http") {
            out.push_str(&format!(
                r#"","link":"{}","pdf":""}}</div>Saiba Mais</div>"#,
                paragraph.text
            ));
            return Ok(Fragment::Single(out));
        }
        out.push_str(&format!("{P_OPEN}{}{P_CLOSE}", input.box_text(paragraph)));
    }
    out.push_str(r#"","link":"","pdf":""}</div>Saiba Mais</div>"#);
    Ok(Fragment::Single(out))
}

fn blue_box_title(lower: &str) -> Option<&'static str> {
    if lower.contains("#indicação de filme#") || lower.contains("#dica de filme#") {
        Some("Indicação de Filme")
    } else if lower.contains("#na web#") {
        Some("Na Web")
    } else {
        None
    }
}

fn render_blue_box(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    let title = blue_box_title(input.lower).unwrap_or_default();
    let mut out = open_div("B-BLUE", &format!(r#"{{"titulo":"{title}","conteudo":""#));
    let mut link = "";
    for item in input.block_paragraphs() {
        let (_, paragraph) = item?;
        if paragraph.text.contains("http") {
            link = paragraph.text.as_str();
        } else {
            out.push_str(&format!("{P_OPEN}{}{P_CLOSE}", input.box_text(paragraph)));
        }
    }
    ctx.claim(input.block.iter().copied());
    out.push_str(&format!(
        r#"","imagem":"{}"}}</div>Direita</div>"#,
        input.config.blue_box_image
    ));
    out.push_str(&video_fragment(link));
    Ok(Fragment::Single(out))
}

/// Title and source of a figure or table: the marker line and the line after it
fn caption_and_source<'a>(
    input: &TagInput<'a>,
    ctx: &mut TraversalContext,
) -> Result<(&'a str, &'a str), RenderError> {
    let caption = input.paragraph(input.index)?;
    let source_line = input.paragraph(input.index + 1)?;
    let title = colon_segment(input.index, caption)?;
    let source = colon_segment(input.index + 1, source_line)?;
    ctx.consume(input.next_index);
    ctx.claim([input.next_index]);
    Ok((title, source))
}

fn render_figure(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    let (title, source) = caption_and_source(input, ctx)?;
    let embedded = if input.config.embed_media_images {
        ctx.next_media(input.document).map(|image| image.data_uri())
    } else {
        None
    };
    let image = embedded.unwrap_or_else(|| input.config.figure_placeholder.clone());
    Ok(Fragment::Single(format!(
        r#"<div class="T-FIGURA" data-interaction="true"><div>{{"titulo":"{title}","fonte":"{source}","accessibility":"{title}","imagem":"{image}"}}</div>Figura</div>"#
    )))
}

fn render_table(input: &TagInput<'_>, ctx: &mut TraversalContext) -> Result<Fragment, RenderError> {
    let (title, source) = caption_and_source(input, ctx)?;
    let table = &input.config.table_placeholder;
    Ok(Fragment::Single(format!(
        r#"<div class="T-QUADRO" data-interaction="true"><div>{{"titulo":"{title}","fonte":"{source}","texto":"{table}","accessibility":"{title}","quadro":""}}</div>Quadro</div>"#
    )))
}

/// One accordion per collected paragraph, joined into a single fragment so
/// repeated items are kept
fn render_infographic(
    input: &TagInput<'_>,
    ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    let mut items = Vec::with_capacity(input.block.len());
    for item in input.block_paragraphs() {
        let (index, paragraph) = item?;
        let text = input.box_text(paragraph);
        let (title, body) = text.split_once(':').ok_or_else(|| RenderError::MissingColon {
            index,
            text: paragraph.text.clone(),
        })?;
        items.push(format!(
            r#"<div class="I-ZSANFONA" data-interaction="true"><div>{{"titulo":"<strong>{title}:</strong>","conteudo":"{P_OPEN}{body}{P_CLOSE}"}}</div>Sanfona</div>"#
        ));
    }
    ctx.claim(input.block.iter().copied());
    Ok(Fragment::Single(items.join("\n")))
}

fn render_hangman(
    input: &TagInput<'_>,
    _ctx: &mut TraversalContext,
) -> Result<Fragment, RenderError> {
    let word = strip_marker(input.text, "#forca");
    Ok(Fragment::Single(format!(
        r#"<div class="I-JOGOFORCA" data-interaction="true"><div>{{"palavra":"{word}"}}</div>Forca</div><p></p>"#
    )))
}
