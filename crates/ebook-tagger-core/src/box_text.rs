// SPDX-License-Identifier: AGPL-3.0-or-later
//! Percent-encoded run formatting for tag-block payloads
//!
//! Payload bodies travel inside a JSON-like string, so markup is written with
//! `%3C`/`%3E` instead of angle brackets and literal `%` becomes `%25`.

use crate::document::Run;
use crate::inline::COLLAPSE_RULES;
use crate::quotes::QuoteBalancer;
use once_cell::sync::Lazy;
use std::borrow::Cow;

pub const STRONG_OPEN: &str = "%3Cstrong%3E";
pub const STRONG_CLOSE: &str = "%3C/strong%3E";
pub const EM_OPEN: &str = "%3Cem%3E";
pub const EM_CLOSE: &str = "%3C/em%3E";
pub const UNDERLINE_OPEN: &str = "%3Cspan%20style=%22text-decoration:%20underline;%22%3E";
pub const UNDERLINE_CLOSE: &str = "%3C/span%3E";

/// Adjacent underlined runs leave a close/open pair behind
static UNDERLINE_SEAM: Lazy<String> = Lazy::new(|| format!("{UNDERLINE_CLOSE}{UNDERLINE_OPEN}"));

/// `COLLAPSE_RULES` with angle brackets percent-encoded
static ENCODED_COLLAPSE_RULES: Lazy<Vec<(String, String)>> = Lazy::new(|| {
    COLLAPSE_RULES
        .iter()
        .map(|(from, to)| (encode_brackets(from), encode_brackets(to)))
        .collect()
});

/// Soft line breaks inside a payload become an encoded newline
fn encode_newlines(text: &str) -> String {
    text.replace('\n', "%0A")
}

fn encode_brackets(markup: &str) -> String {
    markup.replace('<', "%3C").replace('>', "%3E")
}

pub fn escape_percent(text: &str) -> Cow<'_, str> {
    if text.contains('%') {
        Cow::Owned(text.replace('%', "%25"))
    } else {
        Cow::Borrowed(text)
    }
}

/// How a run is treated inside a box, by flag priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BoxStyle {
    Wrapped(&'static str, &'static str),
    Escaped,
    Untouched,
}

static UNDERLINE_STRONG_EM: Lazy<(String, String)> = Lazy::new(|| {
    (
        format!("{UNDERLINE_OPEN}{STRONG_OPEN}{EM_OPEN}"),
        format!("{EM_CLOSE}{STRONG_CLOSE}{UNDERLINE_CLOSE}"),
    )
});
static UNDERLINE_STRONG: Lazy<(String, String)> = Lazy::new(|| {
    (
        format!("{UNDERLINE_OPEN}{STRONG_OPEN}"),
        format!("{STRONG_CLOSE}{UNDERLINE_CLOSE}"),
    )
});
static STRONG_EM: Lazy<(String, String)> = Lazy::new(|| {
    (
        format!("{STRONG_OPEN}{EM_OPEN}"),
        format!("{EM_CLOSE}{STRONG_CLOSE}"),
    )
});

fn pair(p: &'static Lazy<(String, String)>) -> BoxStyle {
    BoxStyle::Wrapped(p.0.as_str(), p.1.as_str())
}

fn box_style(run: &Run) -> BoxStyle {
    let space = run.is_single_space();
    match (run.bold, run.italic, run.underline) {
        (true, true, true) => pair(&UNDERLINE_STRONG_EM),
        (true, _, true) => pair(&UNDERLINE_STRONG),
        (true, true, false) if !space => pair(&STRONG_EM),
        (true, _, false) if !space => BoxStyle::Wrapped(STRONG_OPEN, STRONG_CLOSE),
        (false, true, _) if !space => BoxStyle::Wrapped(EM_OPEN, EM_CLOSE),
        (false, _, true) => BoxStyle::Wrapped(UNDERLINE_OPEN, UNDERLINE_CLOSE),
        (false, false, false) => BoxStyle::Escaped,
        _ => BoxStyle::Untouched,
    }
}

/// Box markup for one run; quotes are balanced before `%` is escaped
pub fn format_box_run(run: &Run, quotes: &mut QuoteBalancer) -> String {
    match box_style(run) {
        BoxStyle::Wrapped(open, close) => {
            let (text, _) = quotes.balance(&run.text);
            format!("{open}{}{close}", escape_percent(&text))
        }
        BoxStyle::Escaped => {
            let (text, _) = quotes.balance(&run.text);
            escape_percent(&text).into_owned()
        }
        BoxStyle::Untouched => run.text.clone(),
    }
}

/// Box markup for a whole paragraph; quote parity is scoped to this call
pub fn format_box_text(runs: &[Run], curly_quotes: bool) -> String {
    let mut quotes = QuoteBalancer::new(curly_quotes);
    let text: String = runs
        .iter()
        .map(|run| format_box_run(run, &mut quotes))
        .collect();
    encode_newlines(&text.replace(UNDERLINE_SEAM.as_str(), ""))
}

/// Bold/italic-only box markup used by bibliographic references
///
/// References keep `%` and quotes verbatim and ignore underline.
pub fn format_reference_text(runs: &[Run]) -> String {
    let text: String = runs
        .iter()
        .map(|run| {
            let mut text = run.text.clone();
            if run.bold && !run.is_single_space() {
                text = format!("{STRONG_OPEN}{text}{STRONG_CLOSE}");
            }
            if run.italic && !run.is_single_space() {
                text = format!("{EM_OPEN}{text}{EM_CLOSE}");
            }
            text
        })
        .collect();
    encode_newlines(&collapse_encoded_markers(&text))
}

pub fn collapse_encoded_markers(text: &str) -> String {
    ENCODED_COLLAPSE_RULES
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from.as_str(), to))
}
