// SPDX-License-Identifier: AGPL-3.0-or-later
//! Run formatting for paragraphs rendered outside tag blocks

use crate::document::Run;
use crate::formula::expand_formulas;

/// Boundaries left between adjacent runs sharing a style, applied in order
pub(crate) const COLLAPSE_RULES: [(&str, &str); 10] = [
    ("<strong><strong>", "<strong>"),
    ("</strong></strong>", "</strong>"),
    ("</strong><strong>", ""),
    ("</strong> <strong>", " "),
    ("</strong></em><em><strong>", ""),
    ("<em><em>", "<em>"),
    ("</em></em>", "</em>"),
    ("</em> </em>", " "),
    ("</em> <em>", " "),
    ("</em><em>", ""),
];

fn wrap(tag: &str, text: &str) -> String {
    format!("<{tag}>{text}</{tag}>")
}

/// Markup for a single run
///
/// Sub/superscript takes precedence over the emphasis flags. Bold, italic and
/// underline stack in that order, so bold ends up innermost.
pub fn format_run(run: &Run) -> String {
    if (run.subscript || run.superscript) && !run.is_single_space() {
        let tag = if run.subscript { "sub" } else { "sup" };
        return wrap(tag, &run.text);
    }

    let mut text = run.text.clone();
    if run.bold && !run.is_single_space() {
        text = wrap("strong", &text);
    }
    if run.italic && !run.is_single_space() {
        text = wrap("em", &text);
    }
    if run.underline {
        text = wrap("u", &text);
    }
    text
}

/// Concatenated markup of all runs, without post-processing
pub fn format_runs(runs: &[Run]) -> String {
    runs.iter().map(format_run).collect()
}

/// Merge redundant marker boundaries between adjacent runs
pub fn collapse_markers(text: &str) -> String {
    COLLAPSE_RULES
        .iter()
        .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Full inline pipeline: runs, marker collapse, then formula expansion
pub fn render_inline(runs: &[Run]) -> String {
    let collapsed = collapse_markers(&format_runs(runs));
    expand_formulas(&collapsed).into_owned()
}
