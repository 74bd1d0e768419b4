// SPDX-License-Identifier: AGPL-3.0-or-later
//! Rendering of paragraphs no tag rule claimed

use crate::document::Document;
use crate::formula::expand_formulas;
use crate::inline::{collapse_markers, format_runs};
use crate::tags::Fragment;

const JUSTIFIED_OPEN: &str = r#"<p style="text-align: justify;">"#;
const EMPTY_JUSTIFIED: &str = r#"<p style="text-align: justify;"></p>"#;

/// Render the paragraph just classified, i.e. the one at `next_index - 1`.
///
/// List styles become list items, other paragraphs justified `<p>` elements
/// (or a bare `<p>` when blank). Embedded line breaks split the output into
/// one fragment per line.
pub fn render_plain(document: &Document, next_index: usize) -> Fragment {
    let Some(paragraph) = next_index
        .checked_sub(1)
        .and_then(|index| document.paragraph(index))
    else {
        return Fragment::empty();
    };

    let body = format_runs(&paragraph.runs);
    let wrapped = if paragraph.is_list() {
        format!(r#"<li style="text-align: justify;">{body}<br/><br/></li>"#)
    } else if body.trim().is_empty() {
        format!("<p>{body}</p>")
    } else {
        format!("{JUSTIFIED_OPEN}{body}</p>")
    };

    let split = wrapped.contains('\n');
    let lines = wrapped.replace('\n', &format!("</p>\n{JUSTIFIED_OPEN}"));
    let html = expand_formulas(&collapse_markers(&lines)).into_owned();

    if split {
        Fragment::Many(
            html.split('\n')
                .map(|line| line.replace(EMPTY_JUSTIFIED, "<p></p>"))
                .collect(),
        )
    } else {
        Fragment::Single(html)
    }
}
