// SPDX-License-Identifier: AGPL-3.0-or-later
//! Inline formula shorthand
//!
//! Authors write `{{x^2+y_1}}`: `^` opens a superscript, `_` a subscript, and the
//! region runs until an operator or closing parenthesis. A parenthesis opened
//! inside a region groups its content, so `e^(x+1)` keeps `x+1` raised.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

static FORMULA: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{(.*?)\}\}").expect("valid regex"));

/// Characters that end an open sup/sub region outside a parenthesis group
const REGION_CLOSERS: [char; 7] = ['+', '-', '=', ':', '*', '/', ')'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Region {
    None,
    Sup,
    Sub,
}

impl Region {
    fn close_tag(self) -> &'static str {
        match self {
            Region::None => "",
            Region::Sup => "</sup>",
            Region::Sub => "</sub>",
        }
    }
}

/// Convert the body of one `{{...}}` formula into sup/sub markup
pub fn transpile(formula: &str) -> String {
    let mut out = String::with_capacity(formula.len() + 16);
    let mut region = Region::None;
    let mut grouped = false;

    for c in formula.trim().chars() {
        match c {
            '^' => {
                out.push_str(if region == Region::Sub { "</sub><sup>" } else { "<sup>" });
                region = Region::Sup;
            }
            '_' => {
                out.push_str(if region == Region::Sup { "</sup><sub>" } else { "<sub>" });
                region = Region::Sub;
            }
            _ if region != Region::None => {
                if REGION_CLOSERS.contains(&c) && !grouped {
                    out.push_str(region.close_tag());
                    out.push(c);
                    region = Region::None;
                } else if c == '(' {
                    grouped = true;
                    out.push(c);
                } else if c == ')' {
                    grouped = false;
                    out.push(c);
                    out.push_str(region.close_tag());
                    region = Region::None;
                } else {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }
    out.push_str(region.close_tag());

    out.replace("<sub> </sub>", "")
        .replace("<sup> </sup>", "")
        .replace(' ', "")
}

/// Replace every `{{formula}}` in `text` with its transpiled form wrapped in `<em>`
pub fn expand_formulas(text: &str) -> Cow<'_, str> {
    if !text.contains("{{") {
        return Cow::Borrowed(text);
    }
    FORMULA.replace_all(text, |caps: &Captures<'_>| {
        format!("<em>{}</em>", transpile(&caps[1]))
    })
}
