// SPDX-License-Identifier: AGPL-3.0-or-later
//! Double-quote parity tracking for box text
//!
//! Parity flips once per run that contains a quote, not once per quote glyph:
//! a run holding `"a" "b"` counts as a single opening.

use std::borrow::Cow;

const OPEN_CURLY: &str = "\u{201c}";
const CLOSE_CURLY: &str = "\u{201d}";

/// Treatment applied to the quotes of one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteMark {
    Open,
    Close,
}

/// Paragraph-scoped quote parity
#[derive(Debug, Clone, Default)]
pub struct QuoteBalancer {
    count: u32,
    curly: bool,
}

impl QuoteBalancer {
    pub fn new(curly: bool) -> Self {
        Self { count: 0, curly }
    }

    /// Record one run. Returns the run text with its quotes normalized and
    /// the treatment it received, or `None` when the run has no quote.
    pub fn balance<'a>(&mut self, text: &'a str) -> (Cow<'a, str>, Option<QuoteMark>) {
        if !text.contains('"') {
            return (Cow::Borrowed(text), None);
        }
        let mark = if self.count % 2 == 0 {
            self.count += 1;
            QuoteMark::Open
        } else {
            self.count -= 1;
            QuoteMark::Close
        };
        let text = if self.curly {
            let glyph = match mark {
                QuoteMark::Open => OPEN_CURLY,
                QuoteMark::Close => CLOSE_CURLY,
            };
            Cow::Owned(text.replace('"', glyph))
        } else {
            Cow::Borrowed(text)
        };
        (text, Some(mark))
    }
}
