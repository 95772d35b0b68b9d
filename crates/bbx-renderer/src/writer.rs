//! Output buffer with line-break cleanup around block output.

use crate::util::BR;

/// Accumulates rendered HTML for one token range.
///
/// Block elements already end a line, so a single line break directly after
/// one (whitespace aside) is dropped instead of producing an empty line.
#[derive(Debug, Default)]
pub(crate) struct HtmlWriter {
    out: String,
    swallow_break: bool,
}

impl HtmlWriter {
    /// Source text, written as-is.
    pub(crate) fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !text.trim().is_empty() {
            self.swallow_break = false;
        }
        self.out.push_str(text);
    }

    /// A source line break.
    pub(crate) fn line_break(&mut self) {
        if self.swallow_break {
            self.swallow_break = false;
        } else {
            self.out.push_str(BR);
        }
    }

    /// Inline markup.
    pub(crate) fn inline(&mut self, html: &str) {
        self.swallow_break = false;
        self.out.push_str(html);
    }

    /// Block markup; the next line break is dropped.
    pub(crate) fn block(&mut self, html: &str) {
        self.out.push_str(html);
        self.swallow_break = true;
    }

    /// Drop trailing line breaks and whitespace, e.g. before a list item.
    pub(crate) fn trim_trailing_breaks(&mut self) {
        loop {
            let trimmed = self.out.trim_end().len();
            self.out.truncate(trimmed);
            if self.out.ends_with(BR) {
                self.out.truncate(self.out.len() - BR.len());
            } else {
                break;
            }
        }
    }

    /// Last character written, used to detect URLs inside generated attributes.
    pub(crate) fn last_char(&self) -> Option<char> {
        self.out.chars().next_back()
    }

    pub(crate) fn finish(self) -> String {
        self.out
    }
}
