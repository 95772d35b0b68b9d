//! Lists: `[list]` (unordered), `[list=x]` (ordered), `[*]` items.
//!
//! Both kinds render as `<ol>`; unordered lists carry the `unordered` class.
//! Text between the opening tag and the first item is promoted to a separate
//! title element before the list.

use crate::lexer::{Tag, Token};
use crate::renderer::{Document, Frame, Walker};
use crate::util::trim_breaks;

const ORDERED_OPEN: &str = "<ol>";
const UNORDERED_OPEN: &str = r#"<ol class="unordered">"#;

impl Walker<'_> {
    pub(crate) fn open_list(
        &mut self,
        doc: &Document<'_, '_>,
        f: &mut Frame,
        i: usize,
        attr: Option<&str>,
        raw: &str,
    ) -> usize {
        let open = if attr.is_some() {
            ORDERED_OPEN
        } else {
            UNORDERED_OPEN
        };

        if let Some(item) = leading_item(doc.tokens, i + 1, f.end) {
            f.w.inline(open);
            f.w.inline("<li>");
            f.list_depth += 1;
            return item + 1;
        }

        let next_item = doc.first_open(Tag::ListItem, i + 1, f.end);
        let list_close = doc.first_close(Tag::List, i + 1, f.end);
        let Some(title_end) = next_item.into_iter().chain(list_close).min() else {
            f.literal(raw);
            return i + 1;
        };
        let Some(scope) = self.nested(f, raw) else {
            f.literal(raw);
            return i + 1;
        };

        let title = self.render_range(doc, i + 1, title_end, scope);
        let title = trim_breaks(title.trim());
        if !title.is_empty() {
            f.w.inline(&format!(
                r#"<ul class="bbcode__list-title"><li>{title}</li></ul>"#
            ));
        }
        f.w.inline(open);
        f.list_depth += 1;
        title_end
    }
}

impl Frame {
    /// `[*]`; literal outside a list.
    pub(crate) fn list_item(&mut self, raw: &str) {
        if self.list_depth == 0 {
            self.literal(raw);
            return;
        }
        self.w.trim_trailing_breaks();
        self.w.inline("<li>");
    }

    /// `[/*]`; literal outside a list.
    pub(crate) fn close_list_item(&mut self, raw: &str) {
        if self.list_depth == 0 {
            self.literal(raw);
            return;
        }
        self.w.inline("</li>");
    }

    /// `[/list]`; literal outside a list.
    pub(crate) fn close_list(&mut self, raw: &str) {
        if self.list_depth == 0 {
            self.literal(raw);
            return;
        }
        self.w.trim_trailing_breaks();
        self.w.block("</ol>");
        self.list_depth -= 1;
    }
}

/// Position of a `[*]` directly after the opening tag, allowing at most one
/// line break and surrounding whitespace in between.
fn leading_item(tokens: &[Token<'_>], start: usize, end: usize) -> Option<usize> {
    let skip_blank = |mut j: usize| {
        while j < end && tokens[j].is_blank() {
            j += 1;
        }
        j
    };

    let mut j = skip_blank(start);
    if j < end && tokens[j] == Token::Break {
        j = skip_blank(j + 1);
    }
    (j < end && tokens[j].is_open(Tag::ListItem)).then_some(j)
}
