//! Collapsible containers: `[box=label]` and `[spoilerbox]`.
//!
//! `[box]` nests arbitrarily and matches its close by depth. `[spoilerbox]`
//! does not nest and ends at the first `[/spoilerbox]`. Both share one failure
//! policy: an opening tag without a close stays literal, and every later tag of
//! the same kind in that range stays literal too.

use crate::html;
use crate::lexer::{Tag, Token};
use crate::renderer::{Document, Frame, Walker};
use crate::util::trim_breaks;

/// Label of every `[spoilerbox]`.
const SPOILER_LABEL: &str = "SPOILER";

/// Id kind for containers.
const BOX_ID_KIND: &str = "box";

/// Pair every `[box=...]` opening tag with its closing tag.
///
/// Returns, per token position, the position of the matching `[/box]` for
/// opening tags that have one. The first opening tag without a close ends
/// matching for the whole document: every box opened after it has no close
/// either, whatever range it is later rendered in.
pub(crate) fn match_boxes(tokens: &[Token<'_>]) -> Vec<Option<usize>> {
    let mut ends = vec![None; tokens.len()];
    let mut open = Vec::new();
    let mut cutoff = None;

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Open {
                tag: Tag::Box,
                attr: Some(_),
                ..
            } => open.push(i),
            // An unterminated label swallows the rest of the input.
            Token::Open {
                tag: Tag::Box,
                attr: None,
                ..
            } => {
                cutoff = Some(i);
                break;
            }
            Token::Close { tag: Tag::Box, .. } => {
                if let Some(start) = open.pop() {
                    ends[start] = Some(i);
                }
            }
            _ => {}
        }
    }

    // Still open: the bottom of the stack is the earliest unmatched box.
    if let Some(&first) = open.first() {
        cutoff = Some(first);
    }
    if let Some(cutoff) = cutoff {
        for end in &mut ends[cutoff..] {
            *end = None;
        }
    }

    ends
}

impl Walker<'_> {
    /// `[box=label]`: body first (inner containers get their ids first), then
    /// the label, then the container itself.
    pub(crate) fn open_box(
        &mut self,
        doc: &Document<'_, '_>,
        f: &mut Frame,
        i: usize,
        label: Option<&str>,
        raw: &str,
    ) -> usize {
        let matched = match (label, doc.box_ends[i]) {
            (Some(label), Some(close)) if !f.boxes_disabled && close < f.end => {
                Some((label, close))
            }
            _ => None,
        };
        let Some((label, close)) = matched else {
            if !f.boxes_disabled {
                f.boxes_disabled = true;
                self.ctx.warn(format!("Container is never closed: {raw}"));
            }
            f.literal(raw);
            return i + 1;
        };
        let Some(scope) = self.nested(f, raw) else {
            f.literal(raw);
            return i + 1;
        };

        let body = self.render_range(doc, i + 1, close, scope);
        self.ctx.count_box(label);
        let id = self.ids.generate_id(BOX_ID_KIND);
        let label = self.render_fragment(label, scope);
        let visibility = self.boxes.lookup_box_state(&id);

        f.w.block(&html::spoiler_box(&label, trim_breaks(&body), &id, visibility));
        close + 1
    }

    /// `[spoilerbox]`: body up to the first close.
    pub(crate) fn open_spoilerbox(
        &mut self,
        doc: &Document<'_, '_>,
        f: &mut Frame,
        i: usize,
        raw: &str,
    ) -> usize {
        let close = doc
            .first_close(Tag::SpoilerBox, i + 1, f.end)
            .filter(|_| !f.spoilerboxes_disabled);
        let Some(close) = close else {
            if !f.spoilerboxes_disabled {
                f.spoilerboxes_disabled = true;
                self.ctx.warn(format!("Container is never closed: {raw}"));
            }
            f.literal(raw);
            return i + 1;
        };
        let Some(scope) = self.nested(f, raw) else {
            f.literal(raw);
            return i + 1;
        };

        let body = self.render_range(doc, i + 1, close, scope);
        let id = self.ids.generate_id(BOX_ID_KIND);
        let visibility = self.boxes.lookup_box_state(&id);

        f.w.block(&html::spoiler_box(SPOILER_LABEL, trim_breaks(&body), &id, visibility));
        close + 1
    }
}
