//! Markup-to-HTML renderer.
//!
//! Rendering runs in three steps:
//!
//! 1. `[code]` regions are replaced by placeholders ([`crate::code_block`]).
//! 2. The rest is tokenized once and walked once; every construct writes its
//!    HTML directly, so generated markup is never scanned again.
//! 3. Placeholders are replaced by the escaped code bodies.
//!
//! Block constructs that own a body (containers, quotes, notices, image maps,
//! links with a label) render that body recursively as a token range. Rejected
//! constructs are written back as their source text and a warning is recorded.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::boxes;
use crate::code_block;
use crate::context::ParseContext;
use crate::html;
use crate::ids::{DeterministicIds, IdGenerator};
use crate::imagemap::ImageMapBlock;
use crate::lexer::{self, Tag, Token};
use crate::state::BoxStateLookup;
use crate::util::{escape_html, trim_breaks};
use crate::validate::{clamp_size, is_decimal, is_safe_color, is_valid_url, is_youtube_id};
use crate::writer::HtmlWriter;

/// Bare `http(s)://` URLs in text.
static BARE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)https?://[^\s<>"']+"#).unwrap());

/// Default target for `[profile]` links; the user id is appended.
pub const DEFAULT_PROFILE_BASE_URL: &str = "https://osu.ppy.sh/users/";

/// Default limit on nested bodies.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Prefix for `[profile=ID]` links.
    pub profile_base_url: String,
    /// Only accept hex colors and color keywords in `[color]`.
    pub strict_colors: bool,
    /// Turn bare URLs in text into links.
    pub autolink: bool,
    /// Maximum nesting of constructs with a body. Deeper constructs stay literal.
    pub max_depth: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            profile_base_url: DEFAULT_PROFILE_BASE_URL.to_owned(),
            strict_colors: true,
            autolink: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl RenderOptions {
    #[must_use]
    pub fn with_profile_base_url(mut self, url: impl Into<String>) -> Self {
        self.profile_base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_strict_colors(mut self, strict: bool) -> Self {
        self.strict_colors = strict;
        self
    }

    #[must_use]
    pub fn with_autolink(mut self, autolink: bool) -> Self {
        self.autolink = autolink;
        self
    }

    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }
}

/// Output of one render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderResult {
    pub html: String,
    /// Advisory diagnostics for constructs that were left as text.
    pub warnings: Vec<String>,
    /// Rendered containers per label.
    pub box_counts: HashMap<String, usize>,
    /// Number of profile links rendered.
    pub profile_cards: usize,
}

/// Renderer session.
///
/// Holds options and the id generator. Every call to [`render`](Self::render)
/// starts from a fresh [`ParseContext`], so calls are independent apart from
/// what the id generator carries over.
///
/// # Example
///
/// ```
/// use bbx_renderer::{BbcodeRenderer, BoxState};
///
/// let mut renderer = BbcodeRenderer::new();
/// let result = renderer.render("[b]Hello[/b]\nworld", &BoxState::new());
/// assert_eq!(result.html, "<strong>Hello</strong><br>world");
/// assert!(result.warnings.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct BbcodeRenderer<G: IdGenerator = DeterministicIds> {
    options: RenderOptions,
    ids: G,
}

impl BbcodeRenderer {
    /// Renderer with default options and document-order ids.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<G: IdGenerator> BbcodeRenderer<G> {
    /// Renderer with a custom id generator.
    #[must_use]
    pub fn with_ids(ids: G) -> Self {
        Self {
            options: RenderOptions::default(),
            ids,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Render `source` to HTML. Never fails.
    pub fn render(&mut self, source: &str, boxes: &dyn BoxStateLookup) -> RenderResult {
        self.ids.begin_document();
        let mut ctx = ParseContext::new();

        let protected = code_block::protect(source, &mut ctx.code_blocks);
        let tokens = lexer::tokenize(&protected);
        let body = {
            let doc = Document::new(&tokens);
            let mut walker = Walker {
                options: &self.options,
                ids: &mut self.ids,
                boxes,
                ctx: &mut ctx,
            };
            walker.render_range(&doc, 0, tokens.len(), Scope::default())
        };
        let html = code_block::restore(&body, &ctx.code_blocks);

        tracing::debug!(
            bytes = source.len(),
            code_blocks = ctx.code_blocks.len(),
            boxes = ctx.box_counts.values().sum::<usize>(),
            warnings = ctx.warnings.len(),
            "Rendered document"
        );

        RenderResult {
            html,
            warnings: ctx.warnings,
            box_counts: ctx.box_counts,
            profile_cards: ctx.profile_cards,
        }
    }
}

/// Render `source` with default options and document-order ids.
///
/// # Example
///
/// ```
/// use bbx_renderer::{render, BoxState};
///
/// assert_eq!(render("[size=9999]big[/size]", &BoxState::new()), r#"<span style="font-size:200%;">big</span>"#);
/// ```
pub fn render(source: &str, boxes: &dyn BoxStateLookup) -> String {
    BbcodeRenderer::new().render(source, boxes).html
}

/// Sorted token positions of opening and closing tags, per tag.
#[derive(Debug, Default)]
struct TagIndex {
    opens: HashMap<Tag, Vec<usize>>,
    closes: HashMap<Tag, Vec<usize>>,
}

impl TagIndex {
    fn new(tokens: &[Token<'_>]) -> Self {
        let mut index = Self::default();
        for (i, token) in tokens.iter().enumerate() {
            match token {
                Token::Open { tag, .. } => index.opens.entry(*tag).or_default().push(i),
                Token::Close { tag, .. } => index.closes.entry(*tag).or_default().push(i),
                _ => {}
            }
        }
        index
    }

    /// First opening `tag` in `from..end`.
    fn first_open(&self, tag: Tag, from: usize, end: usize) -> Option<usize> {
        first_in(self.opens.get(&tag)?, from, end)
    }

    /// First closing `tag` in `from..end`.
    fn first_close(&self, tag: Tag, from: usize, end: usize) -> Option<usize> {
        first_in(self.closes.get(&tag)?, from, end)
    }
}

fn first_in(positions: &[usize], from: usize, end: usize) -> Option<usize> {
    let idx = positions.partition_point(|&p| p < from);
    positions.get(idx).copied().filter(|&p| p < end)
}

/// A token stream with its lookup tables.
pub(crate) struct Document<'t, 'a> {
    pub(crate) tokens: &'t [Token<'a>],
    index: TagIndex,
    /// For each `[box=...]` opening tag, the position of its matching close.
    pub(crate) box_ends: Vec<Option<usize>>,
}

impl<'t, 'a> Document<'t, 'a> {
    pub(crate) fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            index: TagIndex::new(tokens),
            box_ends: boxes::match_boxes(tokens),
        }
    }

    pub(crate) fn first_open(&self, tag: Tag, from: usize, end: usize) -> Option<usize> {
        self.index.first_open(tag, from, end)
    }

    pub(crate) fn first_close(&self, tag: Tag, from: usize, end: usize) -> Option<usize> {
        self.index.first_close(tag, from, end)
    }
}

/// Nesting position of a token range.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Scope {
    depth: usize,
    /// Inside a link label; no autolinking.
    in_link: bool,
}

/// State of one token range being rendered.
pub(crate) struct Frame {
    pub(crate) scope: Scope,
    /// Exclusive end of the range.
    pub(crate) end: usize,
    pub(crate) w: HtmlWriter,
    pub(crate) list_depth: usize,
    /// An unmatched `[box=...]` was seen; later ones stay literal.
    pub(crate) boxes_disabled: bool,
    /// An unmatched `[spoilerbox]` was seen; later ones stay literal.
    pub(crate) spoilerboxes_disabled: bool,
}

impl Frame {
    fn new(scope: Scope, end: usize) -> Self {
        Self {
            scope,
            end,
            w: HtmlWriter::default(),
            list_depth: 0,
            boxes_disabled: false,
            spoilerboxes_disabled: false,
        }
    }

    /// Write source text back unchanged, newlines as line breaks.
    pub(crate) fn literal(&mut self, raw: &str) {
        let mut rest = raw;
        while let Some(pos) = rest.find('\n') {
            let line = &rest[..pos];
            self.w.text(line.strip_suffix('\r').unwrap_or(line));
            self.w.line_break();
            rest = &rest[pos + 1..];
        }
        self.w.text(rest);
    }

    fn close(&mut self, tag: Tag, raw: &str) {
        if let Some((_, close)) = inline_pair(tag) {
            self.w.inline(close);
            return;
        }

        match tag {
            Tag::Color | Tag::Size => self.w.inline("</span>"),
            Tag::Heading => self.w.block("</h2>"),
            Tag::ListItem => self.close_list_item(raw),
            Tag::List => self.close_list(raw),
            // Constructs with a body consume their own close; anything else is stray.
            _ => self.literal(raw),
        }
    }
}

/// Walks token ranges and writes HTML.
pub(crate) struct Walker<'r> {
    pub(crate) options: &'r RenderOptions,
    pub(crate) ids: &'r mut dyn IdGenerator,
    pub(crate) boxes: &'r dyn BoxStateLookup,
    pub(crate) ctx: &'r mut ParseContext,
}

impl Walker<'_> {
    pub(crate) fn render_range(
        &mut self,
        doc: &Document<'_, '_>,
        start: usize,
        end: usize,
        scope: Scope,
    ) -> String {
        let mut f = Frame::new(scope, end);
        let mut i = start;

        while i < end {
            i = match &doc.tokens[i] {
                Token::Text(text) => {
                    self.text(&mut f, text);
                    i + 1
                }
                Token::Break => {
                    f.w.line_break();
                    i + 1
                }
                Token::Code(index) => {
                    let mut placeholder = String::new();
                    code_block::push_placeholder(&mut placeholder, *index);
                    f.w.block(&placeholder);
                    i + 1
                }
                Token::Open { tag, attr, raw } => self.open(doc, &mut f, i, *tag, *attr, raw),
                Token::Close { tag, raw } => {
                    f.close(*tag, raw);
                    i + 1
                }
            };
        }

        f.w.finish()
    }

    /// Render a standalone fragment, such as a container label.
    pub(crate) fn render_fragment(&mut self, source: &str, scope: Scope) -> String {
        let tokens = lexer::tokenize(source);
        let doc = Document::new(&tokens);
        self.render_range(&doc, 0, tokens.len(), scope)
    }

    /// Scope for a nested body, or `None` when the nesting limit is reached.
    pub(crate) fn nested(&mut self, f: &Frame, raw: &str) -> Option<Scope> {
        if f.scope.depth >= self.options.max_depth {
            self.ctx.warn(format!(
                "Nesting limit of {} exceeded at {raw}",
                self.options.max_depth
            ));
            return None;
        }
        Some(Scope {
            depth: f.scope.depth + 1,
            ..f.scope
        })
    }

    /// Reject a construct: record a warning and write its opening tag as text.
    pub(crate) fn reject(&mut self, f: &mut Frame, i: usize, raw: &str, warning: String) -> usize {
        self.ctx.warn(warning);
        f.literal(raw);
        i + 1
    }

    fn text(&mut self, f: &mut Frame, text: &str) {
        if !self.options.autolink || f.scope.in_link {
            f.w.text(text);
            return;
        }

        let mut last = 0;
        for m in BARE_URL_RE.find_iter(text) {
            // Skip URLs that are attribute values in the source.
            let prev = text[..m.start()].chars().next_back().or_else(|| f.w.last_char());
            if matches!(prev, Some('"' | '\'' | '=')) {
                continue;
            }

            f.w.text(&text[last..m.start()]);
            let url = escape_html(m.as_str());
            f.w.inline(&format!(
                r#"<a href="{url}" target="_blank" rel="noopener noreferrer">{url}</a>"#
            ));
            last = m.end();
        }
        f.w.text(&text[last..]);
    }

    fn open(
        &mut self,
        doc: &Document<'_, '_>,
        f: &mut Frame,
        i: usize,
        tag: Tag,
        attr: Option<&str>,
        raw: &str,
    ) -> usize {
        if let Some((open, _)) = inline_pair(tag) {
            f.w.inline(open);
            return i + 1;
        }

        match tag {
            Tag::Color => {
                let value = attr.unwrap_or_default();
                if self.options.strict_colors && !is_safe_color(value) {
                    self.ctx.warn(format!("Color not allowed: {value}"));
                    f.w.inline("<span>");
                } else {
                    f.w.inline(&format!(r#"<span style="color:{}">"#, escape_html(value)));
                }
                i + 1
            }
            Tag::Size => {
                if let Some(size) = attr.and_then(clamp_size) {
                    f.w.inline(&format!(r#"<span style="font-size:{size}%;">"#));
                } else {
                    self.ctx.warn(format!("Invalid size: {raw}"));
                    f.w.inline("<span>");
                }
                i + 1
            }
            Tag::Heading => {
                f.w.inline("<h2>");
                i + 1
            }
            Tag::Url | Tag::Email => self.link(doc, f, i, tag, attr, raw),
            Tag::Image | Tag::Youtube | Tag::Audio | Tag::Profile => {
                self.media(doc, f, i, tag, attr, raw)
            }
            Tag::Notice | Tag::Quote => self.container(doc, f, i, tag, attr, raw),
            Tag::ImageMap => self.image_map(doc, f, i, raw),
            Tag::List => self.open_list(doc, f, i, attr, raw),
            Tag::ListItem => {
                f.list_item(raw);
                i + 1
            }
            Tag::Box => self.open_box(doc, f, i, attr, raw),
            Tag::SpoilerBox => self.open_spoilerbox(doc, f, i, raw),
            _ => {
                f.literal(raw);
                i + 1
            }
        }
    }

    /// `[url]`, `[url=href]`, `[email]` and `[email=addr]`.
    fn link(
        &mut self,
        doc: &Document<'_, '_>,
        f: &mut Frame,
        i: usize,
        tag: Tag,
        attr: Option<&str>,
        raw: &str,
    ) -> usize {
        let Some(close) = doc.first_close(tag, i + 1, f.end) else {
            f.literal(raw);
            return i + 1;
        };

        let (target, label) = match attr {
            Some(target) => (target.to_owned(), None),
            None => match plain_body(&doc.tokens[i + 1..close]) {
                Some(body) if !body.is_empty() => {
                    let label = escape_html(&body);
                    (body, Some(label))
                }
                _ => {
                    f.literal(raw);
                    return i + 1;
                }
            },
        };

        let href = match tag {
            Tag::Email => format!("mailto:{target}"),
            _ => target,
        };
        if !is_valid_url(&href) {
            return self.reject(f, i, raw, format!("Invalid link target: {href}"));
        }

        let label = match label {
            Some(label) => label,
            None => {
                let Some(scope) = self.nested(f, raw) else {
                    f.literal(raw);
                    return i + 1;
                };
                let scope = Scope {
                    in_link: true,
                    ..scope
                };
                self.render_range(doc, i + 1, close, scope)
            }
        };

        let href = escape_html(&href);
        let html = match tag {
            Tag::Email => format!(r#"<a rel="nofollow" href="{href}">{label}</a>"#),
            _ => format!("<a rel='nofollow' href='{href}' target='_blank'>{label}</a>"),
        };
        f.w.inline(&html);
        close + 1
    }

    /// Constructs whose body is a single plain value: images, embeds, profiles.
    fn media(
        &mut self,
        doc: &Document<'_, '_>,
        f: &mut Frame,
        i: usize,
        tag: Tag,
        attr: Option<&str>,
        raw: &str,
    ) -> usize {
        let Some(close) = doc.first_close(tag, i + 1, f.end) else {
            f.literal(raw);
            return i + 1;
        };
        let Some(body) = plain_body(&doc.tokens[i + 1..close]) else {
            return self.reject(f, i, raw, format!("Unexpected line break or code in {raw}"));
        };

        match tag {
            Tag::Image => {
                let width = match attr {
                    Some(width) if is_decimal(width) => Some(width),
                    Some(width) => {
                        return self.reject(f, i, raw, format!("Invalid image width: {width}"));
                    }
                    None => None,
                };
                if !is_valid_url(&body) {
                    return self.reject(f, i, raw, format!("Invalid image URL: {body}"));
                }
                let style = width
                    .map(|width| format!(r#" style="max-width: {width}px;""#))
                    .unwrap_or_default();
                f.w.inline(&format!(
                    r#"<img src="{}" alt="Image"{style} />"#,
                    escape_html(&body)
                ));
            }
            Tag::Youtube => {
                if !is_youtube_id(&body) {
                    return self.reject(f, i, raw, format!("Invalid video id: {body}"));
                }
                f.w.inline(&format!(
                    "<iframe class='u-embed-wide u-embed-wide--bbcode' src='https://www.youtube.com/embed/{body}?rel=0' allowfullscreen></iframe>"
                ));
            }
            Tag::Audio => {
                if body.contains('[') || !is_valid_url(&body) {
                    return self.reject(f, i, raw, format!("Invalid audio URL: {body}"));
                }
                f.w.block(&html::audio_player(&body));
            }
            _ => {
                let user_id = attr.unwrap_or_default();
                if !is_decimal(user_id) {
                    return self.reject(f, i, raw, format!("Invalid profile id: {user_id}"));
                }
                let card = self.ctx.next_profile_card();
                f.w.inline(&html::profile_link(
                    &self.options.profile_base_url,
                    user_id,
                    &body,
                    card,
                ));
            }
        }
        close + 1
    }

    /// `[notice]` and `[quote]`: the body up to the first close.
    fn container(
        &mut self,
        doc: &Document<'_, '_>,
        f: &mut Frame,
        i: usize,
        tag: Tag,
        attr: Option<&str>,
        raw: &str,
    ) -> usize {
        let Some(close) = doc.first_close(tag, i + 1, f.end) else {
            f.literal(raw);
            return i + 1;
        };
        let Some(scope) = self.nested(f, raw) else {
            f.literal(raw);
            return i + 1;
        };

        let body = self.render_range(doc, i + 1, close, scope);
        let body = trim_breaks(body.trim());
        let html = match (tag, attr) {
            (Tag::Quote, Some(author)) => format!(
                "<blockquote><h4>{} wrote:</h4>{body}</blockquote>",
                escape_html(author)
            ),
            (Tag::Quote, None) => format!("<blockquote>{body}</blockquote>"),
            _ => format!(r#"<div class="well">{body}</div>"#),
        };
        f.w.block(&html);
        close + 1
    }

    /// `[imagemap]`: rendered whole, or written back as source when invalid.
    fn image_map(&mut self, doc: &Document<'_, '_>, f: &mut Frame, i: usize, raw: &str) -> usize {
        let Some(close) = doc.first_close(Tag::ImageMap, i + 1, f.end) else {
            f.literal(raw);
            return i + 1;
        };

        let body = &doc.tokens[i + 1..close];
        let parsed = if body.iter().any(|token| matches!(token, Token::Code(_))) {
            Err("Image map contains a code block".to_owned())
        } else {
            ImageMapBlock::parse(&source_text(body)).map_err(|e| e.to_string())
        };

        match parsed {
            Ok(block) => {
                let ids = &mut *self.ids;
                f.w.block(&html::image_map(&block, || ids.next_tooltip_sequence()));
            }
            Err(warning) => {
                self.ctx.warn(warning);
                f.literal(&source_text(&doc.tokens[i..=close]));
            }
        }
        close + 1
    }
}

/// Markup for tags that map one-to-one onto an HTML element.
fn inline_pair(tag: Tag) -> Option<(&'static str, &'static str)> {
    let pair = match tag {
        Tag::Bold => ("<strong>", "</strong>"),
        Tag::Italic => ("<em>", "</em>"),
        Tag::Underline => ("<u>", "</u>"),
        Tag::Strike => ("<del>", "</del>"),
        Tag::InlineCode => ("<code>", "</code>"),
        Tag::Centre => ("<center>", "</center>"),
        Tag::Spoiler => ("<span class='spoiler'>", "</span>"),
        _ => return None,
    };
    Some(pair)
}

/// Source text of a body that must stay on one line and contain no code region.
fn plain_body(tokens: &[Token<'_>]) -> Option<String> {
    let mut body = String::new();
    for token in tokens {
        match token {
            Token::Text(text) => body.push_str(text),
            Token::Open { raw, .. } | Token::Close { raw, .. } => body.push_str(raw),
            Token::Break | Token::Code(_) => return None,
        }
    }
    Some(body)
}

/// Source text of a token range, line breaks as `\n`.
fn source_text(tokens: &[Token<'_>]) -> String {
    let mut source = String::new();
    for token in tokens {
        match token {
            Token::Text(text) => source.push_str(text),
            Token::Open { raw, .. } | Token::Close { raw, .. } => source.push_str(raw),
            Token::Break => source.push('\n'),
            Token::Code(index) => code_block::push_placeholder(&mut source, *index),
        }
    }
    source
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::ids::RandomIds;
    use crate::state::{BoxState, BoxVisibility};

    fn render_html(source: &str) -> String {
        BbcodeRenderer::new().render(source, &BoxState::new()).html
    }

    fn closed_box(label: &str, content: &str, id: &str) -> String {
        html::spoiler_box(label, content, id, BoxVisibility::Closed)
    }

    #[test]
    fn test_plain_text_only_converts_newlines() {
        assert_eq!(
            render_html("hello world\nsecond line\r\nthird"),
            "hello world<br>second line<br>third"
        );
        assert_eq!(render_html("[foo] a [b [/bar]"), "[foo] a [b [/bar]");
        assert_eq!(render_html(""), "");
    }

    #[test]
    fn test_code_block_is_never_transformed() {
        let html = render_html("[code][b]x[/b]\n[url]http://a.com[/url] <tag>[/code]\nafter");

        assert_eq!(
            html,
            "<pre>[b]x[/b]\n[url]http://a.com[/url] &lt;tag&gt;</pre>after"
        );
    }

    #[test]
    fn test_code_blocks_restored_in_order() {
        let html = render_html("[code]one[/code] [b][code]two[/code][/b]");
        assert_eq!(html, "<pre>one</pre> <strong><pre>two</pre></strong>");
    }

    #[test]
    fn test_forged_placeholder_is_inert() {
        let html = render_html("\u{E000}0\u{E001}[code]x[/code]");
        assert_eq!(html, "\u{E000}0\u{E001}<pre>x</pre>");
    }

    #[test]
    fn test_placeholder_chars_in_plain_text_survive() {
        let source = "a\u{E000}b\nc\u{E001}";
        assert_eq!(render_html(source), "a\u{E000}b<br>c\u{E001}");
        assert_eq!(render_html("[b]\u{E000}1\u{E001}[/b]"), "<strong>\u{E000}1\u{E001}</strong>");
    }

    #[test]
    fn test_nested_boxes() {
        let result =
            BbcodeRenderer::new().render("[box=A][box=B]x[/box]y[/box]", &BoxState::new());

        let inner = closed_box("B", "x", "box-0");
        let outer = closed_box("A", &format!("{inner}y"), "box-1");
        assert_eq!(result.html, outer);
        assert_eq!(result.box_counts.get("A"), Some(&1));
        assert_eq!(result.box_counts.get("B"), Some(&1));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_unclosed_box_is_literal() {
        let result = BbcodeRenderer::new().render("[box=A]no close", &BoxState::new());

        assert_eq!(result.html, "[box=A]no close");
        assert!(result.box_counts.is_empty());
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_unclosed_outer_box_leaves_rest_literal() {
        let html = render_html("[box=A]x[box=B]y[/box]");
        assert_eq!(html, "[box=A]x[box=B]y[/box]");
    }

    #[test]
    fn test_unclosed_box_keeps_later_box_in_quote_literal() {
        let result = BbcodeRenderer::new().render(
            "[box=A]x [quote][box=B]y[/box][/quote]",
            &BoxState::new(),
        );

        assert_eq!(
            result.html,
            "[box=A]x <blockquote>[box=B]y[/box]</blockquote>"
        );
        assert!(result.box_counts.is_empty());
    }

    #[test]
    fn test_unclosed_box_keeps_later_box_in_list_and_link_literal() {
        let html = render_html(
            "[box=A]\n[list][*][box=B]y[/box][/list][url=https://x.test][box=C]z[/box][/url]",
        );

        assert!(html.contains("[box=B]y[/box]"));
        assert!(html.contains("[box=C]z[/box]</a>"));
        assert!(!html.contains("bbcode-spoilerbox"));
    }

    #[test]
    fn test_unclosed_spoilerbox_keeps_nested_one_literal() {
        let html = render_html("[spoilerbox]a [notice][spoilerbox]b[/notice]");
        assert_eq!(
            html,
            r#"[spoilerbox]a <div class="well">[spoilerbox]b</div>"#
        );
    }

    #[test]
    fn test_repeated_unterminated_tags_render_as_text() {
        for opener in ["[box=", "[url=", "[color=", "[quote=\""] {
            let source = opener.repeat(20_000);
            let result = BbcodeRenderer::new().render(&source, &BoxState::new());
            assert_eq!(result.html, source);
        }
    }

    #[test]
    fn test_box_after_unclosed_label_is_literal() {
        assert_eq!(render_html("[box=[b]x"), "[box=<strong>x");
    }

    #[test]
    fn test_box_label_is_rendered_and_body_trimmed() {
        let html = render_html("[box=[b]Title[/b]]\nbody\n[/box]\nafter");

        let expected = closed_box("<strong>Title</strong>", "body", "box-0");
        assert_eq!(html, format!("{expected}after"));
    }

    #[test]
    fn test_box_state_opens_container() {
        let mut state = BoxState::new();
        state.set("box-0", BoxVisibility::Open);
        let html = BbcodeRenderer::new().render("[box=A]x[/box]", &state).html;

        assert_eq!(html, html::spoiler_box("A", "x", "box-0", BoxVisibility::Open));
    }

    #[test]
    fn test_ids_stable_across_renders() {
        let mut renderer = BbcodeRenderer::new();
        let first = renderer.render("[box=A]x[/box][spoilerbox]y[/spoilerbox]", &BoxState::new());
        let second = renderer.render("[box=A]x[/box][spoilerbox]y[/spoilerbox]", &BoxState::new());

        assert_eq!(first.html, second.html);
        assert!(first.html.contains(r#"id="box-1""#));
    }

    #[test]
    fn test_random_ids() {
        let mut renderer = BbcodeRenderer::with_ids(RandomIds::new());
        let first = renderer.render("[box=A]x[/box]", &BoxState::new());
        let second = renderer.render("[box=A]x[/box]", &BoxState::new());

        assert_ne!(first.html, second.html);
    }

    #[test]
    fn test_spoilerbox() {
        assert_eq!(
            render_html("[spoilerbox]\nhidden\n[/spoilerbox]"),
            closed_box("SPOILER", "hidden", "box-0")
        );
    }

    #[test]
    fn test_unclosed_spoilerbox_is_literal() {
        let result = BbcodeRenderer::new().render(
            "[spoilerbox]a[/spoilerbox][spoilerbox]b [spoilerbox]c",
            &BoxState::new(),
        );

        let first = closed_box("SPOILER", "a", "box-0");
        assert_eq!(result.html, format!("{first}[spoilerbox]b [spoilerbox]c"));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_size_is_clamped() {
        assert_eq!(
            render_html("[size=9999]t[/size]"),
            r#"<span style="font-size:200%;">t</span>"#
        );
        assert_eq!(
            render_html("[size=1]t[/size]"),
            r#"<span style="font-size:30%;">t</span>"#
        );
        assert_eq!(
            render_html("[size=150]t[/size]"),
            r#"<span style="font-size:150%;">t</span>"#
        );
    }

    #[test]
    fn test_invalid_size_keeps_balance() {
        let result = BbcodeRenderer::new().render("[size=big]t[/size]", &BoxState::new());
        assert_eq!(result.html, "<span>t</span>");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_image_map() {
        let html = render_html(
            "[imagemap]\nhttps://x/y.png\n0 0 50 50 https://z.com Title\n[/imagemap]\nafter",
        );

        assert_eq!(
            html,
            concat!(
                r#"<div class="imagemap"><img class="imagemap__image" loading="lazy" src="https://x/y.png" alt="https://x/y.png">"#,
                r#"<a class="imagemap__link" href="https://z.com" data-hotspot-id="0" style="left:0%;top:0%;width:50%;height:50%;""#,
                r#" onmouseover="window.showImageMapTooltip?.(event, 'Title', this)" onmouseleave="window.hideImageMapTooltip?.(this)"></a>"#,
                "</div>after",
            )
        );
    }

    #[test]
    fn test_invalid_image_map_is_returned_unparsed() {
        let source = "[imagemap]\nhttps://x/y.png\n0 0 80 50 https://z.com\n60 0 60 50 https://z.com\n[/imagemap]";
        let result = BbcodeRenderer::new().render(source, &BoxState::new());

        assert_eq!(result.html, source.replace('\n', "<br>"));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_hotspot_ids_keep_increasing() {
        let mut renderer = BbcodeRenderer::new();
        let source = "[imagemap]\nhttps://x/y.png\n0 0 10 10 #\n[/imagemap]";
        let first = renderer.render(source, &BoxState::new());
        let second = renderer.render(source, &BoxState::new());

        assert!(first.html.contains(r#"data-hotspot-id="0""#));
        assert!(second.html.contains(r#"data-hotspot-id="1""#));
        assert!(second.html.contains("<span class=\"imagemap__link\""));
    }

    #[test]
    fn test_explicit_links_are_not_autolinked_again() {
        assert_eq!(
            render_html("[url]https://a.com[/url]"),
            "<a rel='nofollow' href='https://a.com' target='_blank'>https://a.com</a>"
        );
        assert_eq!(
            render_html("[url=https://a.com]see https://a.com[/url]"),
            "<a rel='nofollow' href='https://a.com' target='_blank'>see https://a.com</a>"
        );
    }

    #[test]
    fn test_autolink_bare_url() {
        assert_eq!(
            render_html("see https://a.com/x?y=1 now"),
            r#"see <a href="https://a.com/x?y=1" target="_blank" rel="noopener noreferrer">https://a.com/x?y=1</a> now"#
        );
    }

    #[test]
    fn test_autolink_skips_attribute_values() {
        let source = r#"<img src="https://a.com/x.png"> x='http://b.com' y=http://c.com"#;
        assert_eq!(render_html(source), source);
    }

    #[test]
    fn test_autolink_can_be_disabled() {
        let mut renderer =
            BbcodeRenderer::new().with_options(RenderOptions::default().with_autolink(false));
        let html = renderer.render("https://a.com", &BoxState::new()).html;
        assert_eq!(html, "https://a.com");
    }

    #[test]
    fn test_invalid_url_is_literal() {
        let result = BbcodeRenderer::new().render("[url=javascript:alert(1)]x[/url]", &BoxState::new());

        assert_eq!(result.html, "[url=javascript:alert(1)]x[/url]");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_email() {
        assert_eq!(
            render_html("[email]a@b.com[/email]"),
            r#"<a rel="nofollow" href="mailto:a@b.com">a@b.com</a>"#
        );
        assert_eq!(
            render_html("[email=a@b.com][b]mail[/b][/email]"),
            r#"<a rel="nofollow" href="mailto:a@b.com"><strong>mail</strong></a>"#
        );
    }

    #[test]
    fn test_inline_tags() {
        assert_eq!(
            render_html("[b]b[/b][i]i[/i][u]u[/u][s]s[/s][strike]k[/strike][c]c[/c][centre]m[/centre][spoiler]p[/spoiler]"),
            "<strong>b</strong><em>i</em><u>u</u><del>s</del><del>k</del><code>c</code><center>m</center><span class='spoiler'>p</span>"
        );
    }

    #[test]
    fn test_unbalanced_inline_tags_are_substituted() {
        assert_eq!(render_html("[b]x"), "<strong>x");
        assert_eq!(render_html("x[/i]"), "x</em>");
    }

    #[test]
    fn test_color() {
        assert_eq!(
            render_html("[color=#ff0000]x[/color]"),
            r#"<span style="color:#ff0000">x</span>"#
        );

        let result =
            BbcodeRenderer::new().render("[color=red;background:url(x)]x[/color]", &BoxState::new());
        assert_eq!(result.html, "<span>x</span>");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_lenient_color() {
        let mut renderer =
            BbcodeRenderer::new().with_options(RenderOptions::default().with_strict_colors(false));
        let html = renderer.render(r#"[color=red;"x]x[/color]"#, &BoxState::new()).html;
        assert_eq!(html, r#"<span style="color:red;&quot;x">x</span>"#);
    }

    #[test]
    fn test_images() {
        assert_eq!(
            render_html("[img]https://x/a.png[/img]"),
            r#"<img src="https://x/a.png" alt="Image" />"#
        );
        assert_eq!(
            render_html("[img=300]https://x/a.png[/img]"),
            r#"<img src="https://x/a.png" alt="Image" style="max-width: 300px;" />"#
        );
        assert_eq!(render_html("[img]javascript:x[/img]"), "[img]javascript:x[/img]");

        let html = render_html("[img=wide]https://x/a.png[/img]");
        assert!(html.starts_with("[img=wide]"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_youtube() {
        assert_eq!(
            render_html("[youtube]dQw4w9WgXcQ[/youtube]"),
            "<iframe class='u-embed-wide u-embed-wide--bbcode' src='https://www.youtube.com/embed/dQw4w9WgXcQ?rel=0' allowfullscreen></iframe>"
        );
        assert_eq!(render_html("[youtube]a'b[/youtube]"), "[youtube]a'b[/youtube]");
    }

    #[test]
    fn test_audio() {
        let html = render_html("[audio]https://x/a.mp3[/audio]\nafter");
        assert_eq!(html, format!("{}after", html::audio_player("https://x/a.mp3")));

        let result = BbcodeRenderer::new().render("[audio]javascript:x[/audio]", &BoxState::new());
        assert_eq!(result.html, "[audio]javascript:x[/audio]");
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_profile_links_take_sequence_numbers() {
        let result = BbcodeRenderer::new().render(
            "[profile=2]peppy[/profile] [profile=3]x[/profile]",
            &BoxState::new(),
        );

        let first = html::profile_link(DEFAULT_PROFILE_BASE_URL, "2", "peppy", 0);
        let second = html::profile_link(DEFAULT_PROFILE_BASE_URL, "3", "x", 1);
        assert_eq!(result.html, format!("{first} {second}"));
        assert_eq!(result.profile_cards, 2);
    }

    #[test]
    fn test_profile_base_url_option() {
        let mut renderer = BbcodeRenderer::new()
            .with_options(RenderOptions::default().with_profile_base_url("https://e.com/u/"));
        let html = renderer.render("[profile=7]x[/profile]", &BoxState::new()).html;
        assert!(html.contains(r#"href="https://e.com/u/7""#));
    }

    #[test]
    fn test_profile_requires_numeric_id() {
        assert_eq!(render_html("[profile=abc]x[/profile]"), "[profile=abc]x[/profile]");
    }

    #[test]
    fn test_quotes() {
        assert_eq!(
            render_html("[quote=\"peppy\"]\nhello\n[/quote]\nnext"),
            "<blockquote><h4>peppy wrote:</h4>hello</blockquote>next"
        );
        assert_eq!(
            render_html("[quote] hi [/quote]"),
            "<blockquote>hi</blockquote>"
        );
    }

    #[test]
    fn test_notice_and_heading() {
        assert_eq!(
            render_html("[notice]\nnote\n[/notice]\n[heading]Title[/heading]\nbody"),
            r#"<div class="well">note</div><h2>Title</h2>body"#
        );
    }

    #[test]
    fn test_list_with_fused_first_item() {
        assert_eq!(
            render_html("[list]\n[*]a\n[*]b\n[/list]\nafter"),
            r#"<ol class="unordered"><li>a<li>b</ol>after"#
        );
        assert_eq!(render_html("[list=1][*]a[/*][/list:o]"), "<ol><li>a</li></ol>");
    }

    #[test]
    fn test_list_title_promotion() {
        assert_eq!(
            render_html("[list=1]Title\n[*]one[/list]"),
            r#"<ul class="bbcode__list-title"><li>Title</li></ul><ol><li>one</ol>"#
        );
    }

    #[test]
    fn test_both_list_kinds_in_one_document() {
        assert_eq!(
            render_html("[list][*]a[/list][list=a][*]b[/list]"),
            r#"<ol class="unordered"><li>a</ol><ol><li>b</ol>"#
        );
    }

    #[test]
    fn test_list_markers_outside_list_are_literal() {
        assert_eq!(render_html("[*]x[/*] [/list]"), "[*]x[/*] [/list]");
        assert_eq!(render_html("[list]no items"), "[list]no items");
    }

    #[test]
    fn test_stray_closes_are_literal() {
        assert_eq!(render_html("a[/url][/quote][/box]"), "a[/url][/quote][/box]");
    }

    #[test]
    fn test_nesting_limit() {
        let mut renderer =
            BbcodeRenderer::new().with_options(RenderOptions::default().with_max_depth(2));
        let result = renderer.render("[box=a][box=b][box=c]x[/box][/box][/box]", &BoxState::new());

        assert!(result.html.contains("[box=c]x[/box]"));
        assert_eq!(result.box_counts.get("a"), Some(&1));
        assert_eq!(result.box_counts.get("c"), None);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_free_render() {
        assert_eq!(render("[b]x[/b]", &BoxState::new()), "<strong>x</strong>");
    }
}
