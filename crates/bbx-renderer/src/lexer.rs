//! Tokenizer for the bracket-tag vocabulary.
//!
//! A single forward scan over the protected source turns it into a flat token
//! stream. Newlines become [`Token::Break`], code placeholders become
//! [`Token::Code`], and only bracket sequences naming a known tag with a
//! well-formed attribute become tag tokens. Everything else is text.

use crate::code_block::{PLACEHOLDER_END, PLACEHOLDER_START};

/// Known tag names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Tag {
    Bold,
    Italic,
    Underline,
    Strike,
    InlineCode,
    Centre,
    Spoiler,
    Color,
    Size,
    Url,
    Email,
    Image,
    Youtube,
    Audio,
    Profile,
    Heading,
    Notice,
    Quote,
    List,
    ListItem,
    Box,
    SpoilerBox,
    ImageMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrRule {
    Forbidden,
    Optional,
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrSyntax {
    /// Everything up to the first `]`.
    Plain,
    /// Up to the first `]` at bracket depth zero; may be empty.
    Nested,
    /// A double-quoted string followed by `]`.
    Quoted,
}

impl Tag {
    fn from_name(name: &str) -> Option<Self> {
        let tag = match name {
            "b" => Self::Bold,
            "i" => Self::Italic,
            "u" => Self::Underline,
            "s" | "strike" => Self::Strike,
            "c" => Self::InlineCode,
            "centre" => Self::Centre,
            "spoiler" => Self::Spoiler,
            "color" => Self::Color,
            "size" => Self::Size,
            "url" => Self::Url,
            "email" => Self::Email,
            "img" => Self::Image,
            "youtube" => Self::Youtube,
            "audio" => Self::Audio,
            "profile" => Self::Profile,
            "heading" => Self::Heading,
            "notice" => Self::Notice,
            "quote" => Self::Quote,
            "list" => Self::List,
            "*" => Self::ListItem,
            "box" => Self::Box,
            "spoilerbox" => Self::SpoilerBox,
            "imagemap" => Self::ImageMap,
            _ => return None,
        };
        Some(tag)
    }

    fn attr_rule(self) -> AttrRule {
        match self {
            Self::Color | Self::Size | Self::Profile | Self::Box => AttrRule::Required,
            Self::Url | Self::Email | Self::Image | Self::List | Self::Quote => AttrRule::Optional,
            _ => AttrRule::Forbidden,
        }
    }

    fn attr_syntax(self) -> AttrSyntax {
        match self {
            Self::Box => AttrSyntax::Nested,
            Self::Quote => AttrSyntax::Quoted,
            _ => AttrSyntax::Plain,
        }
    }

    /// Suffixes accepted after a colon in the closing tag (`[/list:o]`, `[/*:m]`).
    fn close_suffixes(self) -> &'static [u8] {
        match self {
            Self::List => b"ou",
            Self::ListItem => b"m",
            _ => b"",
        }
    }
}

/// One lexical unit of the protected source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token<'a> {
    /// Plain text, never containing a newline.
    Text(&'a str),
    /// A normalized line separator (`\n` or `\r\n`).
    Break,
    /// Placeholder for the code block with this index.
    Code(usize),
    /// Opening tag. `raw` is the exact source text of the tag.
    ///
    /// A `[box=` whose label never reaches a closing bracket is still reported
    /// as an opening tag, with `attr: None`, so the container pass can stop.
    Open {
        tag: Tag,
        attr: Option<&'a str>,
        raw: &'a str,
    },
    /// Closing tag.
    Close { tag: Tag, raw: &'a str },
}

impl Token<'_> {
    pub(crate) fn is_open(&self, wanted: Tag) -> bool {
        matches!(self, Token::Open { tag, .. } if *tag == wanted)
    }

    /// Whitespace-only text.
    pub(crate) fn is_blank(&self) -> bool {
        matches!(self, Token::Text(text) if text.trim().is_empty())
    }
}

/// Split `input` into tokens.
///
/// Runs in time linear in the input (up to a logarithmic factor for the
/// delimiter lookups), however many tags are left unterminated.
pub(crate) fn tokenize(input: &str) -> Vec<Token<'_>> {
    let bytes = input.as_bytes();
    let delims = Delimiters::new(input);
    let mut tokens = Vec::new();
    let mut text_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        let lexed = match bytes[i] {
            b'\n' => Some((Token::Break, 1)),
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => Some((Token::Break, 2)),
            b'[' => lex_tag(input, i, &delims),
            // Lead byte of U+E000; always a char boundary.
            0xEE if input[i..].starts_with(PLACEHOLDER_START) => lex_placeholder(&input[i..]),
            _ => None,
        };

        match lexed {
            Some((token, len)) => {
                if text_start < i {
                    tokens.push(Token::Text(&input[text_start..i]));
                }
                tokens.push(token);
                i += len;
                text_start = i;
            }
            None => i += 1,
        }
    }

    if text_start < input.len() {
        tokens.push(Token::Text(&input[text_start..]));
    }

    tokens
}

/// Positions of the bytes that end tag attributes, collected in one pass so
/// that an attribute which never closes does not rescan the rest of the input.
struct Delimiters {
    /// Every `]`.
    closes: Vec<usize>,
    /// Every newline and placeholder start; plain attributes may not span one.
    stops: Vec<usize>,
    /// Every `[` and `]`.
    brackets: Vec<usize>,
    /// Per entry of `brackets`, the first `]` at depth zero when scanning from
    /// that bracket onwards.
    depth_zero_close: Vec<Option<usize>>,
}

impl Delimiters {
    fn new(input: &str) -> Self {
        let bytes = input.as_bytes();
        let mut closes = Vec::new();
        let mut stops = Vec::new();
        let mut brackets = Vec::new();

        for (i, &b) in bytes.iter().enumerate() {
            match b {
                b'[' => brackets.push(i),
                b']' => {
                    brackets.push(i);
                    closes.push(i);
                }
                b'\n' => stops.push(i),
                0xEE if input[i..].starts_with(PLACEHOLDER_START) => stops.push(i),
                _ => {}
            }
        }

        // Partner of every matched `[`, as an index into `brackets`.
        let mut partner = vec![None; brackets.len()];
        let mut open = Vec::new();
        for (j, &pos) in brackets.iter().enumerate() {
            if bytes[pos] == b'[' {
                open.push(j);
            } else if let Some(k) = open.pop() {
                partner[k] = Some(j);
            }
        }

        let mut depth_zero_close = vec![None; brackets.len()];
        for j in (0..brackets.len()).rev() {
            depth_zero_close[j] = if bytes[brackets[j]] == b']' {
                Some(brackets[j])
            } else {
                partner[j].and_then(|k| depth_zero_close.get(k + 1).copied().flatten())
            };
        }

        Self {
            closes,
            stops,
            brackets,
            depth_zero_close,
        }
    }

    /// First `]` at or after byte `from`.
    fn next_close(&self, from: usize) -> Option<usize> {
        first_at_or_after(&self.closes, from)
    }

    /// Whether `from..end` contains a newline or a placeholder.
    fn has_stop(&self, from: usize, end: usize) -> bool {
        first_at_or_after(&self.stops, from).is_some_and(|stop| stop < end)
    }

    /// First `]` at bracket depth zero at or after byte `from`.
    fn nested_end(&self, from: usize) -> Option<usize> {
        let j = self.brackets.partition_point(|&p| p < from);
        self.depth_zero_close.get(j).copied().flatten()
    }
}

fn first_at_or_after(positions: &[usize], from: usize) -> Option<usize> {
    positions.get(positions.partition_point(|&p| p < from)).copied()
}

fn lex_placeholder(s: &str) -> Option<(Token<'_>, usize)> {
    let body = &s[PLACEHOLDER_START.len_utf8()..];
    let end = body.find(PLACEHOLDER_END)?;
    let index = body[..end].parse().ok()?;
    let len = PLACEHOLDER_START.len_utf8() + end + PLACEHOLDER_END.len_utf8();
    Some((Token::Code(index), len))
}

/// Lex a tag at byte `at` of `input` (which holds a `[`).
fn lex_tag<'a>(input: &'a str, at: usize, delims: &Delimiters) -> Option<(Token<'a>, usize)> {
    let s = &input[at..];
    let closing = s[1..].starts_with('/');
    let name_start = if closing { 2 } else { 1 };
    let name_len = s[name_start..]
        .bytes()
        .take_while(|b| b.is_ascii_alphanumeric() || *b == b'*')
        .count();
    if name_len == 0 {
        return None;
    }

    let name = s[name_start..name_start + name_len].to_ascii_lowercase();
    let tag = Tag::from_name(&name)?;
    let pos = name_start + name_len;

    if closing {
        return lex_close(s, tag, pos);
    }

    match *s.as_bytes().get(pos)? {
        b']' if tag.attr_rule() != AttrRule::Required => Some((
            Token::Open {
                tag,
                attr: None,
                raw: &s[..=pos],
            },
            pos + 1,
        )),
        b'=' if tag.attr_rule() != AttrRule::Forbidden => lex_attr(input, at, tag, pos + 1, delims),
        _ => None,
    }
}

fn lex_close(s: &str, tag: Tag, mut pos: usize) -> Option<(Token<'_>, usize)> {
    let bytes = s.as_bytes();
    if bytes.get(pos) == Some(&b':') {
        let suffix = bytes.get(pos + 1)?.to_ascii_lowercase();
        if !tag.close_suffixes().contains(&suffix) {
            return None;
        }
        pos += 2;
    }

    (bytes.get(pos) == Some(&b']')).then(|| (Token::Close { tag, raw: &s[..=pos] }, pos + 1))
}

/// Lex the attribute starting `start` bytes into the tag at `at` (just past `=`).
fn lex_attr<'a>(
    input: &'a str,
    at: usize,
    tag: Tag,
    start: usize,
    delims: &Delimiters,
) -> Option<(Token<'a>, usize)> {
    let s = &input[at..];
    let rest = &s[start..];

    let (attr, close) = match tag.attr_syntax() {
        AttrSyntax::Plain => {
            let end = delims.next_close(at + start)? - at;
            if end == start || delims.has_stop(at + start, at + end) {
                return None;
            }
            (&s[start..end], end)
        }
        AttrSyntax::Nested => match delims.nested_end(at + start) {
            Some(end) => (&s[start..end - at], end - at),
            None => {
                let raw = &s[..start];
                return Some((Token::Open { tag, attr: None, raw }, start));
            }
        },
        AttrSyntax::Quoted => {
            let inner = rest.strip_prefix('"')?;
            let end = inner.find('"')?;
            let author = &inner[..end];
            if author.is_empty() || author.contains(['\n', PLACEHOLDER_START]) {
                return None;
            }
            let close = start + 1 + end + 1;
            if s.as_bytes().get(close) != Some(&b']') {
                return None;
            }
            (author, close)
        }
    };

    let token = Token::Open {
        tag,
        attr: Some(attr),
        raw: &s[..=close],
    };
    Some((token, close + 1))
}
