//! Literal `[code]` regions.
//!
//! Code regions are pulled out of the source before any other pass runs and
//! replaced by an opaque placeholder holding their index in
//! [`ParseContext::code_blocks`](crate::ParseContext::code_blocks). Placeholders
//! are built from two private-use characters, so no pass can ever match text
//! inside a protected region. When user text contains those characters itself,
//! each one is stored as an escape placeholder (`\u{E000}s\u{E001}` and
//! `\u{E000}e\u{E001}`) that no pass reads as a code block. [`restore`] runs
//! last, substitutes each code placeholder with the escaped body and turns
//! escapes back into the original characters.

use std::fmt::Write;

use crate::html;

/// Opens a placeholder: `\u{E000}<index>\u{E001}`.
pub(crate) const PLACEHOLDER_START: char = '\u{E000}';
/// Closes a placeholder.
pub(crate) const PLACEHOLDER_END: char = '\u{E001}';

/// Body of the escape placeholder for a literal [`PLACEHOLDER_START`].
const ESCAPED_START: &str = "s";
/// Body of the escape placeholder for a literal [`PLACEHOLDER_END`].
const ESCAPED_END: &str = "e";

const OPEN_TAG: &str = "[code]";
const CLOSE_TAG: &str = "[/code]";

/// Replace every `[code]...[/code]` region with a placeholder.
///
/// Bodies are pushed onto `blocks` verbatim, in order of appearance. An opening
/// tag without a closing tag is left as ordinary text.
pub(crate) fn protect(source: &str, blocks: &mut Vec<String>) -> String {
    let mut output = String::with_capacity(source.len());
    let mut pos = 0;

    while let Some(open) = find_ignore_ascii_case(source, OPEN_TAG, pos) {
        let body_start = open + OPEN_TAG.len();
        let Some(close) = find_ignore_ascii_case(source, CLOSE_TAG, body_start) else {
            break;
        };

        push_escaped(&mut output, &source[pos..open]);
        push_placeholder(&mut output, blocks.len());
        blocks.push(source[body_start..close].to_owned());
        pos = close + CLOSE_TAG.len();
    }

    push_escaped(&mut output, &source[pos..]);
    output
}

/// Substitute every placeholder in `rendered` with its code block.
pub(crate) fn restore(rendered: &str, blocks: &[String]) -> String {
    if !rendered.contains(PLACEHOLDER_START) {
        return rendered.to_owned();
    }

    let extra: usize = blocks.iter().map(String::len).sum();
    let mut output = String::with_capacity(rendered.len() + extra);
    let mut remaining = rendered;

    while let Some(start) = remaining.find(PLACEHOLDER_START) {
        output.push_str(&remaining[..start]);
        let after = &remaining[start + PLACEHOLDER_START.len_utf8()..];

        let Some(end) = after.find(PLACEHOLDER_END) else {
            output.push(PLACEHOLDER_START);
            remaining = after;
            continue;
        };

        match &after[..end] {
            ESCAPED_START => output.push(PLACEHOLDER_START),
            ESCAPED_END => output.push(PLACEHOLDER_END),
            index => match index.parse::<usize>().ok().and_then(|i| blocks.get(i)) {
                Some(body) => output.push_str(&html::code_block(body)),
                None => {
                    output.push(PLACEHOLDER_START);
                    remaining = after;
                    continue;
                }
            },
        }
        remaining = &after[end + PLACEHOLDER_END.len_utf8()..];
    }

    output.push_str(remaining);
    output
}

/// Write the placeholder for block `index`.
pub(crate) fn push_placeholder(out: &mut String, index: usize) {
    out.push(PLACEHOLDER_START);
    write!(out, "{index}").unwrap();
    out.push(PLACEHOLDER_END);
}

/// Append user text, escaping placeholder characters it contains.
fn push_escaped(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(pos) = rest.find([PLACEHOLDER_START, PLACEHOLDER_END]) {
        out.push_str(&rest[..pos]);
        let escaped = if rest[pos..].starts_with(PLACEHOLDER_START) {
            ESCAPED_START
        } else {
            ESCAPED_END
        };
        out.push(PLACEHOLDER_START);
        out.push_str(escaped);
        out.push(PLACEHOLDER_END);
        // Both characters are three bytes long.
        rest = &rest[pos + PLACEHOLDER_START.len_utf8()..];
    }
    out.push_str(rest);
}

/// Find an ASCII `needle` in `haystack` at or after byte `from`, ignoring ASCII case.
pub(crate) fn find_ignore_ascii_case(haystack: &str, needle: &str, from: usize) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.is_empty() || hay.len() < needle.len() {
        return None;
    }
    (from..=hay.len() - needle.len())
        .find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protect_single_block() {
        let mut blocks = Vec::new();
        let output = protect("a [code][b]x[/b][/code] b", &mut blocks);

        assert_eq!(output, "a \u{E000}0\u{E001} b");
        assert_eq!(blocks, vec!["[b]x[/b]".to_owned()]);
    }

    #[test]
    fn test_protect_is_case_insensitive() {
        let mut blocks = Vec::new();
        let output = protect("[CODE]x[/Code]", &mut blocks);

        assert_eq!(output, "\u{E000}0\u{E001}");
        assert_eq!(blocks, vec!["x".to_owned()]);
    }

    #[test]
    fn test_protect_keeps_order() {
        let mut blocks = Vec::new();
        let output = protect("[code]one[/code] and [code]two[/code]", &mut blocks);

        assert_eq!(output, "\u{E000}0\u{E001} and \u{E000}1\u{E001}");
        assert_eq!(blocks, vec!["one".to_owned(), "two".to_owned()]);
    }

    #[test]
    fn test_protect_unclosed_is_text() {
        let mut blocks = Vec::new();
        let output = protect("[code]never closed", &mut blocks);

        assert_eq!(output, "[code]never closed");
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_protect_escapes_forged_placeholders() {
        let mut blocks = vec!["secret".to_owned()];
        let output = protect("\u{E000}0\u{E001}", &mut blocks);

        assert_eq!(output, "\u{E000}s\u{E001}0\u{E000}e\u{E001}");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn test_protect_keeps_placeholder_chars_in_code_body() {
        let mut blocks = Vec::new();
        let output = protect("[code]\u{E000}[/code]", &mut blocks);

        assert_eq!(output, "\u{E000}0\u{E001}");
        assert_eq!(blocks, vec!["\u{E000}".to_owned()]);
    }

    #[test]
    fn test_restore_unescapes_placeholder_chars() {
        let mut blocks = vec!["secret".to_owned()];
        let source = "a \u{E000}0\u{E001} \u{E001}";
        let protected = protect(source, &mut blocks);

        assert_eq!(restore(&protected, &blocks), source);
        assert_eq!(restore(&protected, &[]), source);
    }

    #[test]
    fn test_restore_keeps_unknown_placeholder_text() {
        assert_eq!(restore("\u{E000}9\u{E001}", &[]), "\u{E000}9\u{E001}");
        assert_eq!(restore("x\u{E000}", &[]), "x\u{E000}");
    }

    #[test]
    fn test_restore_escapes_body() {
        let blocks = vec!["<b>&</b>".to_owned()];
        let output = restore("before \u{E000}0\u{E001} after", &blocks);

        assert_eq!(output, "before <pre>&lt;b&gt;&amp;&lt;/b&gt;</pre> after");
    }

    #[test]
    fn test_restore_trims_outer_newlines() {
        let blocks = vec!["\nline 1\nline 2\n".to_owned()];
        let output = restore("\u{E000}0\u{E001}", &blocks);

        assert_eq!(output, "<pre>line 1\nline 2</pre>");
    }

    #[test]
    fn test_restore_without_blocks_is_identity() {
        assert_eq!(restore("plain", &[]), "plain");
    }

    #[test]
    fn test_find_ignore_ascii_case() {
        assert_eq!(find_ignore_ascii_case("ab[CoDe]", "[code]", 0), Some(2));
        assert_eq!(find_ignore_ascii_case("[code]", "[code]", 1), None);
        assert_eq!(find_ignore_ascii_case("", "[code]", 0), None);
    }
}
