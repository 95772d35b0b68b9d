//! String helpers shared by the passes.

/// Line-break marker produced by newline normalization.
pub(crate) const BR: &str = "<br>";

/// Escape HTML special characters (`&`, `<`, `>`, `"`, `'`).
///
/// # Examples
///
/// ```
/// use bbx_renderer::escape_html;
///
/// assert_eq!(escape_html(r#"<a href="x">"#), "&lt;a href=&quot;x&quot;&gt;");
/// ```
pub fn escape_html(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#039;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape only `&`, `<` and `>`, leaving quotes alone.
///
/// Used for literal code regions, where quotes are content rather than markup.
pub(crate) fn escape_text(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a value for a single-quoted JavaScript string literal.
pub(crate) fn escape_js_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '\'' => result.push_str("\\'"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            _ => result.push(c),
        }
    }
    result
}

/// Remove leading and trailing runs of `<br>` markers (and the whitespace around them).
///
/// Whitespace is only trimmed on a side where at least one marker was removed.
pub(crate) fn trim_breaks(s: &str) -> &str {
    trim_trailing_breaks(trim_leading_breaks(s))
}

fn trim_leading_breaks(s: &str) -> &str {
    let mut rest = s;
    let mut stripped = false;
    while let Some(after) = rest.trim_start().strip_prefix(BR) {
        rest = after;
        stripped = true;
    }
    if stripped { rest.trim_start() } else { s }
}

fn trim_trailing_breaks(s: &str) -> &str {
    let mut rest = s;
    let mut stripped = false;
    while let Some(before) = rest.trim_end().strip_suffix(BR) {
        rest = before;
        stripped = true;
    }
    if stripped { rest.trim_end() } else { s }
}
