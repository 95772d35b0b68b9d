//! Predicates applied to untrusted attribute values before they reach the output.

use std::sync::LazyLock;

use regex::Regex;

/// URL schemes accepted by [`is_valid_url`].
pub const ALLOWED_URL_PROTOCOLS: &[&str] = &["http:", "https:", "mailto:"];

/// Smallest percentage a `[size]` tag can produce.
pub const MIN_SIZE: u32 = 30;

/// Largest percentage a `[size]` tag can produce.
pub const MAX_SIZE: u32 = 200;

/// Hex colors (`#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`) or plain CSS color keywords.
static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#(?:[0-9a-fA-F]{3,4}|[0-9a-fA-F]{6}|[0-9a-fA-F]{8})|[a-zA-Z]{1,32})$").unwrap()
});

static YOUTUBE_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").unwrap());

/// Check that a URL uses one of the [`ALLOWED_URL_PROTOCOLS`].
///
/// Values mentioning `javascript:` or `data:` anywhere are rejected even when the
/// scheme itself is allowed.
///
/// # Examples
///
/// ```
/// use bbx_renderer::is_valid_url;
///
/// assert!(is_valid_url("https://example.com/a.png"));
/// assert!(!is_valid_url("javascript:alert(1)"));
/// assert!(!is_valid_url("https://example.com/?next=javascript:alert(1)"));
/// ```
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    let lower = url.to_lowercase();
    if !ALLOWED_URL_PROTOCOLS.iter().any(|p| lower.starts_with(p)) {
        return false;
    }

    if lower.contains("javascript:") || lower.contains("data:") {
        tracing::debug!(url, "Blocked potentially dangerous URL");
        return false;
    }

    true
}

/// Check that a value is a finite number in `[0, 100]`.
pub fn is_valid_percentage(value: f64) -> bool {
    value.is_finite() && (0.0..=100.0).contains(&value)
}

/// Check that a hotspot has a positive area and stays inside the image.
pub fn is_valid_hotspot_bounds(left: f64, top: f64, width: f64, height: f64) -> bool {
    if width <= 0.0 || height <= 0.0 {
        return false;
    }
    left + width <= 100.0 && top + height <= 100.0
}

/// Parse a `[size=N]` value and clamp it into [`MIN_SIZE`]..=[`MAX_SIZE`].
///
/// Returns `None` unless the value is a non-empty run of ASCII digits. Values too
/// large for `u32` clamp to the maximum.
pub fn clamp_size(value: &str) -> Option<u32> {
    if !is_decimal(value) {
        return None;
    }
    let size = value.parse::<u32>().unwrap_or(MAX_SIZE);
    Some(size.clamp(MIN_SIZE, MAX_SIZE))
}

/// Check a `[color=...]` value against the hex/keyword allow-list.
pub fn is_safe_color(value: &str) -> bool {
    COLOR_RE.is_match(value)
}

pub(crate) fn is_youtube_id(value: &str) -> bool {
    YOUTUBE_ID_RE.is_match(value)
}

pub(crate) fn is_decimal(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
