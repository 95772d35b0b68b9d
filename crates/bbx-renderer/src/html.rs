//! HTML generators for block and widget output.
//!
//! Markup matches the stylesheet and scripts of the host page: class names and
//! the `window.*` hooks are part of that contract and must not change.

use std::fmt::Write;

use crate::imagemap::ImageMapBlock;
use crate::state::BoxVisibility;
use crate::util::{escape_html, escape_js_string, escape_text};

// Chevron icons for container toggles (16x16)
const CHEVRON_DOWN: &str = r#"<path d="M5 7L8 10L11 7" stroke="currentColor" stroke-width="2.5" stroke-linecap="round" stroke-linejoin="round" fill="none"/>"#;
const CHEVRON_RIGHT: &str = r#"<path d="M7 5L10 8L7 11" stroke="currentColor" stroke-width="2.5" stroke-linecap="round" stroke-linejoin="round" fill="none"/>"#;

/// Collapsible container.
///
/// `label` and `content` are already-rendered HTML. The visibility decides the
/// chevron direction and whether the body starts hidden.
pub(crate) fn spoiler_box(label: &str, content: &str, id: &str, visibility: BoxVisibility) -> String {
    let open = visibility.is_open();
    let (icon_class, chevron, style) = if open {
        (" open", CHEVRON_DOWN, "")
    } else {
        ("", CHEVRON_RIGHT, "display: none;")
    };
    let id = escape_html(id);

    let mut out = String::with_capacity(content.len() + label.len() + 640);
    out.push_str(r#"<div class="bbcode-spoilerbox">"#);
    write!(
        out,
        r##"<a class="bbcode-spoilerbox__link flex flex-row items-center" onclick="window.toggleBox?.('{id}', this); return false;" href="#">"##
    )
    .unwrap();
    write!(
        out,
        r#"<i class="bbcode-spoilerbox__link-icon{icon_class}"><svg width="16" height="16" viewBox="0 0 16 16" fill="none" xmlns="http://www.w3.org/2000/svg">{chevron}</svg></i>"#
    )
    .unwrap();
    out.push_str(label);
    out.push_str("</a>");
    write!(
        out,
        r#"<div class="bbcode-spoilerbox__body" id="{id}" style="{style}"><div class="bbcode-spoilerbox__body-content">"#
    )
    .unwrap();
    out.push_str(content);
    out.push_str("</div></div></div>");
    out
}

/// User-card link. `card` correlates hover events with the card collaborator.
pub(crate) fn profile_link(base_url: &str, user_id: &str, name: &str, card: usize) -> String {
    let user_id = escape_html(user_id);
    format!(
        r#"<a class="user-name js-usercard" data-user-id="{user_id}" href="{base}{user_id}" data-qtip-id="{card}" target="_blank" rel="noopener noreferrer" onmouseenter="window.showUserCard?.({card}, this)" onmouseleave="window.hideUserCard?.({card})" onclick="window.cancelUserCardShow?.()">{name}</a>"#,
        base = escape_html(base_url),
        name = escape_html(name),
    )
}

/// Inline audio player driven by the host page's audio script.
pub(crate) fn audio_player(url: &str) -> String {
    format!(
        concat!(
            r#"<div class="audio-player js-audio--player" data-audio-url="{url}" data-audio-state="paused">"#,
            r#"<button type="button" class="audio-player__button audio-player__button--play js-audio--play"><span class="fa-fw play-button"></span></button>"#,
            r#"<div class="audio-player__bar audio-player__bar--progress js-audio--seek"><div class="audio-player__bar-current"></div></div>"#,
            r#"<div class="audio-player__timestamps">"#,
            r#"<div class="audio-player__timestamp audio-player__timestamp--current"></div>"#,
            r#"<div class="audio-player__timestamp-separator">/</div>"#,
            r#"<div class="audio-player__timestamp audio-player__timestamp--total"></div>"#,
            "</div></div>",
        ),
        url = escape_html(url),
    )
}

/// Image with percentage-positioned hotspots.
///
/// `next_id` supplies one hotspot id per region, in order.
pub(crate) fn image_map(block: &ImageMapBlock, mut next_id: impl FnMut() -> u64) -> String {
    let image = escape_html(&block.image_url);
    let mut out = String::new();
    write!(
        out,
        r#"<div class="imagemap"><img class="imagemap__image" loading="lazy" src="{image}" alt="{image}">"#
    )
    .unwrap();

    for hotspot in &block.hotspots {
        let id = next_id();
        let (tag, href) = match hotspot.href() {
            Some(url) => ("a", format!(r#" href="{}""#, escape_html(url))),
            None => ("span", String::new()),
        };
        write!(
            out,
            r#"<{tag} class="imagemap__link"{href} data-hotspot-id="{id}" style="left:{}%;top:{}%;width:{}%;height:{}%;""#,
            hotspot.left, hotspot.top, hotspot.width, hotspot.height
        )
        .unwrap();
        if let Some(title) = &hotspot.title {
            write!(
                out,
                r#" onmouseover="window.showImageMapTooltip?.(event, '{}', this)" onmouseleave="window.hideImageMapTooltip?.(this)""#,
                escape_html(&escape_js_string(title))
            )
            .unwrap();
        }
        write!(out, "></{tag}>").unwrap();
    }

    out.push_str("</div>");
    out
}

/// Literal code region.
pub(crate) fn code_block(body: &str) -> String {
    let body = body.trim_matches(['\r', '\n']);
    format!("<pre>{}</pre>", escape_text(body))
}
