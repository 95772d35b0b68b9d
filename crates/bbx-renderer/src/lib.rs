//! Bracket-tag markup to HTML transformation engine.
//!
//! Converts user-authored bracket markup (`[b]`, `[url=...]`, `[box=...]`,
//! `[imagemap]`, ...) into HTML for a live preview. Rendering never fails:
//! malformed or rejected constructs are written back as their source text and
//! reported as warnings.
//!
//! # Architecture
//!
//! - `[code]` regions are extracted first and restored last, so nothing inside
//!   them is interpreted.
//! - A lexer turns the remaining text into tokens in one forward scan.
//! - A walker consumes the tokens once and writes HTML. Constructs with a body
//!   (containers, quotes, image maps) render that body recursively.
//!
//! Per-render state lives in a [`ParseContext`] created for every call. State
//! that outlives a render is injected: container visibility through
//! [`BoxStateLookup`], identifiers through [`IdGenerator`].
//!
//! # Example
//!
//! ```
//! use bbx_renderer::{BbcodeRenderer, BoxState};
//!
//! let mut renderer = BbcodeRenderer::new();
//! let result = renderer.render("[box=Details]hidden[/box]", &BoxState::new());
//!
//! assert!(result.html.contains(r#"id="box-0""#));
//! assert_eq!(result.box_counts.get("Details"), Some(&1));
//! ```

mod boxes;
mod code_block;
mod context;
mod html;
mod ids;
mod imagemap;
mod lexer;
mod list;
mod renderer;
mod state;
mod util;
mod validate;
mod writer;

pub use context::ParseContext;
pub use ids::{DeterministicIds, IdGenerator, RandomIds};
pub use imagemap::{Hotspot, ImageMapBlock, ImageMapError};
pub use renderer::{
    BbcodeRenderer, DEFAULT_MAX_DEPTH, DEFAULT_PROFILE_BASE_URL, RenderOptions, RenderResult,
    render,
};
pub use state::{BoxState, BoxStateLookup, BoxVisibility};
pub use util::escape_html;
pub use validate::{
    ALLOWED_URL_PROTOCOLS, MAX_SIZE, MIN_SIZE, clamp_size, is_safe_color,
    is_valid_hotspot_bounds, is_valid_percentage, is_valid_url,
};
