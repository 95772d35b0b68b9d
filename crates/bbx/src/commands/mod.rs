//! CLI command implementations.

pub(crate) mod check;
pub(crate) mod render;

pub(crate) use check::CheckArgs;
pub(crate) use render::RenderArgs;

use std::io::Read;
use std::path::Path;

use bbx_config::{Config, IdStrategy};
use bbx_renderer::{
    BbcodeRenderer, BoxState, BoxStateLookup, DeterministicIds, RandomIds, RenderOptions,
    RenderResult,
};

use crate::error::CliError;

/// Read markup from `path`, or from stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String, CliError> {
    match path {
        Some(path) => Ok(std::fs::read_to_string(path)?),
        None => {
            let mut source = String::new();
            std::io::stdin().read_to_string(&mut source)?;
            Ok(source)
        }
    }
}

/// Load container visibility from a JSON object of `id -> "open" | "closed"`.
fn load_box_state(path: Option<&Path>) -> Result<BoxState, CliError> {
    let Some(path) = path else {
        return Ok(BoxState::new());
    };
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn render_options(config: &Config) -> RenderOptions {
    RenderOptions::default()
        .with_profile_base_url(config.render.profile_base_url.clone())
        .with_strict_colors(config.render.strict_colors)
        .with_autolink(config.render.autolink)
        .with_max_depth(config.render.max_depth)
}

/// Render `source` with the options and id strategy from `config`.
fn render_source(config: &Config, source: &str, boxes: &dyn BoxStateLookup) -> RenderResult {
    let options = render_options(config);
    match config.render.ids {
        IdStrategy::Deterministic => BbcodeRenderer::with_ids(DeterministicIds::new())
            .with_options(options)
            .render(source, boxes),
        IdStrategy::Random => BbcodeRenderer::with_ids(RandomIds::new())
            .with_options(options)
            .render(source, boxes),
    }
}
