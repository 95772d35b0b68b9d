//! `bbx render` command implementation.

use std::fmt::Write as _;
use std::io::Write;
use std::path::PathBuf;

use bbx_config::{CliSettings, Config};
use bbx_renderer::escape_html;
use clap::Args;

use super::{load_box_state, read_input, render_source};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markup file to render (default: stdin).
    input: Option<PathBuf>,

    /// Write HTML to this file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover bbx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file mapping container ids to "open" or "closed".
    #[arg(long)]
    box_state: Option<PathBuf>,

    /// Wrap output in a standalone HTML document.
    #[arg(long)]
    standalone: bool,

    /// Do not turn bare URLs into links.
    #[arg(long)]
    no_autolink: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration, input or box state can not be read,
    /// or the output can not be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            standalone: self.standalone.then_some(true),
            autolink: self.no_autolink.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        let source = read_input(self.input.as_deref())?;
        let boxes = load_box_state(self.box_state.as_deref())?;
        let result = render_source(&config, &source, &boxes);

        output.rejected(&result.warnings);

        let html = if config.output.standalone {
            standalone_document(&config.output.title, &result.html)
        } else {
            result.html
        };

        if let Some(path) = &self.output {
            std::fs::write(path, &html)?;
            output.info(&format!("Wrote {}", path.display()));
        } else {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(html.as_bytes())?;
            stdout.write_all(b"\n")?;
            stdout.flush()?;
        }

        Ok(())
    }
}

/// Wrap rendered markup in a minimal HTML document.
fn standalone_document(title: &str, body: &str) -> String {
    let mut doc = String::with_capacity(body.len() + 160);
    doc.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    writeln!(doc, "<title>{}</title>", escape_html(title)).unwrap();
    doc.push_str("</head>\n<body>\n");
    doc.push_str(body);
    doc.push_str("\n</body>\n</html>");
    doc
}
