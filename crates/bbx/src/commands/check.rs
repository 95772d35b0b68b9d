//! `bbx check` command implementation.

use std::path::PathBuf;

use bbx_config::Config;
use bbx_renderer::BoxState;
use clap::Args;

use super::{read_input, render_source};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the check command.
#[derive(Args)]
pub(crate) struct CheckArgs {
    /// Markup file to check (default: stdin).
    input: Option<PathBuf>,

    /// Path to configuration file (default: auto-discover bbx.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CheckArgs {
    /// Execute the check command.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Validation` when any construct was rejected.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = Config::load(self.config.as_deref(), None)?;
        let source = read_input(self.input.as_deref())?;

        let result = render_source(&config, &source, &BoxState::new());
        output.rejected(&result.warnings);

        summarize(result.warnings.len())?;
        output.success("No problems found.");
        Ok(())
    }
}

fn summarize(warnings: usize) -> Result<(), CliError> {
    match warnings {
        0 => Ok(()),
        1 => Err(CliError::Validation("1 construct was rejected".to_owned())),
        n => Err(CliError::Validation(format!("{n} constructs were rejected"))),
    }
}
