//! Command implementations for render-shim.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the configuration loading they share.

mod check;
mod config_cmd;
mod render;


use crate::cli::{Cli, Command, DEFAULT_CONFIG_FILE};
use render_shim::RenderersConfig;
use render_shim::error::Result;
use std::path::Path;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = load_config(&cli.config, cli.config != Path::new(DEFAULT_CONFIG_FILE))?;

    match cli.command {
        Command::Render(args) => render::cmd_render(config, args),
        Command::Check => check::cmd_check(&config),
        Command::Config(args) => config_cmd::cmd_config(&config, args),
    }
}

/// Load the configuration file.
///
/// A missing file is an error when the path was given explicitly; the default
/// path falls back to the stock layout resolved against its directory.
pub(crate) fn load_config(path: &Path, explicit: bool) -> Result<RenderersConfig> {
    if explicit || path.exists() {
        return RenderersConfig::load(path);
    }

    tracing::info!(
        path = %path.display(),
        "no configuration file found; using default renderer settings"
    );
    let mut config = RenderersConfig::default();
    let base = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    config.resolve_relative_paths(base);
    Ok(config)
}
