//! Implementation of the `render-shim config` command.

use crate::cli::ConfigArgs;
use render_shim::RenderersConfig;
use render_shim::error::{Result, ShimError};

/// Execute the `render-shim config` command.
pub fn cmd_config(config: &RenderersConfig, args: ConfigArgs) -> Result<()> {
    print!("{}", render_config(config, args.doc_type.as_deref())?);
    Ok(())
}

/// The resolved configuration (or one section of it) as YAML.
pub(crate) fn render_config(config: &RenderersConfig, doc_type: Option<&str>) -> Result<String> {
    match doc_type {
        None => config.to_yaml(),
        Some(key) => serde_yaml::to_string(config.resolve(key)?).map_err(|e| {
            ShimError::Config(format!("failed to serialize {} section to YAML: {}", key, e))
        }),
    }
}
