//! Config loading, validation, and lookup operations.

use super::model::{RendererConfig, RenderersConfig};
use super::types::DocumentType;
use crate::error::{Result, ShimError};
use std::path::Path;

impl RenderersConfig {
    /// Load config from a YAML file.
    ///
    /// Relative `binary` paths that contain a directory component, relative
    /// `temporary_folder`s, and a relative `events_log` are resolved against
    /// the directory containing the file. Bare binary names are left alone so
    /// they can be looked up on `PATH` at render time.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            ShimError::Config(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let mut config = Self::from_yaml(&content)?;
        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        config.resolve_relative_paths(base);

        tracing::debug!(path = %path.display(), "loaded renderer configuration");
        Ok(config)
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields are silently ignored; missing sections take defaults.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document parses as null, which means "all defaults".
        let config: RenderersConfig = if yaml.trim().is_empty() {
            RenderersConfig::default()
        } else {
            serde_yaml::from_str(yaml)
                .map_err(|e| ShimError::Config(format!("failed to parse config YAML: {}", e)))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| ShimError::Config(format!("failed to serialize config to YAML: {}", e)))
    }

    /// Validate every renderer section.
    pub fn validate(&self) -> Result<()> {
        for doc_type in DocumentType::ALL {
            self.get(doc_type).validate()?;
        }
        Ok(())
    }

    /// Look up the renderer for a document-type key such as `"pdf"`.
    ///
    /// Fails with `UnknownDocumentType` for any other key.
    pub fn resolve(&self, key: &str) -> Result<&RendererConfig> {
        let doc_type: DocumentType = key.parse()?;
        Ok(self.get(doc_type))
    }

    /// Resolve relative paths against `base` (the config file's directory).
    pub fn resolve_relative_paths(&mut self, base: &Path) {
        for doc_type in DocumentType::ALL {
            let renderer = self.get_mut(doc_type);
            if is_relative_path_with_dir(&renderer.binary) {
                renderer.binary = base.join(&renderer.binary);
            }
            if let Some(dir) = &renderer.temporary_folder
                && dir.is_relative()
            {
                renderer.temporary_folder = Some(base.join(dir));
            }
        }

        if let Some(log) = &self.events_log
            && log.is_relative()
        {
            self.events_log = Some(base.join(log));
        }
    }
}

impl RendererConfig {
    /// Validate a single renderer section.
    ///
    /// Validation rules:
    /// - `binary` must be non-empty when `enabled` is true
    /// - option flags must be non-empty
    /// - file extensions must not have leading dots
    pub fn validate(&self) -> Result<()> {
        let section = self.doc_type;

        if self.enabled && self.binary.as_os_str().is_empty() {
            return Err(ShimError::Config(format!(
                "config validation failed: {}.binary must be set when {}.enabled is true",
                section, section
            )));
        }

        if let Some(position) = self.options.iter().position(|o| o.flag.is_empty()) {
            return Err(ShimError::Config(format!(
                "config validation failed: {}.options[{}] has an empty flag",
                section, position
            )));
        }

        for (field, ext) in [
            ("input_extension", &self.input_extension),
            ("output_extension", &self.output_extension),
        ] {
            if ext.starts_with('.') {
                return Err(ShimError::Config(format!(
                    "config validation failed: {}.{} must not have a leading dot (found '{}'). Use '{}' instead.",
                    section,
                    field,
                    ext,
                    ext.trim_start_matches('.')
                )));
            }
        }

        Ok(())
    }
}

/// True for relative paths like `vendor/bin/tool` but not bare names like `tool`.
fn is_relative_path_with_dir(path: &Path) -> bool {
    path.is_relative() && path.components().count() > 1
}

