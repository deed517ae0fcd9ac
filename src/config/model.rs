//! Configuration model for render-shim.
//!
//! `RenderersConfig` represents the whole configuration file; each document
//! type gets a `RendererConfig`. Sections missing from the file fall back to
//! the stock wkhtmltopdf/wkhtmltoimage layout, and unknown fields are ignored
//! for forward compatibility.

use super::types::{DocumentType, IoConvention, RenderOption, default_input_extension, timeout_serde};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

/// Settings for one document type's external renderer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RendererConfig {
    /// Which document type this section configures.
    #[serde(skip)]
    pub doc_type: DocumentType,

    /// When false, every render is rejected before any subprocess work.
    pub enabled: bool,

    /// Path to the rendering executable. Bare names are looked up on `PATH`.
    pub binary: PathBuf,

    /// Maximum run time; `None` waits indefinitely.
    #[serde(with = "timeout_serde")]
    pub timeout: Option<Duration>,

    /// Options passed to the binary, in order. Flags may repeat.
    pub options: Vec<RenderOption>,

    /// Variables overlaid onto the host environment for the subprocess.
    pub env: BTreeMap<String, String>,

    /// How input and output are exchanged with the binary.
    pub io: IoConvention,

    /// Directory for `files`-convention temporaries (system temp dir if unset).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temporary_folder: Option<PathBuf>,

    /// Suffix of the temporary input file.
    pub input_extension: String,

    /// Suffix of the temporary output file.
    pub output_extension: String,
}

impl RendererConfig {
    /// Defaults for a document type, with its stock binary path.
    pub fn defaults(doc_type: DocumentType) -> Self {
        Self::new(doc_type, doc_type.default_binary())
    }

    /// An enabled renderer for `doc_type` running `binary` with no options.
    pub fn new(doc_type: DocumentType, binary: impl Into<PathBuf>) -> Self {
        Self {
            doc_type,
            enabled: true,
            binary: binary.into(),
            timeout: None,
            options: Vec::new(),
            env: BTreeMap::new(),
            io: IoConvention::default(),
            temporary_folder: None,
            input_extension: default_input_extension(),
            output_extension: doc_type.default_output_extension().to_string(),
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_option(mut self, option: RenderOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_io(mut self, io: IoConvention) -> Self {
        self.io = io;
        self
    }

    pub fn with_temporary_folder(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temporary_folder = Some(dir.into());
        self
    }

    /// Overlay the fields present in a parsed file section.
    fn apply(mut self, section: RawSection) -> Self {
        if let Some(enabled) = section.enabled {
            self.enabled = enabled;
        }
        if let Some(binary) = section.binary {
            self.binary = binary;
        }
        self.timeout = section.timeout;
        self.options = section.options;
        self.env = section.env;
        if let Some(io) = section.io {
            self.io = io;
        }
        self.temporary_folder = section.temporary_folder;
        if let Some(ext) = section.input_extension {
            self.input_extension = ext;
        }
        if let Some(ext) = section.output_extension {
            self.output_extension = ext;
        }
        self
    }
}

/// The complete configuration file: one renderer per document type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawConfig")]
pub struct RenderersConfig {
    pub pdf: RendererConfig,
    pub image: RendererConfig,

    /// Optional NDJSON audit log of render invocations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events_log: Option<PathBuf>,
}

impl Default for RenderersConfig {
    fn default() -> Self {
        Self {
            pdf: RendererConfig::defaults(DocumentType::Pdf),
            image: RendererConfig::defaults(DocumentType::Image),
            events_log: None,
        }
    }
}

impl RenderersConfig {
    /// Borrow the renderer for a known document type.
    pub fn get(&self, doc_type: DocumentType) -> &RendererConfig {
        match doc_type {
            DocumentType::Pdf => &self.pdf,
            DocumentType::Image => &self.image,
        }
    }

    pub(crate) fn get_mut(&mut self, doc_type: DocumentType) -> &mut RendererConfig {
        match doc_type {
            DocumentType::Pdf => &mut self.pdf,
            DocumentType::Image => &mut self.image,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawConfig {
    pdf: Option<RawSection>,
    image: Option<RawSection>,
    events_log: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSection {
    enabled: Option<bool>,
    binary: Option<PathBuf>,
    #[serde(with = "timeout_serde")]
    timeout: Option<Duration>,
    options: Vec<RenderOption>,
    env: BTreeMap<String, String>,
    io: Option<IoConvention>,
    temporary_folder: Option<PathBuf>,
    input_extension: Option<String>,
    output_extension: Option<String>,
}

impl From<RawConfig> for RenderersConfig {
    fn from(raw: RawConfig) -> Self {
        let section = |doc_type: DocumentType, raw: Option<RawSection>| {
            let defaults = RendererConfig::defaults(doc_type);
            match raw {
                Some(section) => defaults.apply(section),
                None => defaults,
            }
        };

        Self {
            pdf: section(DocumentType::Pdf, raw.pdf),
            image: section(DocumentType::Image, raw.image),
            events_log: raw.events_log,
        }
    }
}
