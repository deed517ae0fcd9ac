//! Configuration types and defaults for render-shim.
//!
//! This module defines the document-type key, option pairs, the binary
//! calling convention, and the serde encoding of timeouts.

use crate::error::ShimError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported rendering targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Pdf,
    Image,
}

impl DocumentType {
    /// Every document type, in configuration-file order.
    pub const ALL: [DocumentType; 2] = [DocumentType::Pdf, DocumentType::Image];

    /// The configuration key for this document type.
    pub fn key(self) -> &'static str {
        match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Image => "image",
        }
    }

    /// Binary used when the configuration file does not name one.
    pub fn default_binary(self) -> &'static str {
        match self {
            DocumentType::Pdf => "vendor/bin/wkhtmltopdf-amd64",
            DocumentType::Image => "vendor/bin/wkhtmltoimage-amd64",
        }
    }

    /// Suffix of the temporary output file under the `files` convention.
    pub fn default_output_extension(self) -> &'static str {
        match self {
            DocumentType::Pdf => "pdf",
            DocumentType::Image => "jpg",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.key())
    }
}

impl FromStr for DocumentType {
    type Err = ShimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pdf" => Ok(DocumentType::Pdf),
            "image" => Ok(DocumentType::Image),
            other => Err(ShimError::UnknownDocumentType(other.to_string())),
        }
    }
}

/// How input reaches the binary and output leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum IoConvention {
    /// Input on stdin, output on stdout, arguments are the options only (default).
    #[default]
    Stdio,
    /// Input and output go through temporary files whose paths are appended
    /// after the options: `<options...> <input> <output>`.
    Files,
}

/// A single command-line option passed through to the binary.
///
/// In YAML an option is either a bare switch (`"--quiet"`) or a sequence of
/// one or two strings (`["--page-size", "A4"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawOption", into = "RawOption")]
pub struct RenderOption {
    pub flag: String,
    pub value: Option<String>,
}

impl RenderOption {
    /// A flag followed by a value argument.
    pub fn new(flag: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: Some(value.into()),
        }
    }

    /// A flag with no value.
    pub fn switch(flag: impl Into<String>) -> Self {
        Self {
            flag: flag.into(),
            value: None,
        }
    }

    /// Parse the CLI form `FLAG` or `FLAG=VALUE`.
    ///
    /// Only the first `=` separates; the value may itself contain `=`.
    pub fn parse_cli(s: &str) -> Result<Self, ShimError> {
        let (flag, value) = match s.split_once('=') {
            Some((flag, value)) => (flag, Some(value.to_string())),
            None => (s, None),
        };
        if flag.is_empty() {
            return Err(ShimError::Config(format!(
                "invalid option '{}': flag must not be empty",
                s
            )));
        }
        Ok(Self {
            flag: flag.to_string(),
            value,
        })
    }

    /// Append this option's arguments to `args`.
    pub fn push_args(&self, args: &mut Vec<String>) {
        args.push(self.flag.clone());
        if let Some(value) = &self.value {
            args.push(value.clone());
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawOption {
    Switch(String),
    Sequence(Vec<String>),
}

impl TryFrom<RawOption> for RenderOption {
    type Error = String;

    fn try_from(raw: RawOption) -> Result<Self, Self::Error> {
        match raw {
            RawOption::Switch(flag) => Ok(RenderOption::switch(flag)),
            RawOption::Sequence(parts) => {
                let mut parts = parts.into_iter();
                match (parts.next(), parts.next(), parts.next()) {
                    (Some(flag), None, None) => Ok(RenderOption::switch(flag)),
                    (Some(flag), Some(value), None) => Ok(RenderOption::new(flag, value)),
                    _ => Err("option must be a flag or a [flag, value] pair".to_string()),
                }
            }
        }
    }
}

impl From<RenderOption> for RawOption {
    fn from(option: RenderOption) -> Self {
        match option.value {
            Some(value) => RawOption::Sequence(vec![option.flag, value]),
            None => RawOption::Switch(option.flag),
        }
    }
}

/// Serde encoding for `Option<Duration>` timeouts.
///
/// `false`, `null`, or a missing key mean no timeout; a non-negative number
/// is a count of seconds. `true` and negative numbers are rejected.
pub(crate) mod timeout_serde {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawTimeout {
        Flag(bool),
        Seconds(f64),
    }

    pub fn serialize<S: Serializer>(
        timeout: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match timeout {
            Some(timeout) => serializer.serialize_f64(timeout.as_secs_f64()),
            None => serializer.serialize_bool(false),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        match Option::<RawTimeout>::deserialize(deserializer)? {
            None | Some(RawTimeout::Flag(false)) => Ok(None),
            Some(RawTimeout::Flag(true)) => Err(D::Error::custom(
                "timeout must be a number of seconds or false, not true",
            )),
            Some(RawTimeout::Seconds(secs)) => Duration::try_from_secs_f64(secs)
                .map(Some)
                .map_err(|_| {
                    D::Error::custom(format!(
                        "timeout must be a non-negative number of seconds (found {})",
                        secs
                    ))
                }),
        }
    }
}

pub(crate) fn default_input_extension() -> String {
    "html".to_string()
}
