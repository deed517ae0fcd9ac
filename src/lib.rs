//! render-shim: configuration-driven subprocess shim for external PDF and
//! image renderers such as wkhtmltopdf and wkhtmltoimage.
//!
//! Build a [`RenderersConfig`] once (usually with [`RenderersConfig::load`]),
//! hand it to a [`Renderer`], and render:
//!
//! ```no_run
//! use render_shim::{DocumentType, Renderer, RenderersConfig};
//!
//! let config = RenderersConfig::load("render-shim.yaml")?;
//! let renderer = Renderer::new(config);
//! let pdf = renderer.render(DocumentType::Pdf, b"<h1>Hello</h1>", &[])?;
//! # Ok::<(), render_shim::ShimError>(())
//! ```

pub mod config;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod render;

#[cfg(test)]
mod test_support;

pub use config::{DocumentType, IoConvention, RenderOption, RendererConfig, RenderersConfig};
pub use error::{ErrorKind, Result, ShimError};
pub use render::{RenderOutcome, RenderReport, Renderer, render};
