//! Renderer configuration for render-shim.
//!
//! This module defines the per-document-type `RendererConfig`, the file-level
//! `RenderersConfig`, YAML loading with defaults, validation, and the
//! document-type resolver.

mod model;
mod operations;
pub mod types;


// Re-export public API
pub use model::{RendererConfig, RenderersConfig};
pub use types::{DocumentType, IoConvention, RenderOption};
