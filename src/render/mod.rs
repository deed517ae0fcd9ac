//! Process invocation shim.
//!
//! - **Binary**: locate the configured executable and check it can run
//! - **Executor**: spawn it with options, environment overlay, and timeout
//! - **Renderer**: per-document-type front end with audit events and file output
//!
//! The rendering itself is entirely the binary's business; this module only
//! moves bytes in and out of one subprocess per call.

mod binary;
mod executor;
mod renderer;

// Re-export public API
pub use binary::{check_binary, locate_binary};
pub use executor::{RenderOutcome, RenderOutput, RenderReport, build_args, execute, render};
pub use renderer::Renderer;
