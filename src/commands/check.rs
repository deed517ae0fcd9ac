//! Implementation of the `render-shim check` command.
//!
//! Reports, per document type, whether the renderer is enabled and whether
//! its binary resolves to an executable. No renderer is spawned.

use render_shim::error::{Result, ShimError};
use render_shim::render::check_binary;
use render_shim::{DocumentType, RenderersConfig};
use std::path::PathBuf;

/// Readiness of one document type's renderer.
#[derive(Debug)]
pub(crate) enum Readiness {
    Ready(PathBuf),
    Disabled,
    Unavailable(ShimError),
}

/// Check every document type without spawning anything.
pub(crate) fn check_renderers(config: &RenderersConfig) -> Vec<(DocumentType, Readiness)> {
    DocumentType::ALL
        .into_iter()
        .map(|doc_type| {
            let readiness = match check_binary(config.get(doc_type)) {
                Ok(path) => Readiness::Ready(path),
                Err(ShimError::Disabled(_)) => Readiness::Disabled,
                Err(e) => Readiness::Unavailable(e),
            };
            (doc_type, readiness)
        })
        .collect()
}

/// Execute the `render-shim check` command.
///
/// Fails with the first unavailable renderer's error so the exit code
/// reflects the problem.
pub fn cmd_check(config: &RenderersConfig) -> Result<()> {
    let mut first_failure = None;

    for (doc_type, readiness) in check_renderers(config) {
        match readiness {
            Readiness::Ready(path) => println!("{:<6} ok        {}", doc_type, path.display()),
            Readiness::Disabled => println!("{:<6} disabled", doc_type),
            Readiness::Unavailable(err) => {
                println!("{:<6} FAILED    {}", doc_type, err);
                if first_failure.is_none() {
                    first_failure = Some(err);
                }
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
