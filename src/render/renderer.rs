//! Configured renderer front end.
//!
//! `Renderer` owns an immutable `RenderersConfig` and dispatches render calls
//! to the right document type's binary, recording each call in the audit log
//! when one is configured.

use super::executor::{RenderOutcome, RenderOutput, RenderReport, execute};
use crate::config::{DocumentType, RenderOption, RendererConfig, RenderersConfig};
use crate::error::{Result, ShimError};
use crate::events::{Event, EventAction, append_event};
use crate::fs::{Overwrite, atomic_write};
use serde_json::json;
use std::path::Path;
use std::time::Instant;

/// Render front end built once from configuration and shared read-only.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: RenderersConfig,
}

impl Renderer {
    pub fn new(config: RenderersConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderersConfig {
        &self.config
    }

    /// The renderer settings for a document type.
    pub fn renderer(&self, doc_type: DocumentType) -> &RendererConfig {
        self.config.get(doc_type)
    }

    /// Render `input` and return the binary's output bytes.
    pub fn render(
        &self,
        doc_type: DocumentType,
        input: &[u8],
        extra_options: &[RenderOption],
    ) -> Result<Vec<u8>> {
        self.render_with_report(doc_type, input, extra_options)
            .map(|output| output.bytes)
    }

    /// Render `input`, returning the output together with its report.
    pub fn render_with_report(
        &self,
        doc_type: DocumentType,
        input: &[u8],
        extra_options: &[RenderOption],
    ) -> Result<RenderOutput> {
        let start = Instant::now();
        let result = execute(self.renderer(doc_type), input, extra_options);
        self.record(doc_type, input.len(), start, &result);
        result
    }

    /// Render `input` and write the result to `output` atomically.
    ///
    /// Without `overwrite`, an existing `output` is an error and no process is
    /// spawned.
    pub fn render_to_file(
        &self,
        doc_type: DocumentType,
        input: &[u8],
        extra_options: &[RenderOption],
        output: &Path,
        overwrite: bool,
    ) -> Result<RenderReport> {
        let mode = if overwrite {
            Overwrite::Replace
        } else {
            // symlink_metadata so a dangling symlink also counts as existing.
            if output.symlink_metadata().is_ok() {
                return Err(ShimError::OutputExists {
                    path: output.to_path_buf(),
                });
            }
            Overwrite::Refuse
        };

        let rendered = self.render_with_report(doc_type, input, extra_options)?;
        atomic_write(output, &rendered.bytes, mode)?;

        tracing::info!(
            doc_type = %doc_type,
            output = %output.display(),
            bytes = rendered.bytes.len(),
            "wrote rendered document"
        );
        Ok(rendered.report)
    }

    /// Append an audit event for a finished call, if an events log is configured.
    ///
    /// Failing to write the audit log is logged but does not change the render result.
    fn record(
        &self,
        doc_type: DocumentType,
        input_bytes: usize,
        start: Instant,
        result: &Result<RenderOutput>,
    ) {
        let Some(log) = &self.config.events_log else {
            return;
        };

        let event = match result {
            Ok(output) => Event::new(EventAction::RenderSucceeded)
                .with_doc_type(doc_type)
                .with_details(json!({
                    "outcome": outcome_name(output.report.outcome),
                    "exit_code": output.report.exit_code,
                    "duration_ms": output.report.duration.as_millis() as u64,
                    "input_bytes": input_bytes,
                    "output_bytes": output.report.bytes,
                    "command": output.report.command,
                })),
            Err(err) => Event::new(EventAction::RenderFailed)
                .with_doc_type(doc_type)
                .with_details(json!({
                    "outcome": outcome_name(RenderOutcome::from_error(err)),
                    "error_kind": format!("{:?}", err.kind()),
                    "error": err.to_string(),
                    "duration_ms": start.elapsed().as_millis() as u64,
                    "input_bytes": input_bytes,
                })),
        };

        if let Err(e) = append_event(log, &event) {
            tracing::warn!(error = %e, log = %log.display(), "failed to record render event");
        }
    }
}

fn outcome_name(outcome: RenderOutcome) -> &'static str {
    match outcome {
        RenderOutcome::Succeeded => "succeeded",
        RenderOutcome::Failed => "failed",
        RenderOutcome::TimedOut => "timed_out",
    }
}
