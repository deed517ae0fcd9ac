//! Render audit log for render-shim.
//!
//! When `events_log` is configured, every render call appends one event in
//! NDJSON format (one JSON object per line).
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: `render_succeeded` or `render_failed`
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `doc_type`: `pdf` or `image`
//! - `details`: Outcome, timings, byte counts, and the error for failures
//!
//! ```no_run
//! use render_shim::config::DocumentType;
//! use render_shim::events::{Event, EventAction, append_event};
//! use serde_json::json;
//! use std::path::Path;
//!
//! let event = Event::new(EventAction::RenderSucceeded)
//!     .with_doc_type(DocumentType::Pdf)
//!     .with_details(json!({"output_bytes": 1024}));
//! append_event(Path::new("render-events.ndjson"), &event)?;
//! # Ok::<(), render_shim::error::ShimError>(())
//! ```

use crate::config::DocumentType;
use crate::error::{Result, ShimError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// The binary exited successfully and its output was collected.
    RenderSucceeded,
    /// The call was rejected or the binary failed or timed out.
    RenderFailed,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::RenderSucceeded => write!(f, "render_succeeded"),
            EventAction::RenderFailed => write!(f, "render_failed"),
        }
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    /// Who ran the render (e.g., `user@HOST`).
    pub actor: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<DocumentType>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event stamped with the current time and actor.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            doc_type: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_doc_type(mut self, doc_type: DocumentType) -> Self {
        self.doc_type = Some(doc_type);
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self)
            .map_err(|e| ShimError::Config(format!("failed to serialize event to JSON: {}", e)))
    }
}

fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Append an event to the log at `path` as one line.
///
/// The file and its parent directory are created if missing.
pub fn append_event(path: &Path, event: &Event) -> Result<()> {
    let json_line = event.to_ndjson_line()?;

    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        fs::create_dir_all(dir).map_err(|e| {
            ShimError::io(
                format!("failed to create events directory '{}'", dir.display()),
                e,
            )
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| ShimError::io(format!("failed to open events file '{}'", path.display()), e))?;

    // One write per line keeps concurrent appenders from interleaving mid-record.
    file.write_all(format!("{}\n", json_line).as_bytes())
        .map_err(|e| {
            ShimError::io(format!("failed to write event to '{}'", path.display()), e)
        })?;

    Ok(())
}

/// Read every event from the log at `path`. A missing file yields no events.
pub fn read_events(path: &Path) -> Result<Vec<Event>> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(ShimError::io(
                format!("failed to read events file '{}'", path.display()),
                e,
            ));
        }
    };

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .enumerate()
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| {
                ShimError::Config(format!(
                    "invalid event on line {} of '{}': {}",
                    i + 1,
                    path.display(),
                    e
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_event_serialization() {
        let event = Event::new(EventAction::RenderSucceeded)
            .with_doc_type(DocumentType::Image)
            .with_details(json!({"output_bytes": 42}));

        let line = event.to_ndjson_line().unwrap();

        assert!(!line.contains('\n'));
        assert!(line.contains(r#""action":"render_succeeded""#));
        assert!(line.contains(r#""doc_type":"image""#));
        assert!(line.contains(r#""output_bytes":42"#));
    }

    #[test]
    fn test_event_without_doc_type_omits_field() {
        let line = Event::new(EventAction::RenderFailed).to_ndjson_line().unwrap();
        assert!(!line.contains("doc_type"));
    }

    #[test]
    fn test_actor_has_user_at_host_shape() {
        let event = Event::new(EventAction::RenderFailed);
        assert!(event.actor.contains('@'));
    }

    #[test]
    fn test_append_creates_directory_and_appends_lines() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_dir.path().join("logs/nested/events.ndjson");

        append_event(&log, &Event::new(EventAction::RenderSucceeded)).unwrap();
        append_event(&log, &Event::new(EventAction::RenderFailed)).unwrap();

        let content = fs::read_to_string(&log).unwrap();
        assert_eq!(content.lines().count(), 2);

        let events = read_events(&log).unwrap();
        assert_eq!(events[0].action, EventAction::RenderSucceeded);
        assert_eq!(events[1].action, EventAction::RenderFailed);
    }

    #[test]
    fn test_read_missing_log_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let events = read_events(&temp_dir.path().join("none.ndjson")).unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn test_read_rejects_corrupt_line() {
        let temp_dir = TempDir::new().unwrap();
        let log = temp_dir.path().join("events.ndjson");
        fs::write(&log, "{not json}\n").unwrap();

        let err = read_events(&log).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_action_display_matches_serde() {
        for action in [EventAction::RenderSucceeded, EventAction::RenderFailed] {
            let serialized = serde_json::to_string(&action).unwrap();
            assert_eq!(serialized, format!("\"{}\"", action));
        }
    }
}
