//! Filesystem utilities for render-shim.
//!
//! Rendered output is always written atomically so a failed or interrupted
//! render never leaves a truncated document at the destination path.

pub mod atomic;

pub use atomic::{Overwrite, atomic_write};
