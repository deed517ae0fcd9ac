//! Exit code constants for the render-shim CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unknown document type, invalid config, existing output)
//! - 2: Render failure (non-zero exit from the binary, stream I/O)
//! - 3: Render timed out
//! - 4: Renderer unavailable (disabled or binary missing)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, unknown document type, or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// The rendering binary failed or its streams could not be read or written.
pub const RENDER_FAILURE: i32 = 2;

/// The rendering binary did not exit within the configured timeout.
pub const TIMEOUT: i32 = 3;

/// The renderer is disabled or its binary cannot be executed.
pub const UNAVAILABLE: i32 = 4;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_are_distinct() {
        let codes = [SUCCESS, USER_ERROR, RENDER_FAILURE, TIMEOUT, UNAVAILABLE];
        for (i, &a) in codes.iter().enumerate() {
            for (j, &b) in codes.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b, "Exit codes must be distinct");
                }
            }
        }
    }

    #[test]
    fn success_is_zero() {
        assert_eq!(SUCCESS, 0);
    }
}
