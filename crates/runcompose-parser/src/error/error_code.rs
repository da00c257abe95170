//! Error codes for the diagnostic system.
//!
//! Codes are grouped by phase:
//! - `E0xx` - Lexer errors
//! - `E2xx` - Flag value errors

use std::fmt;

/// Error codes for categorizing diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated single quote.
    E001,

    /// Unterminated double quote.
    E002,

    /// Unterminated command substitution.
    ///
    /// A `$(` was opened but its parentheses never balanced.
    E003,

    /// Command substitution nested too deeply.
    E004,

    // =========================================================================
    // Flag Value Errors (E2xx)
    // =========================================================================
    /// Invalid `--ulimit` value.
    ///
    /// Expected `<type>=<soft limit>[:<hard limit>]` with integer limits.
    E200,

    /// Invalid device rate.
    ///
    /// `--device-read-bps` and friends expect `<device path>:<rate>`.
    E201,

    /// Invalid device weight.
    ///
    /// `--blkio-weight-device` expects `<device path>:<integer weight>`.
    E202,

    /// Invalid number for an integer or decimal flag.
    E203,

    /// Invalid `--gpus` request.
    ///
    /// Accepted forms are `all`, a count, or `device=<id>[,<id>...]`.
    E204,
}

impl ErrorCode {
    /// Returns the code as a string, for example `"E001"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
            ErrorCode::E204 => "E204",
        }
    }

    /// Returns a short description of the error category.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated single quote",
            ErrorCode::E002 => "unterminated double quote",
            ErrorCode::E003 => "unterminated command substitution",
            ErrorCode::E004 => "command substitution nested too deeply",
            ErrorCode::E200 => "invalid ulimit",
            ErrorCode::E201 => "invalid device rate",
            ErrorCode::E202 => "invalid device weight",
            ErrorCode::E203 => "invalid number",
            ErrorCode::E204 => "invalid gpu request",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
