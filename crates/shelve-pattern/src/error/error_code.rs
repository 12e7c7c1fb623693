//! Error codes for pattern diagnostics.
//!
//! Error codes are organized by phase:
//! - `E0xx` - Lexer errors
//! - `E1xx` - Group structure errors
//! - `E2xx` - Placeholder validation errors

use std::fmt;

/// Error codes for categorizing diagnostic errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Lexer Errors (E0xx)
    // =========================================================================
    /// Unterminated placeholder.
    ///
    /// A placeholder was opened with `{` but never closed with `}`.
    E001,

    /// Unexpected character.
    ///
    /// A `}` appeared outside of any placeholder.
    E002,

    /// Empty placeholder name.
    ///
    /// A placeholder such as `{}` or `{|default}` names no entity.
    E003,

    /// Unterminated value constraint.
    ///
    /// A constraint was opened with `<` inside a placeholder but never
    /// closed with `>`.
    E004,

    // =========================================================================
    // Group Errors (E1xx)
    // =========================================================================
    /// Nested optional group.
    ///
    /// A `[` appeared inside an optional group that was still open.
    E100,

    /// Unclosed optional group.
    ///
    /// The pattern ended while an optional group was still open.
    E101,

    /// Unmatched closing bracket.
    ///
    /// A `]` appeared without a matching `[`.
    E102,

    // =========================================================================
    // Validation Errors (E2xx)
    // =========================================================================
    /// Invalid value constraint.
    ///
    /// The text between `<` and `>` is not a valid regular expression.
    E200,
}

impl ErrorCode {
    /// Returns the code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E003 => "E003",
            ErrorCode::E004 => "E004",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E102 => "E102",
            ErrorCode::E200 => "E200",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "unterminated placeholder",
            ErrorCode::E002 => "unexpected character",
            ErrorCode::E003 => "empty placeholder name",
            ErrorCode::E004 => "unterminated value constraint",
            ErrorCode::E100 => "nested optional group",
            ErrorCode::E101 => "unclosed optional group",
            ErrorCode::E102 => "unmatched closing bracket",
            ErrorCode::E200 => "invalid value constraint",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
