//! Error and diagnostic system for the pattern parser.
//!
//! This module provides an error handling system with:
//! - Error codes for documentation and searchability
//! - Multiple labeled spans for rich error context
//! - Severity levels
//! - Diagnostic collector for accumulating multiple errors
//!
//! # Overview
//!
//! The error system is built around the [`Diagnostic`] type, which represents
//! a single error or warning message with optional error code, multiple source
//! locations, and help text. Multiple diagnostics are wrapped in [`ParseError`]
//! for returning from [`Pattern::parse`](crate::Pattern::parse).
//!
//! # Example
//!
//! ```
//! # use shelve_pattern::error::{Diagnostic, ErrorCode};
//! # use shelve_pattern::Span;
//!
//! let group = Span::new(0..1);
//! let nested = Span::new(9..10);
//!
//! let diag = Diagnostic::error("optional groups cannot be nested")
//!     .with_code(ErrorCode::E100)
//!     .with_label(nested, "nested group opened here")
//!     .with_secondary_label(group, "enclosing group opened here")
//!     .with_help("close the enclosing group before opening a new one");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod parse_error;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use parse_error::ParseError;
pub use severity::Severity;
