//! Labeled source spans for diagnostic messages.

use crate::span::Span;

/// A labeled span in pattern source.
///
/// - **Primary labels** mark the main location of a problem.
/// - **Secondary labels** point at related locations, such as the group a
///   nested bracket was opened inside.
///
/// ```text
/// error[E100]: optional groups cannot be nested
///  |
///  | [{session}/[{acq}]]{task}.nii
///  | -          ^ nested group opened here
///  | |
///  | enclosing group opened here
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    span: Span,
    message: String,
    is_primary: bool,
}

impl Label {
    /// Create a new primary label.
    pub fn primary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: true,
        }
    }

    /// Create a new secondary label.
    pub fn secondary(span: Span, message: impl Into<String>) -> Self {
        Self {
            span,
            message: message.into(),
            is_primary: false,
        }
    }

    pub fn span(&self) -> Span {
        self.span
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_primary(&self) -> bool {
        self.is_primary
    }

    pub fn is_secondary(&self) -> bool {
        !self.is_primary
    }
}
