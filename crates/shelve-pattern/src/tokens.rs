//! Token types produced by the pattern [`lexer`](super::lexer).

use std::fmt;

use crate::span::Span;

/// Token types for the path-pattern language
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'src> {
    /// Literal text copied through unchanged, including path separators.
    Literal(&'src str),

    /// `{name}`, `{name<constraint>}`, `{name|default}` or both.
    Placeholder {
        name: &'src str,
        constraint: Option<&'src str>,
        default: Option<&'src str>,
    },

    /// `[`
    OpenGroup,

    /// `]`
    CloseGroup,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Literal(text) => write!(f, "{text}"),
            Token::Placeholder {
                name,
                constraint,
                default,
            } => {
                write!(f, "{{{name}")?;
                if let Some(constraint) = constraint {
                    write!(f, "<{constraint}>")?;
                }
                if let Some(default) = default {
                    write!(f, "|{default}")?;
                }
                write!(f, "}}")
            }
            Token::OpenGroup => write!(f, "["),
            Token::CloseGroup => write!(f, "]"),
        }
    }
}

/// A token with its location in the pattern source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionedToken<'src> {
    pub token: Token<'src>,
    pub span: Span,
}

impl<'src> PositionedToken<'src> {
    pub fn new(token: Token<'src>, span: Span) -> Self {
        Self { token, span }
    }
}
