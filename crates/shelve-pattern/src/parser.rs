//! Builds pattern segments from a token stream.
//!
//! This module transforms tokens from the [`lexer`](super::lexer) into the
//! [`Segment`] tree held by a [`Pattern`](crate::Pattern). Group structure
//! is checked here: optional groups may not nest, and every `[` needs a
//! matching `]`. Value constraints are compiled here as well.

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    pattern::{Constraint, Placeholder, Segment},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// An optional group that is still being filled.
struct OpenGroup {
    span: Span,
    segments: Vec<Segment>,
}

/// Segment builder that accumulates diagnostics while walking tokens.
struct Builder {
    segments: Vec<Segment>,
    group: Option<OpenGroup>,
    diagnostics: DiagnosticCollector,
}

impl Builder {
    fn new() -> Self {
        Self {
            segments: Vec::new(),
            group: None,
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Push a segment into the open group, or the top level if none is open.
    fn push(&mut self, segment: Segment) {
        match &mut self.group {
            Some(group) => group.segments.push(segment),
            None => self.segments.push(segment),
        }
    }

    fn token(&mut self, positioned: &PositionedToken<'_>) {
        let span = positioned.span;

        match &positioned.token {
            Token::Literal(text) => self.push(Segment::Literal((*text).to_string())),
            Token::Placeholder {
                name,
                constraint,
                default,
            } => {
                if let Some(placeholder) = self.placeholder(name, *constraint, *default, span) {
                    self.push(Segment::Placeholder(placeholder));
                }
            }
            Token::OpenGroup => self.open_group(span),
            Token::CloseGroup => self.close_group(span),
        }
    }

    fn placeholder(
        &mut self,
        name: &str,
        constraint: Option<&str>,
        default: Option<&str>,
        span: Span,
    ) -> Option<Placeholder> {
        let mut placeholder = Placeholder::new(name);

        if let Some(source) = constraint {
            match Constraint::new(source) {
                Ok(constraint) => placeholder = placeholder.with_constraint(constraint),
                Err(err) => {
                    self.diagnostics.emit(
                        Diagnostic::error(format!(
                            "invalid value constraint for placeholder `{name}`"
                        ))
                        .with_code(ErrorCode::E200)
                        .with_label(span, ErrorCode::E200.description())
                        .with_help(err.to_string()),
                    );
                    return None;
                }
            }
        }

        if let Some(default) = default {
            placeholder = placeholder.with_default(default);
        }

        Some(placeholder)
    }

    fn open_group(&mut self, span: Span) {
        if let Some(outer) = &self.group {
            self.diagnostics.emit(
                Diagnostic::error("optional groups cannot be nested")
                    .with_code(ErrorCode::E100)
                    .with_label(span, "nested group opened here")
                    .with_secondary_label(outer.span, "enclosing group opened here")
                    .with_help("close the enclosing group with `]` before opening another"),
            );
            return;
        }

        self.group = Some(OpenGroup {
            span,
            segments: Vec::new(),
        });
    }

    fn close_group(&mut self, span: Span) {
        let Some(group) = self.group.take() else {
            self.diagnostics.emit(
                Diagnostic::error("unmatched closing bracket")
                    .with_code(ErrorCode::E102)
                    .with_label(span, ErrorCode::E102.description())
                    .with_help("open an optional group with `[` first"),
            );
            return;
        };

        if group.segments.is_empty() {
            self.diagnostics.emit(
                Diagnostic::warning("empty optional group")
                    .with_label(group.span.union(span), "renders as nothing"),
            );
        }

        self.segments.push(Segment::Optional(group.segments));
    }

    fn finish(mut self) -> Result<(Vec<Segment>, Vec<Diagnostic>), ParseError> {
        if let Some(group) = self.group.take() {
            self.diagnostics.emit(
                Diagnostic::error("unclosed optional group")
                    .with_code(ErrorCode::E101)
                    .with_label(group.span, "group opened here")
                    .with_help("add a closing `]`"),
            );
        }

        let warnings = self.diagnostics.finish()?;
        Ok((self.segments, warnings))
    }
}

/// Build the segment tree for a tokenized pattern.
///
/// # Returns
///
/// - `Ok((segments, warnings))` - The pattern is well formed; `warnings` may
///   be empty
/// - `Err(ParseError)` - One or more structural errors; contains all diagnostics
pub fn build_segments(
    tokens: &[PositionedToken<'_>],
) -> Result<(Vec<Segment>, Vec<Diagnostic>), ParseError> {
    let mut builder = Builder::new();
    for token in tokens {
        builder.token(token);
    }
    builder.finish()
}
