//! Lexical analyzer for path patterns.
//!
//! The lexer converts pattern text into a stream of [`Token`]s: literal runs,
//! placeholders, and the brackets that delimit optional groups.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, opt, preceded, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::take_while,
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()`. The error span covers from
/// `start` to the error position.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
    pub start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

/// Characters with structural meaning outside a placeholder.
fn is_reserved(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']')
}

/// Characters allowed in a placeholder name.
fn is_name_char(c: char) -> bool {
    !is_reserved(c) && !matches!(c, '<' | '>' | '|')
}

/// Parse a run of literal text, separators and whitespace included.
fn literal_text<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., |c: char| !is_reserved(c))
        .map(Token::Literal)
        .parse_next(input)
}

/// Parse the entity name at the start of a placeholder.
fn placeholder_name<'a>(input: &mut Input<'a>, start: usize) -> IResult<'a, &'a str> {
    take_while(1.., is_name_char)
        .context(LexerDiagnostic {
            code: ErrorCode::E003,
            message: "empty placeholder name",
            help: Some("name the entity to substitute, e.g. `{subject}`"),
            start,
        })
        .parse_next(input)
}

/// Parse a `<regex>` value constraint.
///
/// Commits after `<`, so a missing `>` is reported as E004 rather than
/// falling through to the closing-brace check.
fn value_constraint<'a>(input: &mut Input<'a>, start: usize) -> IResult<'a, &'a str> {
    preceded(
        '<',
        cut_err(terminated(take_while(0.., |c: char| c != '>'), '>')).context(
            LexerDiagnostic {
                code: ErrorCode::E004,
                message: "unterminated value constraint",
                help: Some("close the constraint with `>`, e.g. `{run<[0-9]+>}`"),
                start,
            },
        ),
    )
    .parse_next(input)
}

/// Parse a `|default` value.
fn default_value<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    preceded('|', take_while(0.., |c: char| !is_reserved(c))).parse_next(input)
}

/// Parse a placeholder: `{name}`, `{name<constraint>}`, `{name|default}`
/// or `{name<constraint>|default}`.
fn placeholder<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();

    preceded(
        '{',
        cut_err(terminated(
            (
                |i: &mut Input<'a>| placeholder_name(i, start),
                opt(|i: &mut Input<'a>| value_constraint(i, start)),
                opt(default_value),
            ),
            '}',
        ))
        .context(LexerDiagnostic {
            code: ErrorCode::E001,
            message: "unterminated placeholder",
            help: Some("add a closing `}`"),
            start,
        }),
    )
    .map(|(name, constraint, default)| Token::Placeholder {
        name,
        constraint,
        default,
    })
    .parse_next(input)
}

/// Parse optional-group brackets
fn group_bracket<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt(('['.value(Token::OpenGroup), ']'.value(Token::CloseGroup))).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        placeholder,   // Must come before literal text
        group_bracket, // Brackets are never part of a literal
        literal_text,  // Everything else up to the next reserved character
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    Ok(PositionedToken::new(token, Span::new(start_pos..end_pos)))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            match positioned_token(&mut input) {
                Ok(token) => self.tokens.push(token),
                Err(e) => {
                    let error_pos = input.current_token_start();
                    self.diagnostics.emit(Self::convert_err_mode(e, error_pos));

                    if !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|_| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Uses the innermost `LexerDiagnostic` context when present and falls
    /// back to E002 (unexpected character) otherwise.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos.max(*start + 1));

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
            .with_help("`}` may only close a placeholder; literal braces are not supported")
    }
}

/// Tokenize pattern text, collecting multiple errors.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully parsed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let mut lexer = Lexer::new();
    lexer.tokenize(LocatingSlice::new(input));
    lexer.finish()
}
