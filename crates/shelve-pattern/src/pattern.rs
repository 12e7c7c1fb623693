//! Parsed path patterns and their rendering.
//!
//! A [`Pattern`] is a sequence of [`Segment`]s: literal text, placeholders,
//! and optional groups. Rendering substitutes entity values into the
//! placeholders:
//!
//! - a required placeholder without a usable value makes the whole pattern
//!   [`Unresolved`];
//! - an optional group is kept only when every placeholder inside it has a
//!   value, and is dropped entirely (literals included) otherwise.
//!
//! # Example
//!
//! ```
//! use shelve_core::entity::Entities;
//! use shelve_pattern::Pattern;
//!
//! let pattern = Pattern::parse("[ses-{session}/]{task}/r-{run}.nii.gz").unwrap();
//! let entities = Entities::new().with("task", "rest").with("run", 2);
//!
//! assert_eq!(pattern.render(&entities).unwrap(), "rest/r-2.nii.gz");
//! ```

use std::{
    fmt,
    path::{self, Path},
    str::FromStr,
};

use log::{trace, warn};
use regex::Regex;
use thiserror::Error;

use shelve_core::entity::Entities;

use crate::{
    error::{Diagnostic, ParseError},
    lexer, parser,
};

/// A value constraint attached to a placeholder, written `{name<regex>}`.
///
/// The value, in string form, must match the expression in full.
#[derive(Debug, Clone)]
pub struct Constraint {
    source: String,
    regex: Regex,
}

impl Constraint {
    /// Compile a constraint from its source expression.
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{source})$"))?;
        Ok(Self {
            source: source.to_string(),
            regex,
        })
    }

    /// The expression as written in the pattern.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns `true` if `value` satisfies the constraint.
    pub fn accepts(&self, value: &str) -> bool {
        self.regex.is_match(value)
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Constraint {}

/// A named slot in a pattern, filled from an entity value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    name: String,
    constraint: Option<Constraint>,
    default: Option<String>,
}

impl Placeholder {
    /// Create a required placeholder for the entity `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            constraint: None,
            default: None,
        }
    }

    /// Attach a value constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraint = Some(constraint);
        self
    }

    /// Attach a default used when the entity is absent or rejected.
    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constraint(&self) -> Option<&Constraint> {
        self.constraint.as_ref()
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default.as_deref()
    }

    /// Returns the string to substitute for this placeholder, if any.
    ///
    /// The entity value is used when present, free of pattern markup
    /// (`{`, `}`, `[`, `]`) and accepted by the constraint; otherwise the
    /// default, if one was given.
    pub fn value(&self, entities: &Entities) -> Option<String> {
        let accepted = entities
            .get(&self.name)
            .map(ToString::to_string)
            .filter(|value| !value.contains(is_markup))
            .filter(|value| {
                self.constraint
                    .as_ref()
                    .is_none_or(|constraint| constraint.accepts(value))
            });

        accepted.or_else(|| self.default.clone())
    }
}

/// Characters that are pattern syntax and may never reach a rendered path.
fn is_markup(c: char) -> bool {
    matches!(c, '{' | '}' | '[' | ']')
}

/// One element of a parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Text copied through unchanged.
    Literal(String),

    /// A placeholder substituted from the entity mapping.
    Placeholder(Placeholder),

    /// A bracketed group kept only if all its placeholders have values.
    Optional(Vec<Segment>),
}

impl Segment {
    /// Returns `true` if rendering this segment always ends at a path
    /// separator.
    fn ends_at_separator(&self) -> bool {
        match self {
            Segment::Literal(text) => text.ends_with(path::is_separator),
            Segment::Optional(group) => group.last().is_some_and(Segment::ends_at_separator),
            Segment::Placeholder(_) => false,
        }
    }
}

/// A placeholder that could not be filled while rendering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no value for required placeholder `{placeholder}`")]
pub struct Unresolved {
    placeholder: String,
}

impl Unresolved {
    fn new(placeholder: &str) -> Self {
        Self {
            placeholder: placeholder.to_string(),
        }
    }

    /// Name of the first required placeholder without a value.
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }
}

/// A parsed path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
    warnings: Vec<Diagnostic>,
}

impl Pattern {
    /// Parse pattern text.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] carrying every diagnostic found in the
    /// pattern, e.g. an unterminated placeholder or a nested optional group.
    /// Warnings do not fail the parse; they are logged and kept on the
    /// pattern, see [`Pattern::warnings`].
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        trace!(pattern = source; "Parsing pattern");

        let tokens = lexer::tokenize(source)?;
        let (segments, warnings) = parser::build_segments(&tokens)?;

        for warning in &warnings {
            warn!(pattern = source; "{}", warning.message());
        }

        Ok(Self {
            source: source.to_string(),
            segments,
            warnings,
        })
    }

    /// The pattern text as written.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Non-fatal diagnostics found while parsing, such as an empty optional
    /// group.
    pub fn warnings(&self) -> &[Diagnostic] {
        &self.warnings
    }

    /// Render the pattern against an entity mapping.
    ///
    /// # Errors
    ///
    /// Returns [`Unresolved`] naming the first required placeholder with no
    /// usable value. Placeholders inside optional groups never cause this
    /// error; their group is dropped instead.
    pub fn render(&self, entities: &Entities) -> Result<String, Unresolved> {
        let mut rendered = String::new();
        render_segments(&self.segments, entities, &mut rendered)?;
        Ok(rendered)
    }

    /// Names of every placeholder in the pattern, optional groups included,
    /// in order of appearance.
    pub fn placeholder_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_names(&self.segments, &mut names);
        names
    }

    /// Returns `true` if the pattern text itself starts at a filesystem root.
    ///
    /// Only literal text counts; a placeholder value with a leading
    /// separator never makes a pattern absolute.
    pub fn is_absolute(&self) -> bool {
        match self.segments.first() {
            Some(Segment::Literal(text)) => Path::new(text).has_root(),
            _ => false,
        }
    }

    /// Returns `true` if the last path component of the pattern is a single
    /// bare placeholder, as in `{task}/{subject}`.
    pub fn ends_with_placeholder_component(&self) -> bool {
        match self.segments.as_slice() {
            [Segment::Placeholder(_)] => true,
            [.., before, Segment::Placeholder(_)] => before.ends_at_separator(),
            _ => false,
        }
    }
}

impl FromStr for Pattern {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn render_segments(
    segments: &[Segment],
    entities: &Entities,
    out: &mut String,
) -> Result<(), Unresolved> {
    for segment in segments {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder(placeholder) => {
                let value = placeholder
                    .value(entities)
                    .ok_or_else(|| Unresolved::new(placeholder.name()))?;
                out.push_str(&value);
            }
            Segment::Optional(group) => {
                let mut chunk = String::new();
                match render_segments(group, entities, &mut chunk) {
                    Ok(()) => out.push_str(&chunk),
                    Err(missing) => {
                        trace!(placeholder = missing.placeholder(); "Dropping optional group");
                    }
                }
            }
        }
    }
    Ok(())
}

fn collect_names<'a>(segments: &'a [Segment], names: &mut Vec<&'a str>) {
    for segment in segments {
        match segment {
            Segment::Literal(_) => {}
            Segment::Placeholder(placeholder) => names.push(placeholder.name()),
            Segment::Optional(group) => collect_names(group, names),
        }
    }
}

/// A pattern that failed to parse, together with its source text.
#[derive(Debug, Error)]
#[error("invalid pattern `{pattern}`: {error}")]
pub struct PatternError {
    pattern: String,
    #[source]
    error: ParseError,
}

impl PatternError {
    /// The pattern text that failed to parse.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn error(&self) -> &ParseError {
        &self.error
    }

    /// Split into the pattern text and its diagnostics.
    pub fn into_parts(self) -> (String, ParseError) {
        (self.pattern, self.error)
    }
}

/// An ordered list of candidate patterns.
///
/// A single [`Pattern`] converts into a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatternList(Vec<Pattern>);

impl PatternList {
    pub fn new(patterns: Vec<Pattern>) -> Self {
        Self(patterns)
    }

    /// Parse each source string in order.
    ///
    /// # Errors
    ///
    /// Returns a [`PatternError`] for the first source that fails to parse.
    pub fn parse<I, S>(sources: I) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        sources
            .into_iter()
            .map(|source| {
                let source = source.as_ref();
                Pattern::parse(source).map_err(|error| PatternError {
                    pattern: source.to_string(),
                    error,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pattern> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Pattern> for PatternList {
    fn from(pattern: Pattern) -> Self {
        Self(vec![pattern])
    }
}

impl From<Vec<Pattern>> for PatternList {
    fn from(patterns: Vec<Pattern>) -> Self {
        Self(patterns)
    }
}

impl FromIterator<Pattern> for PatternList {
    fn from_iter<I: IntoIterator<Item = Pattern>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a PatternList {
    type Item = &'a Pattern;
    type IntoIter = std::slice::Iter<'a, Pattern>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Severity;

    fn pattern(source: &str) -> Pattern {
        Pattern::parse(source).expect("pattern should parse")
    }

    fn sample_entities() -> Entities {
        Entities::new()
            .with("task", "rest")
            .with("subject", "3")
            .with("run", "2")
    }

    #[test]
    fn test_render_required_placeholders() {
        let rendered = pattern("{task}/sub-{subject}/run-{run}.nii.gz")
            .render(&sample_entities())
            .unwrap();

        assert_eq!(rendered, "rest/sub-3/run-2.nii.gz");
    }

    #[test]
    fn test_render_missing_required_is_unresolved() {
        let err = pattern("{session}/{task}/r-{run}.nii.gz")
            .render(&sample_entities())
            .unwrap_err();

        assert_eq!(err.placeholder(), "session");
    }

    #[test]
    fn test_render_drops_incomplete_optional_group() {
        let rendered = pattern("[{session}/]{task}/r-{run}.nii.gz")
            .render(&sample_entities())
            .unwrap();

        assert_eq!(rendered, "rest/r-2.nii.gz");
    }

    #[test]
    fn test_render_keeps_complete_optional_group() {
        let entities = sample_entities().with("session", "01");
        let rendered = pattern("[ses-{session}/]{task}.nii.gz")
            .render(&entities)
            .unwrap();

        assert_eq!(rendered, "ses-01/rest.nii.gz");
    }

    #[test]
    fn test_optional_group_needs_every_placeholder() {
        let rendered = pattern("sub-{subject}[_ses-{session}_acq-{acq}].txt")
            .render(&sample_entities().with("session", "1"))
            .unwrap();

        assert_eq!(rendered, "sub-3.txt");
    }

    #[test]
    fn test_numeric_values_are_stringified() {
        let entities = Entities::new().with("run", 4).with("bval", 0);
        let rendered = pattern("run-{run}_b{bval}").render(&entities).unwrap();

        assert_eq!(rendered, "run-4_b0");
    }

    #[test]
    fn test_separator_in_value_nests_directories() {
        let entities = Entities::new().with("group", "a/b");
        assert_eq!(pattern("{group}/x").render(&entities).unwrap(), "a/b/x");
    }

    #[test]
    fn test_default_used_when_missing() {
        let rendered = pattern("{task|rest}.txt").render(&Entities::new()).unwrap();
        assert_eq!(rendered, "rest.txt");
    }

    #[test]
    fn test_constraint_rejects_value() {
        let p = pattern("{task<rest|nback>}.txt");

        assert_eq!(
            p.render(&Entities::new().with("task", "nback")).unwrap(),
            "nback.txt"
        );
        assert!(p.render(&Entities::new().with("task", "motor")).is_err());
    }

    #[test]
    fn test_constraint_must_match_whole_value() {
        let p = pattern("run-{run<[0-9]+>}");
        assert!(p.render(&Entities::new().with("run", "12a")).is_err());
    }

    #[test]
    fn test_rejected_value_falls_back_to_default() {
        let rendered = pattern("{task<rest|nback>|rest}")
            .render(&Entities::new().with("task", "motor"))
            .unwrap();

        assert_eq!(rendered, "rest");
    }

    #[test]
    fn test_empty_group_warning_kept_on_pattern() {
        let p = pattern("sub-{subject}[]/x.txt");

        assert_eq!(p.warnings().len(), 1);
        assert_eq!(p.warnings()[0].severity(), Severity::Warning);
        assert!(pattern("sub-{subject}/x.txt").warnings().is_empty());
    }

    #[test]
    fn test_value_with_markup_is_unusable() {
        let entities = Entities::new().with("subject", "{run}[1]");

        let err = pattern("sub-{subject}/x.txt").render(&entities).unwrap_err();
        assert_eq!(err.placeholder(), "subject");

        let rendered = pattern("sub-{subject|unknown}/x.txt")
            .render(&entities)
            .unwrap();
        assert_eq!(rendered, "sub-unknown/x.txt");
    }

    #[test]
    fn test_value_with_markup_drops_optional_group() {
        let entities = Entities::new().with("task", "rest").with("session", "a]b");
        let rendered = pattern("[ses-{session}/]{task}").render(&entities).unwrap();

        assert_eq!(rendered, "rest");
    }

    #[test]
    fn test_placeholder_names_include_optional() {
        let p = pattern("[{session}/]{task}/r-{run}");
        assert_eq!(p.placeholder_names(), vec!["session", "task", "run"]);
    }

    #[test]
    fn test_ends_with_placeholder_component() {
        assert!(pattern("{task}").ends_with_placeholder_component());
        assert!(pattern("out/{task}").ends_with_placeholder_component());
        assert!(pattern("[{session}/]{task}").ends_with_placeholder_component());
        assert!(!pattern("out/run-{run}").ends_with_placeholder_component());
        assert!(!pattern("{task}.txt").ends_with_placeholder_component());
        assert!(!pattern("{task}/").ends_with_placeholder_component());
    }

    #[test]
    fn test_is_absolute_follows_literal_text() {
        assert!(pattern("/data/{task}.txt").is_absolute());
        assert!(!pattern("{task}/x.txt").is_absolute());
        assert!(!pattern("[/{session}]{task}").is_absolute());
        assert!(!pattern("data/{task}").is_absolute());
    }

    #[test]
    fn test_display_is_source() {
        let source = "[{session}/]{task}";
        assert_eq!(pattern(source).to_string(), source);
    }

    #[test]
    fn test_pattern_list_parse_reports_failing_source() {
        let err = PatternList::parse(["{task}", "{task"]).unwrap_err();
        assert_eq!(err.pattern(), "{task");
    }

    #[test]
    fn test_pattern_list_from_single() {
        let list = PatternList::from(pattern("{task}"));
        assert_eq!(list.len(), 1);
    }
}
