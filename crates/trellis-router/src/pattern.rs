//! Route pattern parsing.
//!
//! A pattern is a `/`-separated list of segments:
//!
//! | Segment         | Matches                                        |
//! |-----------------|------------------------------------------------|
//! | `users`         | exactly the literal text                       |
//! | `<id>`          | any single non-empty path segment              |
//! | `<id:\d+>`      | a single segment the regex matches in full     |
//! | `*`             | the remainder of the path, possibly empty      |
//!
//! The wildcard may only appear as the final segment.

use regex::Regex;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Parameter name under which a wildcard's captured remainder is bound.
pub const WILDCARD_PARAM: &str = "*";

/// Errors produced while parsing a route pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern does not begin with `/`.
    #[error("pattern `{0}` must start with `/`")]
    MissingLeadingSlash(String),

    /// A `<` without a matching `>` closing the segment.
    #[error("unclosed parameter `{segment}` in pattern `{pattern}`")]
    UnclosedParam {
        /// The full pattern.
        pattern: String,
        /// The offending segment.
        segment: String,
    },

    /// A parameter segment with no name (`<>` or `<:\d+>`).
    #[error("empty parameter name in pattern `{0}`")]
    EmptyParamName(String),

    /// The regex of a constrained parameter failed to compile.
    #[error("invalid regex for parameter `{name}`: {reason}")]
    InvalidRegex {
        /// The parameter name.
        name: String,
        /// Compiler message.
        reason: String,
    },

    /// A `*` segment that is not the last one.
    #[error("wildcard must be the last segment in pattern `{0}`")]
    WildcardNotLast(String),

    /// A literal segment containing reserved characters.
    #[error("invalid literal segment `{segment}` in pattern `{pattern}`")]
    InvalidLiteral {
        /// The full pattern.
        pattern: String,
        /// The offending segment.
        segment: String,
    },
}

/// One parsed segment of a pattern.
#[derive(Debug, Clone)]
pub enum Segment {
    /// Literal text, matched exactly.
    Static(String),
    /// Named parameter matching any non-empty segment.
    Param(String),
    /// Named parameter constrained by an anchored regex.
    Regex {
        /// Parameter name.
        name: String,
        /// Compiled `^(?:...)$` expression.
        regex: Regex,
    },
    /// Catch-all for the rest of the path.
    Wildcard,
}

impl Segment {
    /// Returns the parameter name bound by this segment, if any.
    #[must_use]
    pub fn param_name(&self) -> Option<&str> {
        match self {
            Self::Static(_) => None,
            Self::Param(name) | Self::Regex { name, .. } => Some(name),
            Self::Wildcard => Some(WILDCARD_PARAM),
        }
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Static(a), Self::Static(b)) | (Self::Param(a), Self::Param(b)) => a == b,
            (
                Self::Regex { name: a, regex: ra },
                Self::Regex { name: b, regex: rb },
            ) => a == b && ra.as_str() == rb.as_str(),
            (Self::Wildcard, Self::Wildcard) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(text) => f.write_str(text),
            Self::Param(name) => write!(f, "<{name}>"),
            Self::Regex { name, regex } => {
                let source = regex
                    .as_str()
                    .strip_prefix("^(?:")
                    .and_then(|s| s.strip_suffix(")$"))
                    .unwrap_or_else(|| regex.as_str());
                write!(f, "<{name}:{source}>")
            }
            Self::Wildcard => f.write_str("*"),
        }
    }
}

/// A parsed route pattern.
///
/// # Example
///
/// ```rust
/// use trellis_router::Pattern;
///
/// let pattern = Pattern::parse(r"/users/<id:\d+>/<action>/*").unwrap();
/// assert_eq!(pattern.segments().len(), 4);
/// assert_eq!(pattern.param_count(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Pattern {
    raw: String,
    segments: Vec<Segment>,
    names: Arc<[Arc<str>]>,
}

impl Pattern {
    /// Parses a pattern string.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let body = raw
            .strip_prefix('/')
            .ok_or_else(|| PatternError::MissingLeadingSlash(raw.to_string()))?;

        let mut segments = Vec::new();
        if !body.is_empty() {
            let parts: Vec<&str> = body.split('/').collect();
            let last = parts.len() - 1;
            for (i, part) in parts.into_iter().enumerate() {
                let segment = parse_segment(raw, part)?;
                if matches!(segment, Segment::Wildcard) && i != last {
                    return Err(PatternError::WildcardNotLast(raw.to_string()));
                }
                segments.push(segment);
            }
        }

        let names = segments
            .iter()
            .filter_map(Segment::param_name)
            .map(Arc::from)
            .collect();

        Ok(Self {
            raw: raw.to_string(),
            segments,
            names,
        })
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns parameter names in declaration order.
    ///
    /// A wildcard contributes [`WILDCARD_PARAM`].
    #[must_use]
    pub fn param_names(&self) -> &Arc<[Arc<str>]> {
        &self.names
    }

    /// Returns the number of parameters the pattern binds.
    #[must_use]
    pub fn param_count(&self) -> usize {
        self.names.len()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn parse_segment(pattern: &str, part: &str) -> Result<Segment, PatternError> {
    if part == "*" {
        return Ok(Segment::Wildcard);
    }

    if let Some(inner) = part.strip_prefix('<') {
        let inner = inner
            .strip_suffix('>')
            .ok_or_else(|| PatternError::UnclosedParam {
                pattern: pattern.to_string(),
                segment: part.to_string(),
            })?;

        let (name, source) = match inner.split_once(':') {
            Some((name, source)) => (name, Some(source)),
            None => (inner, None),
        };
        if name.is_empty() {
            return Err(PatternError::EmptyParamName(pattern.to_string()));
        }

        return match source {
            Some(source) if !source.is_empty() => {
                let regex = Regex::new(&format!("^(?:{source})$")).map_err(|e| {
                    PatternError::InvalidRegex {
                        name: name.to_string(),
                        reason: e.to_string(),
                    }
                })?;
                Ok(Segment::Regex {
                    name: name.to_string(),
                    regex,
                })
            }
            _ => Ok(Segment::Param(name.to_string())),
        };
    }

    if part.contains(['<', '>', '*']) {
        return Err(PatternError::InvalidLiteral {
            pattern: pattern.to_string(),
            segment: part.to_string(),
        });
    }

    Ok(Segment::Static(part.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_root() {
        let pattern = Pattern::parse("/").unwrap();
        assert!(pattern.segments().is_empty());
        assert_eq!(pattern.param_count(), 0);
    }

    #[test]
    fn test_parse_static() {
        let pattern = Pattern::parse("/users/list").unwrap();
        assert_eq!(
            pattern.segments(),
            &[
                Segment::Static("users".to_string()),
                Segment::Static("list".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_trailing_slash_keeps_empty_literal() {
        let pattern = Pattern::parse("/users/").unwrap();
        assert_eq!(pattern.segments().len(), 2);
        assert_eq!(pattern.segments()[1], Segment::Static(String::new()));
    }

    #[test]
    fn test_parse_param_and_regex() {
        let pattern = Pattern::parse(r"/users/<id:\d+>/<action>").unwrap();
        assert_eq!(pattern.segments()[1].param_name(), Some("id"));
        assert!(matches!(pattern.segments()[1], Segment::Regex { .. }));
        assert_eq!(pattern.segments()[2], Segment::Param("action".to_string()));

        let names: Vec<&str> = pattern.param_names().iter().map(AsRef::as_ref).collect();
        assert_eq!(names, vec!["id", "action"]);
    }

    #[test]
    fn test_parse_empty_regex_is_plain_param() {
        let pattern = Pattern::parse("/users/<id:>").unwrap();
        assert_eq!(pattern.segments()[1], Segment::Param("id".to_string()));
    }

    #[test]
    fn test_parse_wildcard() {
        let pattern = Pattern::parse("/files/*").unwrap();
        assert_eq!(pattern.segments()[1], Segment::Wildcard);
        assert_eq!(pattern.param_names()[0].as_ref(), WILDCARD_PARAM);
    }

    #[test]
    fn test_regex_display_round_trips_source() {
        let pattern = Pattern::parse(r"/users/<id:\d+>").unwrap();
        assert_eq!(pattern.segments()[1].to_string(), r"<id:\d+>");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(
            Pattern::parse("users").unwrap_err(),
            PatternError::MissingLeadingSlash("users".to_string())
        );
        assert!(matches!(
            Pattern::parse("/users/<id").unwrap_err(),
            PatternError::UnclosedParam { .. }
        ));
        assert!(matches!(
            Pattern::parse("/users/<>").unwrap_err(),
            PatternError::EmptyParamName(_)
        ));
        assert!(matches!(
            Pattern::parse("/users/<id:[>").unwrap_err(),
            PatternError::InvalidRegex { .. }
        ));
        assert!(matches!(
            Pattern::parse("/files/*/meta").unwrap_err(),
            PatternError::WildcardNotLast(_)
        ));
        assert!(matches!(
            Pattern::parse("/files/a*b").unwrap_err(),
            PatternError::InvalidLiteral { .. }
        ));
    }
}
