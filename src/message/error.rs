use std::fmt;

use serde_json::Value;
use thiserror::Error;

/// Why a payload was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    #[error("unknown element kind `{}`", .tag.as_deref().unwrap_or("<missing type>"))]
    UnknownElementKind { tag: Option<String> },

    #[error("missing required field")]
    MissingField,

    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid value `{value}`, expected one of: {}", .allowed.join(", "))]
    InvalidEnumValue {
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("message chains nested deeper than {limit}")]
    DepthLimitExceeded { limit: usize },

    #[error("malformed JSON: {0}")]
    Syntax(String),
}

/// One step from the outermost chain down to the failing value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Index(usize),
    Field(&'static str),
}

/// Location of a failure, e.g. `[2].origin[0].text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Path(Vec<Segment>);

impl Path {
    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("$");
        }
        for (pos, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Index(index) => write!(f, "[{index}]")?,
                Segment::Field(name) if pos == 0 => f.write_str(name)?,
                Segment::Field(name) => write!(f, ".{name}")?,
            }
        }
        Ok(())
    }
}

/// The first problem found while decoding a chain.
///
/// Decoding is fail-fast: a chain either decodes completely or yields
/// exactly one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}{}: {kind}", .tag.map(|t| format!(" ({t})")).unwrap_or_default())]
pub struct DecodeError {
    path: Path,
    tag: Option<&'static str>,
    kind: ErrorKind,
}

impl DecodeError {
    pub(crate) fn new(kind: ErrorKind) -> Self {
        Self {
            path: Path::default(),
            tag: None,
            kind,
        }
    }

    pub(crate) fn syntax(err: serde_json::Error) -> Self {
        Self::new(ErrorKind::Syntax(err.to_string()))
    }

    pub(crate) fn with_tag(mut self, tag: &'static str) -> Self {
        self.tag.get_or_insert(tag);
        self
    }

    pub(crate) fn at_field(mut self, field: &'static str) -> Self {
        self.path.0.insert(0, Segment::Field(field));
        self
    }

    pub(crate) fn at_index(mut self, index: usize) -> Self {
        self.path.0.insert(0, Segment::Index(index));
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Tag of the variant (or `ForwardNode`) whose contract was violated.
    pub fn tag(&self) -> Option<&'static str> {
        self.tag
    }

    /// Index of the offending element in the outermost chain.
    ///
    /// `None` when a single element was decoded on its own: indices inside
    /// it (e.g. `nodeList[2]`) are positions in a field, not in a chain.
    pub fn index(&self) -> Option<usize> {
        match self.path.0.first() {
            Some(Segment::Index(index)) => Some(*index),
            _ => None,
        }
    }

    /// Name of the offending field, if the failure is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self.path.0.last() {
            Some(Segment::Field(name)) => Some(*name),
            _ => None,
        }
    }
}

/// Short name of a JSON value's shape, for mismatch reports.
pub(crate) fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(n) if n.as_i64().is_none() => "integer outside the i64 range",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

pub(crate) fn mismatch(expected: &'static str, found: &Value) -> ErrorKind {
    ErrorKind::TypeMismatch {
        expected,
        found: shape_of(found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_renders_nesting() {
        let err = DecodeError::new(ErrorKind::MissingField)
            .with_tag("Plain")
            .at_field("text")
            .at_index(0)
            .at_field("origin")
            .at_index(2);

        assert_eq!(err.path().to_string(), "[2].origin[0].text");
        assert_eq!(err.index(), Some(2));
        assert_eq!(err.field(), Some("text"));
        assert_eq!(err.tag(), Some("Plain"));
        assert_eq!(
            err.to_string(),
            "[2].origin[0].text (Plain): missing required field"
        );
    }

    #[test]
    fn index_is_only_taken_from_the_leading_segment() {
        let err = DecodeError::new(ErrorKind::MissingField)
            .with_tag("ForwardNode")
            .at_field("time")
            .at_index(2)
            .at_field("nodeList");
        assert_eq!(err.path().to_string(), "nodeList[2].time");
        assert_eq!(err.index(), None);
        assert_eq!(err.at_index(4).index(), Some(4));
    }

    #[test]
    fn innermost_tag_wins() {
        let err = DecodeError::new(ErrorKind::MissingField)
            .with_tag("ForwardNode")
            .with_tag("Forward");
        assert_eq!(err.tag(), Some("ForwardNode"));
    }

    #[test]
    fn empty_path_renders_as_root() {
        let err = DecodeError::new(mismatch("array", &serde_json::json!({})));
        assert_eq!(err.to_string(), "$: expected array, found object");
        assert_eq!(err.index(), None);
        assert_eq!(err.field(), None);
    }

    #[test]
    fn unknown_kind_names_the_tag() {
        let kind = ErrorKind::UnknownElementKind {
            tag: Some("Sticker".to_string()),
        };
        assert_eq!(kind.to_string(), "unknown element kind `Sticker`");

        let kind = ErrorKind::UnknownElementKind { tag: None };
        assert_eq!(kind.to_string(), "unknown element kind `<missing type>`");
    }

    #[test]
    fn shapes_distinguish_numbers() {
        assert_eq!(shape_of(&serde_json::json!(1)), "integer");
        assert_eq!(shape_of(&serde_json::json!(1.5)), "float");
        assert_eq!(
            shape_of(&serde_json::json!(u64::MAX)),
            "integer outside the i64 range"
        );
    }
}
