//! Schema resolution and value conversion errors.

use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaErrorKind {
    /// The schema inferred from a Rust type cannot be used.
    Inference,
    /// A caller-supplied override schema cannot be resolved.
    Override,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaError {
    pub kind: SchemaErrorKind,
    pub message: String,
}

impl SchemaError {
    pub fn new(kind: SchemaErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn inference(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::Inference, message)
    }

    pub fn override_schema(message: impl Into<String>) -> Self {
        Self::new(SchemaErrorKind::Override, message)
    }

    /// Prepends `context` to the message, keeping the kind.
    pub fn context(self, context: impl Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{context}: {}", self.message),
        }
    }
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl Error for SchemaError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Locator of a value inside a document, rendered as `$`, `$.a`, `$.a[0].b`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn field(&self, name: impl Into<String>) -> Self {
        let mut path = self.clone();
        path.segments.push(PathSegment::Field(name.into()));
        path
    }

    pub fn index(&self, index: usize) -> Self {
        let mut path = self.clone();
        path.segments.push(PathSegment::Index(index));
        path
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("$")?;
        for segment in &self.segments {
            match segment {
                PathSegment::Field(name) => write!(f, ".{name}")?,
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionError {
    pub path: FieldPath,
    pub message: String,
}

impl ConversionError {
    pub fn new(path: FieldPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }

    pub fn at_root(message: impl Into<String>) -> Self {
        Self::new(FieldPath::root(), message)
    }
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl Error for ConversionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_path_renders_fields_and_indices() {
        let path = FieldPath::root().field("items").index(2).field("name");
        assert_eq!(path.to_string(), "$.items[2].name");
        assert_eq!(FieldPath::root().to_string(), "$");
    }

    #[test]
    fn schema_error_context_keeps_kind() {
        let error = SchemaError::inference("not an object").context("input schema");
        assert_eq!(error.kind, SchemaErrorKind::Inference);
        assert_eq!(error.to_string(), "Inference: input schema: not an object");
    }
}
