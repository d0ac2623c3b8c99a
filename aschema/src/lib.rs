//! Schema resolution and schema-constrained value conversion for typed tools.
//!
//! A [`ResolvedSchema`] is derived once, either from a caller override or by
//! inferring the shape of a Rust type, and then reused unchanged for both
//! model-facing declarations and runtime conversion of [`Document`]s.

mod convert;
mod error;
mod resolve;
mod validate;

pub mod prelude {
    pub use crate::{
        ConversionError, Document, FieldPath, JsonSchema, ResolvedSchema, Schema, SchemaError,
        SchemaErrorKind, from_document, resolve_for, to_document,
    };
}

pub use convert::{Document, from_document, to_document};
pub use error::{ConversionError, FieldPath, PathSegment, SchemaError, SchemaErrorKind};
pub use resolve::{ResolvedSchema, infer, resolve_for};
pub use schemars::{JsonSchema, Schema, json_schema};
