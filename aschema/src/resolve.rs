//! Schema resolution from Rust types or caller-supplied overrides.
//!
//! ```rust
//! use aschema::{JsonSchema, ResolvedSchema, resolve_for};
//!
//! #[derive(JsonSchema)]
//! #[allow(dead_code)]
//! struct Lookup {
//!     query: String,
//! }
//!
//! let resolved: ResolvedSchema = resolve_for::<Lookup>(None)
//!     .expect("schema should resolve")
//!     .expect("object types always have a schema");
//! assert_eq!(resolved.required(), vec!["query"]);
//! ```

use std::sync::Arc;

use schemars::{JsonSchema, Schema};
use serde_json::{Map, Value};

use crate::validate::Validator;
use crate::{ConversionError, SchemaError, SchemaErrorKind};

const JSON_TYPES: [&str; 7] = [
    "null", "boolean", "object", "array", "number", "integer", "string",
];

/// An immutable, validated schema usable for declarations and runtime conversion.
///
/// Cloning is cheap; clones share the same schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedSchema {
    schema: Arc<Schema>,
}

impl ResolvedSchema {
    /// Checks structural well-formedness and that every `$ref` points inside the document.
    ///
    /// Failures are reported with `kind`, so callers decide whether the schema
    /// was inferred or supplied.
    pub fn resolve(schema: Schema, kind: SchemaErrorKind) -> Result<Self, SchemaError> {
        check_subschema(schema.as_value(), schema.as_value(), "#", kind)?;
        Ok(Self {
            schema: Arc::new(schema),
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn as_value(&self) -> &Value {
        self.schema.as_value()
    }

    /// Required top-level field names, in declaration order.
    pub fn required(&self) -> Vec<&str> {
        root_object(self.as_value())
            .and_then(|object| object.get("required"))
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Declared top-level properties, if the schema restricts them.
    pub fn properties(&self) -> Option<&Map<String, Value>> {
        root_object(self.as_value())
            .and_then(|object| object.get("properties"))
            .and_then(Value::as_object)
    }

    /// Whether values may carry fields beyond [`ResolvedSchema::properties`].
    pub fn allows_additional_properties(&self) -> bool {
        match root_object(self.as_value()).and_then(|object| object.get("additionalProperties")) {
            None => self.properties().is_none(),
            Some(Value::Bool(allowed)) => *allowed,
            Some(_) => true,
        }
    }

    pub fn validate(&self, value: &Value) -> Result<(), ConversionError> {
        Validator::new(self.as_value()).validate(value)
    }
}

/// Resolves `override_schema` verbatim when present, otherwise infers the schema of `T`.
///
/// Overrides are not compared against `T`; keeping them consistent is up to the caller.
/// `Ok(None)` means `T` carries no data (unit-like) and needs no schema.
pub fn resolve_for<T>(override_schema: Option<&Schema>) -> Result<Option<ResolvedSchema>, SchemaError>
where
    T: JsonSchema + ?Sized,
{
    match override_schema {
        Some(schema) => ResolvedSchema::resolve(schema.clone(), SchemaErrorKind::Override).map(Some),
        None => infer::<T>(),
    }
}

/// Infers and resolves the schema of `T`, which must describe a JSON object or unit.
pub fn infer<T>() -> Result<Option<ResolvedSchema>, SchemaError>
where
    T: JsonSchema + ?Sized,
{
    let schema = schemars::schema_for!(T);
    let root = schema.as_value();

    if describes_only(root, "null") {
        return Ok(None);
    }

    if !describes_object(root) {
        return Err(SchemaError::inference(format!(
            "`{}` does not describe a JSON object (inferred type: {})",
            std::any::type_name::<T>(),
            root.get("type").map(Value::to_string).unwrap_or_else(|| "unknown".to_string())
        )));
    }

    ResolvedSchema::resolve(schema, SchemaErrorKind::Inference).map(Some)
}

fn root_object(value: &Value) -> Option<&Map<String, Value>> {
    value.as_object()
}

fn describes_only(schema: &Value, json_type: &str) -> bool {
    schema.get("type").and_then(Value::as_str) == Some(json_type)
}

fn describes_object(schema: &Value) -> bool {
    match schema {
        Value::Bool(allowed) => *allowed,
        Value::Object(object) => match object.get("type") {
            Some(Value::String(name)) => name == "object",
            Some(_) => false,
            None => object.contains_key("properties"),
        },
        _ => false,
    }
}

fn check_subschema(
    root: &Value,
    schema: &Value,
    location: &str,
    kind: SchemaErrorKind,
) -> Result<(), SchemaError> {
    let object = match schema {
        Value::Bool(_) => return Ok(()),
        Value::Object(object) => object,
        other => {
            return Err(SchemaError::new(
                kind,
                format!("{location}: expected a schema object or boolean, found {other}"),
            ));
        }
    };

    if let Some(reference) = object.get("$ref") {
        let target = reference
            .as_str()
            .and_then(|reference| reference.strip_prefix('#'))
            .ok_or_else(|| {
                SchemaError::new(
                    kind,
                    format!("{location}: only local `$ref`s are supported, found {reference}"),
                )
            })?;
        if root.pointer(target).is_none() {
            return Err(SchemaError::new(
                kind,
                format!("{location}: `$ref` #{target} does not resolve"),
            ));
        }
    }

    if let Some(declared) = object.get("type") {
        let names: Vec<&Value> = match declared {
            Value::Array(names) => names.iter().collect(),
            single => vec![single],
        };
        for name in names {
            if !name.as_str().is_some_and(|name| JSON_TYPES.contains(&name)) {
                return Err(SchemaError::new(
                    kind,
                    format!("{location}: unknown type {name}"),
                ));
            }
        }
    }

    if let Some(required) = object.get("required")
        && !required
            .as_array()
            .is_some_and(|names| names.iter().all(Value::is_string))
    {
        return Err(SchemaError::new(
            kind,
            format!("{location}: `required` must be an array of strings"),
        ));
    }

    for keyword in ["properties", "$defs", "definitions", "patternProperties"] {
        match object.get(keyword) {
            None => {}
            Some(Value::Object(children)) => {
                for (name, child) in children {
                    check_subschema(root, child, &format!("{location}/{keyword}/{name}"), kind)?;
                }
            }
            Some(_) => {
                return Err(SchemaError::new(
                    kind,
                    format!("{location}: `{keyword}` must be an object"),
                ));
            }
        }
    }

    for keyword in ["items", "additionalProperties", "not", "contains"] {
        if let Some(child) = object.get(keyword) {
            check_subschema(root, child, &format!("{location}/{keyword}"), kind)?;
        }
    }

    for keyword in ["allOf", "anyOf", "oneOf", "prefixItems"] {
        match object.get(keyword) {
            None => {}
            Some(Value::Array(children)) => {
                for (index, child) in children.iter().enumerate() {
                    check_subschema(root, child, &format!("{location}/{keyword}/{index}"), kind)?;
                }
            }
            Some(_) => {
                return Err(SchemaError::new(
                    kind,
                    format!("{location}: `{keyword}` must be an array"),
                ));
            }
        }
    }

    Ok(())
}
