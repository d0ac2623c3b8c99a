//! Schema-constrained conversion between untyped documents and typed values.
//!
//! ```rust
//! use aschema::{Document, JsonSchema, from_document, resolve_for, to_document};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! let schema = resolve_for::<Point>(None).expect("schema should resolve");
//! let mut document = Document::new();
//! document.insert("x".to_string(), 1.into());
//! document.insert("y".to_string(), 2.into());
//!
//! let point: Point = from_document(&document, schema.as_ref()).expect("document should convert");
//! assert_eq!(point, Point { x: 1, y: 2 });
//! assert_eq!(to_document(&point, schema.as_ref()).expect("point should convert"), document);
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::{ConversionError, ResolvedSchema};

/// Untyped key-value wire shape of tool arguments and results.
pub type Document = Map<String, Value>;

/// Converts `document` into a `T` after validating it against `schema`.
///
/// Without a schema the type carries no data and the document is ignored.
pub fn from_document<T>(document: &Document, schema: Option<&ResolvedSchema>) -> Result<T, ConversionError>
where
    T: DeserializeOwned,
{
    let Some(schema) = schema else {
        return serde_json::from_value(Value::Null).map_err(deserialize_error);
    };

    let value = Value::Object(document.clone());
    schema.validate(&value)?;
    serde_json::from_value(value).map_err(deserialize_error)
}

/// Converts `value` into a document that satisfies `schema` and holds only its declared fields.
pub fn to_document<T>(value: &T, schema: Option<&ResolvedSchema>) -> Result<Document, ConversionError>
where
    T: Serialize + ?Sized,
{
    let value = serde_json::to_value(value)
        .map_err(|err| ConversionError::at_root(format!("failed to serialize value: {err}")))?;

    if let Some(schema) = schema {
        schema.validate(&value)?;
    }

    let mut document = match value {
        Value::Object(document) => document,
        Value::Null if schema.is_none() => Document::new(),
        other => {
            return Err(ConversionError::at_root(format!(
                "expected an object-shaped value, found {other}"
            )));
        }
    };

    if let Some(schema) = schema
        && !schema.allows_additional_properties()
        && let Some(properties) = schema.properties()
    {
        document.retain(|name, _| properties.contains_key(name));
    }

    Ok(document)
}

fn deserialize_error(err: serde_json::Error) -> ConversionError {
    ConversionError::at_root(format!("failed to deserialize value: {err}"))
}

#[cfg(test)]
mod tests {
    use schemars::{JsonSchema, json_schema};
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::{SchemaErrorKind, resolve_for};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
    struct Args {
        #[serde(rename = "A")]
        a: i64,
        #[serde(rename = "B")]
        b: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
    #[serde(rename_all = "snake_case")]
    enum Mode {
        Fast,
        Careful,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
    struct Plan {
        steps: Vec<String>,
        mode: Mode,
        retries: u8,
    }

    fn document(value: Value) -> Document {
        value.as_object().cloned().expect("test value should be an object")
    }

    #[test]
    fn typed_values_survive_a_round_trip() {
        let schema = resolve_for::<Plan>(None).expect("schema should resolve");
        let plan = Plan {
            steps: vec!["fetch".to_string(), "summarize".to_string()],
            mode: Mode::Careful,
            retries: 3,
        };

        let converted = to_document(&plan, schema.as_ref()).expect("plan should convert");
        let restored: Plan = from_document(&converted, schema.as_ref()).expect("document should convert");

        assert_eq!(restored, plan);
    }

    #[test]
    fn schema_satisfying_documents_stay_valid_after_a_round_trip() {
        let schema = resolve_for::<Args>(None).expect("schema should resolve");
        let input = document(json!({"A": 2, "B": 3, "extra": true}));

        let args: Args = from_document(&input, schema.as_ref()).expect("document should convert");
        let output = to_document(&args, schema.as_ref()).expect("args should convert");

        schema
            .as_ref()
            .expect("schema should be present")
            .validate(&Value::Object(output.clone()))
            .expect("output should satisfy the schema");
        assert_eq!(output, document(json!({"A": 2, "B": 3})));
    }

    #[test]
    fn missing_required_field_fails_with_path() {
        let schema = resolve_for::<Args>(None).expect("schema should resolve");

        let error = from_document::<Args>(&document(json!({"A": 2})), schema.as_ref())
            .expect_err("B is required");

        assert_eq!(error.path.to_string(), "$.B");
    }

    #[test]
    fn enum_values_outside_the_schema_are_rejected() {
        let schema = resolve_for::<Plan>(None).expect("schema should resolve");
        let input = document(json!({"steps": [], "mode": "reckless", "retries": 1}));

        let error = from_document::<Plan>(&input, schema.as_ref()).expect_err("mode is invalid");

        assert_eq!(error.path.to_string(), "$.mode");
    }

    #[test]
    fn output_is_pruned_to_declared_properties() {
        #[derive(Serialize)]
        struct Wide {
            kept: bool,
            dropped: bool,
        }

        let schema = override_schema(json_schema!({
            "type": "object",
            "properties": {"kept": {"type": "boolean"}},
            "additionalProperties": false
        }));

        // Extra output fields would fail validation under `additionalProperties: false`.
        let error = to_document(&Wide { kept: true, dropped: false }, Some(&schema))
            .expect_err("undeclared output field is rejected");
        assert_eq!(error.path.to_string(), "$.dropped");

        let lenient = override_schema(json_schema!({
            "type": "object",
            "properties": {"kept": {"type": "boolean"}}
        }));
        let output = to_document(&Wide { kept: true, dropped: false }, Some(&lenient))
            .expect("lenient schema accepts extras");
        assert_eq!(output, document(json!({"kept": true})));
    }

    #[test]
    fn unit_values_convert_without_schema() {
        let args: () = from_document(&document(json!({"ignored": 1})), None).expect("unit converts");
        let output = to_document(&args, None).expect("unit converts");
        assert!(output.is_empty());
    }

    #[test]
    fn scalar_output_is_rejected() {
        let error = to_document(&42_u32, None).expect_err("scalars are not documents");
        assert!(error.path.is_root());
    }

    fn override_schema(schema: schemars::Schema) -> ResolvedSchema {
        ResolvedSchema::resolve(schema, SchemaErrorKind::Override).expect("schema should resolve")
    }
}
