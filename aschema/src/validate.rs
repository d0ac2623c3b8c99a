//! Instance validation over a resolved schema document.

use std::cell::Cell;

use serde_json::{Map, Number, Value};

use crate::{ConversionError, FieldPath};

// Caps the subschema checks of one validation; branching references can
// otherwise blow up exponentially.
const MAX_EVALUATIONS: usize = 1_000_000;

pub(crate) struct Validator<'s> {
    root: &'s Value,
    evaluations: Cell<usize>,
}

impl<'s> Validator<'s> {
    pub(crate) fn new(root: &'s Value) -> Self {
        Self {
            root,
            evaluations: Cell::new(0),
        }
    }

    pub(crate) fn validate(&self, value: &Value) -> Result<(), ConversionError> {
        self.evaluations.set(0);
        let result = self.check(self.root, value, &FieldPath::root(), &[]);

        // Combinators swallow branch errors, so exhaustion is reported here.
        if self.evaluations.get() > MAX_EVALUATIONS {
            return Err(too_expensive(&FieldPath::root()));
        }
        result
    }

    /// `trail` lists the references followed since the last descent into `value`.
    fn check(
        &self,
        schema: &'s Value,
        value: &Value,
        path: &FieldPath,
        trail: &[&'s str],
    ) -> Result<(), ConversionError> {
        let spent = self.evaluations.get() + 1;
        self.evaluations.set(spent);
        if spent > MAX_EVALUATIONS {
            return Err(too_expensive(path));
        }

        let object = match schema {
            Value::Bool(true) => return Ok(()),
            Value::Bool(false) => {
                return Err(ConversionError::new(path.clone(), "no value is allowed here"));
            }
            Value::Object(object) => object,
            _ => return Ok(()),
        };

        if let Some(reference) = object.get("$ref").and_then(Value::as_str) {
            if trail.contains(&reference) {
                return Err(ConversionError::new(
                    path.clone(),
                    format!("schema reference cycle through {reference}"),
                ));
            }
            let target = reference
                .strip_prefix('#')
                .and_then(|pointer| self.root.pointer(pointer))
                .ok_or_else(|| {
                    ConversionError::new(path.clone(), format!("unresolved reference {reference}"))
                })?;
            let mut followed = trail.to_vec();
            followed.push(reference);
            self.check(target, value, path, &followed)?;
        }

        if let Some(declared) = object.get("type") {
            check_type(declared, value, path)?;
        }

        if let Some(allowed) = object.get("enum").and_then(Value::as_array)
            && !allowed.iter().any(|candidate| candidate == value)
        {
            return Err(ConversionError::new(
                path.clone(),
                format!("{value} is not one of the allowed values"),
            ));
        }

        if let Some(expected) = object.get("const")
            && expected != value
        {
            return Err(ConversionError::new(
                path.clone(),
                format!("expected constant {expected}, found {value}"),
            ));
        }

        self.check_combinators(object, value, path, trail)?;

        match value {
            Value::Object(fields) => self.check_object(object, fields, path),
            Value::Array(items) => self.check_array(object, items, path),
            Value::Number(_) => check_number(object, value, path),
            Value::String(text) => check_string(object, text, path),
            _ => Ok(()),
        }
    }

    fn check_combinators(
        &self,
        object: &'s Map<String, Value>,
        value: &Value,
        path: &FieldPath,
        trail: &[&'s str],
    ) -> Result<(), ConversionError> {
        if let Some(all) = object.get("allOf").and_then(Value::as_array) {
            for schema in all {
                self.check(schema, value, path, trail)?;
            }
        }

        if let Some(any) = object.get("anyOf").and_then(Value::as_array)
            && !any
                .iter()
                .any(|schema| self.check(schema, value, path, trail).is_ok())
        {
            return Err(ConversionError::new(
                path.clone(),
                "value does not match any allowed alternative",
            ));
        }

        if let Some(one) = object.get("oneOf").and_then(Value::as_array) {
            let matches = one
                .iter()
                .filter(|schema| self.check(schema, value, path, trail).is_ok())
                .count();
            if matches != 1 {
                return Err(ConversionError::new(
                    path.clone(),
                    format!("value must match exactly one alternative, matched {matches}"),
                ));
            }
        }

        if let Some(not) = object.get("not")
            && self.check(not, value, path, trail).is_ok()
        {
            return Err(ConversionError::new(
                path.clone(),
                "value matches a disallowed schema",
            ));
        }

        Ok(())
    }

    fn check_object(
        &self,
        object: &'s Map<String, Value>,
        fields: &Map<String, Value>,
        path: &FieldPath,
    ) -> Result<(), ConversionError> {
        if let Some(required) = object.get("required").and_then(Value::as_array) {
            for name in required.iter().filter_map(Value::as_str) {
                if !fields.contains_key(name) {
                    return Err(ConversionError::new(
                        path.field(name),
                        "missing required field",
                    ));
                }
            }
        }

        let properties = object.get("properties").and_then(Value::as_object);
        let additional = object.get("additionalProperties");

        for (name, field) in fields {
            let field_path = path.field(name);
            match properties.and_then(|properties| properties.get(name)) {
                Some(schema) => self.check(schema, field, &field_path, &[])?,
                None => match additional {
                    Some(Value::Bool(false)) => {
                        return Err(ConversionError::new(field_path, "unknown field"));
                    }
                    Some(schema) => self.check(schema, field, &field_path, &[])?,
                    None => {}
                },
            }
        }

        Ok(())
    }

    fn check_array(
        &self,
        object: &'s Map<String, Value>,
        items: &[Value],
        path: &FieldPath,
    ) -> Result<(), ConversionError> {
        if let Some(min) = object.get("minItems").and_then(Value::as_u64)
            && (items.len() as u64) < min
        {
            return Err(ConversionError::new(
                path.clone(),
                format!("expected at least {min} items, found {}", items.len()),
            ));
        }

        if let Some(max) = object.get("maxItems").and_then(Value::as_u64)
            && (items.len() as u64) > max
        {
            return Err(ConversionError::new(
                path.clone(),
                format!("expected at most {max} items, found {}", items.len()),
            ));
        }

        let prefix = object
            .get("prefixItems")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for (index, item) in items.iter().enumerate() {
            let item_path = path.index(index);
            match prefix.get(index) {
                Some(schema) => self.check(schema, item, &item_path, &[])?,
                None => {
                    if let Some(schema) = object.get("items") {
                        self.check(schema, item, &item_path, &[])?;
                    }
                }
            }
        }

        Ok(())
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(number) if number.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn matches_type(name: &str, value: &Value) -> bool {
    match name {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        _ => false,
    }
}

fn check_type(declared: &Value, value: &Value, path: &FieldPath) -> Result<(), ConversionError> {
    let names: Vec<&str> = match declared {
        Value::String(name) => vec![name.as_str()],
        Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
        _ => return Ok(()),
    };

    if names.iter().any(|name| matches_type(name, value)) {
        return Ok(());
    }

    Err(ConversionError::new(
        path.clone(),
        format!("expected {}, found {}", names.join(" or "), type_name(value)),
    ))
}

fn check_number(
    object: &Map<String, Value>,
    value: &Value,
    path: &FieldPath,
) -> Result<(), ConversionError> {
    let Some(exact) = value.as_number() else {
        return Ok(());
    };

    if let Some(format) = object.get("format").and_then(Value::as_str)
        && integer_format_fits(format, exact) == Some(false)
    {
        return Err(ConversionError::new(
            path.clone(),
            format!("{value} is out of range for {format}"),
        ));
    }

    let Some(number) = exact.as_f64() else {
        return Ok(());
    };

    let bound = |keyword: &str| object.get(keyword).and_then(Value::as_f64);

    if let Some(min) = bound("minimum")
        && number < min
    {
        return Err(ConversionError::new(
            path.clone(),
            format!("{value} is less than the minimum of {min}"),
        ));
    }
    if let Some(max) = bound("maximum")
        && number > max
    {
        return Err(ConversionError::new(
            path.clone(),
            format!("{value} is greater than the maximum of {max}"),
        ));
    }
    if let Some(min) = bound("exclusiveMinimum")
        && number <= min
    {
        return Err(ConversionError::new(
            path.clone(),
            format!("{value} must be greater than {min}"),
        ));
    }
    if let Some(max) = bound("exclusiveMaximum")
        && number >= max
    {
        return Err(ConversionError::new(
            path.clone(),
            format!("{value} must be less than {max}"),
        ));
    }

    Ok(())
}

/// Whether `number` fits the integer `format`; `None` for other formats.
fn integer_format_fits(format: &str, number: &Number) -> Option<bool> {
    let signed = number.as_i64();
    let unsigned = number.as_u64();
    let fits = match format {
        "int8" => signed.is_some_and(|n| i8::try_from(n).is_ok()),
        "int16" => signed.is_some_and(|n| i16::try_from(n).is_ok()),
        "int32" => signed.is_some_and(|n| i32::try_from(n).is_ok()),
        "int" | "int64" => signed.is_some(),
        "uint8" => unsigned.is_some_and(|n| u8::try_from(n).is_ok()),
        "uint16" => unsigned.is_some_and(|n| u16::try_from(n).is_ok()),
        "uint32" => unsigned.is_some_and(|n| u32::try_from(n).is_ok()),
        "uint" | "uint64" => unsigned.is_some(),
        _ => return None,
    };
    Some(fits)
}

fn too_expensive(path: &FieldPath) -> ConversionError {
    ConversionError::new(path.clone(), "schema is too expensive to evaluate")
}

fn check_string(
    object: &Map<String, Value>,
    text: &str,
    path: &FieldPath,
) -> Result<(), ConversionError> {
    let length = text.chars().count() as u64;

    if let Some(min) = object.get("minLength").and_then(Value::as_u64)
        && length < min
    {
        return Err(ConversionError::new(
            path.clone(),
            format!("expected at least {min} characters, found {length}"),
        ));
    }

    if let Some(max) = object.get("maxLength").and_then(Value::as_u64)
        && length > max
    {
        return Err(ConversionError::new(
            path.clone(),
            format!("expected at most {max} characters, found {length}"),
        ));
    }

    Ok(())
}
