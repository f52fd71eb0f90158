//! Declarative input shapes for catalog commands.
//!
//! Each command declares its arguments as a static [`Shape`]. The same
//! declaration drives two things:
//!
//! - the JSON Schema advertised in `tools/list` ([`Shape::to_json_schema`])
//! - validation and normalisation of incoming arguments ([`Shape::normalize`])
//!
//! Normalisation strips keys the shape does not declare and treats `null` in
//! an optional field as absent, so the plugin only ever sees the fields it
//! knows about.

use serde_json::{json, Map, Value};

/// The expected shape of a JSON value.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// Any string.
    String,
    /// Any number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// One of a fixed set of strings.
    Enum(&'static [&'static str]),
    /// A list whose items all have the same shape.
    Array {
        /// Shape of every item.
        items: &'static Shape,
        /// Minimum number of items.
        min_items: usize,
    },
    /// An object with declared fields; undeclared keys are dropped.
    Object(&'static [Field]),
    /// An object with arbitrary keys and values.
    Record,
    /// Any value, passed through untouched.
    Any,
}

/// A named field of an object shape.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    /// Property name.
    pub name: &'static str,
    /// Expected shape of the value.
    pub shape: Shape,
    /// Whether the field must be present.
    pub required: bool,
    /// Description shown to the caller; empty for none.
    pub description: &'static str,
}

/// Declares a required field.
#[must_use]
pub const fn required(name: &'static str, shape: Shape, description: &'static str) -> Field {
    Field {
        name,
        shape,
        required: true,
        description,
    }
}

/// Declares an optional field.
#[must_use]
pub const fn optional(name: &'static str, shape: Shape, description: &'static str) -> Field {
    Field {
        name,
        shape,
        required: false,
        description,
    }
}

/// Declares an array of `items` with no minimum length.
#[must_use]
pub const fn array_of(items: &'static Shape) -> Shape {
    Shape::Array {
        items,
        min_items: 0,
    }
}

impl Shape {
    /// Renders the shape as a JSON Schema fragment.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        match self {
            Self::String => json!({"type": "string"}),
            Self::Number => json!({"type": "number"}),
            Self::Boolean => json!({"type": "boolean"}),
            Self::Enum(values) => json!({"type": "string", "enum": values}),
            Self::Array { items, min_items } => {
                let mut schema = json!({"type": "array", "items": items.to_json_schema()});
                if *min_items > 0 {
                    schema["minItems"] = json!(min_items);
                }
                schema
            }
            Self::Object(fields) => object_schema(fields),
            Self::Record => json!({"type": "object", "additionalProperties": {}}),
            Self::Any => json!({}),
        }
    }

    /// Validates `value` against the shape and returns its normalised form.
    ///
    /// `path` names the value in error messages; use an empty string for the
    /// top-level argument object.
    ///
    /// # Errors
    ///
    /// Returns a message describing the first mismatch found.
    pub fn normalize(&self, value: &Value, path: &str) -> Result<Value, String> {
        match self {
            Self::String => expect(value.is_string(), "string", value, path),
            Self::Number => expect(value.is_number(), "number", value, path),
            Self::Boolean => expect(value.is_boolean(), "boolean", value, path),
            Self::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.contains(&s) => Ok(value.clone()),
                Some(s) => Err(format!(
                    "Invalid value '{s}' at '{}', expected one of: {}",
                    display_path(path),
                    allowed.join(", ")
                )),
                None => Err(mismatch("string", value, path)),
            },
            Self::Array { items, min_items } => {
                let Some(elements) = value.as_array() else {
                    return Err(mismatch("array", value, path));
                };
                if elements.len() < *min_items {
                    return Err(format!(
                        "'{}' must contain at least {min_items} items",
                        display_path(path)
                    ));
                }
                elements
                    .iter()
                    .enumerate()
                    .map(|(i, element)| items.normalize(element, &format!("{path}[{i}]")))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            Self::Object(fields) => normalize_object(fields, value, path),
            Self::Record => expect(value.is_object(), "object", value, path),
            Self::Any => Ok(value.clone()),
        }
    }
}

fn object_schema(fields: &[Field]) -> Value {
    let mut properties = Map::new();
    for field in fields {
        let mut schema = field.shape.to_json_schema();
        if !field.description.is_empty() {
            schema["description"] = json!(field.description);
        }
        properties.insert(field.name.to_string(), schema);
    }

    let mut schema = json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": false,
    });

    let required: Vec<_> = fields
        .iter()
        .filter(|field| field.required)
        .map(|field| field.name)
        .collect();
    if !required.is_empty() {
        schema["required"] = json!(required);
    }
    schema
}

fn normalize_object(fields: &[Field], value: &Value, path: &str) -> Result<Value, String> {
    let Some(object) = value.as_object() else {
        return Err(mismatch("object", value, path));
    };

    let mut normalized = Map::new();
    for field in fields {
        let field_path = if path.is_empty() {
            field.name.to_string()
        } else {
            format!("{path}.{}", field.name)
        };

        match object.get(field.name) {
            None | Some(Value::Null) if field.required => {
                return Err(format!("Missing required parameter: {field_path}"));
            }
            None | Some(Value::Null) => {}
            Some(v) => {
                normalized.insert(field.name.to_string(), field.shape.normalize(v, &field_path)?);
            }
        }
    }
    Ok(Value::Object(normalized))
}

fn expect(ok: bool, expected: &str, value: &Value, path: &str) -> Result<Value, String> {
    if ok {
        Ok(value.clone())
    } else {
        Err(mismatch(expected, value, path))
    }
}

fn mismatch(expected: &str, value: &Value, path: &str) -> String {
    format!(
        "Expected {expected} at '{}', received {}",
        display_path(path),
        type_name(value)
    )
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "arguments"
    } else {
        path
    }
}

const fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINT: Shape = Shape::Object(&[
        required("x", Shape::Number, ""),
        required("y", Shape::Number, ""),
    ]);

    const SAMPLE: Shape = Shape::Object(&[
        required("id", Shape::String, "Node ID"),
        optional("mode", Shape::Enum(&["A", "B"]), ""),
        optional("offset", POINT, "Offset in pixels"),
        optional("ids", Shape::Array { items: &Shape::String, min_items: 2 }, ""),
        optional("visible", Shape::Boolean, ""),
        optional("extra", Shape::Any, ""),
    ]);

    #[test]
    fn schema_lists_properties_and_required() {
        let schema = SAMPLE.to_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["id"]));
        assert_eq!(schema["properties"]["id"]["description"], "Node ID");
        assert_eq!(schema["properties"]["mode"]["enum"], json!(["A", "B"]));
        assert_eq!(schema["properties"]["ids"]["minItems"], 2);
        assert_eq!(schema["properties"]["offset"]["required"], json!(["x", "y"]));
        assert_eq!(schema["properties"]["extra"]["description"], Value::Null);
    }

    #[test]
    fn empty_object_has_no_required_list() {
        let schema = Shape::Object(&[]).to_json_schema();
        assert!(schema.get("required").is_none());
        assert_eq!(schema["properties"], json!({}));
    }

    #[test]
    fn normalize_strips_unknown_keys() {
        let args = json!({"id": "1:2", "bogus": true, "visible": false});
        let normalized = SAMPLE.normalize(&args, "").unwrap();
        assert_eq!(normalized, json!({"id": "1:2", "visible": false}));
    }

    #[test]
    fn null_optional_is_dropped() {
        let normalized = SAMPLE.normalize(&json!({"id": "1:2", "mode": null}), "").unwrap();
        assert_eq!(normalized, json!({"id": "1:2"}));
    }

    #[test]
    fn missing_required_field() {
        let err = SAMPLE.normalize(&json!({}), "").unwrap_err();
        assert_eq!(err, "Missing required parameter: id");
    }

    #[test]
    fn wrong_type_reports_path() {
        let err = SAMPLE
            .normalize(&json!({"id": "1:2", "offset": {"x": 1, "y": "2"}}), "")
            .unwrap_err();
        assert_eq!(err, "Expected number at 'offset.y', received string");
    }

    #[test]
    fn enum_rejects_unknown_value() {
        let err = SAMPLE
            .normalize(&json!({"id": "1:2", "mode": "C"}), "")
            .unwrap_err();
        assert!(err.contains("expected one of: A, B"));
    }

    #[test]
    fn array_min_items_and_item_paths() {
        let err = SAMPLE
            .normalize(&json!({"id": "1:2", "ids": ["a"]}), "")
            .unwrap_err();
        assert!(err.contains("at least 2 items"));

        let err = SAMPLE
            .normalize(&json!({"id": "1:2", "ids": ["a", 3]}), "")
            .unwrap_err();
        assert_eq!(err, "Expected string at 'ids[1]', received number");
    }

    #[test]
    fn top_level_must_be_object() {
        let err = SAMPLE.normalize(&json!([1]), "").unwrap_err();
        assert_eq!(err, "Expected object at 'arguments', received array");
    }

    #[test]
    fn any_passes_through() {
        let args = json!({"id": "1:2", "extra": {"deep": [1, null]}});
        assert_eq!(SAMPLE.normalize(&args, "").unwrap(), args);
    }
}
