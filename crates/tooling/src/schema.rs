use crate::tool::{ArgumentBag, ToolArguments, ToolError};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Number, Value};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Integer,
    Number,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Integer => "integer",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }

    /// Converts `value` into this type, accepting the lax forms a remote caller
    /// is likely to send (numeric strings, "true"/"false").
    fn coerce(&self, value: &Value) -> Option<Value> {
        match (self, value) {
            (FieldType::String, Value::String(_))
            | (FieldType::Boolean, Value::Bool(_))
            | (FieldType::Array, Value::Array(_))
            | (FieldType::Object, Value::Object(_))
            | (FieldType::Number, Value::Number(_)) => Some(value.clone()),
            (FieldType::Integer, Value::Number(n)) => {
                if n.is_i64() || n.is_u64() {
                    Some(value.clone())
                } else {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| Value::from(f as i64))
                }
            }
            (FieldType::Integer, Value::String(s)) => s.trim().parse::<i64>().ok().map(Value::from),
            (FieldType::Number, Value::String(s)) => s
                .trim()
                .parse::<f64>()
                .ok()
                .and_then(Number::from_f64)
                .map(Value::Number),
            (FieldType::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" => Some(Value::Bool(true)),
                "false" => Some(Value::Bool(false)),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaField {
    pub name: String,
    pub field_type: FieldType,
    pub required: bool,
    pub description: String,
    /// Only honoured for optional fields.
    pub default: Option<Value>,
}

/// Declared input shape of a tool, in field declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSchema {
    fields: Vec<SchemaField>,
}

impl ToolSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required(self, name: &str, field_type: FieldType, description: &str) -> Self {
        self.with_field(SchemaField {
            name: name.to_string(),
            field_type,
            required: true,
            description: description.to_string(),
            default: None,
        })
    }

    pub fn optional(
        self,
        name: &str,
        field_type: FieldType,
        description: &str,
        default: Option<Value>,
    ) -> Self {
        self.with_field(SchemaField {
            name: name.to_string(),
            field_type,
            required: false,
            description: description.to_string(),
            default,
        })
    }

    /// Adds a field, replacing an earlier declaration with the same name in place.
    pub fn with_field(mut self, field: SchemaField) -> Self {
        match self.fields.iter_mut().find(|f| f.name == field.name) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        self
    }

    pub fn fields(&self) -> &[SchemaField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&SchemaField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Renders the schema as a JSON Schema object.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        for field in &self.fields {
            let mut property = Map::new();
            property.insert("type".to_string(), json!(field.field_type.as_str()));
            property.insert("description".to_string(), json!(field.description));
            if let (false, Some(default)) = (field.required, &field.default) {
                property.insert("default".to_string(), default.clone());
            }
            properties.insert(field.name.clone(), Value::Object(property));
        }

        let required: Vec<&str> = self
            .fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Checks and coerces `arguments` for the tool `tool_name`.
    ///
    /// Fields are checked in declaration order and the first offending field is
    /// reported. Optional fields that are absent or null take their default,
    /// if any. Undeclared arguments are dropped.
    pub fn validate(
        &self,
        tool_name: &str,
        arguments: &ArgumentBag,
    ) -> Result<ToolArguments, ToolError> {
        let mut validated = ToolArguments::new(tool_name);

        for field in &self.fields {
            match arguments.get(&field.name) {
                Some(Value::Null) | None if !field.required => {
                    if let Some(default) = &field.default {
                        validated.insert(&field.name, default.clone());
                    }
                }
                Some(Value::Null) => {
                    return Err(ToolError::validation(tool_name, &field.name, "must not be null"));
                }
                None => {
                    return Err(ToolError::validation(
                        tool_name,
                        &field.name,
                        "required field is missing",
                    ));
                }
                Some(value) => {
                    let coerced = field.field_type.coerce(value).ok_or_else(|| {
                        ToolError::validation(
                            tool_name,
                            &field.name,
                            format!("expected {}, got {}", field.field_type, kind_of(value)),
                        )
                    })?;
                    validated.insert(&field.name, coerced);
                }
            }
        }

        Ok(validated)
    }
}

impl Serialize for ToolSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json_schema().serialize(serializer)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
