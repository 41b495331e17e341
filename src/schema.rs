use crate::error::ValidationError;
use crate::types::{DocumentData, Value};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FieldType {
    String,
    Int,
    Float,
    Bool,
    Timestamp,
    Uuid,
    Array,
    Object,
}

impl FieldType {
    pub fn name(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Timestamp => "timestamp",
            FieldType::Uuid => "uuid",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }

    fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (FieldType::String, Value::String(_))
                | (FieldType::Int, Value::Int(_))
                | (FieldType::Float, Value::Float(_))
                | (FieldType::Bool, Value::Bool(_))
                | (FieldType::Timestamp, Value::Timestamp(_))
                | (FieldType::Uuid, Value::Uuid(_))
                | (FieldType::Array, Value::Array(_))
                | (FieldType::Object, Value::Object(_))
        )
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::String(_) => "string",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::Bool(_) => "bool",
        Value::Timestamp(_) => "timestamp",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::Uuid(_) => "uuid",
    }
}

/// Value used to fill a field that is absent (or null) at save time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FieldDefault {
    /// The current UTC time, evaluated when the default is applied.
    Now,
    Value(Value),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub field_type: FieldType,
    pub required: bool,
    pub max_length: Option<usize>,
    pub default: Option<FieldDefault>,
}

impl FieldDefinition {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            field_type,
            required: false,
            max_length: None,
            default: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn default_now(mut self) -> Self {
        self.default = Some(FieldDefault::Now);
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(FieldDefault::Value(value));
        self
    }
}

/// Declares the fields a record may carry and the constraints each must
/// satisfy. Validation runs on the client, before the save is sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schema {
    fields: HashMap<String, FieldDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &str, definition: FieldDefinition) -> Self {
        self.fields.insert(name.to_string(), definition);
        self
    }

    /// Fills absent or null fields that declare a default.
    pub fn apply_defaults(&self, data: &mut DocumentData) {
        for (name, definition) in &self.fields {
            let unset = matches!(data.get(name), None | Some(Value::Null));
            if !unset {
                continue;
            }
            if let Some(default) = &definition.default {
                let value = match default {
                    FieldDefault::Now => Value::Timestamp(Utc::now()),
                    FieldDefault::Value(value) => value.clone(),
                };
                data.insert(name.clone(), value);
            }
        }
    }

    /// Checks the data against every declared constraint.
    ///
    /// Required fields must be present and non-empty, strings must stay
    /// within their declared maximum length, value types must match the
    /// declaration, and undeclared fields are rejected.
    pub fn validate(&self, data: &DocumentData) -> Result<(), ValidationError> {
        for name in data.keys() {
            if !self.fields.contains_key(name) {
                return Err(ValidationError::UnknownField(name.clone()));
            }
        }

        for (name, definition) in &self.fields {
            let value = match data.get(name) {
                None | Some(Value::Null) => {
                    if definition.required {
                        return Err(ValidationError::MissingField(name.clone()));
                    }
                    continue;
                }
                Some(value) => value,
            };

            if !definition.field_type.matches(value) {
                return Err(ValidationError::TypeMismatch {
                    field: name.clone(),
                    expected: definition.field_type.name(),
                    found: value_type_name(value),
                });
            }

            if let Value::String(text) = value {
                if definition.required && text.is_empty() {
                    return Err(ValidationError::EmptyField(name.clone()));
                }
                if let Some(max) = definition.max_length {
                    let len = text.chars().count();
                    if len > max {
                        return Err(ValidationError::TooLong {
                            field: name.clone(),
                            len,
                            max,
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
