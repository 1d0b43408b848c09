use chrono::{DateTime, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::fmt;

/// A constraint attached to a typed field.
///
/// Accessors query `is_checkable` and `is_numeric` once, when the field is
/// declared, and bake the answers into the write path.
pub trait TypeConstraint: fmt::Debug + Send + Sync {
    /// Name used in error messages and generated code.
    fn name(&self) -> &str;

    /// Whether `check` should run on every write.
    fn is_checkable(&self) -> bool {
        true
    }

    /// Whether written values are coerced to numbers after checking.
    fn is_numeric(&self) -> bool {
        false
    }

    /// Assert that `value` satisfies the constraint. The error is a
    /// human-readable reason.
    fn check(&self, value: &Value) -> std::result::Result<(), String>;
}

/// Built-in field types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Date,
    Datetime,
    List,
    Object,
    Ref,
    /// A type owned by a collaborator; never checked here.
    #[serde(untagged)]
    Custom(std::string::String),
}

impl TypeConstraint for FieldType {
    fn name(&self) -> &str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Date => "date",
            FieldType::Datetime => "datetime",
            FieldType::List => "list",
            FieldType::Object => "object",
            FieldType::Ref => "ref",
            FieldType::Custom(name) => name,
        }
    }

    fn is_checkable(&self) -> bool {
        !matches!(self, FieldType::Custom(_))
    }

    fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Integer)
    }

    fn check(&self, value: &Value) -> std::result::Result<(), String> {
        if value.is_null() {
            return Ok(());
        }

        let ok = match self {
            FieldType::String => value.is_string(),
            FieldType::Number => match value {
                Value::Number(_) => true,
                Value::String(s) => s.trim().parse::<f64>().is_ok(),
                _ => false,
            },
            FieldType::Integer => match value {
                Value::Number(n) => n.is_i64() || n.is_u64(),
                Value::String(s) => s.trim().parse::<i64>().is_ok(),
                _ => false,
            },
            FieldType::Boolean => value.is_boolean(),
            FieldType::Date => value
                .as_str()
                .is_some_and(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()),
            FieldType::Datetime => value
                .as_str()
                .is_some_and(|s| DateTime::parse_from_rfc3339(s).is_ok()),
            FieldType::List => value.is_array(),
            FieldType::Object => value.is_object(),
            FieldType::Ref => value.is_string(),
            FieldType::Custom(_) => true,
        };

        if ok {
            Ok(())
        } else {
            Err(format!("expected {}, got {}", self.name(), describe(value)))
        }
    }
}

/// String field restricted to a fixed set of values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneOf {
    values: Vec<String>,
}

impl OneOf {
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl TypeConstraint for OneOf {
    fn name(&self) -> &str {
        "enum"
    }

    fn check(&self, value: &Value) -> std::result::Result<(), String> {
        match value {
            Value::Null => Ok(()),
            Value::String(s) if self.values.contains(s) => Ok(()),
            Value::String(s) => Err(format!("value '{s}' is not in enum: {:?}", self.values)),
            other => Err(format!("expected string, got {}", describe(other))),
        }
    }
}

/// String field that must match a regular expression
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> std::result::Result<Self, regex::Error> {
        Ok(Self {
            regex: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }
}

impl TypeConstraint for Pattern {
    fn name(&self) -> &str {
        "pattern"
    }

    fn check(&self, value: &Value) -> std::result::Result<(), String> {
        match value {
            Value::Null => Ok(()),
            Value::String(s) if self.regex.is_match(s) => Ok(()),
            Value::String(s) => Err(format!(
                "value '{s}' does not match pattern '{}'",
                self.regex.as_str()
            )),
            other => Err(format!("expected string, got {}", describe(other))),
        }
    }
}

/// Coerce a value to numeric form. Numbers pass through, numeric strings
/// are parsed (integers preferred), booleans become 0/1 and null stays null.
pub fn to_numeric(value: &Value) -> Option<Value> {
    match value {
        Value::Null | Value::Number(_) => Some(value.clone()),
        Value::Bool(b) => Some(Value::from(u8::from(*b))),
        Value::String(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                Some(Value::from(i))
            } else {
                s.parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
            }
        }
        Value::Array(_) | Value::Object(_) => None,
    }
}

pub(crate) fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
