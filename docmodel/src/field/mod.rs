pub mod types;

pub use types::{to_numeric, FieldType, OneOf, Pattern, TypeConstraint};

use crate::accessor;
use crate::error::{DocModelError, Result};
use serde_json::Value;
use std::sync::Arc;

/// Metadata shared by every name passed to a single `declare_field` call
#[derive(Debug, Clone, Default)]
pub struct FieldOptions {
    pub field_type: Option<Arc<dyn TypeConstraint>>,
    pub default: Option<Value>,
}

impl FieldOptions {
    /// No type, no default.
    pub fn untyped() -> Self {
        Self::default()
    }

    pub fn typed<C: TypeConstraint + 'static>(constraint: C) -> Self {
        Self {
            field_type: Some(Arc::new(constraint)),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }
}

/// Immutable description of one declared field.
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    field_type: Option<Arc<dyn TypeConstraint>>,
    default: Option<Value>,
}

impl FieldDescriptor {
    /// Build a descriptor. The name must be non-empty, and a default on a
    /// typed field goes through the same check/coerce path a write would.
    pub fn new(name: impl Into<String>, options: FieldOptions) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DocModelError::Configuration(
                "field name must not be empty".into(),
            ));
        }

        let default = match options.default {
            Some(value) => {
                let write = accessor::compile_write(&name, options.field_type.as_ref());
                Some(write(value)?)
            }
            None => None,
        };

        Ok(Self {
            name,
            field_type: options.field_type,
            default,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field_type(&self) -> Option<&Arc<dyn TypeConstraint>> {
        self.field_type.as_ref()
    }

    pub fn is_typed(&self) -> bool {
        self.field_type.is_some()
    }

    pub fn default(&self) -> Option<&Value> {
        self.default.as_ref()
    }
}

/// One field name or an ordered list of names.
pub trait IntoFieldNames {
    fn into_field_names(self) -> Vec<String>;
}

impl IntoFieldNames for &str {
    fn into_field_names(self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl IntoFieldNames for String {
    fn into_field_names(self) -> Vec<String> {
        vec![self]
    }
}

impl IntoFieldNames for &[&str] {
    fn into_field_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl<const N: usize> IntoFieldNames for [&str; N] {
    fn into_field_names(self) -> Vec<String> {
        self.iter().map(|s| s.to_string()).collect()
    }
}

impl IntoFieldNames for Vec<String> {
    fn into_field_names(self) -> Vec<String> {
        self
    }
}

impl IntoFieldNames for Vec<&str> {
    fn into_field_names(self) -> Vec<String> {
        self.into_iter().map(str::to_string).collect()
    }
}
