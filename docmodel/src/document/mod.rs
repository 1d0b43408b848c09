// Document instances - raw field store, dirty flags, class back-reference

use crate::class::ClassRef;
use crate::error::{DocModelError, Result};
use crate::model::ModelId;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

/// Capabilities every document type must provide so that synthesized
/// accessors can operate on it.
pub trait DocumentBase {
    fn raw(&self) -> &Map<String, Value>;

    fn raw_mut(&mut self) -> &mut Map<String, Value>;

    fn is_dirty(&self, field: &str) -> bool;

    fn mark_dirty(&mut self, field: &str);

    /// The model governing this document, if any.
    fn model(&self) -> Option<ModelId>;

    fn set_model(&mut self, model: ModelId);
}

/// A document instance of some [`DocumentClass`](crate::class::DocumentClass).
#[derive(Debug, Clone)]
pub struct Document {
    class: ClassRef,
    model: Option<ModelId>,
    raw: Map<String, Value>,
    dirty: BTreeSet<String>,
}

impl Document {
    /// An empty document. The governing model is taken from the class owner.
    pub fn new(class: ClassRef) -> Self {
        Self::from_raw(class, Map::new())
    }

    /// A document holding already-persisted data; nothing is marked dirty.
    pub fn from_raw(class: ClassRef, raw: Map<String, Value>) -> Self {
        let model = class.owner();
        Self {
            class,
            model,
            raw,
            dirty: BTreeSet::new(),
        }
    }

    pub fn class(&self) -> &ClassRef {
        &self.class
    }

    /// Stored value of a field, without coercion.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.raw.get(field)
    }

    /// Write a field through its synthesized accessor. This looks the
    /// accessor up by name on every call; resolve it once with
    /// [`DocumentClass::accessor`](crate::class::DocumentClass::accessor)
    /// for repeated writes.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<&mut Self> {
        let accessor = self
            .class
            .accessor(field)
            .ok_or_else(|| DocModelError::UnknownField {
                class: self.class.name().to_string(),
                field: field.to_string(),
            })?;
        accessor.set(self, value.into())
    }

    /// Fields written since load or the last [`clear_dirty`](Self::clear_dirty).
    pub fn dirty_fields(&self) -> impl Iterator<Item = &str> {
        self.dirty.iter().map(String::as_str)
    }

    pub fn has_changes(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }

    pub fn into_raw(self) -> Map<String, Value> {
        self.raw
    }
}

impl DocumentBase for Document {
    fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    fn raw_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.raw
    }

    fn is_dirty(&self, field: &str) -> bool {
        self.dirty.contains(field)
    }

    fn mark_dirty(&mut self, field: &str) {
        if !self.dirty.contains(field) {
            self.dirty.insert(field.to_string());
        }
    }

    fn model(&self) -> Option<ModelId> {
        self.model
    }

    fn set_model(&mut self, model: ModelId) {
        self.model = Some(model);
    }
}
