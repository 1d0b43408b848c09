pub mod accessor;
pub mod class;
pub mod collection;
pub mod document;
pub mod error;
pub mod field;
pub mod model;
pub mod relationship;
pub mod schema;

pub use class::{ClassId, ClassRef, ClassRegistry, DocumentClass};
pub use collection::{CollectionClass, CollectionHandle, Connection, GenericCollectionClass};
pub use document::{Document, DocumentBase};
pub use error::{DocModelError, Result};
pub use field::{FieldDescriptor, FieldOptions, FieldType, TypeConstraint};
pub use model::{Model, ModelId};
pub use relationship::{RelationshipDescriptor, RelationshipKind, RelationshipKinds};
pub use schema::SchemaDefinition;

/// Free-form options passed through to collection classes and
/// relationship constructors.
pub type Options = serde_json::Map<String, serde_json::Value>;
