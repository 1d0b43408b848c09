// Relationships - descriptors and the table of relationship kinds

use crate::class::ClassRef;
use crate::error::{DocModelError, Result};
use crate::Options;
use heck::{ToSnakeCase, ToUpperCamelCase};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Known relationship kinds, plus any tag registered by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationshipKind {
    BelongsTo,
    HasMany,
    HasOne,
    Other(String),
}

impl RelationshipKind {
    /// Kind for a tag in any casing; `BelongsTo` and `belongs-to` both
    /// read as `belongs_to`.
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.to_snake_case();
        match tag.as_str() {
            "belongs_to" => RelationshipKind::BelongsTo,
            "has_many" => RelationshipKind::HasMany,
            "has_one" => RelationshipKind::HasOne,
            _ => RelationshipKind::Other(tag),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            RelationshipKind::BelongsTo => "belongs_to",
            RelationshipKind::HasMany => "has_many",
            RelationshipKind::HasOne => "has_one",
            RelationshipKind::Other(tag) => tag,
        }
    }

    /// Name the implementation is registered under.
    pub fn class_name(&self) -> String {
        self.as_str().to_upper_camel_case()
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PartialEq<&str> for RelationshipKind {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Everything a relationship constructor receives.
#[derive(Debug, Clone)]
pub struct RelationshipConfig {
    pub kind: RelationshipKind,
    pub accessor: String,
    /// Name of the declaring model, used for default foreign keys.
    pub model_name: String,
    pub document_class: ClassRef,
    pub related_class: ClassRef,
    pub options: Options,
}

/// A declared relationship between two document classes.
#[derive(Debug, Clone)]
pub struct RelationshipDescriptor {
    pub kind: RelationshipKind,
    pub accessor: String,
    pub document_class: ClassRef,
    pub related_class: ClassRef,
    /// Key linking the two sides, when the kind has one.
    pub foreign_key: Option<String>,
    /// Options not consumed by the kind's constructor.
    pub options: Options,
}

impl RelationshipDescriptor {
    /// A descriptor carrying the config verbatim, with no foreign key.
    pub fn from_config(config: RelationshipConfig) -> Self {
        Self {
            kind: config.kind,
            accessor: config.accessor,
            document_class: config.document_class,
            related_class: config.related_class,
            foreign_key: None,
            options: config.options,
        }
    }
}

pub type RelationshipConstructor =
    Arc<dyn Fn(RelationshipConfig) -> Result<RelationshipDescriptor> + Send + Sync>;

/// Registration table from class name to constructor.
#[derive(Clone)]
pub struct RelationshipKinds {
    constructors: HashMap<String, RelationshipConstructor>,
}

impl RelationshipKinds {
    /// A table with nothing registered.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// `BelongsTo`, `HasMany` and `HasOne`.
    pub fn builtin() -> Self {
        let mut kinds = Self::empty();
        kinds.register("BelongsTo", belongs_to);
        kinds.register("HasMany", has_many);
        kinds.register("HasOne", has_one);
        kinds
    }

    /// Register (or replace) the constructor for a class name.
    pub fn register<F>(&mut self, class_name: impl Into<String>, constructor: F) -> &mut Self
    where
        F: Fn(RelationshipConfig) -> Result<RelationshipDescriptor> + Send + Sync + 'static,
    {
        self.constructors
            .insert(class_name.into(), Arc::new(constructor));
        self
    }

    pub fn resolve(&self, kind: &RelationshipKind) -> Result<&RelationshipConstructor> {
        let class_name = kind.class_name();
        self.constructors
            .get(&class_name)
            .ok_or(DocModelError::UnknownRelationshipKind { class_name })
    }

    /// Resolve the kind in `config` and run its constructor.
    pub fn construct(&self, config: RelationshipConfig) -> Result<RelationshipDescriptor> {
        let constructor = self.resolve(&config.kind)?;
        constructor(config)
    }

    pub fn class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for RelationshipKinds {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for RelationshipKinds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationshipKinds")
            .field("constructors", &self.class_names())
            .finish()
    }
}

fn belongs_to(config: RelationshipConfig) -> Result<RelationshipDescriptor> {
    let default_key = format!("{}_id", config.accessor);
    with_foreign_key(config, default_key)
}

fn has_many(config: RelationshipConfig) -> Result<RelationshipDescriptor> {
    let default_key = owner_key(&config)?;
    with_foreign_key(config, default_key)
}

fn has_one(config: RelationshipConfig) -> Result<RelationshipDescriptor> {
    let default_key = owner_key(&config)?;
    with_foreign_key(config, default_key)
}

fn owner_key(config: &RelationshipConfig) -> Result<String> {
    if config.model_name.is_empty() && !config.options.contains_key("foreign_key") {
        return Err(DocModelError::Configuration(format!(
            "{} '{}' needs a foreign_key option on an unnamed model",
            config.kind, config.accessor
        )));
    }
    Ok(format!("{}_id", config.model_name))
}

fn with_foreign_key(
    mut config: RelationshipConfig,
    default_key: String,
) -> Result<RelationshipDescriptor> {
    let foreign_key = match config.options.remove("foreign_key") {
        Some(Value::String(key)) if !key.is_empty() => key,
        Some(other) => {
            return Err(DocModelError::Configuration(format!(
                "foreign_key of '{}' must be a non-empty string, got {other}",
                config.accessor
            )))
        }
        None => default_key,
    };

    let mut descriptor = RelationshipDescriptor::from_config(config);
    descriptor.foreign_key = Some(foreign_key);
    Ok(descriptor)
}
