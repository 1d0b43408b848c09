use crate::accessor;
use crate::class::{ClassRef, ClassRegistry};
use crate::collection::{CollectionClass, CollectionHandle, CollectionInit, Connection, GenericCollectionClass};
use crate::document::{Document, DocumentBase};
use crate::error::{DocModelError, Result};
use crate::field::{FieldDescriptor, FieldOptions, IntoFieldNames};
use crate::relationship::{RelationshipConfig, RelationshipDescriptor, RelationshipKind, RelationshipKinds};
use crate::Options;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Process-unique identity of a [`Model`]. Document classes and documents
/// refer back to their model through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelId(u64);

impl ModelId {
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        ModelId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Schema of one kind of document: its fields, relationships, backing
/// collection and the classes implementing it.
///
/// Declarations take `&mut self` and are expected to happen during setup;
/// everything afterwards only needs `&self`.
pub struct Model {
    id: ModelId,
    name: String,
    collection_name: Option<String>,
    explicit_class: Option<ClassRef>,
    document_class: OnceLock<ClassRef>,
    collection_class: Arc<dyn CollectionClass>,
    classes: Arc<ClassRegistry>,
    kinds: Arc<RelationshipKinds>,
    fields: Vec<FieldDescriptor>,
    relationships: HashMap<String, RelationshipDescriptor>,
}

impl Model {
    /// A model with the given logical name (e.g. `"user"`). The name may be
    /// empty if a collection name is set explicitly.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: ModelId::next(),
            name: name.into(),
            collection_name: None,
            explicit_class: None,
            document_class: OnceLock::new(),
            collection_class: Arc::new(GenericCollectionClass),
            classes: Arc::clone(ClassRegistry::global()),
            kinds: Arc::new(RelationshipKinds::builtin()),
            fields: Vec::new(),
            relationships: HashMap::new(),
        }
    }

    pub fn with_collection_name(mut self, collection_name: impl Into<String>) -> Self {
        self.collection_name = Some(collection_name.into());
        self
    }

    /// Use an existing class instead of synthesizing one. The class is
    /// adopted (its owner set to this model) on first use.
    pub fn with_document_class(mut self, class: ClassRef) -> Self {
        self.explicit_class = Some(class);
        self
    }

    pub fn with_collection_class(mut self, class: Arc<dyn CollectionClass>) -> Self {
        self.collection_class = class;
        self
    }

    /// Synthesize anonymous classes in `classes` rather than the global
    /// registry. Has no effect once the document class exists.
    pub fn with_class_registry(mut self, classes: Arc<ClassRegistry>) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_relationship_kinds(mut self, kinds: Arc<RelationshipKinds>) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn id(&self) -> ModelId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The explicit collection name, or the model name pluralized.
    pub fn collection_name(&self) -> Result<String> {
        if let Some(collection_name) = self.collection_name.as_deref().filter(|n| !n.is_empty()) {
            return Ok(collection_name.to_string());
        }
        if self.name.is_empty() {
            return Err(DocModelError::Configuration(
                "model has neither a name nor a collection name".into(),
            ));
        }
        Ok(pluralize(&self.name))
    }

    /// The class governed by this model, created on first call.
    pub fn document_class(&self) -> ClassRef {
        let class = self.document_class.get_or_init(|| {
            let class = match &self.explicit_class {
                Some(class) => Arc::clone(class),
                None => self.classes.synthesize_anonymous(),
            };
            class.set_owner(self.id);
            log::debug!("Model '{}' governs document class {}", self.name, class.name());
            class
        });
        Arc::clone(class)
    }

    pub fn collection_class(&self) -> &Arc<dyn CollectionClass> {
        &self.collection_class
    }

    /// Declare one or more fields sharing `options`. Each name gets its own
    /// descriptor, appended in order, and its own accessor on the document
    /// class. Names are not checked for uniqueness: a repeated name adds a
    /// second descriptor and replaces the accessor.
    pub fn declare_field(&mut self, names: impl IntoFieldNames, options: FieldOptions) -> Result<&mut Self> {
        let fields = names
            .into_field_names()
            .into_iter()
            .map(|name| FieldDescriptor::new(name, options.clone()))
            .collect::<Result<Vec<_>>>()?;

        let class = self.document_class();
        for field in fields {
            if self.field(field.name()).is_some() {
                log::warn!(
                    "Field '{}' declared more than once on model '{}'; the last declaration's accessor wins",
                    field.name(),
                    self.name
                );
            }
            accessor::synthesize(&class, &field);
            self.fields.push(field);
        }
        Ok(self)
    }

    /// First field with this name, in declaration order.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Declare a relationship and store it under `accessor`, replacing any
    /// earlier relationship with the same accessor.
    pub fn declare_relationship(
        &mut self,
        kind: &str,
        accessor: &str,
        related_class: ClassRef,
        options: Options,
    ) -> Result<&RelationshipDescriptor> {
        let config = RelationshipConfig {
            kind: RelationshipKind::from_tag(kind),
            accessor: accessor.to_string(),
            model_name: self.name.clone(),
            document_class: self.document_class(),
            related_class,
            options,
        };
        let descriptor = self.kinds.construct(config)?;
        log::debug!(
            "Model '{}' {} {} as '{}'",
            self.name,
            descriptor.kind,
            descriptor.related_class.name(),
            accessor
        );

        self.relationships.insert(accessor.to_string(), descriptor);
        Ok(&self.relationships[accessor])
    }

    pub fn relationship(&self, accessor: &str) -> Option<&RelationshipDescriptor> {
        self.relationships.get(accessor)
    }

    pub fn relationships(&self) -> impl Iterator<Item = &RelationshipDescriptor> {
        self.relationships.values()
    }

    /// Build a collection handle bound to `connection`, this model and
    /// `options`, using the model's collection class.
    pub fn new_collection(
        &self,
        connection: Option<Arc<dyn Connection>>,
        options: Options,
    ) -> Result<Box<dyn CollectionHandle + '_>> {
        let connection = connection.ok_or(DocModelError::MissingConnection)?;
        let collection_name = self.collection_name()?;
        log::debug!(
            "Creating {} '{}' for model '{}'",
            self.collection_class.name(),
            collection_name,
            self.name
        );
        self.collection_class.construct(CollectionInit {
            connection,
            model: self,
            collection_name,
            options,
        })
    }

    /// A fresh document of this model's class with field defaults filled in.
    /// A redeclared field takes its default from the last declaration only.
    pub fn new_document(&self) -> Document {
        let mut doc = Document::new(self.document_class());
        let mut seen = HashSet::new();
        for field in self.fields.iter().rev() {
            if !seen.insert(field.name()) {
                continue;
            }
            if let Some(default) = field.default() {
                doc.raw_mut().insert(field.name().to_string(), default.clone());
            }
        }
        doc
    }

    /// Whether `doc` reports this model as its governing model.
    pub fn owns<D: DocumentBase + ?Sized>(&self, doc: &D) -> bool {
        doc.model() == Some(self.id)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields.iter().map(FieldDescriptor::name).collect();
        let mut relationships: Vec<&str> = self.relationships.keys().map(String::as_str).collect();
        relationships.sort_unstable();

        f.debug_struct("Model")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("collection_name", &self.collection_name)
            .field("document_class", &self.document_class.get().map(|c| c.name()))
            .field("collection_class", &self.collection_class.name())
            .field("fields", &fields)
            .field("relationships", &relationships)
            .finish()
    }
}

/// Append `s` unless the name already ends in one.
pub fn pluralize(name: &str) -> String {
    if name.ends_with('s') {
        name.to_string()
    } else {
        format!("{name}s")
    }
}
