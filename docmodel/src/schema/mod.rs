mod parser;
mod types;

pub use parser::{parse_schema, parse_schema_str};
pub use types::{FieldDefinition, ModelDefinition, OrderedMap, RelationshipDefinition, SchemaDefinition};

use crate::class::ClassRegistry;
use crate::error::{DocModelError, Result};
use crate::field::{FieldOptions, FieldType, OneOf, Pattern};
use crate::model::Model;
use crate::relationship::RelationshipKinds;
use std::sync::Arc;

impl FieldDefinition {
    /// Turn the YAML definition into declaration options.
    pub fn options(&self, field_name: &str) -> Result<FieldOptions> {
        let mut options = match (&self.enum_values, &self.pattern) {
            (Some(_), Some(_)) => {
                return Err(DocModelError::Schema(format!(
                    "Field '{field_name}' cannot have both enum and pattern"
                )))
            }
            (Some(values), None) => {
                self.require_string_type(field_name, "enum")?;
                FieldOptions::typed(OneOf::new(values.iter().cloned()))
            }
            (None, Some(pattern)) => {
                self.require_string_type(field_name, "pattern")?;
                let pattern = Pattern::new(pattern).map_err(|e| {
                    DocModelError::Schema(format!("Field '{field_name}' has an invalid pattern: {e}"))
                })?;
                FieldOptions::typed(pattern)
            }
            (None, None) => match &self.field_type {
                Some(field_type) => FieldOptions::typed(field_type.clone()),
                None => FieldOptions::untyped(),
            },
        };
        options.default = self.default.clone();
        Ok(options)
    }

    fn require_string_type(&self, field_name: &str, constraint: &str) -> Result<()> {
        match &self.field_type {
            None | Some(FieldType::String) => Ok(()),
            Some(other) => Err(DocModelError::Schema(format!(
                "Field '{field_name}' uses {constraint}, which only applies to strings (type is {other:?})"
            ))),
        }
    }
}

impl SchemaDefinition {
    /// Declare every model in the schema, in file order.
    ///
    /// Fields are declared first for all models, then relationships, so a
    /// relationship may target any model in the file. Relationship targets
    /// are model names.
    pub fn build_models(
        &self,
        classes: &Arc<ClassRegistry>,
        kinds: &Arc<RelationshipKinds>,
    ) -> Result<Vec<Model>> {
        let mut models = Vec::with_capacity(self.models.len());

        for (name, definition) in self.models.iter() {
            let mut model = Model::new(name)
                .with_class_registry(Arc::clone(classes))
                .with_relationship_kinds(Arc::clone(kinds));
            if let Some(collection) = &definition.collection {
                model = model.with_collection_name(collection.as_str());
            }
            if let Some(class_name) = &definition.document_class {
                model = model.with_document_class(classes.define(class_name));
            }

            for (field_name, field) in definition.fields.iter() {
                let options = field
                    .options(field_name)
                    .map_err(|e| with_model_context(name, e))?;
                model
                    .declare_field(field_name, options)
                    .map_err(|e| with_model_context(name, e))?;
            }

            // Surface a missing name/collection now rather than on first use.
            model.collection_name()?;
            models.push(model);
        }

        for (index, (name, definition)) in self.models.iter().enumerate() {
            for (accessor, relationship) in definition.relationships.iter() {
                let target = self
                    .models
                    .keys()
                    .position(|model| model == relationship.target)
                    .ok_or_else(|| {
                        DocModelError::Schema(format!(
                            "Relationship '{name}.{accessor}' targets unknown model '{}'",
                            relationship.target
                        ))
                    })?;
                let related_class = models[target].document_class();
                models[index].declare_relationship(
                    &relationship.kind,
                    accessor,
                    related_class,
                    relationship.options.clone(),
                )?;
            }
        }

        log::debug!("Built {} models from schema", models.len());
        Ok(models)
    }
}

fn with_model_context(model: &str, error: DocModelError) -> DocModelError {
    match error {
        DocModelError::Schema(message) => DocModelError::Schema(format!("Model '{model}': {message}")),
        DocModelError::Configuration(message) => {
            DocModelError::Configuration(format!("Model '{model}': {message}"))
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentBase;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const BLOG_SCHEMA: &str = r#"
models:
  post:
    fields:
      title: {}
      view_count: { type: number, default: 0 }
      status: { type: string, enum: [draft, published], default: draft }
      slug: { pattern: "^[a-z0-9-]+$" }
      location: { type: geo_point }
    relationships:
      author: { kind: belongs_to, target: author }
      comments: { kind: has_many, target: comment, order_by: created_at }

  author:
    document_class: Author
    fields:
      name: { type: string }
      born: { type: date }
    relationships:
      posts: { kind: has_many, target: post, foreign_key: author_id }

  comment:
    collection: post_comments
    fields:
      body: { type: string }
"#;

    fn build(yaml: &str) -> Result<(Arc<ClassRegistry>, Vec<Model>)> {
        let schema = parse_schema_str(yaml)?;
        let classes = Arc::new(ClassRegistry::new());
        let models = schema.build_models(&classes, &Arc::new(RelationshipKinds::builtin()))?;
        Ok((classes, models))
    }

    #[test]
    fn test_parse_preserves_order() {
        let schema = parse_schema_str(BLOG_SCHEMA).unwrap();
        assert_eq!(schema.models.keys().collect::<Vec<_>>(), vec!["post", "author", "comment"]);

        let post = schema.models.get("post").unwrap();
        assert_eq!(
            post.fields.keys().collect::<Vec<_>>(),
            vec!["title", "view_count", "status", "slug", "location"]
        );
        let comments = post.relationships.get("comments").unwrap();
        assert_eq!(comments.kind, "has_many");
        assert_eq!(comments.options.get("order_by"), Some(&json!("created_at")));
    }

    #[test]
    fn test_build_models() {
        let (classes, models) = build(BLOG_SCHEMA).unwrap();
        assert_eq!(models.len(), 3);

        let post = &models[0];
        assert_eq!(post.collection_name().unwrap(), "posts");
        assert_eq!(
            post.fields().iter().map(|f| f.name()).collect::<Vec<_>>(),
            vec!["title", "view_count", "status", "slug", "location"]
        );
        assert!(post.document_class().is_anonymous());

        let author = &models[1];
        assert_eq!(author.document_class().name(), "Author");
        assert!(classes.by_name("Author").is_some());

        let rel = post.relationship("author").unwrap();
        assert!(rel.kind == "belongs_to");
        assert!(Arc::ptr_eq(&rel.related_class, &author.document_class()));

        let comments = post.relationship("comments").unwrap();
        assert_eq!(comments.foreign_key.as_deref(), Some("post_id"));
        assert_eq!(
            author.relationship("posts").unwrap().foreign_key.as_deref(),
            Some("author_id")
        );

        assert_eq!(models[2].collection_name().unwrap(), "post_comments");
    }

    #[test]
    fn test_built_accessors_enforce_types() {
        let (_classes, models) = build(BLOG_SCHEMA).unwrap();
        let post = &models[0];

        let mut doc = post.new_document();
        assert_eq!(doc.get("view_count"), Some(&json!(0)));
        assert_eq!(doc.get("status"), Some(&json!("draft")));

        doc.set("view_count", "12").unwrap();
        assert_eq!(doc.get("view_count"), Some(&json!(12)));
        assert!(doc.set("status", "archived").is_err());
        assert!(doc.set("slug", "Not A Slug").is_err());
        doc.set("slug", "hello-world").unwrap();
        // custom types are passed through untouched
        doc.set("location", json!({"lat": 1.5, "lng": 2.0})).unwrap();
        assert!(doc.is_dirty("location"));
        assert!(post.owns(&doc));
    }

    #[test]
    fn test_unknown_target() {
        let err = build(
            r#"
models:
  post:
    relationships:
      author: { kind: belongs_to, target: writer }
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown model 'writer'"), "{err}");
    }

    #[test]
    fn test_unknown_kind() {
        let err = build(
            r#"
models:
  post:
    relationships:
      tags: { kind: embeds_many, target: post }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DocModelError::UnknownRelationshipKind { .. }));
    }

    #[test]
    fn test_enum_and_pattern_conflict() {
        let err = build(
            r#"
models:
  post:
    fields:
      status: { enum: [a, b], pattern: "^a$" }
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("Model 'post'"), "{err}");
        assert!(err.to_string().contains("both enum and pattern"), "{err}");
    }

    #[test]
    fn test_enum_on_number_rejected() {
        let err = build(
            r#"
models:
  post:
    fields:
      rank: { type: number, enum: ["1", "2"] }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DocModelError::Schema(_)));
    }

    #[test]
    fn test_invalid_default_rejected() {
        let err = build(
            r#"
models:
  post:
    fields:
      view_count: { type: number, default: lots }
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DocModelError::TypeConstraint { .. }));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let result = parse_schema_str(
            r#"
models:
  post:
    fields:
      title: {}
      title: { type: string }
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.yaml");
        std::fs::write(&path, BLOG_SCHEMA).unwrap();

        let schema = parse_schema(&path).unwrap();
        assert_eq!(schema.models.len(), 3);

        let missing = parse_schema(&dir.path().join("missing.yaml")).unwrap_err();
        assert!(matches!(missing, DocModelError::Io(_)));
    }

    #[test]
    fn test_blank_schema_is_empty() {
        assert!(parse_schema_str("").unwrap().models.is_empty());
        assert!(parse_schema_str("  \n").unwrap().models.is_empty());
    }

    #[test]
    fn test_round_trip_keeps_order() {
        let schema = parse_schema_str(BLOG_SCHEMA).unwrap();
        let yaml = serde_yaml::to_string(&schema).unwrap();
        let again = parse_schema_str(&yaml).unwrap();
        assert_eq!(again.models.keys().collect::<Vec<_>>(), vec!["post", "author", "comment"]);
    }
}
