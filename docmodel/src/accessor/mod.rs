// Field accessors - write closures compiled once when a field is declared

use crate::class::DocumentClass;
use crate::document::DocumentBase;
use crate::error::{DocModelError, Result};
use crate::field::types::describe;
use crate::field::{to_numeric, FieldDescriptor, TypeConstraint};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Processing applied to a value before it is stored.
pub type WriteFn = Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Get/set behavior for one field of one document class.
pub struct FieldAccessor {
    field: String,
    type_name: Option<String>,
    write: WriteFn,
}

impl FieldAccessor {
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Name of the field's type, `None` for untyped fields.
    pub fn type_name(&self) -> Option<&str> {
        self.type_name.as_deref()
    }

    /// Read the stored value as-is.
    pub fn get<'d, D: DocumentBase + ?Sized>(&self, doc: &'d D) -> Option<&'d Value> {
        doc.raw().get(&self.field)
    }

    /// Process `value`, mark the field dirty and store it. On error the
    /// document is left untouched.
    pub fn set<'d, D: DocumentBase + ?Sized>(&self, doc: &'d mut D, value: Value) -> Result<&'d mut D> {
        let value = (self.write)(value)?;
        doc.mark_dirty(&self.field);
        doc.raw_mut().insert(self.field.clone(), value);
        Ok(doc)
    }

    /// Run the write processing without touching any document.
    pub fn process(&self, value: Value) -> Result<Value> {
        (self.write)(value)
    }
}

impl fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAccessor")
            .field("field", &self.field)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Build the accessor for `field` and install it on `class`, replacing any
/// accessor previously installed under the same name.
pub fn synthesize(class: &DocumentClass, field: &FieldDescriptor) -> Arc<FieldAccessor> {
    let accessor = Arc::new(FieldAccessor {
        field: field.name().to_string(),
        type_name: field.field_type().map(|ty| ty.name().to_string()),
        write: compile_write(field.name(), field.field_type()),
    });
    class.install_accessor(Arc::clone(&accessor));
    log::debug!(
        "Installed accessor {}.{} ({})",
        class.name(),
        field.name(),
        accessor.type_name().unwrap_or("untyped")
    );
    accessor
}

/// Pick the write pipeline for a field from its type.
pub(crate) fn compile_write(field: &str, field_type: Option<&Arc<dyn TypeConstraint>>) -> WriteFn {
    let Some(constraint) = field_type else {
        return Arc::new(store_verbatim);
    };

    let field = field.to_string();
    let constraint = Arc::clone(constraint);
    match (constraint.is_checkable(), constraint.is_numeric()) {
        (false, false) => Arc::new(store_verbatim),
        (true, false) => Arc::new(move |value: Value| -> Result<Value> {
            check(&field, constraint.as_ref(), &value)?;
            Ok(value)
        }),
        (false, true) => Arc::new(move |value: Value| -> Result<Value> { coerce(&field, value) }),
        (true, true) => Arc::new(move |value: Value| -> Result<Value> {
            check(&field, constraint.as_ref(), &value)?;
            coerce(&field, value)
        }),
    }
}

fn store_verbatim(value: Value) -> Result<Value> {
    Ok(value)
}

fn check(field: &str, constraint: &dyn TypeConstraint, value: &Value) -> Result<()> {
    constraint
        .check(value)
        .map_err(|message| DocModelError::TypeConstraint {
            field: field.to_string(),
            message,
        })
}

fn coerce(field: &str, value: Value) -> Result<Value> {
    to_numeric(&value).ok_or_else(|| DocModelError::TypeConstraint {
        field: field.to_string(),
        message: format!("cannot coerce {} to a number", describe(&value)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassRegistry;
    use crate::document::Document;
    use crate::field::{FieldOptions, FieldType, OneOf};
    use serde_json::json;

    /// A numeric type that skips checking, so coercion alone decides.
    #[derive(Debug)]
    struct LooseNumber;

    impl TypeConstraint for LooseNumber {
        fn name(&self) -> &str {
            "loose_number"
        }

        fn is_checkable(&self) -> bool {
            false
        }

        fn is_numeric(&self) -> bool {
            true
        }

        fn check(&self, _value: &Value) -> std::result::Result<(), String> {
            Err("never called".into())
        }
    }

    fn field(name: &str, options: FieldOptions) -> FieldDescriptor {
        FieldDescriptor::new(name, options).unwrap()
    }

    #[test]
    fn test_untyped_write_and_read() {
        let classes = ClassRegistry::new();
        let class = classes.define("Note");
        let title = synthesize(&class, &field("title", FieldOptions::untyped()));

        let mut doc = Document::new(Arc::clone(&class));
        assert_eq!(title.get(&doc), None);

        title.set(&mut doc, json!({"any": "thing"})).unwrap();
        assert_eq!(title.get(&doc), Some(&json!({"any": "thing"})));
        assert!(doc.is_dirty("title"));
        assert_eq!(title.type_name(), None);
    }

    #[test]
    fn test_numeric_coercion_on_write() {
        let classes = ClassRegistry::new();
        let class = classes.define("Post");
        let views = synthesize(&class, &field("view_count", FieldOptions::typed(FieldType::Number)));

        let mut doc = Document::new(Arc::clone(&class));
        views.set(&mut doc, json!("42")).unwrap();
        assert_eq!(views.get(&doc), Some(&json!(42)));
    }

    #[test]
    fn test_rejected_write_keeps_previous_value() {
        let classes = ClassRegistry::new();
        let class = classes.define("Post");
        let views = synthesize(&class, &field("view_count", FieldOptions::typed(FieldType::Number)));
        let status = synthesize(&class, &field("status", FieldOptions::typed(OneOf::new(["draft"]))));

        let mut doc = Document::new(Arc::clone(&class));
        views.set(&mut doc, json!(7)).unwrap();
        doc.clear_dirty();

        let err = views.set(&mut doc, json!("many")).unwrap_err();
        assert!(matches!(err, DocModelError::TypeConstraint { .. }));
        assert_eq!(views.get(&doc), Some(&json!(7)));
        assert!(!doc.is_dirty("view_count"));

        assert!(status.set(&mut doc, json!("gone")).is_err());
        assert_eq!(status.get(&doc), None);
        assert!(!doc.is_dirty("status"));
    }

    #[test]
    fn test_coercion_without_check() {
        let classes = ClassRegistry::new();
        let class = classes.define("Metric");
        let value = synthesize(&class, &field("value", FieldOptions::typed(LooseNumber)));

        let mut doc = Document::new(Arc::clone(&class));
        value.set(&mut doc, json!(" 3.5 ")).unwrap();
        assert_eq!(value.get(&doc), Some(&json!(3.5)));

        let err = value.set(&mut doc, json!("abc")).unwrap_err();
        assert!(err.to_string().contains("cannot coerce string"), "{err}");
    }

    #[test]
    fn test_set_is_chainable() {
        let classes = ClassRegistry::new();
        let class = classes.define("Pair");
        let a = synthesize(&class, &field("a", FieldOptions::untyped()));
        let b = synthesize(&class, &field("b", FieldOptions::untyped()));

        let mut doc = Document::new(Arc::clone(&class));
        let doc = a.set(&mut doc, json!(1)).unwrap();
        b.set(&mut *doc, json!(2)).unwrap();
        assert_eq!(doc.raw().len(), 2);
    }

    #[test]
    fn test_redeclaring_replaces_accessor() {
        let classes = ClassRegistry::new();
        let class = classes.define("Post");
        synthesize(&class, &field("score", FieldOptions::untyped()));
        synthesize(&class, &field("score", FieldOptions::typed(FieldType::Integer)));

        let score = class.accessor("score").unwrap();
        assert_eq!(score.type_name(), Some("integer"));
        assert_eq!(class.accessor_names(), vec!["score"]);
    }
}
