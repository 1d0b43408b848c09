use docmodel::schema::{FieldDefinition, ModelDefinition};
use docmodel::FieldType;
use heck::{ToPascalCase, ToSnakeCase};
use proc_macro2::TokenStream;
use quote::quote;

/// Name of the wrapper struct for a model: the explicit document class
/// name if the schema gives one, otherwise the model name in PascalCase.
/// e.g. "post" -> "Post", "blog_post" -> "BlogPost"
pub fn model_struct_name(model_name: &str, model: &ModelDefinition) -> String {
    match &model.document_class {
        Some(class_name) => class_name.to_pascal_case(),
        None => model_name.to_pascal_case(),
    }
}

/// Parse `candidate` as a Rust identifier, raw identifiers included.
pub fn parse_ident(candidate: &str, what: &str) -> Result<proc_macro2::Ident, String> {
    syn::parse_str::<syn::Ident>(candidate)
        .map_err(|_| format!("{what} does not map to a Rust identifier (got '{candidate}')"))
}

/// Getter identifier for a field, escaping Rust keywords.
/// e.g. "viewCount" -> "view_count", "type" -> "r#type"
pub fn safe_field_ident(name: &str) -> Result<proc_macro2::Ident, String> {
    let snake = name.to_snake_case();
    let candidate = match snake.as_str() {
        "type" | "struct" | "enum" | "fn" | "let" | "mut" | "ref" | "mod" | "use"
        | "pub" | "impl" | "trait" | "for" | "loop" | "while" | "if" | "else" | "match"
        | "return" | "break" | "continue" | "as" | "in" | "where" | "async" | "await" | "dyn"
        | "move" | "static" | "const" | "unsafe" | "extern" | "true" | "false" | "abstract"
        | "become" | "box" | "do" | "final" | "macro" | "override" | "priv" | "typeof"
        | "unsized" | "virtual" | "yield" | "try" => format!("r#{snake}"),
        // these cannot be raw identifiers
        "self" | "super" | "crate" => format!("{snake}_"),
        _ => snake,
    };
    parse_ident(&candidate, &format!("Field '{name}'"))
}

/// Setter identifier for a field. e.g. "title" -> "set_title"
pub fn setter_ident(name: &str) -> Result<proc_macro2::Ident, String> {
    parse_ident(
        &format!("set_{}", name.to_snake_case()),
        &format!("Field '{name}'"),
    )
}

/// How a getter should expose the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Str,
    Float,
    Int,
    Bool,
    List,
    Object,
    Raw,
}

/// Pick the getter shape for a field definition. Enum and pattern
/// constraints always hold strings; untyped and custom fields stay raw.
pub fn value_shape(field: &FieldDefinition) -> ValueShape {
    if field.enum_values.is_some() || field.pattern.is_some() {
        return ValueShape::Str;
    }
    match &field.field_type {
        Some(FieldType::String | FieldType::Date | FieldType::Datetime | FieldType::Ref) => {
            ValueShape::Str
        }
        Some(FieldType::Number) => ValueShape::Float,
        Some(FieldType::Integer) => ValueShape::Int,
        Some(FieldType::Boolean) => ValueShape::Bool,
        Some(FieldType::List) => ValueShape::List,
        Some(FieldType::Object) => ValueShape::Object,
        Some(FieldType::Custom(_)) | None => ValueShape::Raw,
    }
}

/// Return type of the getter for a shape.
pub fn getter_type(shape: ValueShape) -> TokenStream {
    match shape {
        ValueShape::Str => quote! { Option<&str> },
        ValueShape::Float => quote! { Option<f64> },
        ValueShape::Int => quote! { Option<i64> },
        ValueShape::Bool => quote! { Option<bool> },
        ValueShape::List => quote! { Option<&Vec<serde_json::Value>> },
        ValueShape::Object => quote! { Option<&serde_json::Map<String, serde_json::Value>> },
        ValueShape::Raw => quote! { Option<&serde_json::Value> },
    }
}

/// Conversion applied to the raw `Option<&Value>` in the getter body.
pub fn getter_conversion(shape: ValueShape) -> TokenStream {
    match shape {
        ValueShape::Str => quote! { .and_then(serde_json::Value::as_str) },
        ValueShape::Float => quote! { .and_then(serde_json::Value::as_f64) },
        ValueShape::Int => quote! { .and_then(serde_json::Value::as_i64) },
        ValueShape::Bool => quote! { .and_then(serde_json::Value::as_bool) },
        ValueShape::List => quote! { .and_then(serde_json::Value::as_array) },
        ValueShape::Object => quote! { .and_then(serde_json::Value::as_object) },
        ValueShape::Raw => TokenStream::new(),
    }
}
