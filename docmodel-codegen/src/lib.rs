//! docmodel code generation - typed document wrappers from a schema YAML file.
//!
//! The main entry point is [`generate_from_schema`], which reads a schema file
//! and writes a Rust source file with one wrapper struct per model. Each
//! wrapper owns a `docmodel::Document` and exposes a getter/setter pair per
//! declared field, so call sites name fields at compile time while writes
//! still go through the model's synthesized accessors.

mod generator;
mod model_gen;
pub mod type_utils;

use std::path::Path;

/// Write typed wrappers for every model in the schema at `schema_path`
/// to `output_path`. Meant for build scripts:
///
/// ```no_run
/// docmodel_codegen::generate_from_schema(
///     "data/schema.yaml",
///     &format!("{}/generated.rs", std::env::var("OUT_DIR").unwrap()),
/// )
/// .unwrap();
/// ```
pub fn generate_from_schema(
    schema_path: &str,
    output_path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let schema_yaml = std::fs::read_to_string(Path::new(schema_path))?;
    let formatted = generate_from_schema_str(&schema_yaml)?;
    std::fs::write(output_path, formatted)?;
    Ok(())
}

/// Formatted wrapper source for a schema given as YAML text. The text is
/// embedded verbatim so generated code can rebuild its models at runtime.
pub fn generate_from_schema_str(
    schema_yaml: &str,
) -> Result<String, Box<dyn std::error::Error>> {
    let schema = docmodel::schema::parse_schema_str(schema_yaml)?;
    let tokens = generator::generate_all(&schema, schema_yaml)?;
    let formatted = generator::format_token_stream(&tokens);
    Ok(formatted)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SCHEMA: &str = r#"
models:
  post:
    fields:
      title: {}
      view_count: { type: number, default: 0 }
      rank: { type: integer }
      published: { type: boolean }
      status: { type: string, enum: [draft, published], default: draft }
      tags: { type: list }
      meta: { type: object }
    relationships:
      author: { kind: belongs_to, target: author }

  author:
    document_class: Writer
    fields:
      name: { type: string }
      born: { type: date }
"#;

    #[test]
    fn test_generate_from_schema_str_full() {
        let result = generate_from_schema_str(TEST_SCHEMA);
        assert!(result.is_ok(), "Generation failed: {:?}", result.err());

        let code = result.unwrap();

        // Verify it's valid Rust
        assert!(
            syn::parse_file(&code).is_ok(),
            "Generated code is not valid Rust:\n{}",
            &code[..code.len().min(2000)]
        );
        assert!(code.starts_with("// @generated"));

        // Wrapper structs
        assert!(code.contains("pub struct Post"), "Missing Post struct");
        assert!(code.contains("pub struct Writer"), "Missing Writer struct");
        assert!(!code.contains("pub struct Author"), "Explicit class name ignored");

        // Accessor pairs
        assert!(code.contains("fn title"), "Missing title getter");
        assert!(code.contains("fn set_title"), "Missing title setter");
        assert!(code.contains("fn view_count"), "Missing view_count getter");
        assert!(code.contains("fn set_born"), "Missing born setter");

        // Typed getters
        assert!(code.contains("Option<f64>"), "Missing f64 getter");
        assert!(code.contains("Option<i64>"), "Missing i64 getter");
        assert!(code.contains("Option<bool>"), "Missing bool getter");
        assert!(code.contains("Option<&str>"), "Missing str getter");
        assert!(code.contains("Option<&Vec<serde_json::Value>>"), "Missing list getter");

        // Constants and loader
        assert!(code.contains(r#"MODEL_NAME: &'static str = "post""#));
        assert!(code.contains("SCHEMA_YAML"), "Missing embedded schema");
        assert!(code.contains("fn build_models"), "Missing build_models");
    }

    #[test]
    fn test_generate_minimal_schema() {
        let schema = r#"
models:
  item:
    fields:
      name: { type: string }
"#;
        let result = generate_from_schema_str(schema);
        assert!(result.is_ok(), "Generation failed: {:?}", result.err());

        let code = result.unwrap();
        assert!(syn::parse_file(&code).is_ok(), "Not valid Rust");
        assert!(code.contains("pub struct Item"));
        assert!(code.contains(r#"FIELD_NAMES: &'static [&'static str] = &["name"]"#));
    }

    #[test]
    fn test_field_order_follows_schema() {
        let code = generate_from_schema_str(TEST_SCHEMA).unwrap();
        let title = code.find("pub fn title").unwrap();
        let view_count = code.find("pub fn view_count").unwrap();
        let meta = code.find("pub fn meta").unwrap();
        assert!(title < view_count && view_count < meta);
    }

    #[test]
    fn test_rust_keyword_field_names() {
        let schema = r#"
models:
  event:
    fields:
      type: { type: string }
      ref: { type: ref }
      self: {}
"#;
        let result = generate_from_schema_str(schema);
        assert!(result.is_ok(), "Generation failed: {:?}", result.err());

        let code = result.unwrap();
        assert!(syn::parse_file(&code).is_ok(), "Not valid Rust:\n{}", &code[..code.len().min(2000)]);
        assert!(code.contains("fn r#type"));
        assert!(code.contains("fn set_type"));
        assert!(code.contains("fn self_"));
    }

    #[test]
    fn test_field_name_without_identifier_is_an_error() {
        let schema = r#"
models:
  account:
    fields:
      2fa: { type: boolean }
"#;
        let err = generate_from_schema_str(schema).unwrap_err().to_string();
        assert!(err.contains("'2fa'"), "{err}");
    }

    #[test]
    fn test_colliding_field_names_are_an_error() {
        let schema = r#"
models:
  post:
    fields:
      viewCount: { type: number }
      view_count: { type: number }
"#;
        let err = generate_from_schema_str(schema).unwrap_err().to_string();
        assert!(err.contains("view_count"), "{err}");
        assert!(err.contains("'viewCount'"), "{err}");
    }

    #[test]
    fn test_field_shadowing_wrapper_method_is_an_error() {
        let schema = r#"
models:
  note:
    fields:
      document: {}
"#;
        let err = generate_from_schema_str(schema).unwrap_err().to_string();
        assert!(err.contains("the wrapper"), "{err}");
    }

    #[test]
    fn test_models_sharing_a_struct_name_are_an_error() {
        let schema = r#"
models:
  author:
    document_class: Person
  editor:
    document_class: Person
"#;
        let err = generate_from_schema_str(schema).unwrap_err().to_string();
        assert!(err.contains("Person"), "{err}");
    }

    #[test]
    fn test_invalid_schema() {
        assert!(generate_from_schema_str("models: [1, 2]").is_err());
    }

    #[test]
    fn test_generate_from_schema_file() {
        let dir = tempfile::tempdir().unwrap();
        let schema_path = dir.path().join("schema.yaml");
        let output_path = dir.path().join("generated.rs");
        std::fs::write(&schema_path, TEST_SCHEMA).unwrap();

        generate_from_schema(schema_path.to_str().unwrap(), output_path.to_str().unwrap()).unwrap();
        let code = std::fs::read_to_string(&output_path).unwrap();
        assert!(code.contains("pub struct Post"));
    }
}
