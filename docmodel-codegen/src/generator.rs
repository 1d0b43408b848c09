use docmodel::schema::SchemaDefinition;
use proc_macro2::TokenStream;

use crate::model_gen::{generate_models, generate_schema_loader};

const HEADER: &str = "// @generated by docmodel-codegen. Do not edit by hand.\n\n";

/// Generate the complete output file for a schema.
pub fn generate_all(schema: &SchemaDefinition, schema_yaml: &str) -> Result<TokenStream, String> {
    let mut tokens = generate_models(schema)?;
    tokens.extend(generate_schema_loader(schema_yaml));
    Ok(tokens)
}

/// Pretty-print generated tokens. Falls back to the raw token string if
/// they do not parse as a file.
pub fn format_token_stream(tokens: &TokenStream) -> String {
    let body = match syn::parse2::<syn::File>(tokens.clone()) {
        Ok(file) => prettyplease::unparse(&file),
        Err(_) => tokens.to_string(),
    };
    format!("{HEADER}{body}")
}
