use docmodel::schema::{ModelDefinition, SchemaDefinition};
use proc_macro2::TokenStream;
use quote::quote;
use std::collections::HashMap;

use crate::type_utils::{
    getter_conversion, getter_type, model_struct_name, parse_ident, safe_field_ident,
    setter_ident, value_shape,
};

/// Methods every wrapper defines besides the field accessors.
const WRAPPER_METHODS: &[&str] = &["wrap", "document", "into_document"];

/// Generate one document wrapper struct per model, in schema order.
/// Fails if a model or field name has no usable Rust identifier, or if two
/// names end up with the same one.
pub fn generate_models(schema: &SchemaDefinition) -> Result<TokenStream, String> {
    let mut tokens = TokenStream::new();
    let mut structs: HashMap<String, &str> = HashMap::new();
    for (model_name, model_def) in schema.models.iter() {
        let struct_name = model_struct_name(model_name, model_def);
        if let Some(previous) = structs.insert(struct_name.clone(), model_name) {
            return Err(format!(
                "Models '{previous}' and '{model_name}' both generate struct {struct_name}"
            ));
        }
        tokens.extend(generate_model_struct(model_name, &struct_name, model_def)?);
    }
    Ok(tokens)
}

/// Generate the wrapper struct and its accessors for a single model.
fn generate_model_struct(
    model_name: &str,
    struct_name: &str,
    model_def: &ModelDefinition,
) -> Result<TokenStream, String> {
    let struct_ident = parse_ident(struct_name, &format!("Model '{model_name}'"))?;
    let doc_comment = format!(" Typed accessors for documents of the `{model_name}` model.");
    let field_names: Vec<&str> = model_def.fields.keys().collect();

    let mut methods: HashMap<String, String> = WRAPPER_METHODS
        .iter()
        .map(|method| (method.to_string(), "the wrapper".to_string()))
        .collect();
    let mut accessors = Vec::with_capacity(model_def.fields.len());
    for (field_name, field_def) in model_def.fields.iter() {
        let getter = safe_field_ident(field_name)?;
        let setter = setter_ident(field_name)?;
        for method in [&getter, &setter] {
            let method = method.to_string();
            if let Some(previous) = methods.insert(method.clone(), format!("field '{field_name}'")) {
                return Err(format!(
                    "Field '{field_name}' of model '{model_name}' generates method {method}, \
                     already defined by {previous}"
                ));
            }
        }

        let shape = value_shape(field_def);
        let return_type = getter_type(shape);
        let conversion = getter_conversion(shape);
        accessors.push(quote! {
            pub fn #getter(&self) -> #return_type {
                self.doc.get(#field_name) #conversion
            }

            pub fn #setter(
                &mut self,
                value: impl Into<serde_json::Value>,
            ) -> docmodel::Result<&mut Self> {
                self.doc.set(#field_name, value)?;
                Ok(self)
            }
        });
    }

    Ok(quote! {
        #[doc = #doc_comment]
        #[derive(Debug, Clone)]
        pub struct #struct_ident {
            doc: docmodel::Document,
        }

        impl #struct_ident {
            pub const MODEL_NAME: &'static str = #model_name;
            pub const FIELD_NAMES: &'static [&'static str] = &[#(#field_names),*];

            pub fn wrap(doc: docmodel::Document) -> Self {
                Self { doc }
            }

            pub fn document(&self) -> &docmodel::Document {
                &self.doc
            }

            pub fn into_document(self) -> docmodel::Document {
                self.doc
            }

            #(#accessors)*
        }
    })
}

/// Generate the embedded schema and a `build_models` function that
/// declares every model from it.
pub fn generate_schema_loader(schema_yaml: &str) -> TokenStream {
    quote! {
        /// Schema the wrappers in this file were generated from.
        pub const SCHEMA_YAML: &str = #schema_yaml;

        /// Declare every model of the embedded schema in `classes`.
        pub fn build_models(
            classes: &std::sync::Arc<docmodel::ClassRegistry>,
        ) -> docmodel::Result<Vec<docmodel::Model>> {
            let schema = docmodel::schema::parse_schema_str(SCHEMA_YAML)?;
            schema.build_models(
                classes,
                &std::sync::Arc::new(docmodel::RelationshipKinds::builtin()),
            )
        }
    }
}
