use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocModelError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Type constraint violated on field '{field}': {message}")]
    TypeConstraint { field: String, message: String },

    #[error("Unknown relationship kind: no implementation registered as '{class_name}'")]
    UnknownRelationshipKind { class_name: String },

    #[error("A connection is required to create a collection")]
    MissingConnection,

    #[error("Field '{field}' is not declared on document class '{class}'")]
    UnknownField { class: String, field: String },

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, DocModelError>;
