use super::types::SchemaDefinition;
use crate::error::Result;
use std::path::Path;

/// Load the model schema stored at `path`.
pub fn parse_schema(path: &Path) -> Result<SchemaDefinition> {
    let yaml = std::fs::read_to_string(path)?;
    let schema = parse_schema_str(&yaml)?;
    log::debug!("Loaded {} models from {}", schema.models.len(), path.display());
    Ok(schema)
}

/// Parse schema YAML. A blank document is an empty schema.
pub fn parse_schema_str(yaml: &str) -> Result<SchemaDefinition> {
    if yaml.trim().is_empty() {
        return Ok(SchemaDefinition::default());
    }
    Ok(serde_yaml::from_str(yaml)?)
}
