//! Serialization of specification documents to YAML or JSON.

use crate::document::SpecificationDocument;
use anyhow::{Context, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Serializes a specification document to YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_yaml(doc: &SpecificationDocument) -> Result<String> {
    debug!("Serializing specification document to YAML");
    serde_yaml::to_string(doc).context("Failed to serialize specification document to YAML")
}

/// Serializes a specification document to pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_json(doc: &SpecificationDocument) -> Result<String> {
    debug!("Serializing specification document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize specification document to JSON")
}

/// Writes string content to a file, creating parent directories and
/// overwriting any existing file.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
