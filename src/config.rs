//! Project configuration: the document-level values no resource declares.
//!
//! ```yaml
//! info:
//!   title: Swagger Petstore
//!   version: 1.0.5
//! host: petstore.swagger.io
//! base_path: /v2
//! schemes: [https, http]
//! produces: [application/json]
//! ```

use crate::document::{Info, SpecificationDocument};
use crate::error::Result;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up at the project root when no config is given
pub const CONFIG_FILE_NAME: &str = "swagger-from-resources.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub info: InfoConfig,
    pub host: Option<String>,
    pub base_path: Option<String>,
    pub schemes: Vec<String>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfoConfig {
    pub title: String,
    pub version: String,
    pub description: Option<String>,
}

impl Default for InfoConfig {
    fn default() -> Self {
        let info = Info::default();
        Self {
            title: info.title,
            version: info.version,
            description: info.description,
        }
    }
}

impl GeneratorConfig {
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading config: {}", path.display());
        let content = fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Loads `explicit` when given, else the project's config file when it
    /// exists, else the defaults.
    pub fn discover(project_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let default_path = Self::default_path(project_root);
        if default_path.is_file() {
            info!("Using config {}", default_path.display());
            return Self::load(&default_path);
        }
        debug!("No config file, using defaults");
        Ok(Self::default())
    }

    pub fn default_path(project_root: &Path) -> PathBuf {
        project_root.join(CONFIG_FILE_NAME)
    }

    /// An empty document carrying the configured document-level values.
    pub fn to_document(&self) -> SpecificationDocument {
        let mut document = SpecificationDocument::new(Info {
            title: self.info.title.clone(),
            version: self.info.version.clone(),
            description: self.info.description.clone(),
        });
        document.host = self.host.clone();
        document.base_path = self.base_path.clone();
        document.schemes = self.schemes.clone();
        document.consumes = self.consumes.clone();
        document.produces = self.produces.clone();
        document
    }
}
