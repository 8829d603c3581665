//! The specification document: the shared aggregate every read pass folds
//! its results into.
//!
//! The document only grows. Operations are keyed by (path, method) and a
//! re-registration replaces the previous operation for that pair. Models are
//! keyed by name and the first registration wins. Tags are keyed by name; a
//! later write can only fill in a missing description.

use crate::descriptor::{HttpMethod, TagDefinition};
use crate::schema::Schema;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Security requirement: scheme name to required scopes
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// Complete Swagger 2.0 document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpecificationDocument {
    /// Swagger version
    pub swagger: String,
    /// API info
    pub info: Info,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(rename = "basePath", skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub consumes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub produces: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// API paths
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    /// Model definitions
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: IndexMap<String, Schema>,
}

/// Swagger Info object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Default for Info {
    fn default() -> Self {
        Self {
            title: "Generated API".to_string(),
            version: "1.0.0".to_string(),
            description: None,
        }
    }
}

/// Tag with an optional description; identity is the name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        if !description.is_empty() {
            self.description = Some(description.to_string());
        }
        self
    }
}

/// PathItem object - all operations for a single path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
}

impl PathItem {
    fn slot(&mut self, method: HttpMethod) -> &mut Option<Operation> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
        }
    }

    pub fn set(&mut self, method: HttpMethod, operation: Operation) {
        *self.slot(method) = Some(operation);
    }

    pub fn get(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
        }
    }

    /// Registered operations with their methods
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &Operation)> {
        [
            HttpMethod::Get,
            HttpMethod::Put,
            HttpMethod::Post,
            HttpMethod::Delete,
            HttpMethod::Options,
            HttpMethod::Head,
            HttpMethod::Patch,
        ]
        .into_iter()
        .filter_map(move |method| self.get(method).map(|op| (method, op)))
    }
}

/// Operation object - a single documented, routable method
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schemes: Vec<String>,
    /// `None` until the operation declares or inherits media types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produces: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<Parameter>,
    /// Responses by status code, or "default"
    #[serde(default)]
    pub responses: IndexMap<String, Response>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Vendor extensions, all keys prefixed with `x-`
    #[serde(flatten)]
    pub vendor_extensions: IndexMap<String, Value>,
}

impl Operation {
    pub fn add_tag(&mut self, tag: &str) {
        if !self.tags.iter().any(|t| t == tag) {
            self.tags.push(tag.to_string());
        }
    }

    pub fn add_security(&mut self, requirement: SecurityRequirement) {
        if !self.security.contains(&requirement) {
            self.security.push(requirement);
        }
    }

    /// Adds a parameter unless one with the same name and location exists.
    pub fn add_parameter(&mut self, parameter: Parameter) {
        let exists = self
            .parameters
            .iter()
            .any(|p| p.name == parameter.name && p.location == parameter.location);
        if !exists {
            self.parameters.push(parameter);
        }
    }
}

/// Where a parameter travels in the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterLocation {
    Path,
    Query,
    Header,
    Body,
    #[serde(rename = "formData")]
    Form,
    Cookie,
}

impl ParameterLocation {
    /// Parses an implicit parameter's `param_type`
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "path" => Some(ParameterLocation::Path),
            "query" => Some(ParameterLocation::Query),
            "header" => Some(ParameterLocation::Header),
            "body" => Some(ParameterLocation::Body),
            "form" | "formdata" => Some(ParameterLocation::Form),
            "cookie" => Some(ParameterLocation::Cookie),
            _ => None,
        }
    }
}

/// Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    /// Schema of a body parameter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Schema>,
    #[serde(rename = "collectionFormat", skip_serializing_if = "Option::is_none")]
    pub collection_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, location: ParameterLocation) -> Self {
        Self {
            name: name.into(),
            location,
            description: None,
            required: location == ParameterLocation::Path,
            schema: None,
            param_type: None,
            format: None,
            items: None,
            collection_format: None,
            default: None,
            enum_values: None,
            pattern: None,
        }
    }
}

/// Response object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<IndexMap<String, Schema>>,
}

impl Default for SpecificationDocument {
    fn default() -> Self {
        Self::new(Info::default())
    }
}

impl SpecificationDocument {
    pub fn new(info: Info) -> Self {
        debug!("Initializing SpecificationDocument");
        Self {
            swagger: "2.0".to_string(),
            info,
            host: None,
            base_path: None,
            schemes: Vec::new(),
            consumes: Vec::new(),
            produces: Vec::new(),
            tags: Vec::new(),
            paths: IndexMap::new(),
            definitions: IndexMap::new(),
        }
    }

    /// Registers `operation` under (path, method), replacing any previous
    /// operation for that pair.
    pub fn register_operation(&mut self, path: &str, method: HttpMethod, operation: Operation) {
        debug!("Registering operation: {} {}", method.as_str(), path);
        self.paths.entry(path.to_string()).or_default().set(method, operation);
    }

    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Operation> {
        self.paths.get(path).and_then(|item| item.get(method))
    }

    /// Registers a model unless one with the same name exists.
    pub fn register_model(&mut self, name: &str, model: Schema) {
        if self.definitions.contains_key(name) {
            debug!("Model {} already registered", name);
            return;
        }
        self.definitions.insert(name.to_string(), model);
    }

    /// Declares a tag. An existing tag only takes the description if it has
    /// none.
    pub fn add_tag(&mut self, tag: Tag) {
        match self.tags.iter_mut().find(|t| t.name == tag.name) {
            Some(existing) => {
                if existing.description.is_none() {
                    existing.description = tag.description;
                }
            }
            None => self.tags.push(tag),
        }
    }

    pub fn tag(&self, name: &str) -> Option<&Tag> {
        self.tags.iter().find(|t| t.name == name)
    }

    /// Fills in missing descriptions of already declared tags from global tag
    /// definitions. Definitions for undeclared tags are ignored.
    pub fn backfill_tag_descriptions(&mut self, definitions: &[TagDefinition]) {
        for definition in definitions {
            if definition.name.is_empty() || definition.description.is_empty() {
                continue;
            }
            if let Some(tag) = self.tags.iter_mut().find(|t| t.name == definition.name) {
                if tag.description.is_none() {
                    debug!("Backfilling description of tag {}", tag.name);
                    tag.description = Some(definition.description.clone());
                }
            }
        }
    }
}
