//! Swagger 2.0 schemas and container wrapping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Prefix of every model reference in a Swagger 2.0 document
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Swagger 2.0 schema, used both for model definitions and for inline
/// response, header and parameter schemas.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to a model definition
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    #[serde(rename = "uniqueItems", default, skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
    /// Value schema for map types
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Box<Schema>>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Schema>>,
    /// Required property names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    /// Enum values for enum types
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl Schema {
    pub fn primitive(schema_type: &str, format: Option<&str>) -> Self {
        Schema {
            schema_type: Some(schema_type.to_string()),
            format: format.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn object() -> Self {
        Self::primitive("object", None)
    }

    /// `$ref` to a model definition by name
    pub fn reference(model_name: &str) -> Self {
        Schema {
            reference: Some(format!("{}{}", DEFINITIONS_PREFIX, model_name)),
            ..Default::default()
        }
    }

    pub fn array(items: Schema) -> Self {
        Schema {
            schema_type: Some("array".to_string()),
            items: Some(Box::new(items)),
            ..Default::default()
        }
    }

    pub fn map(values: Schema) -> Self {
        Schema {
            schema_type: Some("object".to_string()),
            additional_properties: Some(Box::new(values)),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        if !description.is_empty() {
            self.description = Some(description.to_string());
        }
        self
    }

    /// Whether the schema describes a scalar-like value (including arrays),
    /// as opposed to an object model or a reference.
    pub fn is_scalar_like(&self) -> bool {
        matches!(
            self.schema_type.as_deref(),
            Some("integer" | "string" | "number" | "boolean" | "array" | "file")
        )
    }
}

/// Container wrapped around a response, header or parameter schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    List,
    Set,
    Map,
}

impl ContainerKind {
    /// Case-insensitive; anything unrecognized (including "") is no container.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "list" | "array" => Some(ContainerKind::List),
            "set" => Some(ContainerKind::Set),
            "map" => Some(ContainerKind::Map),
            _ => None,
        }
    }

    pub fn wrap(self, schema: Schema) -> Schema {
        match self {
            ContainerKind::List => Schema::array(schema),
            ContainerKind::Set => Schema {
                unique_items: true,
                ..Schema::array(schema)
            },
            ContainerKind::Map => Schema::map(schema),
        }
    }
}

/// Wraps `schema` into the given container, or returns it unchanged.
pub fn with_container(container: Option<ContainerKind>, schema: Schema) -> Schema {
    match container {
        Some(kind) => kind.wrap(schema),
        None => schema,
    }
}
