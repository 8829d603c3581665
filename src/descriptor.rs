//! Resource descriptors: the routing and documentation metadata the reader
//! compiles into a specification document.
//!
//! A descriptor mirrors what reflection would expose for an annotated
//! resource class: class-level metadata, and for every method its own
//! annotations, its parameter types with their per-parameter annotations, and
//! the annotations of the declarations it overrides. Descriptors are plain
//! data and can be loaded from YAML or JSON bundles (see [`DescriptorBundle`]).
//!
//! # Example
//!
//! ```yaml
//! resources:
//!   - name: PetResource
//!     api: { value: /pet, description: Everything about your pets }
//!     path: /pet
//!     produces: [application/json]
//!     methods:
//!       - name: getPetById
//!         verb: get
//!         path: "/{petId}"
//!         operation: { value: Find pet by ID }
//!         return_type: Pet
//!         parameters:
//!           - type: i64
//!             annotations: [{ kind: path, name: petId }]
//! ```

use crate::type_ref::TypeRef;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// HTTP methods an operation can be registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Options,
    Head,
    Patch,
}

impl HttpMethod {
    /// Case-insensitive; returns `None` for verbs a Swagger 2.0 path item
    /// cannot hold.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "get" => Some(HttpMethod::Get),
            "put" => Some(HttpMethod::Put),
            "post" => Some(HttpMethod::Post),
            "delete" => Some(HttpMethod::Delete),
            "options" => Some(HttpMethod::Options),
            "head" => Some(HttpMethod::Head),
            "patch" => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Put => "put",
            HttpMethod::Post => "post",
            HttpMethod::Delete => "delete",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Patch => "patch",
        }
    }
}

/// A resource class: class-level metadata plus its methods.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceDescriptor {
    pub name: String,
    /// Resource-level API metadata. A class without it is not a resource.
    pub api: Option<ApiMeta>,
    /// Class-level path
    pub path: Option<String>,
    /// Class-level consumed media types
    pub consumes: Vec<String>,
    /// Class-level produced media types
    pub produces: Vec<String>,
    pub methods: Vec<MethodDescriptor>,
}

/// Resource-level API metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiMeta {
    /// Path-like value; a tag is derived from it when no explicit tags exist
    pub value: String,
    pub description: String,
    pub tags: Vec<String>,
    pub hidden: bool,
    pub authorizations: Vec<AuthorizationMeta>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationMeta {
    /// Security scheme name
    pub value: String,
    pub scopes: Vec<String>,
}

/// One method of a resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default = "TypeRef::void")]
    pub return_type: TypeRef,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Annotations declared on this method itself
    #[serde(flatten)]
    pub annotations: MethodAnnotations,
    /// Declarations this method overrides, base first (interface, then
    /// abstract class, ...), nearest last.
    #[serde(default)]
    pub overridden: Vec<OverriddenMethod>,
}

impl MethodDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: TypeRef::void(),
            parameters: Vec::new(),
            annotations: MethodAnnotations::default(),
            overridden: Vec::new(),
        }
    }
}

/// Method-level annotations, as found on one declaration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MethodAnnotations {
    /// Operation documentation; methods without it are never documented
    pub operation: Option<OperationMeta>,
    pub path: Option<String>,
    /// Standard verb marker
    pub verb: Option<HttpMethod>,
    /// Other annotations on the method, possibly meta-annotated with a verb
    pub custom_annotations: Vec<CustomAnnotation>,
    pub consumes: Option<Vec<String>>,
    pub produces: Option<Vec<String>>,
    /// Explicit per-status-code responses
    pub responses: Option<Vec<ResponseMeta>>,
    pub implicit_params: Option<Vec<ImplicitParamMeta>>,
    pub deprecated: bool,
}

/// An overridden declaration: its method annotations and the annotations of
/// each of its parameters, by position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverriddenMethod {
    #[serde(flatten)]
    pub annotations: MethodAnnotations,
    pub parameter_annotations: Vec<Vec<ParamAnnotation>>,
}

/// An annotation that is not part of the documentation vocabulary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomAnnotation {
    pub name: String,
    /// Verb named by a meta-annotation on the annotation type, if any
    pub http_method: Option<String>,
}

/// Operation documentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OperationMeta {
    /// Summary
    pub value: String,
    /// Description
    pub notes: String,
    /// Explicit operation id
    pub nickname: String,
    pub tags: Vec<String>,
    /// Verb override
    pub http_method: String,
    /// Declared response type; `None` or void means "use the return type"
    pub response: Option<TypeRef>,
    pub response_container: String,
    /// Status code of the primary response
    pub code: u16,
    pub response_headers: Vec<ResponseHeaderMeta>,
    pub authorizations: Vec<AuthorizationMeta>,
    pub extensions: Vec<ExtensionMeta>,
    /// Comma-separated schemes
    pub protocols: String,
    pub hidden: bool,
}

impl Default for OperationMeta {
    fn default() -> Self {
        Self {
            value: String::new(),
            notes: String::new(),
            nickname: String::new(),
            tags: Vec::new(),
            http_method: String::new(),
            response: None,
            response_container: String::new(),
            code: 200,
            response_headers: Vec::new(),
            authorizations: Vec::new(),
            extensions: Vec::new(),
            protocols: String::new(),
            hidden: false,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseHeaderMeta {
    pub name: String,
    pub description: String,
    pub response: Option<TypeRef>,
    pub response_container: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionMeta {
    /// Empty for an unnamed extension, whose properties land at top level
    pub name: String,
    pub properties: Vec<ExtensionProperty>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionProperty {
    pub name: String,
    pub value: String,
}

/// An explicit response for one status code. Code `0` is the default response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseMeta {
    pub code: u16,
    pub message: String,
    pub response: Option<TypeRef>,
    pub response_container: String,
    pub response_headers: Vec<ResponseHeaderMeta>,
}

/// A parameter documented on the method rather than on a method parameter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImplicitParamMeta {
    pub name: String,
    pub value: String,
    pub required: bool,
    pub data_type: String,
    /// path, query, header, form or body
    pub param_type: String,
    pub default_value: String,
    /// Comma-separated
    pub allowable_values: String,
    pub allow_multiple: bool,
    pub format: String,
}

/// A declared method parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub annotations: Vec<ParamAnnotation>,
}

/// Per-parameter annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParamAnnotation {
    Path { name: String },
    Query { name: String },
    Header { name: String },
    Form { name: String },
    Cookie { name: String },
    /// Parameter bag expanded into one parameter per annotated field
    Bean,
    /// Injected by the runtime; never documented
    Context,
    DefaultValue { value: String },
    Api(ApiParamMeta),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiParamMeta {
    pub name: String,
    /// Description
    pub value: String,
    pub required: bool,
    pub hidden: bool,
    /// Overrides the declared type
    #[serde(rename = "type")]
    pub data_type: String,
    pub format: String,
    pub collection_format: String,
    /// Comma-separated
    pub allowable_values: String,
    pub default_value: String,
}

/// A parameter bag type.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BeanDescriptor {
    pub name: String,
    pub fields: Vec<BeanField>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeanField {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub annotations: Vec<ParamAnnotation>,
}

/// A globally declared tag with its description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TagDefinition {
    pub name: String,
    pub description: String,
}

/// The on-disk form of a set of descriptors.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DescriptorBundle {
    /// Resources read at top level
    pub resources: Vec<ResourceDescriptor>,
    /// Resources only reachable as sub-resources
    pub sub_resources: Vec<ResourceDescriptor>,
    pub beans: Vec<BeanDescriptor>,
    pub tags: Vec<TagDefinition>,
}

/// Every descriptor known to one read pass.
#[derive(Debug, Clone, Default)]
pub struct ResourceSet {
    roots: Vec<String>,
    resources: IndexMap<String, ResourceDescriptor>,
    beans: IndexMap<String, BeanDescriptor>,
    tag_definitions: Vec<TagDefinition>,
}

impl ResourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a resource that is read at top level.
    pub fn register(&mut self, resource: ResourceDescriptor) -> &mut Self {
        debug!("Registering resource: {}", resource.name);
        if !self.roots.contains(&resource.name) {
            self.roots.push(resource.name.clone());
        }
        self.resources.insert(resource.name.clone(), resource);
        self
    }

    /// Registers a resource that is only read when another resource returns it.
    pub fn register_sub_resource(&mut self, resource: ResourceDescriptor) -> &mut Self {
        debug!("Registering sub-resource: {}", resource.name);
        self.resources.insert(resource.name.clone(), resource);
        self
    }

    pub fn register_bean(&mut self, bean: BeanDescriptor) -> &mut Self {
        self.beans.insert(bean.name.clone(), bean);
        self
    }

    /// Pre-declares a global tag definition used to backfill tag descriptions.
    pub fn declare_tag(&mut self, tag: TagDefinition) -> &mut Self {
        self.tag_definitions.push(tag);
        self
    }

    pub fn add_bundle(&mut self, bundle: DescriptorBundle) -> &mut Self {
        for resource in bundle.resources {
            self.register(resource);
        }
        for resource in bundle.sub_resources {
            self.register_sub_resource(resource);
        }
        for bean in bundle.beans {
            self.register_bean(bean);
        }
        for tag in bundle.tags {
            self.declare_tag(tag);
        }
        self
    }

    /// Top-level resources in registration order
    pub fn roots(&self) -> impl Iterator<Item = &ResourceDescriptor> {
        self.roots.iter().filter_map(|name| self.resources.get(name))
    }

    pub fn resource(&self, name: &str) -> Option<&ResourceDescriptor> {
        self.resources.get(name)
    }

    /// The resource a type denotes, if that type carries resource-level
    /// metadata.
    pub fn routable_resource(&self, ty: &TypeRef) -> Option<&ResourceDescriptor> {
        self.resources
            .get(&ty.unwrapped().name)
            .filter(|resource| resource.api.is_some())
    }

    pub fn bean(&self, ty: &TypeRef) -> Option<&BeanDescriptor> {
        self.beans.get(&ty.unwrapped().name)
    }

    pub fn tag_definitions(&self) -> &[TagDefinition] {
        &self.tag_definitions
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}
