//! Normalizes raw annotation metadata into document values.
//!
//! Every function here looks at one metadata record at a time and keeps no
//! state between calls.

use crate::descriptor::{ApiMeta, AuthorizationMeta, ExtensionMeta, MethodDescriptor, OperationMeta, ResponseHeaderMeta};
use crate::document::{SecurityRequirement, Tag};
use crate::error::Result;
use crate::model_registry::ModelRegistry;
use crate::schema::{with_container, ContainerKind, Schema};
use crate::type_ref::TypeRef;
use indexmap::IndexMap;
use log::debug;
use serde_json::{Map, Value};

/// One requirement per named authorization, carrying its non-empty scopes.
pub fn security_requirements(authorizations: &[AuthorizationMeta]) -> Vec<SecurityRequirement> {
    authorizations
        .iter()
        .filter(|auth| !auth.value.is_empty())
        .map(|auth| {
            let scopes = auth
                .scopes
                .iter()
                .filter(|scope| !scope.is_empty())
                .cloned()
                .collect();
            let mut requirement = SecurityRequirement::new();
            requirement.insert(auth.value.clone(), scopes);
            requirement
        })
        .collect()
}

/// Tags of a resource.
///
/// Explicit non-empty tags win. Without them a single tag is derived from the
/// API value with every `/` removed, carrying the API description.
pub fn extract_tags(api: &ApiMeta) -> Vec<Tag> {
    let mut tags: Vec<Tag> = Vec::new();
    for name in api.tags.iter().filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| &t.name == name) {
            tags.push(Tag::new(name.as_str()));
        }
    }
    if !tags.is_empty() {
        return tags;
    }

    let derived = api.value.replace('/', "");
    if !derived.is_empty() {
        tags.push(Tag::new(derived).with_description(&api.description));
    }
    tags
}

/// Header schemas by header name, each wrapped in the header's own
/// container. Returns `None` rather than an empty map when no header
/// qualifies.
pub fn response_headers(
    headers: &[ResponseHeaderMeta],
    registry: &dyn ModelRegistry,
) -> Result<Option<IndexMap<String, Schema>>> {
    let mut schemas = IndexMap::new();
    for header in headers {
        if header.name.is_empty() {
            continue;
        }
        let Some(ty) = header.response.as_ref().filter(|ty| !ty.is_void()) else {
            continue;
        };
        if let Some(schema) = registry.read_as_property(ty)? {
            let container = ContainerKind::parse(&header.response_container);
            let schema = with_container(container, schema).with_description(&header.description);
            schemas.insert(header.name.clone(), schema);
        }
    }
    Ok((!schemas.is_empty()).then_some(schemas))
}

/// Extension maps, one per extension.
///
/// A named extension becomes a map holding a single entry, the extension
/// name mapped to its properties. An unnamed extension contributes its
/// properties at top level. Properties without a name are dropped and equal
/// maps are kept once. Keys are not prefixed here; see [`vendor_key`].
pub fn custom_extensions(extensions: &[ExtensionMeta]) -> Vec<IndexMap<String, Value>> {
    let mut result: Vec<IndexMap<String, Value>> = Vec::new();
    for extension in extensions {
        let properties: Map<String, Value> = extension
            .properties
            .iter()
            .filter(|p| !p.name.is_empty())
            .map(|p| (p.name.clone(), Value::String(p.value.clone())))
            .collect();

        let entry: IndexMap<String, Value> = if extension.name.is_empty() {
            properties.into_iter().collect()
        } else {
            IndexMap::from([(extension.name.clone(), Value::Object(properties))])
        };

        if !result.contains(&entry) {
            result.push(entry);
        }
    }
    result
}

/// Vendor extension key: `key` with an `x-` prefix unless it has one.
pub fn vendor_key(key: &str) -> String {
    if key.starts_with("x-") {
        key.to_string()
    } else {
        format!("x-{}", key)
    }
}

/// Response type of a method.
///
/// A declared non-void operation response wins. Otherwise the method's return
/// type is used, and a void return type stays void.
pub fn response_type<'a>(method: &'a MethodDescriptor, operation: Option<&'a OperationMeta>) -> &'a TypeRef {
    match operation.and_then(|op| op.response.as_ref()).filter(|ty| !ty.is_void()) {
        Some(declared) => declared,
        None => {
            debug!("Picking up response type from method {}", method.name);
            &method.return_type
        }
    }
}

/// Declared response container; an empty or unrecognized value is none.
pub fn response_container(operation: Option<&OperationMeta>) -> Option<ContainerKind> {
    operation.and_then(|op| ContainerKind::parse(&op.response_container))
}

/// Explicit nickname when non-empty, else the method name.
pub fn operation_id(method: &MethodDescriptor, operation: Option<&OperationMeta>) -> String {
    operation
        .map(|op| op.nickname.trim())
        .filter(|nickname| !nickname.is_empty())
        .unwrap_or(method.name.as_str())
        .to_string()
}

/// Schemes from a comma-separated protocol list
pub fn protocols(operation: &OperationMeta) -> Vec<String> {
    operation
        .protocols
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}
