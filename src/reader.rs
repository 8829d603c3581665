//! Reads resources into a specification document.
//!
//! The reader walks every root resource. For each documented method it
//! composes the path, builds the operation, descends into the sub-resource
//! the method returns (if any), then merges the operation into the document.
//! Context flows down the recursion as a fresh [`CompositionContext`] per
//! level; results are folded into the one document the reader owns.

use crate::annotations;
use crate::descriptor::{ApiMeta, HttpMethod, ResourceDescriptor, ResourceSet};
use crate::document::{Operation, Parameter, SecurityRequirement, SpecificationDocument, Tag};
use crate::error::Result;
use crate::model_registry::ModelRegistry;
use crate::operation_builder::OperationBuilder;
use crate::parameter_extractor::apply_path_patterns;
use crate::path_composer;
use crate::verb::{VerbChain, VerbResolver};
use indexmap::IndexMap;
use log::{debug, info, warn};

/// What a resource inherits from the method that returned it
#[derive(Debug, Clone, Default)]
pub struct CompositionContext {
    /// Composed path of the parent operation, empty at top level
    pub path: String,
    /// Verb used by methods that declare none
    pub method: Option<HttpMethod>,
    pub consumes: Vec<String>,
    pub produces: Vec<String>,
    /// Tags by name
    pub tags: IndexMap<String, Tag>,
    pub parameters: Vec<Parameter>,
    /// Sub-resources are read even when hidden or undocumented
    pub read_hidden: bool,
}

impl CompositionContext {
    /// Context of a sub-resource returned by an operation at `path`.
    fn descend(
        path: &str,
        method: Option<HttpMethod>,
        consumes: Vec<String>,
        produces: Vec<String>,
        tags: IndexMap<String, Tag>,
        operation: &Operation,
    ) -> Self {
        Self {
            path: path.to_string(),
            method,
            consumes,
            produces,
            tags,
            parameters: operation.parameters.clone(),
            read_hidden: true,
        }
    }
}

pub struct Reader<'a> {
    document: SpecificationDocument,
    registry: &'a dyn ModelRegistry,
    verbs: VerbChain,
}

impl<'a> Reader<'a> {
    pub fn new(document: SpecificationDocument, registry: &'a dyn ModelRegistry) -> Self {
        Self {
            document,
            registry,
            verbs: VerbChain::default(),
        }
    }

    /// Appends a verb resolver after the built-in ones.
    pub fn with_verb_resolver(mut self, resolver: impl VerbResolver + 'static) -> Self {
        self.verbs = self.verbs.with_resolver(resolver);
        self
    }

    /// Replaces the whole verb chain, built-in resolvers included.
    pub fn with_verb_chain(mut self, verbs: VerbChain) -> Self {
        self.verbs = verbs;
        self
    }

    pub fn document(&self) -> &SpecificationDocument {
        &self.document
    }

    pub fn into_document(self) -> SpecificationDocument {
        self.document
    }

    /// Reads every root resource of `resources`.
    ///
    /// # Errors
    ///
    /// Fails on the first type that cannot be resolved. The document keeps
    /// everything registered before the failure.
    pub fn read(&mut self, resources: &ResourceSet) -> Result<&SpecificationDocument> {
        info!("Reading {} resources", resources.len());
        for resource in resources.roots() {
            self.read_resource(resources, resource)?;
        }
        Ok(&self.document)
    }

    /// Reads one top-level resource.
    pub fn read_resource(&mut self, resources: &ResourceSet, resource: &ResourceDescriptor) -> Result<()> {
        self.read_class(resources, resource, &CompositionContext::default(), &mut Vec::new())
    }

    fn read_class(
        &mut self,
        resources: &ResourceSet,
        resource: &ResourceDescriptor,
        context: &CompositionContext,
        stack: &mut Vec<String>,
    ) -> Result<()> {
        if !can_read(resource.api.as_ref(), context.read_hidden) {
            debug!("Skipping resource {}", resource.name);
            return Ok(());
        }
        if stack.contains(&resource.name) {
            warn!(
                "Sub-resource cycle {} -> {}, not descending",
                stack.join(" -> "),
                resource.name
            );
            return Ok(());
        }
        debug!("Reading resource {} at '{}'", resource.name, context.path);
        stack.push(resource.name.clone());

        let tags = self.class_tags(&context.tags, resource.api.as_ref());
        let securities = resource
            .api
            .as_ref()
            .map(|api| annotations::security_requirements(&api.authorizations))
            .unwrap_or_default();
        let builder = OperationBuilder::new(self.registry, resources);

        for method in &resource.methods {
            let Some(meta) = method.operation_meta() else {
                debug!("Skipping undocumented method {}.{}", resource.name, method.name);
                continue;
            };
            if meta.hidden {
                debug!("Skipping hidden method {}.{}", resource.name, method.name);
                continue;
            }

            let composed = path_composer::compose(&context.path, resource.path.as_deref(), method.path());
            if let Some(composed) = composed {
                let (path, regexes) = path_composer::extract_path_parameters(&composed);
                let verb = self.verbs.resolve(method);

                let Some(mut operation) = builder.build(method, &mut self.document)? else {
                    continue;
                };
                for parameter in &context.parameters {
                    operation.add_parameter(parameter.clone());
                }
                apply_path_patterns(&mut operation.parameters, &regexes);
                operation.schemes = annotations::protocols(meta);

                let consumes = merge_media_types(&resource.consumes, &context.consumes, operation.consumes.as_deref());
                let produces = merge_media_types(&resource.produces, &context.produces, operation.produces.as_deref());

                if let Some(sub_resource) = resources.routable_resource(&method.return_type) {
                    debug!("Descending into sub-resource {} at {}", sub_resource.name, path);
                    let child = CompositionContext::descend(
                        &path,
                        verb,
                        consumes.clone(),
                        produces.clone(),
                        tags.clone(),
                        &operation,
                    );
                    self.read_class(resources, sub_resource, &child, stack)?;
                }

                let verb = verb.or(context.method);
                for tag in meta.tags.iter().filter(|t| !t.is_empty()) {
                    operation.add_tag(tag);
                    self.document.add_tag(Tag::new(tag.as_str()));
                }
                complete_operation(&mut operation, consumes, produces, &tags, &securities);

                match verb {
                    Some(verb) => self.document.register_operation(&path, verb, operation),
                    None => debug!("No http method for {}.{}, not registering {}", resource.name, method.name, path),
                }
            } else {
                debug!("Method {}.{} has no path", resource.name, method.name);
            }
            self.document.backfill_tag_descriptions(resources.tag_definitions());
        }
        // Class tags are declared even when no method qualifies.
        self.document.backfill_tag_descriptions(resources.tag_definitions());

        stack.pop();
        Ok(())
    }

    /// Parent tags overlaid with the resource's own, all declared in the
    /// document.
    fn class_tags(&mut self, parent: &IndexMap<String, Tag>, api: Option<&ApiMeta>) -> IndexMap<String, Tag> {
        let mut tags = parent.clone();
        if let Some(api) = api {
            for tag in annotations::extract_tags(api) {
                tags.insert(tag.name.clone(), tag);
            }
        }
        for tag in tags.values() {
            self.document.add_tag(tag.clone());
        }
        tags
    }
}

/// A resource is read when it carries resource metadata that is not hidden,
/// or when hidden reads are allowed.
fn can_read(api: Option<&ApiMeta>, read_hidden: bool) -> bool {
    read_hidden || api.is_some_and(|api| !api.hidden)
}

/// Ordered union of class, parent and method media types.
fn merge_media_types(class: &[String], parent: &[String], method: Option<&[String]>) -> Vec<String> {
    let mut merged: Vec<String> = Vec::new();
    for media_type in class.iter().chain(parent).chain(method.unwrap_or_default()) {
        if !merged.contains(media_type) {
            merged.push(media_type.clone());
        }
    }
    merged
}

/// Fills in what the operation does not declare itself: media types, class
/// tags and class security.
fn complete_operation(
    operation: &mut Operation,
    consumes: Vec<String>,
    produces: Vec<String>,
    tags: &IndexMap<String, Tag>,
    securities: &[SecurityRequirement],
) {
    if operation.consumes.is_none() && !consumes.is_empty() {
        operation.consumes = Some(consumes);
    }
    if operation.produces.is_none() && !produces.is_empty() {
        operation.produces = Some(produces);
    }
    if operation.tags.is_empty() {
        for name in tags.keys() {
            operation.add_tag(name);
        }
    }
    for requirement in securities {
        operation.add_security(requirement.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{
        AuthorizationMeta, CustomAnnotation, MethodDescriptor, OperationMeta, ParamAnnotation, ParameterDescriptor, TagDefinition,
    };
    use crate::document::ParameterLocation;
    use crate::model_registry::tests::{create_registry_from_code, PETSTORE_MODELS};
    use crate::model_registry::SourceModelRegistry;
    use crate::type_ref::TypeRef;
    use crate::verb::StandardVerb;
    use pretty_assertions::assert_eq;

    fn resource(name: &str, path: Option<&str>, methods: Vec<MethodDescriptor>) -> ResourceDescriptor {
        ResourceDescriptor {
            name: name.to_string(),
            api: Some(ApiMeta::default()),
            path: path.map(str::to_string),
            methods,
            ..Default::default()
        }
    }

    fn method(name: &str, verb: Option<HttpMethod>, path: Option<&str>, return_type: &str) -> MethodDescriptor {
        let mut method = MethodDescriptor::new(name);
        method.annotations.operation = Some(OperationMeta::default());
        method.annotations.verb = verb;
        method.annotations.path = path.map(str::to_string);
        method.return_type = return_type.parse().unwrap();
        method
    }

    fn registry() -> SourceModelRegistry {
        create_registry_from_code(PETSTORE_MODELS)
    }

    fn read(resources: &ResourceSet) -> SpecificationDocument {
        let registry = registry();
        let mut reader = Reader::new(SpecificationDocument::default(), &registry);
        reader.read(resources).unwrap();
        reader.into_document()
    }

    #[test]
    fn test_sub_resource_paths_compose_transitively() {
        let mut resources = ResourceSet::new();
        resources.register(resource("A", Some("/a"), vec![method("b", None, Some("/b"), "B")]));
        resources.register_sub_resource(resource("B", None, vec![method("c", Some(HttpMethod::Get), Some("/c"), "Pet")]));

        let document = read(&resources);
        let paths: Vec<_> = document.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["/a/b/c"]);
        assert!(document.operation("/a/b/c", HttpMethod::Get).is_some());
        assert!(document.definitions.contains_key("Pet"));
    }

    #[test]
    fn test_sub_resource_locator_with_verb_is_registered() {
        let mut resources = ResourceSet::new();
        resources.register(resource(
            "A",
            Some("/a"),
            vec![method("locator", Some(HttpMethod::Get), Some("/b"), "B")],
        ));
        resources.register_sub_resource(resource("B", None, vec![method("c", None, Some("/c"), "String")]));

        let document = read(&resources);
        assert!(document.operation("/a/b", HttpMethod::Get).is_some());
        // The sub-resource method inherits the locator's verb.
        assert!(document.operation("/a/b/c", HttpMethod::Get).is_some());
    }

    #[test]
    fn test_method_without_verb_is_not_registered() {
        let mut resources = ResourceSet::new();
        resources.register(resource("A", Some("/a"), vec![method("noVerb", None, Some("/x"), "String")]));

        let document = read(&resources);
        assert!(document.paths.is_empty());
    }

    #[test]
    fn test_method_without_path_is_not_registered() {
        let mut resources = ResourceSet::new();
        resources.register(resource("A", None, vec![method("noPath", Some(HttpMethod::Get), None, "String")]));

        let document = read(&resources);
        assert!(document.paths.is_empty());
    }

    #[test]
    fn test_undocumented_and_hidden_are_skipped() {
        let mut undocumented = method("plain", Some(HttpMethod::Get), Some("/plain"), "()");
        undocumented.annotations.operation = None;
        let mut hidden_method = method("hidden", Some(HttpMethod::Get), Some("/hidden"), "()");
        hidden_method.annotations.operation.as_mut().unwrap().hidden = true;

        let mut hidden_resource = resource("H", Some("/h"), vec![method("m", Some(HttpMethod::Get), None, "()")]);
        hidden_resource.api.as_mut().unwrap().hidden = true;
        let mut plain_resource = resource("P", Some("/p"), vec![method("m", Some(HttpMethod::Get), None, "()")]);
        plain_resource.api = None;

        let mut resources = ResourceSet::new();
        resources.register(resource("A", Some("/a"), vec![undocumented, hidden_method]));
        resources.register(hidden_resource);
        resources.register(plain_resource);

        let document = read(&resources);
        assert!(document.paths.is_empty());
    }

    #[test]
    fn test_hidden_sub_resource_is_read() {
        let mut sub = resource("B", None, vec![method("c", Some(HttpMethod::Delete), Some("/c"), "()")]);
        sub.api.as_mut().unwrap().hidden = true;

        let mut resources = ResourceSet::new();
        resources.register(resource("A", Some("/a"), vec![method("b", None, Some("/b"), "B")]));
        resources.register_sub_resource(sub);

        let document = read(&resources);
        assert!(document.operation("/a/b/c", HttpMethod::Delete).is_some());
    }

    #[test]
    fn test_sub_resource_cycle_is_cut() {
        let mut resources = ResourceSet::new();
        resources.register(resource(
            "A",
            Some("/a"),
            vec![method("toB", None, Some("/b"), "B"), method("get", Some(HttpMethod::Get), None, "()")],
        ));
        resources.register_sub_resource(resource(
            "B",
            None,
            vec![method("toA", None, Some("/again"), "A"), method("get", Some(HttpMethod::Get), Some("/"), "()")],
        ));

        let document = read(&resources);
        // B is read once under A; A is not re-entered from B.
        let paths: Vec<_> = document.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["/a/b", "/a"]);
    }

    #[test]
    fn test_diamond_sub_resources_are_read_per_parent() {
        let mut resources = ResourceSet::new();
        resources.register(resource(
            "A",
            Some("/a"),
            vec![method("x", None, Some("/x"), "Shared"), method("y", None, Some("/y"), "Shared")],
        ));
        resources.register_sub_resource(resource(
            "Shared",
            None,
            vec![method("get", Some(HttpMethod::Get), Some("/"), "()")],
        ));

        let document = read(&resources);
        assert!(document.operation("/a/x", HttpMethod::Get).is_some());
        assert!(document.operation("/a/y", HttpMethod::Get).is_some());
    }

    #[test]
    fn test_media_types_merge() {
        let mut own = method("upload", Some(HttpMethod::Post), Some("/upload"), "()");
        own.annotations.consumes = Some(vec!["multipart/form-data".to_string()]);
        let inherited = method("list", Some(HttpMethod::Get), None, "Vec<Pet>");

        let mut pets = resource("Pets", Some("/pets"), vec![own, inherited]);
        pets.consumes = vec!["application/json".to_string()];
        pets.produces = vec!["application/json".to_string(), "application/xml".to_string()];

        let mut resources = ResourceSet::new();
        resources.register(pets);
        let document = read(&resources);

        let upload = document.operation("/pets/upload", HttpMethod::Post).unwrap();
        assert_eq!(upload.consumes, Some(vec!["multipart/form-data".to_string()]));
        assert_eq!(
            upload.produces,
            Some(vec!["application/json".to_string(), "application/xml".to_string()])
        );

        let list = document.operation("/pets", HttpMethod::Get).unwrap();
        assert_eq!(list.consumes, Some(vec!["application/json".to_string()]));
    }

    #[test]
    fn test_sub_resource_inherits_context() {
        let mut locator = method("photos", None, Some("/{petId: [0-9]+}/photos"), "Photos");
        locator.parameters = vec![ParameterDescriptor {
            ty: TypeRef::new("i64"),
            annotations: vec![ParamAnnotation::Path {
                name: "petId".to_string(),
            }],
        }];
        locator.annotations.produces = Some(vec!["image/png".to_string()]);

        let mut pets = resource("Pets", Some("/pets"), vec![locator]);
        pets.api.as_mut().unwrap().value = "/pets".to_string();
        pets.api.as_mut().unwrap().authorizations = vec![AuthorizationMeta {
            value: "api_key".to_string(),
            scopes: vec![],
        }];
        pets.produces = vec!["application/json".to_string()];

        let mut resources = ResourceSet::new();
        resources.register(pets);
        resources.register_sub_resource(resource(
            "Photos",
            None,
            vec![method("list", Some(HttpMethod::Get), Some("/"), "Vec<String>")],
        ));

        let document = read(&resources);
        let operation = document.operation("/pets/{petId}/photos", HttpMethod::Get).unwrap();

        assert_eq!(operation.parameters.len(), 1);
        assert_eq!(operation.parameters[0].name, "petId");
        assert_eq!(operation.parameters[0].location, ParameterLocation::Path);
        assert_eq!(operation.parameters[0].pattern.as_deref(), Some("[0-9]+"));
        assert_eq!(
            operation.produces,
            Some(vec!["application/json".to_string(), "image/png".to_string()])
        );
        assert_eq!(operation.tags, vec!["pets".to_string()]);
        // Security comes from the sub-resource's own metadata only.
        assert!(operation.security.is_empty());
    }

    #[test]
    fn test_tags_and_security() {
        let mut tagged = method("find", Some(HttpMethod::Get), Some("/find"), "()");
        tagged.annotations.operation.as_mut().unwrap().tags = vec!["search".to_string()];
        let plain = method("list", Some(HttpMethod::Get), None, "()");

        let mut store = resource("Store", Some("/store"), vec![tagged, plain]);
        store.api = Some(ApiMeta {
            value: "/store".to_string(),
            description: "Access to orders".to_string(),
            authorizations: vec![AuthorizationMeta {
                value: "api_key".to_string(),
                scopes: vec![],
            }],
            ..Default::default()
        });

        let mut resources = ResourceSet::new();
        resources.register(store);
        resources.declare_tag(TagDefinition {
            name: "search".to_string(),
            description: "Lookups".to_string(),
        });
        resources.declare_tag(TagDefinition {
            name: "store".to_string(),
            description: "Ignored, already described".to_string(),
        });

        let document = read(&resources);
        assert_eq!(
            document.tags,
            vec![
                Tag::new("store").with_description("Access to orders"),
                Tag::new("search").with_description("Lookups"),
            ]
        );

        let find = document.operation("/store/find", HttpMethod::Get).unwrap();
        assert_eq!(find.tags, vec!["search".to_string()]);
        assert!(find.security[0].contains_key("api_key"));

        let list = document.operation("/store", HttpMethod::Get).unwrap();
        assert_eq!(list.tags, vec!["store".to_string()]);
    }

    #[test]
    fn test_tags_backfilled_without_qualifying_methods() {
        let mut resources = ResourceSet::new();
        resources.register(resource("Pets", Some("/pet"), vec![method("list", Some(HttpMethod::Get), None, "()")]));
        let mut user = resource("User", Some("/user"), vec![MethodDescriptor::new("helper")]);
        user.api = Some(ApiMeta {
            value: "/user".to_string(),
            ..Default::default()
        });
        resources.register(user);
        resources.declare_tag(TagDefinition {
            name: "user".to_string(),
            description: "Operations about user".to_string(),
        });

        let document = read(&resources);
        assert_eq!(document.tag("user"), Some(&Tag::new("user").with_description("Operations about user")));
        assert!(!document.paths.contains_key("/user"));
    }

    #[test]
    fn test_replaced_verb_chain() {
        let mut custom = method("upload", None, Some("/upload"), "()");
        custom.annotations.custom_annotations = vec![CustomAnnotation {
            name: "Upload".to_string(),
            http_method: Some("POST".to_string()),
        }];
        let mut resources = ResourceSet::new();
        resources.register(resource(
            "A",
            Some("/a"),
            vec![custom, method("list", Some(HttpMethod::Get), Some("/list"), "()")],
        ));

        let registry = registry();
        let mut reader = Reader::new(SpecificationDocument::default(), &registry)
            .with_verb_chain(VerbChain::empty().with_resolver(StandardVerb));
        reader.read(&resources).unwrap();

        let document = reader.document();
        assert!(document.operation("/a/list", HttpMethod::Get).is_some());
        assert!(!document.paths.contains_key("/a/upload"));
    }

    #[test]
    fn test_custom_verb_resolver() {
        let mut resources = ResourceSet::new();
        resources.register(resource("A", Some("/a"), vec![method("patchIt", None, None, "()")]));

        let registry = registry();
        let mut reader = Reader::new(SpecificationDocument::default(), &registry)
            .with_verb_resolver(|m: &MethodDescriptor| m.name.starts_with("patch").then_some(HttpMethod::Patch));
        reader.read(&resources).unwrap();

        assert!(reader.document().operation("/a", HttpMethod::Patch).is_some());
    }

    #[test]
    fn test_unresolved_type_aborts_with_partial_document() {
        let mut resources = ResourceSet::new();
        resources.register(resource(
            "A",
            Some("/a"),
            vec![
                method("ok", Some(HttpMethod::Get), None, "Pet"),
                method("broken", Some(HttpMethod::Post), None, "Unicorn"),
            ],
        ));

        let registry = registry();
        let mut reader = Reader::new(SpecificationDocument::default(), &registry);
        assert!(reader.read(&resources).is_err());
        assert!(reader.document().operation("/a", HttpMethod::Get).is_some());
        assert!(reader.document().operation("/a", HttpMethod::Post).is_none());
    }
}
