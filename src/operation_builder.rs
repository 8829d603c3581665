//! Builds the operation of one resource method.
//!
//! The builder documents what the method itself declares. Class-level and
//! inherited context (paths, media types, tags, parent parameters) is merged
//! in by the [`Reader`](crate::reader::Reader).

use crate::annotations;
use crate::descriptor::{MethodDescriptor, ResourceSet, ResponseMeta};
use crate::document::{Operation, Response, SpecificationDocument};
use crate::error::Result;
use crate::model_registry::ModelRegistry;
use crate::parameter_extractor::ParameterExtractor;
use crate::schema::{with_container, ContainerKind, Schema};
use crate::type_classifier::{Classification, TypeClassifier};
use log::debug;

/// Description of a response that does not declare one
pub const SUCCESSFUL_OPERATION: &str = "successful operation";

/// Response key of the default response
const DEFAULT_RESPONSE: &str = "default";

pub struct OperationBuilder<'a> {
    registry: &'a dyn ModelRegistry,
    classifier: TypeClassifier<'a>,
    parameters: ParameterExtractor<'a>,
}

impl<'a> OperationBuilder<'a> {
    pub fn new(registry: &'a dyn ModelRegistry, resources: &'a ResourceSet) -> Self {
        Self {
            registry,
            classifier: TypeClassifier::new(registry, resources),
            parameters: ParameterExtractor::new(registry, resources),
        }
    }

    /// Builds the operation for `method`, registering every model it
    /// references in `document`.
    ///
    /// Returns `None` when the operation metadata marks the method hidden.
    /// The result always has at least one response.
    ///
    /// # Errors
    ///
    /// Fails when a response or parameter type cannot be resolved.
    pub fn build(&self, method: &MethodDescriptor, document: &mut SpecificationDocument) -> Result<Option<Operation>> {
        let meta = method.operation_meta();
        if meta.is_some_and(|m| m.hidden) {
            debug!("Operation {} is hidden", method.name);
            return Ok(None);
        }

        let mut operation = Operation {
            operation_id: annotations::operation_id(method, meta),
            ..Default::default()
        };

        let mut default_headers = None;
        if let Some(meta) = meta {
            default_headers = annotations::response_headers(&meta.response_headers, self.registry)?;
            operation.summary = non_empty(&meta.value);
            operation.description = non_empty(&meta.notes);
            for extension in annotations::custom_extensions(&meta.extensions) {
                for (key, value) in extension {
                    operation.vendor_extensions.insert(annotations::vendor_key(&key), value);
                }
            }
            for requirement in annotations::security_requirements(&meta.authorizations) {
                operation.add_security(requirement);
            }
        }

        let response_type = annotations::response_type(method, meta);
        let container = annotations::response_container(meta);
        let code = response_key(meta.map_or(200, |m| m.code));

        let successful = |schema: Option<Schema>| Response {
            description: SUCCESSFUL_OPERATION.to_string(),
            schema,
            headers: default_headers.clone(),
        };
        match self.classifier.classify(response_type)? {
            Classification::Ignore => {}
            Classification::Primitive(schema) => {
                operation
                    .responses
                    .insert(code.clone(), successful(Some(with_container(container, schema))));
            }
            Classification::Inline(schema) => {
                operation.responses.insert(code.clone(), successful(schema));
            }
            Classification::Composite(models) => {
                for (name, model) in models {
                    let schema = with_container(container, Schema::reference(&name));
                    operation.responses.insert(code.clone(), successful(Some(schema)));
                    document.register_model(&name, model);
                }
            }
        }
        for (name, model) in self.classifier.discovered_models(response_type)? {
            document.register_model(&name, model);
        }

        if let Some(consumes) = method.consumes() {
            operation.consumes = Some(consumes.to_vec());
        }
        if let Some(produces) = method.produces() {
            operation.produces = Some(produces.to_vec());
        }

        for response in method.responses().unwrap_or_default() {
            self.apply_response(&mut operation, response, document)?;
        }

        operation.deprecated = method.is_deprecated();

        for (parameter, annotations) in method.parameters.iter().zip(method.parameter_annotations()) {
            let extracted = self.parameters.extract(&parameter.ty, &annotations, document)?;
            operation.parameters.extend(extracted);
        }

        if operation.responses.is_empty() {
            operation
                .responses
                .insert(DEFAULT_RESPONSE.to_string(), successful(None));
        }

        for implicit in method.implicit_params().unwrap_or_default() {
            if let Some(parameter) = self.parameters.implicit_parameter(implicit, document)? {
                operation.parameters.push(parameter);
            }
        }

        Ok(Some(operation))
    }

    /// Applies one explicit response. A void response type keeps the schema
    /// already documented for that code.
    fn apply_response(
        &self,
        operation: &mut Operation,
        meta: &ResponseMeta,
        document: &mut SpecificationDocument,
    ) -> Result<()> {
        let key = response_key(meta.code);
        let container = ContainerKind::parse(&meta.response_container);
        let mut response = Response {
            description: meta.message.clone(),
            schema: None,
            headers: annotations::response_headers(&meta.response_headers, self.registry)?,
        };

        match meta.response.as_ref().filter(|ty| !ty.is_void()) {
            Some(ty) => {
                for (name, model) in self.registry.read(ty)? {
                    response.schema = Some(with_container(container, Schema::reference(&name)));
                    document.register_model(&name, model);
                }
                for (name, model) in self.registry.read_all(ty)? {
                    document.register_model(&name, model);
                }
                if response.schema.is_none() {
                    response.schema = self
                        .registry
                        .read_as_property(ty)?
                        .map(|schema| with_container(container, schema));
                }
            }
            None => {
                response.schema = operation.responses.get(&key).and_then(|r| r.schema.clone());
            }
        }

        operation.responses.insert(key, response);
        Ok(())
    }
}

/// Response map key for a status code; `0` is the default response.
fn response_key(code: u16) -> String {
    match code {
        0 => DEFAULT_RESPONSE.to_string(),
        code => code.to_string(),
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
