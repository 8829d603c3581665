//! Maps declared method parameters and their annotations to document
//! parameters.

use crate::descriptor::{ApiParamMeta, ImplicitParamMeta, ParamAnnotation, ResourceSet};
use crate::document::{Parameter, ParameterLocation, SpecificationDocument};
use crate::error::Result;
use crate::model_registry::ModelRegistry;
use crate::schema::Schema;
use crate::type_ref::TypeRef;
use indexmap::IndexMap;
use log::{debug, warn};

/// Name of a body parameter that does not declare one
const DEFAULT_BODY_NAME: &str = "body";

pub struct ParameterExtractor<'a> {
    registry: &'a dyn ModelRegistry,
    resources: &'a ResourceSet,
}

impl<'a> ParameterExtractor<'a> {
    pub fn new(registry: &'a dyn ModelRegistry, resources: &'a ResourceSet) -> Self {
        Self { registry, resources }
    }

    /// Parameters documented by one declared method parameter.
    ///
    /// Context-injected and hidden parameters yield nothing; a parameter bag
    /// yields one parameter per annotated field; a parameter without a
    /// location annotation is the request body, whose models are registered
    /// in `document`.
    pub fn extract(
        &self,
        ty: &TypeRef,
        annotations: &[ParamAnnotation],
        document: &mut SpecificationDocument,
    ) -> Result<Vec<Parameter>> {
        self.extract_nested(ty, annotations, document, &mut Vec::new())
    }

    fn extract_nested(
        &self,
        ty: &TypeRef,
        annotations: &[ParamAnnotation],
        document: &mut SpecificationDocument,
        beans: &mut Vec<String>,
    ) -> Result<Vec<Parameter>> {
        if annotations.iter().any(|a| matches!(a, ParamAnnotation::Context)) {
            debug!("Skipping context parameter of type {}", ty);
            return Ok(Vec::new());
        }

        let api = api_meta(annotations);
        if api.is_some_and(|meta| meta.hidden) {
            debug!("Skipping hidden parameter of type {}", ty);
            return Ok(Vec::new());
        }

        if annotations.iter().any(|a| matches!(a, ParamAnnotation::Bean)) {
            return self.expand_bean(ty, document, beans);
        }

        // Documented type names such as `date-time` are not Rust types.
        let data_type = api.map(|meta| meta.data_type.trim()).filter(|t| !t.is_empty());
        let documented = data_type.and_then(documented_type);
        let ty = match data_type.filter(|_| documented.is_none()) {
            Some(data_type) => data_type.parse::<TypeRef>()?,
            None => ty.clone(),
        };

        let Some((location, name)) = location(annotations) else {
            return self
                .body_parameter(&ty, documented, api, document)
                .map(|p| p.into_iter().collect());
        };

        let mut parameter = Parameter::new(name, location);
        let schema = match documented {
            Some(schema) => Some(schema),
            None => self.parameter_schema(&ty)?,
        };
        if let Some(schema) = schema {
            apply_schema(&mut parameter, schema);
        }
        parameter.default = annotations.iter().find_map(|a| match a {
            ParamAnnotation::DefaultValue { value } => Some(value.clone()),
            _ => None,
        });

        if let Some(meta) = api {
            parameter.description = non_empty(&meta.value);
            parameter.required = parameter.required || meta.required;
            if let Some(format) = non_empty(&meta.format) {
                parameter.format = Some(format);
            }
            if let Some(default) = non_empty(&meta.default_value) {
                parameter.default = Some(default);
            }
            if let Some(values) = allowable_values(&meta.allowable_values) {
                parameter.enum_values = Some(values);
            }
            if parameter.param_type.as_deref() == Some("array") {
                parameter.collection_format = non_empty(&meta.collection_format);
            }
        }
        if parameter.param_type.as_deref() == Some("array") && parameter.collection_format.is_none() {
            parameter.collection_format = Some(default_collection_format(location).to_string());
        }

        Ok(vec![parameter])
    }

    fn expand_bean(
        &self,
        ty: &TypeRef,
        document: &mut SpecificationDocument,
        beans: &mut Vec<String>,
    ) -> Result<Vec<Parameter>> {
        let Some(bean) = self.resources.bean(ty) else {
            warn!("No parameter bean named {}, skipping parameter", ty);
            return Ok(Vec::new());
        };
        if beans.contains(&bean.name) {
            warn!("Parameter bean {} contains itself, skipping", bean.name);
            return Ok(Vec::new());
        }

        beans.push(bean.name.clone());
        let mut parameters = Vec::new();
        for field in &bean.fields {
            // Unannotated fields are not request parameters.
            if field.annotations.is_empty() {
                continue;
            }
            parameters.extend(self.extract_nested(&field.ty, &field.annotations, document, beans)?);
        }
        beans.pop();
        Ok(parameters)
    }

    fn body_parameter(
        &self,
        ty: &TypeRef,
        documented: Option<Schema>,
        api: Option<&ApiParamMeta>,
        document: &mut SpecificationDocument,
    ) -> Result<Option<Parameter>> {
        let schema = match documented {
            Some(schema) => schema,
            None => {
                let Some(schema) = self.registry.read_as_property(ty)? else {
                    return Ok(None);
                };
                for (name, model) in self.registry.read_all(ty)? {
                    document.register_model(&name, model);
                }
                schema
            }
        };

        let name = api
            .and_then(|meta| non_empty(&meta.name))
            .unwrap_or_else(|| DEFAULT_BODY_NAME.to_string());
        let mut parameter = Parameter::new(name, ParameterLocation::Body);
        parameter.schema = Some(schema);
        if let Some(meta) = api {
            parameter.description = non_empty(&meta.value);
            parameter.required = meta.required;
        }
        Ok(Some(parameter))
    }

    /// Inline schema for a non-body parameter. A reference to an enum model
    /// becomes the enum's string schema.
    fn parameter_schema(&self, ty: &TypeRef) -> Result<Option<Schema>> {
        if let Some(schema) = documented_type(&ty.name) {
            return Ok(Some(schema));
        }
        let Some(schema) = self.registry.read_as_property(ty)? else {
            return Ok(None);
        };
        if schema.reference.is_none() {
            return Ok(Some(schema));
        }
        let enum_schema = self
            .registry
            .read(ty)?
            .into_values()
            .find(|model| model.enum_values.is_some());
        Ok(Some(enum_schema.unwrap_or_else(|| Schema::primitive("string", None))))
    }

    /// A method-level parameter. Unknown locations are skipped.
    pub fn implicit_parameter(
        &self,
        meta: &ImplicitParamMeta,
        document: &mut SpecificationDocument,
    ) -> Result<Option<Parameter>> {
        let Some(location) = ParameterLocation::parse(&meta.param_type) else {
            debug!("Skipping implicit parameter {} with location '{}'", meta.name, meta.param_type);
            return Ok(None);
        };

        let mut parameter = Parameter::new(meta.name.as_str(), location);
        parameter.description = non_empty(&meta.value);
        parameter.required = parameter.required || meta.required;
        parameter.default = non_empty(&meta.default_value);
        parameter.enum_values = allowable_values(&meta.allowable_values);

        let data_type = meta.data_type.trim();
        let schema = if data_type.is_empty() {
            Some(Schema::primitive("string", None))
        } else if let Some(schema) = documented_type(data_type) {
            Some(schema)
        } else if location == ParameterLocation::Body {
            let ty: TypeRef = data_type.parse()?;
            for (name, model) in self.registry.read_all(&ty)? {
                document.register_model(&name, model);
            }
            self.registry.read_as_property(&ty)?
        } else {
            self.parameter_schema(&data_type.parse::<TypeRef>()?)?
        };

        if location == ParameterLocation::Body {
            parameter.schema = schema.map(|s| if meta.allow_multiple { Schema::array(s) } else { s });
            return Ok(Some(parameter));
        }

        if let Some(schema) = schema {
            if meta.allow_multiple {
                apply_schema(&mut parameter, Schema::array(schema));
                parameter.collection_format = Some("multi".to_string());
            } else {
                apply_schema(&mut parameter, schema);
            }
        }
        if let Some(format) = non_empty(&meta.format) {
            parameter.format = Some(format);
        }
        Ok(Some(parameter))
    }
}

/// Sets `pattern` on every path parameter whose template carried a regex.
pub fn apply_path_patterns(parameters: &mut [Parameter], regexes: &IndexMap<String, String>) {
    for parameter in parameters.iter_mut() {
        if parameter.location != ParameterLocation::Path {
            continue;
        }
        if let Some(regex) = regexes.get(&parameter.name) {
            parameter.pattern = Some(regex.clone());
        }
    }
}

fn api_meta(annotations: &[ParamAnnotation]) -> Option<&ApiParamMeta> {
    annotations.iter().find_map(|a| match a {
        ParamAnnotation::Api(meta) => Some(meta),
        _ => None,
    })
}

fn location(annotations: &[ParamAnnotation]) -> Option<(ParameterLocation, &str)> {
    annotations.iter().find_map(|a| match a {
        ParamAnnotation::Path { name } => Some((ParameterLocation::Path, name.as_str())),
        ParamAnnotation::Query { name } => Some((ParameterLocation::Query, name.as_str())),
        ParamAnnotation::Header { name } => Some((ParameterLocation::Header, name.as_str())),
        ParamAnnotation::Form { name } => Some((ParameterLocation::Form, name.as_str())),
        ParamAnnotation::Cookie { name } => Some((ParameterLocation::Cookie, name.as_str())),
        _ => None,
    })
}

/// Copies type information of a non-body parameter from its schema.
fn apply_schema(parameter: &mut Parameter, schema: Schema) {
    parameter.param_type = schema.schema_type;
    parameter.format = schema.format;
    parameter.items = schema.items.map(|items| *items);
    if parameter.enum_values.is_none() {
        parameter.enum_values = schema.enum_values;
    }
}

fn default_collection_format(location: ParameterLocation) -> &'static str {
    match location {
        ParameterLocation::Query | ParameterLocation::Form => "multi",
        _ => "csv",
    }
}

/// Type names used in annotation metadata rather than in code
fn documented_type(name: &str) -> Option<Schema> {
    let (schema_type, format) = match name {
        "string" => ("string", None),
        "integer" | "int" => ("integer", Some("int32")),
        "long" => ("integer", Some("int64")),
        "number" | "float" => ("number", Some("float")),
        "double" => ("number", Some("double")),
        "boolean" => ("boolean", None),
        "date" => ("string", Some("date")),
        "dateTime" | "date-time" => ("string", Some("date-time")),
        "file" => ("file", None),
        _ => return None,
    };
    Some(Schema::primitive(schema_type, format))
}

/// Comma-separated values; ranges are not enumerations.
fn allowable_values(values: &str) -> Option<Vec<String>> {
    let values = values.trim();
    if values.is_empty() || values.starts_with("range") {
        return None;
    }
    let values: Vec<String> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    (!values.is_empty()).then_some(values)
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
