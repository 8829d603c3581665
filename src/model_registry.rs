//! Model registry: turns declared types into schemas and model definitions.
//!
//! The reader never generates schemas itself; it classifies types and asks a
//! [`ModelRegistry`]. [`SourceModelRegistry`] answers from the struct and enum
//! definitions of the project's Rust sources.

use crate::error::{Error, Result};
use crate::schema::{with_container, Schema};
use crate::type_ref::TypeRef;
use crate::type_resolver::{PrimitiveType, ResolvedType, TypeDef, TypeKind, TypeResolver};
use indexmap::IndexMap;
use log::debug;
use std::collections::HashSet;

/// Source of schemas and model definitions for declared types.
pub trait ModelRegistry {
    /// The model defined by `ty` itself, keyed by name. Empty for scalars,
    /// containers and void.
    fn read(&self, ty: &TypeRef) -> Result<IndexMap<String, Schema>>;

    /// Inline schema for `ty`: a scalar schema, a container schema, or a
    /// reference to a model. `None` for void.
    fn read_as_property(&self, ty: &TypeRef) -> Result<Option<Schema>>;

    /// Every model reachable from `ty`, including models nested in fields and
    /// generic arguments.
    fn read_all(&self, ty: &TypeRef) -> Result<IndexMap<String, Schema>>;
}

/// Model registry backed by the definitions of the project's Rust sources
pub struct SourceModelRegistry {
    /// Type resolver for looking up type definitions
    type_resolver: TypeResolver,
}

impl SourceModelRegistry {
    pub fn new(type_resolver: TypeResolver) -> Self {
        debug!("Initializing SourceModelRegistry");
        Self { type_resolver }
    }

    /// Inline schema for a type. Unknown names are an error at the top level
    /// (`strict`) and an untyped object inside model fields.
    fn inline_schema(&self, ty: &TypeRef, strict: bool) -> Result<Option<Schema>> {
        let ty = ty.unwrapped();
        if ty.is_void() {
            return Ok(None);
        }

        if let Some((kind, element)) = ty.container() {
            return Ok(self
                .inline_schema(element, strict)?
                .map(|schema| with_container(Some(kind), schema)));
        }

        match self.type_resolver.resolve(&ty.name) {
            Some(ResolvedType::Primitive(primitive)) => Ok(Some(primitive_to_schema(primitive))),
            Some(ResolvedType::Definition(definition)) => Ok(Some(Schema::reference(&definition.name))),
            None if strict => Err(Error::UnresolvedType(ty.to_string())),
            None => {
                debug!("Unknown field type: {}, using object placeholder", ty);
                Ok(Some(Schema::object()))
            }
        }
    }

    /// Model definition schema for a struct or enum
    fn model_schema(&self, definition: &TypeDef) -> Schema {
        debug!("Generating model schema for: {}", definition.name);
        match &definition.kind {
            TypeKind::Struct(struct_def) => {
                let mut properties = IndexMap::new();
                let mut required = Vec::new();
                for field in &struct_def.fields {
                    let property = match &field.ty {
                        Some(ty) => self.inline_schema(ty, false).ok().flatten(),
                        None => None,
                    };
                    properties.insert(field.name.clone(), property.unwrap_or_else(Schema::object));
                    if !field.optional {
                        required.push(field.name.clone());
                    }
                }
                Schema {
                    schema_type: Some("object".to_string()),
                    properties: Some(properties),
                    required: (!required.is_empty()).then_some(required),
                    ..Default::default()
                }
            }
            TypeKind::Enum(enum_def) => Schema {
                schema_type: Some("string".to_string()),
                enum_values: Some(enum_def.variants.clone()),
                ..Default::default()
            },
        }
    }

    /// Walks `ty` and collects every reachable model. `strict` applies to the
    /// top-level type only.
    fn collect_models(
        &self,
        ty: &TypeRef,
        strict: bool,
        visited: &mut HashSet<String>,
        models: &mut IndexMap<String, Schema>,
    ) -> Result<()> {
        let ty = ty.unwrapped();
        if ty.is_void() {
            return Ok(());
        }
        if let Some((_, element)) = ty.container() {
            return self.collect_models(element, strict, visited, models);
        }

        match self.type_resolver.resolve(&ty.name) {
            Some(ResolvedType::Primitive(_)) => {}
            Some(ResolvedType::Definition(definition)) => {
                if visited.insert(definition.name.clone()) {
                    models.insert(definition.name.clone(), self.model_schema(definition));
                    if let TypeKind::Struct(struct_def) = &definition.kind {
                        for field_ty in struct_def.fields.iter().filter_map(|f| f.ty.as_ref()) {
                            self.collect_models(field_ty, false, visited, models)?;
                        }
                    }
                }
            }
            None if strict => return Err(Error::UnresolvedType(ty.to_string())),
            None => debug!("Skipping unknown nested type: {}", ty),
        }

        for arg in &ty.args {
            self.collect_models(arg, false, visited, models)?;
        }
        Ok(())
    }
}

impl ModelRegistry for SourceModelRegistry {
    fn read(&self, ty: &TypeRef) -> Result<IndexMap<String, Schema>> {
        let ty = ty.unwrapped();
        let mut models = IndexMap::new();
        if ty.is_void() || ty.container().is_some() {
            return Ok(models);
        }
        match self.type_resolver.resolve(&ty.name) {
            Some(ResolvedType::Primitive(_)) => {}
            Some(ResolvedType::Definition(definition)) => {
                models.insert(definition.name.clone(), self.model_schema(definition));
            }
            None => return Err(Error::UnresolvedType(ty.to_string())),
        }
        Ok(models)
    }

    fn read_as_property(&self, ty: &TypeRef) -> Result<Option<Schema>> {
        self.inline_schema(ty, true)
    }

    fn read_all(&self, ty: &TypeRef) -> Result<IndexMap<String, Schema>> {
        let mut models = IndexMap::new();
        self.collect_models(ty, true, &mut HashSet::new(), &mut models)?;
        Ok(models)
    }
}

/// Convert a primitive type to a schema
pub fn primitive_to_schema(primitive: PrimitiveType) -> Schema {
    let (schema_type, format) = match primitive {
        PrimitiveType::String | PrimitiveType::Char => ("string", None),
        PrimitiveType::I8 | PrimitiveType::I16 | PrimitiveType::I32 => ("integer", Some("int32")),
        PrimitiveType::U8 | PrimitiveType::U16 | PrimitiveType::U32 => ("integer", Some("int32")),
        PrimitiveType::I64 | PrimitiveType::I128 => ("integer", Some("int64")),
        PrimitiveType::U64 | PrimitiveType::U128 => ("integer", Some("int64")),
        PrimitiveType::F32 => ("number", Some("float")),
        PrimitiveType::F64 => ("number", Some("double")),
        PrimitiveType::Bool => ("boolean", None),
        PrimitiveType::Uuid => ("string", Some("uuid")),
        PrimitiveType::Date => ("string", Some("date")),
        PrimitiveType::DateTime => ("string", Some("date-time")),
        PrimitiveType::File => ("file", None),
    };
    Schema::primitive(schema_type, format)
}
