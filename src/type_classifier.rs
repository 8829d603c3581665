//! Decides how a declared response type shows up in an operation.

use crate::descriptor::ResourceSet;
use crate::error::Result;
use crate::model_registry::ModelRegistry;
use crate::schema::Schema;
use crate::type_ref::TypeRef;
use indexmap::IndexMap;
use log::debug;

/// How a response type is documented
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    /// No response body: void, the response wrapper, or a sub-resource
    Ignore,
    /// Scalar or container schema used directly as the body schema
    Primitive(Schema),
    /// Named models; the body refers to them
    Composite(IndexMap<String, Schema>),
    /// A composite type without a named model. The body falls back to the
    /// registry's inline schema, if it has one.
    Inline(Option<Schema>),
}

/// Thin layer over a [`ModelRegistry`] that also knows which types are
/// routable resources.
pub struct TypeClassifier<'a> {
    registry: &'a dyn ModelRegistry,
    resources: &'a ResourceSet,
}

impl<'a> TypeClassifier<'a> {
    pub fn new(registry: &'a dyn ModelRegistry, resources: &'a ResourceSet) -> Self {
        Self { registry, resources }
    }

    /// Whether `ty` produces no response schema at all.
    pub fn is_ignored(&self, ty: &TypeRef) -> bool {
        let ty = ty.unwrapped();
        ty.is_void() || ty.is_response_wrapper() || self.resources.routable_resource(ty).is_some()
    }

    pub fn classify(&self, ty: &TypeRef) -> Result<Classification> {
        if self.is_ignored(ty) {
            debug!("Type {} has no response body", ty);
            return Ok(Classification::Ignore);
        }

        let property = self.registry.read_as_property(ty)?;
        if let Some(schema) = property.as_ref().filter(|s| s.is_scalar_like()) {
            return Ok(Classification::Primitive(schema.clone()));
        }

        let models = self.registry.read(ty)?;
        if models.is_empty() {
            debug!("No model for {}, using inline schema", ty);
            return Ok(Classification::Inline(property));
        }
        Ok(Classification::Composite(models))
    }

    /// Every model reachable from `ty`; empty when the type is ignored.
    pub fn discovered_models(&self, ty: &TypeRef) -> Result<IndexMap<String, Schema>> {
        if self.is_ignored(ty) {
            return Ok(IndexMap::new());
        }
        self.registry.read_all(ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{ApiMeta, ResourceDescriptor};
    use crate::model_registry::tests::{create_registry_from_code, PETSTORE_MODELS};

    fn ty(s: &str) -> TypeRef {
        s.parse().unwrap()
    }

    fn resources() -> ResourceSet {
        let mut set = ResourceSet::new();
        set.register_sub_resource(ResourceDescriptor {
            name: "PetPhotos".to_string(),
            api: Some(ApiMeta::default()),
            ..Default::default()
        });
        set
    }

    #[test]
    fn test_ignored_types() {
        let registry = create_registry_from_code(PETSTORE_MODELS);
        let resources = resources();
        let classifier = TypeClassifier::new(&registry, &resources);

        for name in ["()", "Void", "Response", "PetPhotos", "Option<PetPhotos>"] {
            assert_eq!(classifier.classify(&ty(name)).unwrap(), Classification::Ignore, "{}", name);
            assert!(classifier.discovered_models(&ty(name)).unwrap().is_empty());
        }
    }

    #[test]
    fn test_primitive_and_container_types() {
        let registry = create_registry_from_code(PETSTORE_MODELS);
        let resources = resources();
        let classifier = TypeClassifier::new(&registry, &resources);

        assert_eq!(
            classifier.classify(&ty("i64")).unwrap(),
            Classification::Primitive(Schema::primitive("integer", Some("int64")))
        );
        assert_eq!(
            classifier.classify(&ty("Vec<Pet>")).unwrap(),
            Classification::Primitive(Schema::array(Schema::reference("Pet")))
        );
    }

    #[test]
    fn test_composite_types() {
        let registry = create_registry_from_code(PETSTORE_MODELS);
        let resources = resources();
        let classifier = TypeClassifier::new(&registry, &resources);

        let Classification::Composite(models) = classifier.classify(&ty("Pet")).unwrap() else {
            panic!("Pet should be composite");
        };
        assert_eq!(models.keys().collect::<Vec<_>>(), vec!["Pet"]);

        let discovered = classifier.discovered_models(&ty("Pet")).unwrap();
        assert_eq!(discovered.len(), 4);
    }

    #[test]
    fn test_map_without_model_falls_back_to_inline() {
        let registry = create_registry_from_code(PETSTORE_MODELS);
        let resources = resources();
        let classifier = TypeClassifier::new(&registry, &resources);

        assert_eq!(
            classifier.classify(&ty("HashMap<String, i32>")).unwrap(),
            Classification::Inline(Some(Schema::map(Schema::primitive("integer", Some("int32")))))
        );
    }

    #[test]
    fn test_unresolved_type_propagates() {
        let registry = create_registry_from_code(PETSTORE_MODELS);
        let resources = resources();
        let classifier = TypeClassifier::new(&registry, &resources);
        assert!(classifier.classify(&ty("Unicorn")).is_err());
    }
}
