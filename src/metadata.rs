//! Effective metadata of methods.
//!
//! A method annotation applies when the method declares it itself or, failing
//! that, when the nearest overridden declaration does. Per-parameter
//! annotations are different: every level of the override chain contributes,
//! base first, so an interface can document parameters once for all of its
//! implementations.

use crate::descriptor::{
    HttpMethod, ImplicitParamMeta, MethodAnnotations, MethodDescriptor, OperationMeta,
    ParamAnnotation, ResponseMeta,
};

impl MethodDescriptor {
    /// Own annotations first, then overridden declarations from the nearest
    /// to the base.
    fn declarations(&self) -> impl Iterator<Item = &MethodAnnotations> {
        std::iter::once(&self.annotations)
            .chain(self.overridden.iter().rev().map(|o| &o.annotations))
    }

    /// First declaration along the override chain for which `select` yields
    /// a value.
    pub fn find<'a, T: ?Sized>(
        &'a self,
        select: impl Fn(&'a MethodAnnotations) -> Option<&'a T>,
    ) -> Option<&'a T> {
        self.declarations().find_map(select)
    }

    pub fn operation_meta(&self) -> Option<&OperationMeta> {
        self.find(|a| a.operation.as_ref())
    }

    pub fn path(&self) -> Option<&str> {
        self.find(|a| a.path.as_deref())
    }

    pub fn verb(&self) -> Option<HttpMethod> {
        self.find(|a| a.verb.as_ref()).copied()
    }

    pub fn consumes(&self) -> Option<&[String]> {
        self.find(|a| a.consumes.as_deref())
    }

    pub fn produces(&self) -> Option<&[String]> {
        self.find(|a| a.produces.as_deref())
    }

    pub fn responses(&self) -> Option<&[ResponseMeta]> {
        self.find(|a| a.responses.as_deref())
    }

    pub fn implicit_params(&self) -> Option<&[ImplicitParamMeta]> {
        self.find(|a| a.implicit_params.as_deref())
    }

    pub fn is_deprecated(&self) -> bool {
        self.declarations().any(|a| a.deprecated)
    }

    /// Per-parameter annotations merged over the override chain.
    ///
    /// Position `i` holds the annotations of every overridden declaration's
    /// parameter `i`, base first, followed by the method's own.
    pub fn parameter_annotations(&self) -> Vec<Vec<ParamAnnotation>> {
        let mut merged: Vec<Vec<ParamAnnotation>> = vec![Vec::new(); self.parameters.len()];
        for overridden in &self.overridden {
            for (slot, annotations) in merged.iter_mut().zip(&overridden.parameter_annotations) {
                slot.extend(annotations.iter().cloned());
            }
        }
        for (slot, parameter) in merged.iter_mut().zip(&self.parameters) {
            slot.extend(parameter.annotations.iter().cloned());
        }
        merged
    }
}
