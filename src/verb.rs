//! HTTP verb resolution.
//!
//! A method's verb comes from the first resolver in a [`VerbChain`] that
//! knows it. The default chain asks, in order, the operation's explicit
//! `http_method`, the standard verb marker, and the custom annotations that
//! name a verb. Callers can append resolvers of their own.

use crate::descriptor::{HttpMethod, MethodDescriptor};
use log::{debug, warn};

/// A strategy for finding the HTTP verb of a method
pub trait VerbResolver {
    fn resolve(&self, method: &MethodDescriptor) -> Option<HttpMethod>;
}

impl<F> VerbResolver for F
where
    F: Fn(&MethodDescriptor) -> Option<HttpMethod>,
{
    fn resolve(&self, method: &MethodDescriptor) -> Option<HttpMethod> {
        self(method)
    }
}

/// Explicit `http_method` of the operation metadata
pub struct OperationVerb;

impl VerbResolver for OperationVerb {
    fn resolve(&self, method: &MethodDescriptor) -> Option<HttpMethod> {
        let declared = method.operation_meta()?.http_method.trim();
        if declared.is_empty() {
            return None;
        }
        let verb = HttpMethod::parse(declared);
        if verb.is_none() {
            warn!("Unsupported http method {} on {}", declared, method.name);
        }
        verb
    }
}

/// Standard verb marker, own or inherited
pub struct StandardVerb;

impl VerbResolver for StandardVerb {
    fn resolve(&self, method: &MethodDescriptor) -> Option<HttpMethod> {
        method.verb()
    }
}

/// Custom annotations declared on the method itself that are meta-annotated
/// with a verb
pub struct CustomAnnotationVerb;

impl VerbResolver for CustomAnnotationVerb {
    fn resolve(&self, method: &MethodDescriptor) -> Option<HttpMethod> {
        method
            .annotations
            .custom_annotations
            .iter()
            .filter_map(|annotation| {
                let declared = annotation.http_method.as_deref()?;
                let verb = HttpMethod::parse(declared);
                if verb.is_none() {
                    warn!("Annotation {} names unsupported http method {}", annotation.name, declared);
                }
                verb
            })
            .next()
    }
}

/// Ordered list of verb resolvers
pub struct VerbChain {
    resolvers: Vec<Box<dyn VerbResolver>>,
}

impl Default for VerbChain {
    fn default() -> Self {
        Self {
            resolvers: vec![Box::new(OperationVerb), Box::new(StandardVerb), Box::new(CustomAnnotationVerb)],
        }
    }
}

impl VerbChain {
    /// A chain without any resolver
    pub fn empty() -> Self {
        Self { resolvers: Vec::new() }
    }

    /// Appends a resolver, tried after every resolver already in the chain.
    pub fn with_resolver(mut self, resolver: impl VerbResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn resolve(&self, method: &MethodDescriptor) -> Option<HttpMethod> {
        let verb = self.resolvers.iter().find_map(|resolver| resolver.resolve(method));
        if verb.is_none() {
            debug!("No http method for {}", method.name);
        }
        verb
    }
}
