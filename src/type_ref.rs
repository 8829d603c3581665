//! Declared types of return values, parameters and bean fields.
//!
//! Types are written in Rust type syntax (`i64`, `Vec<Pet>`,
//! `HashMap<String, Pet>`, `()`) and parsed with `syn`, so a descriptor can
//! name exactly the types that the model sources define.

use crate::error::{Error, Result};
use crate::schema::ContainerKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Name of the opaque response-wrapper type. Methods returning it carry no
/// body schema of their own.
pub const RESPONSE_WRAPPER: &str = "Response";

/// A reference to a declared type, reduced to its last path segment and its
/// generic arguments.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    /// The base type name (e.g. "String", "Pet", "Vec")
    pub name: String,
    /// Generic type arguments in declaration order
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    /// Create a TypeRef for a simple, non-generic type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a TypeRef for a generic type
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    /// The unit type
    pub fn void() -> Self {
        Self::new("()")
    }

    pub fn is_void(&self) -> bool {
        matches!(self.name.as_str(), "()" | "Void" | "void")
    }

    pub fn is_response_wrapper(&self) -> bool {
        self.name == RESPONSE_WRAPPER
    }

    /// Strips any number of `Option<..>` layers.
    pub fn unwrapped(&self) -> &TypeRef {
        let mut current = self;
        while current.name == "Option" && current.args.len() == 1 {
            current = &current.args[0];
        }
        current
    }

    /// Container kind and element type, if this is a list, set or map.
    ///
    /// For maps the element is the value type; keys are always strings in
    /// the generated document.
    pub fn container(&self) -> Option<(ContainerKind, &TypeRef)> {
        let ty = self.unwrapped();
        let kind = match ty.name.as_str() {
            "Vec" | "VecDeque" | "LinkedList" | "List" => ContainerKind::List,
            "HashSet" | "BTreeSet" | "IndexSet" | "Set" => ContainerKind::Set,
            "HashMap" | "BTreeMap" | "IndexMap" | "Map" => ContainerKind::Map,
            _ => return None,
        };
        ty.args.last().map(|element| (kind, element))
    }

    /// Converts a parsed `syn::Type`. Returns `None` for type forms that have
    /// no place in an API document (fn pointers, trait objects, ...).
    pub fn from_syn(ty: &syn::Type) -> Option<TypeRef> {
        match ty {
            syn::Type::Tuple(tuple) if tuple.elems.is_empty() => Some(TypeRef::void()),
            syn::Type::Path(type_path) => {
                let segment = type_path.path.segments.last()?;
                let mut args = Vec::new();
                if let syn::PathArguments::AngleBracketed(generics) = &segment.arguments {
                    for arg in &generics.args {
                        if let syn::GenericArgument::Type(inner) = arg {
                            args.push(Self::from_syn(inner)?);
                        }
                    }
                }
                Some(TypeRef::generic(segment.ident.to_string(), args))
            }
            syn::Type::Reference(reference) => Self::from_syn(&reference.elem),
            syn::Type::Paren(paren) => Self::from_syn(&paren.elem),
            syn::Type::Group(group) => Self::from_syn(&group.elem),
            syn::Type::Slice(slice) => Some(TypeRef::generic("Vec", vec![Self::from_syn(&slice.elem)?])),
            syn::Type::Array(array) => Some(TypeRef::generic("Vec", vec![Self::from_syn(&array.elem)?])),
            _ => None,
        }
    }
}

impl FromStr for TypeRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |message: String| Error::InvalidTypeSyntax {
            ty: s.to_string(),
            message,
        };
        let ty: syn::Type = syn::parse_str(s.trim()).map_err(|e| invalid(e.to_string()))?;
        Self::from_syn(&ty).ok_or_else(|| invalid("unsupported type form".to_string()))
    }
}

impl TryFrom<String> for TypeRef {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.args.is_empty() {
            write!(f, "<")?;
            for (i, arg) in self.args.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", arg)?;
            }
            write!(f, ">")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_type() {
        let ty: TypeRef = "Pet".parse().unwrap();
        assert_eq!(ty, TypeRef::new("Pet"));
    }

    #[test]
    fn test_parse_qualified_generic_type() {
        let ty: TypeRef = "std::collections::HashMap<String, model::Pet>".parse().unwrap();
        assert_eq!(ty.name, "HashMap");
        assert_eq!(ty.args, vec![TypeRef::new("String"), TypeRef::new("Pet")]);
        assert_eq!(ty.to_string(), "HashMap<String, Pet>");
    }

    #[test]
    fn test_parse_unit_is_void() {
        let ty: TypeRef = "()".parse().unwrap();
        assert!(ty.is_void());
        assert!(TypeRef::new("Void").is_void());
        assert!(!TypeRef::new("Pet").is_void());
    }

    #[test]
    fn test_slice_and_reference_become_vec() {
        let ty: TypeRef = "&[u8]".parse().unwrap();
        assert_eq!(ty, TypeRef::generic("Vec", vec![TypeRef::new("u8")]));
    }

    #[test]
    fn test_invalid_syntax_is_an_error() {
        let err = "Vec<".parse::<TypeRef>().unwrap_err();
        assert!(matches!(err, Error::InvalidTypeSyntax { .. }));

        let err = "dyn Fn()".parse::<TypeRef>().unwrap_err();
        assert!(matches!(err, Error::InvalidTypeSyntax { .. }));
    }

    #[test]
    fn test_container_detection() {
        let list: TypeRef = "Option<Vec<Pet>>".parse().unwrap();
        let (kind, element) = list.container().unwrap();
        assert_eq!(kind, ContainerKind::List);
        assert_eq!(element, &TypeRef::new("Pet"));

        let map: TypeRef = "BTreeMap<String, i32>".parse().unwrap();
        let (kind, element) = map.container().unwrap();
        assert_eq!(kind, ContainerKind::Map);
        assert_eq!(element, &TypeRef::new("i32"));

        assert!(TypeRef::new("Pet").container().is_none());
    }

    #[test]
    fn test_deserialize_from_string() {
        let ty: TypeRef = serde_yaml::from_str("\"Vec<Pet>\"").unwrap();
        assert_eq!(ty.name, "Vec");
        let yaml = serde_yaml::to_string(&ty).unwrap();
        assert!(yaml.contains("Vec<Pet>"));
    }
}
