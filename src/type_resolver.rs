use crate::parser::ParsedFile;
use crate::type_ref::TypeRef;
use indexmap::IndexMap;
use log::{debug, warn};
use syn::visit::{self, Visit};

/// Type resolver - indexes the struct and enum definitions of the model
/// sources and resolves type names to primitives or definitions
pub struct TypeResolver {
    definitions: IndexMap<String, TypeDef>,
}

/// Result of resolving a type name
#[derive(Debug, Clone, Copy)]
pub enum ResolvedType<'a> {
    Primitive(PrimitiveType),
    Definition(&'a TypeDef),
}

/// A model definition found in the sources
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// The type name
    pub name: String,
    pub kind: TypeKind,
}

#[derive(Debug, Clone)]
pub enum TypeKind {
    /// A struct type with named fields
    Struct(StructDef),
    /// An enum type; only its variant names are documented
    Enum(EnumDef),
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub fields: Vec<FieldDef>,
}

/// Field definition in a struct
#[derive(Debug, Clone)]
pub struct FieldDef {
    /// Field name as serialized (after serde renames)
    pub name: String,
    /// Declared type, `None` for type forms with no document representation
    pub ty: Option<TypeRef>,
    /// Whether the field is wrapped in `Option<T>`
    pub optional: bool,
}

#[derive(Debug, Clone)]
pub struct EnumDef {
    pub variants: Vec<String>,
}

/// Scalar types with a direct schema representation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    I8,
    I16,
    I32,
    I64,
    I128,
    U8,
    U16,
    U32,
    U64,
    U128,
    F32,
    F64,
    Bool,
    Char,
    Uuid,
    Date,
    DateTime,
    File,
}

/// Serde attributes that change how a field or variant is documented
#[derive(Debug, Clone, Default)]
struct SerdeAttributes {
    rename: Option<String>,
    skip: bool,
}

impl TypeResolver {
    /// Indexes every struct and enum in the parsed files, including those in
    /// inline modules. The first definition of a name wins.
    pub fn new(parsed_files: &[ParsedFile]) -> Self {
        debug!("Initializing TypeResolver with {} files", parsed_files.len());
        let mut collector = DefinitionCollector::default();
        for parsed_file in parsed_files {
            collector.visit_file(&parsed_file.syntax_tree);
        }
        debug!("Indexed {} model definitions", collector.definitions.len());
        Self {
            definitions: collector.definitions,
        }
    }

    /// Resolve a type name to a primitive or a model definition
    pub fn resolve(&self, type_name: &str) -> Option<ResolvedType<'_>> {
        if let Some(primitive) = Self::parse_primitive_type(type_name) {
            return Some(ResolvedType::Primitive(primitive));
        }
        match self.definitions.get(type_name) {
            Some(definition) => Some(ResolvedType::Definition(definition)),
            None => {
                debug!("Could not resolve type: {}", type_name);
                None
            }
        }
    }

    pub fn definition(&self, type_name: &str) -> Option<&TypeDef> {
        self.definitions.get(type_name)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Parse a primitive type name
    pub fn parse_primitive_type(type_name: &str) -> Option<PrimitiveType> {
        match type_name {
            "String" | "str" | "Cow" => Some(PrimitiveType::String),
            "i8" => Some(PrimitiveType::I8),
            "i16" => Some(PrimitiveType::I16),
            "i32" => Some(PrimitiveType::I32),
            "i64" | "isize" => Some(PrimitiveType::I64),
            "i128" => Some(PrimitiveType::I128),
            "u8" => Some(PrimitiveType::U8),
            "u16" => Some(PrimitiveType::U16),
            "u32" => Some(PrimitiveType::U32),
            "u64" | "usize" => Some(PrimitiveType::U64),
            "u128" => Some(PrimitiveType::U128),
            "f32" => Some(PrimitiveType::F32),
            "f64" => Some(PrimitiveType::F64),
            "bool" => Some(PrimitiveType::Bool),
            "char" => Some(PrimitiveType::Char),
            "Uuid" => Some(PrimitiveType::Uuid),
            "NaiveDate" | "Date" => Some(PrimitiveType::Date),
            "DateTime" | "NaiveDateTime" | "OffsetDateTime" | "SystemTime" => Some(PrimitiveType::DateTime),
            "File" => Some(PrimitiveType::File),
            _ => None,
        }
    }
}

#[derive(Default)]
struct DefinitionCollector {
    definitions: IndexMap<String, TypeDef>,
}

impl DefinitionCollector {
    fn insert(&mut self, definition: TypeDef) {
        if self.definitions.contains_key(&definition.name) {
            warn!("Duplicate model definition {}, keeping the first", definition.name);
            return;
        }
        self.definitions.insert(definition.name.clone(), definition);
    }
}

impl<'ast> Visit<'ast> for DefinitionCollector {
    fn visit_item_struct(&mut self, item_struct: &'ast syn::ItemStruct) {
        let name = item_struct.ident.to_string();
        debug!("Parsing struct definition: {}", name);

        let mut fields = Vec::new();
        if let syn::Fields::Named(named_fields) = &item_struct.fields {
            for field in &named_fields.named {
                if let Some(field_def) = parse_field(field) {
                    fields.push(field_def);
                }
            }
        }

        self.insert(TypeDef {
            name,
            kind: TypeKind::Struct(StructDef { fields }),
        });
        visit::visit_item_struct(self, item_struct);
    }

    fn visit_item_enum(&mut self, item_enum: &'ast syn::ItemEnum) {
        let name = item_enum.ident.to_string();
        debug!("Parsing enum definition: {}", name);

        let variants = item_enum
            .variants
            .iter()
            .filter_map(|variant| {
                let attrs = parse_serde_attributes(&variant.attrs);
                if attrs.skip {
                    return None;
                }
                Some(attrs.rename.unwrap_or_else(|| variant.ident.to_string()))
            })
            .collect();

        self.insert(TypeDef {
            name,
            kind: TypeKind::Enum(EnumDef { variants }),
        });
        visit::visit_item_enum(self, item_enum);
    }
}

/// Parse a single named field; skipped fields yield `None`
fn parse_field(field: &syn::Field) -> Option<FieldDef> {
    let attrs = parse_serde_attributes(&field.attrs);
    if attrs.skip {
        return None;
    }
    let name = attrs.rename.unwrap_or(field.ident.as_ref()?.to_string());
    let ty = TypeRef::from_syn(&field.ty);
    let optional = ty.as_ref().is_some_and(|t| t.name == "Option");

    Some(FieldDef { name, ty, optional })
}

/// Parse `#[serde(rename = "...")]` and `#[serde(skip)]`
fn parse_serde_attributes(attrs: &[syn::Attribute]) -> SerdeAttributes {
    let mut serde_attrs = SerdeAttributes::default();

    for attr in attrs.iter().filter(|a| a.path().is_ident("serde")) {
        let parsed = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: syn::LitStr = meta.value()?.parse()?;
                serde_attrs.rename = Some(value.value());
            } else if meta.path.is_ident("skip") || meta.path.is_ident("skip_serializing") {
                serde_attrs.skip = true;
            } else if meta.input.peek(syn::Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            }
            Ok(())
        });
        if let Err(e) = parsed {
            debug!("Ignoring unparsable serde attribute: {}", e);
        }
    }

    serde_attrs
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn create_resolver_from_code(code: &str) -> TypeResolver {
        let parsed = ParsedFile {
            path: PathBuf::from("models.rs"),
            syntax_tree: syn::parse_file(code).unwrap(),
        };
        TypeResolver::new(&[parsed])
    }

    #[test]
    fn test_resolve_primitive_types() {
        let resolver = create_resolver_from_code("");
        for (name, expected) in [
            ("String", PrimitiveType::String),
            ("i64", PrimitiveType::I64),
            ("f32", PrimitiveType::F32),
            ("bool", PrimitiveType::Bool),
            ("Uuid", PrimitiveType::Uuid),
            ("DateTime", PrimitiveType::DateTime),
        ] {
            match resolver.resolve(name) {
                Some(ResolvedType::Primitive(p)) => assert_eq!(p, expected, "{}", name),
                other => panic!("expected primitive for {}, got {:?}", name, other),
            }
        }
    }

    #[test]
    fn test_resolve_simple_struct() {
        let resolver = create_resolver_from_code(
            r#"
            pub struct Pet {
                pub id: i64,
                pub name: String,
                pub tag: Option<String>,
            }
            "#,
        );

        let Some(ResolvedType::Definition(def)) = resolver.resolve("Pet") else {
            panic!("Pet should resolve to a definition");
        };
        let TypeKind::Struct(struct_def) = &def.kind else {
            panic!("Pet should be a struct");
        };
        assert_eq!(struct_def.fields.len(), 3);
        assert_eq!(struct_def.fields[0].name, "id");
        assert!(!struct_def.fields[0].optional);
        assert!(struct_def.fields[2].optional);
    }

    #[test]
    fn test_serde_rename_and_skip() {
        let resolver = create_resolver_from_code(
            r#"
            pub struct Order {
                #[serde(rename = "petId")]
                pub pet_id: i64,
                #[serde(skip)]
                pub internal: String,
                #[serde(default, skip_serializing_if = "Option::is_none")]
                pub ship_date: Option<String>,
            }
            "#,
        );

        let TypeKind::Struct(def) = &resolver.definition("Order").unwrap().kind else {
            panic!("Order should be a struct");
        };
        let names: Vec<_> = def.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["petId", "ship_date"]);
    }

    #[test]
    fn test_resolve_enum() {
        let resolver = create_resolver_from_code(
            r#"
            pub enum Status {
                #[serde(rename = "available")]
                Available,
                Pending,
                Sold,
            }
            "#,
        );

        let TypeKind::Enum(def) = &resolver.definition("Status").unwrap().kind else {
            panic!("Status should be an enum");
        };
        assert_eq!(def.variants, vec!["available", "Pending", "Sold"]);
    }

    #[test]
    fn test_definitions_inside_modules() {
        let resolver = create_resolver_from_code(
            r#"
            mod model {
                pub struct Category { pub id: i64 }
            }
            "#,
        );
        assert!(resolver.definition("Category").is_some());
        assert_eq!(resolver.len(), 1);
    }

    #[test]
    fn test_first_definition_wins() {
        let resolver = create_resolver_from_code(
            r#"
            pub struct Tag { pub id: i64 }
            mod other { pub struct Tag { pub a: i64, pub b: i64 } }
            "#,
        );
        let TypeKind::Struct(def) = &resolver.definition("Tag").unwrap().kind else {
            panic!("Tag should be a struct");
        };
        assert_eq!(def.fields.len(), 1);
    }

    #[test]
    fn test_resolve_nonexistent_type() {
        let resolver = create_resolver_from_code("pub struct Pet { pub id: i64 }");
        assert!(resolver.resolve("Unicorn").is_none());
    }
}
