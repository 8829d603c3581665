//! Swagger from resources - Swagger 2.0 documents from resource descriptors.
//!
//! Resources are described as plain data: class-level routing and
//! documentation metadata, and for each method its own annotations, the
//! annotations of the declarations it overrides, and its parameters. The
//! [`reader`] walks every top-level resource, follows sub-resource locators,
//! and compiles one [`document::SpecificationDocument`]. Models referenced by
//! the descriptors are resolved from the project's Rust sources.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans project directories for sources and descriptor bundles
//! 2. [`parser`] - Parses Rust sources into ASTs and loads descriptor bundles
//! 3. [`descriptor`] - Resource, method and parameter descriptors
//! 4. [`metadata`] - Effective method metadata across overridden declarations
//! 5. [`annotations`] - Normalizes annotation values into document fragments
//! 6. [`path_composer`] - Joins path fragments and extracts path-parameter patterns
//! 7. [`type_resolver`] and [`model_registry`] - Resolve Rust types into models
//! 8. [`type_classifier`] - Decides how a declared type is documented
//! 9. [`parameter_extractor`] - Turns declared parameters into document parameters
//! 10. [`verb`] - Resolves the HTTP verb of a method
//! 11. [`operation_builder`] - Builds one operation from a method
//! 12. [`reader`] - Reads resources, with sub-resource recursion, into the document
//! 13. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use swagger_from_resources::{
//!     descriptor::ResourceSet,
//!     document::{Info, SpecificationDocument},
//!     model_registry::SourceModelRegistry,
//!     parser::{AstParser, DescriptorLoader},
//!     reader::Reader,
//!     scanner::FileScanner,
//!     serializer::serialize_yaml,
//!     type_resolver::TypeResolver,
//! };
//! use std::path::PathBuf;
//!
//! let scan_result = FileScanner::new(PathBuf::from("./petstore")).scan().unwrap();
//!
//! let parsed_files: Vec<_> = AstParser::parse_files(&scan_result.rust_files)
//!     .into_iter()
//!     .filter_map(Result::ok)
//!     .collect();
//! let registry = SourceModelRegistry::new(TypeResolver::new(&parsed_files));
//!
//! let mut resources = ResourceSet::new();
//! for path in &scan_result.descriptor_files {
//!     resources.add_bundle(DescriptorLoader::load_file(path).unwrap());
//! }
//!
//! let mut reader = Reader::new(SpecificationDocument::new(Info::default()), &registry);
//! reader.read(&resources).unwrap();
//!
//! println!("{}", serialize_yaml(reader.document()).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module which provides a complete CLI application.

pub mod annotations;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod document;
pub mod error;
pub mod metadata;
pub mod model_registry;
pub mod operation_builder;
pub mod parameter_extractor;
pub mod parser;
pub mod path_composer;
pub mod reader;
pub mod scanner;
pub mod schema;
pub mod serializer;
pub mod type_classifier;
pub mod type_ref;
pub mod type_resolver;
pub mod verb;
