use crate::descriptor::DescriptorBundle;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// AST parser for the Rust sources that define the documented models.
///
/// # Example
///
/// ```no_run
/// use swagger_from_resources::parser::AstParser;
/// use std::path::Path;
///
/// let parsed = AstParser::parse_file(Path::new("src/model.rs")).unwrap();
/// println!("Parsed {} items", parsed.syntax_tree.items.len());
/// ```
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid Rust
    /// syntax.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse_source(path, &content)
    }

    /// Parses Rust source text, attributing errors to `path`.
    pub fn parse_source(path: &Path, content: &str) -> Result<ParsedFile> {
        let syntax_tree = syn::parse_file(content).map_err(|e| Error::ParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses multiple Rust source files, continuing even if some fail.
    ///
    /// Failures are logged as warnings so that models from the remaining
    /// files can still be documented.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).inspect_err(|e| warn!("Failed to parse {}: {}", path.display(), e))
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}

/// Loader for resource descriptor bundles in YAML or JSON.
pub struct DescriptorLoader;

impl DescriptorLoader {
    /// Loads one bundle, choosing the format from the file extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DescriptorError`] when the file is not a valid bundle;
    /// a bundle naming a type in invalid syntax is rejected here as well.
    pub fn load_file(path: &Path) -> Result<DescriptorBundle> {
        debug!("Loading descriptor bundle: {}", path.display());
        let content = fs::read_to_string(path)?;
        let is_json = path.extension().and_then(|e| e.to_str()) == Some("json");
        Self::load_str(path, &content, is_json)
    }

    pub fn load_str(path: &Path, content: &str, is_json: bool) -> Result<DescriptorBundle> {
        let descriptor_error = |message: String| Error::DescriptorError {
            file: path.to_path_buf(),
            message,
        };
        let bundle: DescriptorBundle = if is_json {
            serde_json::from_str(content).map_err(|e| descriptor_error(e.to_string()))?
        } else {
            serde_yaml::from_str(content).map_err(|e| descriptor_error(e.to_string()))?
        };
        debug!(
            "Loaded {} resources, {} sub-resources, {} beans, {} tags from {}",
            bundle.resources.len(),
            bundle.sub_resources.len(),
            bundle.beans.len(),
            bundle.tags.len(),
            path.display()
        );
        Ok(bundle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    /// Helper function to create a temporary file with content
    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        let mut file = fs::File::create(&file_path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file_path
    }

    #[test]
    fn test_parse_valid_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(&temp_dir, "model.rs", "pub struct Pet { pub id: i64 }");

        let parsed = AstParser::parse_file(&path).unwrap();
        assert_eq!(parsed.path, path);
        assert_eq!(parsed.syntax_tree.items.len(), 1);
    }

    #[test]
    fn test_parse_invalid_syntax() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(&temp_dir, "broken.rs", "pub struct Pet { id: }");

        match AstParser::parse_file(&path) {
            Err(Error::ParseError { file, .. }) => assert_eq!(file, path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_files_continues_after_failure() {
        let temp_dir = TempDir::new().unwrap();
        let good = create_temp_file(&temp_dir, "good.rs", "pub enum Status { Sold }");
        let bad = create_temp_file(&temp_dir, "bad.rs", "fn (");
        let missing = temp_dir.path().join("missing.rs");

        let results = AstParser::parse_files(&[good, bad, missing]);
        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert!(matches!(results[2], Err(Error::IoError(_))));
    }

    #[test]
    fn test_load_yaml_bundle() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(
            &temp_dir,
            "pets.yaml",
            r#"
resources:
  - name: PetResource
    api: { value: /pet }
    path: /pet
    methods:
      - name: list
        verb: get
        operation: { value: List pets }
        return_type: Vec<Pet>
"#,
        );

        let bundle = DescriptorLoader::load_file(&path).unwrap();
        assert_eq!(bundle.resources.len(), 1);
        assert_eq!(bundle.resources[0].methods[0].return_type.to_string(), "Vec<Pet>");
    }

    #[test]
    fn test_load_json_bundle() {
        let temp_dir = TempDir::new().unwrap();
        let path = create_temp_file(
            &temp_dir,
            "store.json",
            r#"{ "resources": [{ "name": "StoreResource", "path": "/store" }], "tags": [{ "name": "store" }] }"#,
        );

        let bundle = DescriptorLoader::load_file(&path).unwrap();
        assert_eq!(bundle.resources[0].path.as_deref(), Some("/store"));
        assert_eq!(bundle.tags[0].name, "store");
    }

    #[test]
    fn test_load_bundle_with_invalid_type() {
        let result = DescriptorLoader::load_str(
            Path::new("bad.yaml"),
            "resources:\n  - name: R\n    methods:\n      - name: m\n        return_type: \"Vec<\"\n",
            false,
        );
        assert!(matches!(result, Err(Error::DescriptorError { .. })));
    }
}
