use crate::config::CONFIG_FILE_NAME;
use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks through a project directory to find
/// the Rust sources that define the models and the descriptor bundles that
/// describe the resources. It skips `target` and hidden directories (those
/// starting with `.`), the default config file and any path passed to
/// [`FileScanner::exclude`].
///
/// # Example
///
/// ```no_run
/// use swagger_from_resources::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} descriptor bundles", result.descriptor_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
    excluded: Vec<PathBuf>,
}

/// Result of directory scanning operation.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Paths of all discovered `.rs` files
    pub rust_files: Vec<PathBuf>,
    /// Paths of all `.yaml`, `.yml` and `.json` files except the project config
    pub descriptor_files: Vec<PathBuf>,
    /// Warning messages for any issues encountered (e.g., inaccessible directories)
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self {
            root_path,
            excluded: Vec::new(),
        }
    }

    /// Never reports `path`, e.g. an explicit config or the generated
    /// document living inside the project.
    pub fn exclude(mut self, path: &Path) -> Self {
        self.excluded.push(canonical(path));
        self
    }

    fn is_excluded(&self, path: &Path) -> bool {
        !self.excluded.is_empty() && self.excluded.contains(&canonical(path))
    }

    /// Scans the directory tree and collects model sources and descriptor
    /// bundles, sorted by path.
    ///
    /// Inaccessible entries are recorded as warnings and scanning continues.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            return Err(Error::InvalidArgument(format!(
                "not a directory: {}",
                self.root_path.display()
            )));
        }

        let mut result = ScanResult::default();
        for entry in WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.path() == self.root_path || !is_ignored(e.file_name().to_string_lossy().as_ref()))
        {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if !path.is_file() {
                        continue;
                    }
                    match path.extension().and_then(|s| s.to_str()) {
                        Some("rs") => result.rust_files.push(path.to_path_buf()),
                        Some("yaml" | "yml" | "json") if !is_config(path) => {
                            if self.is_excluded(path) {
                                debug!("Excluding {}", path.display());
                            } else {
                                result.descriptor_files.push(path.to_path_buf());
                            }
                        }
                        _ => {}
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    result.warnings.push(warning);
                }
            }
        }

        debug!(
            "Scanned {}: {} Rust files, {} descriptor bundles",
            self.root_path.display(),
            result.rust_files.len(),
            result.descriptor_files.len()
        );
        Ok(result)
    }
}

fn is_ignored(file_name: &str) -> bool {
    file_name.starts_with('.') || file_name == "target"
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn is_config(path: &Path) -> bool {
    path.file_name().and_then(|n| n.to_str()) == Some(CONFIG_FILE_NAME)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn file_names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect()
    }

    #[test]
    fn test_scan_collects_sources_and_bundles() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir_all(root.join("src/models")).unwrap();
        fs::create_dir(root.join("api")).unwrap();
        fs::write(root.join("src/lib.rs"), "pub mod models;").unwrap();
        fs::write(root.join("src/models/pet.rs"), "pub struct Pet {}").unwrap();
        fs::write(root.join("api/pets.yaml"), "resources: []").unwrap();
        fs::write(root.join("api/store.json"), "{}").unwrap();
        fs::write(root.join("readme.md"), "# README").unwrap();
        fs::write(root.join(CONFIG_FILE_NAME), "host: localhost").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(file_names(&result.rust_files), vec!["lib.rs", "pet.rs"]);
        assert_eq!(file_names(&result.descriptor_files), vec!["pets.yaml", "store.json"]);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_excluded_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::write(root.join("pets.yaml"), "resources: []").unwrap();
        fs::write(root.join("api.yaml"), "host: localhost").unwrap();
        fs::write(root.join("swagger.json"), "{}").unwrap();

        let result = FileScanner::new(root.to_path_buf())
            .exclude(&root.join("api.yaml"))
            .exclude(&root.join("swagger.json"))
            .exclude(&root.join("not-written-yet.yaml"))
            .scan()
            .unwrap();

        assert_eq!(file_names(&result.descriptor_files), vec!["pets.yaml"]);
    }

    #[test]
    fn test_scan_empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        let result = FileScanner::new(temp_dir.path().to_path_buf()).scan().unwrap();

        assert!(result.rust_files.is_empty());
        assert!(result.descriptor_files.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_scan_skips_target_and_hidden_directories() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();

        fs::create_dir(root.join("target")).unwrap();
        fs::write(root.join("target/build.rs"), "fn main() {}").unwrap();
        fs::create_dir(root.join(".github")).unwrap();
        fs::write(root.join(".github/ci.yml"), "on: push").unwrap();
        fs::write(root.join("main.rs"), "fn main() {}").unwrap();

        let result = FileScanner::new(root.to_path_buf()).scan().unwrap();

        assert_eq!(file_names(&result.rust_files), vec!["main.rs"]);
        assert!(result.descriptor_files.is_empty());
    }

    #[test]
    fn test_scan_rejects_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");
        assert!(matches!(
            FileScanner::new(missing).scan(),
            Err(Error::InvalidArgument(_))
        ));
    }
}
