use crate::config::GeneratorConfig;
use crate::descriptor::ResourceSet;
use crate::document::SpecificationDocument;
use crate::model_registry::SourceModelRegistry;
use crate::parser::{AstParser, DescriptorLoader, ParsedFile};
use crate::reader::Reader;
use crate::scanner::FileScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use crate::type_resolver::TypeResolver;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Swagger from resources - generate a Swagger 2.0 document from resource
/// descriptors and the Rust models they reference
#[derive(Parser, Debug)]
#[command(name = "swagger-from-resources")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the project directory
    #[arg(value_name = "PROJECT_PATH")]
    pub project_path: PathBuf,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// Project config file (defaults to swagger-from-resources.yaml in the project)
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project_path.exists() {
        anyhow::bail!("Project path does not exist: {}", args.project_path.display());
    }
    if !args.project_path.is_dir() {
        anyhow::bail!("Project path is not a directory: {}", args.project_path.display());
    }
    if let Some(config) = &args.config_path {
        if !config.is_file() {
            anyhow::bail!("Config file does not exist: {}", config.display());
        }
    }

    info!("Project path: {}", args.project_path.display());
    info!("Output format: {:?}", args.output_format);
    match &args.output_path {
        Some(output) => info!("Output file: {}", output.display()),
        None => info!("Output: stdout"),
    }

    Ok(args)
}

/// Scans `project_path` and reads every descriptor bundle found there into a
/// document seeded from `config`. Files in `excluded` are never loaded as
/// bundles.
pub fn generate(project_path: &Path, config: &GeneratorConfig, excluded: &[&Path]) -> Result<SpecificationDocument> {
    info!("Scanning project directory...");
    let scanner = excluded
        .iter()
        .fold(FileScanner::new(project_path.to_path_buf()), |scanner, path| scanner.exclude(path));
    let scan_result = scanner.scan()?;
    info!(
        "Found {} Rust files and {} descriptor bundles",
        scan_result.rust_files.len(),
        scan_result.descriptor_files.len()
    );

    if scan_result.descriptor_files.is_empty() {
        anyhow::bail!("No resource descriptor bundles found in the project directory");
    }

    info!("Parsing Rust files...");
    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.rust_files)
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    info!("Successfully parsed {} files", parsed_files.len());

    info!("Loading resource descriptors...");
    let mut resources = ResourceSet::new();
    for path in &scan_result.descriptor_files {
        let bundle = DescriptorLoader::load_file(path)
            .with_context(|| format!("Failed to load descriptor bundle {}", path.display()))?;
        resources.add_bundle(bundle);
    }
    if resources.is_empty() {
        warn!("No top-level resources declared");
    }

    let registry = SourceModelRegistry::new(TypeResolver::new(&parsed_files));
    let mut reader = Reader::new(config.to_document(), &registry);
    reader.read(&resources).context("Failed to read resources")?;
    let document = reader.into_document();

    info!(
        "Document has {} paths, {} models, {} tags",
        document.paths.len(),
        document.definitions.len(),
        document.tags.len()
    );
    Ok(document)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting Swagger document generation...");

    let config = GeneratorConfig::discover(&args.project_path, args.config_path.as_deref())
        .context("Failed to load project config")?;
    // Neither the config nor a previous output is a descriptor bundle.
    let excluded: Vec<&Path> = args
        .config_path
        .iter()
        .chain(&args.output_path)
        .map(PathBuf::as_path)
        .collect();
    let document = generate(&args.project_path, &config, &excluded)?;

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    match &args.output_path {
        Some(output_path) => {
            info!("Writing output to: {}", output_path.display());
            write_to_file(&content, output_path)?;
        }
        None => println!("{}", content),
    }

    info!("Generation complete!");
    Ok(())
}
