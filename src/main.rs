//! Swagger from resources - command-line tool for generating Swagger 2.0
//! documents.
//!
//! The tool reads the resource descriptor bundles (`*.yaml`, `*.yml`,
//! `*.json`) of a project together with the Rust sources defining the models
//! they reference, and writes one Swagger document.
//!
//! # Usage
//!
//! ```bash
//! swagger-from-resources [OPTIONS] <PROJECT_PATH>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! swagger-from-resources ./petstore -o swagger.yaml
//! ```
//!
//! Generate JSON documentation with an explicit config:
//! ```bash
//! swagger-from-resources ./petstore -c api.yaml -f json -o swagger.json
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use swagger_from_resources::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env().filter_level(log_level).init();

    info!("Swagger from resources starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    info!("Swagger document generation completed successfully");

    Ok(())
}
