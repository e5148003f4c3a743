//! docjoin Command-Line Compiler
//!
//! Compiles a filter spec against a schema file and prints the resulting
//! aggregation pipeline.

mod error;
mod formatter;

use clap::Parser;
use docjoin_core::catalog::{Catalog, SchemaBundle};
use docjoin_core::query::{CompilerConfig, PipelineCompiler};
use docjoin_proto::FilterSpec;
use error::{read_input, CliError};
use formatter::OutputFormat;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// docjoin Command-Line Compiler
#[derive(Parser, Debug)]
#[command(name = "docjoin")]
#[command(version, about = "Compile relational filters into aggregation pipelines")]
pub struct Args {
    /// Schema file (JSON model registry)
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Root model to query
    #[arg(short, long)]
    pub model: String,

    /// Filter spec file
    #[arg(short, long, conflicts_with = "command")]
    pub filter: Option<PathBuf>,

    /// Inline filter spec JSON
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Compiler configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "pretty", value_enum)]
    pub format: OutputFormat,
}

fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docjoin_cli=info")),
        )
        .init();

    let args = Args::parse();

    match run(&args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Load the inputs named by `args`, compile, and format the pipeline.
fn run(args: &Args) -> Result<String, CliError> {
    let schema = SchemaBundle::from_json(&read_input(&args.schema)?)?;
    let spec = load_filter(args)?;
    let config = match &args.config {
        Some(path) => CompilerConfig::from_json(&read_input(path)?).map_err(CliError::Config)?,
        None => CompilerConfig::default(),
    };

    let catalog = Catalog::with_schema(schema)?;
    let snapshot = catalog.snapshot();
    debug!(models = ?snapshot.model_names(), "Loaded schema");
    info!(
        model = %args.model,
        schema_version = snapshot.version,
        "Compiling filter"
    );

    let pipeline = PipelineCompiler::new(&*snapshot)
        .with_config(config)
        .compile_model(&args.model, &spec)?;
    debug!(stages = pipeline.len(), "Compiled pipeline");

    formatter::create_formatter(args.format).format_pipeline(&pipeline)
}

/// The filter spec from `-c`, `--filter`, or an empty spec.
fn load_filter(args: &Args) -> Result<FilterSpec, CliError> {
    let spec = if let Some(command) = &args.command {
        FilterSpec::from_json(command)?
    } else if let Some(path) = &args.filter {
        FilterSpec::from_json(&read_input(path)?)?
    } else {
        FilterSpec::new()
    };
    Ok(spec)
}
