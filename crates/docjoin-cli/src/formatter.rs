//! Output formatters for compiled pipelines.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use docjoin_proto::{LookupJoin, Pipeline, PipelineStage};

use crate::error::CliError;

/// Output format for pipelines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Compact JSON array of stage documents
    Json,
    /// Indented JSON array of stage documents
    Pretty,
    /// One table row per stage
    Table,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Pretty => write!(f, "pretty"),
            OutputFormat::Table => write!(f, "table"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter {
    /// Format a compiled pipeline.
    fn format_pipeline(&self, pipeline: &Pipeline) -> Result<String, CliError>;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Json => Box::new(JsonFormatter { pretty: false }),
        OutputFormat::Pretty => Box::new(JsonFormatter { pretty: true }),
        OutputFormat::Table => Box::new(TableFormatter),
    }
}

/// JSON formatter.
pub struct JsonFormatter {
    pretty: bool,
}

impl Formatter for JsonFormatter {
    fn format_pipeline(&self, pipeline: &Pipeline) -> Result<String, CliError> {
        Ok(pipeline.to_json(self.pretty)?)
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_pipeline(&self, pipeline: &Pipeline) -> Result<String, CliError> {
        if pipeline.is_empty() {
            return Ok("Empty pipeline".to_string());
        }

        let mut table = Table::new();
        table.set_header(vec!["#", "Stage", "Details"]);

        for (index, stage) in pipeline.stages().iter().enumerate() {
            table.add_row(vec![
                Cell::new(index),
                Cell::new(stage.kind()),
                Cell::new(summarize(stage)),
            ]);
        }

        Ok(format!("{}\n({} stages)", table, pipeline.len()))
    }
}

/// One-line description of a stage.
fn summarize(stage: &PipelineStage) -> String {
    match stage {
        PipelineStage::Lookup(lookup) => match &lookup.join {
            LookupJoin::Equality {
                local_field,
                foreign_field,
            } => format!(
                "{} on {} = {} as {}",
                lookup.from, local_field, foreign_field, lookup.as_field
            ),
            LookupJoin::Correlated { pipeline, .. } => format!(
                "{} via {}-stage sub-pipeline as {}",
                lookup.from,
                pipeline.len(),
                lookup.as_field
            ),
        },
        other => {
            let document = other.to_document();
            let key = format!("${}", other.kind());
            document
                .get(&key)
                .map(|body| body.to_string())
                .unwrap_or_default()
        }
    }
}
