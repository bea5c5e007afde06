//! Output writers for aggregation results.

use colored::*;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use crate::core::{AggregationResults, Severity};

#[derive(Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

pub trait OutputWriter {
    fn write_results(&mut self, results: &AggregationResults) -> anyhow::Result<()>;
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_results(&mut self, results: &AggregationResults) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_results(&mut self, results: &AggregationResults) -> anyhow::Result<()> {
        writeln!(
            self.writer,
            "{} {}",
            "Aggregated measures for".bold(),
            results.project_path.display()
        )?;
        writeln!(
            self.writer,
            "{} files scanned, {} reports parsed, {} files with errors",
            results.summary.files_scanned,
            results.summary.reports_parsed,
            results.summary.files_with_errors
        )?;
        writeln!(self.writer)?;

        for (node, measures) in &results.measures {
            let label = if node.is_empty() { "<project>" } else { node };
            writeln!(self.writer, "{}", label.bold())?;
            for (metric, value) in measures {
                writeln!(self.writer, "  {metric} = {value}")?;
            }
        }

        if !results.diagnostics.is_empty() {
            writeln!(self.writer)?;
            writeln!(self.writer, "{}", "Diagnostics".bold())?;
            for event in &results.diagnostics {
                let tag = match event.severity() {
                    Severity::Error => "error".red().to_string(),
                    Severity::Warning => "warning".yellow().to_string(),
                };
                writeln!(self.writer, "  [{tag}] {}: {}", event.file, event.detail)?;
            }
        }

        Ok(())
    }
}

pub fn create_writer(
    format: OutputFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<Box<dyn OutputWriter>> {
    let writer: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    Ok(match format {
        OutputFormat::Json => Box::new(JsonWriter::new(writer)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(writer)),
    })
}
