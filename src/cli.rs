use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

impl From<OutputFormat> for crate::io::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Terminal => crate::io::OutputFormat::Terminal,
            OutputFormat::Json => crate::io::OutputFormat::Json,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "reportmap")]
#[command(about = "Static-analysis report aggregator for Fortran and shell projects", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Aggregate analyzer reports into hierarchical quality measures
    Analyze {
        /// Path to analyze
        path: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: OutputFormat,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Report subdirectory name, relative to each source file's directory
        #[arg(long)]
        report_subdir: Option<String>,

        /// Report file suffix appended to the source file name
        #[arg(long)]
        report_suffix: Option<String>,

        /// Comma-separated globs selecting source files
        #[arg(long)]
        patterns: Option<String>,

        /// Worker threads for file processing (0 = all cores)
        #[arg(long, default_value = "0")]
        jobs: usize,

        /// Process files sequentially
        #[arg(long)]
        no_parallel: bool,
    },
}
