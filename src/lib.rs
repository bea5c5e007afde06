// Export modules for library usage
pub mod aggregation;
pub mod cli;
pub mod config;
pub mod core;
pub mod io;
pub mod pipeline;
pub mod report;
pub mod store;

// Re-export commonly used types
pub use crate::core::{
    AggregationResults, ContainerNode, DiagnosticEvent, DiagnosticKind, Dialect, MeasureValue,
    RunSummary, Severity, SourceFile,
};

pub use crate::aggregation::{
    aggregate_file, function_stats, resolve_line, roll_up, FileOutcome, IssueCandidate,
};

pub use crate::config::{load_config, ReportmapConfig};

pub use crate::io::{create_writer, FileWalker, OutputFormat, OutputWriter};

pub use crate::report::{load_report, parse_report, ReportModel};

pub use crate::store::{DiagnosticsSink, MeasureStore, MemorySink};
