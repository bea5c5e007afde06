pub mod model;
pub mod parser;

pub use model::{FunctionRecord, MetricSection, ReportModel, NOT_A_NUMBER};
pub use parser::{load_report, locate_report, parse_report, report_path, LEGACY_REPORT_SUBDIR};
