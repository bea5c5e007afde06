//! Per-file aggregation: statistics over a report's function-level measures,
//! the module-scalar fallback, and dialect-routed storage into metric
//! buckets.

use std::path::PathBuf;

use crate::core::metrics::{metric_key, MetricFamily, SubMetric};
use crate::core::{DiagnosticEvent, DiagnosticKind, Dialect, MeasureValue, SourceFile};
use crate::report::model::{FunctionRecord, ReportModel, NOT_A_NUMBER};

/// Everything one file contributes to the run: measures keyed by metric,
/// diagnostics, and issue candidates. Produced independently per file so
/// files can be processed in parallel with no shared state.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileOutcome {
    pub node_id: String,
    pub measures: Vec<(String, MeasureValue)>,
    pub diagnostics: Vec<DiagnosticEvent>,
    pub issues: Vec<IssueCandidate>,
    pub report_parsed: bool,
}

impl FileOutcome {
    /// Outcome for a file whose report failed integrity or parsing checks:
    /// a single diagnostic, no measures.
    pub fn from_report_failure(node_id: String, event: DiagnosticEvent) -> Self {
        Self {
            node_id,
            diagnostics: vec![event],
            ..Self::default()
        }
    }
}

/// A would-be issue derived from one function-level record. Emission is the
/// host platform's responsibility; candidates are produced, counted, and
/// dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IssueCandidate {
    pub file: PathBuf,
    pub function: String,
    pub line: usize,
    pub message: String,
}

/// Statistics folded over one metric section's function records.
/// Records whose value does not coerce to a finite number are excluded and
/// reported, never fatal.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionStats {
    pub sum: f64,
    /// sum / coerced count; equals the (zero) sum when nothing coerced
    pub mean: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub coerced: usize,
    /// Raw values that failed coercion, in record order
    pub invalid: Vec<String>,
}

pub fn function_stats(records: &[FunctionRecord]) -> FunctionStats {
    let (sum, min, max, coerced, invalid) = records.iter().fold(
        (0.0_f64, None::<f64>, None::<f64>, 0_usize, Vec::new()),
        |(sum, min, max, coerced, mut invalid), record| {
            match coerce(&record.value) {
                Some(value) => (
                    sum + value,
                    Some(min.map_or(value, |m| m.min(value))),
                    Some(max.map_or(value, |m| m.max(value))),
                    coerced + 1,
                    invalid,
                ),
                None => {
                    invalid.push(record.value.clone());
                    (sum, min, max, coerced, invalid)
                }
            }
        },
    );

    let mean = if coerced > 0 { sum / coerced as f64 } else { sum };
    FunctionStats {
        sum,
        mean,
        min,
        max,
        coerced,
        invalid,
    }
}

// NaN and infinities count as failed coercion; they would poison the fold.
fn coerce(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Resolve a raw line reference against the file's line count.
///
/// Unparsable (or absent) input is invalid and yields `None`, distinct from
/// merely out-of-range values, which clamp into `[1, total_lines]`.
pub fn resolve_line(raw: Option<&str>, total_lines: usize) -> Option<usize> {
    let parsed: i64 = raw?.trim().parse().ok()?;
    if parsed < 1 {
        Some(1)
    } else if parsed as usize > total_lines {
        Some(total_lines)
    } else {
        Some(parsed as usize)
    }
}

/// Module-level values routed into a dialect's metric bucket.
#[derive(Clone, Debug, PartialEq)]
struct ModuleMeasures {
    scalar: i64,
    mean: f64,
    min: Option<f64>,
    max: Option<f64>,
}

type StoreHandler = fn(&mut Vec<(String, MeasureValue)>, MetricFamily, &ModuleMeasures);

// One routing function per dialect, selected by lookup rather than a chain
// of type tests.
fn store_handler(dialect: Dialect) -> StoreHandler {
    match dialect {
        Dialect::F77 => store_f77,
        Dialect::F90 => store_f90,
        Dialect::Shell => store_shell,
    }
}

fn store_f77(out: &mut Vec<(String, MeasureValue)>, family: MetricFamily, m: &ModuleMeasures) {
    store_bucket(out, Dialect::F77, family, m);
}

fn store_f90(out: &mut Vec<(String, MeasureValue)>, family: MetricFamily, m: &ModuleMeasures) {
    store_bucket(out, Dialect::F90, family, m);
}

/// The analyzer defines no module-level metric destinations for the shell
/// dialect; routing is a deliberate no-op until one exists.
fn store_shell(_out: &mut Vec<(String, MeasureValue)>, family: MetricFamily, _m: &ModuleMeasures) {
    log::debug!("no metric destination for shell dialect ({})", family.id());
}

fn store_bucket(
    out: &mut Vec<(String, MeasureValue)>,
    dialect: Dialect,
    family: MetricFamily,
    m: &ModuleMeasures,
) {
    out.push((
        metric_key(dialect, family, SubMetric::Raw),
        MeasureValue::Int(m.scalar),
    ));
    out.push((
        metric_key(dialect, family, SubMetric::Mean),
        MeasureValue::Float(m.mean),
    ));
    if let Some(min) = m.min {
        out.push((
            metric_key(dialect, family, SubMetric::Min),
            MeasureValue::Int(min.trunc() as i64),
        ));
    }
    if let Some(max) = m.max {
        out.push((
            metric_key(dialect, family, SubMetric::Max),
            MeasureValue::Int(max.trunc() as i64),
        ));
    }
}

/// Aggregate one source file's parsed report into its file-level measures,
/// diagnostics, and issue candidates.
pub fn aggregate_file(source: &SourceFile, report: &ReportModel) -> FileOutcome {
    let node_id = source.node_id();
    let mut measures = Vec::new();
    let mut diagnostics = Vec::new();
    let handler = store_handler(report.dialect());

    for family in MetricFamily::ALL {
        let Some(section) = report.section(family) else {
            continue;
        };

        let stats = function_stats(&section.functions);
        for raw in &stats.invalid {
            diagnostics.push(DiagnosticEvent::new(
                DiagnosticKind::InvalidMeasureValue,
                &node_id,
                format!("no {} measure: {raw}", family.id()),
            ));
        }

        let scalar = module_scalar(&section.module_value, &stats, family, &node_id, &mut diagnostics);
        handler(
            &mut measures,
            family,
            &ModuleMeasures {
                scalar,
                mean: stats.mean,
                min: stats.min,
                max: stats.max,
            },
        );
    }

    let issues = issue_candidates(source, report, &mut diagnostics);

    FileOutcome {
        node_id,
        measures,
        diagnostics,
        issues,
        report_parsed: true,
    }
}

// The analyzer does not always supply a module-level value; the sentinel is
// replaced by the truncated function sum. A declared value is kept verbatim
// and noted, since module-level scalars from the analyzer are unexpected.
fn module_scalar(
    raw: &str,
    stats: &FunctionStats,
    family: MetricFamily,
    node_id: &str,
    diagnostics: &mut Vec<DiagnosticEvent>,
) -> i64 {
    let raw = raw.trim();
    if raw == NOT_A_NUMBER {
        return stats.sum.trunc() as i64;
    }
    match coerce(raw) {
        Some(value) => {
            diagnostics.push(DiagnosticEvent::new(
                DiagnosticKind::ModuleScalarProvided,
                node_id,
                format!("analyzer supplied a module-level {} value: {raw}", family.id()),
            ));
            value.trunc() as i64
        }
        None => {
            diagnostics.push(DiagnosticEvent::new(
                DiagnosticKind::InvalidMeasureValue,
                node_id,
                format!("invalid module-level {} value: {raw}", family.id()),
            ));
            stats.sum.trunc() as i64
        }
    }
}

fn issue_candidates(
    source: &SourceFile,
    report: &ReportModel,
    diagnostics: &mut Vec<DiagnosticEvent>,
) -> Vec<IssueCandidate> {
    let Some(section) = report.section(MetricFamily::Complexity) else {
        return Vec::new();
    };

    section
        .functions
        .iter()
        .filter_map(|record| match resolve_line(record.line.as_deref(), source.lines) {
            Some(line) => Some(IssueCandidate {
                file: source.relative_path.clone(),
                function: record.name.clone(),
                line,
                message: record.value.clone(),
            }),
            None => {
                diagnostics.push(DiagnosticEvent::new(
                    DiagnosticKind::InvalidLineReference,
                    source.node_id(),
                    format!(
                        "skipping invalid line reference: {}",
                        record.line.as_deref().unwrap_or("<none>")
                    ),
                ));
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::MetricSection;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn source(rel: &str, lines: usize) -> SourceFile {
        SourceFile {
            path: PathBuf::from("/project").join(rel),
            relative_path: PathBuf::from(rel),
            lines,
            dialect: Dialect::from_path(Path::new(rel)),
        }
    }

    fn records(values: &[&str]) -> Vec<FunctionRecord> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| FunctionRecord {
                name: format!("f{i}"),
                value: v.to_string(),
                line: Some((i + 1).to_string()),
            })
            .collect()
    }

    fn measure<'a>(outcome: &'a FileOutcome, key: &str) -> Option<&'a MeasureValue> {
        outcome
            .measures
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    #[test]
    fn coercion_tolerance() {
        let stats = function_stats(&records(&["3", "x", "5"]));

        assert_eq!(stats.sum, 8.0);
        assert_eq!(stats.mean, 4.0);
        assert_eq!(stats.min, Some(3.0));
        assert_eq!(stats.max, Some(5.0));
        assert_eq!(stats.coerced, 2);
        assert_eq!(stats.invalid, vec!["x".to_string()]);
    }

    #[test]
    fn stats_are_order_independent() {
        let forward = function_stats(&records(&["1", "9", "4"]));
        let backward = function_stats(&records(&["4", "9", "1"]));

        assert_eq!(forward.min, backward.min);
        assert_eq!(forward.max, backward.max);
        assert_eq!(forward.sum, backward.sum);
    }

    #[test]
    fn all_equal_values_give_equal_extrema() {
        let stats = function_stats(&records(&["7", "7", "7"]));
        assert_eq!(stats.min, Some(7.0));
        assert_eq!(stats.max, Some(7.0));
        assert_eq!(stats.mean, 7.0);
    }

    #[test]
    fn zero_coerced_records_yield_zero_sum_and_no_extrema() {
        let stats = function_stats(&records(&["x", "y"]));
        assert_eq!(stats.sum, 0.0);
        assert_eq!(stats.mean, 0.0);
        assert_eq!(stats.min, None);
        assert_eq!(stats.max, None);
        assert_eq!(stats.invalid.len(), 2);
    }

    #[test]
    fn nan_values_count_as_invalid() {
        let stats = function_stats(&records(&["NaN", "3"]));
        assert_eq!(stats.sum, 3.0);
        assert_eq!(stats.coerced, 1);
        assert_eq!(stats.invalid, vec!["NaN".to_string()]);
    }

    #[test]
    fn line_clamping() {
        assert_eq!(resolve_line(Some("0"), 50), Some(1));
        assert_eq!(resolve_line(Some("75"), 50), Some(50));
        assert_eq!(resolve_line(Some("23"), 50), Some(23));
        assert_eq!(resolve_line(Some("abc"), 50), None);
        assert_eq!(resolve_line(Some(""), 50), None);
        assert_eq!(resolve_line(None, 50), None);
        assert_eq!(resolve_line(Some("-4"), 50), Some(1));
    }

    #[test]
    fn module_scalar_fallback_replaces_the_sentinel() {
        let report = ReportModel::new(Dialect::F90).with_section(
            MetricFamily::Complexity,
            MetricSection::new(NOT_A_NUMBER)
                .with_function("a", "5", Some("1"))
                .with_function("b", "7", Some("2")),
        );
        let outcome = aggregate_file(&source("a.f90", 100), &report);

        assert_eq!(
            measure(&outcome, "f90_complexity"),
            Some(&MeasureValue::Int(12))
        );
        assert!(!outcome
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::ModuleScalarProvided));
    }

    #[test]
    fn declared_module_scalar_is_kept_verbatim() {
        let report = ReportModel::new(Dialect::F90).with_section(
            MetricFamily::Complexity,
            MetricSection::new("7")
                .with_function("a", "5", Some("1"))
                .with_function("b", "7", Some("2")),
        );
        let outcome = aggregate_file(&source("a.f90", 100), &report);

        // 7, not the computed sum of 12
        assert_eq!(
            measure(&outcome, "f90_complexity"),
            Some(&MeasureValue::Int(7))
        );
        assert!(outcome
            .diagnostics
            .iter()
            .any(|d| d.kind == DiagnosticKind::ModuleScalarProvided));
    }

    #[test]
    fn f77_reports_route_into_f77_buckets() {
        let report = ReportModel::new(Dialect::F77).with_section(
            MetricFamily::Loc,
            MetricSection::new(NOT_A_NUMBER)
                .with_function("a", "10", Some("1"))
                .with_function("b", "20", Some("5")),
        );
        let outcome = aggregate_file(&source("a.f", 30), &report);

        assert_eq!(measure(&outcome, "f77_loc"), Some(&MeasureValue::Int(30)));
        assert_eq!(
            measure(&outcome, "f77_loc_mean"),
            Some(&MeasureValue::Float(15.0))
        );
        assert_eq!(measure(&outcome, "f77_loc_min"), Some(&MeasureValue::Int(10)));
        assert_eq!(measure(&outcome, "f77_loc_max"), Some(&MeasureValue::Int(20)));
        assert!(measure(&outcome, "f90_loc").is_none());
    }

    #[test]
    fn shell_routing_is_a_no_op() {
        let report = ReportModel::new(Dialect::Shell).with_section(
            MetricFamily::Complexity,
            MetricSection::new(NOT_A_NUMBER).with_function("f", "3", Some("1")),
        );
        let outcome = aggregate_file(&source("run.sh", 10), &report);

        assert!(outcome.measures.is_empty());
        // issue candidates are still produced for the records
        assert_eq!(outcome.issues.len(), 1);
    }

    #[test]
    fn invalid_record_still_lets_later_records_complete() {
        let report = ReportModel::new(Dialect::F90).with_section(
            MetricFamily::Complexity,
            MetricSection::new(NOT_A_NUMBER)
                .with_function("a", "3", Some("1"))
                .with_function("b", "x", Some("2"))
                .with_function("c", "5", Some("3")),
        );
        let outcome = aggregate_file(&source("a.f90", 100), &report);

        assert_eq!(measure(&outcome, "f90_complexity"), Some(&MeasureValue::Int(8)));
        assert_eq!(
            measure(&outcome, "f90_complexity_mean"),
            Some(&MeasureValue::Float(4.0))
        );
        assert_eq!(
            measure(&outcome, "f90_complexity_min"),
            Some(&MeasureValue::Int(3))
        );
        assert_eq!(
            measure(&outcome, "f90_complexity_max"),
            Some(&MeasureValue::Int(5))
        );
        assert_eq!(
            outcome
                .diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::InvalidMeasureValue)
                .count(),
            1
        );
    }

    #[test]
    fn zero_coerced_records_emit_no_extrema_measures() {
        let report = ReportModel::new(Dialect::F90).with_section(
            MetricFamily::Complexity,
            MetricSection::new(NOT_A_NUMBER).with_function("a", "x", Some("1")),
        );
        let outcome = aggregate_file(&source("a.f90", 100), &report);

        assert_eq!(measure(&outcome, "f90_complexity"), Some(&MeasureValue::Int(0)));
        assert_eq!(
            measure(&outcome, "f90_complexity_mean"),
            Some(&MeasureValue::Float(0.0))
        );
        assert!(measure(&outcome, "f90_complexity_min").is_none());
        assert!(measure(&outcome, "f90_complexity_max").is_none());
    }

    #[test]
    fn issue_candidates_resolve_and_clamp_lines() {
        let report = ReportModel::new(Dialect::F90).with_section(
            MetricFamily::Complexity,
            MetricSection::new(NOT_A_NUMBER)
                .with_function("a", "3", Some("0"))
                .with_function("b", "4", Some("75"))
                .with_function("c", "5", Some("oops"))
                .with_function("d", "6", None),
        );
        let outcome = aggregate_file(&source("a.f90", 50), &report);

        assert_eq!(outcome.issues.len(), 2);
        assert_eq!(outcome.issues[0].line, 1);
        assert_eq!(outcome.issues[1].line, 50);
        assert_eq!(
            outcome
                .diagnostics
                .iter()
                .filter(|d| d.kind == DiagnosticKind::InvalidLineReference)
                .count(),
            2
        );
    }
}
