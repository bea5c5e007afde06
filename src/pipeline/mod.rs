//! End-to-end aggregation pipeline.
//!
//! Per-file work (locate, parse, coerce, aggregate) runs in parallel with no
//! shared state; outcomes are merged into the store sequentially, and only
//! then does the bottom-up hierarchy pass start, so every container sees its
//! children's final measures.

use chrono::Utc;
use rayon::prelude::*;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;

use crate::aggregation::{aggregate_file, roll_up, FileOutcome, IssueCandidate};
use crate::config::ReportmapConfig;
use crate::core::errors::Result;
use crate::core::metrics::{ERROR_COUNT, REPORT_ERRORS, REPORT_WARNINGS, WARNING_COUNT};
use crate::core::{
    AggregationResults, ContainerNode, DiagnosticEvent, DiagnosticKind, MeasureValue, RunSummary,
    Severity, SourceFile,
};
use crate::io::FileWalker;
use crate::report::load_report;
use crate::store::{DiagnosticsSink, MeasureStore, MemorySink};

/// Run the full pipeline with an internal sink; diagnostics still appear in
/// the returned results.
pub fn run(root: &Path, config: &ReportmapConfig, parallel: bool) -> Result<AggregationResults> {
    let mut sink = MemorySink::new();
    run_with_sink(root, config, parallel, &mut sink)
}

/// Run the full pipeline, streaming each consolidated diagnostic into the
/// given sink as it is produced.
pub fn run_with_sink(
    root: &Path,
    config: &ReportmapConfig,
    parallel: bool,
    sink: &mut dyn DiagnosticsSink,
) -> Result<AggregationResults> {
    let files = FileWalker::new(root.to_path_buf())
        .with_patterns(config.patterns())
        .walk()?;
    log::info!("aggregating reports for {} source files", files.len());

    let outcomes: Vec<FileOutcome> = if parallel {
        files
            .par_iter()
            .map(|file| process_file(file, config))
            .collect()
    } else {
        files
            .iter()
            .map(|file| process_file(file, config))
            .collect()
    };

    let mut store = MeasureStore::new();
    let mut diagnostics = Vec::new();
    let mut reports_parsed = 0;
    let mut files_with_errors = 0;
    let mut issue_candidates = 0;

    for outcome in outcomes {
        if outcome.report_parsed {
            reports_parsed += 1;
        }
        for (metric, value) in &outcome.measures {
            store.insert(&outcome.node_id, metric, value.clone());
        }
        issue_candidates += emit_issues(&outcome.issues);

        let consolidated = consolidate(outcome.diagnostics);
        record_diagnostic_measures(&mut store, &outcome.node_id, &consolidated);
        if consolidated
            .iter()
            .any(|event| event.severity() == Severity::Error)
        {
            files_with_errors += 1;
        }
        for event in consolidated {
            sink.emit(event.clone());
            diagnostics.push(event);
        }
    }

    if issue_candidates > 0 {
        log::debug!("{issue_candidates} issue candidates produced, emission left to the host");
    }

    let tree = ContainerNode::build(&files);
    roll_up(&tree, &mut store);

    Ok(AggregationResults {
        project_path: root.to_path_buf(),
        timestamp: Utc::now(),
        measures: store.into_inner(),
        diagnostics,
        summary: RunSummary {
            files_scanned: files.len(),
            reports_parsed,
            files_with_errors,
        },
    })
}

// A failing report is a terminal outcome for this file's measures, recorded
// once; siblings and ancestors are unaffected.
fn process_file(file: &SourceFile, config: &ReportmapConfig) -> FileOutcome {
    match load_report(&file.path, &config.report_subdir, &config.report_suffix) {
        Ok(report) => aggregate_file(file, &report),
        Err(err) => {
            let event = DiagnosticEvent::new(err.kind(), file.node_id(), err.to_string());
            FileOutcome::from_report_failure(file.node_id(), event)
        }
    }
}

/// Issue emission belongs to the host platform; candidates are counted and
/// dropped here.
fn emit_issues(issues: &[IssueCandidate]) -> usize {
    issues.len()
}

/// Exactly one surfaced record per file per diagnostic kind: repeats merge
/// their details into the first occurrence.
fn consolidate(events: Vec<DiagnosticEvent>) -> Vec<DiagnosticEvent> {
    let mut order: Vec<DiagnosticKind> = Vec::new();
    let mut merged: HashMap<DiagnosticKind, DiagnosticEvent> = HashMap::new();

    for event in events {
        match merged.entry(event.kind) {
            Entry::Vacant(slot) => {
                order.push(event.kind);
                slot.insert(event);
            }
            Entry::Occupied(mut slot) => {
                let existing = slot.get_mut();
                if !existing.detail.contains(&event.detail) {
                    existing.detail.push_str("; ");
                    existing.detail.push_str(&event.detail);
                }
            }
        }
    }

    order.into_iter().filter_map(|k| merged.remove(&k)).collect()
}

fn record_diagnostic_measures(
    store: &mut MeasureStore,
    node_id: &str,
    consolidated: &[DiagnosticEvent],
) {
    let (errors, warnings): (Vec<&DiagnosticEvent>, Vec<&DiagnosticEvent>) = consolidated
        .iter()
        .partition(|event| event.severity() == Severity::Error);

    if !errors.is_empty() {
        let text = errors
            .iter()
            .map(|e| e.detail.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        store.insert(node_id, REPORT_ERRORS, MeasureValue::Text(text));
        store.insert(node_id, ERROR_COUNT, MeasureValue::Int(errors.len() as i64));
    }
    if !warnings.is_empty() {
        let text = warnings
            .iter()
            .map(|e| e.detail.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        store.insert(node_id, REPORT_WARNINGS, MeasureValue::Text(text));
        store.insert(
            node_id,
            WARNING_COUNT,
            MeasureValue::Int(warnings.len() as i64),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn event(kind: DiagnosticKind, detail: &str) -> DiagnosticEvent {
        DiagnosticEvent::new(kind, "a.f90", detail)
    }

    #[test]
    fn consolidate_merges_repeats_of_the_same_kind() {
        let consolidated = consolidate(vec![
            event(DiagnosticKind::InvalidMeasureValue, "no measure: x"),
            event(DiagnosticKind::InvalidMeasureValue, "no measure: y"),
            event(DiagnosticKind::InvalidLineReference, "bad line"),
        ]);

        assert_eq!(consolidated.len(), 2);
        assert_eq!(consolidated[0].kind, DiagnosticKind::InvalidMeasureValue);
        assert_eq!(consolidated[0].detail, "no measure: x; no measure: y");
        assert_eq!(consolidated[1].kind, DiagnosticKind::InvalidLineReference);
    }

    #[test]
    fn consolidate_drops_duplicate_details() {
        let consolidated = consolidate(vec![
            event(DiagnosticKind::InvalidMeasureValue, "no measure: x"),
            event(DiagnosticKind::InvalidMeasureValue, "no measure: x"),
        ]);

        assert_eq!(consolidated.len(), 1);
        assert_eq!(consolidated[0].detail, "no measure: x");
    }

    #[test]
    fn diagnostic_measures_split_by_severity() {
        let mut store = MeasureStore::new();
        record_diagnostic_measures(
            &mut store,
            "a.f90",
            &[
                event(DiagnosticKind::MissingReport, "no report file"),
                event(DiagnosticKind::InvalidLineReference, "bad line"),
            ],
        );

        assert_eq!(
            store.get("a.f90", ERROR_COUNT),
            Some(&MeasureValue::Int(1))
        );
        assert_eq!(
            store.get("a.f90", WARNING_COUNT),
            Some(&MeasureValue::Int(1))
        );
        assert_eq!(
            store.get("a.f90", REPORT_ERRORS),
            Some(&MeasureValue::Text("no report file".to_string()))
        );
    }

    #[test]
    fn no_diagnostics_no_measures() {
        let mut store = MeasureStore::new();
        record_diagnostic_measures(&mut store, "a.f90", &[]);
        assert!(store.is_empty());
    }
}
