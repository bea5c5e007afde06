//! In-memory measure store and diagnostics sink.
//!
//! Persisting measures is the host platform's job; the core writes into this
//! store and the external collaborator drains it after the run. BTreeMaps
//! keep iteration order stable so identical inputs produce identical output.

use std::collections::BTreeMap;

use crate::core::{DiagnosticEvent, MeasureValue};

/// Mapping from `(node id, metric key)` to a value.
/// At most one measure exists per pair; re-insertion replaces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeasureStore {
    measures: BTreeMap<String, BTreeMap<String, MeasureValue>>,
}

impl MeasureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, node: &str, metric: &str, value: MeasureValue) {
        self.measures
            .entry(node.to_string())
            .or_default()
            .insert(metric.to_string(), value);
    }

    pub fn get(&self, node: &str, metric: &str) -> Option<&MeasureValue> {
        self.measures.get(node).and_then(|m| m.get(metric))
    }

    pub fn node(&self, node: &str) -> Option<&BTreeMap<String, MeasureValue>> {
        self.measures.get(node)
    }

    /// Number of (node, metric) pairs held.
    pub fn len(&self) -> usize {
        self.measures.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.measures.is_empty()
    }

    pub fn into_inner(self) -> BTreeMap<String, BTreeMap<String, MeasureValue>> {
        self.measures
    }
}

/// Destination for structured diagnostics, injected into the pipeline so the
/// core never talks to a process-wide logger directly.
pub trait DiagnosticsSink {
    fn emit(&mut self, event: DiagnosticEvent);
}

/// Collects events in memory; the default sink for CLI runs and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    events: Vec<DiagnosticEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[DiagnosticEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<DiagnosticEvent> {
        self.events
    }
}

impl DiagnosticsSink for MemorySink {
    fn emit(&mut self, event: DiagnosticEvent) {
        self.events.push(event);
    }
}
