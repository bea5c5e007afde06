//! Bottom-up roll-up of measures through the containment tree.
//!
//! Each sub-metric combines with its own rule: raw values sum, means average
//! (unweighted over the children that reported one), extrema take the
//! elementwise min/max. A container computes a measure only when at least
//! one child supplied a value for that exact metric; otherwise it emits
//! nothing, so absence stays distinguishable from zero.

use crate::core::metrics::{registry, Combinator, MetricDef, ValueKind};
use crate::core::{ContainerNode, MeasureValue};
use crate::store::MeasureStore;

/// Combine already-computed child values for one metric.
/// Returns `None` when no child supplied a value or the metric never rolls
/// up (text metrics).
pub fn combine(def: &MetricDef, children: &[MeasureValue]) -> Option<MeasureValue> {
    let combinator = def.combinator?;
    if children.is_empty() {
        return None;
    }

    let values: Vec<f64> = children.iter().filter_map(MeasureValue::as_f64).collect();
    if values.is_empty() {
        return None;
    }

    let combined = match combinator {
        Combinator::Sum => values.iter().sum(),
        Combinator::Mean => values.iter().sum::<f64>() / values.len() as f64,
        Combinator::Min => values.iter().copied().fold(f64::INFINITY, f64::min),
        Combinator::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
    };

    Some(match def.kind {
        ValueKind::Int => MeasureValue::Int(combined.trunc() as i64),
        ValueKind::Float => MeasureValue::Float(combined),
        ValueKind::Text => return None,
    })
}

/// One post-order pass over the tree: every container is visited once per
/// metric, and only after all of its children have their final measures.
/// Leaves never receive a pass; their measures come from the file-level
/// aggregator alone.
pub fn roll_up(root: &ContainerNode, store: &mut MeasureStore) {
    let defs: Vec<MetricDef> = registry()
        .into_iter()
        .filter(|def| def.combinator.is_some())
        .collect();
    roll_up_node(root, &defs, store);
}

fn roll_up_node(node: &ContainerNode, defs: &[MetricDef], store: &mut MeasureStore) {
    for child in &node.children {
        roll_up_node(child, defs, store);
    }

    for def in defs {
        let child_values: Vec<MeasureValue> = node
            .children
            .iter()
            .map(|child| child.id.as_str())
            .chain(node.files.iter().map(String::as_str))
            .filter_map(|id| store.get(id, &def.key))
            .cloned()
            .collect();

        if let Some(value) = combine(def, &child_values) {
            store.insert(&node.id, &def.key, value);
        }
    }
}
