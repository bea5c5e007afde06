//! Metric registry: every tracked metric with its declared value kind and
//! roll-up combinator.
//!
//! Metrics are bucketed per dialect: `f90_loc_mean` is the mean lines of code
//! per function across Fortran 90 files. Diagnostics metrics (`report_errors`
//! and friends) are file-scoped texts plus counts that sum up the tree.

use super::Dialect;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    Loc,
    Complexity,
}

impl MetricFamily {
    pub const ALL: [MetricFamily; 2] = [MetricFamily::Loc, MetricFamily::Complexity];

    pub fn id(&self) -> &'static str {
        match self {
            MetricFamily::Loc => "loc",
            MetricFamily::Complexity => "complexity",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|family| family.id() == id)
    }
}

/// The four derived forms of a metric family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubMetric {
    Raw,
    Mean,
    Min,
    Max,
}

impl SubMetric {
    pub const ALL: [SubMetric; 4] = [
        SubMetric::Raw,
        SubMetric::Mean,
        SubMetric::Min,
        SubMetric::Max,
    ];

    pub fn suffix(&self) -> &'static str {
        match self {
            SubMetric::Raw => "",
            SubMetric::Mean => "_mean",
            SubMetric::Min => "_min",
            SubMetric::Max => "_max",
        }
    }

    /// Combinator applied when rolling this sub-metric up the tree.
    pub fn combinator(&self) -> Combinator {
        match self {
            SubMetric::Raw => Combinator::Sum,
            SubMetric::Mean => Combinator::Mean,
            SubMetric::Min => Combinator::Min,
            SubMetric::Max => Combinator::Max,
        }
    }

    /// Means are floats; raw values and extrema are integers.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            SubMetric::Mean => ValueKind::Float,
            _ => ValueKind::Int,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Combinator {
    Sum,
    Mean,
    Min,
    Max,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Int,
    Float,
    Text,
}

/// A declared metric: key, value kind, and roll-up combinator.
/// `combinator` is `None` for file-scoped metrics that never roll up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricDef {
    pub key: String,
    pub kind: ValueKind,
    pub combinator: Option<Combinator>,
}

/// Consolidated error texts for a file's report processing
pub const REPORT_ERRORS: &str = "report_errors";
/// Consolidated warning texts for a file's report processing
pub const REPORT_WARNINGS: &str = "report_warnings";
/// Number of distinct error kinds recorded for a file
pub const ERROR_COUNT: &str = "error_count";
/// Number of distinct warning kinds recorded for a file
pub const WARNING_COUNT: &str = "warning_count";

pub fn metric_key(dialect: Dialect, family: MetricFamily, sub: SubMetric) -> String {
    format!("{}_{}{}", dialect.key_prefix(), family.id(), sub.suffix())
}

/// All declared metrics. Shell metrics stay declared even though the file
/// aggregator currently routes nothing into them; a container only computes a
/// roll-up when some child actually supplied a value.
pub fn registry() -> Vec<MetricDef> {
    let mut defs: Vec<MetricDef> = Dialect::ALL
        .into_iter()
        .flat_map(|dialect| {
            MetricFamily::ALL.into_iter().flat_map(move |family| {
                SubMetric::ALL.into_iter().map(move |sub| MetricDef {
                    key: metric_key(dialect, family, sub),
                    kind: sub.value_kind(),
                    combinator: Some(sub.combinator()),
                })
            })
        })
        .collect();

    defs.push(MetricDef {
        key: ERROR_COUNT.to_string(),
        kind: ValueKind::Int,
        combinator: Some(Combinator::Sum),
    });
    defs.push(MetricDef {
        key: WARNING_COUNT.to_string(),
        kind: ValueKind::Int,
        combinator: Some(Combinator::Sum),
    });
    defs.push(MetricDef {
        key: REPORT_ERRORS.to_string(),
        kind: ValueKind::Text,
        combinator: None,
    });
    defs.push(MetricDef {
        key: REPORT_WARNINGS.to_string(),
        kind: ValueKind::Text,
        combinator: None,
    });

    defs
}
