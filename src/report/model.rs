//! Parsed form of an analyzer report artifact.
//!
//! The artifact is XML: a root element tagged with the source language, one
//! `<metric>` section per metric family, each holding an optional
//! module-level scalar plus an ordered list of per-function entries.
//! Function values and line references stay raw strings here; numeric
//! coercion belongs to the aggregator, which has to tolerate bad values
//! record by record.

use serde::Deserialize;
use std::collections::HashMap;

use crate::core::metrics::MetricFamily;
use crate::core::Dialect;

/// Sentinel the analyzer writes when it does not supply a module-level value.
pub const NOT_A_NUMBER: &str = "NaN";

// Deserialization mirror of the artifact schema.
#[derive(Debug, Deserialize)]
pub(crate) struct RawReport {
    #[serde(rename = "@language", default)]
    pub language: String,
    #[serde(rename = "metric", default)]
    pub metrics: Vec<RawMetric>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMetric {
    #[serde(rename = "@id", default)]
    pub id: String,
    pub module: Option<RawModule>,
    #[serde(rename = "function", default)]
    pub functions: Vec<RawFunction>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawModule {
    #[serde(rename = "@value", default)]
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawFunction {
    #[serde(rename = "@name", default)]
    pub name: String,
    #[serde(rename = "@value", default)]
    pub value: String,
    #[serde(rename = "@line")]
    pub line: Option<String>,
}

/// One per-function measure entry, values verbatim from the artifact.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionRecord {
    pub name: String,
    pub value: String,
    pub line: Option<String>,
}

/// All entries of one metric family within a report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricSection {
    /// Module-level scalar; [`NOT_A_NUMBER`] when the analyzer omitted it
    pub module_value: String,
    pub functions: Vec<FunctionRecord>,
}

impl MetricSection {
    pub fn new(module_value: impl Into<String>) -> Self {
        Self {
            module_value: module_value.into(),
            functions: Vec::new(),
        }
    }

    pub fn with_function(mut self, name: &str, value: &str, line: Option<&str>) -> Self {
        self.functions.push(FunctionRecord {
            name: name.to_string(),
            value: value.to_string(),
            line: line.map(str::to_string),
        });
        self
    }
}

/// A fully parsed report artifact for one source file.
#[derive(Clone, Debug, PartialEq)]
pub struct ReportModel {
    dialect: Dialect,
    sections: HashMap<MetricFamily, MetricSection>,
}

impl ReportModel {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            sections: HashMap::new(),
        }
    }

    pub fn with_section(mut self, family: MetricFamily, section: MetricSection) -> Self {
        self.sections.entry(family).or_insert(section);
        self
    }

    pub(crate) fn from_raw(raw: RawReport) -> Self {
        let mut model = Self::new(Dialect::from_language_tag(&raw.language));
        for metric in raw.metrics {
            // unknown metric ids are not an error; the analyzer may emit
            // rules this plugin does not track
            let Some(family) = MetricFamily::from_id(&metric.id) else {
                log::debug!("ignoring unknown metric section: {}", metric.id);
                continue;
            };
            let module_value = metric
                .module
                .map(|m| m.value)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| NOT_A_NUMBER.to_string());
            let section = MetricSection {
                module_value,
                functions: metric
                    .functions
                    .into_iter()
                    .map(|f| FunctionRecord {
                        name: f.name,
                        value: f.value,
                        line: f.line,
                    })
                    .collect(),
            };
            model.sections.entry(family).or_insert(section);
        }
        model
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn is_f77(&self) -> bool {
        self.dialect.is_f77()
    }

    pub fn is_f90(&self) -> bool {
        self.dialect.is_f90()
    }

    pub fn is_fallback(&self) -> bool {
        self.dialect.is_fallback()
    }

    pub fn section(&self, family: MetricFamily) -> Option<&MetricSection> {
        self.sections.get(&family)
    }
}
