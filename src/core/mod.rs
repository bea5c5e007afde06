pub mod errors;
pub mod metrics;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Source dialect of an analyzed file, as tagged by the analyzer.
///
/// `Shell` doubles as the generic fallback for anything the analyzer does not
/// classify as one of the two strict Fortran dialects.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Dialect {
    F77,
    F90,
    Shell,
}

impl Dialect {
    pub const ALL: [Dialect; 3] = [Dialect::F77, Dialect::F90, Dialect::Shell];

    pub fn from_extension(ext: &str) -> Self {
        static EXTENSION_MAP: &[(&[&str], Dialect)] = &[
            (&["f", "f77", "for"], Dialect::F77),
            (&["f90", "f95"], Dialect::F90),
        ];

        let ext = ext.to_ascii_lowercase();
        EXTENSION_MAP
            .iter()
            .find(|(exts, _)| exts.contains(&ext.as_str()))
            .map(|(_, dialect)| *dialect)
            .unwrap_or(Dialect::Shell)
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Dialect::Shell)
    }

    /// Classify the `language` tag a report declares for itself.
    pub fn from_language_tag(tag: &str) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "f77" | "fortran77" => Dialect::F77,
            "f90" | "fortran90" => Dialect::F90,
            _ => Dialect::Shell,
        }
    }

    pub fn is_f77(&self) -> bool {
        matches!(self, Dialect::F77)
    }

    pub fn is_f90(&self) -> bool {
        matches!(self, Dialect::F90)
    }

    /// Neither strict dialect; the generic bucket.
    pub fn is_fallback(&self) -> bool {
        matches!(self, Dialect::Shell)
    }

    /// Prefix used in metric keys, e.g. `f90` in `f90_loc_mean`.
    pub fn key_prefix(&self) -> &'static str {
        match self {
            Dialect::F77 => "f77",
            Dialect::F90 => "f90",
            Dialect::Shell => "shell",
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let display_str = match self {
            Dialect::F77 => "Fortran 77",
            Dialect::F90 => "Fortran 90",
            Dialect::Shell => "Shell",
        };
        write!(f, "{display_str}")
    }
}

/// A leaf node of the project tree. Immutable once discovered.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Path relative to the analysis root
    pub relative_path: PathBuf,
    /// Total line count, used to clamp issue line references
    pub lines: usize,
    /// Dialect inferred from the file suffix
    pub dialect: Dialect,
}

impl SourceFile {
    /// Store key for this file; relative path with `/` separators.
    pub fn node_id(&self) -> String {
        node_id_from_path(&self.relative_path)
    }
}

pub(crate) fn node_id_from_path(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    parts.join("/")
}

/// A non-leaf node of the containment hierarchy: a directory or the project
/// root. Containers own no measures; roll-ups are recomputed from the store.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerNode {
    /// Store key; the empty string for the project root
    pub id: String,
    pub name: String,
    /// Sub-containers, ordered by name
    pub children: Vec<ContainerNode>,
    /// Node ids of the files directly inside this container
    pub files: Vec<String>,
}

impl ContainerNode {
    /// Build the containment tree from the discovered files' relative paths.
    pub fn build(files: &[SourceFile]) -> ContainerNode {
        #[derive(Default)]
        struct Builder {
            dirs: BTreeMap<String, Builder>,
            files: Vec<String>,
        }

        fn convert(name: String, id: String, builder: Builder) -> ContainerNode {
            let children = builder
                .dirs
                .into_iter()
                .map(|(child_name, child)| {
                    let child_id = if id.is_empty() {
                        child_name.clone()
                    } else {
                        format!("{id}/{child_name}")
                    };
                    convert(child_name, child_id, child)
                })
                .collect();
            ContainerNode {
                id,
                name,
                children,
                files: builder.files,
            }
        }

        let mut root = Builder::default();
        for file in files {
            let mut node = &mut root;
            let components: Vec<String> = file
                .relative_path
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            if let Some((_file_name, dirs)) = components.split_last() {
                for dir in dirs {
                    node = node.dirs.entry(dir.clone()).or_default();
                }
            }
            node.files.push(file.node_id());
        }

        convert(String::new(), String::new(), root)
    }

    /// Total number of containers in this subtree, root included.
    pub fn container_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ContainerNode::container_count)
            .sum::<usize>()
    }
}

/// A measure value, typed by the owning metric's declared kind.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MeasureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl MeasureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MeasureValue::Int(v) => Some(*v as f64),
            MeasureValue::Float(v) => Some(*v),
            MeasureValue::Text(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            MeasureValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl std::fmt::Display for MeasureValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MeasureValue::Int(v) => write!(f, "{v}"),
            MeasureValue::Float(v) => write!(f, "{v:.2}"),
            MeasureValue::Text(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Severity {
    Warning,
    Error,
}

/// Per-file diagnostic classification.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    MissingReport,
    EmptyReport,
    UnreadableReport,
    UnparseableReport,
    InvalidMeasureValue,
    InvalidLineReference,
    /// The analyzer supplied its own module-level scalar (informational)
    ModuleScalarProvided,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::MissingReport
            | DiagnosticKind::EmptyReport
            | DiagnosticKind::UnreadableReport
            | DiagnosticKind::UnparseableReport => Severity::Error,
            DiagnosticKind::InvalidMeasureValue
            | DiagnosticKind::InvalidLineReference
            | DiagnosticKind::ModuleScalarProvided => Severity::Warning,
        }
    }
}

/// Structured diagnostic emitted by the core instead of a process-wide logger.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DiagnosticEvent {
    pub kind: DiagnosticKind,
    /// Node id of the file the diagnostic is about
    pub file: String,
    pub detail: String,
}

impl DiagnosticEvent {
    pub fn new(kind: DiagnosticKind, file: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            file: file.into(),
            detail: detail.into(),
        }
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }
}

/// Final output of one aggregation run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AggregationResults {
    pub project_path: PathBuf,
    pub timestamp: DateTime<Utc>,
    /// node id -> metric key -> value; ordering is stable across runs
    pub measures: BTreeMap<String, BTreeMap<String, MeasureValue>>,
    pub diagnostics: Vec<DiagnosticEvent>,
    pub summary: RunSummary,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunSummary {
    pub files_scanned: usize,
    pub reports_parsed: usize,
    pub files_with_errors: usize,
}
