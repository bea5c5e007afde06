//! Configuration from `.reportmap.toml`, with graceful fallback to defaults.
//!
//! Only three settings affect core behavior: where report artifacts live
//! relative to each source file, their suffix, and which file names count as
//! analyzable sources.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufReader, Read};
use std::path::Path;

pub const CONFIG_FILE_NAME: &str = ".reportmap.toml";

pub const DEFAULT_REPORT_SUBDIR: &str = "icode-reports";
pub const DEFAULT_REPORT_SUFFIX: &str = ".res.xml";
pub const DEFAULT_FILE_PATTERNS: &str = "*.f,*.f77,*.f90,*.sh";
pub const PATTERN_SEPARATOR: char = ',';

fn default_report_subdir() -> String {
    DEFAULT_REPORT_SUBDIR.to_string()
}

fn default_report_suffix() -> String {
    DEFAULT_REPORT_SUFFIX.to_string()
}

fn default_file_patterns() -> String {
    DEFAULT_FILE_PATTERNS.to_string()
}

/// Root configuration structure for reportmap
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportmapConfig {
    /// Name of the analyzer's report subdirectory, next to each source file
    #[serde(default = "default_report_subdir")]
    pub report_subdir: String,

    /// Report files have the same name as the source file plus this suffix
    #[serde(default = "default_report_suffix")]
    pub report_suffix: String,

    /// Comma-separated glob list matched against source file names
    #[serde(default = "default_file_patterns")]
    pub file_patterns: String,

    /// Worker threads for file processing; 0 means all available cores
    #[serde(default)]
    pub jobs: usize,
}

impl Default for ReportmapConfig {
    fn default() -> Self {
        Self {
            report_subdir: default_report_subdir(),
            report_suffix: default_report_suffix(),
            file_patterns: default_file_patterns(),
            jobs: 0,
        }
    }
}

impl ReportmapConfig {
    /// Split the configured pattern list into individual globs.
    pub fn patterns(&self) -> Vec<String> {
        self.file_patterns
            .split(PATTERN_SEPARATOR)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    }
}

fn read_config_file(path: &Path) -> Result<String, std::io::Error> {
    let file = fs::File::open(path)?;
    let mut reader = BufReader::new(file);
    let mut contents = String::new();
    reader.read_to_string(&mut contents)?;
    Ok(contents)
}

/// Parse config from a TOML string.
pub fn parse_config(contents: &str) -> Result<ReportmapConfig, String> {
    toml::from_str::<ReportmapConfig>(contents)
        .map_err(|e| format!("Failed to parse {CONFIG_FILE_NAME}: {e}"))
}

/// Load `.reportmap.toml` from the analysis root if it exists.
/// Any problem short of a CLI error degrades to defaults with a warning.
pub fn load_config(root: &Path) -> ReportmapConfig {
    let config_path = root.join(CONFIG_FILE_NAME);
    let contents = match read_config_file(&config_path) {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Failed to read config file {}: {e}", config_path.display());
            }
            return ReportmapConfig::default();
        }
    };

    match parse_config(&contents) {
        Ok(config) => {
            log::debug!("Loaded config from {}", config_path.display());
            config
        }
        Err(e) => {
            log::warn!("{e}. Using defaults.");
            ReportmapConfig::default()
        }
    }
}
