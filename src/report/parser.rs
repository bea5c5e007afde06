//! Locates a source file's companion report artifact and parses it.
//!
//! Integrity is checked before structural parsing: the artifact must exist,
//! be non-empty, and be readable. Each failure maps to exactly one
//! [`ReportError`] variant; the caller always gets a model or a classified
//! failure, never a panic.

use std::fs;
use std::path::{Path, PathBuf};

use crate::core::errors::ReportError;

use super::model::{RawReport, ReportModel};

/// Legacy subdirectory name some analyzer versions write into.
pub const LEGACY_REPORT_SUBDIR: &str = "reports";

/// Primary artifact path for a source file:
/// `<file-dir>/<subdir>/<file-name><suffix>`.
pub fn report_path(source: &Path, subdir: &str, suffix: &str) -> PathBuf {
    let dir = source.parent().unwrap_or_else(|| Path::new("."));
    let name = source
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dir.join(subdir).join(format!("{name}{suffix}"))
}

/// Resolve the artifact for a source file, trying the configured
/// subdirectory first and the legacy `reports` name second.
pub fn locate_report(source: &Path, subdir: &str, suffix: &str) -> Option<PathBuf> {
    let primary = report_path(source, subdir, suffix);
    if primary.exists() {
        return Some(primary);
    }
    if subdir != LEGACY_REPORT_SUBDIR {
        let legacy = report_path(source, LEGACY_REPORT_SUBDIR, suffix);
        if legacy.exists() {
            return Some(legacy);
        }
    }
    None
}

/// Parse an artifact already resolved to a path.
pub fn parse_report(path: &Path) -> Result<ReportModel, ReportError> {
    if !path.exists() {
        return Err(ReportError::Missing {
            path: path.to_path_buf(),
        });
    }

    let metadata = fs::metadata(path).map_err(|source| ReportError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    if metadata.len() == 0 {
        return Err(ReportError::Empty {
            path: path.to_path_buf(),
        });
    }

    let contents = fs::read_to_string(path).map_err(|source| ReportError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: RawReport =
        quick_xml::de::from_str(&contents).map_err(|e| ReportError::Unparseable {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;

    Ok(ReportModel::from_raw(raw))
}

/// Locate and parse in one step. A missing artifact reports the primary
/// (configured) path, not the legacy fallback.
pub fn load_report(source: &Path, subdir: &str, suffix: &str) -> Result<ReportModel, ReportError> {
    match locate_report(source, subdir, suffix) {
        Some(path) => parse_report(&path),
        None => Err(ReportError::Missing {
            path: report_path(source, subdir, suffix),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::MetricFamily;
    use crate::report::model::NOT_A_NUMBER;
    use indoc::indoc;
    use std::io::Write;
    use tempfile::TempDir;

    const SAMPLE: &str = indoc! {r#"
        <analysisReport language="f90">
          <metric id="loc">
            <module value="118"/>
            <function name="main_loop" value="42" line="7"/>
            <function name="helper" value="12" line="55"/>
          </metric>
          <metric id="complexity">
            <module value="NaN"/>
            <function name="main_loop" value="9" line="7"/>
          </metric>
        </analysisReport>
    "#};

    fn write_report(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn parses_a_well_formed_report() {
        let dir = TempDir::new().unwrap();
        let path = write_report(dir.path(), "a.f90.res.xml", SAMPLE);

        let model = parse_report(&path).unwrap();
        assert!(model.is_f90());
        assert!(!model.is_f77());

        let loc = model.section(MetricFamily::Loc).unwrap();
        assert_eq!(loc.module_value, "118");
        assert_eq!(loc.functions.len(), 2);
        assert_eq!(loc.functions[0].name, "main_loop");
        assert_eq!(loc.functions[0].value, "42");
        assert_eq!(loc.functions[0].line.as_deref(), Some("7"));

        let complexity = model.section(MetricFamily::Complexity).unwrap();
        assert_eq!(complexity.module_value, NOT_A_NUMBER);
        assert_eq!(complexity.functions.len(), 1);
    }

    #[test]
    fn missing_module_element_becomes_the_sentinel() {
        let dir = TempDir::new().unwrap();
        let path = write_report(
            dir.path(),
            "a.f.res.xml",
            indoc! {r#"
                <analysisReport language="f77">
                  <metric id="complexity">
                    <function name="sub_a" value="3"/>
                  </metric>
                </analysisReport>
            "#},
        );

        let model = parse_report(&path).unwrap();
        let section = model.section(MetricFamily::Complexity).unwrap();
        assert_eq!(section.module_value, NOT_A_NUMBER);
        assert_eq!(section.functions[0].line, None);
    }

    #[test]
    fn unknown_metric_sections_are_ignored() {
        let dir = TempDir::new().unwrap();
        let path = write_report(
            dir.path(),
            "a.sh.res.xml",
            indoc! {r#"
                <analysisReport language="sh">
                  <metric id="nesting">
                    <function name="f" value="2"/>
                  </metric>
                </analysisReport>
            "#},
        );

        let model = parse_report(&path).unwrap();
        assert!(model.section(MetricFamily::Loc).is_none());
        assert!(model.section(MetricFamily::Complexity).is_none());
        assert!(model.is_fallback());
    }

    #[test]
    fn missing_artifact_is_classified() {
        let dir = TempDir::new().unwrap();
        let err = parse_report(&dir.path().join("nope.res.xml")).unwrap_err();
        assert!(matches!(err, ReportError::Missing { .. }));
    }

    #[test]
    fn empty_artifact_is_classified() {
        let dir = TempDir::new().unwrap();
        let path = write_report(dir.path(), "empty.res.xml", "");
        let err = parse_report(&path).unwrap_err();
        assert!(matches!(err, ReportError::Empty { .. }));
    }

    #[test]
    fn malformed_artifact_is_classified() {
        let dir = TempDir::new().unwrap();
        let path = write_report(dir.path(), "bad.res.xml", "<analysisReport><metric");
        let err = parse_report(&path).unwrap_err();
        assert!(matches!(err, ReportError::Unparseable { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_artifact_is_classified() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = write_report(dir.path(), "locked.res.xml", SAMPLE);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).unwrap();

        let result = parse_report(&path);
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        // permission bits do not bind privileged users
        if let Err(err) = result {
            assert!(matches!(err, ReportError::Unreadable { .. }));
        }
    }

    #[test]
    fn locate_prefers_configured_subdir_then_legacy() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("prog.f90");
        fs::write(&source, "program prog\nend program\n").unwrap();

        fs::create_dir(dir.path().join("reports")).unwrap();
        write_report(&dir.path().join("reports"), "prog.f90.res.xml", SAMPLE);
        assert_eq!(
            locate_report(&source, "icode-reports", ".res.xml"),
            Some(dir.path().join("reports").join("prog.f90.res.xml"))
        );

        fs::create_dir(dir.path().join("icode-reports")).unwrap();
        write_report(&dir.path().join("icode-reports"), "prog.f90.res.xml", SAMPLE);
        assert_eq!(
            locate_report(&source, "icode-reports", ".res.xml"),
            Some(dir.path().join("icode-reports").join("prog.f90.res.xml"))
        );
    }

    #[test]
    fn load_report_missing_names_the_primary_path() {
        let dir = TempDir::new().unwrap();
        let source = dir.path().join("prog.f90");
        fs::write(&source, "program prog\nend program\n").unwrap();

        let err = load_report(&source, "icode-reports", ".res.xml").unwrap_err();
        match err {
            ReportError::Missing { path } => {
                assert!(path.to_string_lossy().contains("icode-reports"));
            }
            other => panic!("expected Missing, got {other:?}"),
        }
    }
}
