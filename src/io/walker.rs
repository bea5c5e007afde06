//! Source-file discovery: walks the analysis root and keeps the files whose
//! names match the configured suffix patterns.

use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::core::{Dialect, SourceFile};

pub struct FileWalker {
    root: PathBuf,
    patterns: Vec<String>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            patterns: Vec::new(),
        }
    }

    /// Glob patterns matched against file names, e.g. `*.f90`.
    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Discover source files under the root, sorted by relative path so the
    /// same tree always yields the same file list.
    pub fn walk(&self) -> Result<Vec<SourceFile>> {
        let globs: Vec<glob::Pattern> = self
            .patterns
            .iter()
            .map(|p| glob::Pattern::new(p))
            .collect::<Result<_, _>>()?;

        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && self.matches(&globs, path) {
                match self.describe(path) {
                    Ok(file) => files.push(file),
                    Err(e) => {
                        log::warn!("skipping unreadable source file {}: {e}", path.display());
                    }
                }
            }
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    fn matches(&self, globs: &[glob::Pattern], path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        globs.iter().any(|g| g.matches(name))
    }

    fn describe(&self, path: &Path) -> Result<SourceFile> {
        let relative_path = path
            .strip_prefix(&self.root)
            .unwrap_or(path)
            .to_path_buf();
        Ok(SourceFile {
            path: path.to_path_buf(),
            relative_path,
            lines: count_lines(path)?,
            dialect: Dialect::from_path(path),
        })
    }
}

pub fn count_lines(path: &Path) -> Result<usize> {
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn walk_keeps_only_matching_suffixes() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.f90", "program a\nend\n");
        touch(dir.path(), "b.f", "      program b\n      end\n");
        touch(dir.path(), "run.sh", "#!/bin/sh\necho hi\n");
        touch(dir.path(), "notes.txt", "not source\n");
        touch(dir.path(), "sub/c.f77", "      end\n");

        let files = FileWalker::new(dir.path().to_path_buf())
            .with_patterns(vec![
                "*.f".into(),
                "*.f77".into(),
                "*.f90".into(),
                "*.sh".into(),
            ])
            .walk()
            .unwrap();

        let names: Vec<String> = files.iter().map(SourceFile::node_id).collect();
        assert_eq!(names, vec!["a.f90", "b.f", "run.sh", "sub/c.f77"]);
    }

    #[test]
    fn walk_records_line_counts_and_dialects() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.f90", "program a\ninteger :: x\nend\n");

        let files = FileWalker::new(dir.path().to_path_buf())
            .with_patterns(vec!["*.f90".into()])
            .walk()
            .unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(files[0].lines, 3);
        assert_eq!(files[0].dialect, Dialect::F90);
    }

    #[test]
    fn no_patterns_means_no_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.f90", "end\n");

        let files = FileWalker::new(dir.path().to_path_buf()).walk().unwrap();
        assert!(files.is_empty());
    }
}
