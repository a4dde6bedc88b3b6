//! Tree walker — enumerates matching files under a root and applies a
//! migration to each, isolating per-file failures.
//!
//! The unit of failure isolation is the file: unreadable or unwritable files
//! are logged and tallied as skipped, and the walk continues. Partial
//! progress over a large, possibly inconsistent tree beats an abort.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::core::error::{Error, Result};

/// Directories never descended into (VCS and engine caches).
const SKIP_DIRS: &[&str] = &[".git", ".svn", ".hg", ".import", ".godot"];

/// Result of migrating one file's content in memory.
#[derive(Debug, Clone)]
pub struct FileMigration {
    /// The full rewritten content (identical to the input when unchanged).
    pub content: String,
    /// Whether the content differs byte-for-byte from the input.
    pub changed: bool,
    /// Manual-review markers emitted while rewriting.
    pub review_markers: usize,
}

/// Aggregate over one walk. Created fresh per invocation; reported, never
/// persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    pub files_total: usize,
    pub files_changed: usize,
    pub files_skipped: usize,
    pub review_markers: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changed_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_files: Vec<String>,
}

/// Walk `root` recursively, apply `migrate` to every file matching one of
/// `extensions`, and write changed files back in place (unless `dry_run`).
///
/// Fails only when `root` is not a directory; every per-file problem is a
/// skip, not an error.
pub fn migrate_tree<F>(
    root: &Path,
    extensions: &[&str],
    dry_run: bool,
    migrate: F,
) -> Result<MigrationReport>
where
    F: Fn(&str) -> FileMigration,
{
    if !root.is_dir() {
        return Err(Error::path_not_found(root.display().to_string()));
    }

    let mut files = Vec::new();
    collect_files(root, extensions, &mut files);
    files.sort();

    let mut report = MigrationReport::default();

    for path in &files {
        let relative = path.strip_prefix(root).unwrap_or(path).display().to_string();
        report.files_total += 1;

        // Undecodable content (non-UTF-8) lands here too, as InvalidData.
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                crate::log_status!("walk", "Skipping {}: {}", relative, e);
                report.files_skipped += 1;
                report.skipped_files.push(relative);
                continue;
            }
        };

        let result = migrate(&content);
        report.review_markers += result.review_markers;

        if !result.changed {
            continue;
        }

        if !dry_run {
            if let Err(e) = std::fs::write(path, &result.content) {
                // Change discarded for this file; already-written files stand.
                crate::log_status!("walk", "Could not write {}: {}", relative, e);
                report.files_skipped += 1;
                report.skipped_files.push(relative);
                continue;
            }
        }

        report.files_changed += 1;
        report.changed_files.push(relative);
    }

    Ok(report)
}

fn collect_files(dir: &Path, extensions: &[&str], files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            if SKIP_DIRS.contains(&name.as_str()) {
                continue;
            }
            collect_files(&path, extensions, files);
        } else if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            if extensions.contains(&ext) {
                files.push(path);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorCode;

    fn uppercase_migration(content: &str) -> FileMigration {
        let upper = content.to_uppercase();
        FileMigration {
            changed: upper != content,
            content: upper,
            review_markers: 0,
        }
    }

    #[test]
    fn walks_recursively_and_filters_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("levels");
        std::fs::create_dir_all(&sub).unwrap();
        std::fs::write(dir.path().join("player.gd"), "a\n").unwrap();
        std::fs::write(sub.join("boss.gd"), "b\n").unwrap();
        std::fs::write(sub.join("boss.tscn"), "c\n").unwrap();

        let report = migrate_tree(dir.path(), &["gd"], false, uppercase_migration).unwrap();
        assert_eq!(report.files_total, 2);
        assert_eq!(report.files_changed, 2);
    }

    #[test]
    fn skip_dirs_are_not_descended() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join(".import");
        std::fs::create_dir_all(&cache).unwrap();
        std::fs::write(cache.join("stale.gd"), "a\n").unwrap();

        let report = migrate_tree(dir.path(), &["gd"], false, uppercase_migration).unwrap();
        assert_eq!(report.files_total, 0);
    }

    #[test]
    fn unchanged_file_is_never_rewritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("done.gd");
        std::fs::write(&path, "ALREADY UPPER\n").unwrap();
        let before = std::fs::metadata(&path).unwrap().modified().unwrap();

        let report = migrate_tree(dir.path(), &["gd"], false, uppercase_migration).unwrap();
        assert_eq!(report.files_changed, 0);

        let after = std::fs::metadata(&path).unwrap().modified().unwrap();
        assert_eq!(before, after, "no-op migration must not touch the file");
    }

    #[test]
    fn dry_run_reports_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.gd");
        std::fs::write(&path, "lower\n").unwrap();

        let report = migrate_tree(dir.path(), &["gd"], true, uppercase_migration).unwrap();
        assert_eq!(report.files_changed, 1);
        assert_eq!(report.changed_files, vec!["player.gd".to_string()]);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "lower\n");
    }

    #[test]
    fn changed_files_are_written_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.gd");
        std::fs::write(&path, "lower\n").unwrap();

        migrate_tree(dir.path(), &["gd"], false, uppercase_migration).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "LOWER\n");
    }

    #[test]
    fn undecodable_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..9 {
            std::fs::write(dir.path().join(format!("ok{}.gd", i)), "fine\n").unwrap();
        }
        std::fs::write(dir.path().join("broken.gd"), [0xff, 0xfe, 0x00, 0xff]).unwrap();

        let report = migrate_tree(dir.path(), &["gd"], false, uppercase_migration).unwrap();
        assert_eq!(report.files_total, 10);
        assert_eq!(report.files_skipped, 1);
        assert_eq!(report.skipped_files, vec!["broken.gd".to_string()]);
        assert_eq!(report.files_changed, 9);
    }

    #[test]
    fn missing_root_is_a_startup_error() {
        let err = migrate_tree(
            Path::new("/nonexistent/gdmigrate-root"),
            &["gd"],
            false,
            uppercase_migration,
        )
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::PathNotFound);
    }

    #[test]
    fn review_markers_accumulate_across_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.gd"), "x\n").unwrap();
        std::fs::write(dir.path().join("b.gd"), "y\n").unwrap();

        let report = migrate_tree(dir.path(), &["gd"], true, |content| FileMigration {
            content: content.to_string(),
            changed: false,
            review_markers: 2,
        })
        .unwrap();
        assert_eq!(report.review_markers, 4);
    }
}
