pub mod all;
pub mod resources;
pub mod scripts;

pub type CmdResult<T> = gdmigrate::Result<(T, i32)>;

pub(crate) struct GlobalArgs {}

/// Resolve the root argument: an explicit path, or the current directory.
pub(crate) fn resolve_root(path: Option<&str>) -> std::path::PathBuf {
    std::path::PathBuf::from(path.unwrap_or("."))
}

/// The one-line human summary for a pipeline run.
pub(crate) fn summary_line(kind: &str, report: &gdmigrate::MigrationReport) -> String {
    format!(
        "Processed {} {} files, upgraded {}.",
        report.files_total, kind, report.files_changed
    )
}
