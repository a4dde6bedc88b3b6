use clap::Args;
use serde::Serialize;

use gdmigrate::rules::MigrationRules;
use gdmigrate::{log_status, script, walker, MigrationReport};

use super::{resolve_root, summary_line, CmdResult};

/// Extensions the script pipeline visits.
pub const SCRIPT_EXTENSIONS: &[&str] = &["gd"];

#[derive(Args)]
pub struct ScriptsArgs {
    /// Root directory to migrate (default: current directory)
    pub path: Option<String>,

    /// Compute rewrites but do not write any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
pub struct ScriptsOutput {
    pub command: &'static str,
    pub root: String,
    pub dry_run: bool,
    pub summary: String,
    pub report: MigrationReport,
}

pub fn run(args: ScriptsArgs, _global: &super::GlobalArgs) -> CmdResult<ScriptsOutput> {
    let root = resolve_root(args.path.as_deref());
    let rules = MigrationRules::new();

    let report = walker::migrate_tree(&root, SCRIPT_EXTENSIONS, args.dry_run, |content| {
        script::migrate_script(content, &rules)
    })?;

    let summary = summary_line("script", &report);
    log_status!("scripts", "{}", summary);

    Ok((
        ScriptsOutput {
            command: "scripts",
            root: root.display().to_string(),
            dry_run: args.dry_run,
            summary,
            report,
        },
        0,
    ))
}
