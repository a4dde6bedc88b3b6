use clap::Args;
use serde::Serialize;

use gdmigrate::rules::MigrationRules;
use gdmigrate::{log_status, resource, walker, MigrationReport};

use super::{resolve_root, summary_line, CmdResult};

/// Extensions the resource pipeline visits.
pub const RESOURCE_EXTENSIONS: &[&str] = &["tscn", "tres"];

#[derive(Args)]
pub struct ResourcesArgs {
    /// Root directory to migrate (default: current directory)
    pub path: Option<String>,

    /// Compute rewrites but do not write any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
pub struct ResourcesOutput {
    pub command: &'static str,
    pub root: String,
    pub dry_run: bool,
    pub summary: String,
    pub report: MigrationReport,
}

pub fn run(args: ResourcesArgs, _global: &super::GlobalArgs) -> CmdResult<ResourcesOutput> {
    let root = resolve_root(args.path.as_deref());
    let rules = MigrationRules::new();

    let report = walker::migrate_tree(&root, RESOURCE_EXTENSIONS, args.dry_run, |content| {
        resource::migrate_resource(content, &rules)
    })?;

    let summary = summary_line("scene", &report);
    log_status!("resources", "{}", summary);

    Ok((
        ResourcesOutput {
            command: "resources",
            root: root.display().to_string(),
            dry_run: args.dry_run,
            summary,
            report,
        },
        0,
    ))
}
