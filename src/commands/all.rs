use clap::Args;
use serde::Serialize;

use gdmigrate::rules::MigrationRules;
use gdmigrate::{log_status, resource, script, walker, MigrationReport};

use super::{resolve_root, summary_line, CmdResult};

#[derive(Args)]
pub struct AllArgs {
    /// Root directory to migrate (default: current directory)
    pub path: Option<String>,

    /// Compute rewrites but do not write any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Serialize)]
pub struct AllOutput {
    pub command: &'static str,
    pub root: String,
    pub dry_run: bool,
    pub summary: String,
    pub scripts: MigrationReport,
    pub resources: MigrationReport,
}

/// Run both pipelines over the same root, scripts first. One rule table is
/// shared, so script and resource renames can never disagree.
pub fn run(args: AllArgs, _global: &super::GlobalArgs) -> CmdResult<AllOutput> {
    let root = resolve_root(args.path.as_deref());
    let rules = MigrationRules::new();

    let scripts = walker::migrate_tree(
        &root,
        super::scripts::SCRIPT_EXTENSIONS,
        args.dry_run,
        |content| script::migrate_script(content, &rules),
    )?;

    let resources = walker::migrate_tree(
        &root,
        super::resources::RESOURCE_EXTENSIONS,
        args.dry_run,
        |content| resource::migrate_resource(content, &rules),
    )?;

    let summary = format!(
        "{} {}",
        summary_line("script", &scripts),
        summary_line("scene", &resources)
    );
    log_status!("all", "{}", summary);

    Ok((
        AllOutput {
            command: "all",
            root: root.display().to_string(),
            dry_run: args.dry_run,
            summary,
            scripts,
            resources,
        },
        0,
    ))
}
