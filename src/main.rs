use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{all, resources, scripts, GlobalArgs};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "gdmigrate")]
#[command(version = VERSION)]
#[command(about = "Migrate Godot 3.x GDScript and scene files to 4.x syntax")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Migrate legacy GDScript files (.gd)
    Scripts(scripts::ScriptsArgs),
    /// Migrate serialized scene/resource files (.tscn, .tres)
    Resources(resources::ResourcesArgs),
    /// Run both pipelines, scripts first
    All(all::AllArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    let global = GlobalArgs {};

    let (json_result, exit_code) = match cli.command {
        Commands::Scripts(args) => output::map_cmd_result_to_json(scripts::run(args, &global)),
        Commands::Resources(args) => output::map_cmd_result_to_json(resources::run(args, &global)),
        Commands::All(args) => output::map_cmd_result_to_json(all::run(args, &global)),
    };

    output::print_json_result(json_result);
    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
