//! workflow-emit CLI — materialize compiled workflow trees.

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "workflow-emit",
    version,
    about = "Materialize compiled workflow trees to disk and manage search-path config"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: workflow_emit::cli::Commands,
}

fn main() {
    let cli = Cli::parse();
    workflow_emit::logging::init_logging(cli.verbose);

    if let Err(e) = workflow_emit::cli::dispatch(cli.command) {
        eprintln!("error: {}", e);
        std::process::exit(if e.is_fatal_user_error() { 2 } else { 1 });
    }
}
