use clap::{Args, Parser, Subcommand};
use talentwatch::error::AppError;

use crate::demo::{run_demo, run_import, DemoArgs, ImportArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Talentwatch",
    about = "Run and exercise the talentwatch departure tracker from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Parse a roster CSV export and show what would be tracked
    Import(ImportArgs),
    /// Run an end-to-end demo: track, detect, classify, and dispatch alerts
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Import(args) => run_import(args),
        Command::Demo(args) => run_demo(args),
    }
}
