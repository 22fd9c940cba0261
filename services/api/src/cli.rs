use crate::demo::{run_demo, run_generate, run_quote, DemoArgs, GenerateArgs, QuoteArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use colive::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "colive",
    about = "Run the coliving service or exercise its pricing and payment workflows from the command line",
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
    /// Price a stay at one chapter
    Quote(QuoteArgs),
    /// Automatic payment tooling
    Payments {
        #[command(subcommand)]
        command: PaymentsCommand,
    },
    /// Walk one applicant from availability search to an approved payment
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum PaymentsCommand {
    /// Backfill automatic payments for active colivers
    Generate(GenerateArgs),
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
        Command::Quote(args) => run_quote(args),
        Command::Payments {
            command: PaymentsCommand::Generate(args),
        } => run_generate(args),
        Command::Demo(args) => run_demo(args),
    }
}
