use crate::commands::{run_rate, run_vocabulary_list, RateArgs, VocabularyListArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use pocketbook::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Pocketbook",
    about = "Serve the pocketbook page or work with its books from the command line",
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
    /// Show the current EUR/MYR rate, optionally recording it
    Rate(RateArgs),
    /// Work with the vocabulary book
    Vocab {
        #[command(subcommand)]
        command: VocabCommand,
    },
}

#[derive(Subcommand, Debug)]
enum VocabCommand {
    /// Print stored words, newest first
    List(VocabularyListArgs),
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
        Command::Rate(args) => run_rate(args).await,
        Command::Vocab {
            command: VocabCommand::List(args),
        } => run_vocabulary_list(args).await,
    }
}
