use std::io::{self, IsTerminal};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use eyre::Result;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use polygpt_chat::cli::chat::ChatContext;
use polygpt_chat::cli::chat::view::ChatView;
use polygpt_chat::config::{ChatConfig, ConnectionArgs};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Send a single message, print the reply and exit
    #[arg(short, long)]
    input: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    connection: ConnectionArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a chat session
    Chat {
        /// Send a single message, print the reply and exit
        #[arg(short, long)]
        input: Option<String>,
    },
    /// List the services the backend can route to
    Services,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Load environment variables from .env file
    dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };

    // Logs go to stderr so they never land inside the transcript.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config = ChatConfig::from(cli.connection);

    let input = match cli.command {
        Some(Commands::Services) => {
            println!("{}", config.services()?.listing());
            return Ok(ExitCode::SUCCESS);
        }
        Some(Commands::Chat { input }) => input,
        None => cli.input,
    };

    info!("Starting PolyGPT Chat with service {}", config.service);

    let interactive = input.is_none();
    // Debug logs share the terminal, so the placeholder line can no longer be
    // found by moving up one line.
    let view = ChatView::new(Box::new(io::stdout()), io::stdout().is_terminal())
        .with_retract(!cli.verbose);
    let mut chat_context = ChatContext::new(
        view,
        input,
        interactive,
        &config,
    )?;
    chat_context.run().await
}
