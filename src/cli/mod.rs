//! Command-line argument parsing and subcommand dispatch.

use std::env;
use std::error::Error;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::AuthManager;
use crate::ui::chat_loop::run_chat;

/// Enables diagnostic logging without the `--log-file` flag.
const LOG_ENV: &str = "GEMINAL_LOG";

#[derive(Parser)]
#[command(name = "geminal")]
#[command(about = "A terminal-based chat interface for Google's Gemini API")]
#[command(version)]
#[command(
    long_about = "Geminal is a full-screen terminal chat interface for Google's Gemini API. \
Conversations are stored locally and restored on the next start.\n\n\
Authentication:\n\
  Use 'geminal auth' to store an API key securely in your system keyring.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    API key (takes precedence over the keyring)\n\
  GEMINAL_LOG       Write diagnostic logs to the given file\n\n\
Controls:\n\
  Enter             Send the message\n\
  Shift+Enter       Insert a newline (Alt+Enter where the terminal eats Shift)\n\
  Tab               Switch between input and chat list\n\
  Ctrl+N            Start a new chat\n\
  Alt+1..4          Fill in a starter prompt\n\
  PageUp/PageDown   Scroll the transcript\n\
  Ctrl+C            Quit"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to chat with (overrides the configured default)
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Read the API key from GEMINI_API_KEY only, skipping the keyring
    #[arg(long, global = true)]
    pub env_only: bool,

    /// Write diagnostic logs to the given file
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Store a Gemini API key in the system keyring
    Auth,
    /// Remove the stored Gemini API key
    Deauth,
    /// Start the chat interface (default)
    Chat,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let log_path = args
        .log_file
        .clone()
        .or_else(|| env::var(LOG_ENV).ok().map(PathBuf::from));
    if let Some(path) = &log_path {
        init_logging(path)?;
    }

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Auth => {
            let auth = AuthManager::new();
            if let Err(e) = auth.interactive_auth() {
                eprintln!("❌ Authentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Deauth => {
            let auth = AuthManager::new();
            if let Err(e) = auth.interactive_deauth() {
                eprintln!("❌ Deauthentication failed: {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Chat => run_chat(args.model, args.env_only).await,
    }
}

/// Sends tracing output to a file. Logging to stdout would corrupt the
/// alternate screen, so there is no stdout layer; without a log file the
/// subscriber is never installed and events go nowhere.
fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("geminal=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        .init();
    Ok(())
}
