use anyhow::Result;
use clap::{Parser, Subcommand};
use shrt::config::Config;
use shrt::shortener::{Shortener, ShortenerError};
use shrt::storage;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "shrt-admin")]
#[command(about = "shrt storage management CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the urls table if it does not exist
    Init,
    /// Shorten a URL against the configured storage
    Encode {
        /// Long URL to shorten
        url: String,
    },
    /// Resolve a short URL or bare code
    Decode {
        /// Short URL (or 6-character code)
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let storage = storage::connect(&config.database).await?;

    // Ensure database is initialized
    storage.init().await?;

    let shortener = Shortener::new(storage, config.shortener());

    let outcome = match cli.command {
        Commands::Init => {
            println!("✅ Database schema is ready");
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Encode { url } => shortener.encode(&url).await,
        Commands::Decode { url } => shortener.decode(&url).await,
    };

    match outcome {
        Ok(value) => {
            println!("{}", value);
            Ok(ExitCode::SUCCESS)
        }
        Err(e @ (ShortenerError::InvalidUrl | ShortenerError::NotFound)) => {
            eprintln!("❌ {}", e);
            Ok(ExitCode::FAILURE)
        }
        Err(ShortenerError::Storage(e)) => Err(e.into()),
    }
}
