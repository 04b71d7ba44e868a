//! Command-line interface
//!
//! One binary, one subcommand per pipeline pass. The passes run in
//! import → geocode → enrich → moods → export order for a full refresh,
//! but each stands alone. Credentials come from flags/environment or the
//! secrets file and are only demanded by the passes that use them.

use crate::config::{AppConfig, DEFAULT_SECRETS_PATH};
use crate::store::{DEFAULT_CSV_PATH, DEFAULT_STORE_PATH};
use crate::workflow;
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "barkartan")]
#[command(about = "Stockholm bar map data pipeline")]
#[command(version)]
pub struct Cli {
    /// Google Places API key (overrides the secrets file)
    #[arg(long, global = true, env = "GOOGLE_API_KEY", hide_env_values = true)]
    pub google_api_key: Option<String>,

    /// OpenAI API key (overrides the secrets file)
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Secrets file holding API keys
    #[arg(long, global = true, default_value = DEFAULT_SECRETS_PATH)]
    pub secrets: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import a CSV file into the JSON store
    Import {
        /// Tabular source file
        #[arg(default_value = DEFAULT_CSV_PATH)]
        csv: PathBuf,

        /// Store file to rewrite
        #[arg(long, default_value = DEFAULT_STORE_PATH)]
        store: PathBuf,
    },

    /// Resolve coordinates for unresolved records via Nominatim
    Geocode {
        /// Store file
        #[arg(default_value = DEFAULT_STORE_PATH)]
        store: PathBuf,

        /// Re-geocode every record, including already resolved ones
        #[arg(long)]
        force: bool,
    },

    /// Match bars against Google Places and derive tags
    Enrich {
        /// Store file
        #[arg(default_value = DEFAULT_STORE_PATH)]
        store: PathBuf,

        /// Overwrite real coordinates with the Places result
        #[arg(long)]
        force: bool,
    },

    /// Classify bar moods from review text
    Moods {
        /// Store file
        #[arg(default_value = DEFAULT_STORE_PATH)]
        store: PathBuf,
    },

    /// Export the store as a CSV snapshot
    Export {
        /// Store file
        #[arg(default_value = DEFAULT_STORE_PATH)]
        store: PathBuf,

        /// Output file
        #[arg(long, default_value = DEFAULT_CSV_PATH)]
        out: PathBuf,
    },

    /// Ask which bars fit a free-text request
    Ask {
        /// The request, e.g. "cheap beer and a dance floor"
        message: String,

        /// Store file
        #[arg(long, default_value = DEFAULT_STORE_PATH)]
        store: PathBuf,
    },
}

/// Run one parsed invocation to completion.
pub async fn run(cli: Cli) -> Result<()> {
    let config = AppConfig::resolve(cli.google_api_key, cli.openai_api_key, &cli.secrets);

    match cli.command {
        Command::Import { csv, store } => {
            workflow::import::run(&csv, &store)?;
        }
        Command::Geocode { store, force } => {
            workflow::geocode::run(&store, force).await?;
        }
        Command::Enrich { store, force } => {
            workflow::enrich::run(&config, &store, force).await?;
        }
        Command::Moods { store } => {
            workflow::moods::run(&config, &store).await?;
        }
        Command::Export { store, out } => {
            workflow::export::run(&store, &out)?;
        }
        Command::Ask { message, store } => {
            let outcome = workflow::ask::run(&config, &store, &message).await?;
            println!("{}", outcome.reply);
            for bar in &outcome.matches {
                println!("  {} ({})", bar.name, bar.id);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_defaults() {
        let cli = Cli::try_parse_from(["barkartan", "import"]).unwrap();
        match cli.command {
            Command::Import { csv, store } => {
                assert_eq!(csv, PathBuf::from(DEFAULT_CSV_PATH));
                assert_eq!(store, PathBuf::from(DEFAULT_STORE_PATH));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_geocode_force_flag() {
        let cli = Cli::try_parse_from(["barkartan", "geocode", "my.json", "--force"]).unwrap();
        match cli.command {
            Command::Geocode { store, force } => {
                assert_eq!(store, PathBuf::from("my.json"));
                assert!(force);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_ask_requires_a_message() {
        assert!(Cli::try_parse_from(["barkartan", "ask"]).is_err());

        let cli = Cli::try_parse_from(["barkartan", "ask", "somewhere cheap"]).unwrap();
        match cli.command {
            Command::Ask { message, .. } => assert_eq!(message, "somewhere cheap"),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_key_flag_parses_after_subcommand() {
        let cli =
            Cli::try_parse_from(["barkartan", "enrich", "--google-api-key", "k123"]).unwrap();
        assert_eq!(cli.google_api_key.as_deref(), Some("k123"));
    }

    #[test]
    fn test_missing_subcommand_is_an_error() {
        assert!(Cli::try_parse_from(["barkartan"]).is_err());
    }
}
