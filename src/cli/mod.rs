//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{StoreIntelConfig, DEFAULT_CONFIG_FILE};
use crate::error::StoreIntelError;
use crate::types::GenerationSettings;

/// Store Intelligence Assistant
#[derive(Parser, Debug)]
#[command(name = "store-intel", version, about = "Store Intelligence Assistant")]
pub struct Cli {
    /// Config file (TOML); environment variables override it
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat session
    Chat(ChatArgs),
    /// Ask a single question and print the answer
    Ask(AskArgs),
    /// Query a Genie space directly and print the JSON answer
    Genie(GenieArgs),
}

/// Sampling options shared by `chat` and `ask`.
#[derive(Args, Debug, Clone, Default)]
pub struct SamplingArgs {
    /// Temperature (0.0 - 2.0)
    #[arg(short, long)]
    pub temperature: Option<f64>,

    /// Max tokens
    #[arg(long)]
    pub max_tokens: Option<u32>,
}

impl SamplingArgs {
    pub fn settings(&self) -> GenerationSettings {
        GenerationSettings {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            ..Default::default()
        }
    }
}

/// Arguments for the `chat` subcommand.
#[derive(Parser, Debug)]
pub struct ChatArgs {
    #[command(flatten)]
    pub sampling: SamplingArgs,
}

/// Arguments for the `ask` subcommand.
#[derive(Parser, Debug)]
pub struct AskArgs {
    #[command(flatten)]
    pub sampling: SamplingArgs,

    /// The question
    pub question: String,
}

/// Arguments for the `genie` subcommand.
#[derive(Parser, Debug)]
pub struct GenieArgs {
    /// `store-performance`, `product-inventory`, or a raw space id
    #[arg(short, long, default_value = "store-performance")]
    pub space: String,

    /// Natural-language query
    pub query: String,
}

impl GenieArgs {
    /// Resolve the `--space` alias against the configured space ids.
    pub fn space_id(&self, config: &StoreIntelConfig) -> Result<String, StoreIntelError> {
        let (configured, env_var) = match self.space.as_str() {
            "store-performance" => (
                &config.spaces().store_performance,
                "GENIE_SPACE_STORE_PERFORMANCE_ID",
            ),
            "product-inventory" => (
                &config.spaces().product_inventory,
                "GENIE_SPACE_PRODUCT_INV_ID",
            ),
            raw => return Ok(raw.to_string()),
        };
        configured
            .clone()
            .ok_or_else(|| StoreIntelError::Configuration(format!("Missing {env_var}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SpaceIds;

    #[test]
    fn parse_chat_with_defaults() {
        let cli = Cli::try_parse_from(["store-intel", "chat"]).unwrap();
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_FILE));
        match cli.command {
            Commands::Chat(args) => {
                assert!(args.sampling.temperature.is_none());
                assert!(args.sampling.max_tokens.is_none());
            }
            other => panic!("expected Chat, got {other:?}"),
        }
    }

    #[test]
    fn parse_ask_with_options() {
        let cli = Cli::try_parse_from([
            "store-intel",
            "--config",
            "other.toml",
            "ask",
            "-t",
            "0.2",
            "--max-tokens",
            "512",
            "What is the overtime policy for vendors?",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("other.toml"));
        match cli.command {
            Commands::Ask(args) => {
                let settings = args.sampling.settings();
                assert_eq!(settings.temperature, Some(0.2));
                assert_eq!(settings.max_tokens, Some(512));
                assert_eq!(args.question, "What is the overtime policy for vendors?");
            }
            other => panic!("expected Ask, got {other:?}"),
        }
    }

    #[test]
    fn genie_space_aliases_resolve_from_config() {
        let config = StoreIntelConfig::new().with_spaces(SpaceIds {
            store_performance: Some("perf-space".into()),
            product_inventory: None,
        });

        let cli = Cli::try_parse_from(["store-intel", "genie", "sales last year"]).unwrap();
        let Commands::Genie(args) = cli.command else {
            panic!("expected Genie");
        };
        assert_eq!(args.space_id(&config).unwrap(), "perf-space");

        let cli = Cli::try_parse_from(["store-intel", "genie", "-s", "product-inventory", "q"]).unwrap();
        let Commands::Genie(args) = cli.command else {
            panic!("expected Genie");
        };
        assert!(matches!(args.space_id(&config), Err(StoreIntelError::Configuration(_))));

        let cli = Cli::try_parse_from(["store-intel", "genie", "-s", "01f0abc", "q"]).unwrap();
        let Commands::Genie(args) = cli.command else {
            panic!("expected Genie");
        };
        assert_eq!(args.space_id(&config).unwrap(), "01f0abc");
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["store-intel"]).is_err());
    }
}
