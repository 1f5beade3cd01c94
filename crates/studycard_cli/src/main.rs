//! `studycard` command-line shell.
//!
//! # Responsibility
//! - Map one user action (ask, list, star, unstar, delete) to one core call.
//! - Resolve configuration and logging before touching storage or network.

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use std::path::PathBuf;
use studycard_core::{
    init_logging_from_config, AnswerClient, AppConfig, CardQuery, Category, JsonCardStore,
    StudyService, ViewCache, ViewKind, DEFAULT_MAX_RETRIES,
};

#[derive(Parser)]
#[command(
    name = "studycard",
    about = "Ask AI product manager interview questions and keep study cards",
    version
)]
struct Cli {
    /// Card file (overrides STUDYCARD_DATA_FILE)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Ask the AI a question
    Ask {
        /// Question text
        question: String,
        /// Category slug or label
        #[arg(long, short, default_value = "fundamentals")]
        category: Category,
        /// Save the answer as a study card
        #[arg(long)]
        save: bool,
        /// Maximum provider attempts
        #[arg(long, default_value_t = DEFAULT_MAX_RETRIES)]
        retries: u32,
    },

    /// List cards of one view (category slug, label, or `starred`)
    List {
        view: ViewKind,
        /// Only cards whose question or answer contains this text
        #[arg(long, short)]
        search: Option<String>,
    },

    /// Show card counts per view
    Views,

    /// Star a card
    Star { id: String },

    /// Remove a card's star
    Unstar { id: String },

    /// Delete a card
    Delete { id: String },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(path) = cli.data_file {
        config.data_file = path;
    }
    init_logging_from_config(&config).map_err(anyhow::Error::msg)?;
    info!(
        "event=cli_start module=cli status=ok version={} credential={}",
        studycard_core::core_version(),
        config.provider.api_key.is_some()
    );

    let answers =
        AnswerClient::from_config(&config.provider).context("failed to set up AI client")?;
    let store =
        JsonCardStore::with_cache(config.data_file.clone(), ViewCache::new(config.cache_ttl));
    let mut service = StudyService::new(store, answers);
    let format = cli.format;

    match cli.command {
        Command::Ask {
            question,
            category,
            save,
            retries,
        } => {
            let pending = service
                .ask_with_retries(&question, category, retries)
                .context("failed to get an AI answer")?;
            render::answer(pending, format)?;
            if save {
                let card = service.save_pending().context("failed to save card")?;
                render::saved(&card, format)?;
            }
        }
        Command::List { view, search } => {
            let query = CardQuery::matching(view, search.unwrap_or_default());
            let cards = service.list(&query).context("failed to read cards")?;
            render::cards(view, &query, &cards, format)?;
        }
        Command::Views => {
            let counts = service.counts().context("failed to read cards")?;
            render::counts(&counts, format)?;
        }
        Command::Star { id } => {
            service.star(&id).context("failed to star card")?;
            render::done("starred", &id, format)?;
        }
        Command::Unstar { id } => {
            service.unstar(&id).context("failed to unstar card")?;
            render::done("unstarred", &id, format)?;
        }
        Command::Delete { id } => {
            service.delete(&id).context("failed to delete card")?;
            render::done("deleted", &id, format)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, OutputFormat};
    use clap::{CommandFactory, Parser};
    use studycard_core::{Category, ViewKind};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_format_flag_parses_after_subcommand() {
        let cli =
            Cli::try_parse_from(["studycard", "list", "starred", "--format", "json"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(
            cli.command,
            Command::List {
                view: ViewKind::Starred,
                search: None
            }
        ));
    }

    #[test]
    fn ask_defaults_to_fundamentals_plain_output() {
        let cli = Cli::try_parse_from(["studycard", "ask", "什么是RAG？"]).unwrap();
        assert!(matches!(cli.format, OutputFormat::Plain));
        match cli.command {
            Command::Ask {
                category,
                save,
                retries,
                ..
            } => {
                assert_eq!(category, Category::Fundamentals);
                assert!(!save);
                assert_eq!(retries, 3);
            }
            _ => panic!("expected ask"),
        }
    }
}
