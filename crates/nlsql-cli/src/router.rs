// Command routing and dispatch

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::{
    commands::{AskCommand, Command, ConfigCommand, SchemaCommand, TablesCommand},
    error::CliResult,
    logging,
    settings::{Settings, SettingsLoader},
};

/// nlsql - ask questions of a SQLite database in plain language
#[derive(Parser, Debug)]
#[command(name = "nlsql")]
#[command(bin_name = "nlsql")]
#[command(about = "Ask questions of a SQLite database in plain language")]
#[command(
    long_about = "nlsql translates a question into SQL with a language model, runs it against a SQLite database, asks the model to fix the query when the database rejects it, and answers in plain language.\n\nExamples:\n  nlsql -d shop.db ask \"How many orders are there?\"\n  nlsql -d shop.db ask --sequential --steps \"Top customer by spend?\"\n  nlsql -d shop.db tables\n  nlsql -d shop.db schema orders customers"
)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite database file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Config file (default: ./nlsql.toml, then the user config directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Answer a question with a generated query
    #[command(about = "Translate a question into SQL, run it, and answer")]
    Ask {
        /// Question in plain language
        #[arg(value_name = "QUESTION")]
        question: String,

        /// Let the model pick the relevant tables first
        #[arg(long)]
        sequential: bool,

        /// Print the query result instead of a generated answer
        #[arg(long)]
        raw: bool,

        /// Print every generated query and its outcome
        #[arg(long)]
        steps: bool,

        /// Execution attempts allowed when the database rejects a query
        #[arg(long, value_name = "N")]
        max_tries: Option<usize>,

        /// Row-limit hint given to the model
        #[arg(long, value_name = "N")]
        top_k: Option<usize>,
    },

    /// List the tables visible to the model
    #[command(about = "List the tables visible to the model")]
    Tables,

    /// Print the schema text given to the model
    #[command(about = "Print the schema text given to the model")]
    Schema {
        /// Tables to describe (default: all)
        #[arg(value_name = "TABLE")]
        tables: Vec<String>,
    },

    /// Print the effective settings
    #[command(about = "Print the effective settings as TOML")]
    Config,
}

/// Command router
pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments and route to appropriate handler
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();
        Self::execute(&cli).await
    }

    /// Execute a command
    pub async fn execute(cli: &Cli) -> CliResult<()> {
        let settings = Self::load_settings(cli)?;
        logging::init_logging(cli.verbose, cli.quiet, settings.log_level.as_deref());
        debug!(command = ?cli.command, "Dispatching command");

        match &cli.command {
            Commands::Ask {
                question,
                sequential,
                ..
            } => {
                let cmd = AskCommand::new(question.clone(), settings).with_sequential(*sequential);
                cmd.execute().await
            }
            Commands::Tables => TablesCommand::new(settings).execute().await,
            Commands::Schema { tables } => {
                SchemaCommand::new(tables.clone(), settings).execute().await
            }
            Commands::Config => ConfigCommand::new(settings).execute().await,
        }
    }

    /// Load layered settings and apply command-line overrides
    pub fn load_settings(cli: &Cli) -> CliResult<Settings> {
        let loader = cli
            .config
            .clone()
            .map(SettingsLoader::with_path)
            .unwrap_or_default();
        let mut settings = loader.load_layers()?;
        Self::apply_overrides(&mut settings, cli);
        settings.validate()?;
        Ok(settings)
    }

    /// Flags win over file and environment values
    pub fn apply_overrides(settings: &mut Settings, cli: &Cli) {
        if let Some(path) = &cli.database {
            settings.database.path = Some(path.clone());
        }

        if let Commands::Ask {
            raw,
            steps,
            max_tries,
            top_k,
            ..
        } = &cli.command
        {
            if *raw {
                settings.chain.return_raw_result = true;
            }
            if *steps {
                settings.chain.return_intermediate_steps = true;
            }
            if let Some(max_tries) = max_tries {
                settings.chain.max_tries = *max_tries;
            }
            if let Some(top_k) = top_k {
                settings.chain.top_k = *top_k;
            }
        }
    }
}
