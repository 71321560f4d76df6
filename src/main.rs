//! Refgraph CLI - article reference bookkeeping and graph rendering

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use refgraph::config::{self, RefgraphConfig};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "refgraph")]
#[command(version)]
#[command(about = "Track article references and render them as a graph")]
#[command(long_about = r#"
Refgraph records which articles reference other articles or external URLs,
and renders the reference set as a graph of nodes and links.

Example usage:
  refgraph init
  refgraph bind --source-id 1 --source-name Intro --file refs.json
  refgraph graph --user 1 --only-inner
  refgraph check --url https://example.com/logo.png
  refgraph serve --port 9999
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print machine-readable JSON instead of human output
    #[arg(long, global = true)]
    json: bool,

    /// Path to the config file (defaults to refgraph.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file (overrides config)
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter config and create the database directory
    Init {
        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },

    /// Replace all references of a source article
    Bind {
        /// Id of the referencing article
        #[arg(long)]
        source_id: i64,

        /// Display name of the referencing article
        #[arg(long)]
        source_name: String,

        /// JSON file with an array of references ("-" for stdin); omit to clear
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Owner of the references (defaults to config user)
        #[arg(short, long)]
        user: Option<i64>,
    },

    /// Remove all references of a source article
    Delete {
        #[arg(long)]
        source_id: i64,
    },

    /// Check whether any article references a URL
    Check {
        #[arg(long)]
        url: String,
    },

    /// List the references of a source article
    List {
        #[arg(long)]
        source_id: i64,
    },

    /// Render the reference graph of a user
    Graph {
        /// User whose references are rendered (defaults to config user)
        #[arg(short, long)]
        user: Option<i64>,

        /// Only article-to-article references
        #[arg(long)]
        only_inner: bool,

        /// Node identity policy: name | stable_id
        #[arg(long)]
        identity: Option<String>,
    },

    /// Show database statistics
    Stats,

    /// Serve the reference API over HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

pub fn emit_success(output_mode: OutputMode, command: &str, data: serde_json::Value) -> anyhow::Result<()> {
    if output_mode == OutputMode::Json {
        let envelope = serde_json::json!({
            "command": command,
            "ok": true,
            "data": data,
        });
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    }
    Ok(())
}

fn emit_error(output_mode: OutputMode, command: &str, err: &anyhow::Error) {
    match output_mode {
        OutputMode::Json => {
            let envelope = serde_json::json!({
                "command": command,
                "ok": false,
                "error": format!("{:#}", err),
            });
            println!("{}", envelope);
        }
        OutputMode::Human => refgraph::ui::error(&format!("{:#}", err)),
    }
}

/// Resolved settings shared by every command
pub struct Context {
    pub output_mode: OutputMode,
    pub config: RefgraphConfig,
    pub config_path: PathBuf,
    pub database: PathBuf,
}

impl Context {
    pub fn user(&self, explicit: Option<i64>) -> anyhow::Result<i64> {
        explicit
            .or(self.config.user)
            .ok_or_else(|| anyhow::anyhow!("no user given (use --user or set `user` in the config)"))
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging; stdout stays clean for --json
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let output_mode = if cli.json { OutputMode::Json } else { OutputMode::Human };
    let command = command_name(&cli.command);

    if let Err(err) = run(cli, output_mode) {
        emit_error(output_mode, command, &err);
        std::process::exit(1);
    }
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Init { .. } => "init",
        Commands::Bind { .. } => "bind",
        Commands::Delete { .. } => "delete",
        Commands::Check { .. } => "check",
        Commands::List { .. } => "list",
        Commands::Graph { .. } => "graph",
        Commands::Stats => "stats",
        Commands::Serve { .. } => "serve",
    }
}

fn run(cli: Cli, output_mode: OutputMode) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let config = config::load_config(Some(&config_path))?.unwrap_or_default();
    let database = cli.database.clone().unwrap_or_else(|| config.database_path());

    let ctx = Context {
        output_mode,
        config,
        config_path,
        database,
    };

    match cli.command {
        Commands::Init { force } => commands::run_init(&ctx, force),
        Commands::Bind { source_id, source_name, file, user } => {
            commands::run_bind(&ctx, user, source_id, &source_name, file.as_deref())
        }
        Commands::Delete { source_id } => commands::run_delete(&ctx, source_id),
        Commands::Check { url } => commands::run_check(&ctx, &url),
        Commands::List { source_id } => commands::run_list(&ctx, source_id),
        Commands::Graph { user, only_inner, identity } => {
            commands::run_graph(&ctx, user, only_inner, identity.as_deref())
        }
        Commands::Stats => commands::run_stats(&ctx),
        Commands::Serve { port } => commands::run_serve(&ctx, port),
    }
}
