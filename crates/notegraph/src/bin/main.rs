//! NoteGraph CLI

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use notegraph::{ConfigSources, LogFormat, Session, init_logging};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::ExitCode;

/// NoteGraph - link graph, search and tag queries over a folder of notes
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the vault directory (`~` and $VARS are expanded)
    #[arg(short, long, env = "NOTEGRAPH_VAULT", global = true)]
    vault: Option<String>,

    /// Config file (toml, yaml or json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Configuration profile (development, production, large-vault, minimal)
    #[arg(short, long, global = true)]
    profile: Option<String>,

    /// Log line format on stderr (text, json)
    #[arg(long, default_value = "text", global = true)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Note, tag, orphan and missing-link counts
    Stats {
        #[arg(long)]
        folder: Option<String>,
    },
    /// Notes linking to NAME
    Backlinks {
        name: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
    },
    /// Breadth-first walk from one or more notes
    Traverse {
        #[arg(required = true)]
        roots: Vec<String>,
        #[arg(short, long)]
        depth: Option<usize>,
        /// Folder whose notes are not visited (repeatable)
        #[arg(long = "exclude-folder")]
        exclude_folders: Vec<String>,
    },
    /// Search note content line by line
    Search {
        query: String,
        /// substring, whole_word or regex
        #[arg(short, long, default_value = "substring")]
        mode: String,
        /// Also report notes whose name matches
        #[arg(long)]
        names: bool,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Notes nothing links to
    Orphans {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Link targets with no note
    Missing {
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Notes with names close to NAME
    Similar {
        name: String,
        #[arg(long)]
        max_distance: Option<usize>,
    },
    /// List tool names
    Tools,
    /// Run any tool with JSON arguments
    Call {
        tool: String,
        #[arg(default_value = "{}")]
        arguments: String,
    },
    /// Answer JSON-lines requests from stdin on stdout
    Serve,
    /// Like serve, rebuilding the index whenever the vault changes
    Watch,
}

impl Command {
    /// Tool name and arguments for the one-shot subcommands
    fn as_tool_call(&self) -> anyhow::Result<Option<(String, Value)>> {
        let call = match self {
            Self::Stats { folder } => ("stats", json!({ "folder": folder })),
            Self::Backlinks {
                name,
                limit,
                offset,
            } => (
                "backlinks",
                json!({ "name": name, "limit": limit, "offset": offset }),
            ),
            Self::Traverse {
                roots,
                depth,
                exclude_folders,
            } => (
                "traverse",
                json!({
                    "roots": roots,
                    "max_depth": depth,
                    "exclude_folders": exclude_folders,
                }),
            ),
            Self::Search {
                query,
                mode,
                names,
                limit,
            } => (
                "search",
                json!({
                    "query": query,
                    "mode": mode,
                    "include_names": names,
                    "limit": limit,
                }),
            ),
            Self::Orphans { limit } => ("orphans", json!({ "limit": limit })),
            Self::Missing { limit } => ("missing_notes", json!({ "limit": limit })),
            Self::Similar { name, max_distance } => (
                "similar_names",
                json!({ "name": name, "max_distance": max_distance }),
            ),
            Self::Call { tool, arguments } => {
                let arguments: Value = serde_json::from_str(arguments)
                    .with_context(|| format!("Arguments for {} are not valid JSON", tool))?;
                return Ok(Some((tool.clone(), arguments)));
            }
            Self::Tools | Self::Serve | Self::Watch => return Ok(None),
        };
        Ok(Some((call.0.to_string(), strip_nulls(call.1))))
    }
}

/// Drop unset optional arguments so the router applies its defaults
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            Value::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect())
        }
        other => other,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run(Args::parse()).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<ExitCode> {
    if let Command::Tools = args.command {
        for name in Session::tool_names() {
            println!("{}", name);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut sources = ConfigSources::new();
    sources.vault = args.vault.clone();
    sources.file = args.config.clone();
    sources.profile = args.profile.clone();
    let config = sources.load().context("Failed to load configuration")?;

    init_logging(&config.log_level, args.log_format)?;
    log::info!("NoteGraph v{}", env!("CARGO_PKG_VERSION"));

    if !config.vault_path.is_dir() {
        bail!(
            "Vault not found: {} (pass --vault or set NOTEGRAPH_VAULT)",
            config.vault_path.display()
        );
    }

    let session = Session::open(&config)
        .await
        .with_context(|| format!("Failed to index {}", config.vault_path.display()))?;

    if let Some((tool, arguments)) = args.command.as_tool_call()? {
        let reply = session.call(&tool, arguments).await;
        println!("{}", serde_json::to_string_pretty(&reply)?);
        let failed = reply.get("error").is_some();
        return Ok(if failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        });
    }

    // `serve` also follows the vault when the config asks for it
    let watcher = if matches!(args.command, Command::Watch) || config.watch_for_changes {
        Some(session.watch()?)
    } else {
        None
    };

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let answered = session.serve(stdin, tokio::io::stdout()).await?;
    log::debug!("Served {} requests", answered);

    if let Some(watcher) = watcher {
        watcher.abort();
    }
    Ok(ExitCode::SUCCESS)
}
