//! Command Clinic CLI
//!
//! Thin veneer over the library: record events, manage aliases, run an
//! analysis, sweep old logs. Actual command dispatch belongs to the host
//! launcher; `launch` here only records the telemetry event.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use command_clinic::{
    Alias, AliasRegistry, AliasUpdate, AnalysisPipeline, EventStore, LaunchTarget,
    ProposalPayload, Settings,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "clinic", about = "Local usage telemetry for a command launcher", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record raw launcher input text
    Input {
        /// The text typed into the launcher search bar
        text: String,
    },

    /// Record a launch through an alias
    Launch {
        /// Id of the alias that was launched
        alias_id: String,
    },

    /// Manage the alias registry
    Aliases {
        #[command(subcommand)]
        action: AliasAction,
    },

    /// Analyze recent events and print proposals
    Analyze {
        /// Calendar days to look back over
        #[arg(long)]
        days: Option<u32>,

        /// Maximum events fed into the analysis
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Delete day-partition files past the retention window
    Clean {
        /// Retention window in days
        #[arg(long)]
        retention: Option<u32>,
    },

    /// Probe storage access
    Doctor,
}

#[derive(Subcommand)]
enum AliasAction {
    /// List all aliases
    List,

    /// Add a new alias
    Add {
        /// Unique id (synthesized from the target when omitted)
        #[arg(long, default_value = "")]
        id: String,

        /// Display name
        #[arg(long)]
        title: String,

        /// Extension owner
        #[arg(long)]
        owner: String,

        /// Extension name
        #[arg(long)]
        extension: String,

        /// Command name
        #[arg(long)]
        command: String,
    },

    /// Rename an alias
    Rename {
        /// Id of the alias to rename
        id: String,

        /// New display name
        title: String,
    },

    /// Remove an alias
    Remove {
        /// Id of the alias to remove
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let settings = Settings::load().context("failed to load settings")?;
    let store = EventStore::new(&settings.support_dir);
    let registry = AliasRegistry::new(&settings.support_dir);

    match cli.command {
        Command::Input { text } => {
            store.log_input(&text).await?;
        }

        Command::Launch { alias_id } => {
            let Some(alias) = registry.find(&alias_id).await? else {
                bail!("no alias with id '{alias_id}'");
            };
            store.log_launch(&alias.id, alias.target).await?;
        }

        Command::Aliases { action } => run_alias_action(&registry, action).await?,

        Command::Analyze { days, limit } => {
            let days = days.unwrap_or(settings.lookback_days);
            let limit = limit.unwrap_or(settings.event_limit);

            let events = store.read_recent(days, limit).await?;
            let pipeline = AnalysisPipeline::from_settings(&settings);
            let analysis = pipeline.analyze(&events).await?;

            if analysis.is_empty() {
                println!("No proposals. Keep using the launcher and try again later.");
                return Ok(());
            }

            for proposal in &analysis.proposals {
                println!("[{:?}] {}", proposal.kind, proposal.title);
                println!("  {}", proposal.rationale);
                match &proposal.payload {
                    ProposalPayload::Shortcut {
                        alias_id,
                        suggested_hotkey,
                    } => println!("  bind {suggested_hotkey} to alias '{alias_id}'"),
                    ProposalPayload::Snippet { text, alias } => {
                        println!("  expand '{alias}' to: {text}")
                    }
                    ProposalPayload::Macro { sequence } => {
                        println!("  chain: {}", sequence.join(" -> "))
                    }
                }
                println!("  confidence: {:.2}", proposal.confidence);
            }

            for hint in &analysis.extension_hints {
                println!(
                    "hint: install '{}' (saw '{}' {} times) - {}",
                    hint.extension_name, hint.keyword, hint.frequency, hint.description
                );
            }
        }

        Command::Clean { retention } => {
            let retention = retention.unwrap_or(settings.retention_days);
            let deleted = store.clean_old_logs(retention).await;
            println!("Deleted {deleted} old log file(s)");
        }

        Command::Doctor => {
            if store.check_access().await {
                println!("Storage access: ok ({})", settings.support_dir.display());
            } else {
                bail!(
                    "storage directory is not writable: {}",
                    settings.support_dir.display()
                );
            }
        }
    }

    Ok(())
}

async fn run_alias_action(registry: &AliasRegistry, action: AliasAction) -> anyhow::Result<()> {
    match action {
        AliasAction::List => {
            for alias in registry.list().await? {
                let hotkey = alias.suggest_hotkey.as_deref().unwrap_or("-");
                println!("{}  {}  {}  {}", alias.id, alias.title, alias.target, hotkey);
            }
        }

        AliasAction::Add {
            id,
            title,
            owner,
            extension,
            command,
        } => {
            registry
                .add(Alias {
                    id,
                    title,
                    target: LaunchTarget::new(owner, extension, command),
                    suggest_hotkey: None,
                })
                .await?;
        }

        AliasAction::Rename { id, title } => {
            registry
                .update(
                    &id,
                    AliasUpdate {
                        title: Some(title),
                        ..AliasUpdate::default()
                    },
                )
                .await?;
        }

        AliasAction::Remove { id } => {
            registry.remove(&id).await?;
        }
    }

    Ok(())
}
