//! Operator CLI for the heir dual-store coordinator.

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use heir_core::config::AppConfig;
use heir_core::types::{CaseId, UserId};
use heir_graph::{GraphClient, GraphConfig};
use heir_store::{OwnedCase, Store};
use heir_sync::Coordinator;

#[derive(Parser)]
#[command(name = "heir-sync")]
#[command(about = "Relational/graph synchronization for inheritance cases")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file prefix (default: heir).
    #[arg(short, long, default_value = "heir", global = true)]
    config: String,
}

#[derive(Args)]
struct CaseArgs {
    /// Case to operate on.
    #[arg(long)]
    case_id: i64,
    /// Owner of the case.
    #[arg(long)]
    user_id: i64,
}

#[derive(Subcommand)]
enum Command {
    /// Create the relational tables if they do not exist.
    InitSchema,
    /// Project every person and relationship of a case that has no graph element yet.
    Reconcile(CaseArgs),
    /// Print projection status counts for a case.
    Status(CaseArgs),
    /// Remove a case's subgraph and reset its graph references.
    ClearGraph(CaseArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let settings = AppConfig::load(&cli.config)?;
    let store = Store::connect(&settings.database).await?;

    match cli.command {
        Command::InitSchema => {
            store.ensure_schema().await?;
            tracing::info!("Relational schema ensured");
        }
        Command::Status(ref args) => {
            let owned = resolve(&store, args).await?;
            let counts = store.projection_counts(&owned).await?;
            println!("{}", serde_json::to_string(&counts)?);
        }
        Command::Reconcile(ref args) => {
            let owned = resolve(&store, args).await?;
            let coordinator = connect_coordinator(store, &settings).await?;
            let report = coordinator.reconcile_case(&owned).await?;
            println!("{}", serde_json::to_string(&report)?);
        }
        Command::ClearGraph(ref args) => {
            let owned = resolve(&store, args).await?;
            let coordinator = connect_coordinator(store, &settings).await?;
            let reset = coordinator.clear_projection(&owned).await?;
            tracing::info!(case_id = args.case_id, rows_reset = reset, "Graph cleared");
        }
    }

    Ok(())
}

async fn resolve(store: &Store, args: &CaseArgs) -> anyhow::Result<OwnedCase> {
    Ok(store
        .resolve_owned_case(CaseId(args.case_id), UserId(args.user_id))
        .await?)
}

async fn connect_coordinator(store: Store, settings: &AppConfig) -> anyhow::Result<Coordinator> {
    let graph = GraphClient::connect(&GraphConfig::from(&settings.neo4j)).await?;
    Ok(Coordinator::new(store, Arc::new(graph)))
}
