//! Agent Swarm
//!
//! Registers a population of agents with the ledger, serves their roster, and
//! keeps every agent trading points with its friends until the process is
//! stopped.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use swarm_core::setup::PopulationSummary;
use swarm_core::{bootstrap, launch_agents, server, Config};
use swarm_ledger::HttpLedger;
use tracing_subscriber::EnvFilter;

/// Command line arguments for the swarm
#[derive(Parser, Debug)]
#[command(name = "agent_swarm")]
#[command(about = "Simulated agents trading points over a ledger")]
struct Args {
    /// Path to the TOML config file
    #[arg(long, default_value = swarm_core::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Random seed for reproducible bootstrap and agent behavior
    #[arg(long)]
    seed: Option<u64>,

    /// Override the configured population size
    #[arg(long)]
    agents: Option<usize>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("agent_swarm=info,swarm_core=info,swarm_ledger=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load_or_default(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(agents) = args.agents {
        config.population.size = agents;
    }
    config.validate()?;

    let mut rng = match args.seed {
        Some(seed) => {
            tracing::info!("Seed: {}", seed);
            SmallRng::seed_from_u64(seed)
        }
        None => SmallRng::from_entropy(),
    };

    let ledger = Arc::new(HttpLedger::new(&config.ledger.base_url)?);
    tracing::info!("Using ledger at {}", ledger.base_url());

    let agents = bootstrap(&config, &*ledger, &mut rng).await?;
    tracing::info!("\n{}", PopulationSummary::from_agents(&agents));

    let roster: server::Roster = Arc::new(agents);
    let listener = tokio::net::TcpListener::bind(config.server.bind_addr)
        .await
        .with_context(|| format!("binding status endpoint to {}", config.server.bind_addr))?;
    tracing::info!("Status endpoint listening on {}", listener.local_addr()?);
    tokio::spawn({
        let roster = Arc::clone(&roster);
        async move {
            if let Err(e) = server::serve(listener, roster).await {
                tracing::error!("Status endpoint stopped: {}", e);
            }
        }
    });

    let mut tasks = launch_agents(&roster, ledger, &mut rng);
    tracing::info!("Launched {} agents", tasks.len());

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            tracing::error!("Agent task ended: {}", e);
        }
    }
    Ok(())
}
