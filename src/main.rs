use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use contest_settlement::Settler;
use contest_settlement::config::SettlementConfig;
use contest_settlement::eth::ChainClients;
use contest_settlement::store::PgContestStore;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("settlement run aborted: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    // Signer and chain setup fail here, before any contest is touched.
    let config = SettlementConfig::from_env()?;
    let chains = Arc::new(ChainClients::connect(&config)?);

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to connect to contest database")?;

    let settler = Settler::new(
        PgContestStore::new(pool),
        chains.clone(),
        chains,
        config.contest_timeout,
    );

    match config.interval {
        None => {
            settler.run_batch().await?;
        }
        Some(every) => loop {
            settler.run_batch().await?;
            tokio::time::sleep(every).await;
        },
    }

    Ok(())
}
