use std::sync::Arc;

use anyhow::{Context, Result};
use dashboard::{
    api,
    blockchain_manager::{AlloyChainReader, BlockchainManager},
    chain_reader::ChainReader,
    config::LocalConfig,
    dashboard_service::{DashboardService, RetryPolicy},
    utils,
};
use tracing::{error, info};

/// Main entry point for the Seamless dashboard
///
/// This function performs the following steps:
/// 1. Initializes the pre-run environment
/// 2. Connects to the configured network
/// 3. Serves the dashboard until the server stops
#[tokio::main(flavor = "multi_thread")]
async fn main() -> Result<()> {
    init_pre_run()?;

    let local_config = LocalConfig::load_from_env().context("Failed to load configuration")?;

    info!(
        "Starting the dashboard on {} (chain {}, pool {}, rpc {})",
        local_config.network.network,
        local_config.network.network.chain_id(),
        local_config.network.lending_pool,
        local_config.rpc_url
    );

    let provider = BlockchainManager::get_provider(&local_config)?;
    let reader: Arc<dyn ChainReader> = Arc::new(AlloyChainReader::new(provider));

    let dashboard = Arc::new(DashboardService::new(
        reader,
        &local_config.network,
        RetryPolicy::from_config(&local_config),
    ));

    if let Err(e) = api::start_server(dashboard, local_config.port).await {
        let error_message = e
            .chain()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join(" -> ");
        error!("Dashboard server failed with error: {}", error_message);
        return Err(e);
    }

    Ok(())
}

/// Initializes the pre-run environment
///
/// This function performs the following steps:
/// 1. Loads environment variables from the `.env` file when there is one
/// 2. Sets up the logger
fn init_pre_run() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        // Every variable has a default, a missing .env is fine
        if !e.not_found() {
            return Err(e).context("Failed to load environment variables");
        }
    }
    utils::logger::setup_logger().context("Failed to setup logger")?;
    Ok(())
}
