use anyhow::{Context, Result};

use super::{
    env_helper::{load_env_var_or, load_optional_env_var},
    network::{Network, NetworkConfig},
};

#[derive(Debug, Clone)]
pub struct LocalConfig {
    pub rpc_url: String,
    pub network: NetworkConfig,
    pub port: u16,
    pub lending_fetch_retries: u32,
    pub lending_retry_delay_ms: u64,
}

impl LocalConfig {
    pub fn load_from_env() -> Result<Self> {
        let network: Network = load_env_var_or("NETWORK", Network::Base)?;
        let mut network_config = NetworkConfig::for_network(network);

        if let Some(pool_address) = load_optional_env_var("POOL_ADDRESS") {
            network_config.lending_pool = pool_address
                .parse()
                .context(format!("POOL_ADDRESS is not a valid address: {}", pool_address))?;
        }

        Ok(Self {
            rpc_url: load_optional_env_var("RPC_URL")
                .unwrap_or_else(|| network.default_rpc_url().to_string()),
            network: network_config,
            port: load_env_var_or("PORT", 8080)?,
            lending_fetch_retries: load_env_var_or("LENDING_FETCH_RETRIES", 2)?,
            lending_retry_delay_ms: load_env_var_or("LENDING_RETRY_DELAY_MS", 1000)?,
        })
    }
}
