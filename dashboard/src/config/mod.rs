pub mod env_helper;
pub mod local_config;
pub mod network;

pub use local_config::LocalConfig;
pub use network::{Network, NetworkConfig};
