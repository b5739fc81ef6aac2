pub mod api;
pub mod balances;
pub mod blockchain_manager;
pub mod chain_reader;
pub mod config;
pub mod dashboard_service;
pub mod derived_metrics;
pub mod positions;
pub mod token_registry;
pub mod utils;
