use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    balances::{apply_usd_prices, format_usd_value, total_usd_value, TokenBalance},
    chain_reader::ChainReader,
    dashboard_service::{DashboardService, DashboardSnapshot},
};

pub type SharedDashboard = Arc<DashboardService<dyn ChainReader>>;

/// Wallet balances, valued when the caller passed unit prices
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancesResponse {
    pub balances: Vec<TokenBalance>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_usd_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_usd_display: Option<String>,
}

/// Routes of the dashboard:
///
/// - `GET /health`
/// - `GET /portfolio/:address` full snapshot, outside of the session
/// - `GET /balances/:address?tokens=0x..,0x..&prices=ETH:2500,USDC:1` wallet balances,
///   all tracked tokens when `tokens` is absent, USD values for the priced symbols
/// - `GET /session`, `DELETE /session` current session snapshot / disconnect
/// - `POST /session/refresh/:address` refresh the session for a wallet
pub fn router(dashboard: SharedDashboard) -> Router {
    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/portfolio/:address", get(get_portfolio))
        .route("/balances/:address", get(get_balances))
        .route("/session", get(get_session).delete(clear_session))
        .route("/session/refresh/:address", post(refresh_session))
        .with_state(dashboard)
}

pub async fn start_server(dashboard: SharedDashboard, port: u16) -> Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    info!("Starting dashboard server on {}", addr);
    axum::Server::bind(&addr)
        .serve(router(dashboard).into_make_service())
        .await
        .context("Dashboard server stopped")?;
    Ok(())
}

async fn get_portfolio(
    State(dashboard): State<SharedDashboard>,
    Path(address): Path<String>,
) -> Json<DashboardSnapshot> {
    Json(dashboard.fetch_snapshot(&address).await)
}

async fn get_balances(
    State(dashboard): State<SharedDashboard>,
    Path(address): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<BalancesResponse> {
    let balances = match params.get("tokens") {
        Some(tokens) => {
            let tokens: Vec<&str> = tokens
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .collect();
            dashboard
                .balances()
                .get_multiple_token_balances(&tokens, &address)
                .await
        }
        None => dashboard.balances().get_all_token_balances(&address).await,
    };

    let response = match params.get("prices") {
        Some(prices) => {
            let balances = apply_usd_prices(balances, &parse_usd_prices(prices));
            let total = total_usd_value(&balances);
            BalancesResponse {
                balances,
                total_usd_value: Some(total),
                total_usd_display: Some(format_usd_value(total)),
            }
        }
        None => BalancesResponse {
            balances,
            total_usd_value: None,
            total_usd_display: None,
        },
    };
    Json(response)
}

/// `ETH:2500,usdc:1` as unit prices keyed by upper-case symbol, malformed entries skipped
fn parse_usd_prices(prices: &str) -> HashMap<String, f64> {
    prices
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .filter_map(|entry| {
            let parsed = entry
                .split_once(':')
                .map(|(symbol, price)| (symbol.trim(), price.trim().parse::<f64>()));
            match parsed {
                Some((symbol, Ok(price))) if !symbol.is_empty() && price.is_finite() => {
                    Some((symbol.to_uppercase(), price))
                }
                _ => {
                    warn!("Ignoring malformed price {:?}", entry);
                    None
                }
            }
        })
        .collect()
}

async fn get_session(
    State(dashboard): State<SharedDashboard>,
) -> Result<Json<DashboardSnapshot>, StatusCode> {
    dashboard.current().await.map(Json).ok_or(StatusCode::NO_CONTENT)
}

async fn clear_session(State(dashboard): State<SharedDashboard>) -> StatusCode {
    dashboard.disconnect().await;
    StatusCode::NO_CONTENT
}

async fn refresh_session(
    State(dashboard): State<SharedDashboard>,
    Path(address): Path<String>,
) -> (StatusCode, Json<DashboardSnapshot>) {
    let outcome = dashboard.refresh(&address).await;
    let status = if outcome.is_applied() {
        StatusCode::OK
    } else {
        // A newer refresh superseded this one
        StatusCode::CONFLICT
    };
    (status, Json(outcome.snapshot().clone()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::U256;

    use super::*;
    use crate::{
        chain_reader::{mock::MockChainReader, parse_address},
        config::{Network, NetworkConfig},
        dashboard_service::RetryPolicy,
    };

    const USER: &str = "0x00000000000000000000000000000000000000aa";

    fn dashboard(reader: MockChainReader) -> SharedDashboard {
        let reader: Arc<dyn ChainReader> = Arc::new(reader);
        let retry_policy = RetryPolicy {
            extra_attempts: 0,
            base_delay: Duration::from_millis(1),
        };
        Arc::new(DashboardService::new(
            reader,
            &NetworkConfig::for_network(Network::Base),
            retry_policy,
        ))
    }

    #[tokio::test]
    async fn test_session_round_trip() {
        let user = parse_address(USER).unwrap();
        let dashboard = dashboard(
            MockChainReader::new().with_native_balance(user, U256::from(3_000_000_000_000_000u64)),
        );

        assert_eq!(
            get_session(State(dashboard.clone())).await.unwrap_err(),
            StatusCode::NO_CONTENT
        );

        let (status, Json(snapshot)) =
            refresh_session(State(dashboard.clone()), Path(USER.to_string())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(snapshot.balances[0].balance_formatted, "0.003000");

        let Json(current) = get_session(State(dashboard.clone())).await.unwrap();
        assert_eq!(current.generation, snapshot.generation);

        assert_eq!(clear_session(State(dashboard.clone())).await, StatusCode::NO_CONTENT);
        assert!(get_session(State(dashboard)).await.is_err());
    }

    #[tokio::test]
    async fn test_balances_for_explicit_tokens() {
        let network = NetworkConfig::for_network(Network::Base);
        let user = parse_address(USER).unwrap();
        let dashboard = dashboard(MockChainReader::new().with_balance(
            network.weth.address,
            user,
            U256::from(1_000_000_000_000_000_000u128),
        ));

        let mut params = HashMap::new();
        params.insert("tokens".to_string(), format!("{}, ", network.weth.address));

        let Json(response) =
            get_balances(State(dashboard), Path(USER.to_string()), Query(params)).await;

        assert_eq!(response.balances.len(), 1);
        assert_eq!(response.balances[0].symbol, "WETH");
        assert_eq!(response.balances[0].balance_formatted, "1.000000");
        assert!(response.total_usd_value.is_none());
    }

    #[tokio::test]
    async fn test_balances_valued_with_caller_prices() {
        let network = NetworkConfig::for_network(Network::Base);
        let user = parse_address(USER).unwrap();
        let dashboard = dashboard(
            MockChainReader::new()
                .with_native_balance(user, U256::from(500_000_000_000_000_000u128))
                .with_balance(network.usdc.address, user, U256::from(1_234_560_000u64))
                .with_balance(
                    network.aero.address,
                    user,
                    U256::from(2_000_000_000_000_000_000u128),
                ),
        );

        let mut params = HashMap::new();
        params.insert("prices".to_string(), "eth:3000, USDC:1,AERO:oops".to_string());

        let Json(response) =
            get_balances(State(dashboard), Path(USER.to_string()), Query(params)).await;

        let total = response.total_usd_value.unwrap();
        assert!((total - 2734.56).abs() < 1e-9, "total was {}", total);
        assert_eq!(response.total_usd_display.as_deref(), Some("$2,734.56"));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["balances"][0]["usdValue"], 1500.0);
        assert_eq!(json["balances"][1]["balanceFormatted"], "1234.560000");
        assert!(json["balances"][2].get("usdValue").is_none());
        assert_eq!(json["totalUsdDisplay"], "$2,734.56");
    }

    #[test]
    fn test_parse_usd_prices() {
        let prices = parse_usd_prices("eth:2500, usdc : 1 ,,bad,:3,AERO:x");
        assert_eq!(prices.len(), 2);
        assert_eq!(prices["ETH"], 2500.0);
        assert_eq!(prices["USDC"], 1.0);
    }

    #[tokio::test]
    async fn test_snapshot_json_shape() {
        let network = NetworkConfig::for_network(Network::Base);
        let user = parse_address(USER).unwrap();
        let dashboard = dashboard(
            MockChainReader::new()
                .with_native_balance(user, U256::from(1_000_000_000_000_000_000u128))
                .failing_balance(network.weth.address),
        );

        let Json(snapshot) = get_portfolio(State(dashboard), Path(USER.to_string())).await;
        let json = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["userAddress"], USER);
        assert_eq!(json["balances"][0]["symbol"], "ETH");
        assert_eq!(json["balances"][0]["balanceFormatted"], "1.000000");
        assert_eq!(json["balancesStatus"]["status"], "partial");
        assert_eq!(json["balancesStatus"]["failed_reads"], 1);
        assert_eq!(json["lendingStatus"]["status"], "ok");
        assert_eq!(json["positions"], serde_json::json!([]));
        assert_eq!(json["healthFactorDisplay"], "∞");
        assert_eq!(json["riskTier"], "safe");
        assert!(json.get("fetchedAt").is_some());
        assert!(json["accountData"].get("healthFactor").is_some());
    }
}
