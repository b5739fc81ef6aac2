/// Implied decimals of a health factor (wad)
pub const HEALTH_FACTOR_DECIMALS: u8 = 18;

/// Implied decimals of interest rates (ray)
pub const RAY_DECIMALS: u8 = 27;

/// Implied decimals of the pool's base currency (USD, 8 decimals)
pub const USD_VALUE_DECIMALS: u8 = 8;

/// 365 days, no leap-year adjustment
pub const SECONDS_PER_YEAR: i32 = 365 * 24 * 60 * 60;

/// Fractional digits every formatted token amount carries
pub const DISPLAY_DECIMALS: u8 = 6;

/// Health factors above this are shown as infinite
pub const HEALTH_FACTOR_INFINITY_THRESHOLD: f64 = 1_000_000.0;

/// Smallest health factor that is displayed as-is
pub const HEALTH_FACTOR_DISPLAY_FLOOR: f64 = 0.001;

pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";
pub const DEFAULT_TOKEN_DECIMALS: u8 = 18;

pub const NATIVE_SYMBOL: &str = "ETH";
pub const NATIVE_DECIMALS: u8 = 18;
