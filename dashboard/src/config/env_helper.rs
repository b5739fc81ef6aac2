use std::str::FromStr;

use anyhow::Result;

/// Load an optional environment variable.
///
/// Unset and blank values both count as absent.
pub fn load_optional_env_var(var_name: &str) -> Option<String> {
    std::env::var(var_name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Load an environment variable and parse it to the given type, falling back to
/// `default` when the variable is unset or blank
///
/// # Errors
///
/// Returns an error if the environment variable is set but is not a valid value for the given type
pub fn load_env_var_or<T: FromStr>(var_name: &str, default: T) -> Result<T> {
    match load_optional_env_var(var_name) {
        Some(var) => var
            .parse::<T>()
            .map_err(|_| anyhow::anyhow!("{} is not a valid {}", var_name, var)),
        None => Ok(default),
    }
}
