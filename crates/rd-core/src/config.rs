use anyhow::{anyhow, Result};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

/// Returns the value of `name`, or an empty string when unset or not unicode.
pub fn env_or_empty(name: &str) -> String {
    env::var(name).unwrap_or_default()
}

/// First variable in `names` that is set to a non-blank value.
pub fn first_env(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}

pub fn socket_addr_from_env(name: &str, default: &str) -> Result<SocketAddr> {
    let value = env::var(name).unwrap_or_else(|_| default.to_string());
    SocketAddr::from_str(&value).map_err(|err| anyhow!("invalid socket addr for {name}: {err}"))
}

pub fn u64_from_env(name: &str, default: u64) -> Result<u64> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|err| anyhow!("invalid integer for {name}: {err}")),
        Err(_) => Ok(default),
    }
}
