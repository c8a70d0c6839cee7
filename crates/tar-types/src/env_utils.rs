//! Environment variable helpers.
//!
//! Every tunable in the workspace is read through these so that defaults and
//! "empty means unset" behave the same everywhere.
//!
//! ```
//! use tar_types::env_utils::{env_string, env_var_or};
//!
//! let depth: usize = env_var_or("TAR_MAX_LINEAGE_DEPTH", 1024);
//! let network: Option<String> = env_string("TAR_NETWORK");
//! ```

use std::str::FromStr;

/// Parse an environment variable, `None` if unset or unparsable.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

/// Parse an environment variable, falling back to `default`.
pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// Read a string variable, treating blank values as unset.
pub fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
