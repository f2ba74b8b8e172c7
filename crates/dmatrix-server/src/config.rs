//! Server configuration from environment.

use std::collections::BTreeSet;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    /// Relational credentials for the `/status` health probe. The probe
    /// is skipped when either is unset; the cache is the only state this
    /// service owns.
    pub db_user: Option<String>,
    pub db_name: Option<String>,
    pub allowed_countries: BTreeSet<String>,
    /// Retention window for computation records.
    pub result_ttl: Duration,
    /// Concurrent path-engine invocations.
    pub max_concurrent_jobs: usize,
    /// Jobs queued or running before submissions are rejected.
    pub max_queued_jobs: usize,
    pub expiry_sweep_interval: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: env::var("DMATRIX_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3000),
            db_user: env::var("DMATRIX_DB_USER").ok(),
            db_name: env::var("DMATRIX_DB_NAME").ok(),
            allowed_countries: env::var("DMATRIX_ALLOWED_COUNTRIES")
                .ok()
                .map(|raw| {
                    raw.split(',')
                        .map(|country| country.trim().to_uppercase())
                        .filter(|country| !country.is_empty())
                        .collect()
                })
                .unwrap_or_else(default_countries),
            result_ttl: Duration::from_secs(
                env::var("DMATRIX_RESULT_TTL_S")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            max_concurrent_jobs: env::var("DMATRIX_MAX_CONCURRENT_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8),
            max_queued_jobs: env::var("DMATRIX_MAX_QUEUED_JOBS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(64),
            expiry_sweep_interval: Duration::from_secs(
                env::var("DMATRIX_EXPIRY_SWEEP_S")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60),
            ),
        }
    }
}

fn default_countries() -> BTreeSet<String> {
    ["FI", "SE", "NO", "DK", "DE", "EE"]
        .iter()
        .map(|country| country.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable() {
        let countries = default_countries();
        assert!(countries.contains("FI"));
        assert_eq!(countries.len(), 6);
    }
}
