//! Runtime configuration for the todo store.
//!
//! Values come from the environment. `from_lookup` takes any key lookup so
//! tests never have to mutate the process environment.

use std::time::Duration;

/// Endpoint root used when `TODO_API_URL` is unset.
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

pub const ENV_API_URL: &str = "TODO_API_URL";
pub const ENV_RECONCILE: &str = "TODO_RECONCILE";
pub const ENV_HTTP_TIMEOUT: &str = "TODO_HTTP_TIMEOUT_SECS";

/// How responses for the same record are merged when several are in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReconcilePolicy {
    /// Whichever response resolves last overwrites the local entry.
    #[default]
    LastResponseWins,
    /// Responses for a record are dropped once a newer mutation of that
    /// record has been issued.
    LatestIssuedWins,
}

impl ReconcilePolicy {
    fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "last-response" => Some(ReconcilePolicy::LastResponseWins),
            "latest-issued" => Some(ReconcilePolicy::LatestIssuedWins),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_base: String,
    pub reconcile: ReconcilePolicy,
    /// Applied by the HTTP transport; `None` leaves reqwest's default.
    pub request_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            reconcile: ReconcilePolicy::default(),
            request_timeout: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unset, empty or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_base = lookup(ENV_API_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or(defaults.api_base);

        let reconcile = match lookup(ENV_RECONCILE) {
            Some(raw) => ReconcilePolicy::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unknown {ENV_RECONCILE}, using default");
                defaults.reconcile
            }),
            None => defaults.reconcile,
        };

        let request_timeout = lookup(ENV_HTTP_TIMEOUT)
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            api_base,
            reconcile,
            request_timeout,
        }
    }
}
