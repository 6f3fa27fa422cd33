//! Host configuration.

use std::time::Duration;

/// Tunables for the native I/O host.
///
/// Passed to [`IoBridge::new`] and [`NetworkStreamExecutor::new`];
/// defaults are suitable for development.
///
/// [`IoBridge::new`]: crate::bridge::IoBridge::new
/// [`NetworkStreamExecutor::new`]: crate::net::NetworkStreamExecutor::new
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// `User-Agent` sent on outbound requests.
    pub user_agent: String,
    /// Deadline applied to requests that carry no explicit timeout.
    pub default_timeout: Duration,
    /// Idle connections kept per host by the pooled transport.
    pub pool_max_idle_per_host: usize,
    /// Default length for file read chunks when the caller passes 0.
    pub read_chunk_size: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("sluice/", env!("CARGO_PKG_VERSION")).to_string(),
            default_timeout: Duration::from_secs(30),
            pool_max_idle_per_host: 8,
            read_chunk_size: 64 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = HostConfig::default();
        assert!(config.user_agent.starts_with("sluice/"));
        assert_eq!(config.default_timeout, Duration::from_secs(30));
        assert_eq!(config.read_chunk_size, 64 * 1024);
    }
}
