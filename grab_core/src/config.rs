use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;

use crate::destination::DestinationPolicy;
use crate::types::types::FetchError;

/// Idle connections kept per host between units.
const MAX_IDLE_PER_HOST: usize = 8;

/// Settings for the fetch-and-save handler and the runner around it.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub destination: DestinationPolicy,
    /// Deadline for one unit (request, body and write together).
    pub unit_timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            destination: DestinationPolicy::PerItem {
                dir: PathBuf::from("."),
            },
            unit_timeout: None,
            connect_timeout: Duration::from_secs(10),
        }
    }
}

impl FetchConfig {
    /// Builds the single HTTP client shared by every unit of a run.
    pub fn build_client(&self) -> Result<Client, FetchError> {
        Client::builder()
            .connect_timeout(self.connect_timeout)
            .pool_max_idle_per_host(MAX_IDLE_PER_HOST)
            .tcp_nodelay(true)
            .build()
            .map_err(FetchError::Client)
    }
}
