use msgmux::RouterConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub(crate) listen: ListenConfig,
    pub(crate) router: RouterSection,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ListenConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RouterSection {
    pub(crate) queue_capacity: usize,
    pub(crate) sweep_interval_ms: u64,
    pub(crate) max_age_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        let defaults = RouterConfig::default();
        Self {
            listen: ListenConfig {
                host: "0.0.0.0".to_string(),
                port: 1234,
            },
            router: RouterSection {
                queue_capacity: defaults.queue_capacity,
                sweep_interval_ms: defaults.sweep_interval.as_millis() as u64,
                max_age_secs: defaults.max_age.as_secs(),
            },
        }
    }
}

impl RouterSection {
    pub(crate) fn to_router_config(&self) -> RouterConfig {
        RouterConfig {
            queue_capacity: self.queue_capacity,
            sweep_interval: Duration::from_millis(self.sweep_interval_ms),
            max_age: Duration::from_secs(self.max_age_secs),
        }
    }
}
