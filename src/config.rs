//! Environment Configuration
//!
//! Both binaries are configured entirely through environment variables, parsed once at
//! process start. Numeric knobs fall back to defaults on absence or parse failure; the
//! structured broker list is validated strictly because a silently dropped broker would
//! corrupt placement.

use anyhow::{Context, Result};

pub const DEFAULT_COORDINATOR_PORT: u16 = 7000;
pub const DEFAULT_BROKER_PORT: u16 = 5000;
pub const DEFAULT_REPLICATION_FACTOR: usize = 3;

/// One broker as named in `BROKER_NODES`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerEndpoint {
    pub name: String,
    pub url: String,
}

/// Parses `BROKER_NODES`, a comma-separated list of `name=url` pairs, e.g.
/// `node-a=http://node-a:5000,node-b=http://node-b:5000`.
pub fn broker_nodes_from_env() -> Result<Vec<BrokerEndpoint>> {
    let raw = std::env::var("BROKER_NODES")
        .context("BROKER_NODES is required (comma-separated name=url pairs)")?;
    parse_broker_nodes(&raw)
}

pub fn parse_broker_nodes(raw: &str) -> Result<Vec<BrokerEndpoint>> {
    let mut brokers = Vec::new();

    for pair in raw.split(',') {
        let pair = pair.trim();
        if pair.is_empty() {
            continue;
        }

        let (name, url) = pair
            .split_once('=')
            .with_context(|| format!("malformed BROKER_NODES entry '{}', expected name=url", pair))?;
        let name = name.trim();
        let url = url.trim().trim_end_matches('/');

        if name.is_empty() || url.is_empty() {
            anyhow::bail!("malformed BROKER_NODES entry '{}': empty name or url", pair);
        }
        if brokers.iter().any(|b: &BrokerEndpoint| b.name == name) {
            anyhow::bail!("duplicate broker name '{}' in BROKER_NODES", name);
        }

        brokers.push(BrokerEndpoint {
            name: name.to_string(),
            url: url.to_string(),
        });
    }

    if brokers.is_empty() {
        anyhow::bail!("BROKER_NODES lists no brokers");
    }
    Ok(brokers)
}

/// Total copies per key, primary included. Defaults to 3, floored at 1.
pub fn replication_factor_from_env() -> usize {
    std::env::var("REPLICATION_FACTOR")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(DEFAULT_REPLICATION_FACTOR)
        .max(1)
}

pub fn virtual_nodes_from_env() -> usize {
    std::env::var("VIRTUAL_NODES")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(crate::ring::ring::DEFAULT_VIRTUAL_NODES)
}

pub fn port_from_env(default: u16) -> u16 {
    std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok())
        .unwrap_or(default)
}

/// Broker self-identifier; must match the name the coordinator knows it by.
pub fn node_id_from_env() -> Result<String> {
    std::env::var("NODE_ID").context("NODE_ID is required for a broker process")
}
