//! Hash Ring
//!
//! Responsible for mapping keys to their primary and replica brokers. The ring keeps a
//! sorted array of virtual-node positions and answers lookups with a binary search plus
//! a clockwise walk, so placement is deterministic on every node that shares the same
//! broker list.
//!
//! ## Mechanism
//! - **Insertion**: Each broker contributes `virtual_nodes` positions, one per label
//!   `"<name>:vnode<i>"`. A position collision is resolved by probing +1 (mod 2^32)
//!   until a free slot is found, so every position maps to exactly one broker.
//! - **Lookup**: Binary search for the smallest position >= hash(key), wrapping to the
//!   start of the array when the hash exceeds the largest position, then a forward walk
//!   collecting distinct broker names.

use super::hash::{HASH_SPACE, ring_position};
use anyhow::Result;
use std::collections::HashMap;

/// Default number of virtual nodes placed on the ring per broker.
pub const DEFAULT_VIRTUAL_NODES: usize = 150;

/// One virtual node: a position on the circle owned by a named broker.
#[derive(Debug, Clone)]
struct VirtualNode {
    position: u32,
    broker: String,
}

/// A registered broker and the positions it owns.
#[derive(Debug, Clone)]
pub struct BrokerNode {
    pub name: String,
    pub url: String,
    pub virtual_positions: Vec<u32>,
}

/// The result of a key lookup: the clockwise owner list and the key's own hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPlacement {
    pub primary: String,
    pub replicas: Vec<String>,
    pub key_hash: u32,
}

pub struct HashRing {
    virtual_nodes: usize,
    /// Sorted by position; positions are unique.
    points: Vec<VirtualNode>,
    brokers: HashMap<String, BrokerNode>,
    /// Broker names in registration order, used for the failover candidate walk.
    order: Vec<String>,
}

impl HashRing {
    pub fn new() -> Self {
        Self::with_virtual_nodes(DEFAULT_VIRTUAL_NODES)
    }

    pub fn with_virtual_nodes(virtual_nodes: usize) -> Self {
        Self {
            virtual_nodes: virtual_nodes.max(1),
            points: Vec::new(),
            brokers: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Inserts a broker and all of its virtual positions.
    ///
    /// Re-adding an existing name first removes its old positions, so the
    /// operation is idempotent for an unchanged label.
    pub fn add_node(&mut self, name: &str, url: &str) {
        if self.brokers.contains_key(name) {
            self.remove_node(name);
        }

        let mut virtual_positions = Vec::with_capacity(self.virtual_nodes);
        for i in 0..self.virtual_nodes {
            let label = format!("{}:vnode{}", name, i);
            let position = self.insert_point(ring_position(&label), name);
            virtual_positions.push(position);
        }

        self.brokers.insert(
            name.to_string(),
            BrokerNode {
                name: name.to_string(),
                url: url.to_string(),
                virtual_positions,
            },
        );
        self.order.push(name.to_string());

        tracing::debug!(
            "Ring: added {} with {} virtual nodes ({} total positions)",
            name,
            self.virtual_nodes,
            self.points.len()
        );
    }

    /// Removes every virtual position owned by `name`.
    pub fn remove_node(&mut self, name: &str) {
        self.points.retain(|point| point.broker != name);
        self.brokers.remove(name);
        self.order.retain(|n| n != name);
    }

    /// Returns (primary, replicas, key hash) for a key.
    ///
    /// Walks clockwise from the first position >= hash(key), collecting distinct
    /// broker names until `replica_count` are gathered or every position has been
    /// seen. The first name is the primary. Looking up on an empty ring is a
    /// programmer error and is surfaced to the caller.
    pub fn nodes_for_key(&self, key: &str, replica_count: usize) -> Result<KeyPlacement> {
        if self.points.is_empty() {
            anyhow::bail!("hash ring is empty; no brokers registered");
        }

        let key_hash = ring_position(key);
        let start = match self.points.partition_point(|p| p.position < key_hash) {
            idx if idx == self.points.len() => 0,
            idx => idx,
        };

        let mut owners: Vec<String> = Vec::new();
        for step in 0..self.points.len() {
            let point = &self.points[(start + step) % self.points.len()];
            if !owners.contains(&point.broker) {
                owners.push(point.broker.clone());
                if owners.len() == replica_count.max(1) {
                    break;
                }
            }
        }

        let primary = owners.remove(0);
        Ok(KeyPlacement {
            primary,
            replicas: owners,
            key_hash,
        })
    }

    pub fn node_url(&self, name: &str) -> Option<&str> {
        self.brokers.get(name).map(|b| b.url.as_str())
    }

    pub fn node(&self, name: &str) -> Option<&BrokerNode> {
        self.brokers.get(name)
    }

    /// Broker names in registration order.
    pub fn node_names(&self) -> &[String] {
        &self.order
    }

    pub fn node_count(&self) -> usize {
        self.brokers.len()
    }

    pub fn virtual_nodes_per_broker(&self) -> usize {
        self.virtual_nodes
    }

    pub fn total_virtual_nodes(&self) -> usize {
        self.points.len()
    }

    /// Share of the hash space owned by `name`, as a percentage.
    ///
    /// Each position owns the arc reaching back to its predecessor, so the sum
    /// over all brokers is 100 (up to rounding).
    pub fn coverage(&self, name: &str) -> f64 {
        if self.points.is_empty() {
            return 0.0;
        }
        if self.points.len() == 1 {
            return if self.points[0].broker == name { 100.0 } else { 0.0 };
        }

        let mut owned: u64 = 0;
        for (i, point) in self.points.iter().enumerate() {
            if point.broker != name {
                continue;
            }
            let prev = if i == 0 {
                self.points[self.points.len() - 1].position
            } else {
                self.points[i - 1].position
            };
            owned += point.position.wrapping_sub(prev) as u64;
        }

        owned as f64 / HASH_SPACE as f64 * 100.0
    }

    /// Places one position, probing +1 (mod 2^32) past occupied slots.
    /// Returns the position actually used.
    fn insert_point(&mut self, mut position: u32, broker: &str) -> u32 {
        loop {
            match self
                .points
                .binary_search_by(|p| p.position.cmp(&position))
            {
                Ok(_) => position = position.wrapping_add(1),
                Err(idx) => {
                    self.points.insert(
                        idx,
                        VirtualNode {
                            position,
                            broker: broker.to_string(),
                        },
                    );
                    return position;
                }
            }
        }
    }
}

impl Default for HashRing {
    fn default() -> Self {
        Self::new()
    }
}
