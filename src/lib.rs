//! Distributed Keyed Message Queue Library
//!
//! This library crate defines the core modules that make up the queue cluster.
//! It serves as the foundation for the two binary executables (`coordinator` and `broker`).
//!
//! ## Architecture Modules
//! The system is composed of five loosely coupled subsystems:
//!
//! - **`ring`**: The placement layer. A consistent-hash ring with virtual nodes that maps
//!   every key to a deterministic, ordered list of owning brokers.
//! - **`broker`**: The storage layer. A per-node in-memory keyed store with role tags
//!   (primary/replica), synchronous replication fan-out, and an append-only audit log.
//! - **`health`**: The liveness layer. Periodically probes every broker and raises
//!   failure/recovery events after threshold crossings.
//! - **`failover`**: The promotion layer. Reacts to failure events, promotes a surviving
//!   replica, and maintains the routing override map consulted on every request.
//! - **`coordinator`**: The routing layer. Resolves effective placement (ring + overrides)
//!   and orchestrates produce replication and consume fallback over HTTP.

pub mod broker;
pub mod config;
pub mod coordinator;
pub mod failover;
pub mod health;
pub mod ring;
