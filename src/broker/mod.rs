//! Broker Storage Module
//!
//! Implements the per-node in-memory keyed store that backs the queue.
//!
//! ## Core Concepts
//! - **Roles**: Every entry is tagged `primary` or `replica`; a replica remembers the
//!   node that pushed it. Writes to the same key are last-writer-wins on arrival order.
//! - **Replication**: The primary path writes locally and then pushes copies to each
//!   replica broker over HTTP. Fan-out failures are reported, not fatal.
//! - **Promotion**: The coordinator can promote this node to a writable primary after a
//!   failover; the event is captured in the local audit log.
//! - **Audit**: Every store/replicate/promote appends a classified audit record.

pub mod handlers;
pub mod protocol;
pub mod store;

#[cfg(test)]
mod tests;
