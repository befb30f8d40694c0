//! Consistent Hash Ring Module
//!
//! Maps keys to an ordered list of owning brokers using consistent hashing with
//! virtual nodes. This is the placement layer of the cluster.
//!
//! ## Mechanism
//! - **Hashing**: Keys and virtual-node labels are hashed with SHA-256; the first four
//!   bytes of the digest, read big-endian, give a position on the circle [0, 2^32).
//! - **Virtual nodes**: Each broker owns many positions (default 150), which smooths the
//!   load each physical broker takes over the hash space.
//! - **Placement**: A key belongs to the first virtual node clockwise from its hash;
//!   walking further clockwise over distinct brokers yields the replica set.
//!
//! The ring is built once from configuration at coordinator start and never mutated at
//! runtime, so it is shared across request handlers as a plain `Arc` with no locking.

pub mod hash;
pub mod ring;

#[cfg(test)]
mod tests;
