//! Coordinator Routing Module
//!
//! The request-facing half of the control plane. On every produce/consume the router
//! consults the ring for raw placement, applies the failover override map from a single
//! consistent snapshot, and then talks to brokers over HTTP.
//!
//! ## Data Path
//! - **produce**: resolve effective primary and replicas, single-attempt `POST /store`
//!   on the primary; the primary fans out replication and its per-replica report is
//!   surfaced verbatim. A dead primary is a 503 — the coordinator never retries.
//! - **consume**: try the effective primary, then each effective replica in ring order;
//!   first broker holding the key wins. Only reads have built-in fallback.
//!
//! No lock is held across any outbound call: state is snapshotted first, I/O after.

pub mod handlers;
pub mod protocol;
pub mod router;
