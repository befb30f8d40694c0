//! Health Detection Module
//!
//! Watches every broker from the coordinator and decides when one is dead.
//!
//! ## Core Mechanisms
//! - **Probing**: A single periodic tick drives one round of HTTP `/health` probes,
//!   each bounded by a per-probe timeout so an unresponsive broker cannot stall the loop.
//! - **Threshold declaration**: A broker is declared FAILED only after a configured
//!   number of consecutive probe failures, which filters transient network blips.
//!   One successful probe moves any failed state to RECOVERED and resets the counter.
//! - **Event channel**: FAILED/RECOVERED transitions are pushed over an mpsc channel
//!   to the failover controller, which drains them serially. The detector never acts
//!   on failures itself.

pub mod detector;
pub mod types;
