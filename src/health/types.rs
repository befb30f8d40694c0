use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a broker as seen by the coordinator's detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    /// Responding to probes.
    Healthy,
    /// Crossed the consecutive-failure threshold; writes must not route here.
    Failed,
    /// Failed and a replica has been promoted in its place. The override map
    /// keeps primary traffic away until operators intervene.
    FailedOver,
    /// Responded again after being declared failed. Routing overrides are
    /// deliberately retained.
    Recovered,
}

/// Event emitted by the detector towards the failover controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    Failed(String),
    Recovered(String),
}

/// Per-broker probe bookkeeping held at the coordinator.
///
/// Transitions are monotone per failure episode: it takes `threshold`
/// consecutive failed probes to declare FAILED, and a single successful probe
/// to move any failed state to RECOVERED.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthRecord {
    pub status: NodeStatus,
    pub fail_count: u32,
    pub last_check: Option<DateTime<Utc>>,
    pub last_success: Option<DateTime<Utc>>,
    pub failed_at: Option<DateTime<Utc>>,
}

impl HealthRecord {
    pub fn new() -> Self {
        Self {
            status: NodeStatus::Healthy,
            fail_count: 0,
            last_check: None,
            last_success: None,
            failed_at: None,
        }
    }

    /// Applies one successful probe. Returns true when this probe brought the
    /// broker back from a failed state.
    pub fn record_success(&mut self) -> bool {
        let now = Utc::now();
        self.last_check = Some(now);
        self.last_success = Some(now);
        self.fail_count = 0;

        match self.status {
            NodeStatus::Failed | NodeStatus::FailedOver => {
                self.status = NodeStatus::Recovered;
                true
            }
            NodeStatus::Healthy | NodeStatus::Recovered => false,
        }
    }

    /// Applies one failed probe. Returns true when this probe crossed the
    /// threshold and declared the broker FAILED.
    pub fn record_failure(&mut self, threshold: u32) -> bool {
        let now = Utc::now();
        self.last_check = Some(now);
        self.fail_count += 1;

        match self.status {
            NodeStatus::Healthy | NodeStatus::Recovered => {
                if self.fail_count >= threshold {
                    self.status = NodeStatus::Failed;
                    self.failed_at = Some(now);
                    return true;
                }
                false
            }
            // Already declared; keep counting but emit nothing new.
            NodeStatus::Failed | NodeStatus::FailedOver => false,
        }
    }
}

impl Default for HealthRecord {
    fn default() -> Self {
        Self::new()
    }
}
