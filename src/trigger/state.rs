use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::matching::pipeline::PipelineOutcome;

/// Lifecycle of a trigger controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerState {
    #[default]
    Idle,
    /// A rule list fetch or pipeline run is in flight.
    Processing,
}

/// A key event as seen by the controller.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent<E> {
    /// Physical key code, e.g. `"Space"`.
    pub code: String,
    /// Auto-repeat from a held key.
    pub repeat: bool,
    /// Element the event was dispatched to.
    pub target: Option<E>,
}

impl<E> KeyEvent<E> {
    pub fn new(code: &str, target: Option<E>) -> Self {
        Self {
            code: code.to_string(),
            repeat: false,
            target,
        }
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }
}

/// Why a key event was left to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PassReason {
    OtherKey,
    Repeat,
    TextEntry,
}

/// What happened to one key event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum KeyOutcome {
    /// The page keeps the key's native behaviour.
    Passthrough { reason: PassReason },
    /// Suppressed, but another trigger was already in flight.
    Dropped,
    Completed { report: TriggerReport },
}

impl KeyOutcome {
    pub fn prevents_default(&self) -> bool {
        !matches!(self, Self::Passthrough { .. })
    }
}

/// Summary of one processed trigger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerReport {
    pub trigger_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rule_count: usize,
    /// The rule list could not be read and was treated as empty.
    pub fetch_failed: bool,
    pub outcome: PipelineOutcome,
}
