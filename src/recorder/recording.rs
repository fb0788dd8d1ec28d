//! An ordered, timestamped log of actions

use crate::processing::optimize::optimize_actions;
use crate::processing::stats::RecordingStats;
use crate::recorder::action::Action;
use crate::recorder::error::{RecordingError, RecordingResult};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    created_at: DateTime<Utc>,
    actions: Vec<Action>,
}

impl Default for Recording {
    fn default() -> Self {
        Self::new()
    }
}

impl Recording {
    /// Create an empty recording stamped with the current time
    pub fn new() -> Self {
        Self::with_created_at(Utc::now())
    }

    pub fn with_created_at(created_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            actions: Vec::new(),
        }
    }

    /// Build a recording from already captured actions.
    ///
    /// Every timestamp must be finite, non-negative and no earlier than the one
    /// before it, and every payload must validate.
    pub fn from_actions(created_at: DateTime<Utc>, actions: Vec<Action>) -> RecordingResult<Self> {
        let mut recording = Self::with_created_at(created_at);
        recording.actions.reserve(actions.len());
        for action in actions {
            recording.push(action)?;
        }
        Ok(recording)
    }

    pub(crate) fn push(&mut self, action: Action) -> RecordingResult<()> {
        let timestamp = action.timestamp();
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(RecordingError::invalid_parameter(format!(
                "timestamp must be a non-negative number of seconds, got {}",
                timestamp
            )));
        }
        if let Some(last) = self.actions.last() {
            if timestamp < last.timestamp() {
                return Err(RecordingError::invalid_parameter(format!(
                    "timestamp {} is earlier than the previous action at {}",
                    timestamp,
                    last.timestamp()
                )));
            }
        }
        action.payload().validate()?;
        self.actions.push(action);
        Ok(())
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action_count(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Offset of the latest action in seconds (0 for an empty recording)
    pub fn duration(&self) -> f64 {
        self.actions
            .iter()
            .map(Action::timestamp)
            .fold(0.0, f64::max)
    }

    /// Return a copy with redundant actions removed. `self` is left untouched.
    pub fn optimize(&self) -> Recording {
        Recording {
            created_at: self.created_at,
            actions: optimize_actions(&self.actions),
        }
    }

    pub fn stats(&self) -> RecordingStats {
        RecordingStats::compute(self)
    }
}
