//! Aggregate metrics over a recording

use crate::input::types::Point;
use crate::recorder::action::ActionKind;
use crate::recorder::recording::Recording;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingStats {
    /// Offset of the last action in seconds
    pub total_duration: f64,
    pub action_count: usize,
    /// Number of actions of each kind that occurs at least once
    pub counts_by_kind: BTreeMap<ActionKind, usize>,
    /// Straight-line cursor travel between consecutive mouse positions, in pixels
    pub mouse_distance: f64,
    /// `action_count / total_duration`, or 0 for a zero-length recording
    pub actions_per_second: f64,
}

impl RecordingStats {
    pub fn compute(recording: &Recording) -> Self {
        let mut counts_by_kind = BTreeMap::new();
        let mut mouse_distance = 0.0;
        let mut last_point: Option<Point> = None;

        for action in recording.actions() {
            *counts_by_kind.entry(action.kind()).or_insert(0) += 1;

            for point in action.payload().points() {
                if let Some(previous) = last_point {
                    mouse_distance += previous.distance_to(point);
                }
                last_point = Some(point);
            }
        }

        let total_duration = recording.duration();
        let action_count = recording.action_count();
        let actions_per_second = if total_duration > 0.0 {
            action_count as f64 / total_duration
        } else {
            0.0
        };

        Self {
            total_duration,
            action_count,
            counts_by_kind,
            mouse_distance,
            actions_per_second,
        }
    }

    /// Count for one kind (0 if absent)
    pub fn count(&self, kind: ActionKind) -> usize {
        self.counts_by_kind.get(&kind).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::types::MouseButton;
    use crate::recorder::action::{
        Action, ActionPayload, KeyPressData, MouseClickData, MouseDragData, MouseMoveData,
    };
    use chrono::Utc;

    fn recording(actions: Vec<Action>) -> Recording {
        Recording::from_actions(Utc::now(), actions).unwrap()
    }

    #[test]
    fn test_empty_recording_has_no_rate() {
        let stats = Recording::new().stats();
        assert_eq!(stats.action_count, 0);
        assert_eq!(stats.total_duration, 0.0);
        assert_eq!(stats.actions_per_second, 0.0);
        assert_eq!(stats.mouse_distance, 0.0);
    }

    #[test]
    fn test_zero_duration_has_no_rate() {
        let stats = recording(vec![
            Action::new(0.0, ActionPayload::KeyPress(KeyPressData { key: "a".into() })),
            Action::new(0.0, ActionPayload::KeyPress(KeyPressData { key: "b".into() })),
        ])
        .stats();
        assert_eq!(stats.action_count, 2);
        assert_eq!(stats.actions_per_second, 0.0);
    }

    #[test]
    fn test_counts_distance_and_rate() {
        let stats = recording(vec![
            Action::new(
                0.0,
                ActionPayload::MouseMove(MouseMoveData {
                    x: 0,
                    y: 0,
                    duration: 0.0,
                }),
            ),
            Action::new(
                1.0,
                ActionPayload::MouseClick(MouseClickData {
                    x: 3,
                    y: 4,
                    button: MouseButton::Left,
                    clicks: 1,
                }),
            ),
            Action::new(1.5, ActionPayload::KeyPress(KeyPressData { key: "a".into() })),
            Action::new(
                2.0,
                ActionPayload::MouseDrag(MouseDragData {
                    start_x: 3,
                    start_y: 4,
                    end_x: 3,
                    end_y: 14,
                    button: MouseButton::Left,
                    duration: 0.5,
                }),
            ),
        ])
        .stats();

        assert_eq!(stats.action_count, 4);
        assert_eq!(stats.total_duration, 2.0);
        assert_eq!(stats.actions_per_second, 2.0);
        // 5 (move -> click) + 0 (click -> drag start) + 10 (drag)
        assert_eq!(stats.mouse_distance, 15.0);
        assert_eq!(stats.count(ActionKind::MouseMove), 1);
        assert_eq!(stats.count(ActionKind::KeyPress), 1);
        assert_eq!(stats.count(ActionKind::Hotkey), 0);
    }
}
