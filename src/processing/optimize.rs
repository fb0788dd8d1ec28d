//! Redundant action removal
//!
//! Two rules, applied in one pass over adjacent actions:
//! - a mouse move immediately followed by another mouse move is dropped, since
//!   only the last position before the next non-move action matters
//! - consecutive pauses collapse into one pause lasting their combined duration
//!
//! The output never contains two adjacent moves or two adjacent pauses, so
//! optimizing twice gives the same result as optimizing once.

use crate::recorder::action::{Action, ActionPayload, PauseData};

pub fn optimize_actions(actions: &[Action]) -> Vec<Action> {
    let mut out: Vec<Action> = Vec::with_capacity(actions.len());

    for action in actions {
        if let Some(last) = out.last_mut() {
            match (last.payload(), action.payload()) {
                (ActionPayload::MouseMove(_), ActionPayload::MouseMove(_)) => {
                    // Superseded move: keep only the later one
                    *last = action.clone();
                    continue;
                }
                (ActionPayload::Pause(first), ActionPayload::Pause(next)) => {
                    let merged = Action::new(
                        last.timestamp(),
                        ActionPayload::Pause(PauseData {
                            duration: first.duration + next.duration,
                        }),
                    );
                    *last = merged;
                    continue;
                }
                _ => {}
            }
        }
        out.push(action.clone());
    }

    tracing::debug!(
        "Optimized {} actions down to {}",
        actions.len(),
        out.len()
    );
    out
}
