//! Seam to the semantic navigation engine.
//!
//! The core only ever has one goal outstanding. A goal resolves exactly once
//! (success or failure) via the event board, with zero or more progress
//! notifications first. There is no cancellation primitive.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use uuid::Uuid;

use crate::events::EventBoard;

/// Final-approach behavior at the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApproachMode {
    /// Drive all the way onto the waypoint.
    On,
    /// Stop within the goal's minimum distance of the waypoint.
    Near,
}

/// One navigation request as handed to the navigator.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationGoal {
    pub location: String,
    pub approach: ApproachMode,
    pub retries: u32,
    pub timeout: Duration,
    pub distance: f64,
}

/// Fire-and-forget navigation client. The terminal outcome and any progress
/// arrive asynchronously on the event board, never through a return value.
pub trait Navigator {
    fn send_goal(&self, goal: NavigationGoal) -> Uuid;
}

/// Simulated navigator for the demo binary. Each goal is resolved on a
/// spawned task after a fixed travel time, with a couple of progress
/// notifications on the way. `fail_next` makes the next goal end in a
/// terminal failure instead (and then clears itself).
pub struct SimNavigator {
    board: Arc<EventBoard>,
    travel_time: Duration,
    fail_next: AtomicBool,
}

impl SimNavigator {
    pub fn new(board: Arc<EventBoard>, travel_time: Duration) -> Self {
        Self {
            board,
            travel_time,
            fail_next: AtomicBool::new(false),
        }
    }

    pub fn fail_next_goal(&self) {
        self.fail_next.store(true, Ordering::SeqCst);
    }
}

impl Navigator for SimNavigator {
    fn send_goal(&self, goal: NavigationGoal) -> Uuid {
        let handle = Uuid::new_v4();
        let board = self.board.clone();
        let travel_time = self.travel_time;
        let fail = self.fail_next.swap(false, Ordering::SeqCst);

        tokio::spawn(async move {
            let step = travel_time / 3;
            for remaining in [2.0_f64, 1.0] {
                tokio::time::sleep(step).await;
                board.set_nav_feedback(
                    remaining,
                    format!("heading to {}", goal.location),
                    false,
                );
            }
            tokio::time::sleep(step).await;
            if fail {
                board.set_nav_outcome(false, format!("no path to {}", goal.location));
            } else {
                board.set_nav_feedback(goal.distance, format!("arrived at {}", goal.location), false);
                board.set_nav_outcome(true, format!("arrived at {}", goal.location));
            }
        });

        handle
    }
}
