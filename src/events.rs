//! Shared event state between the asynchronous event sources and the
//! control loop.
//!
//! Button samples, order submissions, localization completion and navigator
//! callbacks all land here; the control loop drains the board exactly once
//! per tick. Every flag has read-and-clear semantics so no event is ever
//! processed twice. This is the only contested resource in the core — one
//! mutex around a plain flags struct, writers on their own tasks, a single
//! reader on the control thread.

use std::sync::Mutex;

use crate::error::OrderRejection;
use crate::services::gateway::OrderTicket;
use crate::state_machine::RobotState;

/// Terminal resolution of an outstanding navigation goal.
#[derive(Debug, Clone, PartialEq)]
pub struct NavOutcome {
    pub success: bool,
    pub message: String,
}

/// Latest non-terminal progress notification from the navigator.
#[derive(Debug, Clone, PartialEq)]
pub struct NavFeedback {
    pub distance: f64,
    pub message: String,
}

impl NavFeedback {
    /// Progress text published to the order gateway at the sub-rate.
    pub fn status_text(&self) -> String {
        format!("Distance : {}, Message : {}", self.distance, self.message)
    }
}

/// One tick's worth of drained events.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickEvents {
    pub green_edge: bool,
    pub red_edge: bool,
    pub localized: bool,
    pub nav_outcome: Option<NavOutcome>,
    pub nav_retry_signal: bool,
    pub order: Option<OrderTicket>,
}

#[derive(Debug)]
struct Flags {
    green_edge: bool,
    red_edge: bool,
    localized: bool,
    nav_outcome: Option<NavOutcome>,
    nav_retry_signal: bool,
    latest_nav_feedback: Option<NavFeedback>,
    pending_order: Option<OrderTicket>,
    // Mirror of the machine's tick-owned state, published after every tick.
    // Collaborators read it; only the control loop writes it.
    machine_state: RobotState,
    order_in_progress: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            green_edge: false,
            red_edge: false,
            localized: false,
            nav_outcome: None,
            nav_retry_signal: false,
            latest_nav_feedback: None,
            pending_order: None,
            machine_state: RobotState::Initialization,
            order_in_progress: false,
        }
    }
}

/// The mutation-safe event container shared by all event sources.
#[derive(Debug, Default)]
pub struct EventBoard {
    flags: Mutex<Flags>,
}

impl EventBoard {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Flags> {
        self.flags.lock().expect("event board mutex poisoned")
    }

    pub fn set_green_edge(&self) {
        self.lock().green_edge = true;
    }

    pub fn set_red_edge(&self) {
        self.lock().red_edge = true;
    }

    pub fn set_localized(&self) {
        self.lock().localized = true;
    }

    /// Records the terminal notification of the outstanding navigation goal.
    pub fn set_nav_outcome(&self, success: bool, message: impl Into<String>) {
        self.lock().nav_outcome = Some(NavOutcome {
            success,
            message: message.into(),
        });
    }

    /// Records a non-terminal progress notification. The latest one is kept
    /// for status emission; a retry marker additionally raises the retry
    /// flag for the next tick.
    pub fn set_nav_feedback(&self, distance: f64, message: impl Into<String>, retry: bool) {
        let mut flags = self.lock();
        flags.latest_nav_feedback = Some(NavFeedback {
            distance,
            message: message.into(),
        });
        if retry {
            flags.nav_retry_signal = true;
        }
    }

    /// Order submission from the gateway. Accepted only while the machine is
    /// at the pickup point with no delivery in progress; at most one order
    /// is ever pending, a concurrent second submission is rejected, never
    /// queued.
    pub fn submit_order(&self, destination: &str) -> Result<OrderTicket, OrderRejection> {
        let mut flags = self.lock();
        if flags.order_in_progress || flags.pending_order.is_some() {
            return Err(OrderRejection::DeliveryInProgress);
        }
        if flags.machine_state != RobotState::AtPickup {
            return Err(OrderRejection::NotAtPickup);
        }
        let ticket = OrderTicket::new(destination);
        flags.pending_order = Some(ticket.clone());
        Ok(ticket)
    }

    /// Preemption of an accepted order is a no-op by design: the gateway's
    /// action semantics make accepted orders non-cancelable.
    pub fn set_order_preempted(&self) {}

    pub fn take_green_edge(&self) -> bool {
        std::mem::take(&mut self.lock().green_edge)
    }

    pub fn take_red_edge(&self) -> bool {
        std::mem::take(&mut self.lock().red_edge)
    }

    pub fn take_localized(&self) -> bool {
        std::mem::take(&mut self.lock().localized)
    }

    pub fn take_nav_outcome(&self) -> Option<NavOutcome> {
        self.lock().nav_outcome.take()
    }

    pub fn take_nav_retry_signal(&self) -> bool {
        std::mem::take(&mut self.lock().nav_retry_signal)
    }

    /// Taking the pending order also raises `order_in_progress` under the
    /// same lock, so a submission landing between the tick's drain and its
    /// state publish cannot slip in as a second accepted order. The post-tick
    /// publish then reconciles the flag with the machine's own view.
    pub fn take_order(&self) -> Option<OrderTicket> {
        let mut flags = self.lock();
        let ticket = flags.pending_order.take();
        if ticket.is_some() {
            flags.order_in_progress = true;
        }
        ticket
    }

    /// Drains every consumable flag into one snapshot, one `take_*` per
    /// flag. Called once per tick by the control loop; a second drain
    /// without intervening `set_*` calls yields an empty snapshot.
    pub fn drain(&self) -> TickEvents {
        TickEvents {
            green_edge: self.take_green_edge(),
            red_edge: self.take_red_edge(),
            localized: self.take_localized(),
            nav_outcome: self.take_nav_outcome(),
            nav_retry_signal: self.take_nav_retry_signal(),
            order: self.take_order(),
        }
    }

    /// Latest navigator progress, kept (not cleared) for status emission.
    pub fn latest_nav_feedback(&self) -> Option<NavFeedback> {
        self.lock().latest_nav_feedback.clone()
    }

    /// The control loop publishes the machine's state here after every tick
    /// so that the order desk can accept or reject synchronously.
    pub fn publish_machine_state(&self, state: RobotState, order_in_progress: bool) {
        let mut flags = self.lock();
        flags.machine_state = state;
        flags.order_in_progress = order_in_progress;
    }

    pub fn machine_state(&self) -> RobotState {
        self.lock().machine_state
    }

    pub fn order_in_progress(&self) -> bool {
        self.lock().order_in_progress
    }
}
