use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::RobotConfig;
use crate::events::TickEvents;
use crate::services::gateway::OrderTicket;
use crate::services::navigation::{ApproachMode, NavigationGoal};

use super::state::{Cue, Effect, RobotState};

/// Navigation policy derived from the immutable configuration.
#[derive(Debug, Clone)]
pub struct NavPolicy {
    pub pickup_location: String,
    pub pickup_timeout: Duration,
    pub dropoff_timeout: Duration,
    pub retry: u32,
    pub approach_distance: f64,
    /// The `success` flag reported on delivery completion; explicit because
    /// the original controller reported `false` here (see DESIGN.md).
    pub report_delivery_success: bool,
}

impl From<&RobotConfig> for NavPolicy {
    fn from(config: &RobotConfig) -> Self {
        Self {
            pickup_location: config.pickup_location.clone(),
            pickup_timeout: Duration::from_secs_f64(config.nav_pickup_timeout_s),
            dropoff_timeout: Duration::from_secs_f64(config.nav_dropoff_timeout_s),
            retry: config.nav_retry,
            approach_distance: config.nav_approach_distance,
            report_delivery_success: config.report_delivery_success,
        }
    }
}

impl Default for NavPolicy {
    fn default() -> Self {
        (&RobotConfig::default()).into()
    }
}

/// Bookkeeping for the order currently being delivered, alive from
/// acceptance at the pickup point until the robot arrives back there.
#[derive(Debug, Clone)]
pub struct ActiveDelivery {
    ticket: OrderTicket,
    transitions: Vec<RobotState>,
    retry_signals: u32,
}

impl ActiveDelivery {
    fn new(ticket: OrderTicket) -> Self {
        Self {
            ticket,
            transitions: Vec::new(),
            retry_signals: 0,
        }
    }

    fn into_record(self, reported_success: bool) -> DeliveryRecord {
        let completed_at = Utc::now();
        let duration_ms = (completed_at - self.ticket.accepted_at).num_milliseconds();
        DeliveryRecord {
            order_id: self.ticket.id,
            destination: self.ticket.destination,
            accepted_at: self.ticket.accepted_at,
            completed_at,
            duration_ms,
            state_transitions: self.transitions,
            retry_signals: self.retry_signals,
            reported_success,
        }
    }
}

/// Structured record of one completed delivery round trip.
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryRecord {
    pub order_id: String,
    pub destination: String,
    pub accepted_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
    pub duration_ms: i64,
    pub state_transitions: Vec<RobotState>,
    pub retry_signals: u32,
    pub reported_success: bool,
}

/// The delivery state machine.
///
/// `tick` is the only place [`RobotState`] changes: it evaluates one handler
/// per call, performs at most one transition, and returns the effects for
/// the control loop to execute. Nothing in here blocks; all collaborator
/// interaction is fire-and-forget through the returned effects.
pub struct DeliveryMachine {
    state: RobotState,
    policy: NavPolicy,
    state_history: Vec<RobotState>,
    // Localization-request latch, cleared only on (re-)entry into
    // Initialization.
    init_requested: bool,
    nav_outstanding: bool,
    active_delivery: Option<ActiveDelivery>,
    completed: Vec<DeliveryRecord>,
}

impl DeliveryMachine {
    pub fn new(policy: NavPolicy) -> Self {
        Self {
            state: RobotState::Initialization,
            policy,
            state_history: Vec::new(),
            init_requested: false,
            nav_outstanding: false,
            active_delivery: None,
            completed: Vec::new(),
        }
    }

    pub fn state(&self) -> RobotState {
        self.state
    }

    pub fn state_history(&self) -> &[RobotState] {
        &self.state_history
    }

    pub fn order_in_progress(&self) -> bool {
        self.active_delivery.is_some()
    }

    #[allow(dead_code)]
    pub fn nav_outstanding(&self) -> bool {
        self.nav_outstanding
    }

    pub fn completed_deliveries(&self) -> &[DeliveryRecord] {
        &self.completed
    }

    /// One control-loop cycle. Consumes the tick's drained events and
    /// returns the effects to execute.
    ///
    /// Priority within a tick: a terminal navigation failure forces the
    /// Error state from anywhere; a green edge while in Error forces
    /// re-initialization. Both skip the normal handler for this tick, which
    /// keeps the one-transition-per-tick guarantee.
    pub fn tick(&mut self, mut events: TickEvents) -> Vec<Effect> {
        let mut effects = Vec::new();

        // A mid-flight retry signal never changes state.
        if events.nav_retry_signal {
            effects.push(Effect::PlayCue(Cue::Retry));
            if let Some(active) = &mut self.active_delivery {
                active.retry_signals += 1;
            }
        }

        let nav_finished = match events.nav_outcome.take() {
            Some(outcome) => {
                self.nav_outstanding = false;
                if !outcome.success {
                    effects.push(Effect::PlayCue(Cue::Failure));
                    self.transition(RobotState::Error);
                    return effects;
                }
                true
            }
            None => false,
        };

        if self.state == RobotState::Error {
            // The sole raw-input transition: operator re-initialization.
            if events.green_edge {
                self.transition(RobotState::Initialization);
            }
            return effects;
        }

        match self.state {
            RobotState::Initialization => self.handle_initialization(&events, &mut effects),
            RobotState::GotoPickup => self.handle_goto_pickup(nav_finished, &mut effects),
            RobotState::AtPickup => self.handle_at_pickup(events.order.take(), &mut effects),
            RobotState::GotoDropoff => self.handle_goto_dropoff(nav_finished, &mut effects),
            RobotState::AtDropoff => self.handle_at_dropoff(events.green_edge, &mut effects),
            RobotState::Error => unreachable!("handled above"),
        }

        effects
    }

    fn transition(&mut self, next: RobotState) {
        self.state_history.push(self.state);
        if next == RobotState::Initialization {
            self.init_requested = false;
        }
        self.state = next;
        if let Some(active) = &mut self.active_delivery {
            active.transitions.push(next);
        }
    }

    /// Issues a navigation goal unless one is already outstanding. Returns
    /// whether the goal was issued; callers only transition when it was.
    fn request_navigation(&mut self, goal: NavigationGoal, effects: &mut Vec<Effect>) -> bool {
        if self.nav_outstanding {
            return false;
        }
        self.nav_outstanding = true;
        effects.push(Effect::RequestNavigation(goal));
        true
    }

    fn handle_initialization(&mut self, events: &TickEvents, effects: &mut Vec<Effect>) {
        if !self.init_requested {
            self.init_requested = true;
            effects.push(Effect::RequestLocalization);
            effects.push(Effect::PlayCue(Cue::Confirmation));
        }

        if events.localized {
            let goal = NavigationGoal {
                location: self.policy.pickup_location.clone(),
                approach: ApproachMode::On,
                retries: self.policy.retry,
                timeout: self.policy.pickup_timeout,
                distance: 0.0,
            };
            if self.request_navigation(goal, effects) {
                self.init_requested = false;
                self.transition(RobotState::GotoPickup);
            }
        }
    }

    fn handle_goto_pickup(&mut self, nav_finished: bool, effects: &mut Vec<Effect>) {
        if nav_finished {
            self.transition(RobotState::AtPickup);
            if self.active_delivery.is_some() {
                // Arrival back at the pickup point closes the delivery.
                let success = self.policy.report_delivery_success;
                if let Some(active) = self.active_delivery.take() {
                    self.completed.push(active.into_record(success));
                }
                effects.push(Effect::ReportResult {
                    success,
                    message: "Delivery Success!".to_string(),
                });
            }
            effects.push(Effect::PlayCue(Cue::Arrival));
        }
    }

    fn handle_at_pickup(&mut self, order: Option<OrderTicket>, effects: &mut Vec<Effect>) {
        if let Some(ticket) = order {
            let goal = NavigationGoal {
                location: ticket.destination.clone(),
                approach: ApproachMode::On,
                retries: self.policy.retry,
                timeout: self.policy.dropoff_timeout,
                distance: self.policy.approach_distance,
            };
            if self.request_navigation(goal, effects) {
                effects.push(Effect::PlayCue(Cue::OrderReceived));
                self.active_delivery = Some(ActiveDelivery::new(ticket));
                self.transition(RobotState::GotoDropoff);
            }
        }
    }

    fn handle_goto_dropoff(&mut self, nav_finished: bool, effects: &mut Vec<Effect>) {
        if nav_finished {
            self.transition(RobotState::AtDropoff);
            effects.push(Effect::PlayCue(Cue::Arrival));
        }
    }

    fn handle_at_dropoff(&mut self, confirmed: bool, effects: &mut Vec<Effect>) {
        if confirmed {
            // Return leg runs on a fixed budget, not the configured one.
            let goal = NavigationGoal {
                location: self.policy.pickup_location.clone(),
                approach: ApproachMode::On,
                retries: 3,
                timeout: Duration::from_secs(300),
                distance: 0.0,
            };
            if self.request_navigation(goal, effects) {
                effects.push(Effect::PlayCue(Cue::EnjoyMeal));
                self.transition(RobotState::GotoPickup);
            }
        }
    }
}
