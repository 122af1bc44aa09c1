use std::fmt;

use serde::{Deserialize, Serialize};

use crate::services::navigation::NavigationGoal;

/// The six states of the delivery control core.
///
/// A delivery round trip flows through:
/// INITIALIZATION → GOTO_PICKUP → AT_PICKUP → GOTO_DROPOFF → AT_DROPOFF →
/// GOTO_PICKUP, with ON_ERROR as the holding state after a navigation
/// failure. Exactly one state is current at any time and only
/// `DeliveryMachine::tick` may change it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RobotState {
    Initialization,
    GotoPickup,
    AtPickup,
    GotoDropoff,
    AtDropoff,
    Error,
}

impl fmt::Display for RobotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RobotState::Initialization => write!(f, "INITIALIZATION"),
            RobotState::GotoPickup => write!(f, "GOTO_PICKUP"),
            RobotState::AtPickup => write!(f, "AT_PICKUP"),
            RobotState::GotoDropoff => write!(f, "GOTO_DROPOFF"),
            RobotState::AtDropoff => write!(f, "AT_DROPOFF"),
            RobotState::Error => write!(f, "ON_ERROR"),
        }
    }
}

/// The six audible cues the core can emit at transition points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cue {
    /// Localization requested / command acknowledged.
    Confirmation,
    /// The navigator signaled a mid-flight retry.
    Retry,
    /// Terminal navigation failure.
    Failure,
    /// An order was accepted at the pickup point.
    OrderReceived,
    /// Arrived at a waypoint.
    Arrival,
    /// Customer confirmed the drop-off.
    EnjoyMeal,
}

impl Cue {
    /// Sound resource played for this cue, relative to the configured
    /// resource path.
    pub fn sound_file(&self) -> &'static str {
        match self {
            Cue::Confirmation => "kaku.wav",
            Cue::Retry => "moo.wav",
            Cue::Failure => "angry_cat.wav",
            Cue::OrderReceived => "kaku.wav",
            Cue::Arrival => "lion.wav",
            Cue::EnjoyMeal => "meow.wav",
        }
    }
}

impl fmt::Display for Cue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cue::Confirmation => write!(f, "confirmation"),
            Cue::Retry => write!(f, "retry"),
            Cue::Failure => write!(f, "navigation-failed"),
            Cue::OrderReceived => write!(f, "order-received"),
            Cue::Arrival => write!(f, "arrival"),
            Cue::EnjoyMeal => write!(f, "enjoy-meal"),
        }
    }
}

/// Commands returned by a state handler for the control loop to execute.
///
/// Handlers never touch the sinks themselves; everything with a side effect
/// outside the machine comes out as one of these.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    PlayCue(Cue),
    RequestLocalization,
    RequestNavigation(NavigationGoal),
    ReportResult { success: bool, message: String },
}
