//! Indicator and cue emission surface.
//!
//! The blink pattern is a pure function of (state, alternation phase) so the
//! control loop can drive any sink implementation — the demo's terminal
//! sink or real LED hardware behind the same trait.

use crate::state_machine::{Cue, RobotState};

/// Indicator colors the core emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    Off,
    Green,
    Red,
}

/// The two indicator channels on the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    One,
    Two,
}

/// Sink for indicator lighting, audible cues and the status channel.
pub trait FeedbackSink {
    fn set_indicator(&self, channel: Channel, led: Led);
    fn play_cue(&self, cue: Cue);
    /// Current-state string, published at the sub-rate for observability.
    fn publish_state(&self, state: RobotState);
}

/// Two-phase alternating indicator pattern: red/off in the Error state,
/// green/off otherwise, the two channels always in anti-phase.
pub fn blink(state: RobotState, phase: bool) -> (Led, Led) {
    let on = if state == RobotState::Error {
        Led::Red
    } else {
        Led::Green
    };
    if phase { (on, Led::Off) } else { (Led::Off, on) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_alternates_red_with_period_two() {
        let mut previous = None;
        for cycle in 0..8 {
            let pattern = blink(RobotState::Error, cycle % 2 == 0);
            assert!(matches!(
                pattern,
                (Led::Red, Led::Off) | (Led::Off, Led::Red)
            ));
            if let Some(prev) = previous {
                assert_ne!(pattern, prev, "pattern must flip every cycle");
            }
            previous = Some(pattern);
        }
    }

    #[test]
    fn non_error_alternates_green_with_period_two() {
        for state in [
            RobotState::Initialization,
            RobotState::GotoPickup,
            RobotState::AtPickup,
            RobotState::GotoDropoff,
            RobotState::AtDropoff,
        ] {
            assert_eq!(blink(state, true), (Led::Green, Led::Off));
            assert_eq!(blink(state, false), (Led::Off, Led::Green));
        }
    }
}
