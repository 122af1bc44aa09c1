//! Fixed-rate driver for the delivery machine.
//!
//! One control thread owns the machine: every cycle it drains the event
//! board, runs a single tick, executes the returned effects against the
//! service seams, and republishes the machine's state onto the board. Every
//! Nth cycle it additionally emits status, gateway progress feedback and the
//! indicator blink pattern.

use std::sync::Arc;
use std::time::Duration;

use crate::config::RobotConfig;
use crate::events::EventBoard;
use crate::services::feedback::{Channel, FeedbackSink, blink};
use crate::services::gateway::DeliveryReporter;
use crate::services::localization::Localizer;
use crate::services::navigation::Navigator;
use crate::state_machine::{DeliveryMachine, Effect, NavPolicy};

pub struct ControlLoop<N, L, F, R>
where
    N: Navigator,
    L: Localizer,
    F: FeedbackSink,
    R: DeliveryReporter,
{
    machine: DeliveryMachine,
    board: Arc<EventBoard>,
    navigator: N,
    localizer: L,
    feedback: F,
    reporter: Arc<R>,
    tick_period: Duration,
    status_divisor: u32,
    cycle: u32,
    phase: bool,
}

impl<N, L, F, R> ControlLoop<N, L, F, R>
where
    N: Navigator,
    L: Localizer,
    F: FeedbackSink,
    R: DeliveryReporter,
{
    pub fn new(
        config: &RobotConfig,
        board: Arc<EventBoard>,
        navigator: N,
        localizer: L,
        feedback: F,
        reporter: Arc<R>,
    ) -> Self {
        Self {
            machine: DeliveryMachine::new(NavPolicy::from(config)),
            board,
            navigator,
            localizer,
            feedback,
            reporter,
            tick_period: Duration::from_secs_f64(1.0 / f64::from(config.tick_hz)),
            status_divisor: config.status_divisor,
            cycle: 2,
            phase: false,
        }
    }

    pub fn machine(&self) -> &DeliveryMachine {
        &self.machine
    }

    /// One synchronous control cycle: drain → tick → effects → publish.
    pub fn tick_once(&mut self) {
        let events = self.board.drain();
        let effects = self.machine.tick(events);
        for effect in effects {
            self.execute(effect);
        }
        self.board
            .publish_machine_state(self.machine.state(), self.machine.order_in_progress());

        self.cycle = (self.cycle % self.status_divisor) + 1;
        if self.cycle == 1 {
            self.emit_status();
        }
    }

    /// Runs the fixed-rate loop until `stop` returns true or `max_ticks`
    /// cycles have elapsed. Returns the number of cycles run.
    pub async fn run_until(
        &mut self,
        max_ticks: u64,
        mut stop: impl FnMut(&DeliveryMachine) -> bool,
    ) -> u64 {
        let mut interval = tokio::time::interval(self.tick_period);
        for tick in 0..max_ticks {
            interval.tick().await;
            self.tick_once();
            if stop(&self.machine) {
                return tick + 1;
            }
        }
        max_ticks
    }

    fn execute(&mut self, effect: Effect) {
        match effect {
            Effect::PlayCue(cue) => self.feedback.play_cue(cue),
            Effect::RequestLocalization => self.localizer.request_localize(),
            Effect::RequestNavigation(goal) => {
                self.navigator.send_goal(goal);
            }
            Effect::ReportResult { success, message } => {
                self.reporter.report_result(success, &message);
            }
        }
    }

    /// Sub-rate emission: blink phase, status channel, gateway progress.
    fn emit_status(&mut self) {
        self.phase = !self.phase;
        let state = self.machine.state();
        let (led1, led2) = blink(state, self.phase);
        self.feedback.set_indicator(Channel::One, led1);
        self.feedback.set_indicator(Channel::Two, led2);
        self.feedback.publish_state(state);

        if self.machine.order_in_progress() {
            let nav_text = self
                .board
                .latest_nav_feedback()
                .map(|f| f.status_text())
                .unwrap_or_default();
            self.reporter
                .report_progress(&format!("Status : {state}  [{nav_text}]"));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;
    use crate::buttons::ButtonInput;
    use crate::services::feedback::Led;
    use crate::services::gateway::OrderDesk;
    use crate::services::navigation::NavigationGoal;
    use crate::state_machine::{Cue, RobotState};
    use uuid::Uuid;

    /// Navigator that resolves every goal synchronously, so the outcome is
    /// visible on the very next tick.
    struct InstantNavigator {
        board: Arc<EventBoard>,
        fail_next: AtomicBool,
        goals: Mutex<Vec<NavigationGoal>>,
    }

    impl InstantNavigator {
        fn new(board: Arc<EventBoard>) -> Self {
            Self {
                board,
                fail_next: AtomicBool::new(false),
                goals: Mutex::new(Vec::new()),
            }
        }

        fn fail_next_goal(&self) {
            self.fail_next.store(true, Ordering::SeqCst);
        }
    }

    impl Navigator for Arc<InstantNavigator> {
        fn send_goal(&self, goal: NavigationGoal) -> Uuid {
            self.goals.lock().unwrap().push(goal.clone());
            if self.fail_next.swap(false, Ordering::SeqCst) {
                self.board.set_nav_outcome(false, "no path");
            } else {
                self.board
                    .set_nav_feedback(goal.distance, format!("arrived at {}", goal.location), false);
                self.board.set_nav_outcome(true, "arrived");
            }
            Uuid::new_v4()
        }
    }

    struct InstantLocalizer {
        board: Arc<EventBoard>,
    }

    impl Localizer for InstantLocalizer {
        fn request_localize(&self) {
            self.board.set_localized();
        }
    }

    #[derive(Default)]
    struct RecordingFeedback {
        cues: Mutex<Vec<Cue>>,
        indicators: Mutex<Vec<(Led, Led)>>,
        states: Mutex<Vec<RobotState>>,
    }

    impl FeedbackSink for RecordingFeedback {
        fn set_indicator(&self, channel: Channel, led: Led) {
            let mut indicators = self.indicators.lock().unwrap();
            match channel {
                Channel::One => indicators.push((led, Led::Off)),
                Channel::Two => {
                    let last = indicators.last_mut().unwrap();
                    last.1 = led;
                }
            }
        }
        fn play_cue(&self, cue: Cue) {
            self.cues.lock().unwrap().push(cue);
        }
        fn publish_state(&self, state: RobotState) {
            self.states.lock().unwrap().push(state);
        }
    }

    impl FeedbackSink for Arc<RecordingFeedback> {
        fn set_indicator(&self, channel: Channel, led: Led) {
            self.as_ref().set_indicator(channel, led);
        }
        fn play_cue(&self, cue: Cue) {
            self.as_ref().play_cue(cue);
        }
        fn publish_state(&self, state: RobotState) {
            self.as_ref().publish_state(state);
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        progress: Mutex<Vec<String>>,
        results: Mutex<Vec<(bool, String)>>,
    }

    impl DeliveryReporter for RecordingReporter {
        fn report_progress(&self, text: &str) {
            self.progress.lock().unwrap().push(text.to_string());
        }
        fn report_result(&self, success: bool, message: &str) {
            self.results.lock().unwrap().push((success, message.to_string()));
        }
    }

    fn rig(
        config: RobotConfig,
    ) -> (
        ControlLoop<Arc<InstantNavigator>, InstantLocalizer, Arc<RecordingFeedback>, RecordingReporter>,
        Arc<EventBoard>,
        Arc<InstantNavigator>,
        Arc<RecordingFeedback>,
        Arc<RecordingReporter>,
    ) {
        let board = Arc::new(EventBoard::new());
        let navigator = Arc::new(InstantNavigator::new(board.clone()));
        let feedback = Arc::new(RecordingFeedback::default());
        let reporter = Arc::new(RecordingReporter::default());
        let control = ControlLoop::new(
            &config,
            board.clone(),
            navigator.clone(),
            InstantLocalizer {
                board: board.clone(),
            },
            feedback.clone(),
            reporter.clone(),
        );
        (control, board, navigator, feedback, reporter)
    }

    #[test]
    fn round_trip_through_the_board() {
        let (mut control, board, navigator, feedback, reporter) = rig(RobotConfig::default());
        let desk = OrderDesk::new(board.clone(), reporter.clone());
        let mut buttons = ButtonInput::new(board.clone());

        // Too early: rejected synchronously, reported, never queued.
        assert!(!desk.submit_order("table-3"));

        control.tick_once(); // localization requested, completes instantly
        control.tick_once(); // localized -> pickup goal -> instant arrival
        control.tick_once(); // arrival consumed -> AT_PICKUP
        assert_eq!(control.machine().state(), RobotState::AtPickup);

        assert!(desk.submit_order("table-3"));
        control.tick_once(); // order -> GOTO_DROPOFF -> instant arrival
        control.tick_once(); // -> AT_DROPOFF
        assert_eq!(control.machine().state(), RobotState::AtDropoff);

        buttons.press_green();
        control.tick_once(); // confirmation -> return leg
        control.tick_once(); // -> AT_PICKUP, delivery closed
        assert_eq!(control.machine().state(), RobotState::AtPickup);

        let results = reporter.results.lock().unwrap();
        assert_eq!(results.len(), 2);
        assert!(!results[0].0, "early order must be rejected");
        assert_eq!(results[1], (true, "Delivery Success!".to_string()));

        let goals = navigator.goals.lock().unwrap();
        assert_eq!(goals.len(), 3);
        assert_eq!(goals[0].location, "kitchen");
        assert_eq!(goals[1].location, "table-3");
        assert_eq!(goals[2].location, "kitchen");

        let cues = feedback.cues.lock().unwrap();
        assert_eq!(
            *cues,
            vec![
                Cue::Confirmation,
                Cue::Arrival,
                Cue::OrderReceived,
                Cue::Arrival,
                Cue::EnjoyMeal,
                Cue::Arrival,
            ]
        );
    }

    #[test]
    fn failure_and_operator_recovery() {
        let (mut control, board, navigator, feedback, _reporter) = rig(RobotConfig::default());
        let mut buttons = ButtonInput::new(board.clone());
        navigator.fail_next_goal();

        control.tick_once();
        control.tick_once(); // pickup goal fails instantly
        control.tick_once(); // failure consumed -> ON_ERROR
        assert_eq!(control.machine().state(), RobotState::Error);
        assert!(feedback.cues.lock().unwrap().contains(&Cue::Failure));

        buttons.press_green();
        control.tick_once();
        assert_eq!(control.machine().state(), RobotState::Initialization);

        // The second attempt goes through.
        control.tick_once(); // fresh localization request
        control.tick_once(); // localized -> goal -> success
        control.tick_once();
        assert_eq!(control.machine().state(), RobotState::AtPickup);
    }

    #[test]
    fn sub_rate_emission_alternates_the_indicator() {
        let config = RobotConfig {
            status_divisor: 1,
            ..Default::default()
        };
        let (mut control, _board, _navigator, feedback, _reporter) = rig(config);

        for _ in 0..6 {
            control.tick_once();
        }

        let indicators = feedback.indicators.lock().unwrap();
        assert_eq!(indicators.len(), 6);
        for window in indicators.windows(2) {
            assert_ne!(window[0], window[1], "blink pattern must flip each emission");
        }
        // Non-error states blink green.
        assert!(
            indicators
                .iter()
                .all(|p| *p == (Led::Green, Led::Off) || *p == (Led::Off, Led::Green))
        );
        assert_eq!(feedback.states.lock().unwrap().len(), 6);
    }

    #[test]
    fn progress_is_reported_only_while_delivering() {
        let config = RobotConfig {
            status_divisor: 1,
            ..Default::default()
        };
        let (mut control, board, _navigator, _feedback, reporter) = rig(config);
        let desk = OrderDesk::new(board.clone(), reporter.clone());

        control.tick_once();
        control.tick_once();
        control.tick_once();
        assert!(reporter.progress.lock().unwrap().is_empty());

        assert!(desk.submit_order("table-3"));
        control.tick_once(); // GOTO_DROPOFF, order in progress
        let progress = reporter.progress.lock().unwrap();
        assert_eq!(progress.len(), 1);
        assert!(progress[0].starts_with("Status : GOTO_DROPOFF"));
        assert!(progress[0].contains("arrived at table-3"));
    }
}
