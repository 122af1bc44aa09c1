//! Terminal feedback sink for the demo binary — spinner and colored output.
//!
//! Uses `indicatif` for the live status spinner and `console` for styling.
//! [`TerminalUi`] implements both the [`FeedbackSink`] and the
//! [`DeliveryReporter`] seams, so the demo's "hardware" and its order
//! gateway caller share one screen.

use std::path::Path;
use std::sync::{Arc, Mutex};

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::services::feedback::{Channel, FeedbackSink, Led};
use crate::services::gateway::DeliveryReporter;
use crate::state_machine::{Cue, DeliveryRecord, RobotState};

#[derive(Clone)]
pub struct TerminalUi {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
    resource_path: String,
    verbose: bool,
    // Last published pair, so the spinner line can show the blink pattern.
    leds: Arc<Mutex<(Led, Led)>>,
}

impl TerminalUi {
    pub fn new(resource_path: &str, verbose: bool) -> Self {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .expect("invalid template"),
        );
        pb.set_message(format!("{}", RobotState::Initialization));
        pb.enable_steady_tick(std::time::Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
            resource_path: resource_path.to_string(),
            verbose,
            leds: Arc::new(Mutex::new((Led::Off, Led::Off))),
        }
    }

    fn led_glyph(&self, led: Led) -> String {
        match led {
            Led::Off => "○".to_string(),
            Led::Green => self.green.apply_to("●").to_string(),
            Led::Red => self.red.apply_to("●").to_string(),
        }
    }

    /// Stops the spinner, leaving the printed lines in place.
    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }

    /// Prints the delivery record formatted as JSON.
    pub fn print_record(&self, record: &DeliveryRecord) {
        let style = if record.reported_success {
            &self.green
        } else {
            &self.yellow
        };
        println!();
        println!("{}", style.apply_to("─── Delivery Record ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(record).unwrap_or_default()
        );
    }
}

impl FeedbackSink for TerminalUi {
    fn set_indicator(&self, channel: Channel, led: Led) {
        let mut leds = self.leds.lock().expect("led mutex poisoned");
        match channel {
            Channel::One => leds.0 = led,
            Channel::Two => leds.1 = led,
        }
    }

    fn play_cue(&self, cue: Cue) {
        let sound = Path::new(&self.resource_path).join(cue.sound_file());
        let style = match cue {
            Cue::Failure => &self.red,
            Cue::Retry => &self.yellow,
            _ => &self.green,
        };
        self.pb.println(format!(
            "  {} cue: {cue} ({})",
            style.apply_to("♪"),
            sound.display()
        ));
    }

    fn publish_state(&self, state: RobotState) {
        let leds = *self.leds.lock().expect("led mutex poisoned");
        self.pb.set_message(format!(
            "{state}  [{} {}]",
            self.led_glyph(leds.0),
            self.led_glyph(leds.1)
        ));
    }
}

impl DeliveryReporter for TerminalUi {
    fn report_progress(&self, text: &str) {
        if self.verbose {
            self.pb.println(format!("  {} {text}", self.yellow.apply_to("→")));
        }
    }

    fn report_result(&self, success: bool, message: &str) {
        if success {
            self.pb
                .println(format!("  {} {message}", self.green.apply_to("✓")));
        } else {
            self.pb
                .println(format!("  {} {message}", self.red.apply_to("✗")));
        }
    }
}
