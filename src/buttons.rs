//! Rising-edge detection for the two-channel button input stream.
//!
//! The transport delivers periodic raw digital samples; the core only acts
//! on rising edges (false → true between two consecutive samples). Only the
//! immediately previous sample is retained.

use std::sync::Arc;

use crate::events::EventBoard;

/// One raw sample of the two button channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonSample {
    pub green: bool,
    pub red: bool,
}

/// Edge pulses derived from two consecutive samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonEdge {
    pub green: bool,
    pub red: bool,
}

/// Diffs consecutive samples into rising-edge pulses.
#[derive(Debug, Default)]
pub struct EdgeDetector {
    previous: Option<ButtonSample>,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one raw sample and returns the rising edges it produced. The
    /// very first sample only seeds the detector and never yields an edge.
    pub fn update(&mut self, sample: ButtonSample) -> ButtonEdge {
        let edge = match self.previous {
            Some(prev) => ButtonEdge {
                green: !prev.green && sample.green,
                red: !prev.red && sample.red,
            },
            None => ButtonEdge::default(),
        };
        self.previous = Some(sample);
        edge
    }
}

/// Button input source: runs edge detection on raw samples and posts the
/// resulting pulses onto the event board.
pub struct ButtonInput {
    detector: EdgeDetector,
    board: Arc<EventBoard>,
}

impl ButtonInput {
    pub fn new(board: Arc<EventBoard>) -> Self {
        // Seed with a released sample so the first real press already
        // produces an edge.
        let mut detector = EdgeDetector::new();
        detector.update(ButtonSample::default());
        Self { detector, board }
    }

    /// Ingests one raw sample from the transport.
    pub fn sample(&mut self, green: bool, red: bool) {
        let edge = self.detector.update(ButtonSample { green, red });
        if edge.green {
            self.board.set_green_edge();
        }
        if edge.red {
            self.board.set_red_edge();
        }
    }

    /// Simulates a full green press-and-release, as the demo operator does.
    pub fn press_green(&mut self) {
        self.sample(true, false);
        self.sample(false, false);
    }
}
