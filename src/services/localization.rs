//! Seam to the localization service: a one-shot request whose completion
//! arrives asynchronously on the event board.

use std::sync::Arc;
use std::time::Duration;

use crate::events::EventBoard;

pub trait Localizer {
    fn request_localize(&self);
}

/// Simulated localizer for the demo binary: reports completion after a
/// fixed settling delay.
pub struct SimLocalizer {
    board: Arc<EventBoard>,
    settle_time: Duration,
}

impl SimLocalizer {
    pub fn new(board: Arc<EventBoard>, settle_time: Duration) -> Self {
        Self { board, settle_time }
    }
}

impl Localizer for SimLocalizer {
    fn request_localize(&self) {
        let board = self.board.clone();
        let settle_time = self.settle_time;
        tokio::spawn(async move {
            tokio::time::sleep(settle_time).await;
            board.set_localized();
        });
    }
}
