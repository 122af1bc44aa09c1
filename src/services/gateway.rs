//! Order gateway surface exposed by the core.
//!
//! [`OrderDesk`] is what the gateway transport calls into: a synchronous
//! accept/reject on submission, a documented no-op on preemption, and
//! progress/result reporting back to the caller through the
//! [`DeliveryReporter`] seam.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::events::EventBoard;

/// An accepted order. At most one exists at any time.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTicket {
    pub id: String,
    pub destination: String,
    pub accepted_at: DateTime<Utc>,
}

impl OrderTicket {
    pub fn new(destination: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            destination: destination.to_string(),
            accepted_at: Utc::now(),
        }
    }
}

/// Feedback channel back to the order gateway caller.
pub trait DeliveryReporter {
    /// Periodic in-progress feedback while a delivery is running.
    fn report_progress(&self, text: &str);
    /// Terminal resolution, emitted exactly once per accepted order — and
    /// synchronously on rejection.
    fn report_result(&self, success: bool, message: &str);
}

/// The gateway-facing half of order intake.
pub struct OrderDesk<R: DeliveryReporter> {
    board: Arc<EventBoard>,
    reporter: Arc<R>,
}

impl<R: DeliveryReporter> OrderDesk<R> {
    pub fn new(board: Arc<EventBoard>, reporter: Arc<R>) -> Self {
        Self { board, reporter }
    }

    /// Synchronous accept/reject. A rejection reports failure to the caller
    /// immediately rather than silently dropping the request.
    pub fn submit_order(&self, destination: &str) -> bool {
        match self.board.submit_order(destination) {
            Ok(_) => true,
            Err(rejection) => {
                self.reporter.report_result(false, &rejection.to_string());
                false
            }
        }
    }

    /// No-op by design: accepted orders are not cancelable under the
    /// gateway's action semantics.
    pub fn preempt_order(&self) {
        self.board.set_order_preempted();
    }
}
