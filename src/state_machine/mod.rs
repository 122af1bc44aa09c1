mod machine;
mod state;

pub use machine::{DeliveryMachine, DeliveryRecord, NavPolicy};
pub use state::{Cue, Effect, RobotState};
