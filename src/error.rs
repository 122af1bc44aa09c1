use thiserror::Error;

/// Reasons the order desk turns a submission down.
///
/// Rejections are synchronous and non-fatal: the caller gets `accepted=false`
/// plus one of these messages through the reporter, and nothing in the
/// machine changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OrderRejection {
    #[error("Robot is not at the pickup point. Ignore the order!")]
    NotAtPickup,

    #[error("A delivery is already in progress. Ignore the order!")]
    DeliveryInProgress,
}

/// Startup-time failures. Once the control loop is running there are no
/// fatal conditions: navigation failures degrade to the Error state instead
/// of surfacing here.
#[derive(Debug, Error)]
pub enum RobotError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
