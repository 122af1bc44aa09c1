pub mod feedback;
pub mod gateway;
pub mod localization;
pub mod navigation;

pub use feedback::{Channel, FeedbackSink, Led, blink};
pub use gateway::{DeliveryReporter, OrderDesk, OrderTicket};
pub use localization::{Localizer, SimLocalizer};
pub use navigation::{ApproachMode, NavigationGoal, Navigator, SimNavigator};
