pub mod chart;
pub mod checkin;
pub mod deep_link;
pub mod state;

pub use chart::{ChartSlot, RatingSeries};
pub use checkin::{availability, CheckinAction, CheckinPanel};
pub use deep_link::DeepLink;
pub use state::{resolve, InFlightGuard, ProfileContext, ProfileState};
