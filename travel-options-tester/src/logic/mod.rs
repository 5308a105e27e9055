pub mod reports;
pub mod tester;
pub mod travel_tester;

pub use tester::*;
pub use travel_tester::{RunSummary, TravelPlan, UserAction};
