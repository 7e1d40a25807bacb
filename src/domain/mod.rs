pub mod models;
pub mod results;
pub mod titles;

pub use models::*;
pub use results::{MatchResultCode, ResultScores};
pub use titles::Title;
