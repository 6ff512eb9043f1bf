pub mod phase;
pub mod summary;
pub mod trial;

pub use phase::Phase;
pub use summary::{SessionReport, Summary};
pub use trial::{TrendPoint, Trial};
