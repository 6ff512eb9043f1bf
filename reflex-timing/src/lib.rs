pub mod clock;
pub mod scheduler;

pub use clock::{Clock, ClockSource, HighPrecisionClock, ManualClock, SystemClock, WallClock};
pub use scheduler::{DeadlineScheduler, Scheduler, TimerId};
