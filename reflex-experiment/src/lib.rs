pub mod config;
pub mod session;
pub mod state;
pub mod trial;
pub use config::{ConfigError, ReactionConfig, MAX_ATTEMPTS, MAX_DELAY_MS, MIN_DELAY_MS};
pub use session::Session;
pub use state::ReactionStateMachine;
pub use trial::{InputOutcome, PendingStimulus};
