//! Agent system: one-shot runs and interactive sessions.

pub mod agent;
pub mod input;
pub mod session;

pub use agent::Agent;
pub use input::InputRequester;
pub use session::{Session, SessionState, EVENT_CHANNEL_CAPACITY};
