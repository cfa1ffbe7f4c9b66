//! Agent loop primitives (engine, events, iteration limits).

pub mod control;
pub mod engine;
pub mod events;
pub mod limits;

pub use control::EventEmitter;
pub use engine::{LoopState, TurnEngine, TurnScope};
pub use events::{AgentEvent, SessionEvent};
pub use limits::IterationBudget;
