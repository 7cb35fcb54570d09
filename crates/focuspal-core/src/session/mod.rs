mod durations;
mod machine;

pub use durations::{Durations, DEFAULT_BREAK_MIN, DEFAULT_FOCUS_MIN};
pub use machine::{SessionKind, SessionMachine, SessionState};
