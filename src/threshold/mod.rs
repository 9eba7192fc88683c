//! Threshold rules and their evaluation state
//!
//! A [`ThresholdKind`] describes a rule; a [`ThresholdState`] attaches
//! one rule to one monitored entity and carries the mutable evaluation
//! state across passes. Violation streaks live in an explicitly shared
//! [`ViolationCounters`] store.

mod counter;
mod kind;
mod point;
mod state;

pub use counter::ViolationCounters;
pub use kind::ThresholdKind;
pub use point::{PointThreshold, DEFAULT_EVENT_CLASS};
pub use state::ThresholdState;
