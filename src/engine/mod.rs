//! The grading oracle: scenario generation, deterministic replay and scoring.
//!
//! Everything in here is a pure function over plain values and never touches
//! storage or the HTTP layer.

pub mod catalog;
pub mod grade;
pub mod plan;
pub mod replay;
pub mod scenario;
pub mod scorer;
