//! Type definitions for the guardian engine

pub mod decision;
pub mod reading;

pub use decision::{Decision, DetectionMethod, SessionStatus, Verdict};
pub use reading::{Reading, SessionPayload};
