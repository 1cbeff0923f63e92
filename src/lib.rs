//! EV Guardian Engine
//!
//! Fraud decision engine for EV charging session telemetry. Each session
//! (a batch of voltage/current/energy readings) is classified as VALID
//! or FRAUD by combining a deterministic physics and safety rule cascade
//! with an externally trained binary classifier; the classifier's label
//! takes priority when a model is loaded, with the rule verdict kept as
//! an audit trail.

pub mod combiner;
pub mod config;
pub mod engine;
pub mod error;
pub mod feature_extractor;
pub mod metrics;
pub mod models;
pub mod rules;
pub mod types;

pub use combiner::DecisionCombiner;
pub use config::EngineConfig;
pub use engine::GuardianEngine;
pub use error::GuardianError;
pub use feature_extractor::{FeatureExtractor, FeatureVector};
pub use metrics::EngineMetrics;
pub use models::inference::{InferenceEngine, ModelPrediction};
pub use models::loader::{LoadedModel, ModelLoader};
pub use rules::{PhysicsConfig, RuleLimits, RuleValidator};
pub use types::decision::{Decision, DetectionMethod, SessionStatus, Verdict};
pub use types::reading::{Reading, SessionPayload};
