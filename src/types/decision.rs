//! Verdict and decision structures for session classification

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::feature_extractor::FeatureVector;

/// Session classification outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SessionStatus {
    Valid,
    Fraud,
}

impl SessionStatus {
    pub fn is_fraud(self) -> bool {
        matches!(self, SessionStatus::Fraud)
    }
}

/// Which detector produced the authoritative label for a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    RuleBased,
    MlModel,
}

/// Outcome of a single detector path (rules or model).
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub status: SessionStatus,
    pub reason: String,
}

impl Verdict {
    pub fn valid(reason: impl Into<String>) -> Self {
        Self {
            status: SessionStatus::Valid,
            reason: reason.into(),
        }
    }

    pub fn fraud(reason: impl Into<String>) -> Self {
        Self {
            status: SessionStatus::Fraud,
            reason: reason.into(),
        }
    }

    pub fn is_fraud(&self) -> bool {
        self.status.is_fraud()
    }
}

/// The externally visible result of evaluating one session.
///
/// Created once per evaluation call and never mutated afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Session the decision applies to
    pub session_id: String,

    /// Authoritative classification
    pub status: SessionStatus,

    /// Human-readable explanation of the classification
    pub reason: String,

    /// Which detector the status came from
    pub detection_method: DetectionMethod,

    /// Predicted-class probability, present only for model decisions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    /// Session features the model saw, present only for model decisions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,

    /// When the decision was produced
    pub timestamp: DateTime<Utc>,
}
