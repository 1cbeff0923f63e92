//! Session evaluation facade.
//!
//! `GuardianEngine` is a pure function of the readings it is given:
//! nothing is retained across calls, and the classifier artifact is
//! immutable after construction. Concurrent evaluations need no locking
//! beyond the classifier's own session lock.

use tracing::{debug, error, warn};

use crate::combiner::DecisionCombiner;
use crate::config::EngineConfig;
use crate::error::GuardianError;
use crate::feature_extractor::FeatureExtractor;
use crate::models::inference::InferenceEngine;
use crate::models::loader::ModelLoader;
use crate::rules::{PhysicsConfig, RuleLimits, RuleValidator};
use crate::types::decision::Decision;
use crate::types::reading::Reading;

/// The fraud decision engine.
pub struct GuardianEngine {
    rules: RuleValidator,
    extractor: FeatureExtractor,
    combiner: DecisionCombiner,
    classifier: Option<InferenceEngine>,
}

impl GuardianEngine {
    /// Build an engine without a classifier; every decision will be
    /// rule-based.
    pub fn rule_only(limits: RuleLimits, physics: PhysicsConfig) -> Self {
        Self {
            rules: RuleValidator::new(limits, physics),
            extractor: FeatureExtractor::new(),
            combiner: DecisionCombiner::new(),
            classifier: None,
        }
    }

    /// Build an engine around an already-loaded classifier.
    pub fn with_classifier(
        limits: RuleLimits,
        physics: PhysicsConfig,
        classifier: InferenceEngine,
    ) -> Self {
        Self {
            rules: RuleValidator::new(limits, physics),
            extractor: FeatureExtractor::new(),
            combiner: DecisionCombiner::new(),
            classifier: Some(classifier),
        }
    }

    /// Build from configuration, attempting to load the model artifact.
    ///
    /// A missing or corrupt artifact is not fatal: the engine degrades to
    /// rule-only detection and says so in the log.
    pub fn from_config(config: &EngineConfig) -> Self {
        let classifier = match ModelLoader::with_threads(config.model.intra_threads) {
            Ok(loader) => match loader.load_model(&config.model.path) {
                Ok(model) => Some(InferenceEngine::new(model)),
                Err(e) => {
                    warn!(error = %e, "Fraud model unavailable, using rule-based detection only");
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "ONNX runtime unavailable, using rule-based detection only");
                None
            }
        };

        Self {
            rules: RuleValidator::new(config.limits.clone(), config.physics.clone()),
            extractor: FeatureExtractor::new(),
            combiner: DecisionCombiner::new(),
            classifier,
        }
    }

    /// Whether a classifier is loaded.
    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Evaluate one charging session.
    ///
    /// Readings may arrive in any order; they are stable-sorted by
    /// `time_index` before either detector runs, so any permutation of
    /// the same session yields the same decision. Fails with
    /// `EmptyInput` on a zero-reading session and `MalformedReading` on
    /// non-finite values; neither is ever reported as a verdict.
    pub fn evaluate(&self, readings: &[Reading]) -> Result<Decision, GuardianError> {
        if readings.is_empty() {
            return Err(GuardianError::EmptyInput);
        }
        for reading in readings {
            reading.check_finite()?;
        }

        let mut session: Vec<Reading> = readings.to_vec();
        session.sort_by_key(|r| r.time_index);
        let session_id = session[0].session_id.clone();

        let rule_verdict = self.rules.validate(&session);
        debug!(
            session_id = %session_id,
            status = ?rule_verdict.status,
            "Rule verdict"
        );

        let (model, features) = match &self.classifier {
            Some(classifier) => {
                let features = self.extractor.extract(&session)?;
                match classifier.predict(&features) {
                    Ok(prediction) => (Some(prediction), Some(features)),
                    Err(e) => {
                        error!(
                            session_id = %session_id,
                            error = %e,
                            "Inference failed, falling back to rule verdict"
                        );
                        (None, None)
                    }
                }
            }
            None => (None, None),
        };

        Ok(self
            .combiner
            .combine(&session_id, &rule_verdict, model.as_ref(), features.as_ref()))
    }
}
