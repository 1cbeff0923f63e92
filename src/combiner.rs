//! Merging rule and model verdicts into one decision.
//!
//! Policy: the classifier's label is authoritative whenever a model is
//! loaded; the rule verdict survives as supporting evidence in the
//! reason text. Without a model, the rule verdict stands alone.

use chrono::Utc;

use crate::feature_extractor::FeatureVector;
use crate::models::inference::ModelPrediction;
use crate::types::decision::{Decision, DetectionMethod, SessionStatus, Verdict};

/// Merges the rule verdict and the model prediction into one decision.
pub struct DecisionCombiner;

impl DecisionCombiner {
    /// Create a new combiner.
    pub fn new() -> Self {
        Self
    }

    /// Produce the authoritative decision for one session.
    pub fn combine(
        &self,
        session_id: &str,
        rule_verdict: &Verdict,
        model: Option<&ModelPrediction>,
        features: Option<&FeatureVector>,
    ) -> Decision {
        match model {
            Some(prediction) => {
                let confidence_pct = prediction.confidence * 100.0;

                let reason = match prediction.status {
                    SessionStatus::Fraud => {
                        let mut msg = format!(
                            "ML Model: Fraud detected (confidence: {:.1}%)",
                            confidence_pct
                        );
                        if let Some(vector) = features {
                            msg.push_str(&format!(
                                " | Physics diff: {:.4} kWh",
                                vector.physics_diff
                            ));
                        }
                        if rule_verdict.is_fraud() {
                            msg.push_str(" | Confirmed by rule-based check");
                        }
                        msg
                    }
                    SessionStatus::Valid => {
                        let mut msg = format!(
                            "ML Model: Valid session (confidence: {:.1}%)",
                            confidence_pct
                        );
                        if rule_verdict.is_fraud() {
                            msg.push_str(&format!(" | Rule-based check: {}", rule_verdict.reason));
                        }
                        msg
                    }
                };

                Decision {
                    session_id: session_id.to_string(),
                    status: prediction.status,
                    reason,
                    detection_method: DetectionMethod::MlModel,
                    confidence: Some(prediction.confidence),
                    features: features.cloned(),
                    timestamp: Utc::now(),
                }
            }
            None => Decision {
                session_id: session_id.to_string(),
                status: rule_verdict.status,
                reason: rule_verdict.reason.clone(),
                detection_method: DetectionMethod::RuleBased,
                confidence: None,
                features: None,
                timestamp: Utc::now(),
            },
        }
    }
}

impl Default for DecisionCombiner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_features() -> FeatureVector {
        FeatureVector {
            max_voltage: 232.0,
            min_voltage: 228.0,
            mean_current: 10.0,
            total_energy: 2.3,
            physics_diff: 0.4567,
        }
    }

    #[test]
    fn test_no_model_falls_back_to_rule_verdict() {
        let combiner = DecisionCombiner::new();
        let verdict = Verdict::fraud("Voltage anomaly detected: 290V at t=12");

        let decision = combiner.combine("S1", &verdict, None, None);

        assert_eq!(decision.status, SessionStatus::Fraud);
        assert_eq!(decision.detection_method, DetectionMethod::RuleBased);
        assert_eq!(decision.reason, "Voltage anomaly detected: 290V at t=12");
        assert_eq!(decision.confidence, None);
        assert!(decision.features.is_none());
    }

    #[test]
    fn test_model_valid_overrides_rule_fraud_but_surfaces_disagreement() {
        let combiner = DecisionCombiner::new();
        let verdict = Verdict::fraud("Energy decrease detected at t=7 (1.2 -> 0.9)");
        let prediction = ModelPrediction::from_probabilities(0.9, 0.1);
        let features = sample_features();

        let decision = combiner.combine("S2", &verdict, Some(&prediction), Some(&features));

        assert_eq!(decision.status, SessionStatus::Valid);
        assert_eq!(decision.detection_method, DetectionMethod::MlModel);
        assert_eq!(decision.confidence, Some(0.9));
        assert!(decision.reason.starts_with("ML Model: Valid session (confidence: 90.0%)"));
        assert!(decision
            .reason
            .contains("Rule-based check: Energy decrease detected at t=7 (1.2 -> 0.9)"));
        assert_eq!(decision.features, Some(features));
    }

    #[test]
    fn test_model_fraud_confirmed_by_rules_hides_rule_specifics() {
        let combiner = DecisionCombiner::new();
        let verdict = Verdict::fraud("Current anomaly detected: 60A at t=3");
        let prediction = ModelPrediction::from_probabilities(0.05, 0.95);
        let features = sample_features();

        let decision = combiner.combine("S3", &verdict, Some(&prediction), Some(&features));

        assert_eq!(decision.status, SessionStatus::Fraud);
        assert!(decision.reason.contains("Fraud detected (confidence: 95.0%)"));
        assert!(decision.reason.contains("Physics diff: 0.4567 kWh"));
        assert!(decision.reason.contains("Confirmed by rule-based check"));
        assert!(!decision.reason.contains("Current anomaly"));
    }

    #[test]
    fn test_model_fraud_without_rule_agreement_has_no_confirmation() {
        let combiner = DecisionCombiner::new();
        let verdict = Verdict::valid("Session completed normally.");
        let prediction = ModelPrediction::from_probabilities(0.2, 0.8);

        let decision = combiner.combine("S4", &verdict, Some(&prediction), Some(&sample_features()));

        assert_eq!(decision.status, SessionStatus::Fraud);
        assert!(!decision.reason.contains("Confirmed by rule-based check"));
    }

    #[test]
    fn test_model_valid_with_valid_rules_is_clean() {
        let combiner = DecisionCombiner::new();
        let verdict = Verdict::valid("Session completed normally.");
        let prediction = ModelPrediction::from_probabilities(0.97, 0.03);

        let decision = combiner.combine("S5", &verdict, Some(&prediction), Some(&sample_features()));

        assert_eq!(decision.status, SessionStatus::Valid);
        assert_eq!(decision.reason, "ML Model: Valid session (confidence: 97.0%)");
    }
}
