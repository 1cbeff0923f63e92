//! Fraud classifier inference over session features

use std::sync::RwLock;

use ort::value::{DowncastableTarget, DynMapValueType, DynSequenceValueType, Tensor};
use tracing::debug;

use crate::error::GuardianError;
use crate::feature_extractor::FeatureVector;
use crate::models::loader::LoadedModel;
use crate::types::decision::SessionStatus;

/// Result of running the classifier on one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelPrediction {
    /// Predicted label
    pub status: SessionStatus,
    /// Probability of the predicted class
    pub confidence: f64,
    /// Probability of the fraud class
    pub fraud_probability: f64,
}

impl ModelPrediction {
    /// Build a prediction from `[p_valid, p_fraud]` class probabilities.
    ///
    /// Confidence is the predicted class's own probability, so a
    /// confident VALID carries `p_valid`, not `p_fraud`.
    pub fn from_probabilities(p_valid: f64, p_fraud: f64) -> Self {
        if p_fraud >= p_valid {
            Self {
                status: SessionStatus::Fraud,
                confidence: p_fraud,
                fraud_probability: p_fraud,
            }
        } else {
            Self {
                status: SessionStatus::Valid,
                confidence: p_valid,
                fraud_probability: p_fraud,
            }
        }
    }
}

/// Inference boundary over the externally trained fraud classifier.
///
/// Performs no training and no feature derivation; it turns a feature
/// vector into a labeled prediction and nothing else. The session sits
/// behind a `RwLock` because ONNX Runtime needs mutable access to run;
/// the artifact itself is never replaced after construction.
pub struct InferenceEngine {
    model: RwLock<LoadedModel>,
}

impl InferenceEngine {
    /// Wrap a loaded model artifact.
    pub fn new(model: LoadedModel) -> Self {
        Self {
            model: RwLock::new(model),
        }
    }

    /// Run the classifier on one feature vector.
    ///
    /// The input tensor is built in `FeatureVector::FEATURE_NAMES` order;
    /// that order is the contract with the training pipeline.
    pub fn predict(&self, features: &FeatureVector) -> Result<ModelPrediction, GuardianError> {
        let input = features.to_model_input();
        let shape = vec![1_i64, input.len() as i64];
        let input_tensor = Tensor::from_array((shape, input))
            .map_err(|e| GuardianError::Inference(format!("failed to build input tensor: {e}")))?;

        let mut model = self
            .model
            .write()
            .map_err(|e| GuardianError::Inference(format!("model lock poisoned: {e}")))?;
        let input_name = model.input_name.clone();
        let output_name = model.output_name.clone();

        let outputs = model
            .session
            .run(ort::inputs![&input_name => input_tensor])?;

        let (p_valid, p_fraud) = extract_class_probabilities(&outputs, &output_name)?;
        let prediction = ModelPrediction::from_probabilities(p_valid, p_fraud);

        debug!(
            status = ?prediction.status,
            confidence = prediction.confidence,
            fraud_probability = prediction.fraud_probability,
            "Classifier prediction"
        );

        Ok(prediction)
    }
}

/// Pull `[p_valid, p_fraud]` out of the model outputs.
///
/// Tree-classifier exports emit probabilities either as a plain tensor
/// or as seq(map(int64, float)); both forms are handled, and label
/// outputs are skipped.
fn extract_class_probabilities(
    outputs: &ort::session::SessionOutputs,
    output_name: &str,
) -> Result<(f64, f64), GuardianError> {
    if let Some(output) = outputs.get(output_name) {
        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            return Ok(probabilities_from_tensor(&dims, data));
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            if let Ok(pair) = probabilities_from_sequence_map(output) {
                return Ok(pair);
            }
        }
    }

    // Fallback: scan every output that isn't the label.
    for (name, output) in outputs.iter() {
        if name.contains("label") {
            continue;
        }

        if let Ok((shape, data)) = output.try_extract_tensor::<f32>() {
            let dims: Vec<i64> = shape.iter().copied().collect();
            return Ok(probabilities_from_tensor(&dims, data));
        }

        if DynSequenceValueType::can_downcast(&output.dtype()) {
            if let Ok(pair) = probabilities_from_sequence_map(&output) {
                return Ok(pair);
            }
        }
    }

    Err(GuardianError::Inference(
        "no probability output found".to_string(),
    ))
}

/// Read `[p_valid, p_fraud]` from tensor-shaped probabilities.
///
/// Two-class outputs are `[batch, 2]` or `[2]` in class-index order; a
/// single-value output is taken as the fraud probability.
fn probabilities_from_tensor(dims: &[i64], data: &[f32]) -> (f64, f64) {
    let classes = dims.last().copied().unwrap_or(data.len() as i64) as usize;

    if classes >= 2 && data.len() >= 2 {
        (data[0] as f64, data[1] as f64)
    } else if let Some(&p) = data.first() {
        (1.0 - p as f64, p as f64)
    } else {
        (0.5, 0.5)
    }
}

/// Read class probabilities from the seq(map(int64, float)) form that
/// scikit-learn classifier exports produce.
fn probabilities_from_sequence_map(
    output: &ort::value::DynValue,
) -> Result<(f64, f64), GuardianError> {
    let sequence = output
        .downcast_ref::<DynSequenceValueType>()
        .map_err(|e| GuardianError::Inference(format!("not a sequence output: {e}")))?;

    let maps = sequence.try_extract_sequence::<DynMapValueType>()?;
    let map_value = maps
        .first()
        .ok_or_else(|| GuardianError::Inference("empty probability sequence".to_string()))?;

    let kv_pairs = map_value.try_extract_key_values::<i64, f32>()?;

    let mut p_valid = None;
    let mut p_fraud = None;
    for (class_id, prob) in &kv_pairs {
        match *class_id {
            0 => p_valid = Some(*prob as f64),
            1 => p_fraud = Some(*prob as f64),
            _ => {}
        }
    }

    match (p_valid, p_fraud) {
        (Some(valid), Some(fraud)) => Ok((valid, fraud)),
        (None, Some(fraud)) => Ok((1.0 - fraud, fraud)),
        (Some(valid), None) => Ok((valid, 1.0 - valid)),
        (None, None) => Err(GuardianError::Inference(
            "no class probabilities in map output".to_string(),
        )),
    }
}
