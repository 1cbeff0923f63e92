//! Session-level feature extraction for fraud model inference.
//!
//! This module reduces a charging session to the summary vector the
//! classifier was trained on. Features are produced in the exact order
//! expected by the model artifact.

use serde::{Deserialize, Serialize};

use crate::error::GuardianError;
use crate::types::reading::Reading;

/// Session summary used as model input.
///
/// The model input order is `[max_voltage, min_voltage, mean_current,
/// total_energy, physics_diff]`, fixed at training time. Reordering
/// silently corrupts predictions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Highest voltage seen in the session (V)
    pub max_voltage: f64,

    /// Lowest voltage seen in the session (V)
    pub min_voltage: f64,

    /// Mean current over all readings (A)
    pub mean_current: f64,

    /// Peak cumulative energy reported by the meter (kWh)
    pub total_energy: f64,

    /// Absolute gap between reported and integrated energy (kWh)
    pub physics_diff: f64,
}

impl FeatureVector {
    /// Feature names, in training order.
    pub const FEATURE_NAMES: [&'static str; 5] = [
        "max_voltage",
        "min_voltage",
        "mean_current",
        "total_energy",
        "physics_diff",
    ];

    /// Feature values, in training order.
    pub fn as_array(&self) -> [f64; 5] {
        [
            self.max_voltage,
            self.min_voltage,
            self.mean_current,
            self.total_energy,
            self.physics_diff,
        ]
    }

    /// Input vector for the ONNX session.
    pub fn to_model_input(&self) -> Vec<f32> {
        self.as_array().iter().map(|&v| v as f32).collect()
    }
}

/// Feature extractor that summarizes a session into a fixed vector.
pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Create a new feature extractor.
    pub fn new() -> Self {
        Self
    }

    /// Get the number of features produced.
    pub fn feature_count(&self) -> usize {
        FeatureVector::FEATURE_NAMES.len()
    }

    /// Extract the session-level feature vector.
    ///
    /// Readings are re-sorted by `time_index`; caller order is not
    /// trusted. `total_energy` is the peak cumulative reading rather than
    /// the last one, so a rewound meter still yields its true peak. The
    /// physics integral here covers the whole session in one shot; the
    /// streaming per-reading reconciliation lives in the rule validator
    /// and serves a different consumer.
    pub fn extract(&self, readings: &[Reading]) -> Result<FeatureVector, GuardianError> {
        if readings.is_empty() {
            return Err(GuardianError::EmptyInput);
        }

        let mut session: Vec<&Reading> = readings.iter().collect();
        session.sort_by_key(|r| r.time_index);

        let mut max_voltage = f64::NEG_INFINITY;
        let mut min_voltage = f64::INFINITY;
        let mut current_sum = 0.0;
        let mut total_energy = f64::NEG_INFINITY;
        let mut power_sum = 0.0;

        for reading in &session {
            max_voltage = max_voltage.max(reading.voltage);
            min_voltage = min_voltage.min(reading.voltage);
            current_sum += reading.current;
            total_energy = total_energy.max(reading.energy_kwh);
            power_sum += reading.voltage * reading.current;
        }

        let mean_current = current_sum / session.len() as f64;
        let calculated_energy = power_sum / 1000.0 / 3600.0;

        Ok(FeatureVector {
            max_voltage,
            min_voltage,
            mean_current,
            total_energy,
            physics_diff: (total_energy - calculated_energy).abs(),
        })
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}
