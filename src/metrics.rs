//! Evaluation statistics for embedding services.
//!
//! The engine never records into a collector on its own; the service
//! that owns it records each decision it receives. All counters are
//! thread-safe, so one collector can sit behind an `Arc` across workers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::Duration;

use tracing::info;

use crate::types::decision::{Decision, DetectionMethod, SessionStatus};

/// Metrics collector for session evaluations.
pub struct EngineMetrics {
    /// Total sessions evaluated
    pub sessions_evaluated: AtomicU64,
    /// Sessions classified as fraud
    pub fraud_detected: AtomicU64,
    /// Decisions produced by the rule path
    rule_based_decisions: AtomicU64,
    /// Decisions produced by the model path
    ml_decisions: AtomicU64,
    /// Evaluation times (in microseconds)
    evaluation_times: RwLock<Vec<u64>>,
}

impl EngineMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self {
            sessions_evaluated: AtomicU64::new(0),
            fraud_detected: AtomicU64::new(0),
            rule_based_decisions: AtomicU64::new(0),
            ml_decisions: AtomicU64::new(0),
            evaluation_times: RwLock::new(Vec::with_capacity(1000)),
        }
    }

    /// Record one evaluated session.
    pub fn record_decision(&self, elapsed: Duration, decision: &Decision) {
        self.sessions_evaluated.fetch_add(1, Ordering::Relaxed);

        if decision.status == SessionStatus::Fraud {
            self.fraud_detected.fetch_add(1, Ordering::Relaxed);
        }

        match decision.detection_method {
            DetectionMethod::RuleBased => {
                self.rule_based_decisions.fetch_add(1, Ordering::Relaxed);
            }
            DetectionMethod::MlModel => {
                self.ml_decisions.fetch_add(1, Ordering::Relaxed);
            }
        }

        if let Ok(mut times) = self.evaluation_times.write() {
            times.push(elapsed.as_micros() as u64);
            // Keep only the recent window for memory efficiency
            if times.len() > 10_000 {
                times.drain(0..5_000);
            }
        }
    }

    /// Fraction of evaluated sessions classified as fraud.
    pub fn fraud_rate(&self) -> f64 {
        let total = self.sessions_evaluated.load(Ordering::Relaxed);
        if total == 0 {
            return 0.0;
        }
        self.fraud_detected.load(Ordering::Relaxed) as f64 / total as f64
    }

    /// Decisions per detection method (rule_based, ml_model).
    pub fn decisions_by_method(&self) -> (u64, u64) {
        (
            self.rule_based_decisions.load(Ordering::Relaxed),
            self.ml_decisions.load(Ordering::Relaxed),
        )
    }

    /// Get evaluation time statistics over the recent window.
    pub fn get_evaluation_stats(&self) -> EvaluationStats {
        let times = self.evaluation_times.read().unwrap();
        if times.is_empty() {
            return EvaluationStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        EvaluationStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Log a summary of engine activity.
    pub fn print_summary(&self) {
        let sessions = self.sessions_evaluated.load(Ordering::Relaxed);
        let fraud = self.fraud_detected.load(Ordering::Relaxed);
        let (rule_based, ml) = self.decisions_by_method();
        let stats = self.get_evaluation_stats();

        info!(
            sessions = sessions,
            fraud = fraud,
            fraud_rate_pct = self.fraud_rate() * 100.0,
            "Guardian engine summary"
        );
        info!(
            rule_based = rule_based,
            ml_model = ml,
            "Decisions by detection method"
        );
        info!(
            mean_us = stats.mean_us,
            p50_us = stats.p50_us,
            p95_us = stats.p95_us,
            p99_us = stats.p99_us,
            "Evaluation time (μs)"
        );
    }
}

impl Default for EngineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluation time statistics.
#[derive(Debug, Default)]
pub struct EvaluationStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}
