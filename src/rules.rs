//! Deterministic rule validation for charging sessions.
//!
//! Four ordered checks per reading, scanned in time order: voltage
//! envelope, current envelope, energy monotonicity, and physics
//! reconciliation. The first violation wins; an earlier-in-time anomaly
//! is always the one reported.

use serde::{Deserialize, Serialize};

use crate::types::decision::Verdict;
use crate::types::reading::Reading;

/// Rated safe operating envelope of the charging hardware.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleLimits {
    /// Minimum acceptable voltage (V)
    pub min_voltage: f64,
    /// Maximum acceptable voltage (V)
    pub max_voltage: f64,
    /// Minimum acceptable current (A)
    pub min_current: f64,
    /// Maximum acceptable current (A)
    pub max_current: f64,
}

impl Default for RuleLimits {
    fn default() -> Self {
        Self {
            min_voltage: 200.0,
            max_voltage: 260.0,
            min_current: 0.0,
            max_current: 50.0,
        }
    }
}

/// Physics reconciliation tuning.
///
/// Contract: the integration assumes uniform sampling. `dt_seconds` is
/// the fixed interval between consecutive readings and is never derived
/// from `time_index` gaps; feeding irregularly sampled telemetry through
/// this check produces wrong energy figures.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// Relative error tolerance between reported and calculated energy
    pub tolerance: f64,
    /// Calculated energy below this floor is too small for a stable ratio (kWh)
    pub noise_floor_kwh: f64,
    /// Sampling interval between consecutive readings (seconds)
    pub dt_seconds: f64,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            tolerance: 0.05,
            noise_floor_kwh: 0.01,
            dt_seconds: 1.0,
        }
    }
}

/// Scans a session in time order and reports the first rule violation.
pub struct RuleValidator {
    limits: RuleLimits,
    physics: PhysicsConfig,
}

impl RuleValidator {
    /// Create a validator with the given envelope and physics tuning.
    pub fn new(limits: RuleLimits, physics: PhysicsConfig) -> Self {
        Self { limits, physics }
    }

    /// Evaluate the rule cascade over one session.
    ///
    /// Readings are re-sorted by `time_index` before scanning: the checks
    /// model a sequential physical process, and an out-of-order reading
    /// would produce false positives on monotonicity and reconciliation.
    pub fn validate(&self, readings: &[Reading]) -> Verdict {
        let mut session: Vec<&Reading> = readings.iter().collect();
        session.sort_by_key(|r| r.time_index);

        let mut previous_energy: Option<f64> = None;
        let mut calculated_energy = 0.0;

        for reading in session {
            // Rule 1: voltage safety range
            if reading.voltage < self.limits.min_voltage
                || reading.voltage > self.limits.max_voltage
            {
                return Verdict::fraud(format!(
                    "Voltage anomaly detected: {}V at t={}",
                    reading.voltage, reading.time_index
                ));
            }

            // Rule 2: current safety range
            if reading.current < self.limits.min_current
                || reading.current > self.limits.max_current
            {
                return Verdict::fraud(format!(
                    "Current anomaly detected: {}A at t={}",
                    reading.current, reading.time_index
                ));
            }

            if let Some(prev) = previous_energy {
                // Rule 3: a physical meter only accumulates
                if reading.energy_kwh < prev {
                    return Verdict::fraud(format!(
                        "Energy decrease detected at t={} ({} -> {})",
                        reading.time_index, prev, reading.energy_kwh
                    ));
                }

                // Rule 4: reported energy must track the integrated power.
                // The first reading has no preceding interval, so
                // accumulation starts here, on the second reading.
                calculated_energy += (reading.voltage * reading.current / 1000.0)
                    * (self.physics.dt_seconds / 3600.0);

                if calculated_energy > self.physics.noise_floor_kwh {
                    let relative_error =
                        (reading.energy_kwh - calculated_energy).abs() / calculated_energy;
                    if relative_error > self.physics.tolerance {
                        return Verdict::fraud(format!(
                            "Energy mismatch at t={}: reported {:.4} kWh vs calculated {:.4} kWh",
                            reading.time_index, reading.energy_kwh, calculated_energy
                        ));
                    }
                }
            }

            previous_energy = Some(reading.energy_kwh);
        }

        Verdict::valid("Session completed normally.")
    }
}

impl Default for RuleValidator {
    fn default() -> Self {
        Self::new(RuleLimits::default(), PhysicsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::decision::SessionStatus;

    // One integration step at 230 V / 10 A over 1 s, in kWh.
    const STEP_KWH: f64 = 230.0 * 10.0 / 1000.0 / 3600.0;

    fn reading(t: u64, voltage: f64, current: f64, energy_kwh: f64) -> Reading {
        Reading::new(t, "S1", voltage, current, energy_kwh)
    }

    /// Steady 230 V / 10 A session whose reported energy matches the
    /// validator's integration exactly (zero at t=0, one step per reading
    /// after that), optionally inflated by `factor`.
    fn steady_session(len: u64, factor: f64) -> Vec<Reading> {
        (0..len)
            .map(|t| reading(t, 230.0, 10.0, t as f64 * STEP_KWH * factor))
            .collect()
    }

    #[test]
    fn test_clean_session_is_valid() {
        let validator = RuleValidator::default();
        let verdict = validator.validate(&steady_session(30, 1.0));

        assert_eq!(verdict.status, SessionStatus::Valid);
        assert_eq!(verdict.reason, "Session completed normally.");
    }

    #[test]
    fn test_voltage_boundary_is_inclusive() {
        let validator = RuleValidator::default();

        let mut session = steady_session(10, 1.0);
        session[4].voltage = 260.0;
        assert!(!validator.validate(&session).is_fraud());

        session[4].voltage = 260.01;
        let verdict = validator.validate(&session);
        assert!(verdict.is_fraud());
        assert!(verdict.reason.contains("260.01V"));
        assert!(verdict.reason.contains("t=4"));
    }

    #[test]
    fn test_voltage_dip_is_fraud() {
        let validator = RuleValidator::default();
        let mut session = steady_session(10, 1.0);
        session[7].voltage = 185.0;

        let verdict = validator.validate(&session);
        assert!(verdict.is_fraud());
        assert!(verdict.reason.contains("185V"));
    }

    #[test]
    fn test_current_boundary_is_inclusive() {
        let validator = RuleValidator::default();

        let mut session = steady_session(10, 1.0);
        session[3].current = 50.0;
        assert!(!validator.validate(&session).is_fraud());

        session[3].current = 50.1;
        let verdict = validator.validate(&session);
        assert!(verdict.is_fraud());
        assert!(verdict.reason.contains("50.1A"));
        assert!(verdict.reason.contains("t=3"));
    }

    #[test]
    fn test_negative_current_is_fraud() {
        let validator = RuleValidator::default();
        let mut session = steady_session(10, 1.0);
        session[2].current = -0.5;

        assert!(validator.validate(&session).is_fraud());
    }

    #[test]
    fn test_energy_decrease_is_fraud() {
        let validator = RuleValidator::default();
        let session = vec![reading(0, 230.0, 10.0, 1.0), reading(1, 230.0, 10.0, 0.9)];

        let verdict = validator.validate(&session);
        assert!(verdict.is_fraud());
        assert!(verdict.reason.contains("Energy decrease"));
        assert!(verdict.reason.contains("t=1"));
        assert!(verdict.reason.contains("1 -> 0.9"));
    }

    #[test]
    fn test_physics_mismatch_six_percent_over_is_fraud() {
        let validator = RuleValidator::default();
        let verdict = validator.validate(&steady_session(3600, 1.06));

        assert!(verdict.is_fraud());
        assert!(verdict.reason.contains("Energy mismatch"));
        assert!(verdict.reason.contains("reported"));
        assert!(verdict.reason.contains("calculated"));
    }

    #[test]
    fn test_physics_mismatch_four_percent_over_is_valid() {
        let validator = RuleValidator::default();
        let verdict = validator.validate(&steady_session(3600, 1.04));

        assert!(!verdict.is_fraud());
    }

    #[test]
    fn test_physics_check_waits_for_noise_floor() {
        // Far off in relative terms, but the integrated energy never
        // clears 0.01 kWh in such a short session.
        let validator = RuleValidator::default();
        let verdict = validator.validate(&steady_session(5, 2.0));

        assert!(!verdict.is_fraud());
    }

    #[test]
    fn test_earliest_violation_in_time_wins() {
        let validator = RuleValidator::default();
        let mut session = steady_session(10, 1.0);
        session[2].voltage = 300.0;
        session[5].current = 60.0;

        let verdict = validator.validate(&session);
        assert!(verdict.reason.contains("Voltage"));
        assert!(verdict.reason.contains("t=2"));
    }

    #[test]
    fn test_unsorted_input_is_resorted_before_scanning() {
        let validator = RuleValidator::default();
        let mut session = steady_session(10, 1.0);
        session[2].voltage = 300.0;
        session[5].current = 60.0;
        // Present the later violation first; sorting must restore time order.
        session.reverse();

        let verdict = validator.validate(&session);
        assert!(verdict.reason.contains("Voltage"));
        assert!(verdict.reason.contains("t=2"));
    }

    #[test]
    fn test_unsorted_clean_session_is_valid() {
        let validator = RuleValidator::default();
        let mut session = steady_session(30, 1.0);
        session.swap(0, 29);
        session.swap(3, 17);

        assert!(!validator.validate(&session).is_fraud());
    }
}
