//! Telemetry reading structures for charging session analysis

use serde::{Deserialize, Serialize};

use crate::error::GuardianError;

/// One sampled instant of charging telemetry.
///
/// Immutable once produced; the engine never mutates readings, it only
/// sorts copies of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reading {
    /// Sample index within the session (seconds since session start)
    pub time_index: u64,

    /// Session this reading belongs to
    pub session_id: String,

    /// Measured voltage (V)
    pub voltage: f64,

    /// Measured current (A)
    pub current: f64,

    /// Cumulative energy reported by the meter (kWh)
    pub energy_kwh: f64,
}

impl Reading {
    /// Create a new reading.
    pub fn new(
        time_index: u64,
        session_id: impl Into<String>,
        voltage: f64,
        current: f64,
        energy_kwh: f64,
    ) -> Self {
        Self {
            time_index,
            session_id: session_id.into(),
            voltage,
            current,
            energy_kwh,
        }
    }

    /// Reject readings carrying NaN or infinite values.
    pub fn check_finite(&self) -> Result<(), GuardianError> {
        let fields = [
            ("voltage", self.voltage),
            ("current", self.current),
            ("energy_kwh", self.energy_kwh),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(GuardianError::MalformedReading {
                    time_index: self.time_index,
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

/// A session id plus its readings, in the shape the ingestion layer posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPayload {
    pub session_id: String,
    pub data: Vec<Reading>,
}

impl SessionPayload {
    /// Parse a payload from its JSON wire form.
    pub fn from_json(raw: &str) -> Result<Self, GuardianError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_serialization() {
        let reading = Reading::new(3, "S1", 230.5, 10.2, 0.0153);

        let json = serde_json::to_string(&reading).unwrap();
        let deserialized: Reading = serde_json::from_str(&json).unwrap();

        assert_eq!(reading.time_index, deserialized.time_index);
        assert_eq!(reading.session_id, deserialized.session_id);
        assert_eq!(reading.voltage, deserialized.voltage);
        assert_eq!(reading.energy_kwh, deserialized.energy_kwh);
    }

    #[test]
    fn test_check_finite_accepts_normal_reading() {
        let reading = Reading::new(0, "S1", 230.0, 10.0, 0.0);
        assert!(reading.check_finite().is_ok());
    }

    #[test]
    fn test_check_finite_rejects_nan() {
        let reading = Reading::new(5, "S1", f64::NAN, 10.0, 0.0);
        let err = reading.check_finite().unwrap_err();
        match err {
            GuardianError::MalformedReading {
                time_index, field, ..
            } => {
                assert_eq!(time_index, 5);
                assert_eq!(field, "voltage");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_check_finite_rejects_infinite_energy() {
        let reading = Reading::new(2, "S1", 230.0, 10.0, f64::INFINITY);
        assert!(reading.check_finite().is_err());
    }

    #[test]
    fn test_session_payload_from_json() {
        let raw = r#"{
            "session_id": "S1",
            "data": [
                { "time_index": 0, "session_id": "S1", "voltage": 230.0, "current": 10.0, "energy_kwh": 0.0 },
                { "time_index": 1, "session_id": "S1", "voltage": 231.0, "current": 10.1, "energy_kwh": 0.00064 }
            ]
        }"#;

        let payload = SessionPayload::from_json(raw).unwrap();
        assert_eq!(payload.session_id, "S1");
        assert_eq!(payload.data.len(), 2);
        assert_eq!(payload.data[1].time_index, 1);
    }

    #[test]
    fn test_session_payload_rejects_missing_fields() {
        let raw = r#"{ "session_id": "S1", "data": [ { "time_index": 0, "session_id": "S1" } ] }"#;
        assert!(matches!(
            SessionPayload::from_json(raw),
            Err(GuardianError::Json(_))
        ));
    }
}
