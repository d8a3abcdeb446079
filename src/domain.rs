use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{MeasurementError, Result};
use crate::timestamp;

/// a timestamped set of named sensor readings
///
/// serialized flat, the way clients submit it:
/// `{"timestamp": "2015-09-01T16:00:00.000Z", "temperature": 27.1, "dewPoint": 16.9}`
#[derive(Clone, Serialize, Debug, PartialEq)]
pub struct Measurement {
    /// normalized store key
    pub timestamp: String,

    /// metric name -> reading
    #[serde(flatten)]
    pub fields: BTreeMap<String, f64>,
}

impl Measurement {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, metric: &str, value: f64) -> Self {
        self.fields.insert(metric.to_string(), value);
        self
    }

    /// validate a submitted json object
    ///
    /// the `timestamp` member is required and normalized; every other member
    /// must be a json number or a string holding a finite float.
    pub fn from_body(body: &Map<String, Value>) -> Result<Self> {
        let raw_ts = body
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or(MeasurementError::InvalidTimestamp)?;
        let timestamp = timestamp::normalize(raw_ts)?;

        let mut fields = BTreeMap::new();
        for (name, value) in body.iter().filter(|(name, _)| name.as_str() != "timestamp") {
            let reading =
                parse_reading(value).ok_or_else(|| MeasurementError::NonNumericField(name.clone()))?;
            fields.insert(name.clone(), reading);
        }

        Ok(Self { timestamp, fields })
    }

    pub fn get(&self, metric: &str) -> Option<f64> {
        self.fields.get(metric).copied()
    }
}

fn parse_reading(value: &Value) -> Option<f64> {
    let reading = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    reading.is_finite().then_some(reading)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn test_from_body_accepts_numbers_and_numeric_strings() {
        let m = Measurement::from_body(&body(json!({
            "timestamp": "2015-09-01T16:00:00Z",
            "temperature": 27.1,
            "dewPoint": "16.9",
        })))
        .unwrap();

        assert_eq!(m.timestamp, "2015-09-01T16:00:00.000Z");
        assert_eq!(m.get("temperature"), Some(27.1));
        assert_eq!(m.get("dewPoint"), Some(16.9));
        assert!(!m.fields.contains_key("timestamp"));
    }

    #[test]
    fn test_from_body_requires_timestamp() {
        let err = Measurement::from_body(&body(json!({"temperature": 27.1}))).unwrap_err();
        assert_eq!(err, MeasurementError::InvalidTimestamp);

        let err = Measurement::from_body(&body(json!({"timestamp": 12}))).unwrap_err();
        assert_eq!(err, MeasurementError::InvalidTimestamp);
    }

    #[test]
    fn test_from_body_rejects_non_numeric() {
        for bad in [json!("warm"), json!(""), json!("NaN"), json!(true), json!(null), json!([1.0])] {
            let err = Measurement::from_body(&body(json!({
                "timestamp": "2015-09-01T16:00:00Z",
                "temperature": bad,
            })))
            .unwrap_err();
            assert_eq!(err, MeasurementError::NonNumericField("temperature".into()));
        }
    }

    #[test]
    fn test_from_body_repeated_member_last_wins() {
        let raw = r#"{"timestamp":"2015-09-01T16:00:00Z","temperature":1,"temperature":2}"#;
        let map: Map<String, Value> = serde_json::from_str(raw).unwrap();

        let m = Measurement::from_body(&map).unwrap();
        assert_eq!(m.get("temperature"), Some(2.0));
        assert_eq!(m.fields.len(), 1);
    }

    #[test]
    fn test_serializes_flat() {
        let m = Measurement::new("2015-09-01T16:00:00.000Z").with("temperature", 27.1);
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(
            v,
            json!({"timestamp": "2015-09-01T16:00:00.000Z", "temperature": 27.1})
        );
    }
}
