use crate::classifiers::{Classifier, LogisticRegression};
use crate::core::instance_header::{InstanceHeader, RUN_TIME, TEMPERATURE};
use crate::core::instances::DenseInstance;
use crate::error::{DowntimeError, Result};
use crate::utils::math::round_to;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use strum_macros::Display;

const REQUIRED_FIELDS: &str = "Both 'Temperature' and 'Run_Time' are required fields.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRequest {
    pub temperature: f64,
    pub run_time: f64,
}

impl PredictionRequest {
    pub fn new(temperature: f64, run_time: f64) -> Self {
        Self {
            temperature,
            run_time,
        }
    }

    /// Reads `{"Temperature": number, "Run_Time": number}`. Extra keys are
    /// ignored.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|_| DowntimeError::validation(REQUIRED_FIELDS))?;
        let Value::Object(fields) = value else {
            return Err(DowntimeError::validation(REQUIRED_FIELDS));
        };

        let number = |name: &str| -> Result<f64> {
            match fields.get(name) {
                None | Some(Value::Null) => Err(DowntimeError::validation(REQUIRED_FIELDS)),
                Some(Value::Number(n)) => n.as_f64().ok_or_else(|| {
                    DowntimeError::validation(format!("'{name}' must be a finite number"))
                }),
                Some(other) => Err(DowntimeError::validation(format!(
                    "'{name}' must be a number, got {other}"
                ))),
            }
        };

        Ok(Self::new(number(TEMPERATURE)?, number(RUN_TIME)?))
    }

    fn to_instance(self) -> Result<DenseInstance> {
        DenseInstance::unlabeled(
            Arc::new(InstanceHeader::canonical()),
            vec![self.temperature, self.run_time],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum DowntimeLabel {
    Yes,
    No,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "Downtime")]
    pub downtime: DowntimeLabel,
    #[serde(rename = "Confidence")]
    pub confidence: f64,
}

/// Labels one observation. Confidence is the probability of the predicted
/// class rounded to two decimals.
pub fn predict(model: &LogisticRegression, request: PredictionRequest) -> Result<PredictionResult> {
    let instance = request.to_instance()?;
    let proba = model.predict_proba(&[request.temperature, request.run_time])?;

    let downtime = match model.predict(&instance) {
        Some(1) => DowntimeLabel::Yes,
        _ => DowntimeLabel::No,
    };
    let confidence = round_to(proba[0].max(proba[1]), 2);

    Ok(PredictionResult {
        downtime,
        confidence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifiers::LogisticRegressionParams;
    use crate::error::ErrorKind;
    use crate::testing::downtime_dataset;

    fn fitted() -> LogisticRegression {
        let mut lr = LogisticRegression::new(LogisticRegressionParams::default());
        lr.train(&downtime_dataset(80)).unwrap();
        lr
    }

    #[test]
    fn parses_numbers_and_ignores_extra_keys() {
        let r = PredictionRequest::from_json(br#"{"Temperature": 80, "Run_Time": 120.5, "x": 1}"#)
            .unwrap();
        assert_eq!(r, PredictionRequest::new(80.0, 120.5));
    }

    #[test]
    fn missing_field_is_a_validation_error() {
        for body in [
            &br#"{"Temperature": 80}"#[..],
            br#"{"Run_Time": 80}"#,
            br#"{"Temperature": null, "Run_Time": 1}"#,
            b"{}",
        ] {
            let err = PredictionRequest::from_json(body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationError);
            assert_eq!(err.to_string(), REQUIRED_FIELDS);
        }
    }

    #[test]
    fn malformed_or_non_object_body_is_a_validation_error() {
        for body in [&b"not json"[..], b"[1, 2]", b"42", b""] {
            let err = PredictionRequest::from_json(body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValidationError);
        }
    }

    #[test]
    fn string_value_names_the_field() {
        let err = PredictionRequest::from_json(br#"{"Temperature": "hot", "Run_Time": 1}"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(err.to_string().contains("Temperature"), "{err}");
    }

    #[test]
    fn hot_long_runs_predict_downtime() {
        let model = fitted();
        let hot = predict(&model, PredictionRequest::new(95.0, 170.0)).unwrap();
        assert_eq!(hot.downtime, DowntimeLabel::Yes);
        let cool = predict(&model, PredictionRequest::new(60.0, 80.0)).unwrap();
        assert_eq!(cool.downtime, DowntimeLabel::No);
    }

    #[test]
    fn confidence_is_rounded_and_at_least_one_half() {
        let model = fitted();
        for (t, r) in [(60.0, 80.0), (75.0, 110.0), (95.0, 170.0), (70.0, 120.0)] {
            let out = predict(&model, PredictionRequest::new(t, r)).unwrap();
            assert!((0.5..=1.0).contains(&out.confidence), "{out:?}");
            assert_eq!(out.confidence, (out.confidence * 100.0).round() / 100.0);
        }
    }

    #[test]
    fn label_agrees_with_probability() {
        let model = fitted();
        for (t, r) in [(60.0, 80.0), (75.0, 110.0), (95.0, 170.0), (70.0, 120.0)] {
            let out = predict(&model, PredictionRequest::new(t, r)).unwrap();
            let p1 = model.predict_proba(&[t, r]).unwrap()[1];
            assert_eq!(out.downtime == DowntimeLabel::Yes, p1 > 0.5);
        }
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let model = fitted();
        let err = predict(&model, PredictionRequest::new(f64::NAN, 1.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }

    #[test]
    fn result_serializes_with_service_field_names() {
        let out = PredictionResult {
            downtime: DowntimeLabel::Yes,
            confidence: 0.85,
        };
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(json, r#"{"Downtime":"Yes","Confidence":0.85}"#);
    }

    #[test]
    fn label_displays_as_its_wire_name() {
        assert_eq!(DowntimeLabel::Yes.to_string(), "Yes");
        assert_eq!(DowntimeLabel::No.to_string(), "No");
    }
}
