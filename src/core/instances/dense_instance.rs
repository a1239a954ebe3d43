use crate::core::instance_header::InstanceHeader;
use crate::core::instances::Instance;
use crate::error::{DowntimeError, Result};
use std::sync::Arc;

/// One row of model input: feature values in header feature order plus an
/// optional binary label.
#[derive(Clone, Debug)]
pub struct DenseInstance {
    header: Arc<InstanceHeader>,
    features: Vec<f64>,
    class_value: Option<f64>,
    weight: f64,
}

impl DenseInstance {
    pub fn new(
        header: Arc<InstanceHeader>,
        features: Vec<f64>,
        class_value: Option<f64>,
        weight: f64,
    ) -> Self {
        Self {
            header,
            features,
            class_value,
            weight,
        }
    }

    pub fn labeled(header: Arc<InstanceHeader>, features: Vec<f64>, class_value: f64) -> Self {
        Self::new(header, features, Some(class_value), 1.0)
    }

    /// Builds a row for prediction. Every feature must be a finite number.
    pub fn unlabeled(header: Arc<InstanceHeader>, features: Vec<f64>) -> Result<Self> {
        if features.len() != header.number_of_features() {
            return Err(DowntimeError::validation(format!(
                "Expected {} feature values, got {}",
                header.number_of_features(),
                features.len()
            )));
        }
        if let Some(pos) = features.iter().position(|v| !v.is_finite()) {
            let name = header.feature_names()[pos].to_string();
            return Err(DowntimeError::validation(format!(
                "'{name}' must be a finite number"
            )));
        }
        Ok(Self::new(header, features, None, 1.0))
    }
}

impl Instance for DenseInstance {
    fn weight(&self) -> f64 {
        self.weight
    }

    fn value_at_index(&self, index: usize) -> Option<f64> {
        self.features.get(index).copied()
    }

    fn number_of_features(&self) -> usize {
        self.features.len()
    }

    fn class_value(&self) -> Option<f64> {
        self.class_value
    }

    fn features(&self) -> &[f64] {
        &self.features
    }

    fn header(&self) -> &InstanceHeader {
        &self.header
    }
}
