use serde::Serialize;
use std::fmt::{Display, Formatter, Result as FmtResult};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Measurement {
    pub name: String,
    pub value: f64,
}

impl Measurement {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    pub fn find<'a>(measurements: &'a [Measurement], name: &str) -> Option<&'a Measurement> {
        measurements.iter().find(|m| m.name == name)
    }
}

impl Display for Measurement {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        if self.value.is_nan() {
            write!(f, "{}=NaN", self.name)
        } else {
            write!(f, "{}={:.6}", self.name, self.value)
        }
    }
}
