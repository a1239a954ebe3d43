mod evaluators;
mod measurement;

pub use evaluators::{BasicClassificationEvaluator, PerformanceEvaluator};
pub use measurement::Measurement;
