pub mod classifier;
pub mod linear;

pub use classifier::{Classifier, argmax};
pub use linear::{LogisticRegression, LogisticRegressionParams};
