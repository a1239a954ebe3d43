mod logistic_regression;

pub use logistic_regression::{LogisticRegression, LogisticRegressionParams};
