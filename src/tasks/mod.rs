pub mod holdout_training;

pub use holdout_training::{
    HoldoutTraining, TrainingConfig, TrainingReport, train_logistic_regression,
};
