mod dummies;
mod fixtures;
mod spies;
mod stubs;

pub use dummies::classifier_none_votes::ClassifierNoneVotes;
pub use fixtures::{downtime_csv, downtime_dataset};
pub use spies::train_spy_classifier::{TrainSpyClassifier, TrainSpyHandle};
pub use stubs::oracle_classifier::OracleClassifier;
