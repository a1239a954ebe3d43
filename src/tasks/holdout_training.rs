use crate::classifiers::{Classifier, LogisticRegression, LogisticRegressionParams};
use crate::core::dataset::Dataset;
use crate::error::{DowntimeError, Result};
use crate::evaluation::{BasicClassificationEvaluator, Measurement, PerformanceEvaluator};
use cpu_time::ThreadTime;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Share of rows held out for evaluation.
    pub test_fraction: f64,
    /// Seed of the holdout shuffle.
    pub seed: u64,
    pub model: LogisticRegressionParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_fraction: 0.2,
            seed: 42,
            model: LogisticRegressionParams::default(),
        }
    }
}

impl TrainingConfig {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    pub fn with_model(mut self, model: LogisticRegressionParams) -> Self {
        self.model = model;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub accuracy: f64,
    pub f1_score: f64,
    pub precision: f64,
    pub recall: f64,
    pub kappa: f64,
    pub train_rows: usize,
    pub test_rows: usize,
    pub cpu_seconds: f64,
}

/// Split once, fit on the training partition, score the held-out rows.
pub struct HoldoutTraining<C: Classifier> {
    learner: C,
    evaluator: Box<dyn PerformanceEvaluator>,
    test_fraction: f64,
    seed: u64,
}

impl<C: Classifier> HoldoutTraining<C> {
    pub fn new(
        learner: C,
        evaluator: Box<dyn PerformanceEvaluator>,
        test_fraction: f64,
        seed: u64,
    ) -> Result<Self> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(DowntimeError::internal(format!(
                "test_fraction must lie in (0, 1), got {test_fraction}"
            )));
        }
        Ok(Self {
            learner,
            evaluator,
            test_fraction,
            seed,
        })
    }

    pub fn run(&mut self, dataset: &Dataset) -> Result<TrainingReport> {
        let (train, test) = dataset.train_test_split(self.test_fraction, self.seed)?;

        let start = ThreadTime::now();
        self.learner.train(&train)?;
        let cpu_seconds = start.elapsed().as_secs_f64();

        self.evaluator.reset();
        for inst in test.instances() {
            let votes = self.learner.get_votes_for_instance(inst);
            self.evaluator.add_result(inst, votes);
        }

        let perf = self.evaluator.performance();
        let metric = |name: &str| {
            Measurement::find(&perf, name)
                .map(|m| m.value)
                .unwrap_or(f64::NAN)
        };

        let report = TrainingReport {
            accuracy: metric("accuracy"),
            f1_score: metric("f1"),
            precision: metric("precision"),
            recall: metric("recall"),
            kappa: metric("kappa"),
            train_rows: train.len(),
            test_rows: test.len(),
            cpu_seconds,
        };

        info!(
            train_rows = report.train_rows,
            test_rows = report.test_rows,
            accuracy = report.accuracy,
            f1 = report.f1_score,
            cpu_seconds = report.cpu_seconds,
            "holdout training finished"
        );
        Ok(report)
    }

    pub fn into_learner(self) -> C {
        self.learner
    }
}

/// Fits the downtime classifier on `dataset` using `config`.
pub fn train_logistic_regression(
    dataset: &Dataset,
    config: &TrainingConfig,
) -> Result<(LogisticRegression, TrainingReport)> {
    let mut task = HoldoutTraining::new(
        LogisticRegression::new(config.model),
        Box::new(BasicClassificationEvaluator::binary()),
        config.test_fraction,
        config.seed,
    )?;
    let report = task.run(dataset)?;
    Ok((task.into_learner(), report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instance_header::InstanceHeader;
    use crate::core::instances::DenseInstance;
    use crate::error::ErrorKind;
    use crate::testing::{
        ClassifierNoneVotes, OracleClassifier, TrainSpyClassifier, downtime_dataset,
    };
    use std::sync::Arc;

    #[test]
    fn ctor_guards_fraction() {
        let e = Box::new(BasicClassificationEvaluator::binary());
        assert!(HoldoutTraining::new(OracleClassifier::default(), e, 0.0, 42).is_err());
        let e = Box::new(BasicClassificationEvaluator::binary());
        assert!(HoldoutTraining::new(OracleClassifier::default(), e, 1.5, 42).is_err());
    }

    #[test]
    fn oracle_scores_perfectly_on_holdout() {
        let e = Box::new(BasicClassificationEvaluator::binary());
        let mut task = HoldoutTraining::new(OracleClassifier::default(), e, 0.2, 42).unwrap();
        let report = task.run(&downtime_dataset(100)).unwrap();
        assert_eq!(report.train_rows, 80);
        assert_eq!(report.test_rows, 20);
        assert_eq!(report.accuracy, 1.0);
        assert_eq!(report.f1_score, 1.0);
    }

    #[test]
    fn learner_only_sees_training_partition() {
        let (spy, handle) = TrainSpyClassifier::new();
        let e = Box::new(BasicClassificationEvaluator::binary());
        let mut task = HoldoutTraining::new(spy, e, 0.2, 42).unwrap();
        task.run(&downtime_dataset(50)).unwrap();
        assert_eq!(handle.count(), 40);
    }

    #[test]
    fn no_votes_leave_accuracy_undefined() {
        let e = Box::new(BasicClassificationEvaluator::binary());
        let mut task = HoldoutTraining::new(ClassifierNoneVotes, e, 0.2, 42).unwrap();
        let report = task.run(&downtime_dataset(20)).unwrap();
        assert!(report.accuracy.is_nan());
        assert_eq!(report.f1_score, 0.0);
    }

    #[test]
    fn logistic_regression_report_is_in_range_and_reproducible() {
        let ds = downtime_dataset(100);
        let config = TrainingConfig::default();
        let (model_a, a) = train_logistic_regression(&ds, &config).unwrap();
        let (model_b, b) = train_logistic_regression(&ds, &config).unwrap();

        assert!((0.0..=1.0).contains(&a.accuracy));
        assert!((0.0..=1.0).contains(&a.f1_score));
        assert_eq!(a.accuracy, b.accuracy);
        assert_eq!(a.f1_score, b.f1_score);
        assert_eq!(model_a, model_b);
        assert!(model_a.is_fitted());
    }

    #[test]
    fn single_class_training_partition_fails() {
        let header = Arc::new(InstanceHeader::canonical());
        let instances = (0..10)
            .map(|i| DenseInstance::labeled(Arc::clone(&header), vec![i as f64, 1.0], 0.0))
            .collect();
        let ds = Dataset::new(header, instances);
        let err = train_logistic_regression(&ds, &TrainingConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalError);
    }

    #[test]
    fn config_builders() {
        let c = TrainingConfig::default().with_seed(7).with_test_fraction(0.3);
        assert_eq!(c.seed, 7);
        assert_eq!(c.test_fraction, 0.3);
        assert_eq!(c.model.c, 1.0);
    }
}
