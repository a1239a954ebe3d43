use crate::classifiers::argmax;
use crate::core::instances::Instance;
use crate::evaluation::{Measurement, PerformanceEvaluator};

/// Weighted confusion-matrix evaluator. Precision, recall and F1 are reported
/// for `positive_class`; undefined ratios fall back to 0.
pub struct BasicClassificationEvaluator {
    num_classes: usize,
    positive_class: usize,
    /// `confusion[actual][predicted]`
    confusion: Vec<Vec<f64>>,
    weight_observed: f64,
}

impl BasicClassificationEvaluator {
    pub fn new(num_classes: usize, positive_class: usize) -> Self {
        let num_classes = num_classes.max(2);
        Self {
            num_classes,
            positive_class,
            confusion: vec![vec![0.0; num_classes]; num_classes],
            weight_observed: 0.0,
        }
    }

    pub fn binary() -> Self {
        Self::new(2, 1)
    }

    pub fn weight_observed(&self) -> f64 {
        self.weight_observed
    }

    pub fn accuracy(&self) -> f64 {
        if self.weight_observed == 0.0 {
            return f64::NAN;
        }
        let correct: f64 = (0..self.num_classes).map(|c| self.confusion[c][c]).sum();
        correct / self.weight_observed
    }

    fn positive_counts(&self) -> (f64, f64, f64) {
        let p = self.positive_class;
        let tp = self.confusion[p][p];
        let fp: f64 = (0..self.num_classes)
            .filter(|&a| a != p)
            .map(|a| self.confusion[a][p])
            .sum();
        let fn_: f64 = (0..self.num_classes)
            .filter(|&pr| pr != p)
            .map(|pr| self.confusion[p][pr])
            .sum();
        (tp, fp, fn_)
    }

    pub fn precision(&self) -> f64 {
        let (tp, fp, _) = self.positive_counts();
        ratio_or_zero(tp, tp + fp)
    }

    pub fn recall(&self) -> f64 {
        let (tp, _, fn_) = self.positive_counts();
        ratio_or_zero(tp, tp + fn_)
    }

    pub fn f1(&self) -> f64 {
        let (tp, fp, fn_) = self.positive_counts();
        ratio_or_zero(2.0 * tp, 2.0 * tp + fp + fn_)
    }

    pub fn kappa(&self) -> f64 {
        if self.weight_observed == 0.0 {
            return 0.0;
        }
        let total = self.weight_observed;
        let p0 = self.accuracy();
        let pc: f64 = (0..self.num_classes)
            .map(|c| {
                let actual: f64 = self.confusion[c].iter().sum();
                let predicted: f64 = self.confusion.iter().map(|row| row[c]).sum();
                (actual / total) * (predicted / total)
            })
            .sum();
        if pc >= 1.0 { 0.0 } else { (p0 - pc) / (1.0 - pc) }
    }
}

#[inline]
fn ratio_or_zero(num: f64, den: f64) -> f64 {
    if den > 0.0 { num / den } else { 0.0 }
}

impl PerformanceEvaluator for BasicClassificationEvaluator {
    fn reset(&mut self) {
        for row in &mut self.confusion {
            row.iter_mut().for_each(|v| *v = 0.0);
        }
        self.weight_observed = 0.0;
    }

    fn add_result(&mut self, instance: &dyn Instance, votes: Vec<f64>) {
        let w = instance.weight();
        if w <= 0.0 {
            return;
        }
        let Some(actual) = instance.class_value().map(|c| c as usize) else {
            return;
        };
        let Some(predicted) = argmax(&votes) else {
            return;
        };
        if actual >= self.num_classes || predicted >= self.num_classes {
            return;
        }
        self.confusion[actual][predicted] += w;
        self.weight_observed += w;
    }

    fn performance(&self) -> Vec<Measurement> {
        vec![
            Measurement::new("accuracy", self.accuracy()),
            Measurement::new("kappa", self.kappa()),
            Measurement::new("precision", self.precision()),
            Measurement::new("recall", self.recall()),
            Measurement::new("f1", self.f1()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::instance_header::InstanceHeader;
    use crate::core::instances::DenseInstance;
    use std::sync::Arc;

    const EPS: f64 = 1e-12;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() <= EPS
    }

    fn labeled(y: f64) -> DenseInstance {
        DenseInstance::labeled(Arc::new(InstanceHeader::canonical()), vec![0.0, 0.0], y)
    }

    fn vote_for(class: usize) -> Vec<f64> {
        if class == 1 { vec![0.2, 0.8] } else { vec![0.9, 0.1] }
    }

    fn feed(e: &mut BasicClassificationEvaluator, pairs: &[(usize, usize)]) {
        for &(actual, predicted) in pairs {
            e.add_result(&labeled(actual as f64), vote_for(predicted));
        }
    }

    #[test]
    fn empty_evaluator_reports_nan_accuracy_and_zero_scores() {
        let e = BasicClassificationEvaluator::binary();
        assert!(e.accuracy().is_nan());
        assert_eq!(e.f1(), 0.0);
        assert_eq!(e.kappa(), 0.0);
    }

    #[test]
    fn confusion_metrics() {
        let mut e = BasicClassificationEvaluator::binary();
        // tp=3, fn=1, fp=2, tn=4
        feed(
            &mut e,
            &[
                (1, 1), (1, 1), (1, 1), (1, 0),
                (0, 1), (0, 1),
                (0, 0), (0, 0), (0, 0), (0, 0),
            ],
        );
        assert!(approx(e.accuracy(), 0.7));
        assert!(approx(e.precision(), 0.6));
        assert!(approx(e.recall(), 0.75));
        assert!(approx(e.f1(), 6.0 / 9.0));
        assert_eq!(e.weight_observed(), 10.0);
    }

    #[test]
    fn no_positive_predictions_gives_zero_f1() {
        let mut e = BasicClassificationEvaluator::binary();
        feed(&mut e, &[(1, 0), (0, 0), (0, 0)]);
        assert_eq!(e.f1(), 0.0);
        assert_eq!(e.precision(), 0.0);
        assert!(approx(e.accuracy(), 2.0 / 3.0));
    }

    #[test]
    fn perfect_predictions() {
        let mut e = BasicClassificationEvaluator::binary();
        feed(&mut e, &[(1, 1), (0, 0), (1, 1), (0, 0)]);
        let perf = e.performance();
        assert!(approx(Measurement::find(&perf, "accuracy").unwrap().value, 1.0));
        assert!(approx(Measurement::find(&perf, "f1").unwrap().value, 1.0));
        assert!(approx(Measurement::find(&perf, "kappa").unwrap().value, 1.0));
    }

    #[test]
    fn empty_votes_and_unlabeled_rows_are_ignored() {
        let mut e = BasicClassificationEvaluator::binary();
        e.add_result(&labeled(1.0), Vec::new());
        let unlabeled =
            DenseInstance::unlabeled(Arc::new(InstanceHeader::canonical()), vec![1.0, 1.0]).unwrap();
        e.add_result(&unlabeled, vote_for(1));
        assert_eq!(e.weight_observed(), 0.0);
    }

    #[test]
    fn reset_clears_counts() {
        let mut e = BasicClassificationEvaluator::binary();
        feed(&mut e, &[(1, 1), (0, 1)]);
        e.reset();
        assert_eq!(e.weight_observed(), 0.0);
        assert!(e.accuracy().is_nan());
    }
}
