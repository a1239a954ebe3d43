use crate::classifiers::Classifier;
use crate::core::dataset::Dataset;
use crate::core::instances::Instance;
use crate::error::Result;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

pub struct TrainSpyHandle(Arc<AtomicU64>);
impl TrainSpyHandle {
    /// Number of rows the spy was trained on.
    pub fn count(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

pub struct TrainSpyClassifier {
    count: Arc<AtomicU64>,
}

impl TrainSpyClassifier {
    pub fn new() -> (Self, TrainSpyHandle) {
        let counter = Arc::new(AtomicU64::new(0));
        (
            Self {
                count: counter.clone(),
            },
            TrainSpyHandle(counter),
        )
    }
}

impl Classifier for TrainSpyClassifier {
    fn train(&mut self, training: &Dataset) -> Result<()> {
        self.count.fetch_add(training.len() as u64, Ordering::Relaxed);
        Ok(())
    }

    fn get_votes_for_instance(&self, inst: &dyn Instance) -> Vec<f64> {
        let y = inst.class_value().unwrap_or_default() as usize;
        let mut v = vec![0.0; 2];
        if y < v.len() {
            v[y] = 1.0;
        }
        v
    }
}
