use crate::classifiers::Classifier;
use crate::core::dataset::Dataset;
use crate::core::instances::Instance;
use crate::error::Result;

/// Votes for whatever label the instance already carries.
#[derive(Default)]
pub struct OracleClassifier {
    num_classes: usize,
}

impl Classifier for OracleClassifier {
    fn train(&mut self, training: &Dataset) -> Result<()> {
        self.num_classes = training.header().number_of_classes();
        Ok(())
    }

    fn get_votes_for_instance(&self, instance: &dyn Instance) -> Vec<f64> {
        let y = instance.class_value().unwrap_or_default() as usize;
        let mut v = vec![0.0; self.num_classes.max(2)];
        if y < v.len() {
            v[y] = 1.0;
        }
        v
    }
}
