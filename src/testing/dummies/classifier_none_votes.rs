use crate::classifiers::Classifier;
use crate::core::dataset::Dataset;
use crate::core::instances::Instance;
use crate::error::Result;

#[derive(Default)]
pub struct ClassifierNoneVotes;

impl Classifier for ClassifierNoneVotes {
    fn train(&mut self, _training: &Dataset) -> Result<()> {
        Ok(())
    }

    fn get_votes_for_instance(&self, _instance: &dyn Instance) -> Vec<f64> {
        Vec::new()
    }
}
