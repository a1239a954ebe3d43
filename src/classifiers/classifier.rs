use crate::core::dataset::Dataset;
use crate::core::instances::Instance;
use crate::error::Result;

pub trait Classifier {
    /// Fits from scratch on `training`, discarding any previous state.
    fn train(&mut self, training: &Dataset) -> Result<()>;
    /// Per-class scores for `instance`, indexed by class value. Empty when the
    /// classifier cannot score it.
    fn get_votes_for_instance(&self, instance: &dyn Instance) -> Vec<f64>;

    /// Index of the highest vote; ties resolve to the lower class.
    fn predict(&self, instance: &dyn Instance) -> Option<usize> {
        argmax(&self.get_votes_for_instance(instance))
    }
}

pub fn argmax(votes: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in votes.iter().enumerate() {
        if v.is_nan() {
            continue;
        }
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}
