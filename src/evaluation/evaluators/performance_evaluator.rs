use crate::core::instances::Instance;
use crate::evaluation::Measurement;

pub trait PerformanceEvaluator {
    fn reset(&mut self);
    fn add_result(&mut self, instance: &dyn Instance, votes: Vec<f64>);
    fn performance(&self) -> Vec<Measurement>;
}
