use crate::core::instance_header::InstanceHeader;
use crate::core::instances::{DenseInstance, Instance};
use crate::error::{DowntimeError, Result};
use crate::streams::Stream;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use std::sync::Arc;

/// Fully materialized labeled dataset.
#[derive(Clone, Debug)]
pub struct Dataset {
    header: Arc<InstanceHeader>,
    instances: Vec<DenseInstance>,
}

impl Dataset {
    pub fn new(header: Arc<InstanceHeader>, instances: Vec<DenseInstance>) -> Self {
        Self { header, instances }
    }

    /// Drains a stream, failing on the first row that cannot be parsed.
    pub fn from_stream(stream: &mut dyn Stream) -> Result<Self> {
        let header = Arc::clone(stream.header());
        let mut instances = Vec::new();
        while stream.has_more_instances() {
            match stream.next_instance() {
                Some(next) => instances.push(next?),
                None => break,
            }
        }
        Ok(Self::new(header, instances))
    }

    pub fn header(&self) -> &InstanceHeader {
        &self.header
    }

    pub fn instances(&self) -> &[DenseInstance] {
        &self.instances
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Weighted count of each class label, indexed by class value.
    pub fn class_distribution(&self) -> Vec<f64> {
        let mut dist = vec![0.0; self.header.number_of_classes()];
        for inst in &self.instances {
            if let Some(c) = inst.class_value() {
                let c = c as usize;
                if c >= dist.len() {
                    dist.resize(c + 1, 0.0);
                }
                dist[c] += inst.weight();
            }
        }
        dist
    }

    /// Shuffled holdout split: `ceil(test_fraction * n)` rows go to the test
    /// partition, the rest to training. Same seed, same partition.
    pub fn train_test_split(&self, test_fraction: f64, seed: u64) -> Result<(Dataset, Dataset)> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(DowntimeError::internal(format!(
                "test_fraction must lie in (0, 1), got {test_fraction}"
            )));
        }

        let n = self.instances.len();
        let n_test = (test_fraction * n as f64).ceil() as usize;
        let n_train = n.saturating_sub(n_test);
        if n_test == 0 || n_train == 0 {
            return Err(DowntimeError::training(format!(
                "With n_samples={n}, test_size={test_fraction} the resulting train set will be empty"
            )));
        }

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let pick = |idx: &[usize]| -> Vec<DenseInstance> {
            idx.iter().map(|&i| self.instances[i].clone()).collect()
        };
        let test = Dataset::new(Arc::clone(&self.header), pick(&indices[..n_test]));
        let train = Dataset::new(Arc::clone(&self.header), pick(&indices[n_test..]));

        Ok((train, test))
    }
}
