use crate::serving::ModelHolder;
use crate::tasks::TrainingConfig;
use std::sync::Arc;
use std::time::Instant;

/// Shared handler state. Cloned per request; the holder is shared.
#[derive(Debug, Clone)]
pub struct AppState {
    pub holder: Arc<ModelHolder>,
    pub training: TrainingConfig,
    started: Instant,
}

impl AppState {
    pub fn new(holder: Arc<ModelHolder>, training: TrainingConfig) -> Self {
        Self {
            holder,
            training,
            started: Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started.elapsed().as_secs()
    }
}
