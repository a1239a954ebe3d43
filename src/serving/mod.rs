pub mod inference;
mod model_holder;

pub use inference::{DowntimeLabel, PredictionRequest, PredictionResult, predict};
pub use model_holder::ModelHolder;
