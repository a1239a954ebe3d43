mod model_store;

pub use model_store::{LoadedModel, MODEL_FORMAT, MODEL_FORMAT_VERSION, ModelStore, StoredModel};
