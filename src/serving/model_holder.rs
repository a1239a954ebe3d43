use crate::classifiers::LogisticRegression;
use crate::core::dataset::Dataset;
use crate::error::{DowntimeError, Result};
use crate::store::ModelStore;
use crate::streams::CsvStream;
use crate::tasks::{TrainingConfig, TrainingReport, train_logistic_regression};
use std::sync::{Arc, Mutex, RwLock};
use std::time::SystemTime;
use tracing::{debug, info};

#[derive(Debug, Clone)]
struct CachedModel {
    model: Arc<LogisticRegression>,
    /// mtime of the store file this model corresponds to.
    modified: SystemTime,
}

/// Process-wide owner of the active model. Reads go through the cache and
/// pick up a newer file on disk; training is single-writer.
#[derive(Debug)]
pub struct ModelHolder {
    store: ModelStore,
    cached: RwLock<Option<CachedModel>>,
    training: Mutex<()>,
}

fn poisoned<T>(_: T) -> DowntimeError {
    DowntimeError::internal("Model lock poisoned by a panicked request")
}

impl ModelHolder {
    pub fn new(store: ModelStore) -> Self {
        Self {
            store,
            cached: RwLock::new(None),
            training: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// The model to predict with, reloading it when the store holds a newer
    /// file than the cached copy. `None` if nothing was ever trained.
    pub fn current(&self) -> Result<Option<Arc<LogisticRegression>>> {
        let on_disk = self.store.modified()?;

        {
            let guard = self.cached.read().map_err(poisoned)?;
            match (guard.as_ref(), on_disk) {
                (Some(c), Some(m)) if m <= c.modified => return Ok(Some(Arc::clone(&c.model))),
                (Some(c), None) => return Ok(Some(Arc::clone(&c.model))),
                (None, None) => return Ok(None),
                _ => {}
            }
        }

        let mut guard = self.cached.write().map_err(poisoned)?;
        match (guard.as_ref(), on_disk) {
            (Some(c), Some(m)) if m <= c.modified => return Ok(Some(Arc::clone(&c.model))),
            _ => {}
        }

        match self.store.load()? {
            Some(loaded) => {
                let model = Arc::new(loaded.stored.model);
                info!(
                    path = %self.store.path().display(),
                    trained_at = %loaded.stored.trained_at,
                    "model reloaded from store"
                );
                *guard = Some(CachedModel {
                    model: Arc::clone(&model),
                    modified: loaded.modified,
                });
                Ok(Some(model))
            }
            None => Ok(guard.as_ref().map(|c| Arc::clone(&c.model))),
        }
    }

    /// Like [`current`](Self::current) but a missing model is an error.
    pub fn require(&self) -> Result<Arc<LogisticRegression>> {
        self.current()?.ok_or(DowntimeError::ModelNotTrained)
    }

    pub fn is_trained(&self) -> Result<bool> {
        Ok(self.current()?.is_some())
    }

    /// Makes `model` the active one. `modified` is the mtime of the file it
    /// was persisted to.
    pub fn install(&self, model: LogisticRegression, modified: SystemTime) -> Result<()> {
        let mut guard = self.cached.write().map_err(poisoned)?;
        *guard = Some(CachedModel {
            model: Arc::new(model),
            modified,
        });
        Ok(())
    }

    /// Parses an uploaded CSV, fits a fresh model, persists it and makes it
    /// active. Any failure leaves both the store and the active model as they
    /// were.
    pub fn retrain(&self, csv: &[u8], config: &TrainingConfig) -> Result<TrainingReport> {
        let mut stream = CsvStream::from_bytes("upload", csv)?;
        let dataset = Dataset::from_stream(&mut stream)?;
        self.retrain_dataset(&dataset, config)
    }

    pub fn retrain_dataset(
        &self,
        dataset: &Dataset,
        config: &TrainingConfig,
    ) -> Result<TrainingReport> {
        if dataset.is_empty() {
            return Err(DowntimeError::validation(
                "Dataset contains a header but no data rows",
            ));
        }

        let _writer = self.training.lock().map_err(poisoned)?;
        debug!(rows = dataset.len(), "training started");

        let (model, report) = train_logistic_regression(dataset, config)?;
        let modified = self.store.save(&model)?;
        self.install(model, modified)?;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::downtime_csv;
    use std::fs;
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};

    fn holder() -> (TempDir, ModelHolder) {
        let dir = tempdir().unwrap();
        let store = ModelStore::new(dir.path().join("model.json"));
        (dir, ModelHolder::new(store))
    }

    #[test]
    fn fresh_holder_has_no_model() {
        let (_dir, h) = holder();
        assert!(h.current().unwrap().is_none());
        assert!(!h.is_trained().unwrap());
        assert_eq!(h.require().unwrap_err().kind(), ErrorKind::ModelNotTrained);
    }

    #[test]
    fn retrain_persists_and_activates() {
        let (_dir, h) = holder();
        let report = h
            .retrain(downtime_csv(60).as_bytes(), &TrainingConfig::default())
            .unwrap();
        assert_eq!(report.test_rows, 12);
        assert!(h.store().exists());

        let active = h.require().unwrap();
        let on_disk = h.store().load().unwrap().unwrap();
        assert_eq!(*active, on_disk.stored.model);
    }

    #[test]
    fn second_holder_picks_up_existing_store() {
        let (dir, h) = holder();
        h.retrain(downtime_csv(40).as_bytes(), &TrainingConfig::default())
            .unwrap();

        let other = ModelHolder::new(ModelStore::new(dir.path().join("model.json")));
        assert_eq!(*other.require().unwrap(), *h.require().unwrap());
    }

    #[test]
    fn newer_file_on_disk_replaces_cached_model() {
        let (dir, reader) = holder();
        let writer = ModelHolder::new(ModelStore::new(dir.path().join("model.json")));

        writer
            .retrain(downtime_csv(40).as_bytes(), &TrainingConfig::default())
            .unwrap();
        let first = reader.require().unwrap();

        // Filesystems with coarse mtimes need the rewrite to land in a later tick.
        std::thread::sleep(Duration::from_millis(1100));
        writer
            .retrain(downtime_csv(80).as_bytes(), &TrainingConfig::default())
            .unwrap();

        let second = reader.require().unwrap();
        assert_ne!(*first, *second);
        assert_eq!(*second, *writer.require().unwrap());
    }

    #[test]
    fn deleted_file_keeps_serving_cached_model() {
        let (_dir, h) = holder();
        h.retrain(downtime_csv(40).as_bytes(), &TrainingConfig::default())
            .unwrap();
        fs::remove_file(h.store().path()).unwrap();
        assert!(h.is_trained().unwrap());
    }

    #[test]
    fn failed_training_leaves_store_untouched() {
        let (_dir, h) = holder();
        let err = h
            .retrain(b"Machine_ID,Temperature\nM1,70\n", &TrainingConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
        assert!(!h.store().exists());

        h.retrain(downtime_csv(40).as_bytes(), &TrainingConfig::default())
            .unwrap();
        let before = fs::read(h.store().path()).unwrap();

        let single_class = "Machine_ID,Temperature,Run_Time,Downtime_Flag\n\
                            M1,70,90,0\nM2,71,91,0\nM3,72,92,0\nM4,73,93,0\nM5,74,94,0\n";
        let err = h
            .retrain(single_class.as_bytes(), &TrainingConfig::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InternalError);
        assert_eq!(fs::read(h.store().path()).unwrap(), before);
    }

    #[test]
    fn header_only_upload_is_rejected() {
        let (_dir, h) = holder();
        let err = h
            .retrain(
                b"Machine_ID,Temperature,Run_Time,Downtime_Flag\n",
                &TrainingConfig::default(),
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValidationError);
    }
}
