use crate::error::{DowntimeError, Result};
use std::fmt;

pub const MACHINE_ID: &str = "Machine_ID";
pub const TEMPERATURE: &str = "Temperature";
pub const RUN_TIME: &str = "Run_Time";
pub const DOWNTIME_FLAG: &str = "Downtime_Flag";

pub const REQUIRED_COLUMNS: [&str; 4] = [MACHINE_ID, TEMPERATURE, RUN_TIME, DOWNTIME_FLAG];
pub const FEATURE_COLUMNS: [&str; 2] = [TEMPERATURE, RUN_TIME];

/// Column layout of a downtime dataset: which raw CSV columns feed the model
/// and which one holds the label.
pub struct InstanceHeader {
    relation_name: String,
    columns: Vec<String>,
    feature_indices: Vec<usize>,
    class_index: usize,
}

impl InstanceHeader {
    /// Resolves the required columns against a raw header row. Columns may be in
    /// any order and extra columns are ignored.
    pub fn from_columns(relation_name: String, columns: Vec<String>) -> Result<InstanceHeader> {
        let missing = REQUIRED_COLUMNS
            .iter()
            .any(|name| !columns.iter().any(|c| c == name));
        if missing {
            return Err(DowntimeError::validation(format!(
                "Dataset must contain these columns: {}",
                REQUIRED_COLUMNS.join(", ")
            )));
        }

        let position = |name: &str| columns.iter().position(|c| c == name).unwrap_or_default();
        let feature_indices = FEATURE_COLUMNS.iter().map(|n| position(*n)).collect();
        let class_index = position(DOWNTIME_FLAG);

        Ok(InstanceHeader {
            relation_name,
            columns,
            feature_indices,
            class_index,
        })
    }

    /// Header used for rows that never came from a file, e.g. prediction input.
    pub fn canonical() -> InstanceHeader {
        InstanceHeader {
            relation_name: "downtime".to_string(),
            columns: REQUIRED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            feature_indices: vec![1, 2],
            class_index: 3,
        }
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn number_of_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn number_of_features(&self) -> usize {
        self.feature_indices.len()
    }

    pub fn feature_indices(&self) -> &[usize] {
        &self.feature_indices
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.feature_indices
            .iter()
            .map(|&i| self.columns[i].as_str())
            .collect()
    }

    pub fn class_index(&self) -> usize {
        self.class_index
    }

    pub fn class_name(&self) -> &str {
        &self.columns[self.class_index]
    }

    pub fn number_of_classes(&self) -> usize {
        2
    }

    pub fn column_at_index(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    pub fn index_of_column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

impl fmt::Debug for InstanceHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceHeader")
            .field("relation_name", &self.relation_name)
            .field("class_index", &self.class_index)
            .field("n_columns", &self.columns.len())
            .field("feature_indices", &self.feature_indices)
            .finish()
    }
}
