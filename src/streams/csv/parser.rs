use crate::core::instance_header::InstanceHeader;
use crate::core::instances::DenseInstance;
use crate::error::{DowntimeError, Result};
use csv::StringRecord;
use std::sync::Arc;

pub(super) fn parse_header(relation_name: &str, record: &StringRecord) -> Result<InstanceHeader> {
    let columns = record.iter().map(str::to_string).collect();
    InstanceHeader::from_columns(relation_name.to_string(), columns)
}

/// Parses one data record. Arity mismatches are structural and reported as
/// validation errors; unusable cell contents surface as training errors since
/// the classifier cannot be fitted on them.
pub(super) fn parse_instance_values(
    header: &Arc<InstanceHeader>,
    record: &StringRecord,
    line_number: u64,
) -> Result<DenseInstance> {
    if record.len() != header.number_of_columns() {
        return Err(DowntimeError::validation(format!(
            "Error tokenizing data. Expected {} fields in line {}, saw {}",
            header.number_of_columns(),
            line_number,
            record.len()
        )));
    }

    let mut features = Vec::with_capacity(header.number_of_features());
    for &idx in header.feature_indices() {
        features.push(parse_numeric_cell(header, &record[idx], idx, line_number)?);
    }

    let class_idx = header.class_index();
    let label = parse_numeric_cell(header, &record[class_idx], class_idx, line_number)?;
    if label != 0.0 && label != 1.0 {
        return Err(DowntimeError::training(format!(
            "{} must be 0 or 1, found '{}' in line {}",
            header.class_name(),
            &record[class_idx],
            line_number
        )));
    }

    Ok(DenseInstance::labeled(Arc::clone(header), features, label))
}

fn parse_numeric_cell(
    header: &InstanceHeader,
    raw: &str,
    idx: usize,
    line_number: u64,
) -> Result<f64> {
    let column = header.column_at_index(idx).unwrap_or("?");
    let cell = raw.trim();
    if cell.is_empty() {
        return Err(DowntimeError::training(format!(
            "Input contains NaN: column '{column}' is empty in line {line_number}"
        )));
    }

    let value: f64 = cell.parse().map_err(|_| {
        DowntimeError::training(format!(
            "could not convert string to float: '{cell}' (column '{column}', line {line_number})"
        ))
    })?;

    if !value.is_finite() {
        return Err(DowntimeError::training(format!(
            "Input contains NaN or infinity: column '{column}' in line {line_number}"
        )));
    }
    Ok(value)
}
