use crate::core::instance_header::InstanceHeader;
use crate::core::instances::DenseInstance;
use crate::error::{DowntimeError, Result};
use crate::streams::csv::parser::{parse_header, parse_instance_values};
use crate::streams::stream::Stream;
use csv::{ReaderBuilder, StringRecord};
use std::fs;
use std::path::Path;
use std::sync::Arc;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Instance stream over an in-memory CSV document. The header is parsed and
/// validated up front; data rows are parsed lazily.
#[derive(Debug)]
pub struct CsvStream {
    header: Arc<InstanceHeader>,
    /// `(1-based line number, record)` for every non-blank data record.
    records: Vec<(u64, StringRecord)>,
    position: usize,
}

impl Stream for CsvStream {
    fn header(&self) -> &Arc<InstanceHeader> {
        &self.header
    }

    fn has_more_instances(&self) -> bool {
        self.position < self.records.len()
    }

    fn next_instance(&mut self) -> Option<Result<DenseInstance>> {
        let (line_number, record) = self.records.get(self.position)?;
        self.position += 1;
        Some(parse_instance_values(&self.header, record, *line_number))
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|cell| cell.trim().is_empty())
}

fn tokenizing_error(e: csv::Error) -> DowntimeError {
    DowntimeError::validation(format!("Error tokenizing data. {e}"))
}

impl CsvStream {
    pub fn from_bytes(relation_name: &str, bytes: &[u8]) -> Result<Self> {
        std::str::from_utf8(bytes).map_err(|e| {
            DowntimeError::validation(format!("Uploaded file is not UTF-8 text: {e}"))
        })?;
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(bytes);

        let header_record = reader.headers().map_err(tokenizing_error)?.clone();
        if is_blank(&header_record) {
            return Err(DowntimeError::validation("No columns to parse from file"));
        }
        let header = parse_header(relation_name, &header_record)?;

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result.map_err(tokenizing_error)?;
            if is_blank(&record) {
                continue;
            }
            let line = record.position().map(|p| p.line()).unwrap_or_default();
            records.push((line, record));
        }

        Ok(CsvStream {
            header: Arc::new(header),
            records,
            position: 0,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            DowntimeError::validation(format!("Cannot read dataset {}: {e}", path.display()))
        })?;
        let relation = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("dataset");
        Self::from_bytes(relation, &bytes)
    }
}
