use anyhow::{Context as AnyhowContext, Result};
use ciri_impact::{ImpactError, InputSet};
use std::path::Path;

/// Header row plus the first data record of a delimited file.
#[derive(Debug, Clone)]
pub struct FirstRecord {
    pub headers: Vec<String>,
    /// `None` when the file holds a header but no data.
    pub values: Option<Vec<String>>,
}

impl FirstRecord {
    /// `(header, value)` pairs. Short records yield empty values for the
    /// trailing columns.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        let Some(values) = &self.values else {
            return Vec::new();
        };
        let value = |idx: usize| values.get(idx).map_or("", String::as_str);
        self.headers
            .iter()
            .enumerate()
            .map(|(idx, header)| (header.as_str(), value(idx)))
            .collect()
    }
}

pub fn read_first_record(path: &Path) -> Result<FirstRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let values = match reader.records().next() {
        Some(record) => Some(
            record
                .with_context(|| format!("Failed to read first record of {}", path.display()))?
                .iter()
                .map(str::to_string)
                .collect(),
        ),
        None => None,
    };

    Ok(FirstRecord { headers, values })
}

/// Load the model inputs from the first data record of `path`.
///
/// Fails before any computation when the file has no data record, a required
/// column is absent, or a value is not a finite number.
pub fn load_inputs(path: &Path) -> Result<InputSet> {
    let record = read_first_record(path)?;
    if record.values.is_none() {
        return Err(ImpactError::MissingInput).with_context(|| path.display().to_string());
    }

    for header in &record.headers {
        if !InputSet::is_field(header) {
            log::debug!("ignoring extra input column `{header}`");
        }
    }

    let inputs = InputSet::from_raw_fields(record.pairs())
        .with_context(|| format!("Invalid inputs in {}", path.display()))?;

    let negative = inputs.negative_fields();
    if !negative.is_empty() {
        log::warn!("negative input values: {}", negative.join(", "));
    }
    Ok(inputs)
}
