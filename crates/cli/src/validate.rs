use ciri_impact::{parse_field, InputSet};
use serde::Serialize;
use std::path::Path;

use crate::config::RunPaths;
use crate::input::read_first_record;
use crate::report::money;
use crate::seed::read_allocation_table;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableSummary {
    pub rows: usize,
    /// Rows with a negative amount. A negative total impact yields a table
    /// where every row is negative, so these are reported apart from
    /// unreadable rows.
    pub negative_rows: usize,
    pub unreadable_rows: usize,
    /// Sum of every numeric amount, negative ones included.
    pub total_usd: f64,
}

/// Findings of `ciri validate`. Errors make the command fail; warnings do not.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub table: Option<TableSummary>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for err in &self.errors {
            out.push_str(&format!("error: {err}\n"));
        }
        for warning in &self.warnings {
            out.push_str(&format!("warning: {warning}\n"));
        }
        if let Some(table) = &self.table {
            out.push_str(&format!(
                "allocation table: {} row(s), {} negative, {} unreadable, total = {}\n",
                table.rows,
                table.negative_rows,
                table.unreadable_rows,
                money(table.total_usd)
            ));
        }
        out.push_str(if self.is_ok() {
            "inputs validated ✓"
        } else {
            "validation failed"
        });
        out
    }
}

/// Check the input file and, if present, the persisted allocation table.
pub fn validate(paths: &RunPaths) -> ValidationReport {
    let mut report = ValidationReport::default();
    check_inputs(&paths.input_path, &mut report);
    check_table(&paths.output_path, &mut report);
    report
}

fn check_inputs(path: &Path, report: &mut ValidationReport) {
    let record = match read_first_record(path) {
        Ok(record) => record,
        Err(err) => {
            report.errors.push(format!("{err:#}"));
            return;
        }
    };

    let missing: Vec<&str> = InputSet::FIELD_NAMES
        .iter()
        .copied()
        .filter(|name| !record.headers.iter().any(|h| h.as_str() == *name))
        .collect();
    if !missing.is_empty() {
        report.errors.push(format!(
            "{} is missing required columns: {}",
            path.display(),
            missing.join(", ")
        ));
    }

    if record.values.is_none() {
        report
            .errors
            .push(format!("{} has no data row", path.display()));
        return;
    }

    let mut negative = Vec::new();
    for (name, text) in record.pairs() {
        if !InputSet::is_field(name) {
            continue;
        }
        match parse_field(name, text) {
            Ok(value) if value < 0.0 => negative.push(name),
            Ok(_) => {}
            Err(err) => report.errors.push(err.to_string()),
        }
    }
    if !negative.is_empty() {
        report
            .warnings
            .push(format!("negative values in: {}", negative.join(", ")));
    }
}

fn check_table(path: &Path, report: &mut ValidationReport) {
    if !path.exists() {
        report.warnings.push(format!(
            "allocation table {} not found (run `ciri run` to generate it)",
            path.display()
        ));
        return;
    }

    let rows = match read_allocation_table(path) {
        Ok(rows) => rows,
        Err(err) => {
            report.errors.push(format!("{err:#}"));
            return;
        }
    };

    let mut summary = TableSummary {
        rows: rows.len(),
        negative_rows: 0,
        unreadable_rows: 0,
        total_usd: 0.0,
    };
    for row in &rows {
        match row.allocated_usd {
            Some(amount) => {
                if amount < 0.0 {
                    summary.negative_rows += 1;
                }
                summary.total_usd += amount;
            }
            None => summary.unreadable_rows += 1,
        }
    }
    if rows.is_empty() {
        report
            .warnings
            .push(format!("allocation table {} has no rows", path.display()));
    }
    if summary.negative_rows > 0 {
        report.warnings.push(format!(
            "allocation table {} has {} row(s) with negative amounts \
             (expected when the total impact is negative)",
            path.display(),
            summary.negative_rows
        ));
    }
    if summary.unreadable_rows > 0 {
        report.warnings.push(format!(
            "allocation table {} has {} row(s) with non-numeric amounts",
            path.display(),
            summary.unreadable_rows
        ));
    }
    report.table = Some(summary);
}
