use anyhow::{Context as AnyhowContext, Result};
use ciri_impact::{default_buckets, fraction_sum, is_balanced, AllocationRow, Bucket, ImpactError};
use std::fs;
use std::path::Path;

pub const TABLE_HEADER: [&str; 3] = ["program", "percent", "allocated_usd"];
const TEMPLATE_HEADER: [&str; 2] = ["program", "percent"];

/// Write the allocation table as CSV, creating parent directories as needed.
///
/// Rows are written in table order; `allocated_usd` carries two decimals and
/// `percent` the unrounded fraction.
pub fn write_allocation_table(path: &Path, rows: &[AllocationRow]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(TABLE_HEADER)?;
    for row in rows {
        let percent = row.percent.to_string();
        let amount = row.amount_cents();
        writer.write_record([row.program_name.as_str(), percent.as_str(), amount.as_str()])?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("wrote {} allocation rows to {}", rows.len(), path.display());
    Ok(())
}

/// Buckets for this run: the template at `path` when given, the built-in
/// seed buckets otherwise.
pub fn resolve_buckets(path: Option<&Path>) -> Result<Vec<Bucket>> {
    match path {
        Some(path) => load_bucket_template(path),
        None => Ok(default_buckets()),
    }
}

/// Read a `program,percent` template. Rows are kept in file order and used
/// as given; an unbalanced template only produces a warning.
pub fn load_bucket_template(path: &Path) -> Result<Vec<Bucket>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open bucket template {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| ImpactError::bucket_template(format!("missing column `{name}`")))
    };
    let label_idx = column(TEMPLATE_HEADER[0])?;
    let percent_idx = column(TEMPLATE_HEADER[1])?;

    let mut buckets = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| {
            format!("Failed to read bucket template {}", path.display())
        })?;
        let bucket = Bucket::parse(
            record.get(label_idx).unwrap_or_default(),
            record.get(percent_idx).unwrap_or_default(),
        )
        .with_context(|| format!("Bad row in bucket template {}", path.display()))?;
        buckets.push(bucket);
    }

    if buckets.is_empty() {
        return Err(ImpactError::bucket_template("no buckets defined"))
            .with_context(|| path.display().to_string());
    }
    if !is_balanced(&buckets) {
        log::warn!(
            "bucket fractions in {} sum to {} (expected 1.0); allocating as given",
            path.display(),
            fraction_sum(&buckets)
        );
    }
    Ok(buckets)
}

/// One parsed row of a persisted allocation table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub program: String,
    pub allocated_usd: Option<f64>,
}

/// Read back a persisted allocation table. Amounts that do not parse as
/// numbers are kept as `None` so callers can report them.
pub fn read_allocation_table(path: &Path) -> Result<Vec<TableRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers = reader.headers()?.clone();
    let missing: Vec<&str> = TABLE_HEADER
        .iter()
        .copied()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .collect();
    if !missing.is_empty() {
        anyhow::bail!(
            "{} is missing columns: {}",
            path.display(),
            missing.join(", ")
        );
    }
    let program_idx = headers
        .iter()
        .position(|h| h == TABLE_HEADER[0])
        .unwrap_or(0);
    let amount_idx = headers
        .iter()
        .position(|h| h == TABLE_HEADER[2])
        .unwrap_or(2);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Failed to read {}", path.display()))?;
        rows.push(TableRow {
            program: record.get(program_idx).unwrap_or_default().to_string(),
            allocated_usd: record
                .get(amount_idx)
                .and_then(|raw| raw.parse::<f64>().ok())
                .filter(|v| v.is_finite()),
        });
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciri_impact::split;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn writes_header_and_rows_in_declared_order() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("cibs/auto_budget.csv");
        let rows = split(194_500.0, &default_buckets());
        write_allocation_table(&path, &rows).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "program,percent,allocated_usd",
                "Housing Stabilization / Emergency Housing,0.25,48625.00",
                "Youth Support / Re-entry / Aftercare,0.2,38900.00",
                "Veterans & Emergency Relief,0.1,19450.00",
                "Legal Defense / Rights Protection,0.15,29175.00",
                "Mental Health / Stability Access,0.15,29175.00",
                "Civic Compliance & Admin (Audit / Reporting),0.15,29175.00",
            ]
        );
    }

    #[test]
    fn labels_with_commas_are_quoted() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("t.csv");
        let rows = split(10.0, &[Bucket::new("Food, Water", 1.0)]);
        write_allocation_table(&path, &rows).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"Food, Water\",1,10.00"));

        let back = read_allocation_table(&path).unwrap();
        assert_eq!(
            back,
            vec![TableRow {
                program: "Food, Water".to_string(),
                allocated_usd: Some(10.0),
            }]
        );
    }

    #[test]
    fn template_rows_keep_file_order() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("template.csv");
        fs::write(&path, "program,percent,notes\nZeta,0.5,x\nAlpha, 0.5 ,y\n").unwrap();
        let buckets = load_bucket_template(&path).unwrap();
        assert_eq!(
            buckets,
            vec![Bucket::new("Zeta", 0.5), Bucket::new("Alpha", 0.5)]
        );
    }

    #[test]
    fn unbalanced_template_is_used_as_given() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("template.csv");
        fs::write(&path, "program,percent\nA,0.7\nB,0.7\n").unwrap();
        let buckets = load_bucket_template(&path).unwrap();
        assert_eq!(buckets.len(), 2);
        assert_eq!(fraction_sum(&buckets), 1.4);
    }

    #[test]
    fn empty_or_broken_templates_fail() {
        let temp = tempdir().unwrap();

        let empty = temp.path().join("empty.csv");
        fs::write(&empty, "program,percent\n").unwrap();
        let err = load_bucket_template(&empty).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImpactError>(),
            Some(ImpactError::BucketTemplate(_))
        ));

        let no_column = temp.path().join("cols.csv");
        fs::write(&no_column, "program,share\nA,1\n").unwrap();
        assert!(load_bucket_template(&no_column).is_err());

        let bad_value = temp.path().join("bad.csv");
        fs::write(&bad_value, "program,percent\nA,half\n").unwrap();
        let err = load_bucket_template(&bad_value).unwrap_err();
        assert!(format!("{err:#}").contains("not a number"));
    }

    #[test]
    fn resolve_without_template_uses_seed_buckets() {
        assert_eq!(resolve_buckets(None).unwrap(), default_buckets());
    }

    #[test]
    fn unreadable_amounts_are_kept_as_none() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("t.csv");
        fs::write(
            &path,
            "program,percent,allocated_usd\nA,0.5,abc\nB,0.5,-3.50\n",
        )
        .unwrap();
        let rows = read_allocation_table(&path).unwrap();
        assert_eq!(rows[0].allocated_usd, None);
        assert_eq!(rows[1].allocated_usd, Some(-3.5));
    }

    #[test]
    fn table_without_required_columns_fails() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("t.csv");
        fs::write(&path, "program,value\nA,1\n").unwrap();
        let err = read_allocation_table(&path).unwrap_err();
        assert!(err.to_string().contains("percent, allocated_usd"));
    }
}
