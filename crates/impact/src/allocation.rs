use serde::Serialize;

use crate::error::{ImpactError, Result};

/// How far a bucket set may drift from a fraction sum of 1.0 before callers
/// should consider it unbalanced.
pub const FRACTION_SUM_TOLERANCE: f64 = 1e-9;

/// One line item of an allocation: a program label and its share of the pool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bucket {
    pub label: String,
    pub fraction: f64,
}

impl Bucket {
    pub fn new(label: impl Into<String>, fraction: f64) -> Self {
        Self {
            label: label.into(),
            fraction,
        }
    }

    /// Parse a bucket from template text. The label must be non-empty and the
    /// fraction a finite number.
    pub fn parse(label: &str, fraction: &str) -> Result<Self> {
        let label = label.trim();
        if label.is_empty() {
            return Err(ImpactError::bucket_template("empty program label"));
        }
        let fraction: f64 = fraction.trim().parse().map_err(|_| {
            ImpactError::bucket_template(format!(
                "percent {:?} for {label:?} is not a number",
                fraction.trim()
            ))
        })?;
        if !fraction.is_finite() {
            return Err(ImpactError::bucket_template(format!(
                "percent for {label:?} is not finite"
            )));
        }
        Ok(Self::new(label, fraction))
    }
}

/// One row of an allocation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationRow {
    pub program_name: String,
    /// The bucket fraction, unrounded.
    pub percent: f64,
    pub allocated_amount: f64,
}

impl AllocationRow {
    /// The allocated amount with exactly two decimal places.
    pub fn amount_cents(&self) -> String {
        format!("{:.2}", self.allocated_amount)
    }
}

/// Ordered allocation rows; order matches the bucket list that produced it.
pub type AllocationTable = Vec<AllocationRow>;

/// The standard CIBS seed buckets, in declaration order.
pub fn default_buckets() -> Vec<Bucket> {
    vec![
        Bucket::new("Housing Stabilization / Emergency Housing", 0.25),
        Bucket::new("Youth Support / Re-entry / Aftercare", 0.20),
        Bucket::new("Veterans & Emergency Relief", 0.10),
        Bucket::new("Legal Defense / Rights Protection", 0.15),
        Bucket::new("Mental Health / Stability Access", 0.15),
        Bucket::new("Civic Compliance & Admin (Audit / Reporting)", 0.15),
    ]
}

/// Sum of all bucket fractions.
pub fn fraction_sum(buckets: &[Bucket]) -> f64 {
    buckets.iter().map(|b| b.fraction).sum()
}

/// Whether the fractions add up to one within [`FRACTION_SUM_TOLERANCE`].
pub fn is_balanced(buckets: &[Bucket]) -> bool {
    (fraction_sum(buckets) - 1.0).abs() <= FRACTION_SUM_TOLERANCE
}

/// Partition `total` across `buckets`, one row per bucket in the given order.
///
/// Fractions are used as given. A bucket set that does not sum to one still
/// produces its per-row products; balancing is the caller's contract.
pub fn split(total: f64, buckets: &[Bucket]) -> AllocationTable {
    buckets
        .iter()
        .map(|bucket| AllocationRow {
            program_name: bucket.label.clone(),
            percent: bucket.fraction,
            allocated_amount: total * bucket.fraction,
        })
        .collect()
}
