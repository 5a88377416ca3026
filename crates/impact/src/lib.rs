//! # CIRI Impact
//!
//! The CIRI economic-impact model and the CIBS allocation seed.
//!
//! ## Architecture
//!
//! ```text
//! InputSet (13 named values)
//!     │
//!     ├──> compute()  → ImpactResult
//!     │                   └─> total_impact
//!     │
//!     └──> split(total_impact, &buckets) → AllocationTable
//! ```
//!
//! Both steps are pure. Reading inputs, rendering reports and persisting the
//! table belong to the caller.
//!
//! ## Example
//!
//! ```rust
//! use ciri_impact::{compute, default_buckets, split, InputSet};
//!
//! let inputs = InputSet {
//!     cases_avoided: 10.0,
//!     avg_cost_per_case: 5000.0,
//!     jail_days_avoided: 100.0,
//!     cost_per_jail_day: 150.0,
//!     fees_canceled_total: 2000.0,
//!     licenses_restored: 5.0,
//!     avg_monthly_wage: 3000.0,
//!     employment_probability: 0.8,
//!     months_effective: 6.0,
//!     expected_lawsuits: 2.0,
//!     avg_payout: 10000.0,
//!     multiplier: 1.5,
//!     transition_costs_one_time: 8000.0,
//! };
//!
//! let result = compute(&inputs);
//! assert!((result.total_impact - 194_500.0).abs() < 1e-9);
//!
//! let table = split(result.total_impact, &default_buckets());
//! assert_eq!(table[0].amount_cents(), "48625.00");
//! ```

mod allocation;
mod calculator;
mod error;
mod types;

pub use allocation::{
    default_buckets, fraction_sum, is_balanced, split, AllocationRow, AllocationTable, Bucket,
    FRACTION_SUM_TOLERANCE,
};
pub use calculator::compute;
pub use error::{ImpactError, Result};
pub use types::{parse_field, ImpactResult, InputSet};
