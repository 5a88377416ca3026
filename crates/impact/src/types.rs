use std::collections::HashMap;

use serde::Serialize;

use crate::error::{ImpactError, Result};

/// The thirteen numeric inputs of the impact model.
///
/// Every field is required. Values are not range-checked: zero and negative
/// numbers are valid and flow through the formula unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InputSet {
    pub cases_avoided: f64,
    pub avg_cost_per_case: f64,
    pub jail_days_avoided: f64,
    pub cost_per_jail_day: f64,
    pub fees_canceled_total: f64,
    pub licenses_restored: f64,
    pub avg_monthly_wage: f64,
    pub employment_probability: f64,
    /// Expressed in months; the model divides by 12.
    pub months_effective: f64,
    pub expected_lawsuits: f64,
    pub avg_payout: f64,
    pub multiplier: f64,
    pub transition_costs_one_time: f64,
}

impl InputSet {
    /// Field names in declaration order. This is also the column order used
    /// when an input file is generated.
    pub const FIELD_NAMES: [&'static str; 13] = [
        "cases_avoided",
        "avg_cost_per_case",
        "jail_days_avoided",
        "cost_per_jail_day",
        "fees_canceled_total",
        "licenses_restored",
        "avg_monthly_wage",
        "employment_probability",
        "months_effective",
        "expected_lawsuits",
        "avg_payout",
        "multiplier",
        "transition_costs_one_time",
    ];

    /// Whether `name` is one of the required field names.
    pub fn is_field(name: &str) -> bool {
        Self::FIELD_NAMES.iter().any(|field| *field == name)
    }

    /// Build an input set from raw `(name, text)` pairs, e.g. one header row
    /// zipped with one data record.
    ///
    /// Names and values are trimmed. A value must parse as `f64` and be
    /// finite; the model's behavior on NaN or infinities is undefined, so
    /// they are rejected here.
    pub fn from_raw_fields<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let raw: HashMap<&str, &str> = pairs
            .into_iter()
            .map(|(name, value)| (name.trim(), value.trim()))
            .collect();

        let mut ordered = [0.0_f64; 13];
        for (slot, name) in ordered.iter_mut().zip(Self::FIELD_NAMES) {
            let text = raw
                .get(name)
                .ok_or_else(|| ImpactError::missing_field(name))?;
            *slot = parse_field(name, text)?;
        }
        Ok(Self::from_ordered(ordered))
    }

    /// `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> [(&'static str, f64); 13] {
        let values = [
            self.cases_avoided,
            self.avg_cost_per_case,
            self.jail_days_avoided,
            self.cost_per_jail_day,
            self.fees_canceled_total,
            self.licenses_restored,
            self.avg_monthly_wage,
            self.employment_probability,
            self.months_effective,
            self.expected_lawsuits,
            self.avg_payout,
            self.multiplier,
            self.transition_costs_one_time,
        ];
        let mut out = [("", 0.0); 13];
        for ((slot, name), value) in out.iter_mut().zip(Self::FIELD_NAMES).zip(values) {
            *slot = (name, value);
        }
        out
    }

    /// Names of fields holding a negative value. The model accepts them; the
    /// list exists so adapters can surface a warning.
    pub fn negative_fields(&self) -> Vec<&'static str> {
        self.fields()
            .into_iter()
            .filter(|(_, value)| *value < 0.0)
            .map(|(name, _)| name)
            .collect()
    }

    fn from_ordered(v: [f64; 13]) -> Self {
        Self {
            cases_avoided: v[0],
            avg_cost_per_case: v[1],
            jail_days_avoided: v[2],
            cost_per_jail_day: v[3],
            fees_canceled_total: v[4],
            licenses_restored: v[5],
            avg_monthly_wage: v[6],
            employment_probability: v[7],
            months_effective: v[8],
            expected_lawsuits: v[9],
            avg_payout: v[10],
            multiplier: v[11],
            transition_costs_one_time: v[12],
        }
    }
}

/// Parse one field value, rejecting text that is not a finite real number.
pub fn parse_field(name: &str, text: &str) -> Result<f64> {
    let text = text.trim();
    let value: f64 = text
        .parse()
        .map_err(|_| ImpactError::malformed(name, text))?;
    if !value.is_finite() {
        return Err(ImpactError::NonFiniteField {
            field: name.to_string(),
        });
    }
    Ok(value)
}

/// The six outputs of the impact model, derived from one [`InputSet`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ImpactResult {
    pub direct_savings: f64,
    pub productivity_gain: f64,
    pub restitution_avoided: f64,
    pub secondary_gdp_uplift: f64,
    /// Reported as a positive amount; it is subtracted in `total_impact`.
    pub transition_costs: f64,
    pub total_impact: f64,
}
