use crate::types::{ImpactResult, InputSet};

/// Months per year; `months_effective` is scaled against a full year.
const MONTHS_PER_YEAR: f64 = 12.0;

/// Apply the CIRI impact model.
///
/// Terms are evaluated in dependency order and later terms reuse earlier
/// ones. The secondary uplift is applied to direct savings plus productivity
/// only; restitution stays outside the multiplier base. Nothing is rounded.
pub fn compute(inputs: &InputSet) -> ImpactResult {
    let direct_savings = inputs.cases_avoided * inputs.avg_cost_per_case
        + inputs.jail_days_avoided * inputs.cost_per_jail_day
        + inputs.fees_canceled_total;

    let productivity_gain = inputs.licenses_restored
        * inputs.avg_monthly_wage
        * inputs.employment_probability
        * (inputs.months_effective / MONTHS_PER_YEAR);

    let restitution_avoided = inputs.expected_lawsuits * inputs.avg_payout;

    let secondary_gdp_uplift = inputs.multiplier * (direct_savings + productivity_gain);

    let transition_costs = inputs.transition_costs_one_time;

    let total_impact = direct_savings
        + productivity_gain
        + restitution_avoided
        + secondary_gdp_uplift
        - transition_costs;

    ImpactResult {
        direct_savings,
        productivity_gain,
        restitution_avoided,
        secondary_gdp_uplift,
        transition_costs,
        total_impact,
    }
}
