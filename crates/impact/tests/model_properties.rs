use ciri_impact::{compute, default_buckets, split, InputSet};
use proptest::prelude::*;

const EPS: f64 = 1e-9;

fn close(actual: f64, expected: f64) -> bool {
    (actual - expected).abs() <= EPS * expected.abs().max(1.0)
}

prop_compose! {
    /// Mixed-sign inputs; the rate-like fields are kept small so products stay
    /// in a range where relative tolerances mean something.
    fn inputs()(v in prop::array::uniform13(-1.0e6f64..1.0e6)) -> InputSet {
        InputSet {
            cases_avoided: v[0],
            avg_cost_per_case: v[1],
            jail_days_avoided: v[2],
            cost_per_jail_day: v[3],
            fees_canceled_total: v[4],
            licenses_restored: v[5],
            avg_monthly_wage: v[6],
            employment_probability: v[7] / 1.0e6,
            months_effective: v[8] / 1.0e5,
            expected_lawsuits: v[9],
            avg_payout: v[10],
            multiplier: v[11] / 1.0e6,
            transition_costs_one_time: v[12],
        }
    }
}

proptest! {
    #[test]
    fn every_term_matches_its_formula(i in inputs()) {
        let r = compute(&i);

        let direct = i.cases_avoided * i.avg_cost_per_case
            + i.jail_days_avoided * i.cost_per_jail_day
            + i.fees_canceled_total;
        prop_assert!(close(r.direct_savings, direct));

        let productivity = i.licenses_restored
            * i.avg_monthly_wage
            * i.employment_probability
            * (i.months_effective / 12.0);
        prop_assert!(close(r.productivity_gain, productivity));

        let restitution = i.expected_lawsuits * i.avg_payout;
        prop_assert!(close(r.restitution_avoided, restitution));

        let uplift = i.multiplier * (r.direct_savings + r.productivity_gain);
        prop_assert!(close(r.secondary_gdp_uplift, uplift));

        prop_assert_eq!(r.transition_costs, i.transition_costs_one_time);

        let total = r.direct_savings
            + r.productivity_gain
            + r.restitution_avoided
            + r.secondary_gdp_uplift
            - r.transition_costs;
        prop_assert!(close(r.total_impact, total));
    }

    #[test]
    fn restitution_never_feeds_the_multiplier(
        base in inputs(),
        lawsuits in -1.0e4f64..1.0e4,
        payout in -1.0e6f64..1.0e6,
    ) {
        let shifted = InputSet {
            expected_lawsuits: lawsuits,
            avg_payout: payout,
            ..base
        };
        prop_assert_eq!(
            compute(&base).secondary_gdp_uplift.to_bits(),
            compute(&shifted).secondary_gdp_uplift.to_bits()
        );
    }

    #[test]
    fn compute_is_idempotent(sample in inputs()) {
        let first = compute(&sample);
        let second = compute(&sample);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first.total_impact.to_bits(), second.total_impact.to_bits());
    }

    #[test]
    fn allocation_of_computed_total_sums_back(sample in inputs()) {
        let buckets = default_buckets();
        let total = compute(&sample).total_impact;
        let rows = split(total, &buckets);
        prop_assert_eq!(rows.len(), buckets.len());

        let rounded: f64 = rows
            .iter()
            .map(|row| row.amount_cents().parse::<f64>().unwrap())
            .sum();
        let tolerance = 0.01 * rows.len() as f64 + total.abs() * EPS;
        prop_assert!(
            (rounded - total).abs() <= tolerance,
            "total={} rounded_sum={}",
            total,
            rounded
        );

        for (row, bucket) in rows.iter().zip(&buckets) {
            prop_assert_eq!(&row.program_name, &bucket.label);
            prop_assert_eq!(row.percent, bucket.fraction);
        }
    }
}
