use ciri_impact::{AllocationRow, ImpactResult};

const LABEL_WIDTH: usize = 23;
const RULE: &str = "-----------------------------------------------";

/// Format a dollar amount with thousands separators and two decimals, e.g.
/// `1234567.891` → `$1,234,567.89`. Negative amounts render as `-$12.50`.
pub fn money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (idx, ch) in whole.chars().enumerate() {
        if idx > 0 && (whole.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && fixed != "0.00" {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

fn line(label: &str, value: &str) -> String {
    format!("{label:<LABEL_WIDTH$} {value}\n")
}

/// Human-readable impact report. Transition costs are shown with a leading
/// minus because they are subtracted from the total.
pub fn render_impact_report(result: &ImpactResult) -> String {
    let mut out = String::new();
    out.push_str("=== CIRI ECONOMIC IMPACT REPORT ===\n\n");
    out.push_str(&line("Direct Savings:", &money(result.direct_savings)));
    out.push_str(&line(
        "Productivity Gain:",
        &money(result.productivity_gain),
    ));
    out.push_str(&line(
        "Restitution Avoided:",
        &money(result.restitution_avoided),
    ));
    out.push_str(&line(
        "Secondary GDP Uplift:",
        &money(result.secondary_gdp_uplift),
    ));
    out.push_str(&line(
        "Transition Costs:",
        &format!("-{}", money(result.transition_costs)),
    ));
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "TOTAL IMPACT (Recovery Pool): {}\n",
        money(result.total_impact)
    ));
    out.push_str("\nFeed this number into the CIBS model for reinvestment.\n");
    out
}

/// Markdown table of an allocation, rows in table order.
pub fn render_allocation(total: f64, rows: &[AllocationRow]) -> String {
    let mut md = String::new();
    md.push_str(&format!("## CIBS allocation of {}\n\n", money(total)));
    md.push_str("| program | percent | allocated_usd |\n");
    md.push_str("|---|---:|---:|\n");
    for row in rows {
        md.push_str(&format!(
            "| {} | {} | {} |\n",
            escape_cell(&row.program_name),
            row.percent,
            row.amount_cents()
        ));
    }
    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ciri_impact::{default_buckets, split};
    use pretty_assertions::assert_eq;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(999.999), "$1,000.00");
        assert_eq!(money(1_234_567.891), "$1,234,567.89");
        assert_eq!(money(100_000.0), "$100,000.00");
        assert_eq!(money(-8_000.5), "-$8,000.50");
        assert_eq!(money(-0.001), "$0.00");
    }

    #[test]
    fn report_matches_reference_layout() {
        let result = ImpactResult {
            direct_savings: 67_000.0,
            productivity_gain: 6_000.0,
            restitution_avoided: 20_000.0,
            secondary_gdp_uplift: 109_500.0,
            transition_costs: 8_000.0,
            total_impact: 194_500.0,
        };
        let expected = "\
=== CIRI ECONOMIC IMPACT REPORT ===

Direct Savings:         $67,000.00
Productivity Gain:      $6,000.00
Restitution Avoided:    $20,000.00
Secondary GDP Uplift:   $109,500.00
Transition Costs:       -$8,000.00
-----------------------------------------------
TOTAL IMPACT (Recovery Pool): $194,500.00

Feed this number into the CIBS model for reinvestment.
";
        assert_eq!(render_impact_report(&result), expected);
    }

    #[test]
    fn allocation_table_keeps_row_order() {
        let rows = split(194_500.0, &default_buckets());
        let md = render_allocation(194_500.0, &rows);
        let body: Vec<&str> = md.lines().skip(4).collect();
        assert_eq!(
            body[0],
            "| Housing Stabilization / Emergency Housing | 0.25 | 48625.00 |"
        );
        assert_eq!(
            body[5],
            "| Civic Compliance & Admin (Audit / Reporting) | 0.15 | 29175.00 |"
        );
    }
}
