//! Plain-text rendering of calculation results.

use std::fmt::Write;

use tally_core::amortization::ScheduleRow;
use tally_core::calculations::{CalculationOutput, Roots};
use tally_core::formulas::{Formula, ALL_FORMULAS};

/// Render any calculation output as aligned `label: value` lines.
pub fn render_output(output: &CalculationOutput, decimals: usize) -> String {
    let num = |v: f64| format!("{:.*}", decimals, v);
    let mut lines: Vec<(String, String)> = Vec::new();
    let mut push = |label: &str, value: String| lines.push((label.to_string(), value));
    let mut trailer = String::new();

    match output {
        CalculationOutput::Formula(r) => {
            push(r.solved_for.name(), format!("{} {}", num(r.value), r.unit));
            push("via", r.expression.clone());
        }
        CalculationOutput::Subnet(s) => {
            push("CIDR", s.cidr.clone());
            push("Subnet mask", s.subnet_mask.clone());
            push("Wildcard mask", s.wildcard_mask.clone());
            push("Network", s.network_address.clone());
            push("Broadcast", s.broadcast_address.clone());
            let range = match (&s.host_range_start, &s.host_range_end) {
                (Some(start), Some(end)) => format!("{} - {}", start, end),
                _ => "none".to_string(),
            };
            push("Host range", range);
            push("Total hosts", s.total_hosts.to_string());
            push("Usable hosts", s.usable_hosts.to_string());
            push("Class", format!("{:?}", s.address_class));
            push("Private", if s.is_private { "yes" } else { "no" }.to_string());
        }
        CalculationOutput::Payoff(p) => {
            push("Months to pay off", p.payoff.months_to_pay_off.to_string());
            push("Exact months", num(p.payoff.exact_months));
            push("Total interest", num(p.payoff.total_interest));
            push("Total payment", num(p.payoff.total_payment));
            push("Final payment", num(p.payoff.final_payment));
            if let Some(rows) = &p.schedule {
                trailer = render_schedule(rows, decimals);
            }
        }
        CalculationOutput::Payment(p) => {
            push("Monthly payment", num(p.monthly_payment));
            push("Total payment", num(p.total_payment));
            push("Total interest", num(p.total_interest));
        }
        CalculationOutput::Tip(t) => {
            push("Tip", num(t.tip_amount));
            push("Total", num(t.total));
            push("Per person", num(t.per_person));
            push("Tip per person", num(t.tip_per_person));
        }
        CalculationOutput::Gst(g) => {
            push("Net", num(g.net_amount));
            push("GST", num(g.gst_amount));
            push("Gross", num(g.gross_amount));
        }
        CalculationOutput::BreakEven(b) => {
            push("Contribution margin", num(b.contribution_margin));
            push("Margin ratio", num(b.contribution_margin_ratio));
            push("Break-even units", b.break_even_units.to_string());
            push("Break-even revenue", num(b.break_even_revenue));
        }
        CalculationOutput::Calories(c) => {
            push("kcal per minute", num(c.kcal_per_minute));
            push("Total kcal", num(c.total_kcal));
        }
        CalculationOutput::Combinatorics(c) => {
            push("Permutations", format!("{}", c.permutations));
            push("Combinations", format!("{}", c.combinations));
        }
        CalculationOutput::Quadratic(q) => {
            push("Discriminant", num(q.discriminant));
            match q.roots {
                Roots::TwoReal { x1, x2 } => {
                    push("x1", num(x1));
                    push("x2", num(x2));
                }
                Roots::Repeated { x } => push("x (repeated)", num(x)),
                Roots::Complex { real, imaginary } => {
                    push("x1", format!("{} + {}i", num(real), num(imaginary)));
                    push("x2", format!("{} - {}i", num(real), num(imaginary)));
                }
            }
            push("Vertex", format!("({}, {})", num(q.vertex_x), num(q.vertex_y)));
        }
        CalculationOutput::Matrix(m) => {
            push("Size", format!("{0}x{0}", m.size));
            push("Determinant", num(m.determinant));
        }
        CalculationOutput::Fertilizer(f) => {
            for q in &f.quantities {
                push(&q.name, num(q.quantity));
            }
            push("Total product", num(f.total_product));
            push(
                "Delivered N-P-K",
                format!(
                    "{} / {} / {}",
                    num(f.delivered.nitrogen),
                    num(f.delivered.phosphate),
                    num(f.delivered.potash)
                ),
            );
            push(
                "Surplus N-P-K",
                format!(
                    "{} / {} / {}",
                    num(f.surplus.nitrogen),
                    num(f.surplus.phosphate),
                    num(f.surplus.potash)
                ),
            );
        }
    }

    let width = lines.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    let mut out = String::new();
    for (label, value) in &lines {
        let _ = writeln!(out, "{:<width$}  {}", format!("{}:", label), value, width = width + 1);
    }
    out.push_str(&trailer);
    out
}

fn render_schedule(rows: &[ScheduleRow], decimals: usize) -> String {
    let mut out = String::from("\nMonth  Payment  Interest  Principal  Balance\n");
    for row in rows {
        let _ = writeln!(
            out,
            "{:>5}  {:.*}  {:.*}  {:.*}  {:.*}",
            row.month,
            decimals,
            row.payment,
            decimals,
            row.interest,
            decimals,
            row.principal,
            decimals,
            row.remaining_balance,
        );
    }
    out
}

/// One block per formula: name, relation, then each variable with its unit.
pub fn render_catalog() -> String {
    let mut out = String::new();
    for formula in ALL_FORMULAS {
        render_formula(&mut out, *formula);
    }
    out
}

fn render_formula(out: &mut String, formula: Formula) {
    let meta = formula.metadata();
    let _ = writeln!(out, "{} ({})", meta.name, formula.key());
    let _ = writeln!(out, "  {}", meta.relation);
    for variable in meta.variables {
        let bound = if variable.non_negative() { ", >= 0" } else { "" };
        let _ = writeln!(out, "  --{:<13} {}{}", variable.name(), variable.unit(), bound);
    }
    out.push('\n');
}
