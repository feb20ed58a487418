use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::engine::{build_ledger, PaymentEntry};
use super::filter::PlanListing;
use crate::fx::currency::Currency;

const LABEL_MAX_CHARS: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComparisonRow {
    pub plan_id: Uuid,
    pub name: String,
    /// Name shortened for chart axes.
    pub chart_label: String,
    pub currency: Currency,
    pub total_amount: Decimal,
    pub total_paid: Decimal,
    pub remaining: Decimal,
    pub progress_percent: Decimal,
    pub payment_count: usize,
    pub average_payment: Decimal,
}

pub fn chart_label(name: &str) -> String {
    if name.chars().count() > LABEL_MAX_CHARS {
        let head: String = name.chars().take(LABEL_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// Side-by-side summaries for `selected`, in selection order.
///
/// Ids missing from `plans` are skipped and repeats collapse to the first one.
pub fn compare_plans<T: PlanListing>(
    plans: &[T],
    payments: &[(Uuid, PaymentEntry)],
    selected: &[Uuid],
) -> Vec<ComparisonRow> {
    let by_id: HashMap<Uuid, &T> = plans.iter().map(|p| (p.id(), p)).collect();
    let mut grouped: HashMap<Uuid, Vec<PaymentEntry>> = HashMap::new();
    for (plan_id, entry) in payments {
        grouped.entry(*plan_id).or_default().push(*entry);
    }

    let mut seen = HashSet::new();
    selected
        .iter()
        .filter(|id| seen.insert(**id))
        .filter_map(|id| by_id.get(id))
        .map(|plan| {
            let entries = grouped.get(&plan.id()).map(Vec::as_slice).unwrap_or(&[]);
            let s = build_ledger(plan.total_amount(), entries).summary;
            ComparisonRow {
                plan_id: plan.id(),
                name: plan.name().to_string(),
                chart_label: chart_label(plan.name()),
                currency: plan.currency(),
                total_amount: s.total_amount,
                total_paid: s.total_paid,
                remaining: s.remaining,
                progress_percent: s.progress_percent,
                payment_count: s.payment_count,
                average_payment: s.average_payment,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::datetime;
    use time::OffsetDateTime;

    use super::*;

    struct Plan {
        id: Uuid,
        name: String,
        total: Decimal,
    }

    impl PlanListing for Plan {
        fn id(&self) -> Uuid {
            self.id
        }
        fn name(&self) -> &str {
            &self.name
        }
        fn description(&self) -> Option<&str> {
            None
        }
        fn currency(&self) -> Currency {
            Currency::Usd
        }
        fn total_amount(&self) -> Decimal {
            self.total
        }
        fn created_at(&self) -> OffsetDateTime {
            datetime!(2024-01-01 0:00 UTC)
        }
    }

    fn plan(name: &str, total: Decimal) -> Plan {
        Plan {
            id: Uuid::new_v4(),
            name: name.into(),
            total,
        }
    }

    fn pay(amount: Decimal) -> PaymentEntry {
        PaymentEntry {
            normalized_amount: amount,
            payment_date: datetime!(2024-02-01 0:00 UTC),
        }
    }

    #[test]
    fn rows_follow_selection_order_and_skip_unknown_ids() {
        let house = plan("House", dec!(300000));
        let car = plan("Car", dec!(20000));
        let payments = vec![
            (house.id, pay(dec!(5000))),
            (car.id, pay(dec!(1000))),
            (house.id, pay(dec!(7500))),
        ];
        let plans = vec![house, car];
        let selected = [plans[1].id, Uuid::new_v4(), plans[0].id, plans[1].id];

        let rows = compare_plans(&plans, &payments, &selected);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Car");
        assert_eq!(rows[0].total_paid, dec!(1000));
        assert_eq!(rows[0].progress_percent, dec!(5));
        assert_eq!(rows[1].total_paid, dec!(12500));
        assert_eq!(rows[1].payment_count, 2);
        assert_eq!(rows[1].average_payment, dec!(6250));
    }

    #[test]
    fn plan_without_payments_has_zeroed_stats() {
        let p = plan("Fresh", dec!(100));
        let rows = compare_plans(&[p], &[], &[]);
        assert!(rows.is_empty());

        let p = plan("Fresh", dec!(100));
        let id = p.id;
        let rows = compare_plans(&[p], &[], &[id]);
        assert_eq!(rows[0].remaining, dec!(100));
        assert_eq!(rows[0].average_payment, Decimal::ZERO);
    }

    #[test]
    fn long_names_are_shortened_for_charts() {
        assert_eq!(chart_label("Mortgage"), "Mortgage");
        assert_eq!(chart_label("Special High Priority Loan"), "Special High Pr...");
        assert_eq!(chart_label("ÄÖÜäöüÄÖÜäöüÄÖÜx"), "ÄÖÜäöüÄÖÜäöüÄÖÜ...");
    }
}
