use rust_decimal::Decimal;
use serde::Serialize;
use time::OffsetDateTime;

use super::engine::{LedgerSummary, PaymentEntry};
use crate::fx::currency::Currency;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartSeries {
    Paid,
    Remaining,
    TotalAmount,
}

impl ChartSeries {
    pub fn color(&self) -> &'static str {
        match self {
            ChartSeries::Paid => "#10b981",
            ChartSeries::Remaining => "#ef4444",
            ChartSeries::TotalAmount => "#3b82f6",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ChartSeries::Paid => "Paid",
            ChartSeries::Remaining => "Remaining",
            ChartSeries::TotalAmount => "Total Amount",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressSlice {
    pub series: ChartSeries,
    pub label: &'static str,
    pub color: &'static str,
    pub value: Decimal,
    /// Share of the plan total, one decimal place.
    pub percentage: Decimal,
}

fn slice(series: ChartSeries, value: Decimal, total: Decimal) -> ProgressSlice {
    let percentage = if total.is_zero() {
        Decimal::ZERO
    } else {
        (value / total * Decimal::ONE_HUNDRED).round_dp(1)
    };
    ProgressSlice {
        series,
        label: series.label(),
        color: series.color(),
        value,
        percentage,
    }
}

pub fn progress_slices(summary: &LedgerSummary) -> [ProgressSlice; 2] {
    [
        slice(ChartSeries::Paid, summary.total_paid, summary.total_amount),
        slice(ChartSeries::Remaining, summary.remaining, summary.total_amount),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryBar {
    pub payment_number: usize,
    pub amount: Decimal,
    pub currency: Currency,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

/// One bar per payment in date order, numbered from 1.
pub fn payment_history(payments: &[(PaymentEntry, Currency)]) -> Vec<HistoryBar> {
    let mut ordered: Vec<_> = payments.iter().collect();
    ordered.sort_by_key(|(p, _)| p.payment_date);
    ordered
        .into_iter()
        .enumerate()
        .map(|(i, (p, currency))| HistoryBar {
            payment_number: i + 1,
            amount: p.normalized_amount,
            currency: *currency,
            date: p.payment_date,
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    StrongStart,
    Quarter,
    Halfway,
    ThreeQuarters,
    FinalSprint,
}

impl Milestone {
    pub fn for_progress(percent: Decimal) -> Option<Self> {
        const TIERS: [(i64, Milestone); 5] = [
            (90, Milestone::FinalSprint),
            (75, Milestone::ThreeQuarters),
            (50, Milestone::Halfway),
            (25, Milestone::Quarter),
            (10, Milestone::StrongStart),
        ];
        TIERS
            .iter()
            .find(|(threshold, _)| percent >= Decimal::from(*threshold))
            .map(|(_, m)| *m)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Milestone::StrongStart => "Strong start, you're on track",
            Milestone::Quarter => "A quarter of the way there",
            Milestone::Halfway => "Halfway done, keep going",
            Milestone::ThreeQuarters => "Three quarters complete",
            Milestone::FinalSprint => "Almost there, final sprint",
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use super::*;
    use crate::ledger::engine::summarize;

    #[test]
    fn series_colors_are_fixed() {
        assert_eq!(ChartSeries::Paid.color(), "#10b981");
        assert_eq!(ChartSeries::Remaining.color(), "#ef4444");
        assert_eq!(ChartSeries::TotalAmount.color(), "#3b82f6");
    }

    #[test]
    fn slices_split_total_to_one_decimal() {
        let [paid, remaining] = progress_slices(&summarize(dec!(300000), dec!(12500), 2));
        assert_eq!(paid.percentage, dec!(4.2));
        assert_eq!(remaining.value, dec!(287500));
        assert_eq!(remaining.percentage, dec!(95.8));
        assert_eq!(paid.color, "#10b981");
    }

    #[test]
    fn zero_total_slices_have_zero_percentage() {
        let [paid, remaining] = progress_slices(&summarize(Decimal::ZERO, Decimal::ZERO, 0));
        assert_eq!(paid.percentage, Decimal::ZERO);
        assert_eq!(remaining.percentage, Decimal::ZERO);
    }

    #[test]
    fn history_is_numbered_in_date_order() {
        let late = PaymentEntry {
            normalized_amount: dec!(1330.00),
            payment_date: datetime!(2024-02-01 0:00 UTC),
        };
        let early = PaymentEntry {
            normalized_amount: dec!(500),
            payment_date: datetime!(2024-01-01 0:00 UTC),
        };
        let bars = payment_history(&[(late, Currency::Gbp), (early, Currency::Usd)]);
        assert_eq!(bars[0].payment_number, 1);
        assert_eq!(bars[0].amount, dec!(500));
        assert_eq!(bars[1].currency, Currency::Gbp);
    }

    #[test]
    fn milestones_follow_thresholds() {
        assert_eq!(Milestone::for_progress(dec!(9.99)), None);
        assert_eq!(Milestone::for_progress(dec!(10)), Some(Milestone::StrongStart));
        assert_eq!(Milestone::for_progress(dec!(49.9)), Some(Milestone::Quarter));
        assert_eq!(Milestone::for_progress(dec!(50)), Some(Milestone::Halfway));
        assert_eq!(Milestone::for_progress(dec!(80)), Some(Milestone::ThreeQuarters));
        assert_eq!(Milestone::for_progress(dec!(120)), Some(Milestone::FinalSprint));
    }
}
