use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use time::OffsetDateTime;

use super::projection::add_months;
use super::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayoffScenario {
    pub name: &'static str,
    pub months: u32,
    pub confidence: Confidence,
    pub recommended: bool,
    /// Whole units of the accounting currency per month.
    pub monthly: Decimal,
    pub monthly_gbp: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub completion: OffsetDateTime,
}

const HORIZONS: [(&str, u32, Confidence, bool); 5] = [
    ("Debt-Free Sprint", 6, Confidence::Low, false),
    ("Accelerated Payoff", 12, Confidence::Medium, false),
    ("Balanced Growth", 18, Confidence::High, true),
    ("Steady & Sustainable", 24, Confidence::High, false),
    ("Conservative Safety", 36, Confidence::High, false),
];

fn round_whole(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

/// Monthly payment needed to clear `remaining` over each fixed horizon.
/// `gbp_rate` is USD per GBP; a non-positive rate is rejected.
pub fn payoff_scenarios(
    remaining: Decimal,
    gbp_rate: Decimal,
    now: OffsetDateTime,
) -> Result<Vec<PayoffScenario>, LedgerError> {
    if gbp_rate <= Decimal::ZERO {
        return Err(LedgerError::InvalidInput("exchange rate must be positive".into()));
    }
    HORIZONS
        .iter()
        .map(|&(name, months, confidence, recommended)| {
            let monthly = round_whole(remaining / Decimal::from(months));
            let completion = add_months(now, months)
                .ok_or_else(|| LedgerError::InvalidInput("completion date out of range".into()))?;
            Ok(PayoffScenario {
                name,
                months,
                confidence,
                recommended,
                monthly,
                monthly_gbp: round_whole(monthly / gbp_rate),
                completion,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use super::*;

    #[test]
    fn five_horizons_with_balanced_growth_recommended() {
        let now = datetime!(2024-01-31 8:00 UTC);
        let s = payoff_scenarios(dec!(287500), dec!(1.25), now).unwrap();

        assert_eq!(s.len(), 5);
        assert_eq!(s.iter().filter(|x| x.recommended).count(), 1);
        assert_eq!(s[2].name, "Balanced Growth");
        assert_eq!(s[0].monthly, dec!(47917));
        assert_eq!(s[0].monthly_gbp, dec!(38334));
        assert_eq!(s[1].completion, datetime!(2025-01-31 8:00 UTC));
        assert_eq!(s[0].completion, datetime!(2024-07-31 8:00 UTC));
    }

    #[test]
    fn nothing_remaining_means_zero_monthly() {
        let s = payoff_scenarios(Decimal::ZERO, Decimal::ONE, OffsetDateTime::now_utc()).unwrap();
        assert!(s.iter().all(|x| x.monthly.is_zero()));
    }

    #[test]
    fn rejects_non_positive_rate() {
        assert!(payoff_scenarios(dec!(10), Decimal::ZERO, OffsetDateTime::now_utc()).is_err());
    }
}
