use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::Deserialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::fx::currency::{Currency, UnknownCurrency};

/// Fields of a plan that listing views filter and sort on.
pub trait PlanListing {
    fn id(&self) -> Uuid;
    fn name(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn currency(&self) -> Currency;
    fn total_amount(&self) -> Decimal;
    fn created_at(&self) -> OffsetDateTime;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum CurrencyFilter {
    #[default]
    All,
    Only(Currency),
}

impl TryFrom<String> for CurrencyFilter {
    type Error = UnknownCurrency;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let v = value.trim();
        if v.is_empty() || v.eq_ignore_ascii_case("all") {
            Ok(CurrencyFilter::All)
        } else {
            v.parse().map(CurrencyFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    AmountAsc,
    AmountDesc,
    CreatedAsc,
    #[default]
    CreatedDesc,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanQuery {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub currency: CurrencyFilter,
    #[serde(default)]
    pub sort: SortKey,
}

fn matches_search<T: PlanListing>(plan: &T, needle: &str) -> bool {
    plan.name().to_lowercase().contains(needle)
        || plan
            .description()
            .is_some_and(|d| d.to_lowercase().contains(needle))
}

fn compare<T: PlanListing>(a: &T, b: &T, key: SortKey) -> Ordering {
    match key {
        SortKey::AmountAsc => a.total_amount().cmp(&b.total_amount()),
        SortKey::AmountDesc => b.total_amount().cmp(&a.total_amount()),
        SortKey::CreatedAsc => a.created_at().cmp(&b.created_at()),
        SortKey::CreatedDesc => b.created_at().cmp(&a.created_at()),
    }
}

/// Filters then stably sorts a copy of `plans`; the input is left untouched.
pub fn filter_and_sort<T: PlanListing + Clone>(plans: &[T], query: &PlanQuery) -> Vec<T> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut out: Vec<T> = plans
        .iter()
        .filter(|p| match query.currency {
            CurrencyFilter::All => true,
            CurrencyFilter::Only(c) => p.currency() == c,
        })
        .filter(|p| needle.as_deref().map_or(true, |n| matches_search(*p, n)))
        .cloned()
        .collect();
    out.sort_by(|a, b| compare(a, b, query.sort));
    out
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        id: Uuid,
        name: &'static str,
        description: Option<&'static str>,
        currency: Currency,
        total: Decimal,
        created_at: OffsetDateTime,
    }

    impl PlanListing for Row {
        fn id(&self) -> Uuid {
            self.id
        }
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> Option<&str> {
            self.description
        }
        fn currency(&self) -> Currency {
            self.currency
        }
        fn total_amount(&self) -> Decimal {
            self.total
        }
        fn created_at(&self) -> OffsetDateTime {
            self.created_at
        }
    }

    fn row(name: &'static str, currency: Currency, total: Decimal, day: u8) -> Row {
        Row {
            id: Uuid::new_v4(),
            name,
            description: None,
            currency,
            total,
            created_at: datetime!(2024-01-01 0:00 UTC) + time::Duration::days(day.into()),
        }
    }

    fn names(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|r| r.name).collect()
    }

    fn query(search: Option<&str>, currency: CurrencyFilter, sort: SortKey) -> PlanQuery {
        PlanQuery {
            search: search.map(String::from),
            currency,
            sort,
        }
    }

    #[test]
    fn search_matches_name_case_insensitively() {
        let plans = vec![
            row("Special High Priority Loan", Currency::Usd, dec!(300000), 0),
            row("Regular Loan", Currency::Usd, dec!(200000), 1),
        ];
        let out = filter_and_sort(&plans, &query(Some("special"), CurrencyFilter::All, SortKey::CreatedAsc));
        assert_eq!(names(&out), vec!["Special High Priority Loan"]);
    }

    #[test]
    fn search_matches_description_and_skips_missing_ones() {
        let mut business = row("Business Loan", Currency::Usd, dec!(350000), 0);
        business.description = Some("This is a unique business EXPANSION loan");
        let plans = vec![business, row("Car", Currency::Usd, dec!(10), 1)];
        let out = filter_and_sort(&plans, &query(Some("expansion"), CurrencyFilter::All, SortKey::CreatedAsc));
        assert_eq!(names(&out), vec!["Business Loan"]);
    }

    #[test]
    fn blank_search_is_no_filter() {
        let plans = vec![
            row("A", Currency::Usd, dec!(1), 0),
            row("B", Currency::Gbp, dec!(2), 1),
        ];
        let out = filter_and_sort(&plans, &query(Some("   "), CurrencyFilter::All, SortKey::CreatedAsc));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn currency_and_search_are_conjunctive() {
        let plans = vec![
            row("Premium USD Loan", Currency::Usd, dec!(450000), 0),
            row("Premium GBP Loan", Currency::Gbp, dec!(350000), 1),
            row("Basic USD Loan", Currency::Usd, dec!(1000), 2),
        ];
        let q = query(Some("premium"), CurrencyFilter::Only(Currency::Usd), SortKey::CreatedAsc);
        assert_eq!(names(&filter_and_sort(&plans, &q)), vec!["Premium USD Loan"]);
    }

    #[test]
    fn each_sort_key_orders_as_named() {
        let plans = vec![
            row("low", Currency::Usd, dec!(100000), 2),
            row("high", Currency::Usd, dec!(500000), 0),
            row("mid", Currency::Usd, dec!(250000), 1),
        ];
        let by = |k| names(&filter_and_sort(&plans, &query(None, CurrencyFilter::All, k)));
        assert_eq!(by(SortKey::AmountAsc), vec!["low", "mid", "high"]);
        assert_eq!(by(SortKey::AmountDesc), vec!["high", "mid", "low"]);
        assert_eq!(by(SortKey::CreatedAsc), vec!["high", "mid", "low"]);
        assert_eq!(by(SortKey::CreatedDesc), vec!["low", "mid", "high"]);
    }

    #[test]
    fn equal_amounts_keep_input_order() {
        let plans = vec![
            row("first", Currency::Usd, dec!(100), 5),
            row("big", Currency::Usd, dec!(900), 0),
            row("second", Currency::Usd, dec!(100.00), 1),
        ];
        let asc = filter_and_sort(&plans, &query(None, CurrencyFilter::All, SortKey::AmountAsc));
        assert_eq!(names(&asc), vec!["first", "second", "big"]);
        let desc = filter_and_sort(&plans, &query(None, CurrencyFilter::All, SortKey::AmountDesc));
        assert_eq!(names(&desc), vec!["big", "first", "second"]);
    }

    #[test]
    fn applying_twice_equals_applying_once() {
        let plans = vec![
            row("Premium A", Currency::Gbp, dec!(3), 1),
            row("premium b", Currency::Gbp, dec!(3), 0),
            row("Other", Currency::Gbp, dec!(1), 2),
            row("Premium C", Currency::Usd, dec!(2), 3),
        ];
        let q = query(Some("PREMIUM"), CurrencyFilter::Only(Currency::Gbp), SortKey::AmountDesc);
        let once = filter_and_sort(&plans, &q);
        let twice = filter_and_sort(&once, &q);
        assert_eq!(once, twice);
    }

    #[test]
    fn input_is_not_mutated() {
        let plans = vec![
            row("b", Currency::Usd, dec!(2), 0),
            row("a", Currency::Usd, dec!(1), 1),
        ];
        let snapshot = plans.clone();
        let _ = filter_and_sort(&plans, &query(None, CurrencyFilter::All, SortKey::AmountAsc));
        assert_eq!(plans, snapshot);
    }

    #[test]
    fn query_string_values_parse() {
        let q: PlanQuery =
            serde_json::from_str(r#"{"search":"car","currency":"gbp","sort":"amount_desc"}"#).unwrap();
        assert_eq!(q.currency, CurrencyFilter::Only(Currency::Gbp));
        assert_eq!(q.sort, SortKey::AmountDesc);

        let all: PlanQuery = serde_json::from_str(r#"{"currency":"all"}"#).unwrap();
        assert_eq!(all.currency, CurrencyFilter::All);
        assert_eq!(all.sort, SortKey::CreatedDesc);

        assert!(serde_json::from_str::<PlanQuery>(r#"{"currency":"EUR"}"#).is_err());
    }
}
