use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tracing::warn;

use super::client::RateProvider;
use super::currency::Currency;
use crate::error::ApiError;

/// Rate applied when the provider cannot be reached.
pub const FALLBACK_RATE: Decimal = Decimal::ONE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateQuote {
    pub rate: Decimal,
    pub fallback: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Normalized {
    pub normalized_amount: Decimal,
    pub exchange_rate: Option<Decimal>,
}

/// Exclusive upper bound of a `NUMERIC(15,2)` money column (10^13).
pub const MONEY_LIMIT: Decimal = Decimal::from_parts(0x4E72_A000, 0x918, 0, false, 0);
/// Exclusive upper bound of the `NUMERIC(10,6)` exchange-rate column.
pub const RATE_LIMIT: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Six places, the precision of the stored exchange rate.
pub fn round_rate(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
}

/// Non-negative amount rounded to cents that fits a money column.
pub fn check_money(field: &str, value: Decimal) -> Result<Decimal, ApiError> {
    if value < Decimal::ZERO {
        return Err(ApiError::InvalidInput(format!("{field} must not be negative")));
    }
    let value = round_money(value);
    if value >= MONEY_LIMIT {
        return Err(ApiError::InvalidInput(format!("{field} is too large")));
    }
    Ok(value)
}

fn storable_rate(rate: Decimal) -> Option<Decimal> {
    let rate = round_rate(rate);
    (rate > Decimal::ZERO && rate < RATE_LIMIT).then_some(rate)
}

/// Converts `amount` into the accounting currency. The rate is only recorded
/// when a conversion actually happened.
pub fn normalize(amount: Decimal, currency: Currency, rate: Decimal) -> Normalized {
    if currency.is_accounting() {
        return Normalized {
            normalized_amount: amount,
            exchange_rate: None,
        };
    }
    Normalized {
        normalized_amount: round_money(amount * rate),
        exchange_rate: Some(rate),
    }
}

/// Current rate for `currency`, falling back to [`FALLBACK_RATE`] when the
/// provider fails.
pub async fn current_rate(provider: &dyn RateProvider, currency: Currency) -> RateQuote {
    if currency.is_accounting() {
        return RateQuote {
            rate: Decimal::ONE,
            fallback: false,
        };
    }
    let fetched = provider.rate_to_usd(currency).await.and_then(|rate| {
        storable_rate(rate).ok_or_else(|| anyhow::anyhow!("rate {rate} out of range"))
    });
    match fetched {
        Ok(rate) => RateQuote {
            rate,
            fallback: false,
        },
        Err(e) => {
            warn!(error = %e, %currency, "fx rate unavailable; using fallback rate");
            RateQuote {
                rate: FALLBACK_RATE,
                fallback: true,
            }
        }
    }
}

/// Explicit client-supplied rate wins over the provider. It is rounded to
/// six places and must stay below [`RATE_LIMIT`].
pub async fn resolve_rate(
    provider: &dyn RateProvider,
    currency: Currency,
    explicit: Option<Decimal>,
) -> Result<RateQuote, ApiError> {
    match explicit {
        Some(rate) => storable_rate(rate)
            .map(|rate| RateQuote {
                rate,
                fallback: false,
            })
            .ok_or_else(|| {
                ApiError::InvalidInput(
                    "exchange_rate must be positive and below 10000".into(),
                )
            }),
        None => Ok(current_rate(provider, currency).await),
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::fx::client::fakes::{FixedRate, Unavailable};

    #[test]
    fn gbp_payment_is_converted_and_rounded() {
        let n = normalize(dec!(1000), Currency::Gbp, dec!(1.33));
        assert_eq!(n.normalized_amount, dec!(1330.00));
        assert_eq!(n.exchange_rate, Some(dec!(1.33)));
    }

    #[test]
    fn usd_payment_passes_through_without_rate() {
        let n = normalize(dec!(250.50), Currency::Usd, dec!(1.33));
        assert_eq!(n.normalized_amount, dec!(250.50));
        assert_eq!(n.exchange_rate, None);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(round_money(dec!(10.005)), dec!(10.01));
        assert_eq!(round_money(dec!(10.004)), dec!(10.00));
        let n = normalize(dec!(33.33), Currency::Gbp, dec!(1.271515));
        assert_eq!(n.normalized_amount, dec!(42.38));
    }

    #[tokio::test]
    async fn provider_failure_falls_back_to_one() {
        let quote = current_rate(&Unavailable, Currency::Gbp).await;
        assert_eq!(quote.rate, Decimal::ONE);
        assert!(quote.fallback);
    }

    #[tokio::test]
    async fn explicit_rate_skips_provider() {
        let provider = FixedRate::new(dec!(1.20));
        let quote = resolve_rate(&provider, Currency::Gbp, Some(dec!(1.33)))
            .await
            .unwrap();
        assert_eq!(quote.rate, dec!(1.33));
        assert_eq!(provider.calls(), 0);
    }

    #[tokio::test]
    async fn non_positive_explicit_rate_is_rejected() {
        let err = resolve_rate(&Unavailable, Currency::Gbp, Some(Decimal::ZERO))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn explicit_rate_is_rounded_to_stored_precision() {
        let quote = resolve_rate(&Unavailable, Currency::Gbp, Some(dec!(1.3333335)))
            .await
            .unwrap();
        assert_eq!(quote.rate, dec!(1.333334));

        let tiny = resolve_rate(&Unavailable, Currency::Gbp, Some(dec!(0.0000004))).await;
        assert!(matches!(tiny, Err(ApiError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn explicit_rate_above_column_range_is_rejected() {
        let err = resolve_rate(&Unavailable, Currency::Gbp, Some(dec!(10000)))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidInput(_)));
        assert!(resolve_rate(&Unavailable, Currency::Gbp, Some(dec!(9999.999999)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn out_of_range_provider_rate_falls_back() {
        let quote = current_rate(&FixedRate::new(dec!(25000)), Currency::Gbp).await;
        assert!(quote.fallback);
        assert_eq!(quote.rate, FALLBACK_RATE);
    }

    #[test]
    fn money_must_fit_the_column() {
        assert_eq!(check_money("amount", dec!(10.005)).unwrap(), dec!(10.01));
        assert!(check_money("amount", dec!(9999999999999.99)).is_ok());
        assert!(matches!(
            check_money("amount", dec!(10000000000000)),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            check_money("amount", dec!(9999999999999.995)),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(check_money("amount", dec!(-0.01)).is_err());
    }

    #[tokio::test]
    async fn usd_never_consults_provider() {
        let provider = FixedRate::new(dec!(1.20));
        let quote = current_rate(&provider, Currency::Usd).await;
        assert_eq!(quote.rate, Decimal::ONE);
        assert_eq!(provider.calls(), 0);
    }
}
