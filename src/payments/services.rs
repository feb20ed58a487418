use rust_decimal::Decimal;
use time::OffsetDateTime;

use super::dto::CreatePaymentRequest;
use super::repo_types::NewPayment;
use crate::error::{ApiError, ApiResult};
use crate::fx::client::RateProvider;
use crate::fx::services::{check_money, normalize, resolve_rate, RateQuote, MONEY_LIMIT};

pub fn check_amount(amount: Decimal) -> ApiResult<Decimal> {
    check_money("amount", amount)
}

/// Converts a validated request into the row to insert.
pub fn build_payment(req: CreatePaymentRequest, quote: RateQuote, now: OffsetDateTime) -> ApiResult<NewPayment> {
    let amount = check_amount(req.amount)?;
    let normalized = normalize(amount, req.currency, quote.rate);
    if normalized.normalized_amount >= MONEY_LIMIT {
        return Err(ApiError::InvalidInput("converted amount is too large".into()));
    }
    Ok(NewPayment {
        amount,
        currency: req.currency,
        normalized_amount: normalized.normalized_amount,
        exchange_rate: normalized.exchange_rate,
        notes: req
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty()),
        payment_date: req.payment_date.unwrap_or(now),
    })
}

/// Validates, resolves the rate and normalises in one step.
pub async fn prepare_payment(
    rates: &dyn RateProvider,
    req: CreatePaymentRequest,
    now: OffsetDateTime,
) -> ApiResult<(NewPayment, RateQuote)> {
    check_amount(req.amount)?;
    let quote = resolve_rate(rates, req.currency, req.exchange_rate).await?;
    let new = build_payment(req, quote, now)?;
    Ok((new, quote))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;
    use time::macros::datetime;

    use super::*;
    use crate::fx::client::fakes::{FixedRate, Unavailable};
    use crate::fx::services::round_money;
    use crate::fx::Currency;

    fn req(amount: Decimal, currency: Currency) -> CreatePaymentRequest {
        CreatePaymentRequest {
            amount,
            currency,
            exchange_rate: None,
            notes: Some("  ".into()),
            payment_date: None,
        }
    }

    #[tokio::test]
    async fn gbp_payment_uses_provider_rate() {
        let now = datetime!(2024-05-01 12:00 UTC);
        let rates = FixedRate::new(dec!(1.33));
        let (new, quote) = prepare_payment(&rates, req(dec!(1000), Currency::Gbp), now)
            .await
            .unwrap();
        assert_eq!(new.normalized_amount, dec!(1330.00));
        assert_eq!(new.exchange_rate, Some(dec!(1.33)));
        assert_eq!(new.payment_date, now);
        assert_eq!(new.notes, None);
        assert!(!quote.fallback);
    }

    #[tokio::test]
    async fn explicit_rate_wins_over_provider() {
        let rates = FixedRate::new(dec!(1.33));
        let mut r = req(dec!(100), Currency::Gbp);
        r.exchange_rate = Some(dec!(1.25));
        let (new, _) = prepare_payment(&rates, r, OffsetDateTime::now_utc()).await.unwrap();
        assert_eq!(new.normalized_amount, dec!(125.00));
        assert_eq!(rates.calls(), 0);
    }

    #[tokio::test]
    async fn provider_outage_falls_back_to_face_value() {
        let (new, quote) = prepare_payment(
            &Unavailable,
            req(dec!(80.5), Currency::Gbp),
            OffsetDateTime::now_utc(),
        )
        .await
        .unwrap();
        assert!(quote.fallback);
        assert_eq!(new.normalized_amount, dec!(80.50));
        assert_eq!(new.exchange_rate, Some(Decimal::ONE));
    }

    #[tokio::test]
    async fn negative_amount_is_rejected_before_rate_lookup() {
        let rates = FixedRate::new(dec!(1.33));
        let res = prepare_payment(&rates, req(dec!(-5), Currency::Gbp), OffsetDateTime::now_utc()).await;
        assert!(matches!(res, Err(ApiError::InvalidInput(_))));
        assert_eq!(rates.calls(), 0);
    }

    #[tokio::test]
    async fn stored_rate_reproduces_converted_amount() {
        let mut r = req(dec!(1000000), Currency::Gbp);
        r.exchange_rate = Some(dec!(1.3333335));
        let (new, _) = prepare_payment(&Unavailable, r, OffsetDateTime::now_utc())
            .await
            .unwrap();
        let rate = new.exchange_rate.unwrap();
        assert_eq!(rate, dec!(1.333334));
        assert_eq!(new.normalized_amount, dec!(1333334.00));
        assert_eq!(new.normalized_amount, round_money(new.amount * rate));
    }

    #[tokio::test]
    async fn oversized_values_are_invalid_input() {
        let mut r = req(dec!(100), Currency::Gbp);
        r.exchange_rate = Some(dec!(10000));
        let res = prepare_payment(&Unavailable, r, OffsetDateTime::now_utc()).await;
        assert!(matches!(res, Err(ApiError::InvalidInput(_))));

        let res = prepare_payment(
            &Unavailable,
            req(dec!(10000000000000), Currency::Usd),
            OffsetDateTime::now_utc(),
        )
        .await;
        assert!(matches!(res, Err(ApiError::InvalidInput(_))));

        let mut r = req(dec!(9000000000000), Currency::Gbp);
        r.exchange_rate = Some(dec!(2));
        let res = prepare_payment(&Unavailable, r, OffsetDateTime::now_utc()).await;
        assert!(matches!(res, Err(ApiError::InvalidInput(_))));
    }

    #[test]
    fn usd_payment_keeps_amount_and_date() {
        let at = datetime!(2023-12-24 8:00 UTC);
        let mut r = req(dec!(250), Currency::Usd);
        r.payment_date = Some(at);
        r.notes = Some(" extra ".into());
        let new = build_payment(r, RateQuote { rate: Decimal::ONE, fallback: false }, OffsetDateTime::now_utc())
            .unwrap();
        assert_eq!(new.normalized_amount, dec!(250));
        assert_eq!(new.exchange_rate, None);
        assert_eq!(new.payment_date, at);
        assert_eq!(new.notes.as_deref(), Some("extra"));
    }

    #[test]
    fn zero_amount_is_allowed() {
        assert_eq!(check_amount(Decimal::ZERO).unwrap(), Decimal::ZERO);
    }
}
