use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use time::{Date, Month, OffsetDateTime};

use super::engine::{Ledger, LedgerPoint, PointKind};
use super::LedgerError;

/// Forecast of when a plan reaches zero balance. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub monthly_target: Decimal,
    pub months_remaining: u32,
    #[serde(with = "time::serde::rfc3339")]
    pub projected_date: OffsetDateTime,
    /// 30-day periods since the first payment, rounded up. Informational only.
    pub months_elapsed: u32,
}

/// Adds calendar months, clamping the day to the target month's length
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(at: OffsetDateTime, months: u32) -> Option<OffsetDateTime> {
    let index = i64::from(at.year()) * 12 + i64::from(u8::from(at.month())) - 1 + i64::from(months);
    let year = i32::try_from(index.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(index.rem_euclid(12) + 1).ok()?).ok()?;
    let day = at.day().min(time::util::days_in_year_month(year, month));
    let date = Date::from_calendar_date(year, month, day).ok()?;
    Some(at.replace_date(date))
}

fn months_elapsed(first_payment: Option<OffsetDateTime>, now: OffsetDateTime) -> u32 {
    const PERIOD_SECS: i64 = 30 * 24 * 60 * 60;
    match first_payment {
        Some(first) if now > first => {
            let secs = (now - first).whole_seconds();
            u32::try_from((secs + PERIOD_SECS - 1) / PERIOD_SECS).unwrap_or(u32::MAX)
        }
        _ => 0,
    }
}

/// Appends a projected payoff point to `ledger` when `target_months` is set
/// and a balance remains. `now` makes the result time-dependent on purpose.
pub fn project_payoff(
    ledger: &mut Ledger,
    target_months: Option<u32>,
    now: OffsetDateTime,
) -> Result<Option<Projection>, LedgerError> {
    let Some(target) = target_months else {
        return Ok(None);
    };
    if target == 0 {
        return Err(LedgerError::DivisionByZero);
    }
    let total = ledger.summary.total_amount;
    let remaining = ledger.summary.remaining;
    if remaining <= Decimal::ZERO {
        return Ok(None);
    }

    let monthly_target = total / Decimal::from(target);
    let months_remaining = (remaining / monthly_target)
        .ceil()
        .to_u32()
        .ok_or_else(|| LedgerError::InvalidInput("projection horizon out of range".into()))?;
    let projected_date = add_months(now, months_remaining)
        .ok_or_else(|| LedgerError::InvalidInput("projected date out of range".into()))?;

    let projection = Projection {
        monthly_target,
        months_remaining,
        projected_date,
        months_elapsed: months_elapsed(ledger.first_payment_date(), now),
    };
    ledger.points.push(LedgerPoint {
        kind: PointKind::Projected,
        date: Some(projected_date),
        amount: Decimal::ZERO,
        cumulative_paid: total,
        balance: Decimal::ZERO,
    });
    Ok(Some(projection))
}
