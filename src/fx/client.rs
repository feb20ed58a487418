use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use super::currency::{Currency, ACCOUNTING_CURRENCY};

/// Source of "1 unit of `from` = N USD" multipliers.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn rate_to_usd(&self, from: Currency) -> anyhow::Result<Decimal>;
}

#[derive(Debug, Deserialize)]
struct LatestRates {
    rates: HashMap<String, f64>,
}

/// open.er-api.com style endpoint: `GET {base}/v6/latest/{code}`.
#[derive(Clone)]
pub struct OpenErApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenErApiClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("build fx http client")?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RateProvider for OpenErApiClient {
    async fn rate_to_usd(&self, from: Currency) -> anyhow::Result<Decimal> {
        if from == ACCOUNTING_CURRENCY {
            return Ok(Decimal::ONE);
        }
        let url = format!("{}/v6/latest/{}", self.base_url, from.code());
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {}", url))?
            .error_for_status()
            .context("fx api status")?;
        let body: LatestRates = resp.json().await.context("parse fx response")?;
        let raw = body
            .rates
            .get(ACCOUNTING_CURRENCY.code())
            .copied()
            .with_context(|| format!("no {} quote for {}", ACCOUNTING_CURRENCY, from))?;
        let rate = Decimal::from_f64(raw)
            .context("fx rate is not a finite number")?
            .round_dp(6);
        anyhow::ensure!(rate > Decimal::ZERO, "fx rate must be positive, got {}", rate);
        debug!(%from, %rate, "fx rate fetched");
        Ok(rate)
    }
}

/// Keeps each fetched rate for `ttl` before asking the inner provider again.
pub struct CachedRates {
    inner: Arc<dyn RateProvider>,
    ttl: Duration,
    cache: RwLock<HashMap<Currency, (Decimal, Instant)>>,
}

impl CachedRates {
    pub fn new(inner: Arc<dyn RateProvider>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl RateProvider for CachedRates {
    async fn rate_to_usd(&self, from: Currency) -> anyhow::Result<Decimal> {
        if let Some((rate, fetched_at)) = self.cache.read().await.get(&from) {
            if fetched_at.elapsed() < self.ttl {
                return Ok(*rate);
            }
        }
        let rate = self.inner.rate_to_usd(from).await?;
        self.cache
            .write()
            .await
            .insert(from, (rate, Instant::now()));
        Ok(rate)
    }
}
