use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::debug;

use super::repo_types::Profile;
use crate::config::AdvisorConfig;

const SYSTEM_PROMPT: &str = "You are a financial advisor helping users set up loan repayment \
plans. Based on their goals and financial situation, suggest an appropriate loan amount, \
target months and payment strategy. Be encouraging and practical.";

/// Suggested plan setup, passed back to the caller as received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub suggested_amount: Decimal,
    pub suggested_months: Decimal,
    pub strategy: String,
    pub reasoning: String,
}

#[async_trait]
pub trait Advisor: Send + Sync {
    async fn suggest(&self, profile: &Profile) -> anyhow::Result<Suggestion>;
}

fn or_unset<T: ToString>(v: Option<T>, unset: &str) -> String {
    v.map(|x| x.to_string()).unwrap_or_else(|| unset.to_string())
}

pub fn build_prompt(p: &Profile) -> String {
    format!(
        "Financial Goal: {}\nMonthly Income: {}\nRisk Tolerance: {}\nPayment Frequency: {}\n\
         Emergency Fund: {}\nOther Debts: {}\n\n\
         Suggest a loan repayment setup with recommended loan amount, target months, and payment strategy.",
        p.financial_goal,
        or_unset(p.monthly_income, "Not specified"),
        or_unset(p.risk_tolerance, "Not specified"),
        or_unset(p.preferred_payment_frequency.as_deref(), "Not specified"),
        if p.has_emergency_fund == Some(true) { "Yes" } else { "No" },
        or_unset(p.other_debts.as_deref(), "None"),
    )
}

fn response_schema() -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": "calculator_suggestion",
            "strict": true,
            "schema": {
                "type": "object",
                "properties": {
                    "suggested_amount": { "type": "number" },
                    "suggested_months": { "type": "number" },
                    "strategy": { "type": "string" },
                    "reasoning": { "type": "string" }
                },
                "required": ["suggested_amount", "suggested_months", "strategy", "reasoning"],
                "additionalProperties": false
            }
        }
    })
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Pulls the suggestion out of the first choice's content.
fn parse_suggestion(body: &str) -> anyhow::Result<Suggestion> {
    let resp: ChatResponse = serde_json::from_str(body).context("decode chat response")?;
    let content = resp
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .context("advisor returned no content")?;
    serde_json::from_str(&content).context("decode suggestion")
}

/// OpenAI-compatible chat completions client.
#[derive(Clone)]
pub struct ChatAdvisor {
    http: reqwest::Client,
    url: String,
    api_key: Option<String>,
    model: String,
}

impl ChatAdvisor {
    pub fn new(cfg: &AdvisorConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .context("build advisor http client")?;
        Ok(Self {
            http,
            url: cfg.api_url.clone(),
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
        })
    }
}

#[async_trait]
impl Advisor for ChatAdvisor {
    async fn suggest(&self, profile: &Profile) -> anyhow::Result<Suggestion> {
        let api_key = self
            .api_key
            .as_deref()
            .context("advisor api key is not configured")?;
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": build_prompt(profile) }
            ],
            "response_format": response_schema(),
        });

        let text = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .with_context(|| format!("POST {}", self.url))?
            .error_for_status()
            .context("advisor status")?
            .text()
            .await
            .context("read advisor body")?;
        debug!(bytes = text.len(), "advisor responded");
        parse_suggestion(&text)
    }
}

#[cfg(test)]
pub(crate) mod fakes {
    use super::*;

    pub struct CannedAdvisor(pub Suggestion);

    #[async_trait]
    impl Advisor for CannedAdvisor {
        async fn suggest(&self, _profile: &Profile) -> anyhow::Result<Suggestion> {
            Ok(self.0.clone())
        }
    }

    pub struct DownAdvisor;

    #[async_trait]
    impl Advisor for DownAdvisor {
        async fn suggest(&self, _profile: &Profile) -> anyhow::Result<Suggestion> {
            anyhow::bail!("advisor unreachable")
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::onboarding::repo_types::RiskTolerance;

    #[test]
    fn prompt_lists_answers_and_placeholders() {
        let prompt = build_prompt(&Profile {
            financial_goal: "Clear my car loan".into(),
            monthly_income: Some(dec!(4200)),
            risk_tolerance: Some(RiskTolerance::Medium),
            ..Default::default()
        });
        assert!(prompt.contains("Financial Goal: Clear my car loan"));
        assert!(prompt.contains("Monthly Income: 4200"));
        assert!(prompt.contains("Risk Tolerance: medium"));
        assert!(prompt.contains("Payment Frequency: Not specified"));
        assert!(prompt.contains("Emergency Fund: No"));
        assert!(prompt.contains("Other Debts: None"));
    }

    #[test]
    fn parses_first_choice_content() {
        let body = r#"{"choices":[{"message":{"content":"{\"suggested_amount\":15000,\"suggested_months\":18,\"strategy\":\"Snowball\",\"reasoning\":\"Small wins first\"}"}}]}"#;
        let s = parse_suggestion(body).unwrap();
        assert_eq!(s.suggested_amount, dec!(15000));
        assert_eq!(s.suggested_months, dec!(18));
        assert_eq!(s.strategy, "Snowball");
    }

    #[test]
    fn fractional_months_pass_through() {
        let body = r#"{"choices":[{"message":{"content":"{\"suggested_amount\":9000.5,\"suggested_months\":18.0,\"strategy\":\"Avalanche\",\"reasoning\":\"Highest rate first\"}"}}]}"#;
        let s = parse_suggestion(body).unwrap();
        assert_eq!(s.suggested_months, dec!(18));
        assert_eq!(s.suggested_amount, dec!(9000.5));

        let body = r#"{"choices":[{"message":{"content":"{\"suggested_amount\":1,\"suggested_months\":7.5,\"strategy\":\"s\",\"reasoning\":\"r\"}"}}]}"#;
        assert_eq!(parse_suggestion(body).unwrap().suggested_months, dec!(7.5));
    }

    #[test]
    fn empty_choices_is_an_error() {
        assert!(parse_suggestion(r#"{"choices":[]}"#).is_err());
        assert!(parse_suggestion(r#"{"choices":[{"message":{"content":"not json"}}]}"#).is_err());
    }

    #[test]
    fn schema_is_named() {
        assert_eq!(
            response_schema()["json_schema"]["name"],
            Value::from("calculator_suggestion")
        );
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let advisor = ChatAdvisor::new(&AdvisorConfig {
            api_url: "http://127.0.0.1:9/unused".into(),
            api_key: None,
            model: "test-model".into(),
        })
        .unwrap();
        let err = advisor
            .suggest(&Profile {
                financial_goal: "x".into(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(err.to_string().contains("api key"));
    }
}
