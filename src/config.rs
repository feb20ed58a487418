use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// Exchange-rate source and how long a fetched rate stays fresh.
#[derive(Debug, Clone, Deserialize)]
pub struct FxConfig {
    pub api_url: String,
    pub refresh_seconds: u64,
}

/// Chat-completion endpoint used for onboarding suggestions.
#[derive(Debug, Clone, Deserialize)]
pub struct AdvisorConfig {
    pub api_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub jwt: JwtConfig,
    pub fx: FxConfig,
    pub advisor: AdvisorConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: env_or("JWT_ISSUER", "payoff-tracker"),
            audience: env_or("JWT_AUDIENCE", "payoff-tracker-users"),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let fx = FxConfig {
            api_url: env_or("FX_API_URL", "https://open.er-api.com"),
            refresh_seconds: env_parse("FX_REFRESH_SECONDS", 60),
        };
        let advisor = AdvisorConfig {
            api_url: env_or(
                "ADVISOR_API_URL",
                "https://api.openai.com/v1/chat/completions",
            ),
            api_key: std::env::var("ADVISOR_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            model: env_or("ADVISOR_MODEL", "gpt-4o-mini"),
        };
        Ok(Self {
            database_url,
            max_connections: env_parse("DATABASE_MAX_CONNECTIONS", 10),
            jwt,
            fx,
            advisor,
        })
    }
}
