/// Upper bound for any token lifetime read from the environment (one year).
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `None` runs the service on the in-memory store.
    pub database_url: Option<String>,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let secret = std::env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET must be set"))?;
        let jwt = JwtConfig {
            secret,
            ttl_minutes: minutes_from_env("JWT_TTL_MINUTES", 5),
            refresh_ttl_minutes: minutes_from_env("JWT_REFRESH_TTL_MINUTES", 60 * 24),
        };
        Ok(Self { database_url, jwt })
    }
}

fn minutes_from_env(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| (1..=MAX_TTL_MINUTES).contains(v))
        .unwrap_or(default)
}
