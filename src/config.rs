use std::env;

/// Page size of the news feed when `NEWS_COUNT_ON_HOME_PAGE` is unset.
pub const DEFAULT_NEWS_COUNT_ON_HOME_PAGE: usize = 10;

/// Upper bound for `TOKEN_TTL_SECS` (one year).
pub const MAX_TOKEN_TTL_SECS: u64 = 365 * 24 * 60 * 60;

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup and
/// shared immutably through `AppState` (pulled into extractors via `FromRef`).
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Postgres connection string. `None` (local only) runs on the in-memory repository.
    pub db_url: Option<String>,
    // Runtime environment marker. Controls the local `x-user-id` bypass.
    pub env: Env,
    // HS256 secret used to sign and validate bearer tokens.
    pub jwt_secret: String,
    // Lifetime of issued tokens, in seconds.
    pub token_ttl_secs: u64,
    // Number of news items on the home feed.
    pub news_count_on_home_page: usize,
    // Where unauthenticated requesters are redirected.
    pub login_url: String,
    pub bind_addr: String,
}

/// Env
///
/// Runtime context: `Local` enables development conveniences (header auth bypass,
/// database-less runs, pretty logs); `Production` requires every secret to be set.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration for test state scaffolding.
    fn default() -> Self {
        Self {
            db_url: None,
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            token_ttl_secs: 24 * 60 * 60,
            news_count_on_home_page: DEFAULT_NEWS_COUNT_ON_HOME_PAGE,
            login_url: "/auth/login".to_string(),
            bind_addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables.
    ///
    /// # Panics
    /// Panics if a variable required in the current environment is missing, or if a
    /// numeric variable is set but does not parse. The service must not start with an
    /// incomplete configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let defaults = Self::default();

        let (db_url, jwt_secret) = match env {
            Env::Production => (
                Some(env::var("DATABASE_URL").expect("FATAL: DATABASE_URL required in prod")),
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production."),
            ),
            Env::Local => (
                env::var("DATABASE_URL").ok().filter(|url| !url.is_empty()),
                env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
            ),
        };

        let news_count_on_home_page = parse_var("NEWS_COUNT_ON_HOME_PAGE")
            .unwrap_or(defaults.news_count_on_home_page);
        assert!(
            news_count_on_home_page > 0,
            "FATAL: NEWS_COUNT_ON_HOME_PAGE must be positive"
        );

        let token_ttl_secs = parse_var("TOKEN_TTL_SECS").unwrap_or(defaults.token_ttl_secs);
        assert!(
            (1..=MAX_TOKEN_TTL_SECS).contains(&token_ttl_secs),
            "FATAL: TOKEN_TTL_SECS must be between 1 and {}",
            MAX_TOKEN_TTL_SECS
        );

        Self {
            db_url,
            env,
            jwt_secret,
            token_ttl_secs,
            news_count_on_home_page,
            login_url: defaults.login_url,
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => panic!("FATAL: {} must be a number, got {:?}", name, raw),
    }
}
