//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use storefront_core::DomainError;
use storefront_core::domain::{LimiterConfig, PeriodKind, SuggestionConfig};

/// Where limiter records are persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    File(PathBuf),
    Redis,
}

/// A limiter exposed under `/api/limits/{name}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LimiterSettings {
    pub name: String,
    pub config: LimiterConfig,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub store: StoreBackend,
    pub limiters: Vec<LimiterSettings>,
    /// JSON product catalog; the bundled one is used when unset.
    pub catalog_path: Option<PathBuf>,
    pub suggestions: SuggestionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, DomainError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DomainError> {
        let store = match lookup("STORE_BACKEND")
            .unwrap_or_else(|| "file".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "file" => StoreBackend::File(
                lookup("STORE_PATH")
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from("data/storage.json")),
            ),
            "redis" => StoreBackend::Redis,
            other => {
                return Err(DomainError::InvalidConfig(format!(
                    "unknown STORE_BACKEND '{other}', expected memory, file or redis"
                )));
            }
        };

        let limiters = vec![
            Self::limiter(
                &lookup,
                "analysis",
                "ANALYSIS_LIMIT",
                PeriodKind::Weekly,
                3,
                "analysisSubmissions",
            )?,
            Self::limiter(
                &lookup,
                "product-requests",
                "PRODUCT_REQUEST_LIMIT",
                PeriodKind::Daily,
                5,
                "productRequestSubmissions",
            )?,
        ];

        let suggestions = SuggestionConfig::new(
            parse_or(&lookup, "SUGGEST_MIN_CHARS", 2),
            Duration::from_millis(parse_or(&lookup, "SUGGEST_DEBOUNCE_MS", 300)),
            parse_or(&lookup, "SUGGEST_MAX_RESULTS", 8),
        )?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: parse_or(&lookup, "PORT", 8080),
            store,
            limiters,
            catalog_path: lookup("CATALOG_PATH").map(PathBuf::from),
            suggestions,
        })
    }

    /// Read `<PREFIX>_MAX` and `<PREFIX>_PERIOD` for one limiter.
    fn limiter(
        lookup: &impl Fn(&str) -> Option<String>,
        name: &str,
        prefix: &str,
        default_period: PeriodKind,
        default_max: u32,
        storage_key: &str,
    ) -> Result<LimiterSettings, DomainError> {
        let period = match lookup(&format!("{prefix}_PERIOD")) {
            Some(raw) => raw.parse()?,
            None => default_period,
        };
        let max = parse_or(lookup, &format!("{prefix}_MAX"), default_max);

        Ok(LimiterSettings {
            name: name.to_string(),
            config: LimiterConfig::new(period, max, storage_key)?,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> T {
    lookup(key).and_then(|s| s.parse().ok()).unwrap_or(default)
}
