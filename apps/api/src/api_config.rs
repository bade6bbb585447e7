use std::env;
use std::fmt::Display;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use ipnet::IpNet;
use pawguard_core::AppError;
use pawguard_domain::{DEFAULT_EXEMPT_PREFIXES, KeyNamespace, WindowPolicy};
use tracing::warn;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Which counter store backend the limiters talk to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CounterStoreConfig {
    Rest { endpoint: Url, token: String },
    Redis { redis_url: String },
    InMemory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityProviderConfig {
    pub base_url: Url,
    pub api_key: String,
    pub redirect_to: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_host: String,
    pub api_port: u16,
    pub app_origin_url: Url,
    /// `None` when the selected backend lacks its credentials.
    pub counter_store: Option<CounterStoreConfig>,
    pub store_timeout: Duration,
    pub key_namespace: KeyNamespace,
    pub edge_policy: WindowPolicy,
    pub exempt_prefixes: Vec<String>,
    pub trusted_proxies: Vec<IpNet>,
    /// `None` when the base URL or API key is missing.
    pub identity_provider: Option<IdentityProviderConfig>,
    pub allowed_origins: Vec<String>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        let api_host = env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let api_port = parse_number("API_PORT", optional_env("API_PORT"), 3001_u16)?;

        let app_origin_url = parse_url_env(
            "APP_ORIGIN_URL",
            &env::var("APP_ORIGIN_URL").unwrap_or_else(|_| "http://127.0.0.1:3000".to_owned()),
        )?;

        let store_backend = env::var("RATE_LIMIT_STORE").unwrap_or_else(|_| "rest".to_owned());
        let counter_store = match store_backend.as_str() {
            "rest" => rest_store_config(),
            "redis" => optional_env("REDIS_URL")
                .map(|redis_url| CounterStoreConfig::Redis { redis_url }),
            "memory" => Some(CounterStoreConfig::InMemory),
            other => {
                return Err(AppError::Validation(format!(
                    "RATE_LIMIT_STORE must be one of 'rest', 'redis' or 'memory', got '{other}'"
                )));
            }
        };

        let store_timeout =
            Duration::from_millis(parse_env_u64("RATE_LIMIT_STORE_TIMEOUT_MS", 300)?);
        if store_timeout.is_zero() {
            return Err(AppError::Validation(
                "RATE_LIMIT_STORE_TIMEOUT_MS must be greater than zero".to_owned(),
            ));
        }

        let key_namespace = KeyNamespace::new(
            env::var("RATE_LIMIT_KEY_PREFIX").unwrap_or_else(|_| "pawguard".to_owned()),
        )?;

        let default_policy = WindowPolicy::edge_default();
        let edge_policy = WindowPolicy::new(
            parse_env_u64(
                "EDGE_RATE_LIMIT_MAX_REQUESTS",
                default_policy.max_requests(),
            )?,
            parse_env_u64(
                "EDGE_RATE_LIMIT_WINDOW_SECONDS",
                default_policy.window_seconds(),
            )?,
        )?;

        let exempt_prefixes = optional_env("RATE_LIMIT_EXEMPT_PREFIXES")
            .map(|value| split_list(&value))
            .unwrap_or_else(|| {
                DEFAULT_EXEMPT_PREFIXES
                    .iter()
                    .map(|prefix| (*prefix).to_owned())
                    .collect()
            });

        let trusted_proxies = optional_env("TRUSTED_PROXIES")
            .map(|value| parse_trusted_proxies(&value))
            .transpose()?
            .unwrap_or_default();

        let allowed_origins = optional_env("ALLOWED_ORIGINS")
            .map(|value| split_list(&value))
            .unwrap_or_default();

        Ok(Self {
            api_host,
            api_port,
            app_origin_url,
            counter_store,
            store_timeout,
            key_namespace,
            edge_policy,
            exempt_prefixes,
            trusted_proxies,
            identity_provider: identity_provider_config(),
            allowed_origins,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Internal(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

// A malformed store URL disables the limiters instead of refusing to boot.
fn rest_store_config() -> Option<CounterStoreConfig> {
    let endpoint = optional_env("RATE_LIMIT_STORE_URL")?;
    let token = optional_env("RATE_LIMIT_STORE_TOKEN")?;

    match Url::parse(&endpoint) {
        Ok(endpoint) => Some(CounterStoreConfig::Rest { endpoint, token }),
        Err(error) => {
            warn!(%error, "ignoring invalid RATE_LIMIT_STORE_URL");
            None
        }
    }
}

fn identity_provider_config() -> Option<IdentityProviderConfig> {
    let base_url = optional_env("IDENTITY_PROVIDER_URL")?;
    let api_key = optional_env("IDENTITY_PROVIDER_API_KEY")?;

    match Url::parse(&base_url) {
        Ok(base_url) => Some(IdentityProviderConfig {
            base_url,
            api_key,
            redirect_to: optional_env("PASSWORD_RESET_REDIRECT_URL"),
        }),
        Err(error) => {
            warn!(%error, "ignoring invalid IDENTITY_PROVIDER_URL");
            None
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, AppError> {
    parse_number(name, optional_env(name), default)
}

/// Unset values take `default`; set but malformed values are a startup error.
fn parse_number<T>(name: &str, value: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: Display,
{
    match value {
        Some(value) => value
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        None => Ok(default),
    }
}

fn parse_url_env(name: &str, value: &str) -> Result<Url, AppError> {
    Url::parse(value).map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

fn parse_trusted_proxies(value: &str) -> Result<Vec<IpNet>, AppError> {
    split_list(value)
        .iter()
        .map(|entry| {
            IpNet::from_str(entry)
                .or_else(|_| IpAddr::from_str(entry).map(IpNet::from))
                .map_err(|error| {
                    AppError::Validation(format!(
                        "invalid TRUSTED_PROXIES entry '{entry}': {error}"
                    ))
                })
        })
        .collect()
}
