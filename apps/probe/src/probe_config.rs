use std::time::Duration;

use clap::Parser;
use url::Url;

/// Sends sequential GET requests until the rate limiter answers 429.
#[derive(Debug, Clone, Parser)]
#[command(name = "pawguard-probe", version)]
pub struct ProbeConfig {
    /// URL of the deployed site to probe.
    #[arg(env = "PROBE_TARGET_URL")]
    pub target: Url,

    /// Give up after this many requests.
    #[arg(
        long,
        env = "PROBE_MAX_REQUESTS",
        default_value_t = 105,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_requests: u32,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = 10_000, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_ms: u64,
}

impl ProbeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use clap::error::ErrorKind;

    use super::ProbeConfig;

    #[test]
    fn defaults_apply_to_bare_target() {
        let config = ProbeConfig::try_parse_from(["pawguard-probe", "https://grooming.example/"]);
        assert!(config.is_ok());
        let config = config.unwrap_or_else(|_| unreachable!());

        assert_eq!(config.max_requests, 105);
        assert_eq!(config.timeout_ms, 10_000);
        assert_eq!(config.target.as_str(), "https://grooming.example/");
    }

    #[test]
    fn zero_max_requests_is_a_usage_error() {
        let result = ProbeConfig::try_parse_from([
            "pawguard-probe",
            "https://grooming.example/",
            "--max-requests",
            "0",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn malformed_target_is_a_usage_error() {
        let result = ProbeConfig::try_parse_from(["pawguard-probe", "not a url"]);
        assert!(matches!(
            result.map_err(|error| error.kind()),
            Err(ErrorKind::ValueValidation)
        ));
    }
}
