use std::fmt::{Display, Formatter};

use pawguard_core::{AppError, AppResult};
use reqwest::{StatusCode, header};
use url::Url;


/// Status is reported for every request at this interval.
pub const REPORT_INTERVAL: u32 = 20;

/// One observed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeStep {
    pub request_index: u32,
    pub status: StatusCode,
}

impl ProbeStep {
    fn should_report(&self) -> bool {
        self.request_index % REPORT_INTERVAL == 0 || self.status == StatusCode::TOO_MANY_REQUESTS
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    LimitConfirmed {
        request_index: u32,
        retry_after: Option<String>,
    },
    NoLimitObserved {
        attempts: u32,
    },
}

impl Display for ProbeOutcome {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LimitConfirmed {
                request_index,
                retry_after: Some(retry_after),
            } => write!(
                formatter,
                "limit confirmed at request {request_index} (Retry-After: {retry_after})"
            ),
            Self::LimitConfirmed {
                request_index,
                retry_after: None,
            } => write!(formatter, "limit confirmed at request {request_index}"),
            Self::NoLimitObserved { attempts } => {
                write!(formatter, "no 429 observed in {attempts} attempts")
            }
        }
    }
}

/// Fires sequential GETs at `target` until the first 429 or `max_requests`.
///
/// `report` sees every twentieth response and the terminating 429. Any
/// transport failure aborts the run.
pub async fn run_probe(
    http_client: &reqwest::Client,
    target: &Url,
    max_requests: u32,
    mut report: impl FnMut(&ProbeStep),
) -> AppResult<ProbeOutcome> {
    for request_index in 1..=max_requests {
        let response = http_client
            .get(target.clone())
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "request {request_index} to {target} failed: {error}"
                ))
            })?;

        let step = ProbeStep {
            request_index,
            status: response.status(),
        };
        if step.should_report() {
            report(&step);
        }

        if step.status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .map(ToOwned::to_owned);
            return Ok(ProbeOutcome::LimitConfirmed {
                request_index,
                retry_after,
            });
        }
    }

    Ok(ProbeOutcome::NoLimitObserved {
        attempts: max_requests,
    })
}
