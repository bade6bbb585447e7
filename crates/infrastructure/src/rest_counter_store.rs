//! Counter store speaking the hosted Redis-over-HTTP REST protocol.
//!
//! Each command is posted as a JSON array (`["INCR", "key"]`) to the store
//! endpoint with a bearer token; replies are `{"result": ...}` or
//! `{"error": "..."}`. Several commands can be sent to `<endpoint>/pipeline`
//! as an array of arrays, answered by an array of replies.
//!
//! Pipelines are not transactions. Increments therefore send `EXPIRE ... NX`
//! on every call, which gives a counter its time-to-live on the first
//! increment that gets through and leaves an existing one untouched.

use async_trait::async_trait;
use pawguard_application::CounterStore;
use pawguard_core::{AppError, AppResult};
use reqwest::header;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

#[derive(Debug, Deserialize)]
struct CommandReply {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<String>,
}

impl CommandReply {
    fn into_result(self) -> AppResult<Value> {
        match self.error {
            Some(error) => Err(AppError::StoreUnavailable(format!(
                "counter store rejected command: {error}"
            ))),
            None => Ok(self.result.unwrap_or(Value::Null)),
        }
    }
}

/// REST implementation of the counter store port.
#[derive(Clone)]
pub struct RestCounterStore {
    http_client: reqwest::Client,
    endpoint: Url,
    token: String,
}

impl RestCounterStore {
    /// Creates an adapter for one store endpoint.
    ///
    /// Request timeouts are taken from `http_client`.
    #[must_use]
    pub fn new(http_client: reqwest::Client, endpoint: Url, token: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint,
            token: token.into(),
        }
    }

    async fn send_command(&self, command: &[&str]) -> AppResult<Value> {
        let reply = self
            .post_json::<CommandReply, _>(self.endpoint.clone(), command)
            .await?;
        reply.into_result()
    }

    async fn send_pipeline(&self, commands: &[&[&str]]) -> AppResult<Vec<Value>> {
        let mut pipeline_url = self.endpoint.clone();
        pipeline_url
            .path_segments_mut()
            .map_err(|()| {
                AppError::Validation(format!(
                    "counter store endpoint '{}' cannot carry a path",
                    self.endpoint
                ))
            })?
            .pop_if_empty()
            .push("pipeline");

        let replies = self
            .post_json::<Vec<CommandReply>, _>(pipeline_url, commands)
            .await?;
        if replies.len() != commands.len() {
            return Err(AppError::StoreUnavailable(format!(
                "counter store answered {} of {} pipelined commands",
                replies.len(),
                commands.len()
            )));
        }

        replies.into_iter().map(CommandReply::into_result).collect()
    }

    async fn post_json<T, B>(&self, url: Url, body: &B) -> AppResult<T>
    where
        T: for<'de> Deserialize<'de>,
        B: serde::Serialize + ?Sized,
    {
        let response = self
            .http_client
            .post(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .json(body)
            .send()
            .await
            .map_err(|error| {
                AppError::StoreUnavailable(format!("failed to reach counter store: {error}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .json::<CommandReply>()
                .await
                .ok()
                .and_then(|reply| reply.error)
                .unwrap_or_else(|| "<no error detail>".to_owned());
            return Err(AppError::StoreUnavailable(format!(
                "counter store returned status {}: {detail}",
                status.as_u16()
            )));
        }

        response.json::<T>().await.map_err(|error| {
            AppError::StoreUnavailable(format!("failed to decode counter store reply: {error}"))
        })
    }
}

/// Decodes an integer reply. Stores return counters as numbers for `INCR`
/// and as strings for `GET`; a missing key reads as zero.
fn decode_count(value: Value) -> AppResult<u64> {
    match value {
        Value::Null => Ok(0),
        Value::Number(number) => number.as_u64().ok_or_else(|| {
            AppError::StoreUnavailable(format!("counter store returned invalid count {number}"))
        }),
        Value::String(text) => text.parse::<u64>().map_err(|error| {
            AppError::StoreUnavailable(format!(
                "counter store returned invalid count '{text}': {error}"
            ))
        }),
        other => Err(AppError::StoreUnavailable(format!(
            "counter store returned unexpected reply {other}"
        ))),
    }
}

#[async_trait]
impl CounterStore for RestCounterStore {
    async fn increment_with_expiry(&self, key: &str, seconds: u64) -> AppResult<u64> {
        let seconds = seconds.to_string();
        let mut replies = self
            .send_pipeline(&[&["INCR", key], &["EXPIRE", key, seconds.as_str(), "NX"]])
            .await?
            .into_iter();

        decode_count(replies.next().unwrap_or(Value::Null))
    }

    async fn get(&self, key: &str) -> AppResult<u64> {
        decode_count(self.send_command(&["GET", key]).await?)
    }

    async fn ping(&self) -> AppResult<()> {
        match self.send_command(&["PING"]).await? {
            Value::String(reply) if reply.eq_ignore_ascii_case("pong") => Ok(()),
            other => Err(AppError::StoreUnavailable(format!(
                "unexpected counter store ping reply: {other}"
            ))),
        }
    }

    async fn increment_with_expiry_and_get(
        &self,
        key: &str,
        seconds: u64,
        peek_key: &str,
    ) -> AppResult<(u64, u64)> {
        let seconds = seconds.to_string();
        let mut replies = self
            .send_pipeline(&[
                &["INCR", key],
                &["EXPIRE", key, seconds.as_str(), "NX"],
                &["GET", peek_key],
            ])
            .await?
            .into_iter();

        let incremented = decode_count(replies.next().unwrap_or(Value::Null))?;
        let peeked = decode_count(replies.nth(1).unwrap_or(Value::Null))?;
        Ok((incremented, peeked))
    }
}
