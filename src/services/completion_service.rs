use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::CompletionConfig;

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("completion API key is not configured")]
    MissingApiKey,

    #[error("transport error: {0}")]
    UpstreamTransport(String),

    #[error("upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("upstream returned no choices")]
    UpstreamEmpty,

    #[error("could not decode upstream response: {0}")]
    UpstreamDecode(String),

    #[error("failed after {attempts} attempts, last error: {last}")]
    UpstreamExhausted {
        attempts: u32,
        last: Box<GenerationError>,
    },

    #[error("no usable JSON in completion: {0}")]
    Parse(String),

    #[error("content failed validation: {0}")]
    Validation(String),
}

#[derive(Debug, Clone)]
pub struct RawCompletion {
    pub text: String,
    pub received_at: DateTime<Utc>,
}

/// Bounded retry with linear backoff: attempt `n` waits `(n - 1) * step`
/// before it is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn delay_before(&self, attempt: u32) -> Duration {
        self.backoff_step * attempt.saturating_sub(1)
    }

    pub fn total_backoff(&self) -> Duration {
        (1..=self.max_attempts).map(|n| self.delay_before(n)).sum()
    }

    pub async fn run<F, Fut, T>(&self, mut op: F) -> Result<T, GenerationError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, GenerationError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut last = GenerationError::UpstreamEmpty;

        for attempt in 1..=attempts {
            let delay = self.delay_before(attempt);
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    tracing::warn!(attempt, max_attempts = attempts, error = %err, "completion attempt failed");
                    last = err;
                }
            }
        }

        Err(GenerationError::UpstreamExhausted {
            attempts,
            last: Box::new(last),
        })
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
}

#[derive(Deserialize)]
struct RespChoiceMsg {
    content: String,
}

#[derive(Deserialize)]
struct RespChoice {
    message: RespChoiceMsg,
}

#[derive(Deserialize)]
struct Resp {
    #[serde(default)]
    choices: Vec<RespChoice>,
}

#[derive(Clone)]
pub struct CompletionClient {
    client: Client,
    config: CompletionConfig,
    policy: RetryPolicy,
}

impl CompletionClient {
    pub fn new(config: CompletionConfig, client: Client) -> Self {
        Self {
            client,
            config,
            policy: RetryPolicy::default(),
        }
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Sends a single-message chat completion, retrying per the policy.
    /// A missing API key fails before anything is sent.
    pub async fn complete(&self, prompt: &str) -> Result<RawCompletion, GenerationError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(GenerationError::MissingApiKey)?;

        let payload = Req {
            model: &self.config.model,
            messages: vec![Msg {
                role: "user",
                content: prompt,
            }],
        };
        let payload = &payload;

        self.policy
            .run(move |_| self.send_once(api_key, payload))
            .await
    }

    async fn send_once(
        &self,
        api_key: &str,
        payload: &Req<'_>,
    ) -> Result<RawCompletion, GenerationError> {
        let res = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(payload)
            .send()
            .await
            .map_err(|e| GenerationError::UpstreamTransport(e.to_string()))?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(GenerationError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body: Resp = res
            .json()
            .await
            .map_err(|e| GenerationError::UpstreamDecode(e.to_string()))?;

        let choice = body
            .choices
            .into_iter()
            .next()
            .ok_or(GenerationError::UpstreamEmpty)?;

        Ok(RawCompletion {
            text: choice.message.content,
            received_at: Utc::now(),
        })
    }
}
