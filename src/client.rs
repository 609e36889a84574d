// src/client.rs

use crate::{config::AppConfig, error::*};
use reqwest::{IntoUrl, Response, StatusCode, header::HeaderMap};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde_json::Value;
use std::sync::Arc;
use tokio::{sync::Mutex as TokioMutex, time::Instant};

/// HTTP client with exponential-backoff retries and a minimum
/// inter-request interval shared across all concurrent callers.
///
/// Transient failures (5xx, 429, connection errors) are retried by the
/// middleware; 401 and 404 surface immediately as typed errors.
#[derive(Clone)]
pub struct RobustClient {
    pub client: ClientWithMiddleware,
    config: Arc<AppConfig>,
    last_request: Arc<TokioMutex<Instant>>,
}

impl RobustClient {
    pub fn new(config: Arc<AppConfig>) -> AppResult<Self> {
        Self::with_headers(config, HeaderMap::new())
    }

    pub fn with_headers(config: Arc<AppConfig>, headers: HeaderMap) -> AppResult<Self> {
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(config.max_retries);
        let client = ClientBuilder::new(
            reqwest::Client::builder()
                .user_agent(config.user_agent.clone())
                .default_headers(headers)
                .connect_timeout(config.connect_timeout)
                .timeout(config.timeout)
                .pool_max_idle_per_host(config.max_workers * 3)
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        let initial = Instant::now()
            .checked_sub(config.min_request_interval)
            .unwrap_or_else(Instant::now);

        Ok(Self {
            client,
            config,
            last_request: Arc::new(TokioMutex::new(initial)),
        })
    }

    /// Waits until the configured interval has passed since the previous
    /// request. The lock is held across the sleep so concurrent tasks are
    /// spaced out rather than released in a burst.
    async fn pace(&self) {
        if self.config.min_request_interval.is_zero() {
            return;
        }
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < self.config.min_request_interval {
            tokio::time::sleep(self.config.min_request_interval - elapsed).await;
        }
        *last = Instant::now();
    }

    pub async fn get<T: IntoUrl>(&self, url: T) -> AppResult<Response> {
        self.pace().await;
        let url = url.into_url()?;
        let display_url = url.to_string();
        let res = self.client.get(url).send().await?;
        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::AuthInvalid),
            StatusCode::NOT_FOUND => Err(AppError::NotFound(display_url)),
            _ => Ok(res.error_for_status()?),
        }
    }

    pub async fn get_json(&self, url: &str) -> AppResult<Value> {
        let res = self.get(url).await?;
        let body = res.text().await?;
        serde_json::from_str(&body).map_err(|e| AppError::ApiParseFailed {
            url: url.to_string(),
            source: e,
        })
    }

    pub async fn get_text(&self, url: &str) -> AppResult<String> {
        Ok(self.get(url).await?.text().await?)
    }

    pub async fn post_json(&self, url: &str, body: &Value) -> AppResult<Value> {
        self.pace().await;
        let res = self.client.post(url).json(body).send().await?;
        match res.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => return Err(AppError::AuthInvalid),
            StatusCode::NOT_FOUND => return Err(AppError::NotFound(url.to_string())),
            _ => {}
        }
        let res = res.error_for_status()?;
        let text = res.text().await?;
        serde_json::from_str(&text).map_err(|e| AppError::ApiParseFailed {
            url: url.to_string(),
            source: e,
        })
    }
}
