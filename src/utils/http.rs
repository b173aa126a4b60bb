// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_client(config: &HttpConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(config.detail_timeout())
        .build()?;
    Ok(client)
}

/// GET `url` and decode the JSON body.
pub async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<T> {
    send_json(client.get(url).timeout(timeout), url).await
}

/// Send a prepared request and decode the JSON body.
///
/// HTTP 429 maps to [`AppError::RateLimited`]; any other non-success status
/// maps to [`AppError::Status`].
pub async fn send_json<T: DeserializeOwned>(request: RequestBuilder, url: &str) -> Result<T> {
    let response = request.send().await?;
    let status = response.status();

    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(AppError::RateLimited(url.to_string()));
    }
    if !status.is_success() {
        return Err(AppError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}
