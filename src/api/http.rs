use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;

/// Build the shared HTTP client with explicit timeouts
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(5)))
        .build()
        .context("Failed to build HTTP client")
}

/// Send a request and decode the JSON body.
///
/// 403 and 404 mean the provider has nothing for `game_id`; every other
/// non-success status is transient.
pub async fn fetch_json<T: DeserializeOwned>(
    request: RequestBuilder,
    game_id: &str,
) -> Result<T, FetchError> {
    let response = request
        .header("Accept", "application/json")
        .send()
        .await?;

    let status = response.status();
    debug!("Provider responded {} for {}", status, response.url());

    match status {
        s if s.is_success() => {}
        StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
            return Err(FetchError::UnknownGame(game_id.to_string()));
        }
        s => {
            let text = response.text().await.unwrap_or_default();
            return Err(FetchError::Transient(format!("{} - {}", s, truncate(&text, 200))));
        }
    }

    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc");
        assert_eq!(truncate("abc", 10), "abc");
    }
}
