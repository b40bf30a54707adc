// SPDX-FileCopyrightText: 2026 Chatlytics Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request plumbing shared by the HTTP collaborators.

use std::time::Duration;

use chatlytics_core::ChatlyticsError;
use reqwest::{RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Builds a client with the collaborator's timeout.
pub(crate) fn build_client(timeout_secs: u64) -> Result<reqwest::Client, ChatlyticsError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ChatlyticsError::executor(format!("failed to build HTTP client: {e}"), e))
}

/// Parses a configured base URL.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ChatlyticsError> {
    let url = Url::parse(raw)
        .map_err(|e| ChatlyticsError::Config(format!("invalid base URL `{raw}`: {e}")))?;
    if url.cannot_be_a_base() {
        return Err(ChatlyticsError::Config(format!(
            "`{raw}` cannot be used as a base URL"
        )));
    }
    Ok(url)
}

/// Appends path segments to `base`, percent-encoding each one.
pub(crate) fn join_segments(base: &Url, segments: &[&str]) -> Result<Url, ChatlyticsError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| ChatlyticsError::Config(format!("`{base}` cannot be used as a base URL")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Sends `request`, failing on transport errors and non-2xx statuses.
pub(crate) async fn send(
    request: RequestBuilder,
    what: &str,
) -> Result<reqwest::Response, ChatlyticsError> {
    let response = request
        .send()
        .await
        .map_err(|e| ChatlyticsError::executor(format!("{what} request failed: {e}"), e))?;

    let status = response.status();
    debug!(status = %status, what, "collaborator response received");
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(ChatlyticsError::Executor {
        message: format!("{what} returned {status}: {body}"),
        source: None,
    })
}

/// Sends `request` and decodes a JSON body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: RequestBuilder,
    what: &str,
) -> Result<T, ChatlyticsError> {
    let response = send(request, what).await?;
    response
        .json::<T>()
        .await
        .map_err(|e| ChatlyticsError::executor(format!("failed to decode {what} response: {e}"), e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_encoded_and_joined() {
        let base = parse_base_url("http://search:9200/").unwrap();
        let url = join_segments(&base, &["messages", "_doc", "a b/c"]).unwrap();
        assert_eq!(url.as_str(), "http://search:9200/messages/_doc/a%20b%2Fc");
    }

    #[test]
    fn base_path_prefix_is_kept() {
        let base = parse_base_url("http://proxy/es").unwrap();
        let url = join_segments(&base, &["messages", "_search"]).unwrap();
        assert_eq!(url.as_str(), "http://proxy/es/messages/_search");
    }

    #[test]
    fn non_base_url_is_config_error() {
        assert!(matches!(
            parse_base_url("mailto:ops@example.com"),
            Err(ChatlyticsError::Config(_))
        ));
        assert!(matches!(
            parse_base_url("not a url"),
            Err(ChatlyticsError::Config(_))
        ));
    }
}
