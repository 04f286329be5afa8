//! HTTP implementation of [`FocusService`].
//!
//! This module provides:
//! - JSON GET/POST helpers with status checking
//! - One method per remote endpoint
//! - Request timeouts from the dashboard configuration

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::error::ApiError;
use super::FocusService;
use crate::types::{
    Credentials, DurationRequest, DurationResponse, FocusScoreResponse, LoginResponse,
    SaveResponse, SessionRecord, SessionSummary, WarningStatusResponse,
};

// ============================================================================
// Endpoints
// ============================================================================

const LOGIN: &str = "/submit";
const DURATION: &str = "/duration";
const START_SESSION: &str = "/start_session";
const VIDEO_FEED: &str = "/video_feed";
const FOCUS_SCORE: &str = "/get_focus_score";
const STOP_SESSION: &str = "/stop_session";
const SAVE_SESSION: &str = "/save-session";
const WARNING_STATUS: &str = "/warning_status";

// ============================================================================
// HttpFocusService
// ============================================================================

/// Focus-scoring service reached over HTTP.
#[derive(Clone, Debug)]
pub struct HttpFocusService {
    client: Client,
    base_url: String,
}

impl HttpFocusService {
    /// Creates a client for the service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidUrl` if `base_url` is not an absolute URL,
    /// or `ApiError::Http` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let parsed = Url::parse(base_url).map_err(|_| ApiError::InvalidUrl(base_url.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Returns the normalized base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, ApiError> {
        let response = self.client.get(self.url(endpoint)).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus {
                endpoint,
                status: response.status(),
            });
        }

        Ok(response.json().await?)
    }

    async fn post_json<B, T>(&self, endpoint: &'static str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus {
                endpoint,
                status: response.status(),
            });
        }

        Ok(response.json().await?)
    }
}

impl FocusService for HttpFocusService {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiError> {
        self.post_json(LOGIN, credentials).await
    }

    async fn session_duration(
        &self,
        username: &str,
        date: NaiveDate,
    ) -> Result<DurationResponse, ApiError> {
        let request = DurationRequest {
            username: username.to_string(),
            date,
        };
        self.post_json(DURATION, &request).await
    }

    async fn begin_session(&self) -> Result<(), ApiError> {
        let response = self.client.get(self.url(START_SESSION)).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::HttpStatus {
                endpoint: START_SESSION,
                status: response.status(),
            });
        }

        Ok(())
    }

    async fn focus_score(&self) -> Result<f64, ApiError> {
        let body: FocusScoreResponse = self.get_json(FOCUS_SCORE).await?;
        Ok(body.focus_score)
    }

    async fn end_session(&self) -> Result<SessionSummary, ApiError> {
        self.get_json(STOP_SESSION).await
    }

    async fn save_session(&self, record: &SessionRecord) -> Result<(), ApiError> {
        let ack: SaveResponse = self.post_json(SAVE_SESSION, record).await?;

        if ack.is_error() {
            return Err(ApiError::Rejected {
                endpoint: SAVE_SESSION,
                message: ack.message.unwrap_or_default(),
            });
        }

        Ok(())
    }

    async fn warning_count(&self) -> Result<u32, ApiError> {
        let body: WarningStatusResponse = self.get_json(WARNING_STATUS).await?;
        Ok(body.warnings)
    }

    fn video_feed_url(&self) -> String {
        self.url(VIDEO_FEED)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_trims_trailing_slash() {
        let service =
            HttpFocusService::new("http://127.0.0.1:5000/", Duration::from_secs(5)).unwrap();
        assert_eq!(service.base_url(), "http://127.0.0.1:5000");
        assert_eq!(
            service.video_feed_url(),
            "http://127.0.0.1:5000/video_feed"
        );
    }

    #[test]
    fn test_new_rejects_relative_url() {
        let result = HttpFocusService::new("127.0.0.1:5000", Duration::from_secs(5));
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));

        let result = HttpFocusService::new("not a url", Duration::from_secs(5));
        assert!(matches!(result, Err(ApiError::InvalidUrl(_))));
    }

    #[test]
    fn test_url_keeps_base_path() {
        let service =
            HttpFocusService::new("http://focus.local/api", Duration::from_secs(5)).unwrap();
        assert_eq!(service.url(FOCUS_SCORE), "http://focus.local/api/get_focus_score");
    }

    #[tokio::test]
    async fn test_connection_failure() {
        // Port 9 (discard) is not expected to have an HTTP server on loopback.
        let service =
            HttpFocusService::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();

        let result = service.focus_score().await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is_connection());
    }
}
