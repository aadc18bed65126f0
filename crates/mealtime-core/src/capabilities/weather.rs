//! WeatherAPI.com adapter for the weather capability.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::capabilities::traits::{Observation, Weather};
use crate::error::WeatherError;

const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com/v1";

/// Client for the weatherapi.com current-conditions endpoint.
pub struct WeatherApi {
    api_key: String,
    base_url: String,
    client: Client,
}

#[derive(Deserialize)]
struct CurrentResponse {
    current: Current,
}

#[derive(Deserialize)]
struct Current {
    temp_c: f64,
    condition: Condition,
}

#[derive(Deserialize)]
struct Condition {
    text: String,
}

impl WeatherApi {
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the adapter at a different endpoint (tests).
    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Weather for WeatherApi {
    async fn lookup(&self, location: &str) -> Result<Observation, WeatherError> {
        let url = format!("{}/current.json", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("q", location)])
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(WeatherError::Unavailable(format!(
                "HTTP {}",
                resp.status()
            )));
        }

        let body: CurrentResponse = resp
            .json()
            .await
            .map_err(|e| WeatherError::Malformed(e.to_string()))?;

        Ok(Observation {
            temperature_c: body.current.temp_c,
            condition: body.current.condition.text,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_parses_current_conditions() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/current.json")
            .match_query(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("key".into(), "test-key".into()),
                mockito::Matcher::UrlEncoded("q".into(), "Chennai".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"current": {"temp_c": 36.0, "condition": {"text": "Sunny"}}}"#)
            .create_async()
            .await;

        let api = WeatherApi::with_base_url("test-key", &server.url());
        let obs = api.lookup("Chennai").await.unwrap();
        assert_eq!(obs.temperature_c, 36.0);
        assert_eq!(obs.condition, "Sunny");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn http_error_is_transient_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/current.json")
            .match_query(mockito::Matcher::Any)
            .with_status(503)
            .create_async()
            .await;

        let api = WeatherApi::with_base_url("test-key", &server.url());
        let err = api.lookup("Chennai").await.unwrap_err();
        assert!(matches!(err, WeatherError::Unavailable(_)));
    }

    #[tokio::test]
    async fn malformed_body_is_reported_as_malformed() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/current.json")
            .match_query(mockito::Matcher::Any)
            .with_status(200)
            .with_body(r#"{"nope": true}"#)
            .create_async()
            .await;

        let api = WeatherApi::with_base_url("test-key", &server.url());
        let err = api.lookup("Chennai").await.unwrap_err();
        assert!(matches!(err, WeatherError::Malformed(_)));
    }
}
