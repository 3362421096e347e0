//! Client for the third-party currency conversion API

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Default conversion endpoint
pub const DEFAULT_CURRENCY_API_URL: &str = "https://api.apilayer.com/currency_data/convert";

/// Currency API configuration
#[derive(Debug, Clone)]
pub struct CurrencyApiConfig {
    /// Conversion endpoint URL
    pub url: String,
    /// Key sent in the `apikey` header
    pub api_key: String,
}

/// Conversion form
///
/// All three fields are forwarded untouched; the upstream API is the only
/// judge of currency codes and amounts.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversionRequest {
    #[serde(rename = "from_")]
    pub from: String,
    pub to: String,
    pub amount: String,
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("currency API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("currency API returned malformed JSON: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Currency API client
#[derive(Debug, Clone)]
pub struct CurrencyClient {
    http: reqwest::Client,
    config: CurrencyApiConfig,
}

impl CurrencyClient {
    pub fn new(config: CurrencyApiConfig) -> Result<Self, ConversionError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self { http, config })
    }

    /// Convert through the upstream API and return its JSON body verbatim
    ///
    /// The upstream status code is not inspected: error payloads are JSON
    /// too and get rendered like any other result.
    pub async fn convert(&self, request: &ConversionRequest) -> Result<Value, ConversionError> {
        debug!(
            "Converting {} {} to {}",
            request.amount, request.from, request.to
        );

        let response = self
            .http
            .get(&self.config.url)
            .header("apikey", &self.config.api_key)
            .query(&[
                ("to", request.to.as_str()),
                ("from", request.from.as_str()),
                ("amount", request.amount.as_str()),
            ])
            .send()
            .await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn conversion() -> ConversionRequest {
        ConversionRequest {
            from: "USD".to_string(),
            to: "EUR".to_string(),
            amount: "100".to_string(),
        }
    }

    fn client_for(server: &mockito::ServerGuard) -> CurrencyClient {
        CurrencyClient::new(CurrencyApiConfig {
            url: format!("{}/currency_data/convert", server.url()),
            api_key: "test-key".to_string(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_forwards_parameters_and_key() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/currency_data/convert")
            .match_header("apikey", "test-key")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("from".into(), "USD".into()),
                Matcher::UrlEncoded("to".into(), "EUR".into()),
                Matcher::UrlEncoded("amount".into(), "100".into()),
            ]))
            .with_header("content-type", "application/json")
            .with_body(r#"{"success": true, "result": 92.5}"#)
            .create_async()
            .await;

        let result = client_for(&server).convert(&conversion()).await.unwrap();

        assert_eq!(result["result"], 92.5);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_payload_is_forwarded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/currency_data/convert")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message": "Invalid authentication credentials"}"#)
            .create_async()
            .await;

        let result = client_for(&server).convert(&conversion()).await.unwrap();
        assert_eq!(result["message"], "Invalid authentication credentials");
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/currency_data/convert")
            .match_query(Matcher::Any)
            .with_body("<html>gateway timeout</html>")
            .create_async()
            .await;

        let err = client_for(&server).convert(&conversion()).await.unwrap_err();
        assert!(matches!(err, ConversionError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_upstream() {
        let client = CurrencyClient::new(CurrencyApiConfig {
            url: "http://127.0.0.1:1/currency_data/convert".to_string(),
            api_key: "test-key".to_string(),
        })
        .unwrap();

        let err = client.convert(&conversion()).await.unwrap_err();
        assert!(matches!(err, ConversionError::Request(_)));
    }
}
