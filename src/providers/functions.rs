//! Commodity feeds served by the backend's serverless functions.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::config::{BackendConfig, FunctionNames};
use crate::core::{CommodityHistory, CommodityPrice, HistorySource, PriceSource, Quote, RegionalIndex};

pub struct FunctionsProvider {
    base_url: String,
    api_key: Option<String>,
    functions: FunctionNames,
    client: reqwest::Client,
}

impl FunctionsProvider {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("farmdash/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            functions: config.functions.clone(),
            client,
        })
    }

    /// Invokes a function and decodes its payload. A JSON `null` body is an
    /// absent payload; an object with a non-null `error` field is a failure.
    async fn invoke<T: DeserializeOwned>(&self, function: &str, body: Value) -> Result<Option<T>> {
        let url = format!("{}/functions/v1/{}", self.base_url, function);
        debug!("Invoking function {}", url);

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Request failed for function: {function}"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("HTTP error: {} for function: {}", status, function));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to get response text for function: {function}"))?;

        let payload: Value = serde_json::from_str(&text).with_context(|| {
            format!("Failed to parse response for function: {function}. Response: '{text}'")
        })?;

        if let Some(error) = payload.get("error").filter(|e| !e.is_null()) {
            return Err(anyhow!("Function {} returned error: {}", function, error));
        }

        if payload.is_null() {
            debug!("Function {} returned no data", function);
            return Ok(None);
        }

        serde_json::from_value(payload)
            .map(Some)
            .with_context(|| format!("Unexpected payload shape from function: {function}"))
    }
}

#[async_trait]
impl PriceSource for FunctionsProvider {
    #[instrument(name = "PrimaryListFetch", skip(self))]
    async fn fetch_primary_list(&self) -> Result<Option<Vec<CommodityPrice>>> {
        self.invoke(&self.functions.commodities, json!({})).await
    }

    #[instrument(name = "RegionalIndexFetch", skip(self))]
    async fn fetch_regional_index(&self) -> Result<Option<RegionalIndex>> {
        self.invoke(&self.functions.regional_index, json!({})).await
    }

    #[instrument(name = "CurrencyFetch", skip(self))]
    async fn fetch_currency(&self) -> Result<Option<Quote>> {
        self.invoke(&self.functions.currency, json!({})).await
    }
}

#[async_trait]
impl HistorySource for FunctionsProvider {
    #[instrument(name = "HistoryFetch", skip(self))]
    async fn fetch_history(&self, days: u32) -> Result<Vec<CommodityHistory>> {
        self.invoke(&self.functions.history, json!({ "days": days }))
            .await?
            .ok_or_else(|| anyhow!("No history data returned for {} days", days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Trend;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const COMMODITIES_JSON: &str = r#"[
        {"name":"Soja","price":150.0,"unit":"saca 60kg","change":0.2,"trend":"up","icon":"🌱","lastUpdate":"2025-06-30T12:00:00Z"},
        {"name":"Dólar","price":5.0,"unit":"R$","change":-0.1,"trend":"down","icon":"💵","lastUpdate":"2025-06-30T12:00:00Z"}
    ]"#;

    async fn create_function_mock(function: &str, status_code: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(format!("/functions/v1/{function}")))
            .respond_with(ResponseTemplate::new(status_code).set_body_string(body))
            .mount(&mock_server)
            .await;

        mock_server
    }

    fn provider_for(server: &MockServer, api_key: Option<&str>) -> FunctionsProvider {
        FunctionsProvider::new(&BackendConfig {
            base_url: format!("{}/", server.uri()),
            api_key: api_key.map(str::to_string),
            timeout_secs: 5,
            functions: FunctionNames::default(),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_primary_list() {
        let server = create_function_mock("get-commodities", 200, COMMODITIES_JSON).await;
        let provider = provider_for(&server, None);

        let list = provider.fetch_primary_list().await.unwrap().unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].name, "Soja");
        assert_eq!(list[1].trend, Trend::Down);
    }

    #[tokio::test]
    async fn test_api_key_headers_are_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/get-dollar-price"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"price":5.41,"change":0.3,"trend":"up","source":"BCB"}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, Some("anon-key"));
        let quote = provider.fetch_currency().await.unwrap().unwrap();
        assert_eq!(quote.price, 5.41);
        assert_eq!(quote.source.as_deref(), Some("BCB"));
    }

    #[tokio::test]
    async fn test_fetch_regional_index() {
        let body = r#"{
            "soja": {"price":160.0,"change":1.1,"trend":"up","source":"CEPEA - Paraná"},
            "milho": {"price":91.0,"change":-0.7,"trend":"down","source":"CEPEA - Paraná"}
        }"#;
        let server = create_function_mock("get-cepea-prices", 200, body).await;
        let provider = provider_for(&server, None);

        let index = provider.fetch_regional_index().await.unwrap().unwrap();
        assert_eq!(index.soy.unwrap().price, 160.0);
        assert_eq!(index.corn.unwrap().trend, Trend::Down);
        assert!(index.milk.is_none());
    }

    #[tokio::test]
    async fn test_null_body_is_absent() {
        let server = create_function_mock("get-cepea-prices", 200, "null").await;
        let provider = provider_for(&server, None);

        assert!(provider.fetch_regional_index().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_http_error_is_failure() {
        let server = create_function_mock("get-commodities", 500, "internal error").await;
        let provider = provider_for(&server, None);

        let err = provider.fetch_primary_list().await.unwrap_err();
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn test_error_field_is_failure() {
        let server =
            create_function_mock("get-dollar-price", 200, r#"{"error":"quota exceeded"}"#).await;
        let provider = provider_for(&server, None);

        let err = provider.fetch_currency().await.unwrap_err();
        assert!(err.to_string().contains("quota exceeded"));
    }

    #[tokio::test]
    async fn test_malformed_body_is_failure() {
        let server = create_function_mock("get-commodities", 200, "<html>oops</html>").await;
        let provider = provider_for(&server, None);

        assert!(provider.fetch_primary_list().await.is_err());
    }

    #[tokio::test]
    async fn test_fetch_history_sends_days() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/v1/get-commodity-history"))
            .and(body_json(json!({ "days": 2 })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[
                    {"date":"2025-06-29","soja":158.0,"milho":89.0,"leite":2.5,"boiGordo":310.0,"dolar":5.2},
                    {"date":"2025-06-30","soja":159.0,"milho":88.0,"leite":2.6,"boiGordo":311.0,"dolar":5.3}
                ]"#,
            ))
            .mount(&server)
            .await;

        let provider = provider_for(&server, None);
        let history = provider.fetch_history(2).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].date.to_string(), "2025-06-30");
        assert_eq!(history[0].cattle, 310.0);
    }

    #[tokio::test]
    async fn test_history_null_is_failure() {
        let server = create_function_mock("get-commodity-history", 200, "null").await;
        let provider = provider_for(&server, None);

        assert!(provider.fetch_history(5).await.is_err());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_failure() {
        let provider = FunctionsProvider::new(&BackendConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            api_key: None,
            timeout_secs: 1,
            functions: FunctionNames::default(),
        })
        .unwrap();

        assert!(provider.fetch_primary_list().await.is_err());
    }
}
