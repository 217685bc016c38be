//! Off-chain market API
//!
//! Read-only JSON over HTTPS. Every response is wrapped in
//! `{ "code": 0, "msg": "...", "data": ... }`; a non-zero code is an error.
//! Shapes are taken as given, not validated against a schema.

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

use crate::config::Config;
use crate::constants::normalize_type;
use crate::error::{Result, SdkError};
use crate::market::CoinConfig;

#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    msg: String,
    #[serde(default)]
    data: Value,
}

fn unwrap_envelope<T: DeserializeOwned>(body: Value, endpoint: &str) -> Result<T> {
    let envelope: Envelope = serde_json::from_value(body)
        .map_err(|e| SdkError::Api(format!("{}: malformed response: {}", endpoint, e)))?;
    if envelope.code != 0 {
        return Err(SdkError::Api(format!(
            "{}: code {}: {}",
            endpoint, envelope.code, envelope.msg
        )));
    }
    serde_json::from_value(envelope.data)
        .map_err(|e| SdkError::Api(format!("{}: unexpected data: {}", endpoint, e)))
}

pub struct ApiClient {
    http_client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .http_client
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| SdkError::Api(format!("{}: {}", path, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SdkError::Api(format!("{}: HTTP {}", path, status)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| SdkError::Api(format!("{}: {}", path, e)))?;
        unwrap_envelope(body, path)
    }

    /// Every listed market
    pub async fn list_coin_configs(&self) -> Result<Vec<CoinConfig>> {
        let configs: Vec<CoinConfig> = self.get("/api/v1/market/coinInfo", &[]).await?;
        info!("📋 Loaded {} market configs", configs.len());
        Ok(configs)
    }

    /// One market by coin type, optionally pinned to a maturity
    pub async fn get_coin_config(&self, coin_type: &str, maturity: Option<&str>) -> Result<CoinConfig> {
        let mut query = vec![("coinType", coin_type)];
        if let Some(m) = maturity {
            query.push(("maturity", m));
        }
        self.get("/api/v1/market/coinInfo/detail", &query).await
    }
}

/// Pick a market out of a listing by coin type (short or full form) and
/// optional maturity
pub fn find_market<'a>(
    configs: &'a [CoinConfig],
    coin_type: &str,
    maturity: Option<&str>,
) -> Option<&'a CoinConfig> {
    let wanted = normalize_type(coin_type);
    configs.iter().find(|c| {
        normalize_type(&c.coin_type) == wanted && maturity.map(|m| c.maturity == m).unwrap_or(true)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::fixtures::hasui_config;
    use serde_json::json;

    #[test]
    fn test_envelope_success() {
        let cfg = hasui_config();
        let body = json!({ "code": 0, "msg": "ok", "data": [serde_json::to_value(&cfg).unwrap()] });
        let configs: Vec<CoinConfig> = unwrap_envelope(body, "/x").unwrap();
        assert_eq!(configs, vec![cfg]);
    }

    #[test]
    fn test_envelope_error_code() {
        let body = json!({ "code": 500, "msg": "maintenance", "data": null });
        let err = unwrap_envelope::<Vec<CoinConfig>>(body, "/x").unwrap_err();
        assert_eq!(err.to_string(), "api error: /x: code 500: maintenance");
    }

    #[test]
    fn test_find_market_by_type_and_maturity() {
        let a = hasui_config();
        let mut b = hasui_config();
        b.maturity = "1800000000000".into();
        let configs = vec![a.clone(), b.clone()];

        assert_eq!(find_market(&configs, &a.coin_type, None), Some(&a));
        assert_eq!(find_market(&configs, &a.coin_type, Some("1800000000000")), Some(&b));
        assert_eq!(find_market(&configs, "0x2::sui::SUI", None), None);
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = ApiClient::new("https://api.example.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "https://api.example.com");
    }
}
