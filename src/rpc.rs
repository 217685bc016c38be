//! Sui full-node client
//!
//! Only the four JSON-RPC methods the SDK needs:
//! 1. `sui_devInspectTransactionBlock` - dry runs
//! 2. `sui_multiGetObjects` - resolving object inputs
//! 3. `suix_getCoins` - picking the user's coins
//! 4. `suix_getReferenceGasPrice`
//!
//! Requests are plain futures; dropping one cancels the HTTP call.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::error::{Result, SdkError};
use crate::ptb::{ObjectDigest, ObjectId};

// ============================================
// ENDPOINTS
// ============================================

/// Public full-node endpoints
pub struct SuiEndpoints;

impl SuiEndpoints {
    pub const MAINNET: &'static str = "https://fullnode.mainnet.sui.io:443";
    pub const TESTNET: &'static str = "https://fullnode.testnet.sui.io:443";
    pub const DEVNET: &'static str = "https://fullnode.devnet.sui.io:443";
}

/// Page size for `suix_getCoins`
const COINS_PAGE_LIMIT: u64 = 50;

// ============================================
// WIRE TYPES
// ============================================

/// Sui serialises u64 as a JSON string; accept both forms
fn u64_from_str_or_num<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(u64),
        Str(String),
    }
    match Raw::deserialize(deserializer)? {
        Raw::Num(n) => Ok(n),
        Raw::Str(s) => s.parse().map_err(serde::de::Error::custom),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Effects {
    pub status: ExecutionStatus,
}

/// Event emitted during a dry run; only the parsed payload is used
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiEvent {
    #[serde(rename = "type", default)]
    pub event_type: String,
    #[serde(default)]
    pub parsed_json: Value,
}

/// Return values of one command: (BCS bytes, Move type)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    #[serde(default)]
    pub return_values: Vec<(Vec<u8>, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevInspectResults {
    #[serde(default)]
    pub effects: Effects,
    #[serde(default)]
    pub events: Vec<SuiEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<ExecutionResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    AddressOwner(String),
    ObjectOwner(String),
    Shared {
        #[serde(deserialize_with = "u64_from_str_or_num")]
        initial_shared_version: u64,
    },
    Immutable,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectInfo {
    pub object_id: ObjectId,
    pub version: u64,
    pub digest: ObjectDigest,
    pub owner: Owner,
    pub object_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObjectResponse {
    data: Option<RawObjectData>,
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawObjectData {
    object_id: String,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    version: u64,
    digest: String,
    #[serde(rename = "type")]
    object_type: Option<String>,
    owner: Option<Owner>,
}

impl RawObjectData {
    fn into_info(self) -> Result<ObjectInfo> {
        let object_id = ObjectId::from_str(&self.object_id)?;
        let owner = self
            .owner
            .ok_or_else(|| SdkError::Rpc(format!("object {} returned without owner", object_id)))?;
        Ok(ObjectInfo {
            object_id,
            version: self.version,
            digest: ObjectDigest::from_base58(&self.digest)?,
            owner,
            object_type: self.object_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinObject {
    pub coin_type: String,
    pub coin_object_id: String,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub version: u64,
    pub digest: String,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub balance: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CoinPage {
    data: Vec<CoinObject>,
    next_cursor: Option<String>,
    #[serde(default)]
    has_next_page: bool,
}

// ============================================
// NODE CLIENT
// ============================================

/// The node operations the SDK depends on
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Simulate `tx_bytes` (base64 BCS `TransactionKind`) as `sender`
    async fn dev_inspect(&self, sender: &ObjectId, tx_bytes: &str) -> Result<DevInspectResults>;

    async fn multi_get_objects(&self, ids: &[ObjectId]) -> Result<Vec<ObjectInfo>>;

    /// Every coin of `coin_type` owned by `owner`, all pages
    async fn get_coins(&self, owner: &ObjectId, coin_type: &str) -> Result<Vec<CoinObject>>;

    async fn reference_gas_price(&self) -> Result<u64>;
}

/// JSON-RPC 2.0 client over HTTP
pub struct SuiRpcClient {
    http_client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl SuiRpcClient {
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            rpc_url: rpc_url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.sui_rpc_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let request = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });

        trace!("→ {} #{}", method, id);

        let response = self
            .http_client
            .post(&self.rpc_url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        debug!("{} #{} responded with HTTP {}", method, id, status);

        if let Some(error) = body.get("error") {
            let code = error.get("code").and_then(|v| v.as_i64()).unwrap_or(-1);
            let message = error
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("Unknown error");
            return Err(SdkError::Rpc(format!("{} failed ({}): {}", method, code, message)));
        }

        let result = body
            .get("result")
            .cloned()
            .ok_or_else(|| SdkError::Rpc(format!("{} returned no result", method)))?;

        serde_json::from_value(result)
            .map_err(|e| SdkError::Rpc(format!("{} returned an unexpected shape: {}", method, e)))
    }
}

#[async_trait]
impl NodeClient for SuiRpcClient {
    async fn dev_inspect(&self, sender: &ObjectId, tx_bytes: &str) -> Result<DevInspectResults> {
        self.call(
            "sui_devInspectTransactionBlock",
            json!([sender.to_string(), tx_bytes]),
        )
        .await
    }

    async fn multi_get_objects(&self, ids: &[ObjectId]) -> Result<Vec<ObjectInfo>> {
        let ids: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
        let responses: Vec<RawObjectResponse> = self
            .call(
                "sui_multiGetObjects",
                json!([ids, { "showOwner": true, "showType": true }]),
            )
            .await?;

        let mut objects = Vec::with_capacity(responses.len());
        for response in responses {
            match response.data {
                Some(data) => objects.push(data.into_info()?),
                None => warn!("Object lookup returned an error: {:?}", response.error),
            }
        }
        Ok(objects)
    }

    async fn get_coins(&self, owner: &ObjectId, coin_type: &str) -> Result<Vec<CoinObject>> {
        let mut coins = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let page: CoinPage = self
                .call(
                    "suix_getCoins",
                    json!([owner.to_string(), coin_type, cursor, COINS_PAGE_LIMIT]),
                )
                .await?;
            coins.extend(page.data);

            match page.next_cursor {
                Some(next) if page.has_next_page => cursor = Some(next),
                _ => break,
            }
        }

        debug!("Found {} coins of {} for {}", coins.len(), coin_type, owner);
        Ok(coins)
    }

    async fn reference_gas_price(&self) -> Result<u64> {
        let raw: Value = self.call("suix_getReferenceGasPrice", json!([])).await?;
        match raw {
            Value::String(s) => s
                .parse()
                .map_err(|e| SdkError::Rpc(format!("invalid gas price '{}': {}", s, e))),
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| SdkError::Rpc(format!("invalid gas price {}", n))),
            other => Err(SdkError::Rpc(format!("invalid gas price {}", other))),
        }
    }
}

// ============================================
// TEST DOUBLE
// ============================================

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Scripted node: objects and coins are static, dev-inspect answers are
    /// popped in order (the last one repeats once the script runs out)
    #[derive(Default)]
    pub struct MockNode {
        objects: HashMap<ObjectId, ObjectInfo>,
        coins: Vec<CoinObject>,
        script: Mutex<VecDeque<std::result::Result<DevInspectResults, String>>>,
        auto_share: bool,
        pub inspected: Mutex<Vec<String>>,
    }

    impl MockNode {
        /// Unknown ids resolve as shared objects instead of being missing
        pub fn auto_shared(mut self) -> Self {
            self.auto_share = true;
            self
        }

        pub fn with_object(mut self, info: ObjectInfo) -> Self {
            self.objects.insert(info.object_id, info);
            self
        }

        pub fn with_coin(mut self, coin: CoinObject) -> Self {
            self.coins.push(coin);
            self
        }

        pub fn respond(self, results: DevInspectResults) -> Self {
            self.script.lock().unwrap().push_back(Ok(results));
            self
        }

        pub fn respond_json(self, raw: Value) -> Self {
            let results = serde_json::from_value(raw).unwrap();
            self.respond(results)
        }

        pub fn fail(self, message: &str) -> Self {
            self.script.lock().unwrap().push_back(Err(message.to_string()));
            self
        }

        pub fn inspect_count(&self) -> usize {
            self.inspected.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl NodeClient for MockNode {
        async fn dev_inspect(&self, _sender: &ObjectId, tx_bytes: &str) -> Result<DevInspectResults> {
            self.inspected.lock().unwrap().push(tx_bytes.to_string());
            let mut script = self.script.lock().unwrap();
            let next = if script.len() > 1 { script.pop_front() } else { script.front().cloned() };
            match next {
                Some(Ok(results)) => Ok(results),
                Some(Err(message)) => Err(SdkError::Rpc(message)),
                None => Err(SdkError::Rpc("no scripted response".into())),
            }
        }

        async fn multi_get_objects(&self, ids: &[ObjectId]) -> Result<Vec<ObjectInfo>> {
            Ok(ids
                .iter()
                .filter_map(|id| match self.objects.get(id) {
                    Some(info) => Some(info.clone()),
                    None if self.auto_share => Some(ObjectInfo {
                        object_id: *id,
                        version: 1,
                        digest: ObjectDigest::new([0u8; 32]),
                        owner: Owner::Shared { initial_shared_version: 1 },
                        object_type: None,
                    }),
                    None => None,
                })
                .collect())
        }

        async fn get_coins(&self, _owner: &ObjectId, coin_type: &str) -> Result<Vec<CoinObject>> {
            Ok(self.coins.iter().filter(|c| c.coin_type == coin_type).cloned().collect())
        }

        async fn reference_gas_price(&self) -> Result<u64> {
            Ok(1000)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dev_inspect_shape() {
        let raw = json!({
            "effects": { "status": { "status": "success" }, "gasUsed": {} },
            "events": [{ "type": "0x1::m::E", "parsedJson": { "lp_amount": "7" } }],
            "results": [{ "returnValues": [[[1, 0, 0, 0, 0, 0, 0, 0], "u64"]] }]
        });
        let parsed: DevInspectResults = serde_json::from_value(raw).unwrap();
        assert!(parsed.effects.status.is_success());
        assert_eq!(parsed.events[0].parsed_json["lp_amount"], "7");
        let results = parsed.results.unwrap();
        assert_eq!(results[0].return_values[0].1, "u64");
        assert_eq!(results[0].return_values[0].0[0], 1);
    }

    #[test]
    fn test_failure_status_shape() {
        let raw = json!({
            "effects": { "status": { "status": "failure", "error": "MoveAbort(..., 3) in command 2" } },
            "events": [],
            "error": "MoveAbort(..., 3) in command 2"
        });
        let parsed: DevInspectResults = serde_json::from_value(raw).unwrap();
        assert!(!parsed.effects.status.is_success());
        assert!(parsed.results.is_none());
        assert!(parsed.error.unwrap().contains("MoveAbort"));
    }

    #[test]
    fn test_owner_variants() {
        let shared: Owner = serde_json::from_value(json!({ "Shared": { "initial_shared_version": 42 } })).unwrap();
        assert_eq!(shared, Owner::Shared { initial_shared_version: 42 });

        let shared_str: Owner =
            serde_json::from_value(json!({ "Shared": { "initial_shared_version": "42" } })).unwrap();
        assert_eq!(shared_str, shared);

        let immutable: Owner = serde_json::from_value(json!("Immutable")).unwrap();
        assert_eq!(immutable, Owner::Immutable);

        let owned: Owner = serde_json::from_value(json!({ "AddressOwner": "0x1" })).unwrap();
        assert_eq!(owned, Owner::AddressOwner("0x1".into()));
    }

    #[test]
    fn test_object_data_conversion() {
        let digest = ObjectDigest::new([3u8; 32]);
        let raw: RawObjectData = serde_json::from_value(json!({
            "objectId": "0x44",
            "version": "17",
            "digest": digest.to_base58(),
            "type": "0x2::coin::Coin<0x2::sui::SUI>",
            "owner": { "AddressOwner": "0x1" }
        }))
        .unwrap();
        let info = raw.into_info().unwrap();
        assert_eq!(info.object_id, ObjectId::from_u8(0x44));
        assert_eq!(info.version, 17);
        assert_eq!(info.digest, digest);
    }

    #[test]
    fn test_coin_page_shape() {
        let page: CoinPage = serde_json::from_value(json!({
            "data": [{
                "coinType": "0x2::sui::SUI",
                "coinObjectId": "0x9",
                "version": "3",
                "digest": "11111111111111111111111111111111",
                "balance": "1000000000"
            }],
            "nextCursor": "0x9",
            "hasNextPage": false
        }))
        .unwrap();
        assert_eq!(page.data[0].balance, 1_000_000_000);
        assert!(!page.has_next_page);
    }
}
