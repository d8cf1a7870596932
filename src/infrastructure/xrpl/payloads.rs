//! JSON shapes exchanged with a rippled websocket endpoint.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::{XrplError, XrplResult};
use crate::domain::entities::{Memo, ObservedTransaction};
use crate::domain::serde_utils::drops;

#[derive(Debug, Serialize)]
pub struct RpcRequest<'a> {
    pub id: u64,
    pub command: &'a str,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl<'a> RpcRequest<'a> {
    /// Builds a request; `params` must be a JSON object or null.
    ///
    /// # Errors
    /// Returns error if `params` is any other JSON value.
    pub fn new(id: u64, command: &'a str, params: Value) -> XrplResult<Self> {
        let params = match params {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(XrplError::serialization(format!(
                    "{command} parameters must be an object, got {other}"
                )));
            }
        };
        Ok(Self {
            id,
            command,
            params,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub error_exception: Option<String>,
}

impl RpcResponse {
    /// Splits the envelope into its result or its error.
    ///
    /// # Errors
    /// Returns `Rpc` when the server reported an error.
    pub fn into_result(self) -> XrplResult<Value> {
        if let Some(error) = self.error {
            let message = self
                .error_message
                .or(self.error_exception)
                .unwrap_or_else(|| error.clone());
            return Err(XrplError::rpc(error, message));
        }
        if self.status.as_deref() == Some("error") {
            return Err(XrplError::rpc("unknown", "request failed without detail"));
        }
        self.result
            .ok_or_else(|| XrplError::protocol("response carries no result"))
    }
}

/// Decodes a result object into a typed payload.
///
/// # Errors
/// Returns error if the result does not match `T`.
pub fn parse_result<T: DeserializeOwned>(value: Value) -> XrplResult<T> {
    serde_json::from_value(value).map_err(|e| XrplError::protocol(e.to_string()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountInfoResult {
    pub account_data: AccountData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccountData {
    #[serde(rename = "Sequence")]
    pub sequence: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeeResult {
    pub drops: FeeDrops,
    pub ledger_current_index: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeeDrops {
    #[serde(with = "drops")]
    pub base_fee: u64,
    #[serde(with = "drops")]
    pub open_ledger_fee: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmitResult {
    pub engine_result: String,
    #[serde(default)]
    pub engine_result_message: String,
    #[serde(default)]
    pub tx_json: Option<SubmittedJson>,
}

impl SubmitResult {
    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        self.tx_json.as_ref().and_then(|tx| tx.hash.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedJson {
    #[serde(default)]
    pub hash: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxResult {
    #[serde(default)]
    pub validated: bool,
    #[serde(default)]
    pub ledger_index: Option<u32>,
    #[serde(default)]
    pub meta: Option<TxMeta>,
}

impl TxResult {
    #[must_use]
    pub fn transaction_result(&self) -> Option<&str> {
        self.meta.as_ref().map(|meta| meta.transaction_result.as_str())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TxMeta {
    #[serde(rename = "TransactionResult")]
    pub transaction_result: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LedgerResult {
    pub ledger_index: u32,
}

/// Transaction pushed on an `accounts` subscription.
#[derive(Debug, Clone, Deserialize)]
pub struct TransactionStream {
    #[serde(default)]
    pub engine_result: Option<String>,
    #[serde(default)]
    pub validated: bool,
    #[serde(default)]
    pub ledger_index: Option<u32>,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(alias = "tx_json")]
    pub transaction: StreamTransaction,
    #[serde(default)]
    pub meta: Option<TxMeta>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamTransaction {
    #[serde(rename = "Account")]
    pub account: String,
    #[serde(rename = "TransactionType", default)]
    pub transaction_type: String,
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(rename = "Memos", default)]
    pub memos: Vec<MemoWrapper>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MemoWrapper {
    #[serde(rename = "Memo")]
    pub memo: Memo,
}

impl TransactionStream {
    /// Converts the stream payload into the domain view.
    ///
    /// The metadata result wins over `engine_result`, since only the former
    /// is final.
    #[must_use]
    pub fn into_observed(self) -> ObservedTransaction {
        let engine_result = self
            .meta
            .map(|meta| meta.transaction_result)
            .or(self.engine_result);

        ObservedTransaction {
            hash: self.hash.or(self.transaction.hash),
            account: self.transaction.account,
            transaction_type: self.transaction.transaction_type,
            engine_result,
            validated: self.validated,
            ledger_index: self.ledger_index,
            memos: self
                .transaction
                .memos
                .into_iter()
                .map(|wrapper| wrapper.memo)
                .collect(),
        }
    }
}

/// Any message read from the socket.
#[derive(Debug, Clone)]
pub enum IncomingMessage {
    Response(RpcResponse),
    Transaction(Box<TransactionStream>),
    LedgerClosed { ledger_index: Option<u32> },
    Other(String),
}

impl IncomingMessage {
    /// Parses a text frame.
    ///
    /// # Errors
    /// Returns error if the frame is not JSON or a known message is malformed.
    pub fn parse(text: &str) -> XrplResult<Self> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| XrplError::serialization(e.to_string()))?;

        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_owned);

        match kind.as_deref() {
            Some("response") => Ok(Self::Response(parse_result(value)?)),
            None if value.get("id").is_some() => Ok(Self::Response(parse_result(value)?)),
            Some("transaction") => Ok(Self::Transaction(Box::new(parse_result(value)?))),
            Some("ledgerClosed") => Ok(Self::LedgerClosed {
                ledger_index: value
                    .get("ledger_index")
                    .and_then(Value::as_u64)
                    .and_then(|index| u32::try_from(index).ok()),
            }),
            Some(other) => Ok(Self::Other(other.to_string())),
            None => Ok(Self::Other("untyped".to_string())),
        }
    }
}
