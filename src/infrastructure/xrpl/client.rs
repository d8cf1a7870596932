//! Ledger sessions that sign locally and submit over a websocket.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info, warn};

use super::codec::{self, PreparedTransaction};
use super::connection::{RpcTransport, WebSocketConnection};
use super::constants::{
    CONNECTION_TIMEOUT, ERROR_TXN_NOT_FOUND, EngineResultClass, RESULT_SUCCESS,
    TF_FULLY_CANONICAL_SIG,
};
use super::error::{XrplError, XrplResult};
use super::payloads::{
    AccountInfoResult, FeeResult, LedgerResult, SubmitResult, TxResult, parse_result,
};
use crate::domain::entities::{
    AccountAddress, Credentials, Drops, SubmittedTransaction, TransactionRequest, TxHash,
};
use crate::domain::errors::DispatchError;
use crate::domain::ports::{LedgerPort, LedgerSession};
use crate::infrastructure::config::LedgerConfig;

/// Settings shared by every session a connector opens.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub endpoint: String,
    pub connect_timeout: Duration,
    pub ledger_offset: u32,
    pub max_fee: Drops,
    pub wait_for_validation: bool,
    pub poll_interval: Duration,
}

impl From<&LedgerConfig> for SessionConfig {
    fn from(config: &LedgerConfig) -> Self {
        Self {
            endpoint: config.endpoint.clone(),
            connect_timeout: CONNECTION_TIMEOUT.min(config.timeout()),
            ledger_offset: config.ledger_offset,
            max_fee: Drops(config.max_fee_drops),
            wait_for_validation: config.wait_for_validation,
            poll_interval: config.poll_interval(),
        }
    }
}

/// Opens one websocket session per dispatch.
pub struct XrplConnector {
    config: SessionConfig,
}

impl XrplConnector {
    #[must_use]
    pub const fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl LedgerPort for XrplConnector {
    async fn open_session(&self) -> Result<Box<dyn LedgerSession>, DispatchError> {
        let connection =
            WebSocketConnection::connect(&self.config.endpoint, self.config.connect_timeout)
                .await
                .map_err(|e| DispatchError::connection(e.to_string()))?;

        Ok(Box::new(XrplSession::new(connection, self.config.clone())))
    }

    fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

pub struct XrplSession<T> {
    transport: T,
    config: SessionConfig,
    closed: bool,
}

impl<T: RpcTransport> XrplSession<T> {
    pub const fn new(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            config,
            closed: false,
        }
    }

    async fn account_sequence(&mut self, account: &AccountAddress) -> XrplResult<u32> {
        let value = self
            .transport
            .request(
                "account_info",
                json!({ "account": account.as_str(), "ledger_index": "current" }),
            )
            .await?;
        Ok(parse_result::<AccountInfoResult>(value)?.account_data.sequence)
    }

    async fn current_fee(&mut self) -> XrplResult<FeeResult> {
        let value = self.transport.request("fee", json!({})).await?;
        parse_result(value)
    }

    async fn validated_ledger(&mut self) -> XrplResult<u32> {
        let value = self
            .transport
            .request("ledger", json!({ "ledger_index": "validated" }))
            .await?;
        Ok(parse_result::<LedgerResult>(value)?.ledger_index)
    }

    /// Fills in sequence, fee and expiry for `request`.
    ///
    /// # Errors
    /// Returns `FeeTooHigh` if the open ledger fee exceeds the configured cap.
    pub async fn prepare(
        &mut self,
        request: &TransactionRequest,
        signing_pub_key: Vec<u8>,
    ) -> XrplResult<PreparedTransaction> {
        let sequence = self.account_sequence(&request.account).await?;
        let fee = self.current_fee().await?;

        let fee_drops = fee.drops.open_ledger_fee.max(fee.drops.base_fee);
        if fee_drops > self.config.max_fee.get() {
            return Err(XrplError::FeeTooHigh {
                fee: fee_drops,
                max: self.config.max_fee.get(),
            });
        }

        let last_ledger_sequence = fee.ledger_current_index + self.config.ledger_offset;
        debug!(sequence, fee = fee_drops, last_ledger_sequence, "Transaction autofilled");

        Ok(PreparedTransaction {
            transaction_type: request.transaction_type,
            flags: TF_FULLY_CANONICAL_SIG,
            account: request.account.clone(),
            destination: request.destination.clone(),
            amount: request.amount,
            fee: Drops(fee_drops),
            sequence,
            last_ledger_sequence,
            destination_tag: request.destination_tag,
            signing_pub_key,
            memos: request.memos.clone(),
        })
    }

    async fn submit(&mut self, blob: &[u8]) -> XrplResult<SubmitResult> {
        let value = self
            .transport
            .request("submit", json!({ "tx_blob": hex::encode_upper(blob) }))
            .await?;
        parse_result(value)
    }

    /// Polls `tx` until the transaction is in a validated ledger.
    ///
    /// # Errors
    /// Returns `Expired` once the validated ledger passes
    /// `last_ledger_sequence` without the transaction.
    async fn await_validation(
        &mut self,
        hash: &TxHash,
        last_ledger_sequence: u32,
    ) -> XrplResult<TxResult> {
        loop {
            tokio::time::sleep(self.config.poll_interval).await;

            match self
                .transport
                .request("tx", json!({ "transaction": hash.as_str(), "binary": false }))
                .await
            {
                Ok(value) => {
                    let tx: TxResult = parse_result(value)?;
                    if tx.validated {
                        return Ok(tx);
                    }
                }
                Err(e) if e.rpc_error() == Some(ERROR_TXN_NOT_FOUND) => {}
                Err(e) => return Err(e),
            }

            let validated = self.validated_ledger().await?;
            if validated > last_ledger_sequence {
                return Err(XrplError::Expired {
                    last_ledger_sequence,
                });
            }
            debug!(hash = %hash.short(), validated, "Waiting for validation");
        }
    }

    async fn run(
        &mut self,
        request: &TransactionRequest,
        credentials: &Credentials,
    ) -> XrplResult<SubmittedTransaction> {
        let keypair = credentials.keypair().map_err(|e| XrplError::Signing {
            message: e.to_string(),
        })?;

        let prepared = self.prepare(request, keypair.public_key().to_vec()).await?;
        let signature = keypair
            .sign(&codec::signing_payload(&prepared)?)
            .map_err(|e| XrplError::Signing {
                message: e.to_string(),
            })?;
        let blob = codec::encode_signed(&prepared, &signature)?;
        let local_hash = codec::transaction_id(&blob);

        let submitted = self.submit(&blob).await?;
        let hash = match submitted.hash().and_then(TxHash::new) {
            Some(hash) => {
                if hash != local_hash {
                    warn!(server = %hash, local = %local_hash, "Server hash differs from local hash");
                }
                hash
            }
            None => local_hash,
        };

        info!(
            hash = %hash,
            engine_result = %submitted.engine_result,
            "Transaction submitted"
        );

        let class = EngineResultClass::of(&submitted.engine_result);
        let wait = self.config.wait_for_validation;
        if class == EngineResultClass::Rejected
            || (!wait && class != EngineResultClass::Provisional)
        {
            return Err(XrplError::rejected(
                submitted.engine_result,
                submitted.engine_result_message,
            ));
        }

        if !wait {
            return Ok(SubmittedTransaction {
                hash,
                engine_result: submitted.engine_result,
                ledger_index: None,
            });
        }

        let validated = self
            .await_validation(&hash, prepared.last_ledger_sequence)
            .await?;
        let result = validated
            .transaction_result()
            .unwrap_or(submitted.engine_result.as_str())
            .to_string();

        if result != RESULT_SUCCESS {
            return Err(XrplError::rejected(
                result,
                "transaction failed in a validated ledger",
            ));
        }

        Ok(SubmittedTransaction {
            hash,
            engine_result: result,
            ledger_index: validated.ledger_index,
        })
    }
}

#[async_trait]
impl<T: RpcTransport + 'static> LedgerSession for XrplSession<T> {
    async fn sign_and_submit(
        &mut self,
        request: &TransactionRequest,
        credentials: &Credentials,
    ) -> Result<SubmittedTransaction, DispatchError> {
        self.run(request, credentials).await.map_err(Into::into)
    }

    async fn close(&mut self) {
        if !self.closed {
            self.transport.close().await;
            self.closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AccountSecret, Command, PaymentRoute};
    use crate::domain::errors::DispatchErrorKind;
    use serde_json::Value;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    const SERVER_HASH: &str = "ABABABABABABABABABABABABABABABABABABABABABABABABABABABABABABABAB";

    type Requests = Arc<Mutex<Vec<(String, Value)>>>;

    struct ScriptedTransport {
        replies: VecDeque<(&'static str, XrplResult<Value>)>,
        requests: Requests,
        closes: Arc<Mutex<usize>>,
    }

    #[async_trait]
    impl RpcTransport for ScriptedTransport {
        async fn request(&mut self, command: &str, params: Value) -> XrplResult<Value> {
            self.requests
                .lock()
                .unwrap()
                .push((command.to_string(), params));
            let (expected, reply) = self
                .replies
                .pop_front()
                .unwrap_or_else(|| panic!("unexpected request {command}"));
            assert_eq!(expected, command);
            reply
        }

        async fn close(&mut self) {
            *self.closes.lock().unwrap() += 1;
        }
    }

    fn config(wait_for_validation: bool) -> SessionConfig {
        SessionConfig {
            endpoint: "wss://scripted.invalid".to_string(),
            connect_timeout: Duration::from_secs(1),
            ledger_offset: 20,
            max_fee: Drops(2_000),
            wait_for_validation,
            poll_interval: Duration::from_millis(1),
        }
    }

    fn session(
        replies: Vec<(&'static str, XrplResult<Value>)>,
        wait_for_validation: bool,
    ) -> (XrplSession<ScriptedTransport>, Requests, Arc<Mutex<usize>>) {
        let requests = Requests::default();
        let closes = Arc::new(Mutex::new(0));
        let transport = ScriptedTransport {
            replies: replies.into(),
            requests: Arc::clone(&requests),
            closes: Arc::clone(&closes),
        };
        (
            XrplSession::new(transport, config(wait_for_validation)),
            requests,
            closes,
        )
    }

    fn credentials() -> Credentials {
        let secret = AccountSecret::parse("snoPBrXtMeMyMHUVTgbuqAfg1SUTb").unwrap();
        Credentials::new(secret, None).unwrap()
    }

    fn request(credentials: &Credentials) -> TransactionRequest {
        let route = PaymentRoute {
            source: credentials.address().clone(),
            destination: AccountAddress::from_account_id([2u8; 20]),
            amount: Drops(100),
            destination_tag: None,
        };
        TransactionRequest::command_payment(&route, &Command::new("turn_on").unwrap())
    }

    fn account_info() -> (&'static str, XrplResult<Value>) {
        ("account_info", Ok(json!({"account_data": {"Sequence": 5}})))
    }

    fn fee(open_ledger_fee: &str) -> (&'static str, XrplResult<Value>) {
        (
            "fee",
            Ok(json!({
                "drops": {"base_fee": "10", "open_ledger_fee": open_ledger_fee},
                "ledger_current_index": 100
            })),
        )
    }

    fn submit(engine_result: &str) -> (&'static str, XrplResult<Value>) {
        (
            "submit",
            Ok(json!({
                "engine_result": engine_result,
                "engine_result_message": "scripted",
                "tx_json": {"hash": SERVER_HASH}
            })),
        )
    }

    fn not_found() -> (&'static str, XrplResult<Value>) {
        ("tx", Err(XrplError::rpc("txnNotFound", "Transaction not found.")))
    }

    fn validated(result: &str) -> (&'static str, XrplResult<Value>) {
        (
            "tx",
            Ok(json!({"validated": true, "ledger_index": 102, "meta": {"TransactionResult": result}})),
        )
    }

    #[tokio::test]
    async fn test_submits_and_waits_for_validation() {
        let creds = credentials();
        let (mut session, requests, _) = session(
            vec![
                account_info(),
                fee("12"),
                submit("tesSUCCESS"),
                not_found(),
                ("ledger", Ok(json!({"ledger_index": 101}))),
                validated("tesSUCCESS"),
            ],
            true,
        );

        let submitted = session
            .sign_and_submit(&request(&creds), &creds)
            .await
            .unwrap();

        assert_eq!(submitted.hash.as_str(), SERVER_HASH);
        assert_eq!(submitted.engine_result, "tesSUCCESS");
        assert_eq!(submitted.ledger_index, Some(102));

        let requests = requests.lock().unwrap();
        assert_eq!(requests[0].1["account"], creds.address().as_str());
        let blob = hex::decode(requests[2].1["tx_blob"].as_str().unwrap()).unwrap();
        assert_eq!(&blob[8..13], &[0x24, 0, 0, 0, 5]);
        assert_eq!(&blob[13..19], &[0x20, 0x1B, 0, 0, 0, 120]);
        assert_eq!(&blob[28..37], &[0x68, 0x40, 0, 0, 0, 0, 0, 0, 12]);
        assert_eq!(requests[3].1["transaction"], SERVER_HASH);
    }

    #[tokio::test]
    async fn test_fee_above_cap_is_not_submitted() {
        let creds = credentials();
        let (mut session, requests, _) = session(vec![account_info(), fee("5000")], true);

        let err = session
            .sign_and_submit(&request(&creds), &creds)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), DispatchErrorKind::Sign);
        assert!(err.to_string().contains("5000"));
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_malformed_rejected_immediately() {
        let creds = credentials();
        let (mut session, _, _) =
            session(vec![account_info(), fee("12"), submit("temBAD_AMOUNT")], true);

        let err = session
            .sign_and_submit(&request(&creds), &creds)
            .await
            .unwrap_err();

        assert_eq!(err.engine_result(), Some("temBAD_AMOUNT"));
    }

    #[tokio::test]
    async fn test_provisional_result_without_waiting() {
        let creds = credentials();
        let (mut session, _, _) =
            session(vec![account_info(), fee("12"), submit("terQUEUED")], false);

        let submitted = session
            .sign_and_submit(&request(&creds), &creds)
            .await
            .unwrap();

        assert_eq!(submitted.engine_result, "terQUEUED");
        assert_eq!(submitted.ledger_index, None);
    }

    #[tokio::test]
    async fn test_claimed_fee_rejected_without_waiting() {
        let creds = credentials();
        let (mut session, _, _) =
            session(vec![account_info(), fee("12"), submit("tecNO_DST_INSUF_XRP")], false);

        let err = session
            .sign_and_submit(&request(&creds), &creds)
            .await
            .unwrap_err();

        assert_eq!(err.engine_result(), Some("tecNO_DST_INSUF_XRP"));
    }

    #[tokio::test]
    async fn test_failed_validated_result_is_rejection() {
        let creds = credentials();
        let (mut session, _, _) = session(
            vec![
                account_info(),
                fee("12"),
                submit("tesSUCCESS"),
                validated("tecUNFUNDED_PAYMENT"),
            ],
            true,
        );

        let err = session
            .sign_and_submit(&request(&creds), &creds)
            .await
            .unwrap_err();

        assert_eq!(err.engine_result(), Some("tecUNFUNDED_PAYMENT"));
    }

    #[tokio::test]
    async fn test_expires_after_last_ledger_sequence() {
        let creds = credentials();
        let (mut session, _, _) = session(
            vec![
                account_info(),
                fee("12"),
                submit("tesSUCCESS"),
                not_found(),
                ("ledger", Ok(json!({"ledger_index": 121}))),
            ],
            true,
        );

        let err = session
            .sign_and_submit(&request(&creds), &creds)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), DispatchErrorKind::Sign);
        assert!(err.to_string().contains("expired"));
    }

    #[tokio::test]
    async fn test_unknown_account_is_sign_failure() {
        let creds = credentials();
        let (mut session, _, _) = session(
            vec![(
                "account_info",
                Err(XrplError::rpc("actNotFound", "Account not found.")),
            )],
            true,
        );

        let err = session
            .sign_and_submit(&request(&creds), &creds)
            .await
            .unwrap_err();

        assert_eq!(err.kind(), DispatchErrorKind::Sign);
        assert!(err.to_string().contains("actNotFound"));
    }

    #[tokio::test]
    async fn test_close_is_idempotent() {
        let (mut session, _, closes) = session(Vec::new(), true);

        session.close().await;
        session.close().await;

        assert_eq!(*closes.lock().unwrap(), 1);
    }
}
