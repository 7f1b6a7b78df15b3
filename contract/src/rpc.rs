//! HTTP client for a JSON gateway fronting the election contract.
//!
//! Every operation is a `POST` of `{"action": ..., "from": <caller>, ...}` to
//! the gateway URL. The gateway answers `{"result": ...}` on success or
//! `{"error": <raw failure>}` when the contract or wallet rejected the call.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use evote_types::{Candidate, Identity, Ordinal, SessionPhase, Timestamp, VoteRecord, WinnerResult};

use crate::call::{LedgerCall, PendingTx, Receipt};
use crate::error::LedgerError;
use crate::failure::RawFailure;
use crate::ledger::{ElectionLedger, LedgerConnector};

/// Default timeout for gateway requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Error code a gateway uses when the contract lacks an operation.
const UNSUPPORTED_CODE: &str = "unsupported";

// ── Wire types ──────────────────────────────────────────────────────────

/// Contract integers arrive as JSON numbers or as decimal strings (big ints).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireUint {
    Number(u64),
    Text(String),
}

impl WireUint {
    fn value(&self, field: &str) -> Result<u64, LedgerError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse()
                .map_err(|e| LedgerError::InvalidResponse(format!("{field}: {e}"))),
        }
    }
}

/// Candidate struct as laid out by the contract.
#[derive(Debug, Deserialize)]
struct CandidateWire {
    addr_candidate: Identity,
    num_votes: WireUint,
}

impl CandidateWire {
    fn into_candidate(self, ordinal: Ordinal) -> Result<Candidate, LedgerError> {
        let votes = self.num_votes.value("num_votes")?;
        Ok(Candidate::new(ordinal, self.addr_candidate, votes))
    }
}

#[derive(Debug, Deserialize)]
struct VoteRecordWire {
    voter: Identity,
    candidate: Identity,
    timestamp: WireUint,
}

#[derive(Debug, Deserialize)]
struct ReceiptWire {
    tx_hash: String,
    #[serde(default)]
    block_number: Option<u64>,
    #[serde(default)]
    status: Option<u8>,
}

// ── RpcLedger ───────────────────────────────────────────────────────────

/// Ledger handle backed by the HTTP gateway, bound to one caller identity.
#[derive(Clone)]
pub struct RpcLedger {
    http: reqwest::Client,
    gateway_url: String,
    caller: Identity,
}

impl RpcLedger {
    /// Create a handle with default timeouts.
    pub fn new(gateway_url: impl Into<String>, caller: Identity) -> Result<Self, LedgerError> {
        Self::with_timeouts(gateway_url, caller, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_timeouts(
        gateway_url: impl Into<String>,
        caller: Identity,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, LedgerError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| LedgerError::Transport(format!("failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            gateway_url: gateway_url.into(),
            caller,
        })
    }

    pub fn gateway_url(&self) -> &str {
        &self.gateway_url
    }

    /// Send one gateway request and return its `result` field.
    async fn rpc_call(
        &self,
        action: &'static str,
        params: serde_json::Value,
    ) -> Result<serde_json::Value, LedgerError> {
        let mut body = params;
        let object = body
            .as_object_mut()
            .ok_or_else(|| LedgerError::InvalidResponse("params must be a JSON object".into()))?;
        object.insert("action".to_string(), serde_json::json!(action));
        object.insert("from".to_string(), serde_json::json!(self.caller.as_str()));

        tracing::debug!(action, caller = %self.caller, "gateway call");

        let response = self
            .http
            .post(&self.gateway_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LedgerError::Transport(format!("request timed out: {e}"))
                } else if e.is_connect() {
                    LedgerError::Transport(format!("connection failed: {e}"))
                } else {
                    LedgerError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND || status == reqwest::StatusCode::NOT_IMPLEMENTED {
            return Err(LedgerError::Unsupported(action));
        }
        if !status.is_success() {
            return Err(LedgerError::Transport(format!("gateway returned HTTP {status}")));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LedgerError::InvalidResponse(format!("invalid JSON response: {e}")))?;

        match json.get("error") {
            None | Some(serde_json::Value::Null) => {}
            Some(err) => return Err(Self::failure_from(action, err)),
        }

        json.get("result")
            .cloned()
            .ok_or_else(|| LedgerError::InvalidResponse(format!("{action}: missing result")))
    }

    fn failure_from(action: &'static str, err: &serde_json::Value) -> LedgerError {
        if let Some(text) = err.as_str() {
            return LedgerError::Failure(RawFailure::from_message(text));
        }
        let unsupported = err
            .get("code")
            .and_then(|c| c.as_str())
            .is_some_and(|c| c.eq_ignore_ascii_case(UNSUPPORTED_CODE));
        if unsupported {
            return LedgerError::Unsupported(action);
        }
        match serde_json::from_value::<RawFailure>(err.clone()) {
            Ok(raw) => LedgerError::Failure(raw),
            Err(e) => LedgerError::InvalidResponse(format!("{action}: malformed error: {e}")),
        }
    }

    async fn call_decoded<T: DeserializeOwned>(
        &self,
        action: &'static str,
        params: serde_json::Value,
    ) -> Result<T, LedgerError> {
        let result = self.rpc_call(action, params).await?;
        serde_json::from_value(result)
            .map_err(|e| LedgerError::InvalidResponse(format!("invalid {action} response: {e}")))
    }
}

#[async_trait]
impl ElectionLedger for RpcLedger {
    fn caller(&self) -> &Identity {
        &self.caller
    }

    async fn read_owner(&self) -> Result<Identity, LedgerError> {
        self.call_decoded("owner", serde_json::json!({})).await
    }

    async fn is_voter_registered(&self, identity: &Identity) -> Result<bool, LedgerError> {
        self.call_decoded(
            "is_voter_registered",
            serde_json::json!({ "voter": identity.as_str() }),
        )
        .await
    }

    async fn read_phase(&self) -> Result<SessionPhase, LedgerError> {
        self.call_decoded("voting_status", serde_json::json!({})).await
    }

    async fn read_hide_votes(&self) -> Result<bool, LedgerError> {
        self.call_decoded("hide_votes", serde_json::json!({})).await
    }

    async fn read_all_candidates(&self) -> Result<Vec<Candidate>, LedgerError> {
        let wires: Vec<CandidateWire> = self
            .call_decoded("get_all_candidates", serde_json::json!({}))
            .await?;
        wires
            .into_iter()
            .enumerate()
            .map(|(i, wire)| {
                let ordinal = Ordinal::try_from(i)
                    .map_err(|_| LedgerError::InvalidResponse("too many candidates".into()))?;
                wire.into_candidate(ordinal)
            })
            .collect()
    }

    async fn read_candidate_at(&self, ordinal: Ordinal) -> Result<Candidate, LedgerError> {
        let wire: Option<CandidateWire> = self
            .call_decoded("candidate", serde_json::json!({ "ordinal": ordinal }))
            .await?;
        match wire {
            Some(wire) => wire.into_candidate(ordinal),
            None => Err(LedgerError::OutOfRange(ordinal)),
        }
    }

    async fn read_vote_history(&self) -> Result<Vec<VoteRecord>, LedgerError> {
        let wires: Vec<VoteRecordWire> = self
            .call_decoded("get_vote_history", serde_json::json!({}))
            .await?;
        wires
            .into_iter()
            .map(|w| {
                Ok(VoteRecord {
                    voter: w.voter,
                    candidate: w.candidate,
                    timestamp: Timestamp::new(w.timestamp.value("timestamp")?),
                })
            })
            .collect()
    }

    async fn read_winner(&self) -> Result<WinnerResult, LedgerError> {
        let (candidates, count): (Vec<Identity>, WireUint) =
            self.call_decoded("winner", serde_json::json!({})).await?;
        Ok(WinnerResult {
            candidates,
            vote_count: count.value("winner count")?,
        })
    }

    async fn submit(&self, call: LedgerCall) -> Result<PendingTx, LedgerError> {
        tracing::info!(call = %call, caller = %self.caller, "submitting transaction");
        self.call_decoded("submit", serde_json::json!({ "call": call }))
            .await
    }

    async fn wait_for_confirmation(&self, tx: PendingTx) -> Result<Receipt, LedgerError> {
        let wire: ReceiptWire = self
            .call_decoded(
                "wait_for_confirmation",
                serde_json::json!({ "tx_hash": tx.tx_hash }),
            )
            .await?;
        if wire.status == Some(0) {
            return Err(LedgerError::Failure(RawFailure::from_message(format!(
                "transaction {} reverted",
                wire.tx_hash
            ))));
        }
        Ok(Receipt {
            tx_hash: wire.tx_hash,
            block_number: wire.block_number,
        })
    }
}

// ── RpcConnector ────────────────────────────────────────────────────────

/// Creates [`RpcLedger`] handles for a fixed gateway.
#[derive(Clone, Debug)]
pub struct RpcConnector {
    gateway_url: String,
    timeout: Duration,
    connect_timeout: Duration,
}

impl RpcConnector {
    pub fn new(gateway_url: impl Into<String>) -> Self {
        Self {
            gateway_url: gateway_url.into(),
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, timeout: Duration, connect_timeout: Duration) -> Self {
        self.timeout = timeout;
        self.connect_timeout = connect_timeout;
        self
    }
}

#[async_trait]
impl LedgerConnector for RpcConnector {
    async fn connect(&self, identity: &Identity) -> Result<Arc<dyn ElectionLedger>, LedgerError> {
        let ledger = RpcLedger::with_timeouts(
            self.gateway_url.clone(),
            identity.clone(),
            self.timeout,
            self.connect_timeout,
        )?;
        Ok(Arc::new(ledger))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CALLER: &str = "0x00000000000000000000000000000000000000c1";

    fn caller() -> Identity {
        Identity::new(CALLER).unwrap()
    }

    async fn mount(server: &MockServer, action: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "action": action })))
            .respond_with(response)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn read_owner_sends_caller() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "action": "owner", "from": CALLER })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": CALLER })))
            .mount(&server)
            .await;

        let ledger = RpcLedger::new(server.uri(), caller()).unwrap();
        assert_eq!(ledger.read_owner().await.unwrap(), caller());
    }

    #[tokio::test]
    async fn candidates_use_contract_field_names() {
        let server = MockServer::start().await;
        let body = json!({ "result": [
            { "addr_candidate": "0xaa", "num_votes": 3 },
            { "addr_candidate": "0xbb", "num_votes": "12" },
        ]});
        mount(&server, "get_all_candidates", ResponseTemplate::new(200).set_body_json(body)).await;

        let ledger = RpcLedger::new(server.uri(), caller()).unwrap();
        let candidates = ledger.read_all_candidates().await.unwrap();
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].ordinal, 1);
        assert_eq!(candidates[1].vote_count, 12);
        assert_eq!(candidates[0].address.as_str(), "0xaa");
    }

    #[tokio::test]
    async fn missing_bulk_read_is_unsupported() {
        let server = MockServer::start().await;
        mount(&server, "get_all_candidates", ResponseTemplate::new(404)).await;

        let ledger = RpcLedger::new(server.uri(), caller()).unwrap();
        assert_eq!(
            ledger.read_all_candidates().await,
            Err(LedgerError::Unsupported("get_all_candidates"))
        );
    }

    #[tokio::test]
    async fn unsupported_error_code_is_unsupported() {
        let server = MockServer::start().await;
        let body = json!({ "error": { "code": "unsupported", "message": "no such method" } });
        mount(&server, "get_all_candidates", ResponseTemplate::new(200).set_body_json(body)).await;

        let ledger = RpcLedger::new(server.uri(), caller()).unwrap();
        assert!(matches!(
            ledger.read_all_candidates().await,
            Err(LedgerError::Unsupported(_))
        ));
    }

    #[tokio::test]
    async fn null_candidate_is_out_of_range() {
        let server = MockServer::start().await;
        mount(&server, "candidate", ResponseTemplate::new(200).set_body_json(json!({ "result": null }))).await;

        let ledger = RpcLedger::new(server.uri(), caller()).unwrap();
        let err = ledger.read_candidate_at(4).await.unwrap_err();
        assert_eq!(err, LedgerError::OutOfRange(4));
        assert!(err.is_out_of_range());
    }

    #[tokio::test]
    async fn error_envelope_becomes_raw_failure() {
        let server = MockServer::start().await;
        let body = json!({ "error": {
            "code": "CALL_EXCEPTION",
            "reason": "Voting has started",
            "shortMessage": "execution reverted"
        }});
        mount(&server, "submit", ResponseTemplate::new(200).set_body_json(body)).await;

        let ledger = RpcLedger::new(server.uri(), caller()).unwrap();
        match ledger.submit(LedgerCall::StartSession).await {
            Err(LedgerError::Failure(raw)) => {
                assert_eq!(raw.reason.as_deref(), Some("Voting has started"));
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn winner_is_decoded_from_tuple() {
        let server = MockServer::start().await;
        let body = json!({ "result": [["0xaa", "0xbb"], "10"] });
        mount(&server, "winner", ResponseTemplate::new(200).set_body_json(body)).await;

        let ledger = RpcLedger::new(server.uri(), caller()).unwrap();
        let winner = ledger.read_winner().await.unwrap();
        assert!(winner.is_tie());
        assert_eq!(winner.vote_count, 10);
    }

    #[tokio::test]
    async fn history_and_phase() {
        let server = MockServer::start().await;
        let history = json!({ "result": [
            { "voter": "0x01", "candidate": "0xaa", "timestamp": "1700000000" }
        ]});
        mount(&server, "get_vote_history", ResponseTemplate::new(200).set_body_json(history)).await;
        let phase = json!({ "result": { "started": true, "ended": false } });
        mount(&server, "voting_status", ResponseTemplate::new(200).set_body_json(phase)).await;

        let ledger = RpcLedger::new(server.uri(), caller()).unwrap();
        let records = ledger.read_vote_history().await.unwrap();
        assert_eq!(records[0].timestamp, Timestamp::new(1_700_000_000));
        assert_eq!(ledger.read_phase().await.unwrap(), SessionPhase::ACTIVE);
    }

    #[tokio::test]
    async fn submit_then_confirm() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({
                "action": "submit",
                "call": { "method": "cast_vote", "args": 1 }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": { "tx_hash": "0xfeed" } })))
            .mount(&server)
            .await;
        let receipt = json!({ "result": { "tx_hash": "0xfeed", "block_number": 7, "status": 1 } });
        mount(&server, "wait_for_confirmation", ResponseTemplate::new(200).set_body_json(receipt)).await;

        let ledger = RpcLedger::new(server.uri(), caller()).unwrap();
        let pending = ledger.submit(LedgerCall::CastVote(1)).await.unwrap();
        let receipt = ledger.wait_for_confirmation(pending).await.unwrap();
        assert_eq!(receipt.block_number, Some(7));
    }

    #[tokio::test]
    async fn reverted_receipt_is_failure() {
        let server = MockServer::start().await;
        let receipt = json!({ "result": { "tx_hash": "0xdead", "status": 0 } });
        mount(&server, "wait_for_confirmation", ResponseTemplate::new(200).set_body_json(receipt)).await;

        let ledger = RpcLedger::new(server.uri(), caller()).unwrap();
        let err = ledger
            .wait_for_confirmation(PendingTx { tx_hash: "0xdead".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::Failure(_)));
    }

    #[tokio::test]
    async fn server_error_is_transport() {
        let server = MockServer::start().await;
        mount(&server, "hide_votes", ResponseTemplate::new(500)).await;

        let ledger = RpcLedger::new(server.uri(), caller()).unwrap();
        assert!(matches!(
            ledger.read_hide_votes().await,
            Err(LedgerError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn connector_binds_identity() {
        let connector = RpcConnector::new("http://127.0.0.1:9");
        let handle = connector.connect(&caller()).await.unwrap();
        assert_eq!(handle.caller(), &caller());
    }
}
