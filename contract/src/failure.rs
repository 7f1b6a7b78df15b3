//! Raw failure payloads returned across the ledger boundary.
//!
//! Failures arrive in inconsistent shapes depending on which layer produced
//! them: the contract (a structured revert reason), the wallet provider (a
//! nested error object), or the transport (a free-text message with the
//! reason embedded somewhere inside). [`RawFailure`] keeps every shape the
//! provider uses so the classifier can pick the best one.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Provider error code: numeric (EIP-1193) or symbolic.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FailureCode {
    Numeric(i64),
    Named(String),
}

impl FailureCode {
    /// EIP-1193 "user rejected request".
    pub const USER_REJECTED: i64 = 4001;
    /// Symbolic code some providers use for the same condition.
    pub const ACTION_REJECTED: &'static str = "ACTION_REJECTED";

    pub fn is_user_rejection(&self) -> bool {
        match self {
            Self::Numeric(code) => *code == Self::USER_REJECTED,
            Self::Named(name) => name.eq_ignore_ascii_case(Self::ACTION_REJECTED),
        }
    }
}

impl fmt::Display for FailureCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Numeric(code) => write!(f, "{code}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// A provider-level error object (`{ code, message }`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<FailureCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Wrapper the provider uses for the underlying RPC error (`info.error`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProviderError>,
}

/// A failure exactly as reported by the ledger boundary.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFailure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<FailureCode>,
    /// Structured revert reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<ProviderInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ProviderError>,
    /// Revert data. Usually an object with a `message`, sometimes raw hex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Generic message, possibly with the reason embedded in it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        default,
        rename = "shortMessage",
        skip_serializing_if = "Option::is_none"
    )]
    pub short_message: Option<String>,
}

impl RawFailure {
    /// A failure carrying only a generic message.
    pub fn from_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// A failure carrying a structured revert reason.
    pub fn from_reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            ..Default::default()
        }
    }

    /// A failure carrying a provider error nested under `info.error`.
    pub fn from_provider(message: impl Into<String>) -> Self {
        Self {
            info: Some(ProviderInfo {
                error: Some(ProviderError {
                    code: None,
                    message: Some(message.into()),
                }),
            }),
            ..Default::default()
        }
    }

    /// The wallet's "user rejected request" signal with no text.
    pub fn user_rejected() -> Self {
        Self {
            code: Some(FailureCode::Numeric(FailureCode::USER_REJECTED)),
            ..Default::default()
        }
    }

    pub fn with_code(mut self, code: FailureCode) -> Self {
        self.code = Some(code);
        self
    }

    pub fn with_short_message(mut self, short: impl Into<String>) -> Self {
        self.short_message = Some(short.into());
        self
    }

    /// Nested provider messages in preference order:
    /// `info.error.message`, `error.message`, `data.message`.
    pub fn nested_message(&self) -> Option<&str> {
        let info = self
            .info
            .as_ref()
            .and_then(|i| i.error.as_ref())
            .and_then(|e| e.message.as_deref());
        let error = self.error.as_ref().and_then(|e| e.message.as_deref());
        let data = self
            .data
            .as_ref()
            .and_then(|d| d.get("message"))
            .and_then(|m| m.as_str());
        [info, error, data]
            .into_iter()
            .flatten()
            .find(|m| !m.is_empty())
    }

    /// Whether any layer reports the wallet's user-rejection code.
    pub fn is_user_cancellation(&self) -> bool {
        let nested_codes = [
            self.info
                .as_ref()
                .and_then(|i| i.error.as_ref())
                .and_then(|e| e.code.as_ref()),
            self.error.as_ref().and_then(|e| e.code.as_ref()),
        ];
        self.code
            .iter()
            .chain(nested_codes.into_iter().flatten())
            .any(FailureCode::is_user_rejection)
    }
}

impl fmt::Display for RawFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self
            .reason
            .as_deref()
            .filter(|r| !r.is_empty())
            .or_else(|| self.nested_message())
            .or(self.message.as_deref().filter(|m| !m.is_empty()))
            .or(self.short_message.as_deref().filter(|m| !m.is_empty()));
        match (text, &self.code) {
            (Some(text), _) => f.write_str(text),
            (None, Some(code)) => write!(f, "ledger failure (code {code})"),
            (None, None) => f.write_str("unknown ledger failure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_provider_shape() {
        let json = r#"{
            "code": "CALL_EXCEPTION",
            "shortMessage": "execution reverted",
            "info": { "error": { "code": -32603, "message": "Error: VM Exception" } },
            "data": { "message": "execution reverted: Candidate not found" }
        }"#;
        let raw: RawFailure = serde_json::from_str(json).unwrap();
        assert_eq!(raw.code, Some(FailureCode::Named("CALL_EXCEPTION".into())));
        assert_eq!(raw.short_message.as_deref(), Some("execution reverted"));
        assert_eq!(raw.nested_message(), Some("Error: VM Exception"));
    }

    #[test]
    fn nested_message_falls_through_to_data() {
        let raw = RawFailure {
            data: Some(serde_json::json!({ "message": "execution reverted: Voting has ended" })),
            ..Default::default()
        };
        assert_eq!(
            raw.nested_message(),
            Some("execution reverted: Voting has ended")
        );
    }

    #[test]
    fn hex_revert_data_is_tolerated() {
        let raw: RawFailure = serde_json::from_str(r#"{"data": "0x08c379a0"}"#).unwrap();
        assert_eq!(raw.nested_message(), None);
    }

    #[test]
    fn detects_user_cancellation_at_any_layer() {
        assert!(RawFailure::user_rejected().is_user_cancellation());
        assert!(RawFailure::default()
            .with_code(FailureCode::Named("ACTION_REJECTED".into()))
            .is_user_cancellation());
        let nested = RawFailure {
            error: Some(ProviderError {
                code: Some(FailureCode::Numeric(4001)),
                message: Some("User rejected the request.".into()),
            }),
            ..Default::default()
        };
        assert!(nested.is_user_cancellation());
        assert!(!RawFailure::from_message("boom").is_user_cancellation());
    }

    #[test]
    fn display_prefers_reason() {
        let raw = RawFailure::from_reason("Voting has started");
        assert_eq!(raw.to_string(), "Voting has started");
        assert_eq!(
            RawFailure::user_rejected().to_string(),
            "ledger failure (code 4001)"
        );
    }
}
