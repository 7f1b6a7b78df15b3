//! Wallet identity (address) type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use crate::error::TypesError;

/// An opaque wallet address identifying a connected account.
///
/// The original spelling is preserved for display, but equality and hashing
/// ignore ASCII case: wallets report checksummed mixed-case addresses while
/// the ledger may return them lowercased.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// The address the ledger reports when no owner has been bound.
    pub const ZERO: &'static str = "0x0000000000000000000000000000000000000000";

    /// Create an identity from a raw address string.
    ///
    /// Surrounding whitespace is trimmed. Empty input is rejected.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypesError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TypesError::EmptyIdentity);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The zero identity.
    pub fn zero() -> Self {
        Self(Self::ZERO.to_string())
    }

    /// Whether this is the zero address (`0x` followed only by zeros).
    pub fn is_zero(&self) -> bool {
        let digits = self
            .0
            .strip_prefix("0x")
            .or_else(|| self.0.strip_prefix("0X"))
            .unwrap_or(&self.0);
        !digits.is_empty() && digits.bytes().all(|b| b == b'0')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form, used as the comparison key.
    pub fn normalized(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Abbreviated form for narrow displays: `0x1234...cdef`.
    pub fn short(&self) -> String {
        if self.0.len() <= 12 || !self.0.is_ascii() {
            return self.0.clone();
        }
        format!("{}...{}", &self.0[..6], &self.0[self.0.len() - 4..])
    }
}

impl PartialEq for Identity {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Identity {}

impl Hash for Identity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Identity {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = TypesError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn equality_ignores_case() {
        let a = Identity::new("0xAbCdEf0000000000000000000000000000000001").unwrap();
        let b = Identity::new("0xabcdef0000000000000000000000000000000001").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "0xAbCdEf0000000000000000000000000000000001");
    }

    #[test]
    fn hashing_agrees_with_equality() {
        let mut set = HashSet::new();
        set.insert(Identity::new("0xABC1").unwrap());
        assert!(set.contains(&Identity::new("0xabc1").unwrap()));
    }

    #[test]
    fn empty_and_blank_are_rejected() {
        assert!(matches!(Identity::new(""), Err(TypesError::EmptyIdentity)));
        assert!(matches!(Identity::new("   "), Err(TypesError::EmptyIdentity)));
    }

    #[test]
    fn input_is_trimmed() {
        let id = Identity::new("  0xabc  ").unwrap();
        assert_eq!(id.as_str(), "0xabc");
    }

    #[test]
    fn zero_detection() {
        assert!(Identity::zero().is_zero());
        assert!(Identity::new("0x0").unwrap().is_zero());
        assert!(!Identity::new("0x").unwrap().is_zero());
        assert!(!Identity::new("0x01").unwrap().is_zero());
    }

    #[test]
    fn short_form() {
        let id = Identity::new("0x1234567890abcdef1234567890abcdef12345678").unwrap();
        assert_eq!(id.short(), "0x1234...5678");
        assert_eq!(Identity::new("0xabc").unwrap().short(), "0xabc");
    }

    #[test]
    fn deserialization_rejects_empty() {
        let ok: Identity = serde_json::from_str("\"0xabc\"").unwrap();
        assert_eq!(ok.as_str(), "0xabc");
        assert!(serde_json::from_str::<Identity>("\"\"").is_err());
    }
}
