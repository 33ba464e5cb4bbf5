//! # Identity Newtypes
//!
//! Newtype wrappers for the identifiers the registry is keyed on. A
//! [`PrincipalId`] names an account (governor, certifier, or applicant); an
//! [`ApplicationId`] names a granted application. The two can never be
//! confused with each other or with the free-form `u64` certifier and
//! applicant ids carried inside records.
//!
//! ## Text Form
//!
//! Principals render as `0x` followed by 40 lowercase hex digits, the same
//! form as the 20-byte account addresses the registry was first deployed
//! against. Parsing accepts either case and an optional `0x` prefix.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::IdentityError;

/// Width in bytes of a principal identifier.
pub const PRINCIPAL_LEN: usize = 20;

/// An opaque, fixed-width account handle.
///
/// Immutable once constructed. Ordering is bytewise and carries no meaning
/// beyond giving principals a stable sort for display.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrincipalId([u8; PRINCIPAL_LEN]);

impl PrincipalId {
    /// Create a principal from its raw bytes.
    pub fn from_bytes(bytes: [u8; PRINCIPAL_LEN]) -> Self {
        Self(bytes)
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; PRINCIPAL_LEN] {
        &self.0
    }

    /// Render as `0x` + 40 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        let digits: String = self.0.iter().map(|b| format!("{b:02x}")).collect();
        format!("0x{digits}")
    }

    /// Parse from the text form, with or without the `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, IdentityError> {
        let trimmed = input.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != PRINCIPAL_LEN * 2 {
            return Err(IdentityError::InvalidPrincipal {
                input: input.to_string(),
                reason: format!(
                    "expected {} hex digits, got {}",
                    PRINCIPAL_LEN * 2,
                    digits.len()
                ),
            });
        }
        let bytes = hex_to_bytes(digits).map_err(|reason| IdentityError::InvalidPrincipal {
            input: input.to_string(),
            reason,
        })?;
        let mut arr = [0u8; PRINCIPAL_LEN];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl From<[u8; PRINCIPAL_LEN]> for PrincipalId {
    fn from(bytes: [u8; PRINCIPAL_LEN]) -> Self {
        Self(bytes)
    }
}

impl std::str::FromStr for PrincipalId {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl std::fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl std::fmt::Debug for PrincipalId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PrincipalId({})", self.to_hex())
    }
}

impl Serialize for PrincipalId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PrincipalId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw).map_err(serde::de::Error::custom)
    }
}

/// The external-facing identity of a granted application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(u64);

impl ApplicationId {
    /// Wrap a raw application number.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw application number.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for ApplicationId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hex_to_bytes(hex: &str) -> Result<Vec<u8>, String> {
    if let Some(pos) = hex.find(|c: char| !c.is_ascii_hexdigit()) {
        return Err(format!("non-hex character at position {pos}"));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| format!("invalid hex at position {i}: {e}"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "0x70997970c51812dc3a010c7d01b50e0d17dc79c8";

    #[test]
    fn test_principal_parse_and_display() {
        let p: PrincipalId = SAMPLE.parse().unwrap();
        assert_eq!(p.to_string(), SAMPLE);
        assert_eq!(p.as_bytes()[0], 0x70);
        assert_eq!(p.as_bytes()[19], 0xc8);
    }

    #[test]
    fn test_principal_parse_accepts_uppercase_and_no_prefix() {
        let upper = SAMPLE.trim_start_matches("0x").to_uppercase();
        let p = PrincipalId::from_hex(&upper).unwrap();
        assert_eq!(p.to_string(), SAMPLE);
    }

    #[test]
    fn test_principal_rejects_wrong_length() {
        let err = PrincipalId::from_hex("0x1234").unwrap_err();
        match err {
            IdentityError::InvalidPrincipal { reason, .. } => {
                assert!(reason.contains("expected 40 hex digits"));
            }
        }
    }

    #[test]
    fn test_principal_rejects_non_hex() {
        let bad = format!("0x{}", "zz".repeat(20));
        assert!(PrincipalId::from_hex(&bad).is_err());
    }

    #[test]
    fn test_principal_rejects_multibyte_input_without_panicking() {
        // 40 bytes, but not 40 ASCII hex digits.
        let bad = "é".repeat(20);
        assert_eq!(bad.len(), 40);
        assert!(PrincipalId::from_hex(&bad).is_err());
    }

    #[test]
    fn test_principal_serde_uses_text_form() {
        let p = PrincipalId::from_bytes([0xab; 20]);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, format!("\"0x{}\"", "ab".repeat(20)));
        let back: PrincipalId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn test_principal_deserialize_rejects_invalid() {
        let result: Result<PrincipalId, _> = serde_json::from_str("\"0xnothex\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_application_id_is_transparent() {
        let id = ApplicationId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(id.to_string(), "42");
        assert_eq!(ApplicationId::from(42), id);
        assert_eq!(id.value(), 42);
    }
}
