//! Access decisions.
//!
//! Every append is evaluated against four checks, in order:
//!
//! 1. Does the entry's identity verify? -> [`Denial::VerificationFailure`]
//! 2. Does the entry originate from this node's identity? -> [`Denial::ForeignOrigin`]
//! 3. Is this node's identity in the policy's write-set? -> [`Denial::UnauthorizedWriter`]
//! 4. Does the local keystore hold the entry identity's key? -> [`Denial::KeyNotLocallyHeld`]
//! 5. Otherwise -> [`AccessDecision::Allow`]

use std::fmt;

use serde::{Deserialize, Serialize};

/// The check that refused an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Denial {
    /// The entry carries no identity, or its signature chain does not verify.
    VerificationFailure,
    /// The entry identity is not this node's identity.
    ForeignOrigin,
    /// This node's identity is absent from the write-set.
    UnauthorizedWriter,
    /// The local keystore holds no key for the entry identity.
    KeyNotLocallyHeld,
}

impl Denial {
    /// Stable name of the check, for logs and diagnostics.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerificationFailure => "verification_failure",
            Self::ForeignOrigin => "foreign_origin",
            Self::UnauthorizedWriter => "unauthorized_writer",
            Self::KeyNotLocallyHeld => "key_not_locally_held",
        }
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::VerificationFailure => "entry identity failed verification",
            Self::ForeignOrigin => "entry identity is not the local node identity",
            Self::UnauthorizedWriter => "identity is not in the write-set",
            Self::KeyNotLocallyHeld => "no local key for entry identity",
        };
        f.write_str(text)
    }
}

/// Outcome of evaluating one entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", content = "reason", rename_all = "snake_case")]
pub enum AccessDecision {
    /// All checks passed.
    Allow,
    /// A check refused the entry.
    Deny(Denial),
}

impl AccessDecision {
    /// Check if the entry may be appended.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    /// The refusing check, if any.
    #[must_use]
    pub fn denial(&self) -> Option<Denial> {
        match self {
            Self::Allow => None,
            Self::Deny(denial) => Some(*denial),
        }
    }
}

impl fmt::Display for AccessDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => write!(f, "allowed"),
            Self::Deny(denial) => write!(f, "denied: {denial}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_predicates() {
        assert!(AccessDecision::Allow.is_allowed());
        assert_eq!(AccessDecision::Allow.denial(), None);

        let denied = AccessDecision::Deny(Denial::UnauthorizedWriter);
        assert!(!denied.is_allowed());
        assert_eq!(denied.denial(), Some(Denial::UnauthorizedWriter));
    }

    #[test]
    fn test_decision_json_shape() {
        let value = serde_json::to_value(AccessDecision::Deny(Denial::ForeignOrigin)).unwrap();
        assert_eq!(value["decision"], "deny");
        assert_eq!(value["reason"], "foreign_origin");

        let allow = serde_json::to_value(AccessDecision::Allow).unwrap();
        assert_eq!(allow["decision"], "allow");
    }

    #[test]
    fn test_display() {
        assert_eq!(AccessDecision::Allow.to_string(), "allowed");
        assert_eq!(
            AccessDecision::Deny(Denial::KeyNotLocallyHeld).to_string(),
            "denied: no local key for entry identity"
        );
        assert_eq!(Denial::VerificationFailure.as_str(), "verification_failure");
    }
}
