//! The identity record carried by every log entry.

use serde::{Deserialize, Serialize};
use tallylab_crypto::{PublicKey, Signature};

/// Provider type stamped on identities issued by this crate.
pub const TALLYLAB_IDENTITY_TYPE: &str = "TallyLab";

/// A cryptographically backed actor.
///
/// `id` is the lowercase hex of the identity's Ed25519 signing key, so two
/// records with the same `id` always name the same key. `public_key` is the
/// node keystore key that vouched for the id. The two signatures form a chain:
///
/// 1. `signatures.id`: the keystore key over the id bytes
/// 2. `signatures.public_key`: the identity signing key over
///    `public_key || signatures.id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Hex-encoded public signing key.
    pub id: String,
    /// Keystore public key that signed the id.
    #[serde(rename = "publicKey")]
    pub public_key: PublicKey,
    /// The signature chain.
    pub signatures: IdentitySignatures,
    /// Provider that issued the identity.
    #[serde(rename = "type")]
    pub provider_type: String,
}

/// The two signatures binding an identity id to a keystore key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentitySignatures {
    /// Keystore key's signature over the id.
    pub id: Signature,
    /// Identity key's signature over the keystore key and the id signature.
    #[serde(rename = "publicKey")]
    pub public_key: Signature,
}

impl Identity {
    /// The message covered by `signatures.public_key`.
    #[must_use]
    pub fn public_key_message(public_key: &PublicKey, id_signature: &Signature) -> Vec<u8> {
        let mut message = Vec::with_capacity(96);
        message.extend_from_slice(public_key.as_bytes());
        message.extend_from_slice(id_signature.as_bytes());
        message
    }

    /// Decode the identity signing key from `id`.
    ///
    /// Returns `None` if `id` is not 32 bytes of hex.
    #[must_use]
    pub fn signing_key(&self) -> Option<PublicKey> {
        PublicKey::from_hex(&self.id).ok()
    }

    /// Short form of the id for log fields.
    #[must_use]
    pub fn short_id(&self) -> &str {
        self.id.get(..16).unwrap_or(&self.id)
    }
}
