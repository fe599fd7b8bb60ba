//! Identity issuance and the verification contract.

use std::sync::Arc;

use async_trait::async_trait;
use tallylab_crypto::KeyPair;
use tracing::{debug, trace};

use crate::error::IdentityResult;
use crate::identity::{Identity, IdentitySignatures, TALLYLAB_IDENTITY_TYPE};
use crate::keystore::Keystore;

/// The capability the access layer consumes to check identities.
///
/// Both calls may suspend. A negative answer is `Ok(false)`; `Err` means the
/// question could not be answered and must not be read as a decision.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Confirm the identity's signature chain was produced by the claimed keys.
    async fn verify_identity(&self, identity: &Identity) -> IdentityResult<bool>;

    /// Confirm the local keystore holds key material for `id`.
    async fn has_local_key(&self, id: &str) -> IdentityResult<bool>;
}

/// Issues and verifies TallyLab identities against a local [`Keystore`].
#[derive(Debug, Clone)]
pub struct TallyLabIdentityProvider {
    keystore: Arc<Keystore>,
}

impl TallyLabIdentityProvider {
    /// Create a provider over `keystore`.
    #[must_use]
    pub fn new(keystore: Arc<Keystore>) -> Self {
        Self { keystore }
    }

    /// The keystore this provider signs with and answers possession checks from.
    #[must_use]
    pub fn keystore(&self) -> &Arc<Keystore> {
        &self.keystore
    }

    /// Generate an identity signing key pair.
    ///
    /// With a seed the result is deterministic, which is what lets a user
    /// reach the same databases from any device.
    ///
    /// # Errors
    ///
    /// Returns an error if the seed is not exactly 32 bytes.
    pub fn keygen(seed: Option<&[u8]>) -> IdentityResult<KeyPair> {
        match seed {
            Some(seed) => Ok(KeyPair::from_seed(seed)?),
            None => Ok(KeyPair::generate()),
        }
    }

    /// Issue an identity for `signing_key`.
    ///
    /// The keystore key named after the id is created if needed, signs the
    /// id, and the signing key then countersigns.
    ///
    /// # Errors
    ///
    /// Returns an error if the keystore key cannot be created or loaded.
    pub fn create_identity(&self, signing_key: &KeyPair) -> IdentityResult<Identity> {
        let id = signing_key.public_key_hex();
        let keystore_key = self.keystore.get_or_create_key(&id)?;

        let id_signature = keystore_key.sign(id.as_bytes());
        let public_key = keystore_key.export_public_key();
        let public_key_signature =
            signing_key.sign(&Identity::public_key_message(&public_key, &id_signature));

        let identity = Identity {
            id,
            public_key,
            signatures: IdentitySignatures {
                id: id_signature,
                public_key: public_key_signature,
            },
            provider_type: TALLYLAB_IDENTITY_TYPE.to_owned(),
        };
        debug!(id = identity.short_id(), "issued identity");
        Ok(identity)
    }

    /// Check an identity's signature chain. Pure; touches no keystore.
    #[must_use]
    pub fn verify_signatures(identity: &Identity) -> bool {
        if identity.provider_type != TALLYLAB_IDENTITY_TYPE {
            trace!(provider = %identity.provider_type, "unsupported identity type");
            return false;
        }
        let Some(signing_key) = identity.signing_key() else {
            trace!(id = identity.short_id(), "identity id is not a public key");
            return false;
        };

        let id_link = identity
            .public_key
            .verify(identity.id.as_bytes(), &identity.signatures.id)
            .is_ok();
        let key_link = signing_key
            .verify(
                &Identity::public_key_message(&identity.public_key, &identity.signatures.id),
                &identity.signatures.public_key,
            )
            .is_ok();

        id_link && key_link
    }
}

#[async_trait]
impl IdentityVerifier for TallyLabIdentityProvider {
    async fn verify_identity(&self, identity: &Identity) -> IdentityResult<bool> {
        Ok(Self::verify_signatures(identity))
    }

    async fn has_local_key(&self, id: &str) -> IdentityResult<bool> {
        self.keystore.has_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tallylab_crypto::Signature;

    const SEED: &[u8; 32] = b"thisisexactlythirtytwocharacters";

    fn provider() -> TallyLabIdentityProvider {
        TallyLabIdentityProvider::new(Arc::new(Keystore::in_memory()))
    }

    #[tokio::test]
    async fn test_issued_identity_verifies() {
        let provider = provider();
        let key = TallyLabIdentityProvider::keygen(None).unwrap();
        let identity = provider.create_identity(&key).unwrap();

        assert_eq!(identity.id, key.public_key_hex());
        assert_eq!(identity.short_id(), &identity.id[..16]);
        assert!(provider.verify_identity(&identity).await.unwrap());
        assert!(provider.has_local_key(&identity.id).await.unwrap());
    }

    #[test]
    fn test_seeded_identity_is_stable() {
        let a = provider()
            .create_identity(&TallyLabIdentityProvider::keygen(Some(SEED)).unwrap())
            .unwrap();
        let b = provider()
            .create_identity(&TallyLabIdentityProvider::keygen(Some(SEED)).unwrap())
            .unwrap();

        // Same id, different keystore keys.
        assert_eq!(a.id, b.id);
        assert_ne!(a.public_key, b.public_key);
    }

    #[test]
    fn test_keygen_rejects_short_seed() {
        assert!(TallyLabIdentityProvider::keygen(Some(b"short")).is_err());
    }

    #[test]
    fn test_tampered_id_signature_fails() {
        let provider = provider();
        let mut identity = provider.create_identity(&KeyPair::generate()).unwrap();
        identity.signatures.id = Signature::from_bytes([0u8; 64]);
        assert!(!TallyLabIdentityProvider::verify_signatures(&identity));
    }

    #[test]
    fn test_claimed_id_must_match_signing_key() {
        let provider = provider();
        let mut identity = provider.create_identity(&KeyPair::generate()).unwrap();
        identity.id = KeyPair::generate().public_key_hex();
        assert!(!TallyLabIdentityProvider::verify_signatures(&identity));
    }

    #[test]
    fn test_swapped_keystore_key_fails() {
        let provider = provider();
        let mut identity = provider.create_identity(&KeyPair::generate()).unwrap();
        identity.public_key = KeyPair::generate().export_public_key();
        assert!(!TallyLabIdentityProvider::verify_signatures(&identity));
    }

    #[test]
    fn test_wrong_type_and_garbage_id_fail() {
        let provider = provider();
        let identity = provider.create_identity(&KeyPair::generate()).unwrap();

        let mut wrong_type = identity.clone();
        wrong_type.provider_type = "orbitdb".into();
        assert!(!TallyLabIdentityProvider::verify_signatures(&wrong_type));

        let mut garbage = identity;
        garbage.id = "zz".into();
        assert!(!TallyLabIdentityProvider::verify_signatures(&garbage));
    }

    #[tokio::test]
    async fn test_has_local_key_for_foreign_identity() {
        let issuer = provider();
        let identity = issuer.create_identity(&KeyPair::generate()).unwrap();

        let other_node = provider();
        assert!(other_node.verify_identity(&identity).await.unwrap());
        assert!(!other_node.has_local_key(&identity.id).await.unwrap());
    }
}
