//! Content identifiers.
//!
//! A [`Cid`] is the BLAKE3 hash of a document's canonical bytes. Its string
//! form is 64 lowercase hex characters; inside manifests it is referenced as
//! `/dag/<cid>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tallylab_crypto::ContentHash;

use crate::error::{StorageError, StorageResult};

/// Scheme used when a document references another by content identifier.
pub const CID_SCHEME: &str = "dag";

/// A content identifier naming an immutable block.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid(ContentHash);

impl Cid {
    /// Compute the identifier of raw block bytes.
    #[must_use]
    pub fn of(bytes: &[u8]) -> Self {
        Self(ContentHash::hash(bytes))
    }

    /// Parse the bare 64-character hex form.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidCid`] if the string is not 32 bytes of
    /// lowercase hex.
    pub fn parse(s: &str) -> StorageResult<Self> {
        if s.len() != ContentHash::HEX_LEN || s.bytes().any(|b| b.is_ascii_uppercase()) {
            return Err(StorageError::InvalidCid(s.to_owned()));
        }
        ContentHash::from_hex(s)
            .map(Self)
            .map_err(|_| StorageError::InvalidCid(s.to_owned()))
    }

    /// Parse either a bare identifier or a `/dag/<cid>` reference.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidCid`] for any other shape or scheme.
    pub fn from_reference(reference: &str) -> StorageResult<Self> {
        match reference.strip_prefix('/') {
            None => Self::parse(reference),
            Some(rest) => {
                let (scheme, cid) = rest
                    .split_once('/')
                    .ok_or_else(|| StorageError::InvalidCid(reference.to_owned()))?;
                if scheme != CID_SCHEME {
                    return Err(StorageError::InvalidCid(reference.to_owned()));
                }
                Self::parse(cid)
            },
        }
    }

    /// Render as a `/dag/<cid>` reference for embedding in other documents.
    #[must_use]
    pub fn to_reference(&self) -> String {
        format!("/{CID_SCHEME}/{self}")
    }

    /// The underlying hash.
    #[must_use]
    pub const fn hash(&self) -> &ContentHash {
        &self.0
    }
}

impl fmt::Debug for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cid({})", &self.0.to_hex()[..16])
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.to_hex())
    }
}

impl FromStr for Cid {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Cid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cid_of_matches_blake3() {
        let cid = Cid::of(b"abc");
        assert_eq!(
            cid.to_string(),
            "6437b3ac38465133ffb63b75273a8db548c558465d79db03fd359c6cd5bd9d85"
        );
    }

    #[test]
    fn test_parse_and_display_agree() {
        let cid = Cid::of(b"block");
        assert_eq!(Cid::parse(&cid.to_string()).unwrap(), cid);
        assert_eq!(cid.to_string().parse::<Cid>().unwrap(), cid);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(Cid::parse("").is_err());
        assert!(Cid::parse("abcd").is_err());
        let upper = Cid::of(b"x").to_string().to_uppercase();
        assert!(Cid::parse(&upper).is_err());
    }

    #[test]
    fn test_reference_forms() {
        let cid = Cid::of(b"policy");
        let reference = cid.to_reference();
        assert!(reference.starts_with("/dag/"));
        assert_eq!(Cid::from_reference(&reference).unwrap(), cid);
        assert_eq!(Cid::from_reference(&cid.to_string()).unwrap(), cid);
    }

    #[test]
    fn test_reference_rejects_other_schemes() {
        let cid = Cid::of(b"policy");
        assert!(Cid::from_reference(&format!("/ipfs/{cid}")).is_err());
        assert!(Cid::from_reference("/dag").is_err());
        assert!(Cid::from_reference(&format!("/dag/{cid}/extra")).is_err());
    }
}
