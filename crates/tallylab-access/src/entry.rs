//! Log entries presented for append.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tallylab_identity::Identity;

/// A proposed append to a database log.
///
/// The identity is optional on the wire so that an entry missing it can be
/// decoded and then refused, rather than failing to parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Identity of the writer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<Identity>,
    /// Application payload.
    #[serde(default)]
    pub payload: Value,
}

impl LogEntry {
    /// Create an entry written by `identity`.
    #[must_use]
    pub fn new(identity: Identity, payload: Value) -> Self {
        Self {
            identity: Some(identity),
            payload,
        }
    }

    /// Id of the writer, if the entry carries an identity.
    #[must_use]
    pub fn writer_id(&self) -> Option<&str> {
        self.identity.as_ref().map(|identity| identity.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_without_identity_decodes() {
        let entry: LogEntry = serde_json::from_value(json!({ "payload": { "op": "PUT" } })).unwrap();
        assert!(entry.identity.is_none());
        assert_eq!(entry.writer_id(), None);
        assert_eq!(entry.payload["op"], "PUT");
    }
}
