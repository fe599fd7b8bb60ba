//! Check command: ask a database's controller about an entry.

use std::path::Path;

use anyhow::Context;
use serde_json::json;
use tallylab_access::{AccessDecision, LogEntry, open_database};
use tallylab_config::Config;

use crate::node::LocalNode;
use crate::theme::Theme;

/// Evaluate an entry against the database at `address`.
///
/// Without `entry_path` the entry is one written by this node.
pub(crate) async fn check_entry(
    config: &Config,
    address: &str,
    entry_path: Option<&Path>,
    json_output: bool,
) -> anyhow::Result<()> {
    let node = LocalNode::open(config)?;
    let db = open_database(&node.registry, &node.context(), address).await?;

    let entry = match entry_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str::<LogEntry>(&text)
                .with_context(|| format!("{} is not a log entry", path.display()))?
        },
        None => LogEntry::new(node.identity.clone(), json!({})),
    };

    let decision = db.controller().evaluate(&entry, node.verifier()).await?;

    if json_output {
        println!("{}", serde_json::to_string(&decision)?);
        return Ok(());
    }

    let writer = entry.writer_id().unwrap_or("<none>");
    match decision {
        AccessDecision::Allow => {
            println!("{}", Theme::success(&format!("{writer} may append")));
        },
        AccessDecision::Deny(denial) => {
            println!("{}", Theme::error(&format!("{writer} may not append")));
            println!("  Reason: {denial}");
        },
    }
    Ok(())
}
