//! Database commands: create, open and append.

use anyhow::Context;
use serde_json::Value;
use tallylab_access::{AccessError, ControllerOptions, create_database, open_database};
use tallylab_config::Config;

use crate::node::LocalNode;
use crate::theme::Theme;

/// Create a database and store its policy and manifest locally.
pub(crate) async fn create(
    config: &Config,
    name: &str,
    db_type: Option<&str>,
    writers: Vec<String>,
) -> anyhow::Result<()> {
    let node = LocalNode::open(config)?;
    let writers = if writers.is_empty() {
        vec![node.identity.id.clone()]
    } else {
        writers
    };
    let db_type = db_type.unwrap_or(&config.database.default_type);

    let options = ControllerOptions::new(name, writers);
    let db = create_database(&node.registry, &node.context(), db_type, &options).await?;

    println!("{}", Theme::success("Database created."));
    println!("  Address:    {}", db.address());
    println!("  Controller: {}", db.manifest().access_controller);
    println!();
    Ok(())
}

/// Append `payload` to the database at `address` as this node.
pub(crate) async fn append(config: &Config, address: &str, payload: &str) -> anyhow::Result<()> {
    let payload: Value = serde_json::from_str(payload).context("payload must be JSON")?;
    let node = LocalNode::open(config)?;
    let db = open_database(&node.registry, &node.context(), address).await?;

    match db.append(payload).await {
        Ok(cid) => {
            println!("{}", Theme::success("Entry appended."));
            println!("  Entry: {}", cid.to_reference());
            Ok(())
        },
        Err(AccessError::WriteDenied { writer, denial }) => {
            println!(
                "{}",
                Theme::error(&format!("Write refused for {writer}: {denial}"))
            );
            anyhow::bail!("write denied")
        },
        Err(e) => Err(e.into()),
    }
}
