//! Address command: derive a database address without touching storage.

use tallylab_access::{PolicyParams, derive_address};
use tallylab_config::Config;

use crate::node::LocalNode;
use crate::theme::Theme;

/// Print the address a database would have.
///
/// With no `writers` the node's own identity is the only writer.
pub(crate) fn show_address(
    config: &Config,
    name: &str,
    db_type: Option<&str>,
    writers: Vec<String>,
) -> anyhow::Result<()> {
    let writers = if writers.is_empty() {
        vec![LocalNode::open(config)?.identity.id]
    } else {
        writers
    };
    let db_type = db_type.unwrap_or(&config.database.default_type);

    let params = PolicyParams::new(name, writers);
    let derived = derive_address(&params, db_type)?;

    println!("\n{}", Theme::header("Database Address"));
    println!("  Address:  {}", derived.address);
    println!("  Manifest: {}", derived.address.root());
    println!("  Type:     {}", derived.manifest.db_type);
    println!("  Policy:   {}", derived.policy.to_reference());
    println!(
        "  Writers:  {}",
        params.write().iter().cloned().collect::<Vec<_>>().join(", ")
    );
    println!();

    Ok(())
}
