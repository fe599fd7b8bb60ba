//! Policy command: inspect stored write policies.

use tallylab_access::{ADDRESS_PREFIX, DatabaseAddress, Manifest, PolicyStore};
use tallylab_config::Config;
use tallylab_storage::{DagStore, cid_of_document};

use crate::node::LocalNode;
use crate::theme::Theme;

/// Print the policy stored at `reference`.
///
/// `reference` may be a bare cid, a `/dag/<cid>` reference or a database
/// address, in which case the manifest is followed to its policy.
pub(crate) async fn show_policy(config: &Config, reference: &str) -> anyhow::Result<()> {
    let node = LocalNode::open(config)?;
    let store = PolicyStore::new(node.dag.clone());

    let params = if reference.starts_with(&format!("/{ADDRESS_PREFIX}/")) {
        let address = DatabaseAddress::parse(reference)?;
        let manifest = Manifest::from_document(node.dag.get(address.root()).await?)?;
        store.load_cid(&manifest.policy_cid()?).await?
    } else {
        store.load(reference).await?
    };

    let document = params.to_document()?;
    println!("{}", serde_json::to_string_pretty(&document)?);
    println!(
        "{}",
        Theme::dimmed(&cid_of_document(&document)?.to_reference())
    );
    Ok(())
}
