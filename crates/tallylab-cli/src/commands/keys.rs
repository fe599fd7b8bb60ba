//! Keys command: manage the node's identity signing key.

use anyhow::Context;
use tallylab_config::Config;
use tallylab_crypto::KeyPair;

use crate::node::LocalNode;
use crate::theme::Theme;

/// Show the node identity, creating its key on first use.
pub(crate) fn show_key(config: &Config) -> anyhow::Result<()> {
    let key_path = config
        .identity_key_path()
        .context("no node home configured")?;
    if !key_path.exists() {
        println!("{}", Theme::info("No identity key found. Generating one..."));
    }

    let node = LocalNode::open(config)?;

    println!("\n{}", Theme::header("Node Identity"));
    println!("  Identity:     {}", node.identity.id);
    println!("  Keystore key: {}", node.identity.public_key.to_hex());
    println!("  Key file:     {}", key_path.display());
    println!();

    Ok(())
}

/// Print the node identity document as JSON.
pub(crate) fn print_identity(config: &Config) -> anyhow::Result<()> {
    let node = LocalNode::open(config)?;
    println!("{}", serde_json::to_string_pretty(&node.identity)?);
    Ok(())
}

/// Replace the identity signing key.
///
/// With `seed_hex` the key is derived from the 32-byte seed, so every
/// device given the same seed ends up with the same identity.
pub(crate) fn generate_key(
    config: &Config,
    seed_hex: Option<&str>,
    force: bool,
) -> anyhow::Result<()> {
    let key_path = config
        .identity_key_path()
        .context("no node home configured")?;

    if key_path.exists() {
        if !force {
            println!(
                "{}",
                Theme::warning("An identity key already exists. Pass --force to replace it.")
            );
            println!(
                "{}",
                Theme::warning(
                    "Databases that list the current identity as a writer will refuse the new one."
                )
            );
            return Ok(());
        }
        std::fs::remove_file(&key_path)?;
    }

    let key = match seed_hex {
        Some(seed_hex) => {
            let seed = hex::decode(seed_hex.trim()).context("seed must be hex")?;
            KeyPair::load_or_derive(&key_path, &seed)?
        },
        None => KeyPair::load_or_generate(&key_path)?,
    };
    let node = LocalNode::with_signing_key(config, &key)?;

    println!("{}", Theme::success("New identity key generated."));
    println!("  Identity: {}", node.identity.id);
    println!("  Key file: {}", key_path.display());
    println!();

    Ok(())
}
