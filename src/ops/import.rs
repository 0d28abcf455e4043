//! Import operation
//!
//! Rebuilds a label from a file: wipe the label, import the file, attach
//! Key Vault references for imported keys the vault knows about, publish
//! the structural shape, then strip out every key whose value already
//! exists on an ancestor label and record it in the inherited list instead.

use std::path::Path;

use crate::config::ToolConfig;
use crate::inherited::{compute_inherited, InheritedKey};
use crate::ops::{appsettings, OpError};
use crate::runner::FailurePolicy;
use crate::secrets::SecretIndex;
use crate::store::{Store, INHERITED_KEY};

/// Import a settings file into a label with provenance tracking.
pub fn import(
    store: &Store,
    env: &str,
    label: &str,
    file: &str,
    config: &ToolConfig,
) -> Result<(), OpError> {
    if !Path::new(file).exists() {
        return Err(OpError::ImportFileMissing {
            path: file.to_string(),
        });
    }

    let secrets = SecretIndex::load(store, &config.key_vault_name)?;

    // Best-effort wipe; a label that does not exist yet is fine.
    store.delete_label(label, FailurePolicy::BestEffort)?;

    store.import_file(label, file)?;
    let current = store.map(label)?;

    if let Some(app_secrets) = secrets.for_app(&format!("{}-{}", env, label)) {
        for (key, secret_id) in app_secrets {
            if current.contains_key(key) {
                store.set_keyvault_ref(key, label, secret_id)?;
            }
        }
    }

    appsettings::set_appsettings(store, label, config)?;

    let root = store.map(&config.root_label)?;

    // Labels of the form {env}-{host} also inherit from the environment tier.
    let parts: Vec<&str> = label.split('-').collect();
    let intermediate_map;
    let intermediate = if parts.len() == 2 {
        intermediate_map = store.map(parts[0])?;
        Some((parts[0], &intermediate_map))
    } else {
        None
    };

    let inherited = compute_inherited(&current, &config.root_label, &root, intermediate);
    prune_inherited(store, label, &inherited)?;

    let payload = serde_json::to_string(&inherited)?;
    store.set(INHERITED_KEY, label, &payload, None)?;
    println!(
        "Recorded {} inherited keys for label {}",
        inherited.len(),
        label
    );

    Ok(())
}

/// Remove each inherited key from the label so it resolves through its
/// ancestor instead of a duplicated copy. Best-effort per key.
fn prune_inherited(store: &Store, label: &str, inherited: &[InheritedKey]) -> Result<(), OpError> {
    for record in inherited {
        store.delete_key(&record.key, label, FailurePolicy::BestEffort)?;
    }
    Ok(())
}
