//! App Configuration store client
//!
//! Typed wrapper over the runner for one store resource. List output is
//! decoded from the tool's JSON array of `{key, label, value}` records and
//! flattened into a key-to-value map per label.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::invocation::AzCli;
use crate::runner::{FailurePolicy, Runner, RunnerError};

/// Reserved key holding the structural shape of a label.
pub const APPSETTINGS_KEY: &str = "appsettings";

/// Reserved key holding the inherited-key records of a label.
pub const INHERITED_KEY: &str = "inherited";

/// Metadata keys, excluded from copies and value comparisons.
pub const RESERVED_KEYS: [&str; 2] = [APPSETTINGS_KEY, INHERITED_KEY];

/// One configuration entry as listed by the external tool.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingEntry {
    pub key: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
}

/// Flatten entries into a key-to-value map. With duplicate keys the last
/// entry wins; the tool promises no ordering, and neither do we.
pub fn settings_map(entries: &[SettingEntry]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    for entry in entries {
        map.insert(entry.key.clone(), entry.value.clone().unwrap_or_default());
    }
    map
}

/// Client for one App Configuration resource.
#[derive(Debug, Clone)]
pub struct Store {
    cli: AzCli,
    runner: Runner,
    resource: String,
}

impl Store {
    pub fn new(program: &str, resource: String) -> Self {
        Self {
            cli: AzCli::new(program),
            runner: Runner::new(),
            resource,
        }
    }

    /// List entries under a label, or across all labels when `label` is
    /// `None`. An empty result is no matches, not an error.
    pub fn list(&self, label: Option<&str>) -> Result<Vec<SettingEntry>, StoreError> {
        let inv = self.cli.kv_list(&self.resource, label);
        let out = self.runner.capture(&inv)?;
        serde_json::from_slice(&out).map_err(|source| StoreError::Parse {
            label: label.unwrap_or("<all>").to_string(),
            source,
        })
    }

    /// Key-to-value map for one label.
    pub fn map(&self, label: &str) -> Result<BTreeMap<String, String>, StoreError> {
        Ok(settings_map(&self.list(Some(label))?))
    }

    /// Retrieve one key's value from a label. A missing key is a hard
    /// failure here, unlike the empty-list case.
    pub fn get(&self, key: &str, label: &str) -> Result<String, StoreError> {
        self.map(label)?
            .remove(key)
            .ok_or_else(|| StoreError::MissingKey {
                key: key.to_string(),
                label: label.to_string(),
            })
    }

    /// Set one key's value under a label.
    pub fn set(
        &self,
        key: &str,
        label: &str,
        value: &str,
        content_type: Option<&str>,
    ) -> Result<(), StoreError> {
        let inv = self.cli.kv_set(&self.resource, key, label, value, content_type);
        self.runner.run(&inv, FailurePolicy::Fatal)?;
        Ok(())
    }

    /// Attach a Key Vault secret reference to a key under a label.
    pub fn set_keyvault_ref(&self, key: &str, label: &str, secret_id: &str) -> Result<(), StoreError> {
        let inv = self.cli.kv_set_keyvault(&self.resource, key, label, secret_id);
        self.runner.run(&inv, FailurePolicy::Fatal)?;
        Ok(())
    }

    /// Delete one key under a label. Returns whether the call succeeded
    /// when the policy is best-effort.
    pub fn delete_key(
        &self,
        key: &str,
        label: &str,
        policy: FailurePolicy,
    ) -> Result<bool, StoreError> {
        let inv = self.cli.kv_delete(&self.resource, key, label);
        Ok(self.runner.run(&inv, policy)?)
    }

    /// Delete every key under a label (wildcard match).
    pub fn delete_label(&self, label: &str, policy: FailurePolicy) -> Result<bool, StoreError> {
        self.delete_key("*", label, policy)
    }

    /// Export a label (or the whole store) to a local JSON file.
    pub fn export_to_file(&self, label: Option<&str>, path: &str) -> Result<(), StoreError> {
        let inv = self.cli.kv_export_file(&self.resource, label, path);
        self.runner.run(&inv, FailurePolicy::Fatal)?;
        Ok(())
    }

    /// Copy every key of one label onto another label in the same store.
    pub fn copy_label(&self, src_label: &str, dest_label: &str) -> Result<(), StoreError> {
        let inv = self.cli.kv_export_label(&self.resource, src_label, dest_label);
        self.runner.run(&inv, FailurePolicy::Fatal)?;
        Ok(())
    }

    /// Import a local JSON file into a label.
    pub fn import_file(&self, label: &str, path: &str) -> Result<(), StoreError> {
        let inv = self.cli.kv_import_file(&self.resource, label, path);
        self.runner.run(&inv, FailurePolicy::Fatal)?;
        Ok(())
    }

    /// List all secrets in a Key Vault, returning raw JSON bytes for the
    /// secrets module to decode.
    pub fn list_vault_secrets(&self, vault: &str) -> Result<Vec<u8>, StoreError> {
        let inv = self.cli.keyvault_secret_list(vault);
        Ok(self.runner.capture(&inv)?)
    }
}

/// Store client errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Runner(#[from] RunnerError),

    #[error("cannot parse setting list for label {label}: {source}")]
    Parse {
        label: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot retrieve key {key} from label {label}")]
    MissingKey { key: String, label: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, label: &str, value: Option<&str>) -> SettingEntry {
        SettingEntry {
            key: key.to_string(),
            label: Some(label.to_string()),
            value: value.map(|v| v.to_string()),
        }
    }

    #[test]
    fn test_settings_map_flattens() {
        let entries = vec![
            entry("a", "host1", Some("1")),
            entry("b", "host1", Some("2")),
        ];
        let map = settings_map(&entries);
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], "1");
        assert_eq!(map["b"], "2");
    }

    #[test]
    fn test_settings_map_last_entry_wins() {
        let entries = vec![
            entry("a", "host1", Some("old")),
            entry("a", "host1", Some("new")),
        ];
        let map = settings_map(&entries);
        assert_eq!(map["a"], "new");
    }

    #[test]
    fn test_settings_map_null_value_becomes_empty() {
        let entries = vec![entry("a", "host1", None)];
        assert_eq!(settings_map(&entries)["a"], "");
    }

    #[test]
    fn test_entry_decodes_tool_output() {
        let json = r#"[
            {"key": "a", "label": "host1", "value": "1", "contentType": null,
             "lastModified": "2024-01-01T00:00:00+00:00", "locked": false, "tags": {}},
            {"key": "b", "label": null, "value": null}
        ]"#;
        let entries: Vec<SettingEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].key, "a");
        assert_eq!(entries[1].label, None);
        assert_eq!(entries[1].value, None);
    }

    #[test]
    fn test_reserved_keys() {
        assert!(RESERVED_KEYS.contains(&APPSETTINGS_KEY));
        assert!(RESERVED_KEYS.contains(&INHERITED_KEY));
    }
}
