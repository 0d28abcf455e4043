//! Key Vault secret index
//!
//! Secrets are named `{env}-{app}-{key parts...}` in the vault. The index
//! groups them by app key (`{env}-{app}`) and maps the remaining name
//! components, rejoined with `:`, to the secret's Key Vault identifier.
//! The index is built once per import and threaded through explicitly.

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::store::Store;

/// One secret as listed by the external tool.
#[derive(Debug, Clone, Deserialize)]
pub struct VaultSecret {
    pub id: String,
    pub name: String,
}

/// Secrets grouped by app key.
#[derive(Debug, Clone, Default)]
pub struct SecretIndex {
    by_app: BTreeMap<String, BTreeMap<String, String>>,
}

impl SecretIndex {
    /// Build the index from the vault listing of the given store deployment.
    pub fn load(store: &Store, vault: &str) -> Result<Self, SecretError> {
        let out = store
            .list_vault_secrets(vault)
            .map_err(|_| SecretError::VaultUnavailable {
                vault: vault.to_string(),
            })?;
        let secrets: Vec<VaultSecret> =
            serde_json::from_slice(&out).map_err(SecretError::Parse)?;
        Ok(Self::from_secrets(secrets))
    }

    /// Index a secret listing. Names with fewer than three components do
    /// not belong to any app and are skipped.
    pub fn from_secrets(secrets: Vec<VaultSecret>) -> Self {
        let mut by_app: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for secret in secrets {
            let parts: Vec<&str> = secret.name.split('-').collect();
            if parts.len() < 3 {
                continue;
            }
            let app_key = format!("{}-{}", parts[0], parts[1]);
            let setting_key = parts[2..].join(":");
            by_app.entry(app_key).or_default().insert(setting_key, secret.id);
        }
        Self { by_app }
    }

    /// Secrets recorded for one app key, if any.
    pub fn for_app(&self, app_key: &str) -> Option<&BTreeMap<String, String>> {
        self.by_app.get(app_key)
    }

    pub fn is_empty(&self) -> bool {
        self.by_app.is_empty()
    }
}

/// Secret index errors
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("cannot retrieve key vault keys from {vault}")]
    VaultUnavailable { vault: String },

    #[error("cannot parse key vault secret list: {0}")]
    Parse(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(name: &str, id: &str) -> VaultSecret {
        VaultSecret {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn test_name_split_into_app_and_key() {
        let index = SecretIndex::from_secrets(vec![secret(
            "ci-clientservices-db-password",
            "https://vault/secrets/1",
        )]);

        let app = index.for_app("ci-clientservices").unwrap();
        assert_eq!(app["db:password"], "https://vault/secrets/1");
    }

    #[test]
    fn test_three_component_name() {
        let index = SecretIndex::from_secrets(vec![secret("ci-app-token", "id1")]);
        assert_eq!(index.for_app("ci-app").unwrap()["token"], "id1");
    }

    #[test]
    fn test_short_names_skipped() {
        let index = SecretIndex::from_secrets(vec![secret("ci-app", "id1"), secret("lone", "id2")]);
        assert!(index.is_empty());
    }

    #[test]
    fn test_multiple_secrets_same_app() {
        let index = SecretIndex::from_secrets(vec![
            secret("ci-app-db-user", "id1"),
            secret("ci-app-db-password", "id2"),
            secret("ctp-app-db-user", "id3"),
        ]);

        let ci = index.for_app("ci-app").unwrap();
        assert_eq!(ci.len(), 2);
        assert_eq!(ci["db:user"], "id1");
        assert_eq!(ci["db:password"], "id2");
        assert_eq!(index.for_app("ctp-app").unwrap().len(), 1);
        assert!(index.for_app("dev-app").is_none());
    }

    #[test]
    fn test_decodes_vault_listing() {
        let json = r#"[
            {"id": "https://appconfigkv.vault.azure.net/secrets/ci-app-token",
             "name": "ci-app-token", "attributes": {"enabled": true}}
        ]"#;
        let secrets: Vec<VaultSecret> = serde_json::from_str(json).unwrap();
        let index = SecretIndex::from_secrets(secrets);
        assert!(index.for_app("ci-app").is_some());
    }
}
