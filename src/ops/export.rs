//! Export operation
//!
//! Exporting goes through a temporary label so the written file can include
//! inherited keys without mutating the source label: copy the label, remove
//! the reserved metadata keys from the copy, re-attach each recorded
//! inherited key from its source label, export the copy to the file and
//! redact secret references. The temporary label is deleted on every exit
//! path via a drop guard.

use chrono::Utc;
use regex_lite::Regex;
use std::fs;

use crate::config::ToolConfig;
use crate::inherited::InheritedKey;
use crate::ops::{OpError, TempLabelGuard};
use crate::runner::FailurePolicy;
use crate::store::{Store, INHERITED_KEY, RESERVED_KEYS};

/// Matches a secret reference object, e.g. `{ "uri": "https://..." }`.
const SECRET_REF_PATTERN: &str = r#"\{\s*"uri":\s*"\S*"\s*\}"#;

/// Export a label's settings to a JSON file with inherited keys attached
/// and secret references redacted.
pub fn export(store: &Store, label: &str, file: &str, config: &ToolConfig) -> Result<(), OpError> {
    let current = store.map(label)?;

    // Millisecond timestamp plus pid keeps concurrent exports of the same
    // label on separate temp labels.
    let temp_label = format!(
        "{}-tmp-{}-{}",
        label,
        Utc::now().format("%Y%m%d%H%M%S%3f"),
        std::process::id()
    );
    println!("Copying label {} to temporary label {}", label, temp_label);
    store.copy_label(label, &temp_label)?;
    let guard = TempLabelGuard::new(store, temp_label);

    // The copy carries the metadata keys along; they are not settings and
    // must not reach the exported file, so a failed removal is fatal.
    for key in RESERVED_KEYS {
        store.delete_key(key, guard.label(), FailurePolicy::Fatal)?;
    }

    if let Some(raw) = current.get(INHERITED_KEY) {
        let records: Vec<InheritedKey> =
            serde_json::from_str(raw).map_err(|source| OpError::MalformedInherited {
                label: label.to_string(),
                source,
            })?;
        println!("Re-attaching {} inherited keys", records.len());
        attach_inherited(store, guard.label(), &records)?;
    }

    println!("Export to file");
    store.export_to_file(Some(guard.label()), file)?;

    println!("Replace secrets");
    let content = fs::read_to_string(file).map_err(|source| OpError::Io {
        path: file.to_string(),
        source,
    })?;
    let redacted = redact_secret_refs(&content, &config.secret_placeholder);
    fs::write(file, redacted).map_err(|source| OpError::Io {
        path: file.to_string(),
        source,
    })?;

    Ok(())
}

/// Copy each recorded key's value from its source label onto `dest_label`.
/// A record pointing at a key that no longer exists on its source label is
/// a hard failure.
fn attach_inherited(
    store: &Store,
    dest_label: &str,
    records: &[InheritedKey],
) -> Result<(), OpError> {
    for record in records {
        let value = store.get(&record.key, &record.label)?;
        store.set(&record.key, dest_label, &value, None)?;
    }
    Ok(())
}

/// Replace every secret reference object with the quoted placeholder.
pub fn redact_secret_refs(content: &str, placeholder: &str) -> String {
    let re = Regex::new(SECRET_REF_PATTERN).expect("secret reference pattern is valid");
    re.replace_all(content, format!("\"{}\"", placeholder).as_str())
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_secret_ref() {
        let input = r#"{"db": {"uri": "https://vault.example/secrets/db"}}"#;
        assert_eq!(
            redact_secret_refs(input, "mysecret"),
            r#"{"db": "mysecret"}"#
        );
    }

    #[test]
    fn test_redact_tolerates_whitespace_inside_object() {
        let input = "{\"db\": {  \"uri\":   \"https://vault/secrets/x\"  }}";
        assert_eq!(redact_secret_refs(input, "mysecret"), "{\"db\": \"mysecret\"}");
    }

    #[test]
    fn test_redact_multiple_refs() {
        let input = r#"{"a": {"uri": "https://v/1"}, "b": {"uri": "https://v/2"}}"#;
        let out = redact_secret_refs(input, "mysecret");
        assert_eq!(out.matches("mysecret").count(), 2);
        assert!(!out.contains("uri"));
    }

    #[test]
    fn test_plain_values_untouched() {
        let input = r#"{"a": "1", "nested": {"b": "2"}}"#;
        assert_eq!(redact_secret_refs(input, "mysecret"), input);
    }
}
