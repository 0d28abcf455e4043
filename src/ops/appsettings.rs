//! Appsettings shape operation
//!
//! Stores the keys-only structural shape of a label under the reserved
//! `appsettings` key: every string value in the exported document is
//! replaced by a fixed placeholder token, then the whole document is
//! JSON-quoted into a single string with spaces stripped. Downstream
//! consumers get the settings schema without any value material.

use regex_lite::Regex;
use std::fs;

use crate::config::ToolConfig;
use crate::ops::{OpError, TempFileGuard};
use crate::store::{Store, APPSETTINGS_KEY};

/// Token standing in for every scrubbed value.
pub const VALUE_PLACEHOLDER: &str = "{{}}";

/// Matches a `: "value"` pair tail on one line of pretty-printed JSON.
const VALUE_PATTERN: &str = r#":\s+".+""#;

/// Export the label, reduce it to its structural shape and store the
/// result under the `appsettings` key with JSON content type.
pub fn set_appsettings(store: &Store, label: &str, config: &ToolConfig) -> Result<(), OpError> {
    let export_label = if label.is_empty() { None } else { Some(label) };
    store.export_to_file(export_label, &config.temp_file)?;
    let _guard = TempFileGuard::new(config.temp_file.as_str());

    let content = fs::read_to_string(&config.temp_file).map_err(|source| OpError::Io {
        path: config.temp_file.clone(),
        source,
    })?;

    let shape = structural_shape(&content)?;
    store.set(APPSETTINGS_KEY, label, &shape, Some("application/json"))?;
    Ok(())
}

/// Reduce an exported JSON document to a quoted, space-free shape string.
pub fn structural_shape(content: &str) -> Result<String, OpError> {
    let re = Regex::new(VALUE_PATTERN).expect("value pattern is valid");
    let scrubbed = re.replace_all(content, format!(":\"{}\"", VALUE_PLACEHOLDER).as_str());
    let quoted = serde_json::to_string(scrubbed.as_ref())?;
    Ok(quoted.replace(' ', ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_structural_shape_scrubs_values() {
        let shape = structural_shape("{\n  \"a\": \"1\"\n}").unwrap();
        assert_eq!(shape, "\"{\\n\\\"a\\\":\\\"{{}}\\\"\\n}\"");
    }

    #[test]
    fn test_shape_unescapes_to_valid_json() {
        let input = "{\n  \"app:name\": \"client\",\n  \"app:retries\": \"5\"\n}";
        let shape = structural_shape(input).unwrap();

        // The stored value is itself a JSON string; unescaping it must give
        // back a document with the same keys and only placeholder values.
        let inner: String = serde_json::from_str(&shape).unwrap();
        let doc: Value = serde_json::from_str(&inner).unwrap();
        assert_eq!(doc["app:name"], VALUE_PLACEHOLDER);
        assert_eq!(doc["app:retries"], VALUE_PLACEHOLDER);
    }

    #[test]
    fn test_shape_contains_no_spaces() {
        let shape = structural_shape("{\n  \"a b\": \"value with spaces\"\n}").unwrap();
        assert!(!shape.contains(' '));
    }

    #[test]
    fn test_value_with_embedded_colon_scrubbed() {
        let shape = structural_shape("{\n  \"url\": \"https://example.com\"\n}").unwrap();
        let inner: String = serde_json::from_str(&shape).unwrap();
        let doc: Value = serde_json::from_str(&inner).unwrap();
        assert_eq!(doc["url"], VALUE_PLACEHOLDER);
    }
}
