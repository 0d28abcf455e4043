//! Inherited-key bookkeeping
//!
//! A key whose value in the current label is identical to its value in an
//! ancestor label is not stored twice. Import removes it from the current
//! label and records where it came from, so export can reconstruct the
//! full map later. The records are serialized as a JSON array under the
//! reserved `inherited` key of the current label.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::store::RESERVED_KEYS;

/// One key resolved by inheritance instead of duplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InheritedKey {
    /// Ancestor label holding the value.
    pub label: String,
    /// The inherited key.
    pub key: String,
}

/// Find every non-reserved key of `current` whose value matches the root
/// map or the intermediate map.
///
/// When both ancestors match, root wins. That preference is long-standing
/// observed behavior and downstream consumers rely on the recorded source
/// label, so it stays.
pub fn compute_inherited(
    current: &BTreeMap<String, String>,
    root_label: &str,
    root: &BTreeMap<String, String>,
    intermediate: Option<(&str, &BTreeMap<String, String>)>,
) -> Vec<InheritedKey> {
    let mut inherited = Vec::new();

    for (key, value) in current {
        if RESERVED_KEYS.contains(&key.as_str()) {
            continue;
        }

        let source = if root.get(key) == Some(value) {
            Some(root_label)
        } else {
            intermediate
                .filter(|(_, map)| map.get(key) == Some(value))
                .map(|(label, _)| label)
        };

        if let Some(label) = source {
            inherited.push(InheritedKey {
                label: label.to_string(),
                key: key.clone(),
            });
        }
    }

    inherited
}
