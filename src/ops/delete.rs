//! Delete operations
//!
//! Plain delete wipes one label with a single wildcard call. Sweep delete
//! lists the whole store, picks every entry whose label contains the target
//! label as a substring, and issues one delete per entry concurrently.

use std::thread;
use std::time::Duration;

use crate::ops::OpError;
use crate::runner::FailurePolicy;
use crate::store::Store;

/// Delete every key under one label. Best-effort: a failing delete is
/// logged and the tool still exits cleanly.
pub fn delete_label(store: &Store, label: &str) -> Result<(), OpError> {
    store.delete_label(label, FailurePolicy::BestEffort)?;
    Ok(())
}

/// Delete matching entries across labels, one concurrent call per entry.
///
/// `delay` spaces out the spawns to rate-limit the external service. Every
/// matching entry gets exactly one delete call; individual failures are
/// logged by the runner and do not stop sibling deletions. Returns the
/// number of delete calls issued.
pub fn sweep(store: &Store, label: &str, delay: Duration) -> Result<usize, OpError> {
    let entries = store.list(None)?;

    let targets: Vec<(String, String)> = entries
        .into_iter()
        .filter_map(|entry| {
            let entry_label = entry.label.unwrap_or_default();
            if entry_label.contains(label) {
                Some((entry.key, entry_label))
            } else {
                None
            }
        })
        .collect();

    println!(
        "Deleting {} entries with labels matching {}",
        targets.len(),
        label
    );

    thread::scope(|scope| {
        for (key, entry_label) in &targets {
            thread::sleep(delay);
            scope.spawn(move || {
                let _ = store.delete_key(key, entry_label, FailurePolicy::BestEffort);
            });
        }
    });

    Ok(targets.len())
}
