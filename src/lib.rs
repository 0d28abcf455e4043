//! azconfig - Label automation for Azure App Configuration
//!
//! This crate drives the `az` CLI to manage settings under App Configuration
//! labels: wiping a label, exporting it with secret references redacted,
//! importing a file while recording which keys are inherited from ancestor
//! labels, and publishing the keys-only structural shape of a label.

pub mod config;
pub mod inherited;
pub mod invocation;
pub mod ops;
pub mod runner;
pub mod secrets;
pub mod store;

pub use config::{ConfigError, ToolConfig};
pub use inherited::InheritedKey;
pub use invocation::{AzCli, Invocation};
pub use ops::OpError;
pub use runner::{FailurePolicy, Runner, RunnerError};
pub use secrets::{SecretError, SecretIndex};
pub use store::{SettingEntry, Store, StoreError};
