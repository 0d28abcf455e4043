//! Invocation builders for the external management tool
//!
//! Every call to the `az` CLI is assembled here as an explicit argument
//! vector. Values are passed through as single arguments, so payloads
//! containing spaces or separator characters survive intact; nothing is
//! ever round-tripped through a whitespace-split command string.

/// Sentinel the `az` CLI expects for the null (empty) label.
pub const NULL_LABEL: &str = "\\0";

/// A ready-to-execute argument vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    /// Program to execute.
    pub program: String,
    /// Arguments, one element per argument.
    pub args: Vec<String>,
}

impl Invocation {
    fn new(program: &str, args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Render the invocation for log output. Display only; execution always
    /// uses the argument vector.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}

/// Builder for `az` invocations against one store/vault deployment.
#[derive(Debug, Clone)]
pub struct AzCli {
    program: String,
}

impl AzCli {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// List all entries under a label, or across all labels when `label`
    /// is `None`.
    pub fn kv_list(&self, resource: &str, label: Option<&str>) -> Invocation {
        let mut args = vec!["appconfig", "kv", "list", "--name", resource];
        if let Some(label) = label {
            args.push("--label");
            args.push(label_arg(label));
        }
        Invocation::new(&self.program, &args)
    }

    /// Delete entries matching a key pattern under a label. The pattern may
    /// be a literal key or the `*` wildcard.
    pub fn kv_delete(&self, resource: &str, key: &str, label: &str) -> Invocation {
        Invocation::new(
            &self.program,
            &[
                "appconfig",
                "kv",
                "delete",
                "--name",
                resource,
                "--yes",
                "--key",
                key,
                "--label",
                label_arg(label),
            ],
        )
    }

    /// Set one key's value under a label, optionally with a content type.
    pub fn kv_set(
        &self,
        resource: &str,
        key: &str,
        label: &str,
        value: &str,
        content_type: Option<&str>,
    ) -> Invocation {
        let mut args = vec![
            "appconfig",
            "kv",
            "set",
            "--name",
            resource,
            "--key",
            key,
            "--label",
            label_arg(label),
        ];
        if let Some(ct) = content_type {
            args.push("--content-type");
            args.push(ct);
        }
        args.extend(["--yes", "--value", value]);
        Invocation::new(&self.program, &args)
    }

    /// Attach a Key Vault secret reference to a key under a label.
    pub fn kv_set_keyvault(
        &self,
        resource: &str,
        key: &str,
        label: &str,
        secret_id: &str,
    ) -> Invocation {
        Invocation::new(
            &self.program,
            &[
                "appconfig",
                "kv",
                "set-keyvault",
                "--yes",
                "--name",
                resource,
                "--key",
                key,
                "--label",
                label_arg(label),
                "--secret-identifier",
                secret_id,
            ],
        )
    }

    /// Export a label to a local JSON file. `label: None` exports the
    /// store without a label filter.
    pub fn kv_export_file(&self, resource: &str, label: Option<&str>, path: &str) -> Invocation {
        let mut args = vec![
            "appconfig",
            "kv",
            "export",
            "--name",
            resource,
            "--destination",
            "file",
            "--path",
            path,
            "--format",
            "json",
            "--separator",
            ":",
            "--yes",
        ];
        if let Some(label) = label {
            args.push("--label");
            args.push(label_arg(label));
        }
        Invocation::new(&self.program, &args)
    }

    /// Copy every key of one label to another label in the same store.
    pub fn kv_export_label(&self, resource: &str, src_label: &str, dest_label: &str) -> Invocation {
        Invocation::new(
            &self.program,
            &[
                "appconfig",
                "kv",
                "export",
                "--yes",
                "--name",
                resource,
                "--destination",
                "appconfig",
                "--key",
                "*",
                "--label",
                label_arg(src_label),
                "--dest-name",
                resource,
                "--dest-label",
                dest_label,
            ],
        )
    }

    /// Import a local JSON file into a label.
    pub fn kv_import_file(&self, resource: &str, label: &str, path: &str) -> Invocation {
        Invocation::new(
            &self.program,
            &[
                "appconfig",
                "kv",
                "import",
                "--name",
                resource,
                "--source",
                "file",
                "--path",
                path,
                "--format",
                "json",
                "--separator",
                ":",
                "--yes",
                "--label",
                label_arg(label),
            ],
        )
    }

    /// List all secrets in a Key Vault.
    pub fn keyvault_secret_list(&self, vault: &str) -> Invocation {
        Invocation::new(
            &self.program,
            &["keyvault", "secret", "list", "--vault-name", vault],
        )
    }
}

/// Empty labels are addressed with the `\0` sentinel.
fn label_arg(label: &str) -> &str {
    if label.is_empty() {
        NULL_LABEL
    } else {
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli() -> AzCli {
        AzCli::new("az")
    }

    #[test]
    fn test_kv_list_with_label() {
        let inv = cli().kv_list("hostappconfig-ci", Some("host1"));
        assert_eq!(inv.program, "az");
        assert_eq!(
            inv.args,
            vec!["appconfig", "kv", "list", "--name", "hostappconfig-ci", "--label", "host1"]
        );
    }

    #[test]
    fn test_kv_list_all_labels() {
        let inv = cli().kv_list("hostappconfig-ci", None);
        assert!(!inv.args.contains(&"--label".to_string()));
    }

    #[test]
    fn test_empty_label_sentinel() {
        let inv = cli().kv_delete("hostappconfig-ci", "*", "");
        assert_eq!(inv.args.last().unwrap(), NULL_LABEL);
    }

    #[test]
    fn test_value_with_spaces_stays_one_argument() {
        let inv = cli().kv_set("r", "k", "l", "a value with spaces", None);
        assert_eq!(inv.args.last().unwrap(), "a value with spaces");
        // Rendering joins on spaces, but execution never re-splits
        assert!(inv.command_line().ends_with("--yes --value a value with spaces"));
    }

    #[test]
    fn test_kv_set_content_type_before_value() {
        let inv = cli().kv_set("r", "appsettings", "host1", "{}", Some("application/json"));
        let ct = inv.args.iter().position(|a| a == "--content-type").unwrap();
        let value = inv.args.iter().position(|a| a == "--value").unwrap();
        assert_eq!(inv.args[ct + 1], "application/json");
        assert!(ct < value);
    }

    #[test]
    fn test_kv_export_label_shape() {
        let inv = cli().kv_export_label("r", "host1", "host1-tmp-1");
        let line = inv.command_line();
        assert!(line.contains("--destination appconfig"));
        assert!(line.contains("--key *"));
        assert!(line.contains("--dest-name r"));
        assert!(line.contains("--dest-label host1-tmp-1"));
    }

    #[test]
    fn test_kv_import_file_shape() {
        let inv = cli().kv_import_file("r", "host1", "settings.json");
        let line = inv.command_line();
        assert!(line.starts_with("az appconfig kv import --name r"));
        assert!(line.contains("--source file --path settings.json"));
        assert!(line.contains("--separator :"));
        assert!(line.ends_with("--label host1"));
    }
}
