//! The Terraform variable binding shared by `apply` and `refresh`.

use std::fmt;

use crate::domain::config::ProviderConfig;

/// Variables whose values never appear in logs.
const SENSITIVE: &[&str] = &["pm_api_token_secret", "ci_password"];

/// Ordered `name=value` pairs passed to Terraform as `-var` flags.
///
/// Built once per operation so every phase of that operation binds the
/// identical set.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct VariableSet {
    vars: Vec<(String, String)>,
}

impl VariableSet {
    /// Bind every configuration field plus this machine's own public key.
    #[must_use]
    pub fn for_machine(config: &ProviderConfig, machine_public_key: &str) -> Self {
        let mut set = Self::default();
        set.push("node_name", &config.proxmox.node_name);
        set.push("pm_api_url", &config.proxmox.api_url);
        set.push("pm_api_token_id", &config.proxmox.token_id);
        set.push("pm_api_token_secret", &config.proxmox.token_secret);
        set.push("proxmox_vm_id", &config.proxmox.vm_id);
        set.push("devpod_ssh_key", machine_public_key);
        set.push("ssh_key", &config.cloud_init.ssh_key);
        set.push("ci_user", &config.cloud_init.username);
        set.push("ci_password", &config.cloud_init.password);
        set.push("ci_ip", &config.cloud_init.ip);
        set.push("ci_gateway", &config.cloud_init.gateway);
        set
    }

    fn push(&mut self, name: &str, value: &str) {
        self.vars.push((name.to_string(), value.to_string()));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Render as Terraform CLI arguments: `-var name=value` per binding.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        self.vars
            .iter()
            .flat_map(|(name, value)| ["-var".to_string(), format!("{name}={value}")])
            .collect()
    }
}

/// Copy of a command line with the value of every sensitive `name=value`
/// argument replaced, fit for logging.
#[must_use]
pub fn redact_args(args: &[&str]) -> Vec<String> {
    args.iter()
        .map(|arg| match arg.split_once('=') {
            Some((name, _)) if SENSITIVE.contains(&name) => format!("{name}=<redacted>"),
            _ => (*arg).to_string(),
        })
        .collect()
}

impl fmt::Debug for VariableSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, value) in &self.vars {
            if SENSITIVE.contains(&name.as_str()) {
                map.entry(name, &"<redacted>");
            } else {
                map.entry(name, value);
            }
        }
        map.finish()
    }
}
