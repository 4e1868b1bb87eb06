//! Machine status derived from Terraform state.
//!
//! Pure functions only. The state file format belongs to Terraform; only two
//! parts of it are read here: whether any values are recorded, and the
//! declared outputs.

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;

/// Output holding the machine's externally reachable address.
pub const PUBLIC_IP_OUTPUT: &str = "public_ip";

/// Lifecycle state reported by `status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MachineStatus {
    NotFound,
    Busy,
    Running,
}

impl fmt::Display for MachineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "NotFound",
            Self::Busy => "Busy",
            Self::Running => "Running",
        })
    }
}

/// The subset of `terraform show -json` this provider reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateSnapshot {
    #[serde(default)]
    pub values: Option<StateValues>,
}

/// Recorded values of a state snapshot.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StateValues {
    #[serde(default)]
    pub outputs: Option<BTreeMap<String, serde_json::Value>>,
}

impl StateSnapshot {
    /// Classify the machine from this snapshot.
    ///
    /// No values → `NotFound`; non-empty outputs → `Running`; anything else
    /// → `Busy`. A project that declares no outputs therefore never leaves
    /// `Busy`.
    #[must_use]
    pub fn status(&self) -> MachineStatus {
        let Some(values) = &self.values else {
            return MachineStatus::NotFound;
        };
        match &values.outputs {
            Some(outputs) if !outputs.is_empty() => MachineStatus::Running,
            _ => MachineStatus::Busy,
        }
    }
}

/// Read a named output from `terraform output -json`.
///
/// Accepts both the tool's `{ "value": ... }` envelope and a bare value.
/// Returns `None` when the output is absent or null. Non-string values are
/// rendered as JSON with quotes removed.
#[must_use]
pub fn output_value(outputs: &serde_json::Map<String, serde_json::Value>, name: &str) -> Option<String> {
    let raw = outputs.get(name)?;
    let value = match raw {
        serde_json::Value::Object(envelope) if envelope.contains_key("value") => &envelope["value"],
        other => other,
    };
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        other => Some(other.to_string().replace('"', "")),
    }
}

/// Strip an optional CIDR suffix: `10.0.0.5/24` → `10.0.0.5`.
#[must_use]
pub fn strip_cidr(address: &str) -> &str {
    address.split('/').next().unwrap_or(address).trim()
}
