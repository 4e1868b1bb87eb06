//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod config;
pub mod error;
pub mod status;
pub mod vars;

pub use config::ProviderConfig;
pub use error::{InconclusiveStatus, ProviderError, ToolPhase};
pub use status::{MachineStatus, PUBLIC_IP_OUTPUT, StateSnapshot, output_value, strip_cidr};
pub use vars::VariableSet;
