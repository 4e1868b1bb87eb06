//! Application services for the machine lifecycle.
//!
//! Each module imports only from `crate::domain` and
//! `crate::application::ports`.

pub mod lifecycle;
pub mod project;
pub mod remote;


pub use lifecycle::{Lifecycle, install};
pub use project::{ProjectSource, ensure_project};
pub use remote::execute;
