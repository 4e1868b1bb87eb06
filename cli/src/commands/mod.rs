//! Command implementations

pub mod command;
pub mod create;
pub mod delete;
pub mod init;
pub mod status;
