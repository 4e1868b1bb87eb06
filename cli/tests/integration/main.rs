//! Integration tests for the proxmox provider
//!
//! These tests spawn the actual binary and test end-to-end behavior.
//! A stub `terraform` script stands in for the real tool.

mod lifecycle_tests;
