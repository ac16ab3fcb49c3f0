//! Integration test crate for the tempora workspace.
//!
//! The interesting content lives under `tests/`; this library is an empty
//! anchor so the crate participates in the workspace.
