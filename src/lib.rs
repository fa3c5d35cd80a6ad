//! Buyer trust scoring and supplier KYB verification for the marketplace.
//!
//! The library is storage-agnostic: every workflow talks to its collaborators
//! (repositories, notification sinks, compliance-check providers, the bank
//! detail cipher) through traits, with in-memory implementations used by the
//! bundled server binary and the test suites.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
