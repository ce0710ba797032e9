//! Integration test suite for itdgen
//!
//! End-to-end tests of the metadata engine through the public API and of the `itdgen`
//! binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **engine**: caching, recomputation counts, cycles and missing upstreams
//! - **notification**: change propagation through the dependency registry
//! - **regeneration**: deterministic output and incremental regeneration of aspects
//! - **pipeline**: concurrent change producers
//! - **cli**: the `generate`, `graph` and `inspect` commands

// Shared test utilities (from parent tests/ directory)
#[path = "../common/mod.rs"]
mod common;

mod cli;
mod engine;
mod notification;
mod pipeline;
mod regeneration;
