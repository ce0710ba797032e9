//! Core types for itdgen
//!
//! This module holds the error taxonomy shared by every layer of the engine:
//! - [`MetadataError`] - Enumerated error types covering all engine failure modes
//! - [`ErrorContext`] - User-friendly error wrapper with suggestions and details
//! - [`user_friendly_error`] - Convert any error to user-friendly format
//! - [`IntoAnyhowWithContext`] - Extension trait for error conversion
//!
//! Engine operations return `Result<T, MetadataError>`; I/O-facing layers (config, CLI)
//! use [`anyhow::Result`] and are converted with [`user_friendly_error`] at the edge.

pub mod error;

pub use error::{ErrorContext, IntoAnyhowWithContext, MetadataError, user_friendly_error};
