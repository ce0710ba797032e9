//! Error handling for itdgen
//!
//! This module provides the error taxonomy of the metadata engine and user-friendly error
//! reporting for the CLI. The error system is designed around two core principles:
//! 1. **Strongly-typed errors** so callers can tell a cycle from a missing provider
//! 2. **Local recovery** so one broken governor never aborts a whole regeneration pass
//!
//! # Architecture
//!
//! - [`MetadataError`] - Enumerated error types for every failure in the engine
//! - [`ErrorContext`] - Wrapper that adds user-friendly messages and suggestions
//!
//! # Propagation Policy
//!
//! Only two variants ever escape a `get`:
//! - [`MetadataError::MalformedIdentifier`] is always surfaced to the caller
//! - [`MetadataError::CyclicDependency`] fails the computation chain that closed the
//!   cycle; every identifier on that chain is cached as invalid first
//!
//! [`MetadataError::MissingUpstream`] and [`MetadataError::ProviderNotFound`] are
//! converted into invalid metadata items by the engine and providers, and travel
//! downstream as invalidity rather than as errors.
//!
//! # Examples
//!
//! ```rust,no_run
//! use itdgen::core::{MetadataError, user_friendly_error};
//!
//! let error = MetadataError::ProviderNotFound {
//!     tag: "JavaBaen".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display(); // Shows colored error with suggestions
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for metadata operations
///
/// # Error Categories
///
/// ## Addressing
/// - [`MalformedIdentifier`] - identifier string does not parse or has the wrong tag
/// - [`InvalidSymbol`] - a Java name, type or logical path failed validation
///
/// ## Dependency Graph
/// - [`CyclicDependency`] - a computation or notification burst revisited itself
/// - [`MissingUpstream`] - an upstream item was absent or invalid
/// - [`ProviderNotFound`] - no provider registered for a tag
///
/// ## Ambient
/// - [`ConfigError`] - configuration or project file problems
/// - [`IoError`] / [`TomlError`] - converted from the underlying crates
///
/// [`MalformedIdentifier`]: MetadataError::MalformedIdentifier
/// [`InvalidSymbol`]: MetadataError::InvalidSymbol
/// [`CyclicDependency`]: MetadataError::CyclicDependency
/// [`MissingUpstream`]: MetadataError::MissingUpstream
/// [`ProviderNotFound`]: MetadataError::ProviderNotFound
/// [`ConfigError`]: MetadataError::ConfigError
/// [`IoError`]: MetadataError::IoError
/// [`TomlError`]: MetadataError::TomlError
#[derive(Error, Debug)]
pub enum MetadataError {
    /// A metadata identification string could not be parsed, or its provider tag
    /// segment did not match the tag the caller expected.
    #[error("Malformed metadata identifier '{id}': {reason}")]
    MalformedIdentifier {
        /// The offending identifier string
        id: String,
        /// Why it was rejected
        reason: String,
    },

    /// A Java identifier, type name or logical path failed validation.
    #[error("Invalid symbol: {symbol}")]
    InvalidSymbol {
        /// The rejected text
        symbol: String,
    },

    /// The dependency graph violated acyclicity.
    ///
    /// `cycle` lists the identifiers from the first repeated one back to itself.
    #[error("Cyclic metadata dependency detected: {}", .cycle.join(" → "))]
    CyclicDependency {
        /// The identifiers forming the cycle, first and last equal
        cycle: Vec<String>,
    },

    /// An upstream identifier resolved to nothing usable.
    #[error("Metadata '{downstream}' requires '{upstream}', which is missing or invalid")]
    MissingUpstream {
        /// The identifier being computed
        downstream: String,
        /// The upstream it could not use
        upstream: String,
    },

    /// No provider is registered for a provider tag.
    #[error("No metadata provider registered for '{tag}'")]
    ProviderNotFound {
        /// The unmatched provider tag
        tag: String,
    },

    /// Configuration or project file error.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the problem
        message: String,
    },

    /// I/O error from [`std::io::Error`].
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML parsing error from [`toml::de::Error`].
    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl Clone for MetadataError {
    fn clone(&self) -> Self {
        match self {
            Self::MalformedIdentifier {
                id,
                reason,
            } => Self::MalformedIdentifier {
                id: id.clone(),
                reason: reason.clone(),
            },
            Self::InvalidSymbol {
                symbol,
            } => Self::InvalidSymbol {
                symbol: symbol.clone(),
            },
            Self::CyclicDependency {
                cycle,
            } => Self::CyclicDependency {
                cycle: cycle.clone(),
            },
            Self::MissingUpstream {
                downstream,
                upstream,
            } => Self::MissingUpstream {
                downstream: downstream.clone(),
                upstream: upstream.clone(),
            },
            Self::ProviderNotFound {
                tag,
            } => Self::ProviderNotFound {
                tag: tag.clone(),
            },
            Self::ConfigError {
                message,
            } => Self::ConfigError {
                message: message.clone(),
            },
            // io and toml errors are not Clone; keep the message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            Self::TomlError(e) => Self::ConfigError {
                message: e.to_string(),
            },
        }
    }
}

impl MetadataError {
    /// Build a [`MetadataError::MalformedIdentifier`].
    pub fn malformed(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedIdentifier {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// True for errors that must abort the current computation chain.
    pub const fn is_fatal_to_computation(&self) -> bool {
        matches!(self, Self::CyclicDependency { .. } | Self::MalformedIdentifier { .. })
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// Suggestions are displayed in green, details in yellow, the error itself in red.
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: MetadataError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context from a [`MetadataError`]
    #[must_use]
    pub const fn new(error: MetadataError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Extension trait for converting [`MetadataError`] to [`anyhow::Error`] with context
pub trait IntoAnyhowWithContext {
    /// Convert the error to an [`anyhow::Error`] with the provided context
    fn into_anyhow_with_context(self, context: ErrorContext) -> anyhow::Error;
}

impl IntoAnyhowWithContext for MetadataError {
    fn into_anyhow_with_context(self, context: ErrorContext) -> anyhow::Error {
        anyhow::Error::new(ErrorContext {
            error: self,
            suggestion: context.suggestion,
            details: context.details,
        })
    }
}

/// Convert any error to a user-friendly [`ErrorContext`] with actionable suggestions
///
/// Recognizes [`ErrorContext`] (passed through), [`MetadataError`] variants,
/// [`std::io::Error`] and [`toml::de::Error`]; anything else is wrapped with its full
/// cause chain as details.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(ctx) = error.downcast_ref::<ErrorContext>() {
        return ErrorContext {
            error: ctx.error.clone(),
            suggestion: ctx.suggestion.clone(),
            details: ctx.details.clone(),
        };
    }

    if let Some(metadata_error) = error.downcast_ref::<MetadataError>() {
        return create_error_context(metadata_error.clone());
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        return ErrorContext::new(MetadataError::IoError(std::io::Error::new(
            io_error.kind(),
            io_error.to_string(),
        )))
        .with_details(error.to_string())
        .with_suggestion("Check that the file or directory exists and is readable");
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(MetadataError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of your itdgen.toml or config file");
    }

    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();
    let ctx = ErrorContext::new(MetadataError::ConfigError {
        message: error.to_string(),
    });
    if chain.is_empty() {
        ctx
    } else {
        ctx.with_details(chain.join(": "))
    }
}

fn create_error_context(error: MetadataError) -> ErrorContext {
    match &error {
        MetadataError::MalformedIdentifier {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Identifiers look like MID:<tag>#<PATH>?<fully.qualified.Type>")
            .with_details("Run 'itdgen inspect <MID>' to see how an identifier is parsed"),
        MetadataError::CyclicDependency {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Break the cycle by removing one of the annotations or relationships involved")
            .with_details("Metadata may only depend on metadata that does not depend back on it"),
        MetadataError::ProviderNotFound {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Check the provider tag; built-in tags are PhysicalType, JavaBean and DataOnDemand"),
        MetadataError::InvalidSymbol {
            ..
        } => ErrorContext::new(error)
            .with_suggestion("Type names must be dotted Java identifiers and paths upper-case tokens"),
        _ => ErrorContext::new(error),
    }
}
