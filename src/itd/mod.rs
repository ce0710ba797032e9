//! Inter-type declarations.
//!
//! An ITD is a set of members (type annotations, fields, methods) that an aspect
//! introduces into a governor type without touching the governor's source file. The
//! user owns the governor; the generator owns the aspect and may rewrite it at will.
//!
//! - [`ItdTypeDetails`] - the finished, ordered member list with rendering and digest
//! - [`ItdTypeDetailsBuilder`] - accumulates members, skipping duplicates and anything
//!   the governor already declares
//! - [`InvocableMemberBodyBuilder`] - indentation-aware method body text
//! - [`ItdProvider`] / [`ItdGenerator`] - the provider skeleton shared by all addons

mod body;
mod builder;
mod details;
mod provider;

pub use body::InvocableMemberBodyBuilder;
pub use builder::ItdTypeDetailsBuilder;
pub use details::ItdTypeDetails;
pub use provider::{Generation, ItdGenerator, ItdProvider, ItdRequest};
