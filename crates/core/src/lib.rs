//! iiko Connector Core - Shared types library.
//!
//! This crate provides common types used across all connector components:
//! - `connector` - HTTP service that imports nomenclature and exports deliveries
//! - `cli` - Command-line tools for migrations, imports and manual exports
//!
//! # Architecture
//!
//! The core crate contains only types and pure helpers - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for storefront IDs, POS IDs, prices, emails,
//!   statuses, and the bounded-text helpers used when building POS payloads

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
