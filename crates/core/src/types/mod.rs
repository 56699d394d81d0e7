//! Core types for the iiko connector.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod pos_id;
pub mod price;
pub mod status;
pub mod text;

pub use email::{Email, EmailError};
pub use id::*;
pub use pos_id::*;
pub use price::Price;
pub use status::*;
pub use text::{digits_only, sanitize_key, truncate_chars};
