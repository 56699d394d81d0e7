//! iiko connector library.
//!
//! Imports iiko nomenclature into the storefront catalog and exports
//! storefront orders to iiko as deliveries. The binary in `main.rs` serves
//! the HTTP endpoints; the CLI and integration tests use this library
//! directly.
//!
//! # Modules
//!
//! - [`iiko`] - iiko Cloud API client and the [`iiko::IikoApi`] port
//! - [`nomenclature`] - In-memory nomenclature cache
//! - [`import`] - Groups/products import through the catalog port
//! - [`delivery`] - Order snapshot to delivery payload mapping
//! - [`export`] - Order export and delivery lookup
//! - [`store`] / [`db`] - Storage ports with in-memory and `PostgreSQL` backends
//! - [`routes`] - axum handlers wrapping results in a `{data, logs}` envelope

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod delivery;
pub mod error;
pub mod export;
pub mod iiko;
pub mod import;
pub mod logs;
pub mod middleware;
pub mod nomenclature;
pub mod routes;
pub mod state;
pub mod store;
