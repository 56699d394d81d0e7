//! iiko Cloud API client.
//!
//! Provides access to the iiko REST API ("iikoTransport") for reading the
//! organization's nomenclature and address classifier, and for creating and
//! looking up delivery orders.
//!
//! # Architecture
//!
//! - Every call is a JSON `POST` against `<base>/<endpoint>`
//! - Authentication: `apiLogin` → short-lived bearer token (`access_token`)
//! - The token is cached in memory and re-requested once its lifetime elapses
//! - Services depend on the [`IikoApi`] trait, not on the concrete client, so
//!   import and export logic can run against a fake in tests

pub mod auth;
pub mod client;
pub mod types;

pub use client::IikoClient;
pub use types::*;

use async_trait::async_trait;
use iiko_connector_core::{CityId, OrganizationId, PosOrderId, TerminalGroupId};
use thiserror::Error;

use crate::delivery::Delivery;

/// Errors that can occur when interacting with the iiko API.
#[derive(Debug, Error)]
pub enum IikoError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Rate limited by iiko.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API login was rejected or the token is no longer accepted.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Endpoint URL could not be built from the configured base URL.
    #[error("Invalid API URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Operations the connector needs from iiko.
///
/// Implemented by [`IikoClient`]; tests provide in-memory fakes.
#[async_trait]
pub trait IikoApi: Send + Sync {
    /// List organizations available to the API login.
    async fn organizations(&self) -> Result<OrganizationsResponse, IikoError>;

    /// List delivery terminal groups of an organization.
    async fn terminal_groups(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<TerminalGroupsResponse, IikoError>;

    /// Fetch the full nomenclature of an organization.
    async fn nomenclature(&self, organization_id: &OrganizationId)
    -> Result<Nomenclature, IikoError>;

    /// List cities of the organization's address classifier.
    async fn cities(&self, organization_id: &OrganizationId) -> Result<CitiesResponse, IikoError>;

    /// List streets of a city.
    async fn streets(
        &self,
        organization_id: &OrganizationId,
        city_id: &CityId,
    ) -> Result<StreetsResponse, IikoError>;

    /// Create a delivery order.
    async fn create_delivery(
        &self,
        organization_id: &OrganizationId,
        terminal_group_id: &TerminalGroupId,
        delivery: &Delivery,
    ) -> Result<CreateDeliveryResponse, IikoError>;

    /// Look up a previously created delivery.
    async fn deliveries_by_id(
        &self,
        organization_id: &OrganizationId,
        order_id: &PosOrderId,
    ) -> Result<DeliveriesByIdResponse, IikoError>;
}
