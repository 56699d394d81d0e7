//! iiko Cloud API HTTP client.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use iiko_connector_core::{CityId, OrganizationId, PosOrderId, TerminalGroupId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;
use tracing::instrument;
use url::Url;

use super::auth::{AccessToken, obtain_access_token};
use super::types::{
    CitiesResponse, CreateDeliveryRequest, CreateDeliveryResponse, DeliveriesByIdRequest,
    DeliveriesByIdResponse, ErrorResponse, Nomenclature, NomenclatureRequest,
    OrganizationIdsRequest, OrganizationsRequest, OrganizationsResponse, StreetsRequest,
    StreetsResponse, TerminalGroupsResponse,
};
use super::{IikoApi, IikoError};
use crate::config::IikoConfig;
use crate::delivery::Delivery;

/// iiko Cloud API client.
///
/// Cheap to clone; clones share the HTTP connection pool and the cached
/// access token.
#[derive(Clone)]
pub struct IikoClient {
    inner: Arc<IikoClientInner>,
}

struct IikoClientInner {
    client: reqwest::Client,
    base_url: Url,
    api_login: SecretString,
    /// In-memory token cache
    token: RwLock<Option<AccessToken>>,
}

impl IikoClient {
    /// Create a new iiko API client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &IikoConfig) -> Result<Self, IikoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            inner: Arc::new(IikoClientInner {
                client,
                base_url: config.api_url.clone(),
                api_login: config.api_login.clone(),
                token: RwLock::new(None),
            }),
        })
    }

    /// Base URL all endpoints are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop the cached token so the next call authenticates again.
    pub async fn clear_token(&self) {
        *self.inner.token.write().await = None;
    }

    /// Return a valid bearer token, requesting a new one if needed.
    async fn access_token(&self) -> Result<String, IikoError> {
        if let Some(token) = self.inner.token.read().await.as_ref()
            && !token.is_expired()
        {
            return Ok(token.token.expose_secret().to_string());
        }

        let token = obtain_access_token(
            &self.inner.client,
            &self.inner.base_url,
            &self.inner.api_login,
        )
        .await?;
        let value = token.token.expose_secret().to_string();
        *self.inner.token.write().await = Some(token);

        tracing::debug!("Obtained new iiko access token");
        Ok(value)
    }

    /// Execute an authenticated JSON POST against an endpoint.
    #[instrument(skip(self, body), fields(endpoint = %path))]
    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, IikoError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.access_token().await?;
        let url = self.inner.base_url.join(path)?;

        let response = self
            .inner
            .client
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(IikoError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if status == reqwest::StatusCode::UNAUTHORIZED {
            self.clear_token().await;
            return Err(IikoError::Unauthorized(error_message(&response_text, status)));
        }

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %response_text.chars().take(500).collect::<String>(),
                "iiko API returned non-success status"
            );
            return Err(IikoError::Api {
                status: status.as_u16(),
                message: error_message(&response_text, status),
            });
        }

        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %response_text.chars().take(500).collect::<String>(),
                "Failed to parse iiko response"
            );
            IikoError::Parse(e)
        })
    }
}

/// Extract `errorDescription` from an iiko error body.
fn error_message(body: &str, status: reqwest::StatusCode) -> String {
    let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
    parsed
        .error_description
        .or(parsed.error)
        .unwrap_or_else(|| format!("HTTP {status}: {}", body.chars().take(200).collect::<String>()))
}

#[async_trait]
impl IikoApi for IikoClient {
    async fn organizations(&self) -> Result<OrganizationsResponse, IikoError> {
        self.post(
            "organizations",
            &OrganizationsRequest {
                organization_ids: None,
                return_additional_info: false,
                include_disabled: false,
            },
        )
        .await
    }

    async fn terminal_groups(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<TerminalGroupsResponse, IikoError> {
        self.post(
            "terminal_groups",
            &OrganizationIdsRequest {
                organization_ids: [organization_id],
            },
        )
        .await
    }

    async fn nomenclature(
        &self,
        organization_id: &OrganizationId,
    ) -> Result<Nomenclature, IikoError> {
        self.post(
            "nomenclature",
            &NomenclatureRequest {
                organization_id,
                start_revision: None,
            },
        )
        .await
    }

    async fn cities(&self, organization_id: &OrganizationId) -> Result<CitiesResponse, IikoError> {
        self.post(
            "cities",
            &OrganizationIdsRequest {
                organization_ids: [organization_id],
            },
        )
        .await
    }

    async fn streets(
        &self,
        organization_id: &OrganizationId,
        city_id: &CityId,
    ) -> Result<StreetsResponse, IikoError> {
        self.post(
            "streets/by_city",
            &StreetsRequest {
                organization_id,
                city_id,
            },
        )
        .await
    }

    async fn create_delivery(
        &self,
        organization_id: &OrganizationId,
        terminal_group_id: &TerminalGroupId,
        delivery: &Delivery,
    ) -> Result<CreateDeliveryResponse, IikoError> {
        let body = CreateDeliveryRequest {
            organization_id,
            terminal_group_id,
            order: delivery,
        };

        tracing::debug!(
            body = %serde_json::to_string(&body).unwrap_or_default(),
            "create-delivery-body"
        );

        self.post("deliveries/create", &body).await
    }

    async fn deliveries_by_id(
        &self,
        organization_id: &OrganizationId,
        order_id: &PosOrderId,
    ) -> Result<DeliveriesByIdResponse, IikoError> {
        self.post(
            "deliveries/by_id",
            &DeliveriesByIdRequest {
                organization_id,
                order_ids: [order_id],
            },
        )
        .await
    }
}

impl std::fmt::Debug for IikoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IikoClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_login", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}
