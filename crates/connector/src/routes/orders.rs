//! Order export endpoints and the order-created webhook.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use iiko_connector_core::OrderId;
use tracing::instrument;

use crate::delivery::OrderSnapshot;
use crate::error::{AppError, LoggedError};
use crate::iiko::{CreateDeliveryResponse, DeliveriesByIdResponse};
use crate::logs::{Envelope, Logs};
use crate::state::AppState;

/// Create order routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders/{id}/export", post(export_order))
        .route("/orders/{id}/delivery", post(check_delivery))
        .route("/webhooks/order-created", post(order_created))
}

/// Send a stored order to iiko again.
#[instrument(skip(state))]
async fn export_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<CreateDeliveryResponse>>, LoggedError> {
    let mut logs = Logs::new();
    match state
        .exporter()
        .export_order_manually(OrderId::new(id), &mut logs)
        .await
    {
        Ok(response) => Ok(Json(Envelope::new(response, logs))),
        Err(e) => Err(AppError::from(e).with_logs(logs)),
    }
}

#[instrument(skip(state))]
async fn check_delivery(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Envelope<DeliveriesByIdResponse>>, LoggedError> {
    let response = state
        .exporter()
        .check_created_delivery(OrderId::new(id))
        .await
        .map_err(AppError::from)?;

    Ok(Json(Envelope::new(response, Logs::new())))
}

/// Storefront order-created hook: store the snapshot and export it.
#[instrument(skip_all)]
async fn order_created(
    State(state): State<AppState>,
    Json(order): Json<OrderSnapshot>,
) -> Result<Json<Envelope<CreateDeliveryResponse>>, LoggedError> {
    let mut logs = Logs::new();
    match state.exporter().export_delivery(&order, &mut logs).await {
        Ok(response) => Ok(Json(Envelope::new(response, logs))),
        Err(e) => Err(AppError::from(e).with_logs(logs)),
    }
}
