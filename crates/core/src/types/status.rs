//! Status enums for storefront orders and POS deliveries.

use serde::{Deserialize, Serialize};

/// Storefront order status.
///
/// Only `Failed` changes connector behavior (an error is logged before the
/// export still proceeds); the other values are carried for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::OnHold => "on-hold",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Refunded => "refunded",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// How a delivery is fulfilled, as understood by iiko (`orderServiceType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderServiceType {
    /// Courier delivery to the customer's address.
    DeliveryByCourier,
    /// Customer picks the order up (self-pickup).
    DeliveryByClient,
}

impl OrderServiceType {
    /// Storefront shipping method ID prefix that selects self-pickup.
    pub const PICKUP_METHOD_PREFIX: &'static str = "local_pickup";

    /// Derive the service type from the chosen storefront shipping method ID.
    #[must_use]
    pub fn from_shipping_method(method_id: Option<&str>) -> Self {
        match method_id {
            Some(id) if id.starts_with(Self::PICKUP_METHOD_PREFIX) => Self::DeliveryByClient,
            _ => Self::DeliveryByCourier,
        }
    }

    /// Returns true for self-pickup orders.
    #[must_use]
    pub const fn is_pickup(self) -> bool {
        matches!(self, Self::DeliveryByClient)
    }
}

/// Customer gender as accepted by iiko.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Gender {
    #[default]
    NotSpecified,
    Male,
    Female,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_service_type_from_shipping_method() {
        assert_eq!(
            OrderServiceType::from_shipping_method(Some("local_pickup:3")),
            OrderServiceType::DeliveryByClient
        );
        assert_eq!(
            OrderServiceType::from_shipping_method(Some("flat_rate:1")),
            OrderServiceType::DeliveryByCourier
        );
        assert_eq!(
            OrderServiceType::from_shipping_method(None),
            OrderServiceType::DeliveryByCourier
        );
    }

    #[test]
    fn test_order_status_serde() {
        let status: OrderStatus = serde_json::from_str("\"on-hold\"").unwrap();
        assert_eq!(status, OrderStatus::OnHold);
        assert_eq!(OrderStatus::Failed.to_string(), "failed");
    }
}
