//! Override points for delivery mapping.

use super::types::{DeliveryPoint, Guests, OrderSnapshot};

/// Strategy trait with named override slots.
///
/// The builder computes a default for each slot and passes it through the
/// matching method; whatever the method returns ends up in the payload.
/// Every method has a default implementation, so implementors override only
/// what they need.
pub trait DeliveryHooks: Send + Sync {
    /// Fulfillment time (`yyyy-MM-dd HH:mm:ss.fff`, terminal local time).
    /// `None` asks iiko to deliver as soon as possible.
    fn complete_before(&self, _order: &OrderSnapshot) -> Option<String> {
        None
    }

    /// Receives the digits-only billing phone before the blank check.
    fn phone(&self, phone: String, _order: &OrderSnapshot) -> String {
        phone
    }

    /// Payment components. `None` leaves payment to the terminal.
    fn payments(&self, _order: &OrderSnapshot) -> Option<Vec<serde_json::Value>> {
        None
    }

    fn guests(&self, guests: Guests, _order: &OrderSnapshot) -> Guests {
        guests
    }

    fn delivery_point(&self, point: DeliveryPoint, _order: &OrderSnapshot) -> DeliveryPoint {
        point
    }

    fn comment(&self, comment: String, _order: &OrderSnapshot) -> String {
        comment
    }
}

/// Hooks that keep every computed default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultHooks;

impl DeliveryHooks for DefaultHooks {}
