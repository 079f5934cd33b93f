//! Order domain model and status state machine.
//!
//! # Responsibility
//! - Define the immutable checkout snapshot and its mutable status.
//! - Derive status purely from elapsed time since `created_at`.
//! - Map legacy persisted orders into validated records.
//!
//! # Invariants
//! - `items`, `total` and checkout fields never change after creation.
//! - Status only moves forward along `pending -> processing -> ready ->
//!   completed`, except for the explicit `cancelled` override.
//! - `completed` and `cancelled` are terminal.

use crate::clock::MINUTE_MS;
use crate::model::catalog::Amount;
use crate::model::load_item::{epoch_ms_value, normalize_snapshot_item, LoadItem};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Elapsed time after which a pending order reads as processing.
pub const PROCESSING_AFTER_MS: i64 = 2 * MINUTE_MS;
/// Elapsed time after which an order reads as ready.
pub const READY_AFTER_MS: i64 = 5 * MINUTE_MS;
/// Elapsed time after which an order reads as completed.
pub const COMPLETED_AFTER_MS: i64 = 10 * MINUTE_MS;

const ORDER_ID_PREFIX: &str = "ORD";
const ORDER_ID_SUFFIX_LEN: usize = 9;
const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Order lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Processing,
    Ready,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        Self::Pending,
        Self::Processing,
        Self::Ready,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Ready => "ready",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "ready" => Some(Self::Ready),
            "completed" => Some(Self::Completed),
            "cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Processing => "Processing",
            Self::Ready => "Ready",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Position on the progress track; `cancelled` is off the track.
    pub fn progress_rank(self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::Processing => Some(1),
            Self::Ready => Some(2),
            Self::Completed => Some(3),
            Self::Cancelled => None,
        }
    }

    /// Whether an order in this status has reached `step` on the progress track.
    pub fn has_reached(self, step: OrderStatus) -> bool {
        match (self.progress_rank(), step.progress_rank()) {
            (Some(current), Some(target)) => current >= target,
            _ => false,
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status implied by elapsed time alone.
pub fn status_for_elapsed(elapsed_ms: i64) -> OrderStatus {
    if elapsed_ms > COMPLETED_AFTER_MS {
        OrderStatus::Completed
    } else if elapsed_ms > READY_AFTER_MS {
        OrderStatus::Ready
    } else if elapsed_ms > PROCESSING_AFTER_MS {
        OrderStatus::Processing
    } else {
        OrderStatus::Pending
    }
}

/// Re-derives `current` at `now_ms` for an order created at `created_at_ms`.
///
/// Terminal states are returned unchanged and a status never moves backwards,
/// so evaluating twice at the same instant yields the same result.
pub fn derive_status(current: OrderStatus, created_at_ms: i64, now_ms: i64) -> OrderStatus {
    if current.is_terminal() {
        return current;
    }
    let elapsed = status_for_elapsed(now_ms.saturating_sub(created_at_ms));
    match (current.progress_rank(), elapsed.progress_rank()) {
        (Some(have), Some(implied)) if implied > have => elapsed,
        _ => current,
    }
}

/// How the finished laundry reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentType {
    Delivery,
    Pickup,
}

impl FulfillmentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "delivery" => Some(Self::Delivery),
            "pickup" => Some(Self::Pickup),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Delivery => "Delivery",
            Self::Pickup => "Pickup",
        }
    }

    pub fn is_delivery(self) -> bool {
        self == Self::Delivery
    }
}

/// Order identifier of the form `ORD-<epoch ms>-<suffix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(String);

impl OrderId {
    /// Generates an id from the checkout time and a random base36 suffix.
    pub fn generate(now_ms: i64) -> Self {
        let mut entropy = Uuid::new_v4().as_u128();
        let mut suffix = String::with_capacity(ORDER_ID_SUFFIX_LEN);
        for _ in 0..ORDER_ID_SUFFIX_LEN {
            let digit = (entropy % 36) as usize;
            suffix.push(char::from(BASE36_DIGITS[digit]));
            entropy /= 36;
        }
        Self(format!("{ORDER_ID_PREFIX}-{now_ms}-{suffix}"))
    }

    /// Placeholder id for a legacy record stored without one.
    pub fn legacy(now_ms: i64, index: usize) -> Self {
        Self(format!("{ORDER_ID_PREFIX}-{now_ms}-{index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable checkout snapshot plus its lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    pub items: Vec<LoadItem>,
    /// Checkout total including the delivery fee.
    pub total: Amount,
    pub address: String,
    pub payment: String,
    #[serde(rename = "type")]
    pub fulfillment: FulfillmentType,
    pub selected_date: String,
    pub selected_time: String,
    pub created_at: i64,
    pub status: OrderStatus,
}

impl Order {
    /// Status this order should show at `now_ms`.
    pub fn status_at(&self, now_ms: i64) -> OrderStatus {
        derive_status(self.status, self.created_at, now_ms)
    }

    /// Sum of item line totals, without fees.
    pub fn subtotal(&self) -> Amount {
        self.items.iter().map(LoadItem::line_total).sum()
    }

    /// Total garment count across all items.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.qty)).sum()
    }

    pub fn can_cancel(&self) -> bool {
        !self.status.is_terminal()
    }

    pub fn status_label(&self) -> &'static str {
        match (self.status, self.fulfillment) {
            (OrderStatus::Ready, FulfillmentType::Delivery) => "Ready for Delivery",
            (OrderStatus::Ready, FulfillmentType::Pickup) => "Ready for Pickup",
            (status, _) => status.label(),
        }
    }

    pub fn processing_at(&self) -> i64 {
        self.created_at.saturating_add(PROCESSING_AFTER_MS)
    }

    pub fn ready_at(&self) -> i64 {
        self.created_at.saturating_add(READY_AFTER_MS)
    }

    pub fn completed_at(&self) -> i64 {
        self.created_at.saturating_add(COMPLETED_AFTER_MS)
    }
}

/// Human-readable age such as `Just now`, `12m ago`, `3h ago` or `2d ago`.
pub fn format_age(created_at_ms: i64, now_ms: i64) -> String {
    let minutes = now_ms.saturating_sub(created_at_ms).max(0) / MINUTE_MS;
    if minutes < 1 {
        return "Just now".to_string();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    format!("{}d ago", hours / 24)
}

/// Maps one persisted order record at list position `index`.
///
/// Missing fields are defaulted the way older app versions wrote them.
/// Returns `None` for records that are not objects.
pub fn normalize_order(raw: &Value, index: usize, now_ms: i64) -> Option<Order> {
    let fields = raw.as_object()?;

    let created_at = fields
        .get("createdAt")
        .and_then(epoch_ms_value)
        .filter(|ms| *ms != 0)
        .unwrap_or(now_ms);

    let status = fields
        .get("status")
        .and_then(Value::as_str)
        .and_then(OrderStatus::parse)
        .unwrap_or_else(|| initial_status_for_legacy(created_at, now_ms));

    let items = fields
        .get("items")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(|value| normalize_snapshot_item(value, now_ms))
                .collect()
        })
        .unwrap_or_default();

    let total = fields
        .get("total")
        .and_then(|value| {
            value.as_u64().or_else(|| {
                value
                    .as_f64()
                    .filter(|amount| amount.is_finite() && *amount > 0.0)
                    .map(|amount| amount.round() as Amount)
            })
        })
        .unwrap_or(0);

    let order_id = fields
        .get("orderId")
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .map_or_else(|| OrderId::legacy(now_ms, index), OrderId::from);

    Some(Order {
        order_id,
        items,
        total,
        address: text_field(fields, "address", "No address provided"),
        payment: text_field(fields, "payment", "cash"),
        fulfillment: fields
            .get("type")
            .and_then(Value::as_str)
            .and_then(FulfillmentType::parse)
            .unwrap_or(FulfillmentType::Delivery),
        selected_date: text_field(fields, "selectedDate", "Not specified"),
        selected_time: text_field(fields, "selectedTime", "Not specified"),
        created_at,
        status,
    })
}

fn text_field(fields: &Map<String, Value>, key: &str, fallback: &str) -> String {
    fields
        .get(key)
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

fn initial_status_for_legacy(created_at_ms: i64, now_ms: i64) -> OrderStatus {
    if now_ms.saturating_sub(created_at_ms) > READY_AFTER_MS {
        OrderStatus::Processing
    } else {
        OrderStatus::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::{
        derive_status, format_age, normalize_order, FulfillmentType, OrderId, OrderStatus,
    };
    use crate::clock::MINUTE_MS;
    use serde_json::json;

    #[test]
    fn derive_status_follows_elapsed_thresholds() {
        let created = 0;
        assert_eq!(
            derive_status(OrderStatus::Pending, created, 2 * MINUTE_MS),
            OrderStatus::Pending
        );
        assert_eq!(
            derive_status(OrderStatus::Pending, created, 3 * MINUTE_MS),
            OrderStatus::Processing
        );
        assert_eq!(
            derive_status(OrderStatus::Pending, created, 6 * MINUTE_MS),
            OrderStatus::Ready
        );
        assert_eq!(
            derive_status(OrderStatus::Processing, created, 11 * MINUTE_MS),
            OrderStatus::Completed
        );
    }

    #[test]
    fn derive_status_never_regresses_or_leaves_terminal_states() {
        assert_eq!(
            derive_status(OrderStatus::Ready, 0, MINUTE_MS),
            OrderStatus::Ready
        );
        assert_eq!(
            derive_status(OrderStatus::Cancelled, 0, 60 * MINUTE_MS),
            OrderStatus::Cancelled
        );
    }

    #[test]
    fn progress_track_excludes_cancelled() {
        assert!(OrderStatus::Ready.has_reached(OrderStatus::Processing));
        assert!(!OrderStatus::Pending.has_reached(OrderStatus::Ready));
        assert!(!OrderStatus::Cancelled.has_reached(OrderStatus::Pending));
    }

    #[test]
    fn generated_order_ids_have_prefix_time_and_suffix() {
        let id = OrderId::generate(1_700_000_000_000);
        let parts: Vec<&str> = id.as_str().split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ORD");
        assert_eq!(parts[1], "1700000000000");
        assert_eq!(parts[2].len(), 9);
        assert!(parts[2]
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
        assert_ne!(id, OrderId::generate(1_700_000_000_000));
    }

    #[test]
    fn format_age_buckets() {
        assert_eq!(format_age(0, 30_000), "Just now");
        assert_eq!(format_age(0, 5 * MINUTE_MS), "5m ago");
        assert_eq!(format_age(0, 125 * MINUTE_MS), "2h ago");
        assert_eq!(format_age(0, 50 * 60 * MINUTE_MS), "2d ago");
    }

    #[test]
    fn normalize_order_defaults_legacy_fields() {
        let now = 100 * MINUTE_MS;
        let order = normalize_order(&json!({"createdAt": now - 7 * MINUTE_MS}), 4, now).unwrap();

        assert_eq!(order.order_id.as_str(), format!("ORD-{now}-4"));
        assert!(order.items.is_empty());
        assert_eq!(order.total, 0);
        assert_eq!(order.address, "No address provided");
        assert_eq!(order.payment, "cash");
        assert_eq!(order.fulfillment, FulfillmentType::Delivery);
        assert_eq!(order.selected_date, "Not specified");
        assert_eq!(order.selected_time, "Not specified");
        assert_eq!(order.status, OrderStatus::Processing);
    }

    #[test]
    fn normalize_order_rejects_non_objects() {
        assert!(normalize_order(&json!("ORD-1"), 0, 0).is_none());
    }

    #[test]
    fn order_serialization_uses_stored_field_names() {
        let order = normalize_order(
            &json!({"orderId": "ORD-1-abc", "type": "pickup", "status": "ready", "createdAt": 5}),
            0,
            10,
        )
        .unwrap();
        let json = serde_json::to_value(&order).unwrap();

        assert_eq!(json["orderId"], "ORD-1-abc");
        assert_eq!(json["type"], "pickup");
        assert_eq!(json["status"], "ready");
        assert_eq!(json["createdAt"], 5);
        assert!(json.get("selectedDate").is_some());
        assert_eq!(order.status_label(), "Ready for Pickup");
    }
}
