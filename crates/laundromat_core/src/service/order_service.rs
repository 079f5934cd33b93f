//! Order lifecycle use-case.
//!
//! # Responsibility
//! - Promote the selected basket items into a persisted order at checkout.
//! - Re-derive order status from elapsed time and persist changes.
//! - Filter, cancel and re-order placed orders.
//!
//! # Invariants
//! - Validation runs before any write; a rejected checkout mutates nothing.
//! - Both next slot values are computed before the first checkout write.
//! - Orders are never deleted; cancellation only sets the status.
//! - Re-ordering never touches the source order.
//! - Status and cancel changes are adopted in memory only after their write
//!   succeeded.

use crate::clock::Clock;
use crate::model::catalog::{delivery_fee, Amount};
use crate::model::load_item::LoadItem;
use crate::model::order::{normalize_order, FulfillmentType, Order, OrderId, OrderStatus};
use crate::service::basket_service::BasketService;
use crate::service::refresh::RefreshTicker;
use crate::store::{
    read_list_soft, KvStore, StoreError, StoreResult, SLOT_BASKET, SLOT_ORDERS, SLOT_USER_ADDRESS,
};
use log::{error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Time slot preselected on the checkout form.
pub const DEFAULT_TIME_SLOT: &str = "2:00–2:15 PM";
/// Payment method preselected on the checkout form.
pub const DEFAULT_PAYMENT: &str = "cash";

const GENERIC_CHECKOUT_FAILURE: &str =
    "There was an error processing your order. Please try again.";

/// Visible subset of the order list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(OrderStatus),
}

impl StatusFilter {
    /// Parses `all` or one status name.
    pub fn parse(value: &str) -> Option<Self> {
        if value == "all" {
            return Some(Self::All);
        }
        OrderStatus::parse(value).map(Self::Only)
    }

    pub fn matches(self, status: OrderStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// Checkout-time inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub address: String,
    pub payment: String,
    pub fulfillment: FulfillmentType,
    pub selected_date: String,
    pub selected_time: String,
}

impl CheckoutRequest {
    /// Form defaults: saved address, cash, delivery, `today` and the 2 PM slot.
    pub fn with_defaults(saved_address: &str, today: &str) -> Self {
        Self {
            address: saved_address.to_string(),
            payment: DEFAULT_PAYMENT.to_string(),
            fulfillment: FulfillmentType::Delivery,
            selected_date: today.to_string(),
            selected_time: DEFAULT_TIME_SLOT.to_string(),
        }
    }
}

/// User-correctable checkout rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutValidationError {
    EmptyBasket,
    NothingSelected,
    MissingAddress,
    MissingSchedule,
}

impl CheckoutValidationError {
    pub fn user_message(self) -> &'static str {
        match self {
            Self::EmptyBasket => "Your basket is empty. Please add items first.",
            Self::NothingSelected => "Please select at least one item to place an order.",
            Self::MissingAddress => "Please enter your address.",
            Self::MissingSchedule => "Please select a date and time for your order.",
        }
    }
}

impl Display for CheckoutValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.user_message())
    }
}

impl Error for CheckoutValidationError {}

#[derive(Debug)]
pub enum CheckoutError {
    Validation(CheckoutValidationError),
    Store(StoreError),
}

impl CheckoutError {
    /// Message suitable for showing to the user as-is.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.user_message(),
            Self::Store(_) => GENERIC_CHECKOUT_FAILURE,
        }
    }
}

impl Display for CheckoutError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "checkout failed: {err}"),
        }
    }
}

impl Error for CheckoutError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<CheckoutValidationError> for CheckoutError {
    fn from(value: CheckoutValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<StoreError> for CheckoutError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub type OrderResult<T> = Result<T, OrderError>;

#[derive(Debug)]
pub enum OrderError {
    OrderNotFound(OrderId),
    Store(StoreError),
}

impl Display for OrderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OrderNotFound(id) => write!(f, "order not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for OrderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::OrderNotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for OrderError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Order list view over the `orders` slot.
pub struct OrderService<S: KvStore, C: Clock> {
    store: S,
    clock: C,
    orders: Vec<Order>,
    filter: StatusFilter,
}

impl<S: KvStore, C: Clock> OrderService<S, C> {
    /// Loads orders and runs the initial status re-evaluation.
    ///
    /// Read failures yield an empty list; a failed status write is logged and
    /// retried on the next refresh.
    pub fn load(store: S, clock: C) -> Self {
        let mut service = Self {
            store,
            clock,
            orders: Vec::new(),
            filter: StatusFilter::All,
        };
        service.reload();
        service
    }

    /// Re-reads the `orders` slot and re-evaluates statuses.
    pub fn reload(&mut self) {
        let now_ms = self.clock.now_ms();
        let raw = read_list_soft(&self.store, SLOT_ORDERS, "orders");
        let stored = raw.len();

        let mut orders = raw
            .iter()
            .enumerate()
            .filter_map(|(index, value)| normalize_order(value, index, now_ms))
            .collect::<Vec<_>>();
        if orders.len() != stored {
            warn!(
                "event=orders_load module=orders status=ok dropped={}",
                stored - orders.len()
            );
        }
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.orders = orders;

        if let Err(err) = self.refresh() {
            warn!("event=orders_load module=orders status=error error={err}");
        }
    }

    /// Re-derives every order status from elapsed time.
    ///
    /// Persists the list only when at least one status changed and returns the
    /// number of changed orders. When the write fails the in-memory list is
    /// left as it was, so the next refresh derives and writes the change again.
    pub fn refresh(&mut self) -> StoreResult<usize> {
        let now_ms = self.clock.now_ms();
        let mut next = self.orders.clone();
        let mut changed = 0;
        for order in &mut next {
            let status = order.status_at(now_ms);
            if status != order.status {
                order.status = status;
                changed += 1;
            }
        }

        if changed > 0 {
            self.commit(next)?;
            info!("event=order_refresh module=orders status=ok changed={changed}");
        }
        Ok(changed)
    }

    /// Re-evaluates when the ticker has fired since the last poll.
    pub fn poll_refresh(&mut self, ticker: &RefreshTicker) -> StoreResult<bool> {
        if ticker.take_ticks() == 0 {
            return Ok(false);
        }
        self.refresh()?;
        Ok(true)
    }

    /// All orders, newest first.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn order(&self, id: &OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| &order.order_id == id)
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.filter = filter;
    }

    /// Orders matching the active filter.
    pub fn visible(&self) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|order| self.filter.matches(order.status))
            .collect()
    }

    /// Forces the order into `cancelled` and persists.
    ///
    /// Callers gate on [`Order::can_cancel`]; no re-validation happens here.
    pub fn cancel(&mut self, id: &OrderId) -> OrderResult<()> {
        let position = self
            .orders
            .iter()
            .position(|order| &order.order_id == id)
            .ok_or_else(|| OrderError::OrderNotFound(id.clone()))?;
        let mut next = self.orders.clone();
        next[position].status = OrderStatus::Cancelled;
        self.commit(next)?;
        info!("event=order_cancel module=orders status=ok order_id={id}");
        Ok(())
    }

    /// Copies the order's items back into the basket slot under fresh ids.
    ///
    /// Returns the items that were appended.
    pub fn reorder(&self, id: &OrderId) -> OrderResult<Vec<LoadItem>> {
        let order = self
            .order(id)
            .ok_or_else(|| OrderError::OrderNotFound(id.clone()))?;
        let now_ms = self.clock.now_ms();
        let copies = order
            .items
            .iter()
            .map(|item| item.duplicate_at(now_ms))
            .collect::<Vec<_>>();

        let mut basket = read_list_soft(&self.store, SLOT_BASKET, "orders");
        for item in &copies {
            basket.push(encode(SLOT_BASKET, item)?);
        }
        self.store.set(SLOT_BASKET, &Value::Array(basket))?;

        info!(
            "event=order_reorder module=orders status=ok order_id={id} items={}",
            copies.len()
        );
        Ok(copies)
    }

    /// Converts the basket's selected items into a new pending order.
    ///
    /// The order is written first, then the reduced basket. When the basket
    /// write fails the orders slot is restored to its previous value. The
    /// trimmed address is saved for reuse on a best-effort basis.
    ///
    /// # Errors
    /// - [`CheckoutError::Validation`] when the basket or inputs are
    ///   incomplete; nothing is written.
    /// - [`CheckoutError::Store`] when persistence fails.
    pub fn checkout<B: KvStore, D: Clock>(
        &mut self,
        basket: &mut BasketService<B, D>,
        request: &CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        info!("event=checkout module=orders status=start");
        let result = self.checkout_inner(basket, request);
        match &result {
            Ok(order) => info!(
                "event=checkout module=orders status=ok order_id={} items={} total={}",
                order.order_id,
                order.items.len(),
                order.total
            ),
            Err(CheckoutError::Validation(reason)) => {
                info!("event=checkout module=orders status=skip reason={reason:?}")
            }
            Err(err) => error!("event=checkout module=orders status=error error={err}"),
        }
        result
    }

    fn checkout_inner<B: KvStore, D: Clock>(
        &mut self,
        basket: &mut BasketService<B, D>,
        request: &CheckoutRequest,
    ) -> Result<Order, CheckoutError> {
        validate_checkout(basket, request)?;

        let (selected, remaining) = basket.split_selected();
        let now_ms = self.clock.now_ms();
        let subtotal: Amount = selected.iter().map(LoadItem::line_total).sum();
        let address = request.address.trim().to_string();
        let order = Order {
            order_id: OrderId::generate(now_ms),
            items: selected,
            total: subtotal + delivery_fee(request.fulfillment.is_delivery()),
            address: address.clone(),
            payment: request.payment.clone(),
            fulfillment: request.fulfillment,
            selected_date: request.selected_date.clone(),
            selected_time: request.selected_time.clone(),
            created_at: now_ms,
            status: OrderStatus::Pending,
        };

        let previous_orders = self.store.get(SLOT_ORDERS).ok().flatten();
        let mut next_orders = match &previous_orders {
            Some(Value::Array(entries)) => entries.clone(),
            _ => Vec::new(),
        };
        next_orders.push(encode(SLOT_ORDERS, &order)?);
        let next_basket = basket.encode_with_unrouted(&remaining)?;

        self.store.set(SLOT_ORDERS, &Value::Array(next_orders))?;
        if let Err(err) = basket.store_slot(&next_basket) {
            let restored = previous_orders.unwrap_or_else(|| Value::Array(Vec::new()));
            if let Err(rollback) = self.store.set(SLOT_ORDERS, &restored) {
                error!(
                    "event=checkout_rollback module=orders status=error order_id={} error={rollback}",
                    order.order_id
                );
            }
            return Err(err.into());
        }
        basket.replace_items(remaining);

        if let Err(err) = self
            .store
            .set(SLOT_USER_ADDRESS, &Value::String(address))
        {
            warn!("event=address_save module=orders status=error error={err}");
        }

        self.orders.insert(0, order.clone());
        Ok(order)
    }

    /// Writes `next` and adopts it only after the write succeeded.
    fn commit(&mut self, next: Vec<Order>) -> StoreResult<()> {
        let mut entries = Vec::with_capacity(next.len());
        for order in &next {
            entries.push(encode(SLOT_ORDERS, order)?);
        }
        self.store.set(SLOT_ORDERS, &Value::Array(entries))?;
        self.orders = next;
        Ok(())
    }
}

fn validate_checkout<B: KvStore, D: Clock>(
    basket: &BasketService<B, D>,
    request: &CheckoutRequest,
) -> Result<(), CheckoutValidationError> {
    if basket.is_empty() {
        return Err(CheckoutValidationError::EmptyBasket);
    }
    if basket.selected_count() == 0 {
        return Err(CheckoutValidationError::NothingSelected);
    }
    if request.address.trim().is_empty() {
        return Err(CheckoutValidationError::MissingAddress);
    }
    if request.selected_date.trim().is_empty() || request.selected_time.trim().is_empty() {
        return Err(CheckoutValidationError::MissingSchedule);
    }
    Ok(())
}

fn encode<T: serde::Serialize>(key: &str, value: &T) -> StoreResult<Value> {
    serde_json::to_value(value).map_err(|source| StoreError::Serialization {
        key: key.to_string(),
        source,
    })
}
