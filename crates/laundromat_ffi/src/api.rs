//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level functions to Dart via FRB.
//! - Open the slot store per call and map core results into plain envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every mutation goes through a core service; no slot is written here.
//! - The storage path is resolved once per process.

use laundromat_core::db::open_db;
use laundromat_core::model::catalog::{delivery_fee, Amount};
use laundromat_core::model::order::format_age;
use laundromat_core::service::order_service::DEFAULT_PAYMENT;
use laundromat_core::service::schedule::{available_dates, local_date, TIME_SLOTS};
use laundromat_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    BasketService, CheckoutRequest, Clock, FulfillmentType, ItemId, KvStore, LoadConfigurator,
    LoadItem, Order, OrderId, OrderService, ProfileService, Segment, SqliteKvStore, StatusFilter,
    SystemClock,
};
use log::warn;
use std::path::PathBuf;
use std::sync::OnceLock;

const DB_FILE_NAME: &str = "laundromat.sqlite3";
const DB_PATH_ENV: &str = "LAUNDROMAT_DB_PATH";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err,
    }
}

/// Pins the SQLite file used by every later call.
///
/// Must run before the first storage call to take effect. Repeating the same
/// path is accepted; switching to another path is rejected.
///
/// # FFI contract
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn configure_storage(db_path: String) -> String {
    let trimmed = db_path.trim();
    if trimmed.is_empty() {
        return "db_path cannot be empty".to_string();
    }
    let requested = PathBuf::from(trimmed);
    let active = DB_PATH.get_or_init(|| requested.clone());
    if *active == requested {
        String::new()
    } else {
        format!(
            "storage already bound to `{}`; refusing to switch to `{}`",
            active.display(),
            requested.display()
        )
    }
}

/// Generic action response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Id of the item or order the action produced, when there is one.
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl ActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// One basket line as shown on the basket screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketItemView {
    pub id: String,
    pub segment: String,
    pub garment: String,
    pub weight: Option<String>,
    pub additionals: Vec<String>,
    pub qty: u32,
    pub selected: bool,
    pub unit_price: u64,
    pub line_total: u64,
}

/// Items of one segment with the derived group checkbox state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketGroupView {
    pub segment: String,
    pub label: String,
    pub checked: bool,
    pub items: Vec<BasketItemView>,
}

/// Full basket screen state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasketSnapshot {
    pub groups: Vec<BasketGroupView>,
    pub all_selected: bool,
    pub selected_count: u32,
    /// Sum over selected items, fees excluded.
    pub total: u64,
    pub message: String,
}

/// Checkout form defaults and choices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    pub address: String,
    pub payment: String,
    pub fulfillment: String,
    pub dates: Vec<String>,
    pub time_slots: Vec<String>,
    pub selected_date: String,
    pub selected_time: String,
    pub subtotal: u64,
    pub delivery_fee: u64,
}

/// One order card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    pub order_id: String,
    pub status: String,
    pub status_label: String,
    pub can_cancel: bool,
    pub total: u64,
    pub subtotal: u64,
    pub item_count: u64,
    pub address: String,
    pub payment: String,
    pub fulfillment: String,
    pub selected_date: String,
    pub selected_time: String,
    pub created_at: i64,
    pub age: String,
}

/// Order list response envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrdersResponse {
    pub ok: bool,
    pub items: Vec<OrderView>,
    pub applied_filter: String,
    pub message: String,
}

/// Reads the basket with derived groups and totals.
#[flutter_rust_bridge::frb(sync)]
pub fn basket_snapshot() -> BasketSnapshot {
    match with_store(|store| snapshot_of(store, &SystemClock)) {
        Ok(snapshot) => snapshot,
        Err(err) => BasketSnapshot {
            groups: Vec::new(),
            all_selected: false,
            selected_count: 0,
            total: 0,
            message: format!("basket_snapshot failed: {err}"),
        },
    }
}

/// Configures one load and appends it to the basket.
///
/// `weight` and `additionals` are ignored for `press`.
#[flutter_rust_bridge::frb(sync)]
pub fn basket_add_load(
    segment: String,
    casual: String,
    weight: Option<String>,
    additionals: Vec<String>,
    qty: u32,
) -> ActionResponse {
    flatten(
        "basket_add_load",
        with_store(|store| {
            add_load(
                store,
                &SystemClock,
                &segment,
                &casual,
                weight.as_deref(),
                &additionals,
                qty,
            )
        }),
    )
}

/// Checks or unchecks every item of one segment group.
#[flutter_rust_bridge::frb(sync)]
pub fn basket_set_group_checked(segment: String, checked: bool) -> ActionResponse {
    flatten(
        "basket_set_group_checked",
        with_store(|store| set_group_checked(store, &SystemClock, &segment, checked)),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn basket_set_item_selected(item_id: String, selected: bool) -> ActionResponse {
    flatten(
        "basket_set_item_selected",
        with_store(|store| {
            let mut basket = BasketService::load(store, SystemClock);
            basket
                .set_item_selected(&ItemId::from(item_id), selected)
                .map(|()| ActionResponse::success("Selection updated.", None))
                .map_err(|err| err.to_string())
        }),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn basket_set_all_selected(selected: bool) -> ActionResponse {
    flatten(
        "basket_set_all_selected",
        with_store(|store| {
            let mut basket = BasketService::load(store, SystemClock);
            basket
                .set_all_selected(selected)
                .map(|()| ActionResponse::success("Selection updated.", None))
                .map_err(|err| err.to_string())
        }),
    )
}

/// Adds one to the item quantity; `message` carries the new quantity.
#[flutter_rust_bridge::frb(sync)]
pub fn basket_increase_qty(item_id: String) -> ActionResponse {
    flatten(
        "basket_increase_qty",
        with_store(|store| change_qty(store, &SystemClock, &item_id, QtyChange::Increase)),
    )
}

/// Removes one from the item quantity, stopping at 1.
#[flutter_rust_bridge::frb(sync)]
pub fn basket_decrease_qty(item_id: String) -> ActionResponse {
    flatten(
        "basket_decrease_qty",
        with_store(|store| change_qty(store, &SystemClock, &item_id, QtyChange::Decrease)),
    )
}

#[flutter_rust_bridge::frb(sync)]
pub fn basket_remove_item(item_id: String) -> ActionResponse {
    flatten(
        "basket_remove_item",
        with_store(|store| {
            let mut basket = BasketService::load(store, SystemClock);
            basket
                .remove_item(&ItemId::from(item_id))
                .map(|removed| {
                    ActionResponse::success("Item removed.", Some(removed.id.to_string()))
                })
                .map_err(|err| err.to_string())
        }),
    )
}

/// Prefilled checkout form for the current basket selection.
#[flutter_rust_bridge::frb(sync)]
pub fn checkout_form() -> CheckoutForm {
    let clock = SystemClock;
    let (address, subtotal) =
        with_store(|store| checkout_context(store, &clock)).unwrap_or_else(|err| {
            warn!("event=ffi_call module=ffi status=error call=checkout_form error={err}");
            (String::new(), 0)
        });
    form_for(address, subtotal, clock.now_ms())
}

/// Places an order from the selected basket items.
///
/// On success `id` holds the new order id. Rejections carry a user-facing
/// message and leave the basket and orders untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn checkout(
    address: String,
    payment: String,
    fulfillment: String,
    selected_date: String,
    selected_time: String,
) -> ActionResponse {
    let Some(fulfillment) = FulfillmentType::parse(fulfillment.trim()) else {
        return ActionResponse::failure(format!("unknown fulfillment type `{fulfillment}`"));
    };
    let request = CheckoutRequest {
        address,
        payment,
        fulfillment,
        selected_date,
        selected_time,
    };
    flatten(
        "checkout",
        with_store(|store| Ok(place_order(store, &SystemClock, &request))),
    )
}

/// Lists orders matching `filter` (`all` or a status name), newest first.
///
/// Statuses are re-derived from elapsed time before the list is returned.
#[flutter_rust_bridge::frb(sync)]
pub fn orders_list(filter: String) -> OrdersResponse {
    let Some(parsed) = StatusFilter::parse(filter.trim()) else {
        return OrdersResponse {
            ok: false,
            items: Vec::new(),
            applied_filter: String::new(),
            message: format!("unknown order filter `{filter}`"),
        };
    };
    match with_store(|store| list_orders(store, &SystemClock, parsed)) {
        Ok(items) => {
            let message = if items.is_empty() {
                "No orders.".to_string()
            } else {
                format!("Found {} order(s).", items.len())
            };
            OrdersResponse {
                ok: true,
                items,
                applied_filter: filter.trim().to_string(),
                message,
            }
        }
        Err(err) => OrdersResponse {
            ok: false,
            items: Vec::new(),
            applied_filter: filter.trim().to_string(),
            message: format!("orders_list failed: {err}"),
        },
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn order_cancel(order_id: String) -> ActionResponse {
    flatten(
        "order_cancel",
        with_store(|store| cancel_order(store, &SystemClock, &order_id)),
    )
}

/// Copies an order's items back into the basket.
#[flutter_rust_bridge::frb(sync)]
pub fn order_reorder(order_id: String) -> ActionResponse {
    flatten(
        "order_reorder",
        with_store(|store| reorder(store, &SystemClock, &order_id)),
    )
}

/// Greeting name: the signed-in username or `Guest`.
#[flutter_rust_bridge::frb(sync)]
pub fn profile_display_name() -> String {
    with_store(|store| Ok(ProfileService::new(store).display_name())).unwrap_or_else(|err| {
        warn!("event=ffi_call module=ffi status=error call=profile_display_name error={err}");
        laundromat_core::service::profile_service::GUEST_NAME.to_string()
    })
}

enum QtyChange {
    Increase,
    Decrease,
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn with_store<T>(
    f: impl FnOnce(&SqliteKvStore<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let db_path = resolve_db_path();
    let conn = open_db(&db_path).map_err(|err| format!("storage open failed: {err}"))?;
    let store = SqliteKvStore::new(&conn);
    f(&store)
}

fn flatten(call: &str, result: Result<ActionResponse, String>) -> ActionResponse {
    match result {
        Ok(response) => response,
        Err(err) => {
            warn!("event=ffi_call module=ffi status=error call={call} error={err}");
            ActionResponse::failure(format!("{call} failed: {err}"))
        }
    }
}

fn parse_segment(raw: &str) -> Result<Segment, String> {
    Segment::parse(raw.trim()).ok_or_else(|| format!("unknown segment `{raw}`"))
}

fn snapshot_of<S: KvStore, C: Clock>(store: S, clock: C) -> Result<BasketSnapshot, String> {
    let basket = BasketService::load(store, clock);
    let groups = basket
        .groups()
        .into_iter()
        .map(|group| BasketGroupView {
            segment: group.segment.as_str().to_string(),
            label: group.label().to_string(),
            checked: group.checked,
            items: group.items.into_iter().map(item_view).collect(),
        })
        .collect::<Vec<_>>();
    let message = if groups.is_empty() {
        "Your basket is empty.".to_string()
    } else {
        format!("{} item(s) in basket.", basket.items().len())
    };
    Ok(BasketSnapshot {
        groups,
        all_selected: basket.is_all_selected(),
        selected_count: u32::try_from(basket.selected_count()).unwrap_or(u32::MAX),
        total: basket.total(),
        message,
    })
}

fn item_view(item: &LoadItem) -> BasketItemView {
    BasketItemView {
        id: item.id.to_string(),
        segment: item.segment.as_str().to_string(),
        garment: item.garment_name().to_string(),
        weight: item.weight.clone(),
        additionals: item.additionals.clone(),
        qty: item.qty,
        selected: item.selected,
        unit_price: item.unit_price(),
        line_total: item.line_total(),
    }
}

fn add_load<S: KvStore, C: Clock>(
    store: S,
    clock: C,
    segment: &str,
    casual: &str,
    weight: Option<&str>,
    additionals: &[String],
    qty: u32,
) -> Result<ActionResponse, String> {
    let segment = parse_segment(segment)?;
    let mut configurator = LoadConfigurator::new(store, clock);
    configurator.set_segment(segment);
    configurator.toggle_casual(casual.trim());
    if let Some(weight) = weight {
        configurator.toggle_weight(weight);
    }
    for additional in additionals {
        configurator.toggle_additional(additional);
    }
    configurator.set_qty(qty);

    match configurator.add_to_basket().map_err(|err| err.to_string())? {
        Some(item) => Ok(ActionResponse::success(
            "Added to basket.",
            Some(item.id.to_string()),
        )),
        None => Ok(ActionResponse::failure(
            "Please complete your selection and choose a quantity.",
        )),
    }
}

fn set_group_checked<S: KvStore, C: Clock>(
    store: S,
    clock: C,
    segment: &str,
    checked: bool,
) -> Result<ActionResponse, String> {
    let segment = parse_segment(segment)?;
    let mut basket = BasketService::load(store, clock);
    basket
        .set_group_checked(segment, checked)
        .map_err(|err| err.to_string())?;
    Ok(ActionResponse::success("Selection updated.", None))
}

fn change_qty<S: KvStore, C: Clock>(
    store: S,
    clock: C,
    item_id: &str,
    change: QtyChange,
) -> Result<ActionResponse, String> {
    let mut basket = BasketService::load(store, clock);
    let id = ItemId::from(item_id);
    let qty = match change {
        QtyChange::Increase => basket.increase_qty(&id),
        QtyChange::Decrease => basket.decrease_qty(&id),
    }
    .map_err(|err| err.to_string())?;
    Ok(ActionResponse::success(qty.to_string(), Some(item_id.to_string())))
}

fn checkout_context<S: KvStore, C: Clock>(store: S, clock: C) -> Result<(String, Amount), String> {
    let address = ProfileService::new(&store).saved_address();
    let subtotal = BasketService::load(&store, clock).total();
    Ok((address, subtotal))
}

fn form_for(address: String, subtotal: Amount, now_ms: i64) -> CheckoutForm {
    let dates = available_dates(local_date(now_ms));
    let defaults = CheckoutRequest::with_defaults(
        &address,
        dates.first().map(String::as_str).unwrap_or_default(),
    );
    CheckoutForm {
        address: defaults.address,
        payment: DEFAULT_PAYMENT.to_string(),
        fulfillment: defaults.fulfillment.label().to_ascii_lowercase(),
        selected_date: defaults.selected_date,
        selected_time: defaults.selected_time,
        dates,
        time_slots: TIME_SLOTS.iter().map(|slot| slot.to_string()).collect(),
        subtotal,
        delivery_fee: delivery_fee(true),
    }
}

fn place_order<S: KvStore, C: Clock>(
    store: S,
    clock: C,
    request: &CheckoutRequest,
) -> ActionResponse {
    let mut basket = BasketService::load(&store, &clock);
    let mut orders = OrderService::load(&store, &clock);
    match orders.checkout(&mut basket, request) {
        Ok(order) => ActionResponse::success(
            "Order placed successfully!",
            Some(order.order_id.to_string()),
        ),
        Err(err) => ActionResponse::failure(err.user_message()),
    }
}

fn list_orders<S: KvStore, C: Clock>(
    store: S,
    clock: C,
    filter: StatusFilter,
) -> Result<Vec<OrderView>, String> {
    let now_ms = clock.now_ms();
    let mut orders = OrderService::load(store, clock);
    orders.set_filter(filter);
    Ok(orders
        .visible()
        .into_iter()
        .map(|order| order_view(order, now_ms))
        .collect())
}

fn order_view(order: &Order, now_ms: i64) -> OrderView {
    OrderView {
        order_id: order.order_id.to_string(),
        status: order.status.as_str().to_string(),
        status_label: order.status_label().to_string(),
        can_cancel: order.can_cancel(),
        total: order.total,
        subtotal: order.subtotal(),
        item_count: order.item_count(),
        address: order.address.clone(),
        payment: order.payment.clone(),
        fulfillment: order.fulfillment.label().to_string(),
        selected_date: order.selected_date.clone(),
        selected_time: order.selected_time.clone(),
        created_at: order.created_at,
        age: format_age(order.created_at, now_ms),
    }
}

fn cancel_order<S: KvStore, C: Clock>(
    store: S,
    clock: C,
    order_id: &str,
) -> Result<ActionResponse, String> {
    let mut orders = OrderService::load(store, clock);
    let id = OrderId::from(order_id);
    match orders.order(&id) {
        Some(order) if !order.can_cancel() => {
            return Ok(ActionResponse::failure(format!(
                "Order {id} can no longer be cancelled."
            )))
        }
        _ => {}
    }
    orders.cancel(&id).map_err(|err| err.to_string())?;
    Ok(ActionResponse::success(
        "Order cancelled successfully",
        Some(id.to_string()),
    ))
}

fn reorder<S: KvStore, C: Clock>(
    store: S,
    clock: C,
    order_id: &str,
) -> Result<ActionResponse, String> {
    let orders = OrderService::load(store, clock);
    let id = OrderId::from(order_id);
    let copies = orders.reorder(&id).map_err(|err| err.to_string())?;
    Ok(ActionResponse::success(
        format!("{} item(s) added to your basket.", copies.len()),
        Some(id.to_string()),
    ))
}

#[cfg(test)]
mod tests {
    use super::{
        add_load, cancel_order, change_qty, configure_storage, core_version, form_for,
        init_logging, list_orders, orders_list, ping, place_order, reorder, set_group_checked,
        snapshot_of, QtyChange,
    };
    use laundromat_core::clock::MINUTE_MS;
    use laundromat_core::{
        CheckoutRequest, FulfillmentType, KvStore, ManualClock, MemoryStore, OrderStatus,
        StatusFilter,
    };
    use serde_json::json;

    const NOW: i64 = 1_760_000_000_000;

    fn request(address: &str) -> CheckoutRequest {
        CheckoutRequest {
            address: address.to_string(),
            payment: "cash".to_string(),
            fulfillment: FulfillmentType::Delivery,
            selected_date: "Friday, Oct 16, 2026".to_string(),
            selected_time: "2:00–2:15 PM".to_string(),
        }
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_relative_log_dir() {
        let error = init_logging("info".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn configure_storage_rejects_blank_path() {
        assert!(!configure_storage("  ".to_string()).is_empty());
    }

    #[test]
    fn orders_list_rejects_unknown_filter() {
        let response = orders_list("shipped".to_string());
        assert!(!response.ok);
        assert!(response.message.contains("shipped"));
    }

    #[test]
    fn added_load_shows_up_in_snapshot() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(NOW);

        let added = add_load(&store, &clock, "wash", "c1", Some("≤ 8KG"), &[], 2).unwrap();
        assert!(added.ok, "{}", added.message);

        let snapshot = snapshot_of(&store, &clock).unwrap();
        assert_eq!(snapshot.groups.len(), 1);
        assert_eq!(snapshot.groups[0].label, "Wash");
        assert!(snapshot.groups[0].checked);
        assert_eq!(snapshot.groups[0].items[0].garment, "Everyday Wear");
        assert_eq!(snapshot.total, 280);
        assert!(snapshot.all_selected);
    }

    #[test]
    fn incomplete_load_is_refused() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(NOW);

        let missing_weight = add_load(&store, &clock, "dry", "c1", None, &[], 1).unwrap();
        assert!(!missing_weight.ok);
        let zero_qty = add_load(&store, &clock, "press", "c1", None, &[], 0).unwrap();
        assert!(!zero_qty.ok);
        assert!(add_load(&store, &clock, "fold", "c1", None, &[], 1).is_err());
        assert!(store.get("basket").unwrap().is_none());
    }

    #[test]
    fn quantity_and_group_changes_flow_through() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(NOW);
        let added = add_load(&store, &clock, "press", "c2", None, &[], 1).unwrap();
        let id = added.id.unwrap();

        let up = change_qty(&store, &clock, &id, QtyChange::Increase).unwrap();
        assert_eq!(up.message, "2");
        let down = change_qty(&store, &clock, &id, QtyChange::Decrease).unwrap();
        assert_eq!(down.message, "1");
        let floor = change_qty(&store, &clock, &id, QtyChange::Decrease).unwrap();
        assert_eq!(floor.message, "1");

        set_group_checked(&store, &clock, "press", false).unwrap();
        let snapshot = snapshot_of(&store, &clock).unwrap();
        assert_eq!(snapshot.total, 0);
        assert!(!snapshot.groups[0].checked);
    }

    #[test]
    fn checkout_then_cancel_then_reorder() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(NOW);
        add_load(&store, &clock, "wash", "c1", Some("≤ 8KG"), &[], 2).unwrap();

        let rejected = place_order(&store, &clock, &request(""));
        assert!(!rejected.ok);
        assert_eq!(rejected.message, "Please enter your address.");

        let placed = place_order(&store, &clock, &request("12 Rizal St"));
        assert!(placed.ok, "{}", placed.message);
        let order_id = placed.id.unwrap();
        assert_eq!(snapshot_of(&store, &clock).unwrap().groups.len(), 0);

        let listed = list_orders(&store, &clock, StatusFilter::All).unwrap();
        assert_eq!(listed[0].total, 310);
        assert_eq!(listed[0].age, "Just now");

        let cancelled = cancel_order(&store, &clock, &order_id).unwrap();
        assert!(cancelled.ok);
        let again = cancel_order(&store, &clock, &order_id).unwrap();
        assert!(!again.ok);
        let pending = list_orders(&store, &clock, StatusFilter::Only(OrderStatus::Pending)).unwrap();
        assert!(pending.is_empty());

        let reordered = reorder(&store, &clock, &order_id).unwrap();
        assert!(reordered.ok);
        assert_eq!(snapshot_of(&store, &clock).unwrap().total, 280);
    }

    #[test]
    fn listing_refreshes_elapsed_statuses() {
        let store = MemoryStore::new();
        store
            .set(
                "orders",
                &json!([{"orderId": "ORD-1", "createdAt": NOW - 6 * MINUTE_MS, "status": "pending", "type": "pickup"}]),
            )
            .unwrap();
        let clock = ManualClock::new(NOW);

        let listed = list_orders(&store, &clock, StatusFilter::All).unwrap();
        assert_eq!(listed[0].status, "ready");
        assert_eq!(listed[0].status_label, "Ready for Pickup");
        assert!(listed[0].can_cancel);
    }

    #[test]
    fn checkout_form_offers_a_week_of_dates() {
        let form = form_for("12 Rizal St".to_string(), 310, NOW);
        assert_eq!(form.dates.len(), 7);
        assert_eq!(form.selected_date, form.dates[0]);
        assert_eq!(form.time_slots.len(), 24);
        assert_eq!(form.selected_time, "2:00–2:15 PM");
        assert_eq!(form.fulfillment, "delivery");
        assert_eq!(form.delivery_fee, 30);
    }
}
