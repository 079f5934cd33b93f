//! Basket aggregation use-case.
//!
//! # Responsibility
//! - Own the in-memory basket view and write every mutation back.
//! - Derive segment groups, selection flags and totals on demand.
//!
//! # Invariants
//! - Item `selected` flags are the only stored selection state; group
//!   `checked` and select-all are always re-derived.
//! - Write-back order is grouped items in canonical segment order, followed by
//!   stored entries that could not be routed to any group.
//! - `qty` never drops below 1.
//! - A mutation is adopted in memory only after its write succeeded.

use crate::clock::Clock;
use crate::model::catalog::Amount;
use crate::model::load_item::{normalize_entry, ItemId, LoadItem, Segment, StoredEntry};
use crate::store::{read_list_soft, KvStore, StoreError, StoreResult, SLOT_BASKET};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BasketResult<T> = Result<T, BasketError>;

/// Basket mutation error.
#[derive(Debug)]
pub enum BasketError {
    ItemNotFound(ItemId),
    Store(StoreError),
}

impl Display for BasketError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(id) => write!(f, "basket item not found: {id}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BasketError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::ItemNotFound(_) => None,
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for BasketError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Items of one segment, derived from the basket on every read.
#[derive(Debug, Clone, PartialEq)]
pub struct BasketGroup<'a> {
    pub segment: Segment,
    pub items: Vec<&'a LoadItem>,
    /// True iff the group is non-empty and every item is selected.
    pub checked: bool,
}

impl BasketGroup<'_> {
    pub fn label(&self) -> &'static str {
        self.segment.label()
    }
}

/// Basket view over the `basket` slot.
pub struct BasketService<S: KvStore, C: Clock> {
    store: S,
    clock: C,
    items: Vec<LoadItem>,
    unrouted: Vec<Value>,
}

impl<S: KvStore, C: Clock> BasketService<S, C> {
    /// Loads the basket slot; absent or malformed data reads as empty.
    pub fn load(store: S, clock: C) -> Self {
        let mut service = Self {
            store,
            clock,
            items: Vec::new(),
            unrouted: Vec::new(),
        };
        service.reload();
        service
    }

    /// Re-reads the basket slot, discarding in-memory state.
    pub fn reload(&mut self) {
        let now_ms = self.clock.now_ms();
        self.items.clear();
        self.unrouted.clear();

        for raw in read_list_soft(&self.store, SLOT_BASKET, "basket") {
            match normalize_entry(raw, now_ms) {
                StoredEntry::Load(item) => self.items.push(item),
                StoredEntry::Unrouted(raw) => self.unrouted.push(raw),
            }
        }

        if !self.unrouted.is_empty() {
            warn!(
                "event=basket_load module=basket status=ok unrouted={}",
                self.unrouted.len()
            );
        }
        debug!(
            "event=basket_load module=basket status=ok items={}",
            self.items.len()
        );
    }

    pub fn items(&self) -> &[LoadItem] {
        &self.items
    }

    pub fn item(&self, id: &ItemId) -> Option<&LoadItem> {
        self.items.iter().find(|item| &item.id == id)
    }

    /// Stored entries kept verbatim because no group can hold them.
    pub fn unrouted(&self) -> &[Value] {
        &self.unrouted
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// One group per segment that holds at least one item, in canonical order.
    pub fn groups(&self) -> Vec<BasketGroup<'_>> {
        Segment::ALL
            .iter()
            .filter_map(|segment| self.group(*segment))
            .collect()
    }

    /// Group for `segment`, or `None` when the segment has no items.
    pub fn group(&self, segment: Segment) -> Option<BasketGroup<'_>> {
        let items: Vec<&LoadItem> = self
            .items
            .iter()
            .filter(|item| item.segment == segment)
            .collect();
        if items.is_empty() {
            return None;
        }
        let checked = items.iter().all(|item| item.selected);
        Some(BasketGroup {
            segment,
            items,
            checked,
        })
    }

    /// True iff at least one group exists and every group is checked.
    pub fn is_all_selected(&self) -> bool {
        let groups = self.groups();
        !groups.is_empty() && groups.iter().all(|group| group.checked)
    }

    /// Sum of `unit price * qty` over selected items.
    pub fn total(&self) -> Amount {
        self.items
            .iter()
            .filter(|item| item.selected)
            .map(LoadItem::line_total)
            .sum()
    }

    /// Snapshot of selected items in group order.
    pub fn selected_items(&self) -> Vec<LoadItem> {
        self.groups()
            .into_iter()
            .flat_map(|group| group.items)
            .filter(|item| item.selected)
            .cloned()
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.items.iter().filter(|item| item.selected).count()
    }

    /// Sets `selected` on every item of `segment` and persists.
    ///
    /// A segment without items is left alone and nothing is written.
    pub fn set_group_checked(&mut self, segment: Segment, checked: bool) -> BasketResult<()> {
        if !self.items.iter().any(|item| item.segment == segment) {
            return Ok(());
        }
        let mut next = self.items.clone();
        for item in next.iter_mut().filter(|item| item.segment == segment) {
            item.selected = checked;
        }
        self.commit("group_toggle", next)?;
        Ok(())
    }

    /// Sets `selected` on one item and persists.
    pub fn set_item_selected(&mut self, id: &ItemId, selected: bool) -> BasketResult<()> {
        let position = self.position(id)?;
        let mut next = self.items.clone();
        next[position].selected = selected;
        self.commit("item_toggle", next)?;
        Ok(())
    }

    /// Propagates the top-level flag to every item and persists.
    pub fn set_all_selected(&mut self, selected: bool) -> BasketResult<()> {
        let next = self
            .items
            .iter()
            .cloned()
            .map(|item| LoadItem { selected, ..item })
            .collect();
        self.commit("select_all", next)?;
        Ok(())
    }

    /// Increments the quantity and returns the new value.
    pub fn increase_qty(&mut self, id: &ItemId) -> BasketResult<u32> {
        let position = self.position(id)?;
        let mut next = self.items.clone();
        let qty = next[position].qty.saturating_add(1);
        next[position].qty = qty;
        self.commit("qty_increase", next)?;
        Ok(qty)
    }

    /// Decrements the quantity and returns the new value.
    ///
    /// At `qty == 1` this is a no-op and nothing is written.
    pub fn decrease_qty(&mut self, id: &ItemId) -> BasketResult<u32> {
        let position = self.position(id)?;
        let current = self.items[position].qty;
        if current <= 1 {
            return Ok(current);
        }
        let mut next = self.items.clone();
        next[position].qty = current - 1;
        self.commit("qty_decrease", next)?;
        Ok(current - 1)
    }

    /// Deletes one item and persists immediately.
    pub fn remove_item(&mut self, id: &ItemId) -> BasketResult<LoadItem> {
        let position = self.position(id)?;
        let mut next = self.items.clone();
        let removed = next.remove(position);
        self.commit("remove", next)?;
        Ok(removed)
    }

    /// Splits the basket into (selected snapshot, remaining items) without
    /// touching storage.
    pub(crate) fn split_selected(&self) -> (Vec<LoadItem>, Vec<LoadItem>) {
        let selected = self.selected_items();
        let remaining = grouped_order(
            self.items
                .iter()
                .filter(|item| !item.selected)
                .cloned()
                .collect(),
        );
        (selected, remaining)
    }

    /// Encodes the slot value that would be written for `items`.
    pub(crate) fn encode_with_unrouted(&self, items: &[LoadItem]) -> StoreResult<Value> {
        let mut entries = Vec::with_capacity(items.len() + self.unrouted.len());
        for item in items {
            entries.push(
                serde_json::to_value(item).map_err(|source| StoreError::Serialization {
                    key: SLOT_BASKET.to_string(),
                    source,
                })?,
            );
        }
        entries.extend(self.unrouted.iter().cloned());
        Ok(Value::Array(entries))
    }

    /// Writes an already encoded basket value.
    pub(crate) fn store_slot(&self, value: &Value) -> StoreResult<()> {
        self.store.set(SLOT_BASKET, value)
    }

    /// Adopts `items` after they were written by another flow.
    pub(crate) fn replace_items(&mut self, items: Vec<LoadItem>) {
        self.items = items;
    }

    fn position(&self, id: &ItemId) -> BasketResult<usize> {
        self.items
            .iter()
            .position(|item| &item.id == id)
            .ok_or_else(|| BasketError::ItemNotFound(id.clone()))
    }

    /// Writes `next` in grouped order and adopts it only once the write
    /// succeeded; on failure the view keeps matching storage.
    fn commit(&mut self, action: &str, next: Vec<LoadItem>) -> StoreResult<()> {
        let next = grouped_order(next);
        let value = self.encode_with_unrouted(&next)?;
        match self.store.set(SLOT_BASKET, &value) {
            Ok(()) => {
                self.items = next;
                info!(
                    "event=basket_save module=basket status=ok action={action} items={} unrouted={}",
                    self.items.len(),
                    self.unrouted.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=basket_save module=basket status=error action={action} error={err}"
                );
                Err(err)
            }
        }
    }
}

/// Stable reorder into canonical segment order.
fn grouped_order(mut items: Vec<LoadItem>) -> Vec<LoadItem> {
    items.sort_by_key(|item| item.segment);
    items
}
