//! Load configurator use-case.
//!
//! # Responsibility
//! - Hold the transient selection for the next basket load.
//! - Gate and perform the single append of a finished load to the basket slot.
//!
//! # Invariants
//! - A successful add performs exactly one append to `basket`.
//! - Press loads never carry a weight tier or add-ons.
//! - The draft is reset to empty after every successful add.

use crate::clock::Clock;
use crate::model::catalog::MAX_ADDITIONALS;
use crate::model::load_item::{LoadItem, Segment};
use crate::store::{KvStore, StoreError, StoreResult, SLOT_BASKET, SLOT_SERVICE_SELECTION};
use log::{info, warn};
use serde::Serialize;

/// In-progress selection for one load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadDraft {
    pub segment: Segment,
    pub casual: Option<String>,
    pub weight: Option<String>,
    pub additionals: Vec<String>,
    #[serde(skip)]
    pub qty: u32,
}

impl LoadDraft {
    pub fn new(segment: Segment) -> Self {
        Self {
            segment,
            casual: None,
            weight: None,
            additionals: Vec::new(),
            qty: 0,
        }
    }

    /// Whether every field required by the segment is filled.
    ///
    /// Press needs only a garment; every other segment also needs a weight tier.
    /// Blank values count as unset.
    pub fn has_required_fields(&self) -> bool {
        if !is_filled(&self.casual) {
            return false;
        }
        !self.segment.uses_weight_and_additionals() || is_filled(&self.weight)
    }

    pub fn can_add(&self) -> bool {
        self.has_required_fields() && self.qty >= 1
    }

    fn clear_selection(&mut self) {
        self.casual = None;
        self.weight = None;
        self.additionals.clear();
        self.qty = 0;
    }
}

/// Builds basket loads from user selections.
pub struct LoadConfigurator<S: KvStore, C: Clock> {
    store: S,
    clock: C,
    draft: LoadDraft,
}

impl<S: KvStore, C: Clock> LoadConfigurator<S, C> {
    /// Starts an empty draft on the `wash` segment.
    pub fn new(store: S, clock: C) -> Self {
        Self {
            store,
            clock,
            draft: LoadDraft::new(Segment::Wash),
        }
    }

    pub fn draft(&self) -> &LoadDraft {
        &self.draft
    }

    /// Switches the segment the next load is configured for.
    pub fn set_segment(&mut self, segment: Segment) {
        self.draft.segment = segment;
        self.remember_selection();
    }

    /// Selects `casual`, or clears it when it is already selected.
    ///
    /// Blank ids are ignored.
    pub fn toggle_casual(&mut self, casual: &str) {
        if casual.trim().is_empty() {
            return;
        }
        self.draft.casual = toggled(self.draft.casual.take(), casual);
        self.remember_selection();
    }

    /// Selects `weight`, or clears it when it is already selected.
    ///
    /// Blank tiers are ignored.
    pub fn toggle_weight(&mut self, weight: &str) {
        if weight.trim().is_empty() {
            return;
        }
        self.draft.weight = toggled(self.draft.weight.take(), weight);
        self.remember_selection();
    }

    /// Adds or removes an add-on; adding past the limit is ignored.
    pub fn toggle_additional(&mut self, value: &str) {
        let additionals = &mut self.draft.additionals;
        if let Some(position) = additionals.iter().position(|existing| existing == value) {
            additionals.remove(position);
        } else if additionals.len() < MAX_ADDITIONALS {
            additionals.push(value.to_string());
        }
        self.remember_selection();
    }

    /// Quantity controls are enabled only once required fields are filled.
    pub fn increase_qty(&mut self) {
        if self.draft.has_required_fields() {
            self.draft.qty = self.draft.qty.saturating_add(1);
        }
    }

    pub fn decrease_qty(&mut self) {
        self.draft.qty = self.draft.qty.saturating_sub(1);
    }

    /// Sets the quantity in one step, under the same gate as [`Self::increase_qty`].
    pub fn set_qty(&mut self, qty: u32) {
        if self.draft.has_required_fields() {
            self.draft.qty = qty;
        }
    }

    /// Appends the drafted load to the basket.
    ///
    /// Returns `Ok(None)` without touching storage when the draft cannot be
    /// added yet (missing required fields or quantity below 1).
    ///
    /// # Errors
    /// - Returns the store error when the append fails; the draft is kept.
    pub fn add_to_basket(&mut self) -> StoreResult<Option<LoadItem>> {
        if !self.draft.can_add() {
            return Ok(None);
        }

        let item = LoadItem::new(
            self.draft.segment,
            self.draft.casual.clone(),
            self.draft.weight.clone(),
            self.draft.additionals.clone(),
            self.draft.qty,
            self.clock.now_ms(),
        );
        let encoded = serde_json::to_value(&item).map_err(|source| StoreError::Serialization {
            key: SLOT_BASKET.to_string(),
            source,
        })?;
        self.store.append(SLOT_BASKET, encoded)?;

        info!(
            "event=basket_add module=configurator status=ok segment={} qty={}",
            item.segment.as_str(),
            item.qty
        );
        self.draft.clear_selection();
        Ok(Some(item))
    }

    fn remember_selection(&self) {
        let written = serde_json::to_value(&self.draft)
            .map_err(|source| StoreError::Serialization {
                key: SLOT_SERVICE_SELECTION.to_string(),
                source,
            })
            .and_then(|value| self.store.set(SLOT_SERVICE_SELECTION, &value));
        if let Err(err) = written {
            warn!("event=selection_save module=configurator status=error error={err}");
        }
    }
}

fn is_filled(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|text| !text.trim().is_empty())
}

fn toggled(current: Option<String>, value: &str) -> Option<String> {
    match current {
        Some(existing) if existing == value => None,
        _ => Some(value.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::LoadDraft;
    use crate::model::load_item::Segment;

    #[test]
    fn press_requires_only_a_garment() {
        let mut draft = LoadDraft::new(Segment::Press);
        assert!(!draft.has_required_fields());
        draft.casual = Some("c1".to_string());
        assert!(draft.has_required_fields());
    }

    #[test]
    fn wash_requires_garment_and_weight() {
        let mut draft = LoadDraft::new(Segment::Wash);
        draft.casual = Some("c1".to_string());
        assert!(!draft.has_required_fields());
        draft.weight = Some("≤ 8KG".to_string());
        assert!(draft.has_required_fields());
        assert!(!draft.can_add());
        draft.qty = 1;
        assert!(draft.can_add());
    }

    #[test]
    fn blank_fields_do_not_satisfy_the_gate() {
        let mut draft = LoadDraft::new(Segment::Wash);
        draft.casual = Some("  ".to_string());
        draft.weight = Some("≤ 8KG".to_string());
        draft.qty = 1;
        assert!(!draft.can_add());

        draft.casual = Some("c1".to_string());
        draft.weight = Some(String::new());
        assert!(!draft.can_add());
    }
}
