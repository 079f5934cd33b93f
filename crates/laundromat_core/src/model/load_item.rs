//! Load item domain model.
//!
//! # Responsibility
//! - Define the basket entry produced by the configurator.
//! - Map loosely shaped persisted records into validated items.
//!
//! # Invariants
//! - `weight` is `None` and `additionals` is empty when `segment == Press`.
//! - `qty >= 1`.
//! - `additionals` holds at most three distinct values.
//! - `segment` never changes after creation.

use crate::model::catalog::{self, Amount, MAX_ADDITIONALS};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Top-level service category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Wash,
    Dry,
    Special,
    Press,
}

impl Segment {
    /// Canonical display and grouping order.
    pub const ALL: [Segment; 4] = [Self::Wash, Self::Dry, Self::Special, Self::Press];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wash => "wash",
            Self::Dry => "dry",
            Self::Special => "special",
            Self::Press => "press",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "wash" => Some(Self::Wash),
            "dry" => Some(Self::Dry),
            "special" => Some(Self::Special),
            "press" => Some(Self::Press),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Wash => "Wash",
            Self::Dry => "Dry",
            Self::Special => "Special",
            Self::Press => "Press",
        }
    }

    /// Press jobs are priced per garment and take no weight tier or add-ons.
    pub fn uses_weight_and_additionals(self) -> bool {
        self != Self::Press
    }
}

/// Opaque basket item identifier.
///
/// Fresh ids are time-ordered UUIDs; ids read back from older storage may be
/// any non-empty text, including the decimal form of a legacy numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One configured unit of laundry work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadItem {
    pub id: ItemId,
    pub segment: Segment,
    /// Garment catalog id; drives the unit price.
    pub casual: Option<String>,
    pub weight: Option<String>,
    pub additionals: Vec<String>,
    pub qty: u32,
    /// Whether the item takes part in the next checkout.
    pub selected: bool,
    /// Creation time in epoch milliseconds. Informational.
    pub timestamp: i64,
}

impl LoadItem {
    /// Creates a selected item with a fresh id.
    ///
    /// Segment rules are applied: press items drop weight and add-ons, add-ons
    /// are deduplicated and capped, and `qty` is raised to at least 1.
    pub fn new(
        segment: Segment,
        casual: Option<String>,
        weight: Option<String>,
        additionals: Vec<String>,
        qty: u32,
        now_ms: i64,
    ) -> Self {
        let mut item = Self {
            id: ItemId::generate(),
            segment,
            casual,
            weight,
            additionals,
            qty,
            selected: true,
            timestamp: now_ms,
        };
        item.enforce_invariants();
        item
    }

    /// Copies this item under a fresh id and timestamp, selected.
    pub fn duplicate_at(&self, now_ms: i64) -> Self {
        Self {
            id: ItemId::generate(),
            selected: true,
            timestamp: now_ms,
            ..self.clone()
        }
    }

    pub fn unit_price(&self) -> Amount {
        catalog::unit_price(self.casual.as_deref())
    }

    pub fn line_total(&self) -> Amount {
        self.unit_price().saturating_mul(Amount::from(self.qty))
    }

    pub fn garment_name(&self) -> &str {
        catalog::garment_name(self.casual.as_deref())
    }

    fn enforce_invariants(&mut self) {
        if !self.segment.uses_weight_and_additionals() {
            self.weight = None;
            self.additionals.clear();
        } else {
            self.additionals = dedup_capped(std::mem::take(&mut self.additionals));
        }
        self.qty = self.qty.max(1);
    }
}

/// Result of reading one persisted basket entry.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredEntry {
    Load(LoadItem),
    /// Entry that cannot be routed to a segment group. Retained verbatim.
    Unrouted(Value),
}

/// Maps one persisted basket entry to a validated item.
///
/// Every missing field is defaulted: `qty = 1`, `selected = true`,
/// `additionals = []`, nullable fields `None`, a fresh id, `segment = wash`,
/// `timestamp = now_ms`. Entries that are not objects, or whose segment is
/// present but unknown, are returned as [`StoredEntry::Unrouted`].
pub fn normalize_entry(raw: Value, now_ms: i64) -> StoredEntry {
    let Value::Object(fields) = raw else {
        return StoredEntry::Unrouted(raw);
    };

    let segment = match fields.get("segment") {
        None | Some(Value::Null) => Segment::Wash,
        Some(Value::String(value)) => match Segment::parse(value) {
            Some(segment) => segment,
            None => return StoredEntry::Unrouted(Value::Object(fields)),
        },
        Some(_) => return StoredEntry::Unrouted(Value::Object(fields)),
    };

    StoredEntry::Load(item_from_fields(&fields, segment, now_ms))
}

/// Maps a record whose segment may be unknown, falling back to `wash`.
///
/// Used for order snapshots, where there is no unrouted bucket to keep
/// unknown entries in. Returns `None` for non-object records.
pub fn normalize_snapshot_item(raw: &Value, now_ms: i64) -> Option<LoadItem> {
    let fields = raw.as_object()?;
    let segment = fields
        .get("segment")
        .and_then(Value::as_str)
        .and_then(Segment::parse)
        .unwrap_or(Segment::Wash);
    Some(item_from_fields(fields, segment, now_ms))
}

fn item_from_fields(fields: &Map<String, Value>, segment: Segment, now_ms: i64) -> LoadItem {
    let id = match fields.get("id") {
        Some(Value::String(text)) if !text.trim().is_empty() => ItemId(text.clone()),
        Some(Value::Number(number)) => ItemId(number.to_string()),
        _ => ItemId::generate(),
    };

    let additionals = fields
        .get("additionals")
        .and_then(Value::as_array)
        .map(|values| {
            values
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .unwrap_or_default();

    let mut item = LoadItem {
        id,
        segment,
        casual: optional_text(fields, "casual"),
        weight: optional_text(fields, "weight"),
        additionals,
        qty: fields.get("qty").and_then(quantity_value).unwrap_or(1),
        selected: fields
            .get("selected")
            .and_then(Value::as_bool)
            .unwrap_or(true),
        timestamp: fields
            .get("timestamp")
            .and_then(epoch_ms_value)
            .unwrap_or(now_ms),
    };
    item.enforce_invariants();
    item
}

fn optional_text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

fn quantity_value(value: &Value) -> Option<u32> {
    if let Some(whole) = value.as_u64() {
        return Some(u32::try_from(whole).unwrap_or(u32::MAX));
    }
    value
        .as_f64()
        .filter(|qty| qty.is_finite() && *qty >= 1.0)
        .map(|qty| qty.min(f64::from(u32::MAX)) as u32)
}

pub(crate) fn epoch_ms_value(value: &Value) -> Option<i64> {
    value.as_i64().or_else(|| {
        value
            .as_f64()
            .filter(|ms| ms.is_finite())
            .map(|ms| ms as i64)
    })
}

fn dedup_capped(values: Vec<String>) -> Vec<String> {
    let mut kept: Vec<String> = Vec::with_capacity(MAX_ADDITIONALS);
    for value in values {
        if kept.len() == MAX_ADDITIONALS {
            break;
        }
        if !kept.contains(&value) {
            kept.push(value);
        }
    }
    kept
}
