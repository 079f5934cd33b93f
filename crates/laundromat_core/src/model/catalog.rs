//! Service catalog and canonical price table.
//!
//! # Invariants
//! - Every segment offers the same garment catalog at the same unit price.
//! - Weight tiers and add-ons carry display text only; they never contribute
//!   to a total.
//! - Unknown or absent garment ids price as 0.

use crate::model::load_item::Segment;

/// Whole-peso monetary amount.
pub type Amount = u64;

/// Fee added to the checkout total for home delivery.
pub const DELIVERY_FEE: Amount = 30;

/// Maximum number of add-ons on a single load.
pub const MAX_ADDITIONALS: usize = 3;

/// Garment-type catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Garment {
    pub id: &'static str,
    pub name: &'static str,
    pub price: Amount,
}

/// Weight tier offered by non-press segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightTier {
    pub value: &'static str,
    pub price_text: &'static str,
}

/// Optional extra service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddOn {
    pub value: &'static str,
    pub name: &'static str,
    pub price_text: &'static str,
}

pub const GARMENTS: &[Garment] = &[
    Garment {
        id: "c1",
        name: "Everyday Wear",
        price: 140,
    },
    Garment {
        id: "c2",
        name: "Casual Wear",
        price: 140,
    },
    Garment {
        id: "c3",
        name: "Delicates",
        price: 140,
    },
    Garment {
        id: "c4",
        name: "Bedsheets",
        price: 140,
    },
];

pub const WEIGHT_TIERS: &[WeightTier] = &[
    WeightTier {
        value: "≤ 8KG",
        price_text: "Free",
    },
    WeightTier {
        value: "› 8KG",
        price_text: "+₱20.00",
    },
];

pub const ADD_ONS: &[AddOn] = &[
    AddOn {
        value: "fold",
        name: "Fold",
        price_text: "+₱20.00",
    },
    AddOn {
        value: "iron",
        name: "Iron",
        price_text: "+₱50.00",
    },
    AddOn {
        value: "dry",
        name: "Dry",
        price_text: "+₱70.00",
    },
];

/// Garments offered for `segment`.
pub fn garments_for(_segment: Segment) -> &'static [Garment] {
    GARMENTS
}

pub fn find_garment(casual: &str) -> Option<&'static Garment> {
    GARMENTS.iter().find(|garment| garment.id == casual)
}

/// Unit price for a garment id; unknown or absent ids price as 0.
pub fn unit_price(casual: Option<&str>) -> Amount {
    casual.and_then(find_garment).map_or(0, |garment| garment.price)
}

/// Display name for a garment id.
///
/// Unknown ids are shown as-is and an absent id reads `Custom`.
pub fn garment_name(casual: Option<&str>) -> &str {
    match casual {
        Some(id) => find_garment(id).map_or(id, |garment| garment.name),
        None => "Custom",
    }
}

/// Fee for the chosen fulfillment; pickup is free.
pub fn delivery_fee(is_delivery: bool) -> Amount {
    if is_delivery {
        DELIVERY_FEE
    } else {
        0
    }
}
