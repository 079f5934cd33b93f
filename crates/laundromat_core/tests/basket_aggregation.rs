mod common;

use common::FlakyStore;
use laundromat_core::{BasketError, BasketService, ItemId, KvStore, ManualClock, MemoryStore, Segment};
use serde_json::{json, Value};

const NOW: i64 = 1_760_000_000_000;

fn seeded(entries: Value) -> MemoryStore {
    let store = MemoryStore::new();
    store.set("basket", &entries).unwrap();
    store
}

fn stored_basket(store: &MemoryStore) -> Vec<Value> {
    match store.get("basket").unwrap() {
        Some(Value::Array(items)) => items,
        other => panic!("basket slot is not a list: {other:?}"),
    }
}

#[test]
fn total_counts_only_selected_items() {
    let store = seeded(json!([
        {"id": "a", "segment": "wash", "casual": "c1", "weight": "≤ 8KG", "qty": 2, "selected": true},
        {"id": "b", "segment": "dry", "casual": "c2", "weight": "› 8KG", "qty": 1, "selected": false},
        {"id": "c", "segment": "press", "casual": "c4", "qty": 3, "selected": true},
    ]));
    let clock = ManualClock::new(NOW);
    let basket = BasketService::load(&store, &clock);

    assert_eq!(basket.total(), 140 * 2 + 140 * 3);
    assert_eq!(basket.selected_count(), 2);
}

#[test]
fn groups_follow_canonical_segment_order() {
    let store = seeded(json!([
        {"id": "p", "segment": "press", "casual": "c1", "qty": 1},
        {"id": "w", "segment": "wash", "casual": "c1", "weight": "≤ 8KG", "qty": 1},
        {"id": "s", "segment": "special", "casual": "c3", "weight": "≤ 8KG", "qty": 1},
    ]));
    let clock = ManualClock::new(NOW);
    let basket = BasketService::load(&store, &clock);

    let segments: Vec<Segment> = basket.groups().iter().map(|group| group.segment).collect();
    assert_eq!(segments, vec![Segment::Wash, Segment::Special, Segment::Press]);
    assert!(basket.group(Segment::Dry).is_none());
}

#[test]
fn unchecking_a_group_deselects_only_its_items() {
    let store = seeded(json!([
        {"id": "w1", "segment": "wash", "casual": "c1", "weight": "≤ 8KG", "qty": 1, "selected": true},
        {"id": "w2", "segment": "wash", "casual": "c2", "weight": "≤ 8KG", "qty": 1, "selected": true},
        {"id": "d1", "segment": "dry", "casual": "c1", "weight": "≤ 8KG", "qty": 1, "selected": true},
    ]));
    let clock = ManualClock::new(NOW);
    let mut basket = BasketService::load(&store, &clock);
    assert!(basket.is_all_selected());

    basket.set_group_checked(Segment::Wash, false).unwrap();

    assert!(!basket.group(Segment::Wash).unwrap().checked);
    assert!(basket.group(Segment::Dry).unwrap().checked);
    assert!(!basket.is_all_selected());
    assert_eq!(basket.total(), 140);

    let reloaded = BasketService::load(&store, &clock);
    assert_eq!(reloaded.selected_count(), 1);
    assert!(reloaded.item(&ItemId::from("d1")).unwrap().selected);
}

#[test]
fn group_checked_is_derived_from_item_flags() {
    let store = seeded(json!([
        {"id": "w1", "segment": "wash", "casual": "c1", "weight": "≤ 8KG", "qty": 1, "selected": true},
        {"id": "w2", "segment": "wash", "casual": "c2", "weight": "≤ 8KG", "qty": 1, "selected": false},
    ]));
    let clock = ManualClock::new(NOW);
    let mut basket = BasketService::load(&store, &clock);
    assert!(!basket.group(Segment::Wash).unwrap().checked);

    basket.set_item_selected(&ItemId::from("w2"), true).unwrap();
    assert!(basket.group(Segment::Wash).unwrap().checked);
    assert!(basket.is_all_selected());

    for entry in stored_basket(&store) {
        assert!(entry.get("checked").is_none());
        assert_eq!(entry["selected"], json!(true));
    }
}

#[test]
fn select_all_on_empty_basket_is_a_no_op() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(NOW);
    let mut basket = BasketService::load(&store, &clock);

    basket.set_all_selected(true).unwrap();

    assert!(basket.is_empty());
    assert!(!basket.is_all_selected());
    assert_eq!(basket.total(), 0);
}

#[test]
fn select_all_propagates_to_every_item() {
    let store = seeded(json!([
        {"id": "w", "segment": "wash", "casual": "c1", "weight": "≤ 8KG", "qty": 1, "selected": false},
        {"id": "p", "segment": "press", "casual": "c2", "qty": 2, "selected": false},
    ]));
    let clock = ManualClock::new(NOW);
    let mut basket = BasketService::load(&store, &clock);

    basket.set_all_selected(true).unwrap();
    assert!(basket.is_all_selected());
    assert_eq!(basket.total(), 140 + 280);

    basket.set_all_selected(false).unwrap();
    assert_eq!(basket.selected_count(), 0);
    assert!(basket.groups().iter().all(|group| !group.checked));
}

#[test]
fn decrease_at_quantity_one_changes_nothing() {
    let store = seeded(json!([
        {"id": "w", "segment": "wash", "casual": "c1", "weight": "≤ 8KG", "qty": 1},
    ]));
    let clock = ManualClock::new(NOW);
    let mut basket = BasketService::load(&store, &clock);
    let before = store.get("basket").unwrap();

    let qty = basket.decrease_qty(&ItemId::from("w")).unwrap();

    assert_eq!(qty, 1);
    assert_eq!(store.get("basket").unwrap(), before);
}

#[test]
fn quantity_changes_are_written_back() {
    let store = seeded(json!([
        {"id": "w", "segment": "wash", "casual": "c1", "weight": "≤ 8KG", "qty": 1},
    ]));
    let clock = ManualClock::new(NOW);
    let mut basket = BasketService::load(&store, &clock);
    let id = ItemId::from("w");

    assert_eq!(basket.increase_qty(&id).unwrap(), 2);
    assert_eq!(basket.increase_qty(&id).unwrap(), 3);
    assert_eq!(basket.decrease_qty(&id).unwrap(), 2);

    assert_eq!(stored_basket(&store)[0]["qty"], json!(2));
    assert_eq!(basket.total(), 280);
}

#[test]
fn remove_deletes_and_persists() {
    let store = seeded(json!([
        {"id": "w", "segment": "wash", "casual": "c1", "weight": "≤ 8KG", "qty": 1},
        {"id": "p", "segment": "press", "casual": "c2", "qty": 1},
    ]));
    let clock = ManualClock::new(NOW);
    let mut basket = BasketService::load(&store, &clock);

    let removed = basket.remove_item(&ItemId::from("w")).unwrap();
    assert_eq!(removed.segment, Segment::Wash);
    assert!(basket.group(Segment::Wash).is_none());

    let stored = stored_basket(&store);
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["id"], json!("p"));
}

#[test]
fn unknown_item_id_is_reported() {
    let store = MemoryStore::new();
    let clock = ManualClock::new(NOW);
    let mut basket = BasketService::load(&store, &clock);

    let err = basket.increase_qty(&ItemId::from("missing")).unwrap_err();
    assert!(matches!(err, BasketError::ItemNotFound(id) if id.as_str() == "missing"));
    assert!(store.get("basket").unwrap().is_none());
}

#[test]
fn write_back_groups_items_and_keeps_unrouted_entries_last() {
    let store = seeded(json!([
        {"id": "p", "segment": "press", "casual": "c1", "qty": 1},
        "not-an-item",
        {"id": "x", "segment": "fold", "casual": "c1", "qty": 1},
        {"id": "w", "segment": "wash", "casual": "c1", "weight": "≤ 8KG", "qty": 1},
    ]));
    let clock = ManualClock::new(NOW);
    let mut basket = BasketService::load(&store, &clock);
    assert_eq!(basket.items().len(), 2);
    assert_eq!(basket.unrouted().len(), 2);

    basket.increase_qty(&ItemId::from("p")).unwrap();

    let stored = stored_basket(&store);
    assert_eq!(stored.len(), 4);
    assert_eq!(stored[0]["id"], json!("w"));
    assert_eq!(stored[1]["id"], json!("p"));
    assert_eq!(stored[2], json!("not-an-item"));
    assert_eq!(stored[3]["segment"], json!("fold"));
}

#[test]
fn legacy_entries_are_backfilled_on_read() {
    let store = seeded(json!([
        {"casual": "c2", "weight": "≤ 8KG"},
        {"id": 17, "segment": "press", "casual": "c1", "weight": "› 8KG", "additionals": ["fold"], "qty": 0},
    ]));
    let clock = ManualClock::new(NOW);
    let basket = BasketService::load(&store, &clock);

    let wash = basket.group(Segment::Wash).unwrap();
    let legacy = wash.items[0];
    assert_eq!(legacy.qty, 1);
    assert!(legacy.selected);
    assert!(legacy.additionals.is_empty());
    assert_eq!(legacy.timestamp, NOW);
    assert!(!legacy.id.as_str().is_empty());

    let press = basket.item(&ItemId::from("17")).unwrap();
    assert_eq!(press.weight, None);
    assert!(press.additionals.is_empty());
    assert_eq!(press.qty, 1);
}

#[test]
fn non_list_basket_slot_reads_as_empty() {
    let store = seeded(json!({"broken": true}));
    let clock = ManualClock::new(NOW);
    let basket = BasketService::load(&store, &clock);

    assert!(basket.is_empty());
    assert!(basket.groups().is_empty());
}

#[test]
fn failed_writes_leave_the_view_matching_storage() {
    let store = FlakyStore::default();
    store
        .set(
            "basket",
            &json!([
                {"id": "w", "segment": "wash", "casual": "c1", "weight": "≤ 8KG", "qty": 2, "selected": true},
                {"id": "p", "segment": "press", "casual": "c2", "qty": 1, "selected": true},
            ]),
        )
        .unwrap();
    let clock = ManualClock::new(NOW);
    let mut basket = BasketService::load(&store, &clock);
    let w = ItemId::from("w");

    store.fail_writes_to("basket");
    assert!(basket.remove_item(&w).is_err());
    assert!(basket.increase_qty(&w).is_err());
    assert!(basket.decrease_qty(&w).is_err());
    assert!(basket.set_item_selected(&w, false).is_err());
    assert!(basket.set_group_checked(Segment::Press, false).is_err());
    assert!(basket.set_all_selected(false).is_err());

    assert_eq!(basket.items().len(), 2);
    assert_eq!(basket.item(&w).unwrap().qty, 2);
    assert!(basket.is_all_selected());
    assert_eq!(basket.total(), 140 * 2 + 140);

    store.heal();
    basket.remove_item(&w).unwrap();
    let reloaded = BasketService::load(&store, &clock);
    assert_eq!(reloaded.items(), basket.items());
}
