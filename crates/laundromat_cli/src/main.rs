//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `laundromat_core` linkage.
//! - Optionally summarize the basket and orders stored in a SQLite file.
//!
//! Usage: `laundromat_cli [db_path]`

use laundromat_core::db::open_db;
use laundromat_core::{BasketService, OrderService, OrderStatus, SqliteKvStore, SystemClock};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("laundromat_core ping={}", laundromat_core::ping());
    println!("laundromat_core version={}", laundromat_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    match summarize(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("summary failed for `{db_path}`: {err}");
            ExitCode::FAILURE
        }
    }
}

fn summarize(db_path: &str) -> Result<(), laundromat_core::db::DbError> {
    let conn = open_db(db_path)?;
    let store = SqliteKvStore::new(&conn);

    let basket = BasketService::load(&store, SystemClock);
    println!(
        "basket items={} selected={} total={} unrouted={}",
        basket.items().len(),
        basket.selected_count(),
        basket.total(),
        basket.unrouted().len()
    );
    for group in basket.groups() {
        println!(
            "  {} items={} checked={}",
            group.label(),
            group.items.len(),
            group.checked
        );
    }

    // Loading re-derives statuses, so the file is updated when orders aged.
    let orders = OrderService::load(&store, SystemClock);
    println!("orders total={}", orders.orders().len());
    for status in OrderStatus::ALL {
        let count = orders
            .orders()
            .iter()
            .filter(|order| order.status == status)
            .count();
        println!("  {}={count}", status.as_str());
    }
    Ok(())
}
