//! Browses a small collection the way a grid view would.
//!
//! Run with: `cargo run -p docgrid-lib --example browse`

use std::error::Error;

use chrono::Utc;
use docgrid_lib::ModelConfig;
use docgrid_lib::model::Document;
use docgrid_lib::notify::{EventLog, ModelEvent};
use docgrid_lib::proxy::{SortFilterProxy, SortOrder};
use docgrid_lib::query::Filter;
use docgrid_lib::store::InMemoryStore;
use docgrid_lib::table::{Orientation, PresentationMode, TableModel};
use simplelog::{Config, LevelFilter, SimpleLogger};
use uuid::Uuid;

fn seed(store: &InMemoryStore) {
    let cities = ["Oslo", "Lima", "Pune", "Kyiv"];
    for (i, city) in cities.iter().enumerate() {
        let mut doc = Document::new()
            .set("_id", i as i32 + 1)
            .set("ref", Uuid::new_v4())
            .set("created", Utc::now())
            .set("address", Document::new().set("city", *city).set("zip", format!("{:05}", i * 1111)));
        if i % 2 == 0 {
            doc.insert("tags", vec!["even"]);
        }
        store.insert("places", doc);
    }
}

fn print_grid(proxy: &mut SortFilterProxy) {
    // Touch every row first so the header is complete before printing it.
    // A vanished row shrinks the count while we go.
    let mut row = 0;
    while row < proxy.row_count() {
        proxy.cell(row, 0, PresentationMode::Display);
        row += 1;
    }
    let rows = proxy.row_count();

    let header: Vec<String> = proxy.columns().to_vec();
    println!("    | {}", header.join(" | "));
    for row in 0..rows {
        let label = proxy
            .header_data(row, Orientation::Vertical)
            .map(|h| h.to_string())
            .unwrap_or_default();
        let cells: Vec<String> = (0..header.len())
            .map(|column| {
                proxy
                    .cell(row, column, PresentationMode::Display)
                    .map(|c| c.into_string())
                    .unwrap_or_default()
            })
            .collect();
        println!("{:>3} | {}", label, cells.join(" | "));
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    SimpleLogger::init(LevelFilter::Debug, Config::default())?;

    let store = InMemoryStore::new();
    seed(&store);

    let config = ModelConfig::from_json(r#"{ "max_nesting": 1, "cache_capacity": 16 }"#)?;
    let events = EventLog::new();
    let mut model = TableModel::new(config)?;
    model.add_observer(Box::new(events.clone()));
    model.submit_query(&store, "places", &Filter::all())?;

    let mut proxy = SortFilterProxy::new(model);
    proxy.sort_by_key("address.city", SortOrder::Ascending);
    print_grid(&mut proxy);

    if let Some(detail) = proxy.value_of(0, "address.city", PresentationMode::Detail) {
        println!("\nfirst city in detail mode: {}", detail.into_string());
    }

    // Every row is cached by now, so the deletion stays invisible: cached
    // rows keep serving the documents they were fetched with. Dropping the
    // cache makes the next read of the shifted tail row miss in the store,
    // which is what triggers the lazy reconciliation.
    store.delete_where("places", &Filter::eq("_id", 2));
    println!(
        "\ndeleted _id 2; model still reports {} rows from cache",
        proxy.source().row_count()
    );
    proxy.source_mut().invalidate_cache();
    println!("after dropping the cache and reading again:");
    print_grid(&mut proxy);

    let removed = events
        .take()
        .into_iter()
        .filter(|e| matches!(e, ModelEvent::BeginRemoveRows { .. }))
        .count();
    println!("\n{} remove notification(s), cache {:?}", removed, proxy.source().cache_stats());
    Ok(())
}
