use pretty_assertions::assert_eq;
use tempfile::TempDir;

use trade_guide::domain::{compute_best_direct_trip, TripQuery};
use trade_guide::infra::{load_snapshot_file, save_snapshot_file, seed, SnapshotFileError};

#[test]
fn exported_demo_market_plans_the_same_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("exports").join("market.json");

    let rows = seed::demo_rows();
    save_snapshot_file(&path, &rows).unwrap();
    let loaded = load_snapshot_file(&path).unwrap();
    assert_eq!(loaded, rows);

    let query = TripQuery::new("c1", 25, 100);
    assert_eq!(
        compute_best_direct_trip(&query, &loaded.into_snapshot()),
        compute_best_direct_trip(&query, &rows.into_snapshot())
    );
}

#[test]
fn hand_written_snapshot_with_numeric_ids_loads() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("market.json");
    std::fs::write(
        &path,
        r#"{
            "cities": [
                { "id": 1, "name": "Harbor", "buyable_product_ids": ["10"] },
                { "id": 2, "name": "Mill" }
            ],
            "products": [{ "id": 10, "name": "Grain", "weight": 2 }],
            "edges": [{ "from_city_id": 1, "to_city_id": 2, "distance": 3 }],
            "prices": [
                { "city_id": 1, "product_id": 10, "buy_price": 4, "sell_price": null,
                  "updated_at": "2024-05-01T10:00:00Z" },
                { "city_id": 2, "product_id": 10, "buy_price": null, "sell_price": 7 }
            ]
        }"#,
    )
    .unwrap();

    let snapshot = load_snapshot_file(&path).unwrap().into_snapshot();
    let plan = compute_best_direct_trip(&TripQuery::new("1", 5, 9), &snapshot).unwrap();

    assert_eq!(plan.to_settlement_id, "2");
    assert_eq!(plan.quantity, 4);
    assert_eq!(plan.total_profit, 12);
    assert!(snapshot.prices.last_updated_at().is_some());
}

#[test]
fn missing_and_malformed_files_are_reported() {
    let temp_dir = TempDir::new().unwrap();

    let missing = load_snapshot_file(&temp_dir.path().join("absent.json"));
    assert!(matches!(missing, Err(SnapshotFileError::Io { .. })));

    let broken = temp_dir.path().join("broken.json");
    std::fs::write(&broken, "{ not json").unwrap();
    assert!(matches!(
        load_snapshot_file(&broken),
        Err(SnapshotFileError::Json { .. })
    ));
}
