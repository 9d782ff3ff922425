//! Small built-in market used when no data source is configured.

use super::rows::{CityRow, EdgeRow, PriceRow, ProductRow, SnapshotRows};

pub fn demo_rows() -> SnapshotRows {
    let city = |id: &str, name: &str| CityRow {
        id: id.into(),
        name: name.into(),
        buyable_product_ids: Some(vec!["p1".into(), "p2".into(), "p3".into()]),
    };
    let product = |id: &str, name: &str, weight: i64| ProductRow {
        id: id.into(),
        name: name.into(),
        weight: Some(weight),
    };
    let edge = |from: &str, to: &str, distance: i64| EdgeRow {
        from_city_id: from.into(),
        to_city_id: to.into(),
        distance: Some(distance),
    };
    let price = |city: &str, product: &str, buy: i64, sell: i64| PriceRow {
        city_id: city.into(),
        product_id: product.into(),
        buy_price: Some(buy),
        sell_price: Some(sell),
        updated_at: None,
    };

    SnapshotRows {
        cities: vec![
            city("c1", "Chang'an"),
            city("c2", "Luoyang"),
            city("c3", "Jiankang"),
        ],
        products: vec![
            product("p1", "Silk", 10),
            product("p2", "Porcelain", 20),
            product("p3", "Tea", 5),
        ],
        edges: vec![edge("c1", "c2", 10), edge("c1", "c3", 20)],
        prices: vec![
            price("c1", "p1", 100, 90),
            price("c1", "p2", 500, 450),
            price("c1", "p3", 50, 40),
            price("c2", "p1", 110, 120),
            price("c2", "p2", 520, 580),
            price("c2", "p3", 55, 60),
            price("c3", "p1", 105, 115),
            price("c3", "p2", 510, 600),
            price("c3", "p3", 60, 70),
        ],
    }
}
