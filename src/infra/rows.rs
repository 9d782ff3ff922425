//! Table rows as stored by the remote data service and in snapshot files.
//!
//! Rows are deliberately loose (signed numbers, optional lists, ids that may be
//! numeric) and get cleaned up once, in [`SnapshotRows::into_snapshot`].

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{debug, warn};

use crate::domain::{
    check_buyable_set, is_valid_buy_sell, Connection, MarketSnapshot, PriceIndex, PriceQuote,
    Product, Settlement, BUYABLE_PRODUCTS_COUNT,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CityRow {
    #[serde(deserialize_with = "string_from_json")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub buyable_product_ids: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    #[serde(deserialize_with = "string_from_json")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub weight: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRow {
    #[serde(deserialize_with = "string_from_json")]
    pub from_city_id: String,
    #[serde(deserialize_with = "string_from_json")]
    pub to_city_id: String,
    #[serde(default)]
    pub distance: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    #[serde(deserialize_with = "string_from_json")]
    pub city_id: String,
    #[serde(deserialize_with = "string_from_json")]
    pub product_id: String,
    #[serde(default)]
    pub buy_price: Option<i64>,
    #[serde(default)]
    pub sell_price: Option<i64>,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// The four tables the planner needs, as fetched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRows {
    #[serde(default)]
    pub cities: Vec<CityRow>,
    #[serde(default)]
    pub products: Vec<ProductRow>,
    #[serde(default)]
    pub edges: Vec<EdgeRow>,
    #[serde(default)]
    pub prices: Vec<PriceRow>,
}

impl SnapshotRows {
    /// Builds the planner's snapshot. Bad rows are dropped or degraded to "no data".
    pub fn into_snapshot(self) -> MarketSnapshot {
        let mut snapshot = MarketSnapshot::default();

        for row in self.cities {
            snapshot = snapshot.with_settlement(Settlement::from(row));
        }

        for row in self.products {
            match row.weight.and_then(positive) {
                Some(weight) => {
                    snapshot = snapshot.with_product(Product::new(row.id, row.name, weight));
                }
                None => warn!(
                    product = %row.id,
                    weight = ?row.weight,
                    "dropping product without a usable weight"
                ),
            }
        }

        for row in self.edges {
            match row.distance.and_then(positive) {
                Some(distance) => {
                    let connection = Connection::new(row.from_city_id, row.to_city_id, distance);
                    snapshot = snapshot.with_connection(connection);
                }
                None => warn!(
                    from = %row.from_city_id,
                    to = %row.to_city_id,
                    distance = ?row.distance,
                    "dropping connection without a usable distance"
                ),
            }
        }

        let mut prices = PriceIndex::new();
        for row in self.prices {
            if let Some(updated_at) = row.updated_at.as_deref().and_then(parse_timestamp) {
                prices.observe_update(updated_at);
            }
            let buy = row.buy_price.and_then(non_negative);
            let sell = row.sell_price.and_then(non_negative);
            if !is_valid_buy_sell(buy, sell) {
                warn!(
                    city = %row.city_id,
                    product = %row.product_id,
                    "dropping out-of-range price"
                );
                continue;
            }
            prices.insert(row.city_id, row.product_id, PriceQuote::new(buy, sell));
        }

        debug!(
            settlements = snapshot.settlements.len(),
            products = snapshot.products.len(),
            connections = snapshot.connections.len(),
            priced_settlements = prices.settlement_count(),
            quotes = prices.quote_count(),
            "built market snapshot"
        );
        snapshot.with_prices(prices)
    }
}

impl From<CityRow> for Settlement {
    fn from(row: CityRow) -> Self {
        let mut buyables = row.buyable_product_ids.unwrap_or_default();
        if let Err(err) = check_buyable_set(&buyables) {
            warn!(city = %row.id, "irregular buyable set: {err}");
        }
        buyables.truncate(BUYABLE_PRODUCTS_COUNT);

        Settlement::new(row.id, row.name, buyables)
    }
}

fn positive(value: i64) -> Option<u64> {
    u64::try_from(value).ok().filter(|v| *v > 0)
}

fn non_negative(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

/// RFC 3339 timestamp as written by the data service; `None` if unparseable.
pub fn parse_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339).ok()
}

fn string_from_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> serde::de::Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or integer id")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}
