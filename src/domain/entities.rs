use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Identifier for products in the catalog.
pub type ProductId = String;

/// Identifier for settlements ("cities") in the trade graph.
pub type SettlementId = String;

/// A tradable good.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Weight of one unit; divides the cargo capacity.
    pub weight: u64,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, weight: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            weight,
        }
    }
}

/// A node of the trade graph where goods are bought and sold.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub id: SettlementId,
    pub name: String,
    /// Products offered for purchase here, in display order.
    /// Normally exactly three; the planner tolerates any length.
    pub buyable_product_ids: Vec<ProductId>,
}

impl Settlement {
    pub fn new<I, P>(id: impl Into<SettlementId>, name: impl Into<String>, buyables: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<ProductId>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            buyable_product_ids: buyables.into_iter().map(Into::into).collect(),
        }
    }
}

/// Directed, weighted edge between two settlements. Distance doubles as stamina cost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub from: SettlementId,
    pub to: SettlementId,
    pub distance: u64,
}

impl Connection {
    pub fn new(from: impl Into<SettlementId>, to: impl Into<SettlementId>, distance: u64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            distance,
        }
    }
}

/// Buy/sell quote for one product in one settlement. `None` means "no data".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub buy_price: Option<u64>,
    pub sell_price: Option<u64>,
}

impl PriceQuote {
    pub fn new(buy_price: Option<u64>, sell_price: Option<u64>) -> Self {
        Self {
            buy_price,
            sell_price,
        }
    }

    pub fn sell_only(sell_price: u64) -> Self {
        Self::new(None, Some(sell_price))
    }
}

/// Settlement -> product -> quote lookup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PriceIndex {
    quotes: HashMap<SettlementId, HashMap<ProductId, PriceQuote>>,
    last_updated_at: Option<OffsetDateTime>,
}

impl PriceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a quote, creating the settlement entry on demand.
    pub fn insert(
        &mut self,
        settlement_id: impl Into<SettlementId>,
        product_id: impl Into<ProductId>,
        quote: PriceQuote,
    ) {
        self.quotes
            .entry(settlement_id.into())
            .or_default()
            .insert(product_id.into(), quote);
    }

    /// Records that a quote was updated at `at`; keeps the newest timestamp.
    pub fn observe_update(&mut self, at: OffsetDateTime) {
        if self.last_updated_at.map_or(true, |latest| at > latest) {
            self.last_updated_at = Some(at);
        }
    }

    /// Chainable insert, handy when building fixtures.
    pub fn with_quote(
        mut self,
        settlement_id: impl Into<SettlementId>,
        product_id: impl Into<ProductId>,
        quote: PriceQuote,
    ) -> Self {
        self.insert(settlement_id, product_id, quote);
        self
    }

    pub fn has_settlement(&self, settlement_id: &str) -> bool {
        self.quotes.contains_key(settlement_id)
    }

    pub fn quote(&self, settlement_id: &str, product_id: &str) -> Option<&PriceQuote> {
        self.quotes.get(settlement_id)?.get(product_id)
    }

    pub fn buy_price(&self, settlement_id: &str, product_id: &str) -> Option<u64> {
        self.quote(settlement_id, product_id)?.buy_price
    }

    pub fn sell_price(&self, settlement_id: &str, product_id: &str) -> Option<u64> {
        self.quote(settlement_id, product_id)?.sell_price
    }

    pub fn last_updated_at(&self) -> Option<OffsetDateTime> {
        self.last_updated_at
    }

    /// Number of settlements with at least one quote entry.
    pub fn settlement_count(&self) -> usize {
        self.quotes.len()
    }

    /// Total number of quotes across all settlements.
    pub fn quote_count(&self) -> usize {
        self.quotes.values().map(HashMap::len).sum()
    }
}

/// Everything the planner reads for one call. Never mutated by the planner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MarketSnapshot {
    pub settlements: HashMap<SettlementId, Settlement>,
    pub products: HashMap<ProductId, Product>,
    pub connections: Vec<Connection>,
    pub prices: PriceIndex,
}

impl MarketSnapshot {
    pub fn with_settlement(mut self, settlement: Settlement) -> Self {
        self.settlements.insert(settlement.id.clone(), settlement);
        self
    }

    pub fn with_product(mut self, product: Product) -> Self {
        self.products.insert(product.id.clone(), product);
        self
    }

    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connections.push(connection);
        self
    }

    pub fn with_prices(mut self, prices: PriceIndex) -> Self {
        self.prices = prices;
        self
    }

    /// Outgoing connections of a settlement, in snapshot order.
    pub fn connections_from<'a>(
        &'a self,
        settlement_id: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections
            .iter()
            .filter(move |connection| connection.from == settlement_id)
    }

    /// Display name for a settlement, falling back to its id.
    pub fn settlement_name<'a>(&'a self, settlement_id: &'a str) -> &'a str {
        self.settlements
            .get(settlement_id)
            .map(|settlement| settlement.name.as_str())
            .unwrap_or(settlement_id)
    }

    /// Display name for a product, falling back to its id.
    pub fn product_name<'a>(&'a self, product_id: &'a str) -> &'a str {
        self.products
            .get(product_id)
            .map(|product| product.name.as_str())
            .unwrap_or(product_id)
    }
}

/// A player's position and budgets for one planning call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripQuery {
    pub origin: SettlementId,
    pub stamina: u64,
    pub max_weight: u64,
}

impl TripQuery {
    pub fn new(origin: impl Into<SettlementId>, stamina: u64, max_weight: u64) -> Self {
        Self {
            origin: origin.into(),
            stamina,
            max_weight,
        }
    }
}

/// A concrete buy-here, sell-there trade.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradePlan {
    pub product_id: ProductId,
    #[serde(rename = "fromCityId")]
    pub from_settlement_id: SettlementId,
    #[serde(rename = "toCityId")]
    pub to_settlement_id: SettlementId,
    pub quantity: u64,
    pub unit_profit: u64,
    pub total_profit: u64,
    pub distance: u64,
    pub profit_per_stamina: f64,
}
