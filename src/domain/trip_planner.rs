//! One-hop trade planning: buy at the origin, sell at a directly connected settlement.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::{debug, warn};

use super::entities::{Connection, MarketSnapshot, ProductId, TradePlan, TripQuery};

impl TradePlan {
    /// True if `self` strictly beats `other` under the planner's ranking.
    pub fn is_preferred_over(&self, other: &TradePlan) -> bool {
        compare_plans(self, other) == Ordering::Less
    }
}

/// Ranking used by both planner operations.
///
/// Sorts best-first: higher total profit, then higher profit per stamina,
/// then shorter distance. `Ordering::Less` means `a` ranks ahead of `b`.
pub fn compare_plans(a: &TradePlan, b: &TradePlan) -> Ordering {
    b.total_profit
        .cmp(&a.total_profit)
        .then_with(|| {
            b.profit_per_stamina
                .partial_cmp(&a.profit_per_stamina)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.distance.cmp(&b.distance))
}

/// Most profitable single trade reachable from `query.origin`, or `None`.
///
/// Returns `None` for an unknown origin, an origin without price data, or when
/// no product/destination pair yields a strictly positive margin.
pub fn compute_best_direct_trip(
    query: &TripQuery,
    snapshot: &MarketSnapshot,
) -> Option<TradePlan> {
    let mut best: Option<TradePlan> = None;

    for plan in candidate_plans(query, snapshot) {
        if best
            .as_ref()
            .map(|current| plan.is_preferred_over(current))
            .unwrap_or(true)
        {
            best = Some(plan);
        }
    }

    if let Some(plan) = &best {
        debug!(
            origin = %query.origin,
            product = %plan.product_id,
            destination = %plan.to_settlement_id,
            total_profit = plan.total_profit,
            "selected best direct trip"
        );
    }

    best
}

/// Best destination for each buyable product at the origin, ranked across products.
///
/// At most one plan per product. Empty when the origin is unknown or unpriced.
pub fn compute_top_plans_per_buyable(
    query: &TripQuery,
    snapshot: &MarketSnapshot,
) -> Vec<TradePlan> {
    let mut order: Vec<ProductId> = Vec::new();
    let mut best_by_product: HashMap<ProductId, TradePlan> = HashMap::new();

    for plan in candidate_plans(query, snapshot) {
        let replaces = best_by_product
            .get(&plan.product_id)
            .map(|previous| plan.is_preferred_over(previous));
        match replaces {
            Some(false) => {}
            Some(true) => {
                best_by_product.insert(plan.product_id.clone(), plan);
            }
            None => {
                order.push(plan.product_id.clone());
                best_by_product.insert(plan.product_id.clone(), plan);
            }
        }
    }

    let mut plans: Vec<TradePlan> = order
        .iter()
        .filter_map(|product_id| best_by_product.remove(product_id))
        .collect();
    plans.sort_by(compare_plans);
    plans
}

/// Every feasible (product, destination) plan from the origin, in discovery order.
fn candidate_plans(query: &TripQuery, snapshot: &MarketSnapshot) -> Vec<TradePlan> {
    let origin_id = query.origin.as_str();

    let Some(origin) = snapshot.settlements.get(origin_id) else {
        warn!(origin = %origin_id, "origin settlement not found");
        return Vec::new();
    };

    if !snapshot.prices.has_settlement(origin_id) {
        debug!(origin = %origin_id, "no price data for origin yet");
        return Vec::new();
    }

    // Zero-distance edges are malformed; they would also divide by zero below.
    let reachable: Vec<&Connection> = snapshot
        .connections_from(origin_id)
        .filter(|connection| {
            connection.distance > 0 && connection.distance <= query.stamina
        })
        .collect();

    let mut plans = Vec::new();

    for product_id in &origin.buyable_product_ids {
        let Some(product) = snapshot.products.get(product_id) else {
            continue;
        };
        if product.weight == 0 {
            continue;
        }
        // Absent buy price means "not purchasable now". Zero is a real price,
        // not a missing one.
        let Some(buy_price) = snapshot.prices.buy_price(origin_id, product_id) else {
            continue;
        };

        let quantity = query.max_weight / product.weight;
        if quantity == 0 {
            continue;
        }

        for connection in &reachable {
            let Some(sell_price) = snapshot.prices.sell_price(&connection.to, product_id) else {
                continue;
            };
            if sell_price <= buy_price {
                continue;
            }

            let unit_profit = sell_price - buy_price;
            let total_profit = unit_profit.saturating_mul(quantity);

            plans.push(TradePlan {
                product_id: product_id.clone(),
                from_settlement_id: origin.id.clone(),
                to_settlement_id: connection.to.clone(),
                quantity,
                unit_profit,
                total_profit,
                distance: connection.distance,
                profit_per_stamina: total_profit as f64 / connection.distance as f64,
            });
        }
    }

    debug!(
        origin = %origin_id,
        reachable = reachable.len(),
        candidates = plans.len(),
        "enumerated direct trips"
    );

    plans
}
