//! Property-based tests for the one-hop planner over random small markets.
//!
//! These tests verify that:
//! - Every returned plan is feasible under the query's stamina and capacity
//! - No feasible candidate ranks ahead of the chosen best trip
//! - Per-product listings hold one best plan per product, sorted best-first

use std::cmp::Ordering;

use proptest::prelude::*;
use trade_guide::domain::{
    compare_plans, compute_best_direct_trip, compute_top_plans_per_buyable, Connection,
    MarketSnapshot, PriceIndex, PriceQuote, Product, Settlement, TradePlan, TripQuery,
};

const SETTLEMENTS: usize = 5;
const PRODUCTS: usize = 4;

fn settlement_id(index: usize) -> String {
    format!("s{index}")
}

fn product_id(index: usize) -> String {
    format!("p{index}")
}

/// Strategy for a market whose origin is always `s0`.
fn arb_market() -> impl Strategy<Value = MarketSnapshot> {
    let weights = prop::collection::vec(1u64..30, PRODUCTS);
    let buyables = prop::collection::vec(0..PRODUCTS, 0..=3);
    let edges = prop::collection::vec((0..SETTLEMENTS, 0..SETTLEMENTS, 0u64..40), 0..10);
    let quotes = prop::collection::vec(
        (
            0..SETTLEMENTS,
            0..PRODUCTS,
            prop::option::of(0u64..200),
            prop::option::of(0u64..200),
        ),
        0..30,
    );

    (weights, buyables, edges, quotes).prop_map(|(weights, buyables, edges, quotes)| {
        let mut snapshot = MarketSnapshot::default();
        for index in 0..SETTLEMENTS {
            let listed: Vec<String> = if index == 0 {
                buyables.iter().map(|p| product_id(*p)).collect()
            } else {
                Vec::new()
            };
            snapshot = snapshot.with_settlement(Settlement::new(
                settlement_id(index),
                format!("Settlement {index}"),
                listed,
            ));
        }
        for (index, weight) in weights.into_iter().enumerate() {
            snapshot = snapshot.with_product(Product::new(
                product_id(index),
                format!("Product {index}"),
                weight,
            ));
        }
        for (from, to, distance) in edges {
            snapshot = snapshot.with_connection(Connection::new(
                settlement_id(from),
                settlement_id(to),
                distance,
            ));
        }

        let mut prices = PriceIndex::new();
        for (settlement, product, buy, sell) in quotes {
            prices.insert(
                settlement_id(settlement),
                product_id(product),
                PriceQuote::new(buy, sell),
            );
        }
        snapshot.with_prices(prices)
    })
}

fn arb_query() -> impl Strategy<Value = TripQuery> {
    (0u64..50, 0u64..100).prop_map(|(stamina, weight)| TripQuery::new("s0", stamina, weight))
}

/// Straightforward enumeration of every feasible plan, used as the oracle.
fn all_candidates(query: &TripQuery, snapshot: &MarketSnapshot) -> Vec<TradePlan> {
    let mut plans = Vec::new();
    let Some(origin) = snapshot.settlements.get(&query.origin) else {
        return plans;
    };

    for product_id in &origin.buyable_product_ids {
        let Some(product) = snapshot.products.get(product_id) else {
            continue;
        };
        let Some(buy) = snapshot.prices.buy_price(&query.origin, product_id) else {
            continue;
        };
        let quantity = query.max_weight / product.weight;

        for connection in &snapshot.connections {
            if connection.from != query.origin
                || connection.distance == 0
                || connection.distance > query.stamina
            {
                continue;
            }
            let Some(sell) = snapshot.prices.sell_price(&connection.to, product_id) else {
                continue;
            };
            if quantity == 0 || sell <= buy {
                continue;
            }
            let total_profit = (sell - buy) * quantity;
            plans.push(TradePlan {
                product_id: product_id.clone(),
                from_settlement_id: query.origin.clone(),
                to_settlement_id: connection.to.clone(),
                quantity,
                unit_profit: sell - buy,
                total_profit,
                distance: connection.distance,
                profit_per_stamina: total_profit as f64 / connection.distance as f64,
            });
        }
    }
    plans
}

fn assert_feasible(plan: &TradePlan, query: &TripQuery, snapshot: &MarketSnapshot) {
    let product = &snapshot.products[&plan.product_id];
    assert!(plan.total_profit > 0);
    assert!(plan.distance > 0 && plan.distance <= query.stamina);
    assert!(plan.quantity * product.weight <= query.max_weight);
    assert_eq!(plan.total_profit, plan.unit_profit * plan.quantity);
    assert!(snapshot.settlements[&query.origin]
        .buyable_product_ids
        .contains(&plan.product_id));
    assert!(snapshot.connections.iter().any(|connection| {
        connection.from == query.origin
            && connection.to == plan.to_settlement_id
            && connection.distance == plan.distance
    }));
}

fn distinct_products(plans: &[TradePlan]) -> Vec<&str> {
    let mut products: Vec<&str> = plans.iter().map(|plan| plan.product_id.as_str()).collect();
    products.sort_unstable();
    products.dedup();
    products
}

proptest! {
    /// The best trip exists exactly when some feasible candidate exists, and nothing beats it.
    #[test]
    fn best_trip_is_feasible_and_unbeaten(snapshot in arb_market(), query in arb_query()) {
        let candidates = all_candidates(&query, &snapshot);
        let best = compute_best_direct_trip(&query, &snapshot);

        prop_assert_eq!(best.is_some(), !candidates.is_empty());
        if let Some(best) = best {
            assert_feasible(&best, &query, &snapshot);
            for candidate in &candidates {
                prop_assert!(!candidate.is_preferred_over(&best));
            }
        }
    }

    /// One plan per product, each the best for its product, listed best-first.
    #[test]
    fn top_plans_are_per_product_and_sorted(snapshot in arb_market(), query in arb_query()) {
        let candidates = all_candidates(&query, &snapshot);
        let plans = compute_top_plans_per_buyable(&query, &snapshot);

        let products = distinct_products(&plans);
        prop_assert_eq!(products.len(), plans.len());

        for pair in plans.windows(2) {
            prop_assert_ne!(compare_plans(&pair[0], &pair[1]), Ordering::Greater);
        }

        for plan in &plans {
            assert_feasible(plan, &query, &snapshot);
            for candidate in &candidates {
                if candidate.product_id == plan.product_id {
                    prop_assert!(!candidate.is_preferred_over(plan));
                }
            }
        }

        prop_assert_eq!(products, distinct_products(&candidates));
    }

    /// Same inputs, same answers.
    #[test]
    fn planning_is_deterministic(snapshot in arb_market(), query in arb_query()) {
        prop_assert_eq!(
            compute_best_direct_trip(&query, &snapshot),
            compute_best_direct_trip(&query, &snapshot.clone())
        );
        prop_assert_eq!(
            compute_top_plans_per_buyable(&query, &snapshot),
            compute_top_plans_per_buyable(&query, &snapshot)
        );
    }
}
