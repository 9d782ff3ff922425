//! Trade planning domain: market snapshot types and the one-hop planner.

pub mod entities;
pub mod freshness;
pub mod trip_planner;
pub mod validators;

pub use entities::{
    Connection, MarketSnapshot, PriceIndex, PriceQuote, Product, ProductId, Settlement,
    SettlementId, TradePlan, TripQuery,
};
pub use freshness::{age_label, data_age, PriceFreshness};
pub use trip_planner::{compare_plans, compute_best_direct_trip, compute_top_plans_per_buyable};
pub use validators::{
    check_buyable_set, is_valid_buy_sell, parse_price, validate_pin_format, ValidationError,
    BUYABLE_PRODUCTS_COUNT, MAX_PRICE_VALUE,
};
