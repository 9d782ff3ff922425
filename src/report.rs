//! Text and JSON rendering for planner results.

use std::time::Duration;

use serde::Serialize;
use time::OffsetDateTime;

use crate::domain::{age_label, data_age, MarketSnapshot, PriceFreshness, TradePlan, TripQuery};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// What a `plan` run produced, ready to render.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub origin: String,
    pub stamina: u64,
    pub max_weight: u64,
    pub freshness: PriceFreshness,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prices_age_secs: Option<u64>,
    pub plans: Vec<TradePlan>,
}

impl PlanReport {
    pub fn new(
        query: &TripQuery,
        snapshot: &MarketSnapshot,
        plans: Vec<TradePlan>,
        now: OffsetDateTime,
    ) -> Self {
        let last_updated = snapshot.prices.last_updated_at();
        Self {
            origin: query.origin.clone(),
            stamina: query.stamina,
            max_weight: query.max_weight,
            freshness: PriceFreshness::classify(now, last_updated),
            prices_age_secs: last_updated.map(|at| data_age(now, at).as_secs()),
            plans,
        }
    }
}

pub fn render_plan_report(
    report: &PlanReport,
    snapshot: &MarketSnapshot,
    format: OutputFormat,
) -> Result<String, serde_json::Error> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(report),
        OutputFormat::Text => Ok(render_plan_text(report, snapshot)),
    }
}

fn render_plan_text(report: &PlanReport, snapshot: &MarketSnapshot) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "Trips from {} ({}) with stamina {} and capacity {}\n",
        snapshot.settlement_name(&report.origin),
        report.origin,
        report.stamina,
        report.max_weight
    ));

    if report.plans.is_empty() {
        out.push_str("  No profitable trade right now.\n");
    }

    for (rank, plan) in report.plans.iter().enumerate() {
        out.push_str(&format!(
            "  {}. Buy {} x {} ({}), sell in {} ({})\n",
            rank + 1,
            plan.quantity,
            snapshot.product_name(&plan.product_id),
            plan.product_id,
            snapshot.settlement_name(&plan.to_settlement_id),
            plan.to_settlement_id
        ));
        out.push_str(&format!(
            "     unit profit {}, total profit {}, distance {}, profit/stamina {:.2}\n",
            plan.unit_profit, plan.total_profit, plan.distance, plan.profit_per_stamina
        ));
    }

    match report.prices_age_secs {
        Some(secs) => out.push_str(&format!(
            "Prices: {} (updated {} ago)\n",
            report.freshness,
            age_label(Duration::from_secs(secs))
        )),
        None => out.push_str(&format!("Prices: {}\n", report.freshness)),
    }

    out
}

/// One line per settlement: buyables and outgoing connections.
pub fn render_settlements(snapshot: &MarketSnapshot) -> String {
    let mut ids: Vec<&String> = snapshot.settlements.keys().collect();
    ids.sort();

    let mut out = String::new();
    for id in ids {
        let Some(settlement) = snapshot.settlements.get(id) else {
            continue;
        };

        let buyables = settlement
            .buyable_product_ids
            .iter()
            .map(|product_id| snapshot.product_name(product_id))
            .collect::<Vec<_>>()
            .join(", ");
        let routes = snapshot
            .connections_from(id)
            .map(|connection| {
                format!(
                    "{} ({})",
                    snapshot.settlement_name(&connection.to),
                    connection.distance
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        out.push_str(&format!(
            "{id:<8} {:<16} buys: {:<32} routes: {}\n",
            settlement.name,
            or_dash(&buyables),
            or_dash(&routes)
        ));
    }
    out
}

fn or_dash(list: &str) -> &str {
    if list.is_empty() {
        "-"
    } else {
        list
    }
}
