use std::{path::PathBuf, time::Duration};

use thiserror::Error;
use time::OffsetDateTime;
use tracing::{info, warn};

use crate::{
    config::{AppConfig, ConfigError},
    domain::{compute_best_direct_trip, compute_top_plans_per_buyable, MarketSnapshot, TripQuery},
    infra::{
        load_snapshot_file, seed, supabase::DEFAULT_TTL, CacheStatus, SnapshotFileError,
        SnapshotRows, SupabaseClient, SupabaseError,
    },
    report::PlanReport,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Supabase(#[from] SupabaseError),
    #[error(transparent)]
    SnapshotFile(#[from] SnapshotFileError),
    #[error("failed to encode output: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("missing {0}; pass it on the command line or set it in the config file")]
    MissingArgument(&'static str),
}

/// Data-source overrides from the command line / environment.
#[derive(Clone, Debug, Default)]
pub struct SourceOverrides {
    pub snapshot: Option<PathBuf>,
    pub supabase_url: Option<String>,
    pub supabase_key: Option<String>,
}

/// Where this run reads market data from.
#[derive(Clone)]
pub enum DataSource {
    File(PathBuf),
    Remote(SupabaseClient),
    Demo,
}

impl DataSource {
    /// Snapshot file first, then the hosted database, then the demo seed.
    pub fn resolve(overrides: SourceOverrides, config: &AppConfig) -> Result<Self, AppError> {
        if let Some(path) = overrides.snapshot.or_else(|| config.snapshot_path.clone()) {
            return Ok(Self::File(path));
        }

        let url = overrides
            .supabase_url
            .or_else(|| config.supabase_url.clone());
        let key = overrides
            .supabase_key
            .or_else(|| config.supabase_anon_key.clone());

        match (url, key) {
            (Some(url), Some(key)) => {
                let ttl = config.cache_ttl().unwrap_or(DEFAULT_TTL);
                Ok(Self::Remote(SupabaseClient::new(&url, &key)?.with_ttl(ttl)))
            }
            (Some(_), None) | (None, Some(_)) => Err(SupabaseError::MissingCredentials.into()),
            (None, None) => {
                warn!("no market data source configured; using the built-in demo market");
                Ok(Self::Demo)
            }
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => format!("snapshot file {}", path.display()),
            Self::Remote(client) => format!("hosted market at {}", client.rest_url()),
            Self::Demo => "demo market".to_string(),
        }
    }

    pub async fn load(&self) -> Result<LoadedMarket, AppError> {
        let (rows, status) = match self {
            Self::File(path) => (load_snapshot_file(path)?, CacheStatus::Fresh),
            Self::Remote(client) => {
                let payload = client.fetch_rows().await?;
                (payload.data, payload.status)
            }
            Self::Demo => (seed::demo_rows(), CacheStatus::Fresh),
        };

        if status == CacheStatus::Stale {
            warn!("market data could not be refreshed; showing the last good snapshot");
        }

        Ok(LoadedMarket {
            snapshot: rows.clone().into_snapshot(),
            rows,
            status,
        })
    }
}

/// A snapshot together with the rows it came from.
#[derive(Clone, Debug)]
pub struct LoadedMarket {
    pub rows: SnapshotRows,
    pub snapshot: MarketSnapshot,
    pub status: CacheStatus,
}

/// Fills unset `plan` arguments from the config defaults.
pub fn resolve_query(
    origin: Option<String>,
    stamina: Option<u64>,
    max_weight: Option<u64>,
    config: &AppConfig,
) -> Result<TripQuery, AppError> {
    let defaults = &config.defaults;
    let origin = origin
        .or_else(|| defaults.origin.clone())
        .ok_or(AppError::MissingArgument("origin"))?;
    let stamina = stamina
        .or(defaults.stamina)
        .ok_or(AppError::MissingArgument("stamina"))?;
    let max_weight = max_weight
        .or(defaults.max_weight)
        .ok_or(AppError::MissingArgument("max weight"))?;

    Ok(TripQuery::new(origin, stamina, max_weight))
}

/// Runs the planner once. `top` selects the per-product listing.
pub fn plan_once(query: &TripQuery, snapshot: &MarketSnapshot, top: bool) -> PlanReport {
    let plans = if top {
        compute_top_plans_per_buyable(query, snapshot)
    } else {
        compute_best_direct_trip(query, snapshot)
            .into_iter()
            .collect()
    };

    info!(
        origin = %query.origin,
        stamina = query.stamina,
        max_weight = query.max_weight,
        plans = plans.len(),
        "planned trips"
    );

    let now = OffsetDateTime::now_utc();
    PlanReport::new(query, snapshot, plans, now)
}

/// Interval for `--watch`; never shorter than one second.
pub fn watch_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanDefaults;

    #[test]
    fn demo_is_the_last_resort() {
        let source =
            DataSource::resolve(SourceOverrides::default(), &AppConfig::default()).unwrap();
        assert!(matches!(source, DataSource::Demo));
    }

    #[test]
    fn snapshot_file_wins_over_remote() {
        let overrides = SourceOverrides {
            snapshot: Some(PathBuf::from("market.json")),
            supabase_url: Some("https://x.supabase.co".into()),
            supabase_key: Some("anon".into()),
        };
        let source = DataSource::resolve(overrides, &AppConfig::default()).unwrap();
        match source {
            DataSource::File(path) => assert_eq!(path, PathBuf::from("market.json")),
            _ => panic!("expected a snapshot file source"),
        }
    }

    #[test]
    fn half_configured_remote_is_an_error() {
        let config = AppConfig {
            supabase_url: Some("https://x.supabase.co".into()),
            ..AppConfig::default()
        };
        let result = DataSource::resolve(SourceOverrides::default(), &config);
        assert!(matches!(
            result,
            Err(AppError::Supabase(SupabaseError::MissingCredentials))
        ));
    }

    #[test]
    fn query_falls_back_to_config_defaults() {
        let config = AppConfig {
            defaults: PlanDefaults {
                origin: Some("c1".into()),
                stamina: Some(30),
                max_weight: Some(80),
            },
            ..AppConfig::default()
        };

        let query = resolve_query(None, Some(12), None, &config).unwrap();
        assert_eq!(query, TripQuery::new("c1", 12, 80));

        let missing = resolve_query(None, None, None, &AppConfig::default());
        assert!(matches!(missing, Err(AppError::MissingArgument("origin"))));
    }

    #[tokio::test]
    async fn demo_source_plans_a_trip() {
        let market = DataSource::Demo.load().await.unwrap();
        let report = plan_once(&TripQuery::new("c1", 25, 100), &market.snapshot, false);

        assert_eq!(market.status, CacheStatus::Fresh);
        assert_eq!(report.plans.len(), 1);
        assert_eq!(report.plans[0].total_profit, 500);
    }
}
