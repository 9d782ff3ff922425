use std::{path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use trade_guide::{
    app::{plan_once, resolve_query, watch_interval, AppError, DataSource, SourceOverrides},
    config::load_config,
    domain::TripQuery,
    infra::save_snapshot_file,
    report::{render_plan_report, render_settlements, OutputFormat},
};

#[derive(Debug, Parser)]
#[command(
    name = "trade-guide",
    version,
    about = "Finds the most profitable one-hop trade from your current city."
)]
struct Cli {
    /// Config file (default: platform config dir / config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Read market data from a JSON snapshot instead of the hosted database.
    #[arg(long, global = true)]
    snapshot: Option<PathBuf>,

    /// Project URL of the hosted market database.
    #[arg(long, global = true, env = "SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Public (anon) key of the hosted market database.
    #[arg(long, global = true, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    supabase_key: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plan the best trade from an origin city.
    Plan(PlanArgs),
    /// List cities, what they sell, and where they connect to.
    Cities,
    /// Write the loaded market data to a JSON snapshot file.
    Export(ExportArgs),
}

#[derive(Debug, Parser)]
struct PlanArgs {
    /// Origin city id.
    #[arg(long)]
    origin: Option<String>,

    /// Stamina available for travel.
    #[arg(long)]
    stamina: Option<u64>,

    /// Cargo capacity in weight units.
    #[arg(long)]
    max_weight: Option<u64>,

    /// Show the best destination for each buyable product instead of one winner.
    #[arg(long, default_value_t = false)]
    top: bool,

    /// Output format.
    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Re-fetch prices and re-plan every N seconds until interrupted.
    #[arg(long, value_name = "SECS")]
    watch: Option<u64>,
}

#[derive(Debug, Parser)]
struct ExportArgs {
    /// Destination file.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            error!("failed to start async runtime: {err}");
            return ExitCode::from(1);
        }
    };

    match runtime.block_on(real_main(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::from(1)
        }
    }
}

async fn real_main(cli: Cli) -> Result<(), AppError> {
    let config = load_config(cli.config.as_deref())?;
    let overrides = SourceOverrides {
        snapshot: cli.snapshot,
        supabase_url: cli.supabase_url,
        supabase_key: cli.supabase_key,
    };
    let source = DataSource::resolve(overrides, &config)?;
    debug!("reading market data from {}", source.describe());

    match cli.cmd {
        Command::Plan(args) => {
            let query = resolve_query(args.origin, args.stamina, args.max_weight, &config)?;
            match args.watch {
                Some(secs) => cmd_watch(&source, &query, args.top, args.format, secs).await,
                None => cmd_plan(&source, &query, args.top, args.format).await,
            }
        }
        Command::Cities => {
            let market = source.load().await?;
            print!("{}", render_settlements(&market.snapshot));
            Ok(())
        }
        Command::Export(args) => {
            let market = source.load().await?;
            save_snapshot_file(&args.out, &market.rows)?;
            info!("exported {} to {}", source.describe(), args.out.display());
            Ok(())
        }
    }
}

async fn cmd_plan(
    source: &DataSource,
    query: &TripQuery,
    top: bool,
    format: OutputFormat,
) -> Result<(), AppError> {
    let market = source.load().await?;
    let report = plan_once(query, &market.snapshot, top);
    print!("{}", render_plan_report(&report, &market.snapshot, format)?);
    Ok(())
}

async fn cmd_watch(
    source: &DataSource,
    query: &TripQuery,
    top: bool,
    format: OutputFormat,
    secs: u64,
) -> Result<(), AppError> {
    let mut ticker = tokio::time::interval(watch_interval(secs));

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = tokio::signal::ctrl_c() => {
                info!("stopping watch");
                return Ok(());
            }
        }

        match source.load().await {
            Ok(market) => {
                let report = plan_once(query, &market.snapshot, top);
                println!("{}", render_plan_report(&report, &market.snapshot, format)?);
            }
            Err(err) => error!("refresh failed: {err}"),
        }
    }
}
