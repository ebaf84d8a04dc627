//! druid-query CLI
//!
//! Builds Druid query documents from the command line and prints them:
//! - Timeseries, topN and groupBy queries from flags
//! - Re-rendering of an existing JSON document
//! - Default config file generation
//!
//! Nothing is sent to the store; pipe the output to your HTTP client.

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use druid_query::config::{generate_default_config, Config};
use druid_query::query::{
    Aggregation, AggregationQuery, AggregatorType, Filter, Granularity, TimeInterval,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "druid-query")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build Druid aggregation query documents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Indent the rendered document
    #[arg(long, global = true)]
    pub pretty: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a timeseries query
    Timeseries {
        #[command(flatten)]
        common: QueryArgs,
        /// Sort buckets newest first
        #[arg(long)]
        descending: bool,
    },

    /// Build a topN query
    Topn {
        #[command(flatten)]
        common: QueryArgs,
        /// Dimension to rank
        #[arg(long)]
        dimension: String,
        /// Metric to rank by
        #[arg(long)]
        metric: String,
        /// Number of values to return
        #[arg(long, default_value = "10")]
        threshold: u32,
    },

    /// Build a groupBy query
    Groupby {
        #[command(flatten)]
        common: QueryArgs,
        /// Dimensions to group by (comma-separated)
        #[arg(long, value_delimiter = ',')]
        dimensions: Vec<String>,
    },

    /// Re-render a JSON query document in canonical form
    Render {
        /// Path to the JSON document
        path: PathBuf,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Flags shared by the query-building commands
#[derive(Args)]
pub struct QueryArgs {
    /// Data source to query
    #[arg(short, long)]
    data_source: Option<String>,
    /// Granularity (all, none, minute, fifteen_minute, thirty_minute, hour, day, or custom)
    #[arg(short, long)]
    granularity: Option<String>,
    /// Raw interval "start/end" (repeatable)
    #[arg(short, long)]
    interval: Vec<String>,
    /// Interval covering the last N hours
    #[arg(long)]
    last_hours: Option<i64>,
    /// Add a count aggregator with this output name
    #[arg(long)]
    count: Vec<String>,
    /// Aggregator as TYPE:NAME:FIELD, e.g. longSum:added:delta (repeatable)
    #[arg(short, long)]
    agg: Vec<String>,
    /// Selector filter as DIM=VALUE; several are combined with "and"
    #[arg(short, long)]
    selector: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    init_logging(&config);

    let pretty = cli.pretty || config.output.pretty;

    match cli.command {
        Commands::Timeseries { common, descending } => {
            let data_source = resolve_data_source(&common, &config)?;
            let granularity = resolve_granularity(&common, &config);
            let mut query = AggregationQuery::timeseries(data_source, descending, granularity);
            apply_common(&mut query, &common)?;
            print_query(&query, pretty)?;
        }

        Commands::Topn {
            common,
            dimension,
            metric,
            threshold,
        } => {
            let data_source = resolve_data_source(&common, &config)?;
            let granularity = resolve_granularity(&common, &config);
            let mut query =
                AggregationQuery::top_n(data_source, dimension, metric, threshold, granularity);
            apply_common(&mut query, &common)?;
            print_query(&query, pretty)?;
        }

        Commands::Groupby { common, dimensions } => {
            let data_source = resolve_data_source(&common, &config)?;
            let granularity = resolve_granularity(&common, &config);
            let mut query = AggregationQuery::group_by(data_source, dimensions, granularity);
            apply_common(&mut query, &common)?;
            print_query(&query, pretty)?;
        }

        Commands::Render { path } => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read {:?}", path))?;
            let query = AggregationQuery::from_json(&content)?;
            print_query(&query, pretty)?;
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)
                        .with_context(|| format!("failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("druid_query={}", config.logging.level)));

    // Logs go to stderr so stdout carries only the document
    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn resolve_data_source(args: &QueryArgs, config: &Config) -> anyhow::Result<String> {
    args.data_source
        .clone()
        .or_else(|| config.output.default_data_source.clone())
        .ok_or_else(|| anyhow!("no data source given (use --data-source or set default_data_source)"))
}

fn resolve_granularity(args: &QueryArgs, config: &Config) -> Granularity {
    args.granularity
        .as_deref()
        .unwrap_or(&config.output.default_granularity)
        .into()
}

fn apply_common(query: &mut AggregationQuery, args: &QueryArgs) -> anyhow::Result<()> {
    for interval in &args.interval {
        query.add_interval(interval.as_str());
    }
    if let Some(hours) = args.last_hours {
        let interval = TimeInterval::last_hours(hours)
            .ok_or_else(|| anyhow!("--last-hours {} is out of range", hours))?;
        query.add_time_interval(interval);
    }

    for name in &args.count {
        query.add_aggregator(Aggregation::count(name.as_str()));
    }
    for spec in &args.agg {
        query.add_aggregator(parse_aggregation(spec)?);
    }

    let mut selectors = args
        .selector
        .iter()
        .map(|s| parse_selector(s))
        .collect::<anyhow::Result<Vec<_>>>()?;
    match selectors.len() {
        0 => {}
        1 => {
            query.set_filter(selectors.remove(0));
        }
        _ => {
            query.set_filter(Filter::and(selectors));
        }
    }

    Ok(())
}

/// Parse `TYPE:NAME:FIELD`, or `count:NAME`
fn parse_aggregation(spec: &str) -> anyhow::Result<Aggregation> {
    let parts: Vec<&str> = spec.splitn(3, ':').collect();
    let kind: AggregatorType = parts[0].parse()?;

    match (kind, parts.as_slice()) {
        (AggregatorType::Count, [_, name]) => Ok(Aggregation::count(*name)),
        (AggregatorType::Count, _) => bail!("invalid aggregator {:?}, expected count:NAME", spec),
        (_, [_, name, field]) => Ok(Aggregation::new(kind, *name, *field)),
        _ => bail!("invalid aggregator {:?}, expected TYPE:NAME:FIELD", spec),
    }
}

fn parse_selector(spec: &str) -> anyhow::Result<Filter> {
    let (dimension, value) = spec
        .split_once('=')
        .ok_or_else(|| anyhow!("invalid selector {:?}, expected DIM=VALUE", spec))?;
    Ok(Filter::selector(dimension, value))
}

fn print_query(query: &AggregationQuery, pretty: bool) -> anyhow::Result<()> {
    let rendered = if pretty {
        query.to_json_pretty()?
    } else {
        query.to_json_string()?
    };
    println!("{}", rendered);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aggregation() {
        let agg = parse_aggregation("longSum:added:delta").unwrap();
        assert_eq!(agg, Aggregation::long_sum("added", "delta"));

        let count = parse_aggregation("count:rows").unwrap();
        assert_eq!(count, Aggregation::count("rows"));

        assert!(parse_aggregation("longSum:added").is_err());
        assert!(parse_aggregation("count:rows:x").is_err());
        assert!(parse_aggregation("median:x:y").is_err());
    }

    #[test]
    fn test_parse_selector() {
        assert_eq!(
            parse_selector("country=US").unwrap(),
            Filter::selector("country", "US")
        );
        assert!(parse_selector("country").is_err());
    }

    #[test]
    fn test_cli_builds_group_by() {
        let cli = Cli::try_parse_from([
            "druid-query",
            "groupby",
            "--data-source",
            "events",
            "--dimensions",
            "country,device",
            "--count",
            "rows",
            "-s",
            "country=US",
            "-s",
            "device=mobile",
            "-i",
            "2024-01-01/2024-01-02",
        ])
        .unwrap();

        let Commands::Groupby { common, dimensions } = cli.command else {
            panic!("expected groupby");
        };
        let config = Config::default();
        let mut query = AggregationQuery::group_by(
            resolve_data_source(&common, &config).unwrap(),
            dimensions,
            resolve_granularity(&common, &config),
        );
        apply_common(&mut query, &common).unwrap();

        assert_eq!(query.dimensions, vec!["country", "device"]);
        assert_eq!(query.granularity, Granularity::All);
        assert_eq!(query.intervals, vec!["2024-01-01/2024-01-02"]);
        assert_eq!(
            query.filter,
            Some(Filter::and(vec![
                Filter::selector("country", "US"),
                Filter::selector("device", "mobile"),
            ]))
        );
    }

    #[test]
    fn test_last_hours_out_of_range_is_an_error() {
        let cli = Cli::try_parse_from([
            "druid-query",
            "timeseries",
            "-d",
            "events",
            "--last-hours",
            "9223372036854775",
        ])
        .unwrap();
        let Commands::Timeseries { common, .. } = cli.command else {
            panic!("expected timeseries");
        };

        let mut query = AggregationQuery::timeseries("events", false, Granularity::All);
        let err = apply_common(&mut query, &common).unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(query.intervals.is_empty());
    }

    #[test]
    fn test_missing_data_source() {
        let cli = Cli::try_parse_from(["druid-query", "timeseries"]).unwrap();
        let Commands::Timeseries { common, .. } = cli.command else {
            panic!("expected timeseries");
        };
        assert!(resolve_data_source(&common, &Config::default()).is_err());
    }
}
