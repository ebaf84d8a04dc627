//! # Druid Query
//!
//! Typed builder and serializer for Druid aggregation query documents.
//!
//! ## Features
//!
//! - **Three query kinds**: timeseries, topN and groupBy roots
//! - **Typed filters**: one variant per filter kind, nested to any depth
//! - **Canonical JSON**: exact wire field names with consistent omission rules
//! - **UTC intervals**: timestamps in any zone are normalized before rendering
//!
//! ## Modules
//!
//! - [`query`]: Query document model, builders and serialization
//! - [`config`]: Configuration for the `druid-query` command-line tool
//!
//! ## Quick Start
//!
//! ```rust
//! use druid_query::*;
//! use chrono::{Duration, Utc};
//!
//! let end = Utc::now();
//! let start = end - Duration::days(7);
//!
//! let mut query = AggregationQuery::top_n("wikipedia", "page", "edits", 10, Granularity::All);
//! query
//!     .add_interval_range(&start, &end)
//!     .set_filter(Filter::selector("namespace", "Main").and_also(Filter::not(
//!         Filter::in_values("user", ["bot-a", "bot-b"]),
//!     )))
//!     .add_aggregator(Aggregation::count("edits"))
//!     .add_aggregator(Aggregation::long_sum("added", "delta"))
//!     .add_post_aggregator(PostAggregation::ratio("added_per_edit", "added", "edits"));
//!
//! let body = query.to_json().expect("plain data always renders");
//! assert!(!body.is_empty());
//! ```

pub mod config;
pub mod query;

// Re-export top-level types for convenience
pub use query::{
    format_interval, Aggregation, AggregationQuery, AggregatorType, Bound, Filter, FilterType,
    Granularity, Having, LimitSpec, PostAggregation, PostAggregationType, PostAggregatorField,
    PostAggregatorFieldType, PostAggregatorFn, QueryError, QueryResult, QueryType, SearchMatchType,
    SearchMatcher, TimeInterval,
};

pub use config::{generate_default_config, Config, ConfigError, LoggingConfig, OutputConfig};
