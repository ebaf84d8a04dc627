//! Druid Query Documents
//!
//! Typed model of the JSON documents sent to the store's query endpoint:
//!
//! - **Constants**: catalogs of query, filter, aggregator and
//!   post-aggregator discriminators
//! - **Values**: aggregators, post-aggregations, filters and search matchers
//! - **Document**: the [`AggregationQuery`] root with its constructors,
//!   attach operations and JSON rendering
//!
//! # Examples
//!
//! ```rust
//! use druid_query::query::{Aggregation, AggregationQuery, Filter, Granularity};
//!
//! let mut query = AggregationQuery::timeseries("wikipedia", false, Granularity::Hour);
//! query
//!     .add_interval("2024-01-01T00:00:00.000/2024-01-02T00:00:00.000")
//!     .set_filter(Filter::selector("country", "US"))
//!     .add_aggregator(Aggregation::count("edits"));
//!
//! let json = query.to_json_string().unwrap();
//! assert!(json.starts_with(r#"{"queryType":"timeseries","dataSource":"wikipedia""#));
//! ```
//!
//! Sending the document and decoding the response are left to the caller.

mod aggregation;
mod constants;
mod document;
mod error;
mod filter;
mod interval;
mod post_aggregation;

pub use aggregation::Aggregation;
pub use constants::{
    AggregatorType, FilterType, Granularity, PostAggregationType, PostAggregatorFieldType,
    PostAggregatorFn, QueryType, SearchMatchType, TIME_FORMAT,
};
pub use document::{AggregationQuery, Having, LimitSpec};
pub use error::{QueryError, QueryResult};
pub use filter::{Bound, Filter, SearchMatcher};
pub use interval::{format_interval, is_well_formed, TimeInterval};
pub use post_aggregation::{PostAggregation, PostAggregatorField};
