//! Query document root
//!
//! An [`AggregationQuery`] is a flat value object. It is created by one of
//! the root constructors, mutated in place by append-only attach operations,
//! and rendered with [`AggregationQuery::to_json`].
//!
//! Construction never validates: an empty data source, an unknown
//! granularity or a missing interval are all accepted and left for the store
//! to reject.
//!
//! # Wire policy
//!
//! - `filter` is always present and renders as `null` when unset.
//! - `aggregations`, `postAggregations` and `intervals` always render, even
//!   when empty.
//! - `dimension`, `dimensions`, `threshold`, `metric`, `limitSpec` and
//!   `having` are omitted when unset; `granularity` is omitted when empty.

use super::aggregation::Aggregation;
use super::constants::{Granularity, QueryType};
use super::error::{QueryError, QueryResult};
use super::filter::Filter;
use super::interval::{is_well_formed, TimeInterval};
use super::post_aggregation::PostAggregation;
use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};

/// Reserved limit specification; renders as `{}` when set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitSpec {}

/// Reserved having clause; renders as `{}` when set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Having {}

/// An aggregation query document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregationQuery {
    pub query_type: QueryType,
    pub data_source: String,
    /// TopN dimension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,
    /// GroupBy dimensions, in the order given
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub descending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metric: Option<String>,
    /// Omitted when empty
    #[serde(default = "empty_granularity", skip_serializing_if = "Granularity::is_empty")]
    pub granularity: Granularity,
    #[serde(default)]
    pub filter: Option<Filter>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
    #[serde(default)]
    pub post_aggregations: Vec<PostAggregation>,
    #[serde(default)]
    pub intervals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_spec: Option<LimitSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub having: Option<Having>,
}

fn empty_granularity() -> Granularity {
    Granularity::Custom(String::new())
}

impl AggregationQuery {
    fn empty(query_type: QueryType, data_source: String, granularity: Granularity) -> Self {
        Self {
            query_type,
            data_source,
            dimension: None,
            dimensions: Vec::new(),
            descending: false,
            threshold: None,
            metric: None,
            granularity,
            filter: None,
            aggregations: Vec::new(),
            post_aggregations: Vec::new(),
            intervals: Vec::new(),
            limit_spec: None,
            having: None,
        }
    }

    /// Timeseries query over `data_source`
    pub fn timeseries(
        data_source: impl Into<String>,
        descending: bool,
        granularity: impl Into<Granularity>,
    ) -> Self {
        let mut query = Self::empty(QueryType::Timeseries, data_source.into(), granularity.into());
        query.descending = descending;
        query
    }

    /// TopN query ranking `dimension` values by `metric`
    pub fn top_n(
        data_source: impl Into<String>,
        dimension: impl Into<String>,
        metric: impl Into<String>,
        threshold: u32,
        granularity: impl Into<Granularity>,
    ) -> Self {
        let mut query = Self::empty(QueryType::TopN, data_source.into(), granularity.into());
        query.dimension = Some(dimension.into());
        query.metric = Some(metric.into());
        query.threshold = Some(threshold);
        query
    }

    /// GroupBy query over `dimensions`
    ///
    /// The document takes ownership of `dimensions`; order and duplicates are
    /// kept as given.
    pub fn group_by(
        data_source: impl Into<String>,
        dimensions: Vec<String>,
        granularity: impl Into<Granularity>,
    ) -> Self {
        let mut query = Self::empty(QueryType::GroupBy, data_source.into(), granularity.into());
        query.dimensions = dimensions;
        query
    }

    /// Append a raw interval string verbatim
    pub fn add_interval(&mut self, interval: impl Into<String>) -> &mut Self {
        let interval = interval.into();
        tracing::debug!(interval = %interval, "adding interval");
        self.intervals.push(interval);
        self
    }

    /// Append `start/end`, converting both timestamps to UTC
    pub fn add_interval_range<A: TimeZone, B: TimeZone>(
        &mut self,
        start: &DateTime<A>,
        end: &DateTime<B>,
    ) -> &mut Self {
        self.add_time_interval(TimeInterval::new(start, end))
    }

    pub fn add_time_interval(&mut self, interval: TimeInterval) -> &mut Self {
        self.add_interval(interval.to_string())
    }

    /// Replace the top-level filter
    ///
    /// Only one filter is attached at a time; combine conditions with
    /// [`Filter::and`] or [`Filter::or`] first.
    pub fn set_filter(&mut self, filter: Filter) -> &mut Self {
        if self.filter.is_some() {
            tracing::debug!(filter_type = %filter.filter_type(), "replacing filter");
        }
        self.filter = Some(filter);
        self
    }

    pub fn add_aggregator(&mut self, aggregation: Aggregation) -> &mut Self {
        self.aggregations.push(aggregation);
        self
    }

    pub fn add_post_aggregator(&mut self, post_aggregation: PostAggregation) -> &mut Self {
        self.post_aggregations.push(post_aggregation);
        self
    }

    pub fn set_limit_spec(&mut self, limit_spec: LimitSpec) -> &mut Self {
        self.limit_spec = Some(limit_spec);
        self
    }

    pub fn set_having(&mut self, having: Having) -> &mut Self {
        self.having = Some(having);
        self
    }

    /// Whether at least one interval has the `start/end` shape
    ///
    /// Advisory only; serialization does not depend on it.
    pub fn is_submittable(&self) -> bool {
        self.intervals.iter().any(|i| is_well_formed(i))
    }

    /// Render the document as JSON bytes
    ///
    /// Fails when a constant post-aggregation operand is NaN or infinite,
    /// since JSON cannot represent it.
    pub fn to_json(&self) -> QueryResult<Vec<u8>> {
        self.check_renderable()?;
        Ok(serde_json::to_vec(self)?)
    }

    /// Render the document as JSON text
    ///
    /// Errors propagate; callers that prefer an empty string on failure can
    /// use `unwrap_or_default()`.
    pub fn to_json_string(&self) -> QueryResult<String> {
        self.check_renderable()?;
        Ok(serde_json::to_string(self)?)
    }

    /// Render the document as indented JSON text
    pub fn to_json_pretty(&self) -> QueryResult<String> {
        self.check_renderable()?;
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Decode a document from JSON text
    pub fn from_json(json: &str) -> QueryResult<Self> {
        serde_json::from_str(json).map_err(|e| QueryError::Deserialization(e.to_string()))
    }

    fn check_renderable(&self) -> QueryResult<()> {
        if let Some(name) = self
            .post_aggregations
            .iter()
            .find_map(PostAggregation::non_finite_constant)
        {
            return Err(QueryError::Serialization(format!(
                "post-aggregation constant {:?} is not a finite number",
                name
            )));
        }

        if self.intervals.is_empty() {
            tracing::warn!(
                query_type = %self.query_type,
                data_source = %self.data_source,
                "rendering query without intervals; the store will reject it"
            );
        }
        tracing::debug!(
            query_type = %self.query_type,
            aggregations = self.aggregations.len(),
            post_aggregations = self.post_aggregations.len(),
            intervals = self.intervals.len(),
            "rendering query document"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::constants::AggregatorType;
    use crate::query::post_aggregation::PostAggregatorField;
    use crate::query::PostAggregatorFn;
    use chrono::FixedOffset;
    use serde_json::{json, Value};

    fn to_value(query: &AggregationQuery) -> Value {
        serde_json::from_slice(&query.to_json().unwrap()).unwrap()
    }

    #[test]
    fn test_timeseries_constructor() {
        let query = AggregationQuery::timeseries("wikipedia", true, Granularity::Hour);

        assert_eq!(query.query_type, QueryType::Timeseries);
        assert_eq!(query.data_source, "wikipedia");
        assert!(query.descending);
        assert_eq!(query.granularity, Granularity::Hour);
        assert!(query.dimension.is_none());
        assert!(query.dimensions.is_empty());
        assert!(query.threshold.is_none());
        assert!(query.filter.is_none());
    }

    #[test]
    fn test_top_n_constructor() {
        let query = AggregationQuery::top_n("wikipedia", "page", "edits", 25, "day");

        assert_eq!(query.query_type, QueryType::TopN);
        assert_eq!(query.dimension.as_deref(), Some("page"));
        assert_eq!(query.metric.as_deref(), Some("edits"));
        assert_eq!(query.threshold, Some(25));
        assert_eq!(query.granularity, Granularity::Day);
        assert!(!query.descending);
    }

    #[test]
    fn test_group_by_owns_dimensions() {
        let mut dims = vec!["country".to_string(), "device".to_string(), "country".to_string()];
        let query = AggregationQuery::group_by("events", dims.clone(), Granularity::All);

        dims.push("browser".to_string());
        dims[0] = "changed".to_string();

        assert_eq!(query.query_type, QueryType::GroupBy);
        assert_eq!(query.dimensions, vec!["country", "device", "country"]);
    }

    #[test]
    fn test_constructors_are_permissive() {
        let query = AggregationQuery::timeseries("", false, "fortnightly");
        assert_eq!(query.data_source, "");
        assert_eq!(query.granularity, Granularity::Custom("fortnightly".to_string()));

        let value = to_value(&query);
        assert_eq!(value["granularity"], "fortnightly");
        assert_eq!(value["dataSource"], "");
    }

    #[test]
    fn test_empty_granularity_omitted() {
        let query = AggregationQuery::timeseries("ds", false, "");
        let value = to_value(&query);
        assert!(value.get("granularity").is_none());

        let decoded = AggregationQuery::from_json(&query.to_json_string().unwrap()).unwrap();
        assert_eq!(decoded.granularity, Granularity::Custom(String::new()));
        assert_eq!(decoded, query);
    }

    #[test]
    fn test_intervals_append_in_order() {
        let mut query = AggregationQuery::timeseries("ds", false, Granularity::All);
        let pst = FixedOffset::west_opt(8 * 3600).unwrap();
        let start = pst.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = pst.with_ymd_and_hms(2024, 1, 1, 1, 0, 0).unwrap();

        query
            .add_interval("2023-01-01/2023-02-01")
            .add_interval_range(&start, &end)
            .add_interval("not-an-interval");

        assert_eq!(
            query.intervals,
            vec![
                "2023-01-01/2023-02-01",
                "2024-01-01T08:00:00.000/2024-01-01T09:00:00.000",
                "not-an-interval",
            ]
        );
    }

    #[test]
    fn test_set_filter_replaces() {
        let mut query = AggregationQuery::timeseries("ds", false, Granularity::All);
        let first = Filter::selector("country", "US");

        query.set_filter(first.clone()).set_filter(first.clone());
        assert_eq!(query.filter, Some(first));

        query.set_filter(Filter::regex("page", "^/api"));
        assert_eq!(query.filter, Some(Filter::regex("page", "^/api")));
    }

    #[test]
    fn test_selector_filter_serialization() {
        let mut query = AggregationQuery::timeseries("ds", false, Granularity::Day);
        query.set_filter(Filter::selector("country", "US"));

        let value = to_value(&query);
        assert_eq!(
            value["filter"],
            json!({"type": "selector", "dimension": "country", "value": "US"})
        );
    }

    #[test]
    fn test_empty_document_serializes() {
        let query = AggregationQuery::timeseries("ds", false, Granularity::All);
        let value = to_value(&query);

        assert_eq!(
            value,
            json!({
                "queryType": "timeseries",
                "dataSource": "ds",
                "descending": false,
                "granularity": "all",
                "filter": null,
                "aggregations": [],
                "postAggregations": [],
                "intervals": []
            })
        );
        assert!(!query.is_submittable());
    }

    #[test]
    fn test_top_n_serialization() {
        let mut query = AggregationQuery::top_n("wikipedia", "page", "edits", 10, Granularity::All);
        query
            .add_interval("2024-01-01/2024-01-02")
            .add_aggregator(Aggregation::count("edits"));

        let value = to_value(&query);
        assert_eq!(value["queryType"], "topN");
        assert_eq!(value["dimension"], "page");
        assert_eq!(value["metric"], "edits");
        assert_eq!(value["threshold"], 10);
        assert!(value.get("dimensions").is_none());
        assert!(query.is_submittable());
    }

    #[test]
    fn test_aggregators_and_post_aggregators_keep_order() {
        let mut query = AggregationQuery::group_by(
            "sales",
            vec!["region".to_string()],
            Granularity::Day,
        );
        query
            .add_aggregator(Aggregation::double_sum("revenue", "price"))
            .add_aggregator(Aggregation::count("orders"))
            .add_post_aggregator(PostAggregation::ratio("avg_order", "revenue", "orders"))
            .add_post_aggregator(PostAggregation::arithmetic(
                "revenue_k",
                PostAggregatorFn::Divide,
                vec![
                    PostAggregatorField::field_access("revenue", "revenue"),
                    PostAggregatorField::constant("k", 1000.0),
                ],
            ));

        assert_eq!(query.aggregations[0].kind, AggregatorType::DoubleSum);
        assert_eq!(query.aggregations[1].kind, AggregatorType::Count);

        let value = to_value(&query);
        assert_eq!(value["dimensions"], json!(["region"]));
        assert_eq!(value["postAggregations"][0]["name"], "avg_order");
        assert_eq!(value["postAggregations"][1]["fields"][1]["value"], 1000.0);
    }

    #[test]
    fn test_non_finite_constant_fails_to_render() {
        let mut query = AggregationQuery::timeseries("ds", false, Granularity::All);
        query
            .add_aggregator(Aggregation::count("rows"))
            .add_post_aggregator(PostAggregation::arithmetic(
                "scaled",
                PostAggregatorFn::Multiply,
                vec![
                    PostAggregatorField::field_access("rows", "rows"),
                    PostAggregatorField::constant("factor", f64::NAN),
                ],
            ));

        assert!(matches!(query.to_json(), Err(QueryError::Serialization(_))));
        assert!(matches!(query.to_json_pretty(), Err(QueryError::Serialization(_))));
        let err = query.to_json_string().unwrap_err();
        assert!(err.to_string().contains("factor"));

        let mut top_level = AggregationQuery::timeseries("ds", false, Granularity::All);
        top_level.add_post_aggregator(PostAggregation::constant("inf", f64::INFINITY));
        assert!(top_level.to_json().is_err());
    }

    #[test]
    fn test_limit_spec_and_having() {
        let mut query = AggregationQuery::group_by("ds", vec!["a".to_string()], Granularity::All);
        query.set_limit_spec(LimitSpec::default()).set_having(Having::default());

        let value = to_value(&query);
        assert_eq!(value["limitSpec"], json!({}));
        assert_eq!(value["having"], json!({}));
    }

    #[test]
    fn test_serialization_is_repeatable() {
        let mut query = AggregationQuery::timeseries("ds", false, Granularity::Minute);
        let before = query.to_json_string().unwrap();
        assert_eq!(before, query.to_json_string().unwrap());

        query.add_aggregator(Aggregation::count("rows"));
        let after = query.to_json_string().unwrap();
        assert_ne!(before, after);
        assert!(after.contains(r#""aggregations":[{"type":"count","name":"rows"}]"#));
    }

    #[test]
    fn test_round_trip_nested_filters() {
        let mut query = AggregationQuery::timeseries("ds", false, Granularity::FifteenMinute);
        query
            .set_filter(Filter::not(Filter::and(vec![
                Filter::selector("country", "US"),
                Filter::selector("device", "mobile"),
            ])))
            .add_interval("2024-01-01/2024-01-02");

        let json = query.to_json_string().unwrap();
        let decoded = AggregationQuery::from_json(&json).unwrap();
        assert_eq!(decoded, query);
    }

    #[test]
    fn test_from_json_rejects_missing_query_type() {
        let err = AggregationQuery::from_json(r#"{"dataSource": "ds", "granularity": "all"}"#)
            .unwrap_err();
        assert!(matches!(err, QueryError::Deserialization(_)));
    }
}
