//! Aggregators
//!
//! A named computation applied per time bucket or group.

use super::constants::AggregatorType;
use serde::{Deserialize, Serialize};

/// An aggregator entry in the `aggregations` array
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    /// Aggregator kind
    #[serde(rename = "type")]
    pub kind: AggregatorType,
    /// Output field name
    pub name: String,
    /// Source column; unset for `count`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_name: Option<String>,
}

impl Aggregation {
    /// Create an aggregator of any kind over a source column
    pub fn new(kind: AggregatorType, name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            field_name: Some(field_name.into()),
        }
    }

    /// Row count
    pub fn count(name: impl Into<String>) -> Self {
        Self {
            kind: AggregatorType::Count,
            name: name.into(),
            field_name: None,
        }
    }

    pub fn long_sum(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(AggregatorType::LongSum, name, field_name)
    }

    pub fn double_sum(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(AggregatorType::DoubleSum, name, field_name)
    }

    pub fn double_min(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(AggregatorType::DoubleMin, name, field_name)
    }

    pub fn double_max(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(AggregatorType::DoubleMax, name, field_name)
    }

    pub fn long_min(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(AggregatorType::LongMin, name, field_name)
    }

    pub fn long_max(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(AggregatorType::LongMax, name, field_name)
    }

    /// Approximate distinct count over a pre-aggregated hyperUnique column
    pub fn hyper_unique(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(AggregatorType::HyperUnique, name, field_name)
    }

    /// Approximate distinct count over a dimension
    pub fn cardinality(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::new(AggregatorType::Cardinality, name, field_name)
    }
}
