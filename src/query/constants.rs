//! Constant catalogs
//!
//! Every discriminator the store understands, as a closed enum that renders
//! to the exact wire string. Granularity is the one open catalog: strings
//! outside the known set are carried through as [`Granularity::Custom`].

use super::error::{QueryError, QueryResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Interval timestamp format: millisecond precision, no zone suffix
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Declares a closed catalog enum together with its wire strings.
macro_rules! catalog {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in catalog order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire string for this variant
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = QueryError;

            fn from_str(s: &str) -> QueryResult<Self> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(QueryError::unknown($kind, other)),
                }
            }
        }
    };
}

catalog! {
    /// Query kinds the builder can produce
    QueryType, "query type" {
        Timeseries => "timeseries",
        TopN => "topN",
        GroupBy => "groupBy",
    }
}

catalog! {
    /// Filter discriminators
    FilterType, "filter type" {
        Selector => "selector",
        Regex => "regex",
        And => "and",
        Or => "or",
        Not => "not",
        Javascript => "javascript",
        Search => "search",
        In => "in",
        Bound => "bound",
    }
}

catalog! {
    /// Matching modes for the search filter
    SearchMatchType, "search match type" {
        InsensitiveContains => "insensitive_contains",
        Fragment => "fragment",
        Contains => "contains",
    }
}

catalog! {
    /// Aggregator kinds
    AggregatorType, "aggregator type" {
        Count => "count",
        LongSum => "longSum",
        DoubleSum => "doubleSum",
        DoubleMin => "doubleMin",
        DoubleMax => "doubleMax",
        LongMin => "longMin",
        LongMax => "longMax",
        HyperUnique => "hyperUnique",
        Cardinality => "cardinality",
    }
}

catalog! {
    /// Post-aggregation kinds
    PostAggregationType, "post-aggregation type" {
        Arithmetic => "arithmetic",
        FieldAccess => "fieldAccess",
        Constant => "constant",
    }
}

catalog! {
    /// Arithmetic post-aggregator functions
    PostAggregatorFn, "post-aggregator function" {
        Add => "+",
        Subtract => "-",
        Multiply => "*",
        /// Division that yields 0 when the divisor is 0
        Divide => "/",
        /// Plain floating point division
        Quotient => "quotient",
    }
}

catalog! {
    /// Operand kinds of an arithmetic post-aggregation
    PostAggregatorFieldType, "post-aggregator field type" {
        FieldAccess => "fieldAccess",
        Constant => "constant",
    }
}

/// Time bucketing resolution
///
/// Unknown strings are accepted as [`Granularity::Custom`] and rendered back
/// verbatim; the store decides whether they are valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Granularity {
    All,
    None,
    Minute,
    FifteenMinute,
    ThirtyMinute,
    Hour,
    Day,
    Custom(String),
}

impl Granularity {
    /// Wire string for this granularity
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => "all",
            Self::None => "none",
            Self::Minute => "minute",
            Self::FifteenMinute => "fifteen_minute",
            Self::ThirtyMinute => "thirty_minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Custom(s) => s,
        }
    }

    /// Whether this is one of the catalog values
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Custom(_))
    }

    /// Whether this is the empty custom string, which is left out of documents
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Custom(s) if s.is_empty())
    }
}

impl From<&str> for Granularity {
    fn from(s: &str) -> Self {
        match s {
            "all" => Self::All,
            "none" => Self::None,
            "minute" => Self::Minute,
            "fifteen_minute" => Self::FifteenMinute,
            "thirty_minute" => Self::ThirtyMinute,
            "hour" => Self::Hour,
            "day" => Self::Day,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl From<String> for Granularity {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl FromStr for Granularity {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Granularity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Granularity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from(s))
    }
}
