//! Filters
//!
//! A filter is a boolean predicate over dimension values. Each kind carries
//! only the fields it uses, and the kind is rendered as the `type` member.
//!
//! ```rust
//! use druid_query::Filter;
//!
//! let filter = Filter::selector("country", "US")
//!     .and_also(Filter::not(Filter::regex("page", "^/admin")));
//!
//! let json = serde_json::to_value(&filter).unwrap();
//! assert_eq!(json["type"], "and");
//! assert_eq!(json["fields"][1]["fields"][0]["pattern"], "^/admin");
//! ```

use super::constants::{FilterType, SearchMatchType};
use serde::{Deserialize, Serialize};

/// A predicate restricting which rows contribute to aggregation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Filter {
    /// `dimension == value`
    #[serde(rename = "selector")]
    Selector { dimension: String, value: String },

    /// Dimension matches a Java regular expression
    #[serde(rename = "regex")]
    Regex { dimension: String, pattern: String },

    /// All nested filters must match
    #[serde(rename = "and")]
    And { fields: Vec<Filter> },

    /// Any nested filter must match
    #[serde(rename = "or")]
    Or { fields: Vec<Filter> },

    /// Negates exactly one nested filter, rendered as a one-element `fields`
    #[serde(rename = "not")]
    Not {
        #[serde(rename = "fields", with = "single_field")]
        field: Box<Filter>,
    },

    /// JavaScript predicate source, evaluated by the store
    #[serde(rename = "javascript")]
    Javascript { dimension: String, function: String },

    /// Dimension is one of `values`
    #[serde(rename = "in")]
    In {
        dimension: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        values: Vec<String>,
    },

    #[serde(rename = "bound")]
    Bound(Bound),

    #[serde(rename = "search")]
    Search {
        dimension: String,
        query: SearchMatcher,
    },
}

impl Filter {
    pub fn selector(dimension: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Selector {
            dimension: dimension.into(),
            value: value.into(),
        }
    }

    pub fn regex(dimension: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::Regex {
            dimension: dimension.into(),
            pattern: pattern.into(),
        }
    }

    pub fn and(fields: Vec<Filter>) -> Self {
        Self::And { fields }
    }

    pub fn or(fields: Vec<Filter>) -> Self {
        Self::Or { fields }
    }

    pub fn not(field: Filter) -> Self {
        Self::Not {
            field: Box::new(field),
        }
    }

    pub fn javascript(dimension: impl Into<String>, function: impl Into<String>) -> Self {
        Self::Javascript {
            dimension: dimension.into(),
            function: function.into(),
        }
    }

    /// Membership filter; values keep the order given
    pub fn in_values<I, S>(dimension: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::In {
            dimension: dimension.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    pub fn bound(bound: Bound) -> Self {
        Self::Bound(bound)
    }

    pub fn search(dimension: impl Into<String>, query: SearchMatcher) -> Self {
        Self::Search {
            dimension: dimension.into(),
            query,
        }
    }

    /// Conjunction with `other`, flattening into an existing `and`
    pub fn and_also(self, other: Filter) -> Self {
        match self {
            Self::And { mut fields } => {
                fields.push(other);
                Self::And { fields }
            }
            first => Self::And {
                fields: vec![first, other],
            },
        }
    }

    /// Disjunction with `other`, flattening into an existing `or`
    pub fn or_else(self, other: Filter) -> Self {
        match self {
            Self::Or { mut fields } => {
                fields.push(other);
                Self::Or { fields }
            }
            first => Self::Or {
                fields: vec![first, other],
            },
        }
    }

    /// Catalog discriminator for this filter
    pub fn filter_type(&self) -> FilterType {
        match self {
            Self::Selector { .. } => FilterType::Selector,
            Self::Regex { .. } => FilterType::Regex,
            Self::And { .. } => FilterType::And,
            Self::Or { .. } => FilterType::Or,
            Self::Not { .. } => FilterType::Not,
            Self::Javascript { .. } => FilterType::Javascript,
            Self::In { .. } => FilterType::In,
            Self::Bound(_) => FilterType::Bound,
            Self::Search { .. } => FilterType::Search,
        }
    }
}

/// Range filter over a dimension
///
/// Either side may be left open. Strictness and the comparison mode are
/// omitted from the output unless enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bound {
    pub dimension: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub lower_strict: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub upper_strict: bool,
    /// Compare numerically instead of lexicographically
    #[serde(default, skip_serializing_if = "is_false")]
    pub alpha_numeric: bool,
}

impl Bound {
    pub fn new(dimension: impl Into<String>) -> Self {
        Self {
            dimension: dimension.into(),
            ..Default::default()
        }
    }

    pub fn lower(mut self, value: impl Into<String>) -> Self {
        self.lower = Some(value.into());
        self
    }

    pub fn upper(mut self, value: impl Into<String>) -> Self {
        self.upper = Some(value.into());
        self
    }

    /// Exclude the lower bound itself
    pub fn lower_strict(mut self) -> Self {
        self.lower_strict = true;
        self
    }

    /// Exclude the upper bound itself
    pub fn upper_strict(mut self) -> Self {
        self.upper_strict = true;
        self
    }

    pub fn alpha_numeric(mut self) -> Self {
        self.alpha_numeric = true;
        self
    }
}

impl From<Bound> for Filter {
    fn from(bound: Bound) -> Self {
        Filter::Bound(bound)
    }
}

/// Matcher used by the search filter
///
/// `value` and `values` are alternative forms: `fragment` takes several
/// values, the contains modes take one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchMatcher {
    #[serde(rename = "type")]
    pub kind: SearchMatchType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
    #[serde(default)]
    pub case_sensitive: bool,
}

impl SearchMatcher {
    pub fn insensitive_contains(value: impl Into<String>) -> Self {
        Self {
            kind: SearchMatchType::InsensitiveContains,
            value: Some(value.into()),
            values: Vec::new(),
            case_sensitive: false,
        }
    }

    pub fn contains(value: impl Into<String>, case_sensitive: bool) -> Self {
        Self {
            kind: SearchMatchType::Contains,
            value: Some(value.into()),
            values: Vec::new(),
            case_sensitive,
        }
    }

    /// Matches when every fragment is contained in the dimension value
    pub fn fragment<I, S>(values: I, case_sensitive: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: SearchMatchType::Fragment,
            value: None,
            values: values.into_iter().map(Into::into).collect(),
            case_sensitive,
        }
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Renders a single boxed filter as a one-element array.
mod single_field {
    use super::Filter;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(field: &Filter, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(std::iter::once(field))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Box<Filter>, D::Error> {
        let mut fields = Vec::<Filter>::deserialize(deserializer)?;
        match fields.len() {
            1 => Ok(Box::new(fields.remove(0))),
            n => Err(D::Error::custom(format!(
                "not filter takes exactly one nested filter, got {}",
                n
            ))),
        }
    }
}
