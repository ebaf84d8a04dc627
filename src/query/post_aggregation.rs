//! Post-aggregations
//!
//! Values derived from already materialized aggregator outputs.
//!
//! ```rust
//! use druid_query::{PostAggregation, PostAggregatorField, PostAggregatorFn};
//!
//! let avg = PostAggregation::arithmetic(
//!     "avg_bytes",
//!     PostAggregatorFn::Divide,
//!     vec![
//!         PostAggregatorField::field_access("total", "total_bytes"),
//!         PostAggregatorField::field_access("rows", "rows"),
//!     ],
//! );
//! assert_eq!(avg.name(), "avg_bytes");
//! ```

use super::constants::{PostAggregationType, PostAggregatorFieldType, PostAggregatorFn};
use serde::{Deserialize, Serialize};

/// An operand of an arithmetic post-aggregation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PostAggregatorField {
    /// Reads the output of an aggregator
    #[serde(rename = "fieldAccess")]
    FieldAccess {
        name: String,
        #[serde(rename = "fieldName")]
        field_name: String,
    },
    /// A literal number
    #[serde(rename = "constant")]
    Constant { name: String, value: f64 },
}

impl PostAggregatorField {
    pub fn field_access(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::FieldAccess {
            name: name.into(),
            field_name: field_name.into(),
        }
    }

    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self::Constant {
            name: name.into(),
            value,
        }
    }

    pub fn kind(&self) -> PostAggregatorFieldType {
        match self {
            Self::FieldAccess { .. } => PostAggregatorFieldType::FieldAccess,
            Self::Constant { .. } => PostAggregatorFieldType::Constant,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::FieldAccess { name, .. } | Self::Constant { name, .. } => name,
        }
    }

    /// Whether this operand has a JSON number representation
    pub fn is_finite(&self) -> bool {
        match self {
            Self::FieldAccess { .. } => true,
            Self::Constant { value, .. } => value.is_finite(),
        }
    }
}

/// An entry in the `postAggregations` array
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PostAggregation {
    /// Combines operands left to right with `fn`
    #[serde(rename = "arithmetic")]
    Arithmetic {
        name: String,
        #[serde(rename = "fn")]
        func: PostAggregatorFn,
        fields: Vec<PostAggregatorField>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ordering: Option<String>,
    },
    #[serde(rename = "fieldAccess")]
    FieldAccess {
        name: String,
        #[serde(rename = "fieldName")]
        field_name: String,
    },
    #[serde(rename = "constant")]
    Constant { name: String, value: f64 },
}

impl PostAggregation {
    /// Arithmetic combination of `fields`, evaluated left to right
    pub fn arithmetic(
        name: impl Into<String>,
        func: PostAggregatorFn,
        fields: Vec<PostAggregatorField>,
    ) -> Self {
        Self::Arithmetic {
            name: name.into(),
            func,
            fields,
            ordering: None,
        }
    }

    /// `numerator / denominator` over two aggregator outputs
    pub fn ratio(
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
    ) -> Self {
        let numerator = numerator.into();
        let denominator = denominator.into();
        Self::arithmetic(
            name,
            PostAggregatorFn::Divide,
            vec![
                PostAggregatorField::field_access(numerator.clone(), numerator),
                PostAggregatorField::field_access(denominator.clone(), denominator),
            ],
        )
    }

    pub fn field_access(name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self::FieldAccess {
            name: name.into(),
            field_name: field_name.into(),
        }
    }

    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self::Constant {
            name: name.into(),
            value,
        }
    }

    /// Set the result ordering (e.g. `"numericFirst"`)
    ///
    /// Only arithmetic post-aggregations carry an ordering; other kinds are
    /// returned unchanged.
    pub fn with_ordering(mut self, value: impl Into<String>) -> Self {
        if let Self::Arithmetic { ordering, .. } = &mut self {
            *ordering = Some(value.into());
        }
        self
    }

    pub fn kind(&self) -> PostAggregationType {
        match self {
            Self::Arithmetic { .. } => PostAggregationType::Arithmetic,
            Self::FieldAccess { .. } => PostAggregationType::FieldAccess,
            Self::Constant { .. } => PostAggregationType::Constant,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Arithmetic { name, .. }
            | Self::FieldAccess { name, .. }
            | Self::Constant { name, .. } => name,
        }
    }

    /// Name of the first constant that is NaN or infinite, if any
    ///
    /// JSON has no encoding for such values; they would render as `null`.
    pub fn non_finite_constant(&self) -> Option<&str> {
        match self {
            Self::Arithmetic { fields, .. } => fields
                .iter()
                .find(|f| !f.is_finite())
                .map(PostAggregatorField::name),
            Self::Constant { name, value } if !value.is_finite() => Some(name.as_str()),
            _ => None,
        }
    }
}
