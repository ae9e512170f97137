use crate::parse::{parse_f64, parse_i64};
use crate::{ColumnId, ColumnType};

/// Inclusive bounds parsed according to a column's [`ColumnType`].
#[derive(Clone, Debug, PartialEq)]
pub enum ColumnRange {
    Integer { low: i64, high: i64 },
    Float { low: f64, high: f64 },
    Text { low: String, high: String },
}

/// A single field read from a row, typed the same way as its column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldValue<'a> {
    Integer(i64),
    Float(f64),
    Text(&'a str),
}

impl ColumnRange {
    /// Parse string bounds for `column`.
    ///
    /// Returns `None` when either bound fails to parse or `low > high`; callers treat that as an
    /// empty result rather than an error.
    pub fn parse(column: ColumnId, low: &str, high: &str) -> Option<Self> {
        match column.column_type() {
            ColumnType::Integer => {
                let (low, high) = (parse_i64(low)?, parse_i64(high)?);
                (low <= high).then_some(ColumnRange::Integer { low, high })
            }
            ColumnType::Float => {
                let (low, high) = (parse_f64(low)?, parse_f64(high)?);
                (low <= high).then_some(ColumnRange::Float { low, high })
            }
            ColumnType::Text => {
                (low <= high).then(|| ColumnRange::Text {
                    low: low.to_string(),
                    high: high.to_string(),
                })
            }
        }
    }

    #[inline]
    pub fn contains_i64(&self, v: i64) -> bool {
        match self {
            ColumnRange::Integer { low, high } => *low <= v && v <= *high,
            _ => false,
        }
    }

    #[inline]
    pub fn contains_f64(&self, v: f64) -> bool {
        match self {
            ColumnRange::Float { low, high } => *low <= v && v <= *high,
            _ => false,
        }
    }

    #[inline]
    pub fn contains_str(&self, v: &str) -> bool {
        match self {
            ColumnRange::Text { low, high } => low.as_str() <= v && v <= high.as_str(),
            _ => false,
        }
    }

    pub fn contains(&self, value: FieldValue<'_>) -> bool {
        match value {
            FieldValue::Integer(v) => self.contains_i64(v),
            FieldValue::Float(v) => self.contains_f64(v),
            FieldValue::Text(v) => self.contains_str(v),
        }
    }
}
