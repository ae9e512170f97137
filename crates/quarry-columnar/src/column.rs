use std::ops::Range;
use std::sync::Arc;

use quarry_model::{ColumnRange, Dictionary};

use crate::BitVec;

/// Borrowed view of one physical column.
#[derive(Clone, Copy, Debug)]
pub enum ColumnRef<'a> {
    Int64(&'a [i64]),
    Int32(&'a [i32]),
    Int16 {
        values: &'a [i16],
        validity: &'a BitVec,
    },
    UInt8(&'a [u8]),
    /// Dictionary ids exposed as plain integers.
    Id(&'a [u32]),
    Float(&'a [f64]),
    /// Measurements whose undefined slots are cleared in `validity`.
    OptionalFloat {
        values: &'a [f64],
        validity: &'a BitVec,
    },
    Text(&'a [Arc<str>]),
    /// Dictionary ids compared through their resolved strings.
    Dictionary {
        ids: &'a [u32],
        dictionary: &'a Dictionary,
    },
}

impl<'a> ColumnRef<'a> {
    /// Bind `range` to this column. Dictionary columns evaluate the bounds once per entry here.
    pub fn predicate(self, range: &ColumnRange) -> RowPredicate<'a> {
        let mask = match self {
            ColumnRef::Dictionary { dictionary, .. } => {
                dictionary.iter().map(|key| range.contains_str(key)).collect()
            }
            _ => BitVec::new(),
        };
        RowPredicate {
            column: self,
            range: range.clone(),
            mask,
        }
    }
}

/// A range predicate bound to a column, evaluated row by row.
#[derive(Clone, Debug)]
pub struct RowPredicate<'a> {
    column: ColumnRef<'a>,
    range: ColumnRange,
    /// Per dictionary id: does the key fall inside the range.
    mask: BitVec,
}

impl RowPredicate<'_> {
    #[inline]
    pub fn matches(&self, row: usize) -> bool {
        let range = &self.range;
        match self.column {
            ColumnRef::Int64(v) => range.contains_i64(v[row]),
            ColumnRef::Int32(v) => range.contains_i64(v[row].into()),
            ColumnRef::Int16 { values, validity } => {
                validity.get(row) && range.contains_i64(values[row].into())
            }
            ColumnRef::UInt8(v) => range.contains_i64(v[row].into()),
            ColumnRef::Id(v) => range.contains_i64(v[row].into()),
            ColumnRef::Float(v) => range.contains_f64(v[row]),
            ColumnRef::OptionalFloat { values, validity } => {
                validity.get(row) && range.contains_f64(values[row])
            }
            ColumnRef::Text(v) => range.contains_str(&v[row]),
            ColumnRef::Dictionary { ids, .. } => self.mask.get(ids[row] as usize),
        }
    }

    /// Push the index of every matching row in `rows` onto `out`, in order.
    pub fn collect_matches(&self, rows: Range<usize>, out: &mut Vec<usize>) {
        out.extend(rows.filter(|&row| self.matches(row)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_model::ColumnId;

    #[test]
    fn optional_columns_skip_undefined_slots() {
        let values = [5.0, 0.0, 7.0];
        let validity: BitVec = [true, false, true].into_iter().collect();
        let col = ColumnRef::OptionalFloat {
            values: &values,
            validity: &validity,
        };
        let range = ColumnRange::parse(ColumnId::Value, "-1", "10").unwrap();
        let mut out = Vec::new();
        col.predicate(&range).collect_matches(0..3, &mut out);
        assert_eq!(out, vec![0, 2]);
    }

    #[test]
    fn dictionary_columns_compare_resolved_strings() {
        let mut dict = Dictionary::new();
        let ids: Vec<u32> = ["Lightning", "Arson", "Unknown", "Arson"]
            .iter()
            .map(|k| dict.get_or_add(k))
            .collect();
        let col = ColumnRef::Dictionary {
            ids: &ids,
            dictionary: &dict,
        };
        let range = ColumnRange::parse(ColumnId::Cause, "Arson", "M").unwrap();
        let pred = col.predicate(&range);

        let mut out = Vec::new();
        pred.collect_matches(0..ids.len(), &mut out);
        assert_eq!(out, vec![0, 1, 3]);

        out.clear();
        pred.collect_matches(2..4, &mut out);
        assert_eq!(out, vec![3]);
    }
}
