use quarry_model::{ColumnId, ColumnRange, DatasetRecord};

use crate::Executor;

/// Which end of the unified metric an extremum query looks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Extremum {
    Min,
    Max,
}

impl Extremum {
    /// Strict comparison: equal values never replace the current winner.
    #[inline]
    fn replaces(self, candidate: f64, current: f64) -> bool {
        match self {
            Extremum::Min => candidate < current,
            Extremum::Max => candidate > current,
        }
    }
}

/// The first item holding the extreme value, in iteration order.
///
/// Applied to block winners taken in block order, this gives the same answer as one pass over
/// all rows.
pub(crate) fn first_extremum<T>(
    items: impl IntoIterator<Item = T>,
    which: Extremum,
    value: impl Fn(&T) -> f64,
) -> Option<T> {
    let mut best: Option<(T, f64)> = None;
    for item in items {
        let v = value(&item);
        let replace = match &best {
            Some((_, current)) => which.replaces(v, *current),
            None => true,
        };
        if replace {
            best = Some((item, v));
        }
    }
    best.map(|(item, _)| item)
}

/// Sum from positive zero, so an empty selection yields `0.0` rather than `-0.0`.
pub(crate) fn sum_values(values: impl IntoIterator<Item = f64>) -> f64 {
    values.into_iter().fold(0.0, |acc, v| acc + v)
}

/// The three query kernels, implemented once per physical layout.
pub(crate) trait Queryable<R: DatasetRecord> {
    /// Rows whose `column` falls inside `range`, in storage order.
    fn find_by_range(
        &self,
        exec: &Executor,
        column: ColumnId,
        range: &ColumnRange,
        dicts: &R::Dictionaries,
    ) -> Vec<R>;

    fn find_extremum(&self, exec: &Executor, which: Extremum) -> Option<R>;

    fn sum_by_year(&self, exec: &Executor, year: i32) -> f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ties_go_to_the_first_occurrence() {
        let values = [3.0, 1.0, 5.0, 1.0, 5.0];
        let idx = |which| first_extremum(0..values.len(), which, |&i| values[i]);
        assert_eq!(idx(Extremum::Min), Some(1));
        assert_eq!(idx(Extremum::Max), Some(2));
        assert_eq!(
            first_extremum(std::iter::empty::<usize>(), Extremum::Min, |_| 0.0),
            None
        );
    }

    #[test]
    fn empty_sums_are_positive_zero() {
        assert_eq!(sum_values(std::iter::empty()).to_bits(), 0.0f64.to_bits());
        assert_eq!(sum_values([-0.0, -0.0]).to_bits(), 0.0f64.to_bits());
        assert_eq!(sum_values([1.5, 2.0]), 3.5);
    }

    #[test]
    fn merging_block_winners_matches_a_single_pass() {
        let values = [2.0, 9.0, 0.5, 9.0, 0.5, 4.0, 9.0];
        for which in [Extremum::Min, Extremum::Max] {
            let serial = first_extremum(0..values.len(), which, |&i| values[i]);
            for workers in 1..=values.len() {
                let winners = crate::parallel::block_ranges(values.len(), workers)
                    .into_iter()
                    .map(|block| first_extremum(block, which, |&i| values[i]));
                let merged = first_extremum(winners.flatten(), which, |&i| values[i]);
                assert_eq!(merged, serial, "{which:?} with {workers} workers");
            }
        }
    }
}
