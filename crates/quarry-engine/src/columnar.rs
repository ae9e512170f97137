use quarry_columnar::ColumnarLayout;
use quarry_model::{ColumnId, ColumnRange, DatasetRecord, RemapOf};

use crate::ingest::RowSink;
use crate::query::{first_extremum, sum_values, Extremum, Queryable};
use crate::Executor;

/// Structure-of-arrays backend: scans run over contiguous per-field arrays.
#[derive(Debug, Default)]
pub struct ColumnarTable<C> {
    columns: C,
}

impl<C: ColumnarLayout> RowSink<C::Record> for ColumnarTable<C> {
    fn push_row(&mut self, record: C::Record) {
        self.columns.push(&record);
    }

    fn append_shard(&mut self, shard: Self, remap: &RemapOf<C::Record>) {
        self.columns.append_remapped(shard.columns, remap);
        debug_assert!(self.columns.is_aligned());
    }

    fn row_count(&self) -> usize {
        self.columns.len()
    }
}

impl<C: ColumnarLayout> Queryable<C::Record> for ColumnarTable<C> {
    fn find_by_range(
        &self,
        exec: &Executor,
        column: ColumnId,
        range: &ColumnRange,
        dicts: &<C::Record as DatasetRecord>::Dictionaries,
    ) -> Vec<C::Record> {
        let Some(col) = self.columns.column(column, dicts) else {
            return Vec::new();
        };
        let predicate = col.predicate(range);

        exec.map_blocks(self.columns.len(), |rows| {
            let mut hits = Vec::new();
            predicate.collect_matches(rows, &mut hits);
            hits.into_iter()
                .map(|i| self.columns.row(i))
                .collect::<Vec<_>>()
        })
        .into_iter()
        .flatten()
        .collect()
    }

    fn find_extremum(&self, exec: &Executor, which: Extremum) -> Option<C::Record> {
        let values = self.columns.numeric_values();
        let winners = exec.map_blocks(values.len(), |rows| {
            first_extremum(rows, which, |&i| values[i])
        });
        first_extremum(winners.into_iter().flatten(), which, |&i| values[i])
            .map(|i| self.columns.row(i))
    }

    fn sum_by_year(&self, exec: &Executor, year: i32) -> f64 {
        let values = self.columns.numeric_values();
        let years = self.columns.years();
        let partials = exec.map_blocks(values.len(), |rows| {
            sum_values(rows.filter(|&i| years[i] == year).map(|i| values[i]))
        });
        sum_values(partials)
    }
}
