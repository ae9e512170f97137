use std::collections::LinkedList;

use quarry_model::{ColumnId, ColumnRange, DatasetRecord, RemapOf};

use crate::ingest::RowSink;
use crate::query::{first_extremum, sum_values, Extremum, Queryable};
use crate::Executor;

/// Array-of-structures backend: a linked list of heap-allocated records in ingestion order.
///
/// There is no random access. The parallel paths first collect node references with one
/// sequential walk and only then split the work into blocks.
#[derive(Debug)]
pub struct NodeList<R> {
    list: LinkedList<R>,
}

impl<R> Default for NodeList<R> {
    fn default() -> Self {
        Self {
            list: LinkedList::new(),
        }
    }
}

impl<R: DatasetRecord> NodeList<R> {
    fn nodes(&self) -> Vec<&R> {
        self.list.iter().collect()
    }
}

impl<R: DatasetRecord> RowSink<R> for NodeList<R> {
    fn push_row(&mut self, record: R) {
        self.list.push_back(record);
    }

    fn append_shard(&mut self, mut shard: Self, remap: &RemapOf<R>) {
        for record in shard.list.iter_mut() {
            record.remap(remap);
        }
        self.list.append(&mut shard.list);
    }

    fn row_count(&self) -> usize {
        self.list.len()
    }
}

impl<R: DatasetRecord> Queryable<R> for NodeList<R> {
    fn find_by_range(
        &self,
        exec: &Executor,
        column: ColumnId,
        range: &ColumnRange,
        dicts: &R::Dictionaries,
    ) -> Vec<R> {
        let matches = |record: &R| {
            record
                .field(column, dicts)
                .is_some_and(|value| range.contains(value))
        };

        if !exec.is_parallel() {
            return self
                .list
                .iter()
                .filter(|record| matches(*record))
                .cloned()
                .collect();
        }

        let nodes = self.nodes();
        exec.map_blocks(nodes.len(), |rows| {
            nodes[rows]
                .iter()
                .filter(|record| matches(**record))
                .map(|record| (*record).clone())
                .collect::<Vec<_>>()
        })
        .into_iter()
        .flatten()
        .collect()
    }

    fn find_extremum(&self, exec: &Executor, which: Extremum) -> Option<R> {
        if !exec.is_parallel() {
            return first_extremum(self.list.iter(), which, |r| r.numeric_value()).cloned();
        }

        let nodes = self.nodes();
        let winners = exec.map_blocks(nodes.len(), |rows| {
            first_extremum(nodes[rows].iter().copied(), which, |r| r.numeric_value())
        });
        first_extremum(winners.into_iter().flatten(), which, |r| r.numeric_value()).cloned()
    }

    fn sum_by_year(&self, exec: &Executor, year: i32) -> f64 {
        if !exec.is_parallel() {
            return sum_values(
                self.list
                    .iter()
                    .filter(|r| r.year() == year)
                    .map(|r| r.numeric_value()),
            );
        }

        let nodes = self.nodes();
        let partials = exec.map_blocks(nodes.len(), |rows| {
            sum_values(
                nodes[rows]
                    .iter()
                    .filter(|r| r.year() == year)
                    .map(|r| r.numeric_value()),
            )
        });
        sum_values(partials)
    }
}
