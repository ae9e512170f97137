use quarry_model::{ColumnId, DatasetRecord, RemapOf};

use crate::ColumnRef;

pub type DictionariesOf<L> = <<L as ColumnarLayout>::Record as DatasetRecord>::Dictionaries;

/// A structure-of-arrays table for one dataset kind.
///
/// Implementations keep every per-field array at the same length: rows are only added whole,
/// through [`ColumnarLayout::push`] or [`ColumnarLayout::append_remapped`].
pub trait ColumnarLayout: Default + Send + Sync + 'static {
    type Record: DatasetRecord;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, record: &Self::Record);

    /// Append all rows of `shard`, rewriting its dictionary ids through `remap`.
    fn append_remapped(&mut self, shard: Self, remap: &RemapOf<Self::Record>);

    /// Reassemble row `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    fn row(&self, index: usize) -> Self::Record;

    /// The unified metric per row.
    fn numeric_values(&self) -> &[f64];

    fn years(&self) -> &[i32];

    /// The physical column backing `column`, or `None` if this kind has no such column.
    fn column<'a>(&'a self, column: ColumnId, dicts: &'a DictionariesOf<Self>)
        -> Option<ColumnRef<'a>>;

    /// True when every per-field array has length [`ColumnarLayout::len`].
    fn is_aligned(&self) -> bool;
}
