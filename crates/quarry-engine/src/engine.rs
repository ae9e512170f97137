use std::fmt;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use quarry_columnar::{IncidentColumns, PopulationColumns, StationColumns};
use quarry_io::resolve_inputs;
use quarry_model::{
    ColumnId, ColumnRange, DatasetKind, DatasetRecord, DictionariesRef, IncidentRecord,
    PopulationRecord, Record, RowSet, StationRecord,
};

use crate::ingest::{ingest, Ingest, RowSink};
use crate::query::{Extremum, Queryable};
use crate::{ColumnarTable, EngineError, EngineOptions, Executor, NodeList};

/// Physical layout of a storage engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Structure-of-arrays.
    Columnar,
    /// Linked list of records.
    Node,
}

impl Backend {
    pub fn as_str(self) -> &'static str {
        match self {
            Backend::Columnar => "columnar",
            Backend::Node => "node",
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Backend {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "columnar" | "vector" | "soa" => Ok(Backend::Columnar),
            "node" | "map" | "list" | "aos" => Ok(Backend::Node),
            _ => Err(EngineError::UnknownBackend(s.to_string())),
        }
    }
}

/// Read-only query surface shared by every backend and dataset kind.
pub trait StorageEngine: Send + Sync {
    fn kind(&self) -> DatasetKind;

    fn backend(&self) -> Backend;

    /// Logical rows held.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Worker threads used by queries.
    fn threads(&self) -> usize;

    fn dictionaries(&self) -> DictionariesRef<'_>;

    /// Rows whose `column` lies in `[low, high]`, in storage order.
    ///
    /// Bounds are parsed according to the column's type. Unparsable or inverted bounds, and
    /// columns that do not exist for this dataset kind, give an empty result.
    fn find_by_range(&self, column: ColumnId, low: &str, high: &str) -> RowSet;

    /// Row with the smallest unified metric; the earliest row wins ties.
    fn find_min(&self) -> Option<Record>;

    /// Row with the largest unified metric; the earliest row wins ties.
    fn find_max(&self) -> Option<Record>;

    /// Sum of the unified metric over rows of `year`.
    fn sum_by_year(&self, year: i32) -> f64;
}

struct TypedEngine<R: DatasetRecord, S> {
    rows: S,
    dicts: R::Dictionaries,
    exec: Executor,
    backend: Backend,
    _record: PhantomData<fn() -> R>,
}

impl<R, S> TypedEngine<R, S>
where
    R: Ingest,
    S: RowSink<R> + Queryable<R>,
{
    fn load(files: &[PathBuf], exec: Executor, backend: Backend) -> Result<Self, EngineError> {
        let (rows, dicts) = ingest::<R, S>(files, &exec)?;
        Ok(Self {
            rows,
            dicts,
            exec,
            backend,
            _record: PhantomData,
        })
    }
}

impl<R, S> StorageEngine for TypedEngine<R, S>
where
    R: Ingest,
    S: RowSink<R> + Queryable<R>,
{
    fn kind(&self) -> DatasetKind {
        R::KIND
    }

    fn backend(&self) -> Backend {
        self.backend
    }

    fn len(&self) -> usize {
        self.rows.row_count()
    }

    fn threads(&self) -> usize {
        self.exec.threads()
    }

    fn dictionaries(&self) -> DictionariesRef<'_> {
        R::dictionaries_ref(&self.dicts)
    }

    fn find_by_range(&self, column: ColumnId, low: &str, high: &str) -> RowSet {
        if !column.is_defined_for(R::KIND) {
            log::debug!("column {column} is not defined for {} data", R::KIND);
            return RowSet::new();
        }
        let Some(range) = ColumnRange::parse(column, low, high) else {
            log::debug!("empty range for {column}: [{low}, {high}]");
            return RowSet::new();
        };
        self.rows
            .find_by_range(&self.exec, column, &range, &self.dicts)
            .into_iter()
            .map(R::into_record)
            .collect()
    }

    fn find_min(&self) -> Option<Record> {
        self.rows
            .find_extremum(&self.exec, Extremum::Min)
            .map(R::into_record)
    }

    fn find_max(&self) -> Option<Record> {
        self.rows
            .find_extremum(&self.exec, Extremum::Max)
            .map(R::into_record)
    }

    fn sum_by_year(&self, year: i32) -> f64 {
        self.rows.sum_by_year(&self.exec, year)
    }
}

fn boxed<R, S>(
    files: &[PathBuf],
    exec: Executor,
    backend: Backend,
) -> Result<Box<dyn StorageEngine>, EngineError>
where
    R: Ingest,
    S: RowSink<R> + Queryable<R>,
{
    Ok(Box::new(TypedEngine::<R, S>::load(files, exec, backend)?))
}

/// Build an engine of the named backend over a file or directory.
pub fn open_engine(
    backend: &str,
    path: impl AsRef<Path>,
    options: &EngineOptions,
) -> Result<Box<dyn StorageEngine>, EngineError> {
    open_engine_with(backend.parse()?, path, options)
}

/// Discover, sniff and ingest `path` into a `backend` engine.
pub fn open_engine_with(
    backend: Backend,
    path: impl AsRef<Path>,
    options: &EngineOptions,
) -> Result<Box<dyn StorageEngine>, EngineError> {
    let inputs = resolve_inputs(path.as_ref(), &options.extension)?;
    let exec = Executor::new(options.threads);
    let files = &inputs.files;

    match (backend, inputs.kind) {
        (Backend::Columnar, DatasetKind::LegacyIncident) => {
            boxed::<IncidentRecord, ColumnarTable<IncidentColumns>>(files, exec, backend)
        }
        (Backend::Columnar, DatasetKind::PopulationSeries) => {
            boxed::<PopulationRecord, ColumnarTable<PopulationColumns>>(files, exec, backend)
        }
        (Backend::Columnar, DatasetKind::StationReading) => {
            boxed::<StationRecord, ColumnarTable<StationColumns>>(files, exec, backend)
        }
        (Backend::Node, DatasetKind::LegacyIncident) => {
            boxed::<IncidentRecord, NodeList<IncidentRecord>>(files, exec, backend)
        }
        (Backend::Node, DatasetKind::PopulationSeries) => {
            boxed::<PopulationRecord, NodeList<PopulationRecord>>(files, exec, backend)
        }
        (Backend::Node, DatasetKind::StationReading) => {
            boxed::<StationRecord, NodeList<StationRecord>>(files, exec, backend)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_names_and_aliases() {
        for (name, backend) in [
            ("columnar", Backend::Columnar),
            ("Vector", Backend::Columnar),
            ("SOA", Backend::Columnar),
            ("node", Backend::Node),
            ("map", Backend::Node),
            ("List", Backend::Node),
            ("aos", Backend::Node),
        ] {
            assert_eq!(name.parse::<Backend>().ok(), Some(backend), "{name}");
        }
        assert!(matches!(
            "btree".parse::<Backend>(),
            Err(EngineError::UnknownBackend(name)) if name == "btree"
        ));
        assert_eq!(Backend::Node.to_string(), "node");
    }
}
