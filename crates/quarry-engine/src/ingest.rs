//! Sharded ingestion: one shard per input file, merged in file order.

use std::path::{Path, PathBuf};

use quarry_io::{RowSource, SourceError};
use quarry_model::{
    DatasetRecord, DictionarySet, IncidentDictionaries, IncidentRecord, PopulationDictionaries,
    PopulationRecord, RemapOf, StationDictionaries, StationRecord, YearColumns,
};

use crate::Executor;

/// Per-file ingestion counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FileStats {
    /// Records read from the file, header included.
    pub records: u64,
    /// Logical rows produced.
    pub rows: usize,
    /// Rows or cells dropped as malformed.
    pub skipped: usize,
}

impl FileStats {
    fn add(&mut self, other: FileStats) {
        self.records += other.records;
        self.rows += other.rows;
        self.skipped += other.skipped;
    }
}

/// A record type that knows how to read its file shape from a [`RowSource`].
pub trait Ingest: DatasetRecord {
    /// Parse every record of `source`, interning into `dicts` and handing each row to `emit`.
    fn read_rows(
        source: &mut RowSource,
        dicts: &mut Self::Dictionaries,
        emit: &mut dyn FnMut(Self),
    ) -> Result<FileStats, SourceError>;
}

impl Ingest for IncidentRecord {
    fn read_rows(
        source: &mut RowSource,
        dicts: &mut IncidentDictionaries,
        emit: &mut dyn FnMut(Self),
    ) -> Result<FileStats, SourceError> {
        let mut stats = FileStats::default();
        while let Some(fields) = source.next_record()? {
            match IncidentRecord::from_fields(&fields, dicts) {
                Some(record) => {
                    emit(record);
                    stats.rows += 1;
                }
                None => {
                    log::debug!(
                        "{}: skipping malformed incident record {}",
                        source.path().display(),
                        source.records_read()
                    );
                    stats.skipped += 1;
                }
            }
        }
        stats.records = source.records_read();
        Ok(stats)
    }
}

impl Ingest for PopulationRecord {
    fn read_rows(
        source: &mut RowSource,
        dicts: &mut PopulationDictionaries,
        emit: &mut dyn FnMut(Self),
    ) -> Result<FileStats, SourceError> {
        let mut stats = FileStats::default();
        let Some(header) = source.next_record()? else {
            return Ok(stats);
        };
        let years = YearColumns::from_header(&header);
        if years.is_empty() {
            log::warn!("{}: header has no year columns", source.path().display());
        }

        while let Some(fields) = source.next_record()? {
            let dropped = PopulationRecord::unpivot(&fields, &years, dicts, |record| {
                emit(record);
                stats.rows += 1;
            });
            if dropped > 0 {
                log::debug!(
                    "{}: dropped {dropped} unparsable cell(s) in record {}",
                    source.path().display(),
                    source.records_read()
                );
            }
            stats.skipped += dropped;
        }
        stats.records = source.records_read();
        Ok(stats)
    }
}

impl Ingest for StationRecord {
    fn read_rows(
        source: &mut RowSource,
        dicts: &mut StationDictionaries,
        emit: &mut dyn FnMut(Self),
    ) -> Result<FileStats, SourceError> {
        let mut stats = FileStats::default();
        while let Some(fields) = source.next_record()? {
            match StationRecord::from_fields(&fields, dicts) {
                Some(record) => {
                    emit(record);
                    stats.rows += 1;
                }
                None => {
                    log::debug!(
                        "{}: skipping malformed station record {}",
                        source.path().display(),
                        source.records_read()
                    );
                    stats.skipped += 1;
                }
            }
        }
        stats.records = source.records_read();
        Ok(stats)
    }
}

/// Row storage that ingestion can fill and merge.
pub(crate) trait RowSink<R: DatasetRecord>: Default + Send + Sync + 'static {
    fn push_row(&mut self, record: R);

    /// Append `shard` after the existing rows, rewriting its ids through `remap`.
    fn append_shard(&mut self, shard: Self, remap: &RemapOf<R>);

    fn row_count(&self) -> usize;
}

struct Shard<S, D> {
    rows: S,
    dicts: D,
    stats: FileStats,
}

fn read_shard<R, S>(path: &Path) -> Result<Shard<S, R::Dictionaries>, SourceError>
where
    R: Ingest,
    S: RowSink<R>,
{
    let mut source = RowSource::open(path)?;
    let mut rows = S::default();
    let mut dicts = R::Dictionaries::default();
    let stats = R::read_rows(&mut source, &mut dicts, &mut |record| rows.push_row(record))?;
    log::debug!(
        "{}: {} record(s), {} row(s), {} skipped",
        path.display(),
        stats.records,
        stats.rows,
        stats.skipped
    );
    Ok(Shard { rows, dicts, stats })
}

/// Ingest `files` into one row store plus its dictionaries.
///
/// Each file is parsed into a private shard (in parallel when the executor has more than one
/// thread). Shards are then merged strictly in file order, so rows and dictionary ids do not
/// depend on the thread count.
pub(crate) fn ingest<R, S>(
    files: &[PathBuf],
    exec: &Executor,
) -> Result<(S, R::Dictionaries), SourceError>
where
    R: Ingest,
    S: RowSink<R>,
{
    let shards = exec.map_items(files, |path| read_shard::<R, S>(path));

    let mut rows = S::default();
    let mut dicts = R::Dictionaries::default();
    let mut totals = FileStats::default();
    for shard in shards {
        let shard = shard?;
        let remap = dicts.absorb(&shard.dicts);
        rows.append_shard(shard.rows, &remap);
        totals.add(shard.stats);
    }

    log::info!(
        "ingested {} {} row(s) from {} file(s) on {} thread(s), {} skipped",
        rows.row_count(),
        R::KIND,
        files.len(),
        exec.threads(),
        totals.skipped
    );
    Ok((rows, dicts))
}
