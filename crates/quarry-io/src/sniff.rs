//! Dataset kind detection from the first records of a file.

use std::path::{Path, PathBuf};

use quarry_model::parse::{looks_like_timestamp, parse_f64};
use quarry_model::{DatasetKind, StationRecord};

use crate::{discover_inputs, RowSource, SourceError};

const POPULATION_MARKER: &str = "Country Name";

/// True for a record shaped like a station reading: enough fields, numeric coordinates and a
/// `YYYY-MM-DD(T| )HH:MM` timestamp in the third field.
pub fn looks_like_station_row(fields: &[String]) -> bool {
    fields.len() >= StationRecord::FIELD_COUNT
        && parse_f64(&fields[0]).is_some()
        && parse_f64(&fields[1]).is_some()
        && looks_like_timestamp(fields[2].trim())
}

/// Classify a file from its first two records. `None` means the file had no records.
pub fn classify(first: Option<&[String]>, second: Option<&[String]>) -> Option<DatasetKind> {
    let first = first?;
    if first.first().is_some_and(|f| f == POPULATION_MARKER) {
        return Some(DatasetKind::PopulationSeries);
    }
    if looks_like_station_row(first) || second.is_some_and(looks_like_station_row) {
        return Some(DatasetKind::StationReading);
    }
    Some(DatasetKind::LegacyIncident)
}

fn sniff_records(path: &Path) -> Result<Option<DatasetKind>, SourceError> {
    let mut source = RowSource::open(path)?;
    let first = source.next_record()?;
    let second = match first {
        Some(_) => source.next_record()?,
        None => None,
    };
    Ok(classify(first.as_deref(), second.as_deref()))
}

/// Detect the kind of a single file. Empty files fall back to [`DatasetKind::LegacyIncident`].
pub fn sniff_file(path: impl AsRef<Path>) -> Result<DatasetKind, SourceError> {
    Ok(sniff_records(path.as_ref())?.unwrap_or(DatasetKind::LegacyIncident))
}

/// A resolved input: the files to ingest, in order, and their common kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inputs {
    pub kind: DatasetKind,
    pub files: Vec<PathBuf>,
}

/// Discover and sniff every file under `path`.
///
/// All non-empty files must agree on one kind; the first disagreeing file is reported as
/// [`SourceError::MixedKinds`].
pub fn resolve_inputs(path: impl AsRef<Path>, extension: &str) -> Result<Inputs, SourceError> {
    let files = discover_inputs(path.as_ref(), extension)?;

    let mut kind: Option<DatasetKind> = None;
    for file in &files {
        let Some(found) = sniff_records(file)? else {
            log::debug!("{} is empty", file.display());
            continue;
        };
        match kind {
            None => kind = Some(found),
            Some(expected) if expected != found => {
                return Err(SourceError::MixedKinds {
                    path: file.clone(),
                    expected,
                    found,
                });
            }
            Some(_) => {}
        }
    }

    let kind = kind.unwrap_or(DatasetKind::LegacyIncident);
    log::debug!("{} input file(s) detected as {kind}", files.len());
    Ok(Inputs { kind, files })
}
