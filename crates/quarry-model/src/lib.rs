//! Shared data model for the quarry storage engines.
//!
//! This crate focuses on:
//! - Typed records for the three supported dataset kinds (population series, legacy incidents,
//!   station readings) and the row parsers that build them.
//! - Dense string dictionaries for categorical fields, including shard merge with id remapping.
//! - Column identifiers and typed range bounds used by range queries.

#![forbid(unsafe_code)]

mod column;
mod dictionary;
mod kind;
pub mod parse;
mod range;
mod record;

pub use crate::column::{ColumnId, ColumnType, UnknownColumn};
pub use crate::dictionary::{
    remap_id, DictionariesRef, Dictionary, DictionarySet, IncidentDictionaries, IncidentRemap,
    PopulationDictionaries, PopulationRemap, StationDictionaries, StationRemap,
};
pub use crate::kind::DatasetKind;
pub use crate::range::{ColumnRange, FieldValue};
pub use crate::record::{
    DatasetRecord, IncidentRecord, PopulationRecord, Record, RecordDisplay, RemapOf, RowSet,
    StationRecord, YearColumns,
};
