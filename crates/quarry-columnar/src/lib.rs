//! Structure-of-arrays storage for quarry.
//!
//! One layout per dataset kind. Each keeps one `Vec` per field (plus validity bitmaps for
//! optional measurements), exposes typed column views for range predicates, and can absorb
//! ingestion shards while rewriting their dictionary ids.

#![forbid(unsafe_code)]

mod bitmap;
mod column;
mod incident;
mod layout;
mod population;
mod station;

pub use crate::bitmap::BitVec;
pub use crate::column::{ColumnRef, RowPredicate};
pub use crate::incident::IncidentColumns;
pub use crate::layout::{ColumnarLayout, DictionariesOf};
pub use crate::population::PopulationColumns;
pub use crate::station::StationColumns;
