//! In-memory storage engines for quarry datasets.
//!
//! Two interchangeable backends answer the same queries:
//! - [`ColumnarTable`]: structure-of-arrays layouts from `quarry-columnar`.
//! - [`NodeList`]: a linked list of records, the array-of-structures baseline.
//!
//! Both are built by sharded ingestion (one shard per input file) and queried through
//! [`StorageEngine`], with every scan running as a fork-join over contiguous blocks on the
//! engine's [`Executor`].

#![forbid(unsafe_code)]

mod columnar;
mod engine;
mod error;
mod ingest;
mod node;
mod options;
mod parallel;
mod query;

pub use crate::columnar::ColumnarTable;
pub use crate::engine::{open_engine, open_engine_with, Backend, StorageEngine};
pub use crate::error::EngineError;
pub use crate::ingest::{FileStats, Ingest};
pub use crate::node::NodeList;
pub use crate::options::{EngineOptions, THREADS_ENV};
pub use crate::parallel::{block_ranges, Executor};
pub use crate::query::Extremum;

pub use quarry_model::{ColumnId, DatasetKind, Record, RowSet};
