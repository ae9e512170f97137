//! Input side of quarry: delimited row source, schema sniffing and file discovery.

#![forbid(unsafe_code)]

mod discover;
mod error;
pub mod sniff;
mod source;

pub use crate::discover::{discover_inputs, DEFAULT_EXTENSION};
pub use crate::error::SourceError;
pub use crate::sniff::{resolve_inputs, sniff_file, Inputs};
pub use crate::source::{open_header, Fields, RowSource};
