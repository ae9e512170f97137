use quarry_io::SourceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown backend '{0}' (expected one of: columnar, vector, soa, node, map, list, aos)")]
    UnknownBackend(String),
    #[error(transparent)]
    Source(#[from] SourceError),
}
