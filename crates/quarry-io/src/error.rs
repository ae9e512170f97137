use std::path::PathBuf;

use quarry_model::DatasetKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("csv parse error in {} at record {row}: {reason}", path.display())]
    Csv {
        path: PathBuf,
        row: u64,
        reason: String,
    },
    #[error("no .{extension} files found under {}", path.display())]
    NoInputFiles { path: PathBuf, extension: String },
    #[error("{} holds {found} rows but the input was detected as {expected}", path.display())]
    MixedKinds {
        path: PathBuf,
        expected: DatasetKind,
        found: DatasetKind,
    },
}

impl SourceError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SourceError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn from_csv(path: impl Into<PathBuf>, err: csv::Error, fallback_row: u64) -> Self {
        let path = path.into();
        let reason = err.to_string();
        let pos = err.position().cloned();

        match err.into_kind() {
            csv::ErrorKind::Io(source) => SourceError::Io { path, source },
            _ => {
                let row = pos
                    .map(|p| p.record())
                    .filter(|r| *r > 0)
                    .unwrap_or(fallback_row);
                SourceError::Csv { path, row, reason }
            }
        }
    }
}
