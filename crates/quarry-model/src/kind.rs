use std::fmt;

use serde::{Deserialize, Serialize};

/// The row shapes the engines know how to ingest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetKind {
    /// Headered wide table: one row per country, one column per year.
    PopulationSeries,
    /// Positional wildfire incident rows.
    LegacyIncident,
    /// Headerless 12-field air-quality station readings.
    StationReading,
}

impl DatasetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DatasetKind::PopulationSeries => "population",
            DatasetKind::LegacyIncident => "incident",
            DatasetKind::StationReading => "station",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
