use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::DatasetKind;

/// How range bounds for a column are parsed and compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    /// Compared lexicographically on the raw string value.
    Text,
}

/// Every queryable field across all dataset kinds.
///
/// Each kind recognizes only its own subset (see [`ColumnId::is_defined_for`]); queries on any
/// other column produce an empty result.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnId {
    /// The unified metric: magnitude, population or primary reading depending on kind.
    Value,
    RawValue,
    QualityIndex,
    Category,
    Latitude,
    Longitude,
    UtcMinutes,
    ParameterId,
    UnitId,
    SiteId,
    AgencyId,
    SourceId,
    Population,
    Year,
    CountryNameId,
    CountryCodeId,
    IncidentId,
    IncidentName,
    Region,
    Cause,
    ClosureDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown column '{0}'")]
pub struct UnknownColumn(pub String);

impl ColumnId {
    pub const ALL: [ColumnId; 21] = [
        ColumnId::Value,
        ColumnId::RawValue,
        ColumnId::QualityIndex,
        ColumnId::Category,
        ColumnId::Latitude,
        ColumnId::Longitude,
        ColumnId::UtcMinutes,
        ColumnId::ParameterId,
        ColumnId::UnitId,
        ColumnId::SiteId,
        ColumnId::AgencyId,
        ColumnId::SourceId,
        ColumnId::Population,
        ColumnId::Year,
        ColumnId::CountryNameId,
        ColumnId::CountryCodeId,
        ColumnId::IncidentId,
        ColumnId::IncidentName,
        ColumnId::Region,
        ColumnId::Cause,
        ColumnId::ClosureDate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ColumnId::Value => "Value",
            ColumnId::RawValue => "RawValue",
            ColumnId::QualityIndex => "QualityIndex",
            ColumnId::Category => "Category",
            ColumnId::Latitude => "Latitude",
            ColumnId::Longitude => "Longitude",
            ColumnId::UtcMinutes => "UtcMinutes",
            ColumnId::ParameterId => "ParameterId",
            ColumnId::UnitId => "UnitId",
            ColumnId::SiteId => "SiteId",
            ColumnId::AgencyId => "AgencyId",
            ColumnId::SourceId => "SourceId",
            ColumnId::Population => "Population",
            ColumnId::Year => "Year",
            ColumnId::CountryNameId => "CountryNameId",
            ColumnId::CountryCodeId => "CountryCodeId",
            ColumnId::IncidentId => "IncidentId",
            ColumnId::IncidentName => "IncidentName",
            ColumnId::Region => "Region",
            ColumnId::Cause => "Cause",
            ColumnId::ClosureDate => "ClosureDate",
        }
    }

    pub fn column_type(self) -> ColumnType {
        match self {
            ColumnId::Value
            | ColumnId::RawValue
            | ColumnId::Latitude
            | ColumnId::Longitude
            | ColumnId::Population => ColumnType::Float,
            ColumnId::IncidentName
            | ColumnId::Region
            | ColumnId::Cause
            | ColumnId::ClosureDate => ColumnType::Text,
            ColumnId::QualityIndex
            | ColumnId::Category
            | ColumnId::UtcMinutes
            | ColumnId::ParameterId
            | ColumnId::UnitId
            | ColumnId::SiteId
            | ColumnId::AgencyId
            | ColumnId::SourceId
            | ColumnId::Year
            | ColumnId::CountryNameId
            | ColumnId::CountryCodeId
            | ColumnId::IncidentId => ColumnType::Integer,
        }
    }

    pub fn is_defined_for(self, kind: DatasetKind) -> bool {
        match kind {
            DatasetKind::LegacyIncident => matches!(
                self,
                ColumnId::IncidentId
                    | ColumnId::IncidentName
                    | ColumnId::Value
                    | ColumnId::Year
                    | ColumnId::Region
                    | ColumnId::Cause
                    | ColumnId::ClosureDate
            ),
            DatasetKind::PopulationSeries => matches!(
                self,
                ColumnId::Population
                    | ColumnId::Value
                    | ColumnId::Year
                    | ColumnId::CountryNameId
                    | ColumnId::CountryCodeId
            ),
            DatasetKind::StationReading => matches!(
                self,
                ColumnId::Value
                    | ColumnId::RawValue
                    | ColumnId::QualityIndex
                    | ColumnId::Category
                    | ColumnId::Latitude
                    | ColumnId::Longitude
                    | ColumnId::UtcMinutes
                    | ColumnId::ParameterId
                    | ColumnId::UnitId
                    | ColumnId::SiteId
                    | ColumnId::AgencyId
                    | ColumnId::SourceId
                    | ColumnId::Year
            ),
        }
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColumnId {
    type Err = UnknownColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        let column = match key.as_str() {
            "value" => ColumnId::Value,
            "rawvalue" => ColumnId::RawValue,
            "qualityindex" | "aqi" => ColumnId::QualityIndex,
            "category" => ColumnId::Category,
            "latitude" | "lat" => ColumnId::Latitude,
            "longitude" | "lon" => ColumnId::Longitude,
            "utcminutes" => ColumnId::UtcMinutes,
            "parameterid" => ColumnId::ParameterId,
            "unitid" => ColumnId::UnitId,
            "siteid" => ColumnId::SiteId,
            "agencyid" => ColumnId::AgencyId,
            "sourceid" | "aqsid" => ColumnId::SourceId,
            "population" => ColumnId::Population,
            "year" => ColumnId::Year,
            "countrynameid" | "wb_countrynameid" => ColumnId::CountryNameId,
            "countrycodeid" | "wb_countrycodeid" => ColumnId::CountryCodeId,
            "incidentid" | "objectid" => ColumnId::IncidentId,
            "incidentname" | "name" => ColumnId::IncidentName,
            "region" | "county" => ColumnId::Region,
            "cause" => ColumnId::Cause,
            "closuredate" | "contdate" => ColumnId::ClosureDate,
            "acres" | "magnitude" => ColumnId::Value,
            _ => return Err(UnknownColumn(s.to_string())),
        };
        Ok(column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for column in ColumnId::ALL {
            assert_eq!(column.name().parse::<ColumnId>(), Ok(column));
        }
    }

    #[test]
    fn legacy_aliases_are_accepted() {
        assert_eq!("AQI".parse::<ColumnId>(), Ok(ColumnId::QualityIndex));
        assert_eq!("AqsId".parse::<ColumnId>(), Ok(ColumnId::SourceId));
        assert_eq!("UTCMinutes".parse::<ColumnId>(), Ok(ColumnId::UtcMinutes));
        assert_eq!(
            "WB_CountryNameId".parse::<ColumnId>(),
            Ok(ColumnId::CountryNameId)
        );
        assert_eq!(
            "nope".parse::<ColumnId>(),
            Err(UnknownColumn("nope".to_string()))
        );
    }

    #[test]
    fn every_column_belongs_to_some_kind() {
        let kinds = [
            DatasetKind::LegacyIncident,
            DatasetKind::PopulationSeries,
            DatasetKind::StationReading,
        ];
        for column in ColumnId::ALL {
            assert!(
                kinds.iter().any(|k| column.is_defined_for(*k)),
                "{column} is not queryable on any kind"
            );
        }
        assert!(!ColumnId::Population.is_defined_for(DatasetKind::StationReading));
        assert!(!ColumnId::RawValue.is_defined_for(DatasetKind::PopulationSeries));
    }
}
