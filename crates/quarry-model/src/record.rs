use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::dictionary::{
    remap_id, DictionariesRef, DictionarySet, IncidentDictionaries, IncidentRemap,
    PopulationDictionaries, PopulationRemap, StationDictionaries, StationRemap,
};
use crate::parse::{
    parse_category, parse_f64, parse_i32, parse_i64, parse_measurement, parse_quality_index,
    parse_utc_timestamp,
};
use crate::{ColumnId, DatasetKind, FieldValue};

/// Behaviour shared by the typed per-kind records.
///
/// Both storage layouts are generic over this trait: it is how they learn the unified metric,
/// the derived year and per-column field access without knowing the concrete row shape.
pub trait DatasetRecord: Clone + fmt::Debug + Send + Sync + 'static {
    const KIND: DatasetKind;

    type Dictionaries: DictionarySet;

    fn year(&self) -> i32;

    fn numeric_value(&self) -> f64;

    /// Read one column. `None` when the column does not exist for this kind or the value is
    /// undefined (missing measurement).
    fn field<'a>(
        &'a self,
        column: ColumnId,
        dicts: &'a Self::Dictionaries,
    ) -> Option<FieldValue<'a>>;

    /// Rewrite shard-local dictionary ids into merged ids.
    fn remap(&mut self, remap: &RemapOf<Self>);

    fn dictionaries_ref(dicts: &Self::Dictionaries) -> DictionariesRef<'_>;

    fn into_record(self) -> Record;
}

pub type RemapOf<R> = <<R as DatasetRecord>::Dictionaries as DictionarySet>::Remap;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct IncidentRecord {
    pub id: i64,
    pub name: Arc<str>,
    /// Acres burned.
    pub magnitude: f64,
    pub year: i32,
    pub region: u32,
    pub cause: u32,
    pub closure_date: Arc<str>,
}

impl IncidentRecord {
    pub const FIELD_COUNT: usize = 7;

    /// Parse a positional incident row. Header rows and rows with an unparsable id, magnitude or
    /// year are rejected before any dictionary is touched.
    pub fn from_fields(fields: &[String], dicts: &mut IncidentDictionaries) -> Option<Self> {
        if fields.len() < Self::FIELD_COUNT {
            return None;
        }
        let id = parse_i64(&fields[0])?;
        let magnitude = parse_f64(&fields[2])?;
        let year = parse_i32(&fields[3])?;

        Some(IncidentRecord {
            id,
            name: Arc::from(fields[1].as_str()),
            magnitude,
            year,
            region: dicts.region.get_or_add(&fields[4]),
            cause: dicts.cause.get_or_add(&fields[5]),
            closure_date: Arc::from(fields[6].as_str()),
        })
    }
}

impl DatasetRecord for IncidentRecord {
    const KIND: DatasetKind = DatasetKind::LegacyIncident;

    type Dictionaries = IncidentDictionaries;

    fn year(&self) -> i32 {
        self.year
    }

    fn numeric_value(&self) -> f64 {
        self.magnitude
    }

    fn field<'a>(&'a self, column: ColumnId, dicts: &'a IncidentDictionaries) -> Option<FieldValue<'a>> {
        match column {
            ColumnId::IncidentId => Some(FieldValue::Integer(self.id)),
            ColumnId::IncidentName => Some(FieldValue::Text(&self.name)),
            ColumnId::Value => Some(FieldValue::Float(self.magnitude)),
            ColumnId::Year => Some(FieldValue::Integer(self.year.into())),
            ColumnId::Region => dicts.region.resolve(self.region).map(FieldValue::Text),
            ColumnId::Cause => dicts.cause.resolve(self.cause).map(FieldValue::Text),
            ColumnId::ClosureDate => Some(FieldValue::Text(&self.closure_date)),
            _ => None,
        }
    }

    fn remap(&mut self, remap: &IncidentRemap) {
        self.region = remap_id(&remap.region, self.region);
        self.cause = remap_id(&remap.cause, self.cause);
    }

    fn dictionaries_ref(dicts: &IncidentDictionaries) -> DictionariesRef<'_> {
        DictionariesRef::Incident(dicts)
    }

    fn into_record(self) -> Record {
        Record::Incident(self)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PopulationRecord {
    pub country_name: u32,
    pub country_code: u32,
    pub indicator: u32,
    pub year: i32,
    pub population: f64,
}

/// Header-derived position of every year column in a population file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct YearColumns {
    columns: Vec<(usize, i32)>,
}

impl YearColumns {
    /// First header column that may hold a year.
    pub const FIRST_YEAR_COLUMN: usize = 4;

    /// Year columns are the header fields from index 4 whose name is exactly four digits.
    pub fn from_header(header: &[String]) -> Self {
        let columns = header
            .iter()
            .enumerate()
            .skip(Self::FIRST_YEAR_COLUMN)
            .filter(|(_, name)| name.len() == 4 && name.bytes().all(|b| b.is_ascii_digit()))
            .filter_map(|(idx, name)| Some((idx, name.parse().ok()?)))
            .collect();
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl PopulationRecord {
    /// Unpivot one wide country row into one record per non-empty year cell.
    ///
    /// Cells that do not parse drop only their own (country, year) record. Returns the number of
    /// dropped cells. Country and indicator keys are interned only if at least one record is
    /// produced.
    pub fn unpivot(
        fields: &[String],
        years: &YearColumns,
        dicts: &mut PopulationDictionaries,
        mut emit: impl FnMut(PopulationRecord),
    ) -> usize {
        if fields.len() <= YearColumns::FIRST_YEAR_COLUMN {
            return 0;
        }

        let mut dropped = 0;
        let mut cells: Vec<(i32, f64)> = Vec::with_capacity(years.len());
        for &(idx, year) in &years.columns {
            let Some(cell) = fields.get(idx) else {
                continue;
            };
            if cell.trim().is_empty() {
                continue;
            }
            match parse_f64(cell) {
                Some(v) => cells.push((year, v)),
                None => dropped += 1,
            }
        }

        if cells.is_empty() {
            return dropped;
        }

        let country_name = dicts.country_name.get_or_add(&fields[0]);
        let country_code = dicts.country_code.get_or_add(&fields[1]);
        let indicator = dicts
            .indicator
            .get_or_add(&format!("{}|{}", fields[2], fields[3]));

        for (year, population) in cells {
            emit(PopulationRecord {
                country_name,
                country_code,
                indicator,
                year,
                population,
            });
        }
        dropped
    }
}

impl DatasetRecord for PopulationRecord {
    const KIND: DatasetKind = DatasetKind::PopulationSeries;

    type Dictionaries = PopulationDictionaries;

    fn year(&self) -> i32 {
        self.year
    }

    fn numeric_value(&self) -> f64 {
        self.population
    }

    fn field<'a>(&'a self, column: ColumnId, _dicts: &'a PopulationDictionaries) -> Option<FieldValue<'a>> {
        match column {
            ColumnId::Population | ColumnId::Value => Some(FieldValue::Float(self.population)),
            ColumnId::Year => Some(FieldValue::Integer(self.year.into())),
            ColumnId::CountryNameId => Some(FieldValue::Integer(self.country_name.into())),
            ColumnId::CountryCodeId => Some(FieldValue::Integer(self.country_code.into())),
            _ => None,
        }
    }

    fn remap(&mut self, remap: &PopulationRemap) {
        self.country_name = remap_id(&remap.country_name, self.country_name);
        self.country_code = remap_id(&remap.country_code, self.country_code);
        self.indicator = remap_id(&remap.indicator, self.indicator);
    }

    fn dictionaries_ref(dicts: &PopulationDictionaries) -> DictionariesRef<'_> {
        DictionariesRef::Population(dicts)
    }

    fn into_record(self) -> Record {
        Record::Population(self)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StationRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub utc_minutes: i64,
    pub parameter: u32,
    /// Primary reading; `None` when missing.
    pub value: Option<f64>,
    pub unit: u32,
    pub raw_value: Option<f64>,
    pub quality_index: Option<i16>,
    pub category: u8,
    pub site: u32,
    pub agency: u32,
    pub source: u32,
    pub year: i32,
}

impl StationRecord {
    pub const FIELD_COUNT: usize = 12;

    /// Parse a headerless station row. Every numeric field is validated before the dictionaries
    /// are touched, so a rejected row leaves no trace.
    pub fn from_fields(fields: &[String], dicts: &mut StationDictionaries) -> Option<Self> {
        if fields.len() < Self::FIELD_COUNT {
            return None;
        }
        let latitude = parse_f64(&fields[0])?;
        let longitude = parse_f64(&fields[1])?;
        let timestamp = parse_utc_timestamp(&fields[2])?;
        let value = parse_measurement(&fields[4]).ok()?;
        let raw_value = parse_measurement(&fields[6]).ok()?;
        let quality_index = parse_quality_index(&fields[7]).ok()?;
        let category = parse_category(&fields[8]).ok()?;

        Some(StationRecord {
            latitude,
            longitude,
            utc_minutes: timestamp.minutes,
            parameter: dicts.parameter.get_or_add(&fields[3]),
            value,
            unit: dicts.unit.get_or_add(&fields[5]),
            raw_value,
            quality_index,
            category,
            site: dicts.site.get_or_add(&fields[9]),
            agency: dicts.agency.get_or_add(&fields[10]),
            source: dicts.source.get_or_add(&fields[11]),
            year: timestamp.year,
        })
    }
}

impl DatasetRecord for StationRecord {
    const KIND: DatasetKind = DatasetKind::StationReading;

    type Dictionaries = StationDictionaries;

    fn year(&self) -> i32 {
        self.year
    }

    fn numeric_value(&self) -> f64 {
        self.value.unwrap_or(0.0)
    }

    fn field<'a>(&'a self, column: ColumnId, _dicts: &'a StationDictionaries) -> Option<FieldValue<'a>> {
        match column {
            ColumnId::Value => self.value.map(FieldValue::Float),
            ColumnId::RawValue => self.raw_value.map(FieldValue::Float),
            ColumnId::QualityIndex => self.quality_index.map(|v| FieldValue::Integer(v.into())),
            ColumnId::Category => Some(FieldValue::Integer(self.category.into())),
            ColumnId::Latitude => Some(FieldValue::Float(self.latitude)),
            ColumnId::Longitude => Some(FieldValue::Float(self.longitude)),
            ColumnId::UtcMinutes => Some(FieldValue::Integer(self.utc_minutes)),
            ColumnId::ParameterId => Some(FieldValue::Integer(self.parameter.into())),
            ColumnId::UnitId => Some(FieldValue::Integer(self.unit.into())),
            ColumnId::SiteId => Some(FieldValue::Integer(self.site.into())),
            ColumnId::AgencyId => Some(FieldValue::Integer(self.agency.into())),
            ColumnId::SourceId => Some(FieldValue::Integer(self.source.into())),
            ColumnId::Year => Some(FieldValue::Integer(self.year.into())),
            _ => None,
        }
    }

    fn remap(&mut self, remap: &StationRemap) {
        self.parameter = remap_id(&remap.parameter, self.parameter);
        self.unit = remap_id(&remap.unit, self.unit);
        self.site = remap_id(&remap.site, self.site);
        self.agency = remap_id(&remap.agency, self.agency);
        self.source = remap_id(&remap.source, self.source);
    }

    fn dictionaries_ref(dicts: &StationDictionaries) -> DictionariesRef<'_> {
        DictionariesRef::Station(dicts)
    }

    fn into_record(self) -> Record {
        Record::Station(self)
    }
}

/// A query result row, tagged by dataset kind.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Incident(IncidentRecord),
    Population(PopulationRecord),
    Station(StationRecord),
}

/// Rows returned by a range scan, in storage order.
pub type RowSet = Vec<Record>;

impl Record {
    pub fn kind(&self) -> DatasetKind {
        match self {
            Record::Incident(_) => DatasetKind::LegacyIncident,
            Record::Population(_) => DatasetKind::PopulationSeries,
            Record::Station(_) => DatasetKind::StationReading,
        }
    }

    pub fn year(&self) -> i32 {
        match self {
            Record::Incident(r) => r.year(),
            Record::Population(r) => r.year(),
            Record::Station(r) => r.year(),
        }
    }

    pub fn numeric_value(&self) -> f64 {
        match self {
            Record::Incident(r) => r.numeric_value(),
            Record::Population(r) => r.numeric_value(),
            Record::Station(r) => r.numeric_value(),
        }
    }

    /// Render the record with dictionary ids resolved back to their strings.
    pub fn display<'a>(&'a self, dicts: DictionariesRef<'a>) -> RecordDisplay<'a> {
        RecordDisplay {
            record: self,
            dicts,
        }
    }
}

pub struct RecordDisplay<'a> {
    record: &'a Record,
    dicts: DictionariesRef<'a>,
}

impl fmt::Display for RecordDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn name(dict: &crate::Dictionary, id: u32) -> &str {
            dict.resolve(id).unwrap_or("?")
        }

        match (self.record, self.dicts) {
            (Record::Incident(r), DictionariesRef::Incident(d)) => write!(
                f,
                "incident #{} '{}' {} acres, {} ({}, {}), contained {}",
                r.id,
                r.name,
                r.magnitude,
                r.year,
                name(&d.region, r.region),
                name(&d.cause, r.cause),
                r.closure_date
            ),
            (Record::Population(r), DictionariesRef::Population(d)) => write!(
                f,
                "{} ({}) {}: {}",
                name(&d.country_name, r.country_name),
                name(&d.country_code, r.country_code),
                r.year,
                r.population
            ),
            (Record::Station(r), DictionariesRef::Station(d)) => {
                write!(
                    f,
                    "{} @ ({}, {}) minute {}: {} = ",
                    name(&d.site, r.site),
                    r.latitude,
                    r.longitude,
                    r.utc_minutes,
                    name(&d.parameter, r.parameter),
                )?;
                match r.value {
                    Some(v) => write!(f, "{v} {}", name(&d.unit, r.unit)),
                    None => f.write_str("undefined"),
                }
            }
            (record, _) => write!(f, "{record:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    fn station_fields(value: &str) -> Vec<String> {
        fields(&[
            "34.05", "-118.24", "2020-06-01T00:00", "PM2.5", value, "UG/M3", value, "21", "1",
            "060371103", "South Coast AQMD", "840060371103",
        ])
    }

    #[test]
    fn station_row_parses_and_interns() {
        let mut dicts = StationDictionaries::default();
        let rec = StationRecord::from_fields(&station_fields("5.5"), &mut dicts).unwrap();
        assert_eq!(rec.value, Some(5.5));
        assert_eq!(rec.numeric_value(), 5.5);
        assert_eq!(rec.year, 2020);
        assert_eq!(rec.quality_index, Some(21));
        assert_eq!(dicts.parameter.resolve(rec.parameter), Some("PM2.5"));
        assert_eq!(dicts.agency.resolve(rec.agency), Some("South Coast AQMD"));
    }

    #[test]
    fn station_sentinel_is_undefined_not_zero() {
        let mut dicts = StationDictionaries::default();
        let rec = StationRecord::from_fields(&station_fields("-999"), &mut dicts).unwrap();
        assert_eq!(rec.value, None);
        assert_eq!(rec.raw_value, None);
        assert_eq!(rec.numeric_value(), 0.0);
        assert_eq!(rec.field(ColumnId::Value, &dicts), None);
        assert_eq!(rec.field(ColumnId::RawValue, &dicts), None);
    }

    #[test]
    fn malformed_station_row_leaves_dictionaries_untouched() {
        let mut dicts = StationDictionaries::default();
        assert_eq!(StationRecord::from_fields(&station_fields("oops"), &mut dicts), None);

        let mut bad_lat = station_fields("1");
        bad_lat[0] = "north".to_string();
        assert_eq!(StationRecord::from_fields(&bad_lat, &mut dicts), None);
        assert_eq!(StationRecord::from_fields(&bad_lat[..11], &mut dicts), None);

        assert!(dicts.parameter.is_empty());
        assert!(dicts.site.is_empty());
    }

    #[test]
    fn incident_header_row_is_rejected() {
        let mut dicts = IncidentDictionaries::default();
        let header = fields(&[
            "OBJECTID", "FIRE_NAME", "GIS_ACRES", "YEAR_", "UNIT_ID", "CAUSE", "CONT_DATE",
        ]);
        assert_eq!(IncidentRecord::from_fields(&header, &mut dicts), None);

        let row = fields(&["7", "CREEK", "379895.6", "2020", "FKU", "Lightning", "2020-12-24"]);
        let rec = IncidentRecord::from_fields(&row, &mut dicts).unwrap();
        assert_eq!(rec.numeric_value(), 379895.6);
        assert_eq!(rec.field(ColumnId::Cause, &dicts), Some(FieldValue::Text("Lightning")));
        assert_eq!(dicts.region.len(), 1);
    }

    #[test]
    fn population_row_unpivots_year_columns() {
        let header = fields(&[
            "Country Name", "Country Code", "Indicator Name", "Indicator Code", "2018", "2019",
            "note",
        ]);
        let years = YearColumns::from_header(&header);
        assert_eq!(years.len(), 2);

        let mut dicts = PopulationDictionaries::default();
        let mut out = Vec::new();
        let row = fields(&["A", "AAA", "Pop", "POP", "100", "200", "x"]);
        let dropped = PopulationRecord::unpivot(&row, &years, &mut dicts, |r| out.push(r));

        assert_eq!(dropped, 0);
        assert_eq!(
            out,
            vec![
                PopulationRecord {
                    country_name: 0,
                    country_code: 0,
                    indicator: 0,
                    year: 2018,
                    population: 100.0
                },
                PopulationRecord {
                    country_name: 0,
                    country_code: 0,
                    indicator: 0,
                    year: 2019,
                    population: 200.0
                },
            ]
        );
        assert_eq!(dicts.indicator.resolve(0), Some("Pop|POP"));
    }

    #[test]
    fn population_empty_and_bad_cells() {
        let header = fields(&["Country Name", "Country Code", "I", "C", "2000", "2001"]);
        let years = YearColumns::from_header(&header);
        let mut dicts = PopulationDictionaries::default();
        let mut out = Vec::new();

        let empty = fields(&["B", "BBB", "Pop", "POP", "", ""]);
        assert_eq!(PopulationRecord::unpivot(&empty, &years, &mut dicts, |r| out.push(r)), 0);
        assert!(out.is_empty());
        assert!(dicts.country_name.is_empty());

        let bad = fields(&["B", "BBB", "Pop", "POP", "n/a", "7"]);
        assert_eq!(PopulationRecord::unpivot(&bad, &years, &mut dicts, |r| out.push(r)), 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].year, 2001);
    }

    #[test]
    fn remap_rewrites_every_id() {
        let mut rec = PopulationRecord {
            country_name: 0,
            country_code: 1,
            indicator: 0,
            year: 2000,
            population: 1.0,
        };
        rec.remap(&PopulationRemap {
            country_name: vec![5],
            country_code: vec![3, 4],
            indicator: vec![9],
        });
        assert_eq!((rec.country_name, rec.country_code, rec.indicator), (5, 4, 9));
    }

    #[test]
    fn records_serialize_with_kind_tag() {
        let rec = Record::Population(PopulationRecord {
            country_name: 0,
            country_code: 0,
            indicator: 0,
            year: 2019,
            population: 200.0,
        });
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["kind"], "population");
        assert_eq!(json["year"], 2019);
    }
}
