use quarry_model::{remap_id, ColumnId, StationDictionaries, StationRecord, StationRemap};

use crate::{BitVec, ColumnRef, ColumnarLayout};

/// Station readings.
///
/// Optional measurements store `0` in undefined slots and clear the matching validity bit, so
/// `value` doubles as the unified metric (`value.unwrap_or(0.0)`).
#[derive(Clone, Debug, Default)]
pub struct StationColumns {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    utc_minutes: Vec<i64>,
    parameter: Vec<u32>,
    value: Vec<f64>,
    value_valid: BitVec,
    unit: Vec<u32>,
    raw_value: Vec<f64>,
    raw_value_valid: BitVec,
    quality_index: Vec<i16>,
    quality_index_valid: BitVec,
    category: Vec<u8>,
    site: Vec<u32>,
    agency: Vec<u32>,
    source: Vec<u32>,
    year: Vec<i32>,
}

fn remap_into(dst: &mut Vec<u32>, src: &[u32], remap: &[u32]) {
    dst.extend(src.iter().map(|&id| remap_id(remap, id)));
}

impl ColumnarLayout for StationColumns {
    type Record = StationRecord;

    fn len(&self) -> usize {
        self.latitude.len()
    }

    fn push(&mut self, record: &StationRecord) {
        self.latitude.push(record.latitude);
        self.longitude.push(record.longitude);
        self.utc_minutes.push(record.utc_minutes);
        self.parameter.push(record.parameter);
        self.value.push(record.value.unwrap_or(0.0));
        self.value_valid.push(record.value.is_some());
        self.unit.push(record.unit);
        self.raw_value.push(record.raw_value.unwrap_or(0.0));
        self.raw_value_valid.push(record.raw_value.is_some());
        self.quality_index.push(record.quality_index.unwrap_or(0));
        self.quality_index_valid
            .push(record.quality_index.is_some());
        self.category.push(record.category);
        self.site.push(record.site);
        self.agency.push(record.agency);
        self.source.push(record.source);
        self.year.push(record.year);
    }

    fn append_remapped(&mut self, shard: Self, remap: &StationRemap) {
        self.latitude.extend(shard.latitude);
        self.longitude.extend(shard.longitude);
        self.utc_minutes.extend(shard.utc_minutes);
        remap_into(&mut self.parameter, &shard.parameter, &remap.parameter);
        self.value.extend(shard.value);
        self.value_valid.append(&shard.value_valid);
        remap_into(&mut self.unit, &shard.unit, &remap.unit);
        self.raw_value.extend(shard.raw_value);
        self.raw_value_valid.append(&shard.raw_value_valid);
        self.quality_index.extend(shard.quality_index);
        self.quality_index_valid
            .append(&shard.quality_index_valid);
        self.category.extend(shard.category);
        remap_into(&mut self.site, &shard.site, &remap.site);
        remap_into(&mut self.agency, &shard.agency, &remap.agency);
        remap_into(&mut self.source, &shard.source, &remap.source);
        self.year.extend(shard.year);
    }

    fn row(&self, index: usize) -> StationRecord {
        StationRecord {
            latitude: self.latitude[index],
            longitude: self.longitude[index],
            utc_minutes: self.utc_minutes[index],
            parameter: self.parameter[index],
            value: self.value_valid.get(index).then(|| self.value[index]),
            unit: self.unit[index],
            raw_value: self
                .raw_value_valid
                .get(index)
                .then(|| self.raw_value[index]),
            quality_index: self
                .quality_index_valid
                .get(index)
                .then(|| self.quality_index[index]),
            category: self.category[index],
            site: self.site[index],
            agency: self.agency[index],
            source: self.source[index],
            year: self.year[index],
        }
    }

    fn numeric_values(&self) -> &[f64] {
        &self.value
    }

    fn years(&self) -> &[i32] {
        &self.year
    }

    fn column<'a>(
        &'a self,
        column: ColumnId,
        _dicts: &'a StationDictionaries,
    ) -> Option<ColumnRef<'a>> {
        let col = match column {
            ColumnId::Value => ColumnRef::OptionalFloat {
                values: &self.value,
                validity: &self.value_valid,
            },
            ColumnId::RawValue => ColumnRef::OptionalFloat {
                values: &self.raw_value,
                validity: &self.raw_value_valid,
            },
            ColumnId::QualityIndex => ColumnRef::Int16 {
                values: &self.quality_index,
                validity: &self.quality_index_valid,
            },
            ColumnId::Category => ColumnRef::UInt8(&self.category),
            ColumnId::Latitude => ColumnRef::Float(&self.latitude),
            ColumnId::Longitude => ColumnRef::Float(&self.longitude),
            ColumnId::UtcMinutes => ColumnRef::Int64(&self.utc_minutes),
            ColumnId::ParameterId => ColumnRef::Id(&self.parameter),
            ColumnId::UnitId => ColumnRef::Id(&self.unit),
            ColumnId::SiteId => ColumnRef::Id(&self.site),
            ColumnId::AgencyId => ColumnRef::Id(&self.agency),
            ColumnId::SourceId => ColumnRef::Id(&self.source),
            ColumnId::Year => ColumnRef::Int32(&self.year),
            _ => return None,
        };
        Some(col)
    }

    fn is_aligned(&self) -> bool {
        let n = self.latitude.len();
        [
            self.longitude.len(),
            self.utc_minutes.len(),
            self.parameter.len(),
            self.value.len(),
            self.value_valid.len(),
            self.unit.len(),
            self.raw_value.len(),
            self.raw_value_valid.len(),
            self.quality_index.len(),
            self.quality_index_valid.len(),
            self.category.len(),
            self.site.len(),
            self.agency.len(),
            self.source.len(),
            self.year.len(),
        ]
        .iter()
        .all(|&len| len == n)
    }
}
