use quarry_model::{
    remap_id, ColumnId, PopulationDictionaries, PopulationRecord, PopulationRemap,
};

use crate::{ColumnRef, ColumnarLayout};

/// Unpivoted population series: one row per (country, year).
#[derive(Clone, Debug, Default)]
pub struct PopulationColumns {
    country_name: Vec<u32>,
    country_code: Vec<u32>,
    indicator: Vec<u32>,
    year: Vec<i32>,
    population: Vec<f64>,
}

impl ColumnarLayout for PopulationColumns {
    type Record = PopulationRecord;

    fn len(&self) -> usize {
        self.population.len()
    }

    fn push(&mut self, record: &PopulationRecord) {
        self.country_name.push(record.country_name);
        self.country_code.push(record.country_code);
        self.indicator.push(record.indicator);
        self.year.push(record.year);
        self.population.push(record.population);
    }

    fn append_remapped(&mut self, shard: Self, remap: &PopulationRemap) {
        self.country_name.extend(
            shard
                .country_name
                .iter()
                .map(|&id| remap_id(&remap.country_name, id)),
        );
        self.country_code.extend(
            shard
                .country_code
                .iter()
                .map(|&id| remap_id(&remap.country_code, id)),
        );
        self.indicator.extend(
            shard
                .indicator
                .iter()
                .map(|&id| remap_id(&remap.indicator, id)),
        );
        self.year.extend(shard.year);
        self.population.extend(shard.population);
    }

    fn row(&self, index: usize) -> PopulationRecord {
        PopulationRecord {
            country_name: self.country_name[index],
            country_code: self.country_code[index],
            indicator: self.indicator[index],
            year: self.year[index],
            population: self.population[index],
        }
    }

    fn numeric_values(&self) -> &[f64] {
        &self.population
    }

    fn years(&self) -> &[i32] {
        &self.year
    }

    fn column<'a>(
        &'a self,
        column: ColumnId,
        _dicts: &'a PopulationDictionaries,
    ) -> Option<ColumnRef<'a>> {
        match column {
            ColumnId::Population | ColumnId::Value => Some(ColumnRef::Float(&self.population)),
            ColumnId::Year => Some(ColumnRef::Int32(&self.year)),
            ColumnId::CountryNameId => Some(ColumnRef::Id(&self.country_name)),
            ColumnId::CountryCodeId => Some(ColumnRef::Id(&self.country_code)),
            _ => None,
        }
    }

    fn is_aligned(&self) -> bool {
        let n = self.population.len();
        self.country_name.len() == n
            && self.country_code.len() == n
            && self.indicator.len() == n
            && self.year.len() == n
    }
}
