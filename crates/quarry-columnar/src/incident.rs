use std::sync::Arc;

use quarry_model::{
    remap_id, ColumnId, IncidentDictionaries, IncidentRecord, IncidentRemap,
};

use crate::{ColumnRef, ColumnarLayout};

#[derive(Clone, Debug, Default)]
pub struct IncidentColumns {
    id: Vec<i64>,
    name: Vec<Arc<str>>,
    magnitude: Vec<f64>,
    year: Vec<i32>,
    region: Vec<u32>,
    cause: Vec<u32>,
    closure_date: Vec<Arc<str>>,
}

impl ColumnarLayout for IncidentColumns {
    type Record = IncidentRecord;

    fn len(&self) -> usize {
        self.id.len()
    }

    fn push(&mut self, record: &IncidentRecord) {
        self.id.push(record.id);
        self.name.push(record.name.clone());
        self.magnitude.push(record.magnitude);
        self.year.push(record.year);
        self.region.push(record.region);
        self.cause.push(record.cause);
        self.closure_date.push(record.closure_date.clone());
    }

    fn append_remapped(&mut self, shard: Self, remap: &IncidentRemap) {
        self.id.extend(shard.id);
        self.name.extend(shard.name);
        self.magnitude.extend(shard.magnitude);
        self.year.extend(shard.year);
        self.region
            .extend(shard.region.iter().map(|&id| remap_id(&remap.region, id)));
        self.cause
            .extend(shard.cause.iter().map(|&id| remap_id(&remap.cause, id)));
        self.closure_date.extend(shard.closure_date);
    }

    fn row(&self, index: usize) -> IncidentRecord {
        IncidentRecord {
            id: self.id[index],
            name: self.name[index].clone(),
            magnitude: self.magnitude[index],
            year: self.year[index],
            region: self.region[index],
            cause: self.cause[index],
            closure_date: self.closure_date[index].clone(),
        }
    }

    fn numeric_values(&self) -> &[f64] {
        &self.magnitude
    }

    fn years(&self) -> &[i32] {
        &self.year
    }

    fn column<'a>(
        &'a self,
        column: ColumnId,
        dicts: &'a IncidentDictionaries,
    ) -> Option<ColumnRef<'a>> {
        let col = match column {
            ColumnId::IncidentId => ColumnRef::Int64(&self.id),
            ColumnId::IncidentName => ColumnRef::Text(&self.name),
            ColumnId::Value => ColumnRef::Float(&self.magnitude),
            ColumnId::Year => ColumnRef::Int32(&self.year),
            ColumnId::Region => ColumnRef::Dictionary {
                ids: &self.region,
                dictionary: &dicts.region,
            },
            ColumnId::Cause => ColumnRef::Dictionary {
                ids: &self.cause,
                dictionary: &dicts.cause,
            },
            ColumnId::ClosureDate => ColumnRef::Text(&self.closure_date),
            _ => return None,
        };
        Some(col)
    }

    fn is_aligned(&self) -> bool {
        let n = self.id.len();
        [
            self.name.len(),
            self.magnitude.len(),
            self.year.len(),
            self.region.len(),
            self.cause.len(),
            self.closure_date.len(),
        ]
        .iter()
        .all(|&len| len == n)
    }
}
