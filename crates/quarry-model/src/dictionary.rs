use std::collections::HashMap;
use std::sync::Arc;

/// Dense string interner used for categorical fields.
///
/// Ids are assigned in first-seen order starting at 0. The reverse vector is kept in lockstep
/// with the forward map, so `resolve(get_or_add(k)) == Some(k)` for every key ever inserted.
/// There is no removal.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dictionary {
    ids: HashMap<Arc<str>, u32>,
    keys: Vec<Arc<str>>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Return the id for `key`, assigning the next dense id if it has not been seen yet.
    pub fn get_or_add(&mut self, key: &str) -> u32 {
        if let Some(id) = self.ids.get(key) {
            return *id;
        }

        let id = self.keys.len() as u32;
        let key: Arc<str> = Arc::from(key);
        self.keys.push(key.clone());
        self.ids.insert(key, id);
        id
    }

    pub fn lookup(&self, key: &str) -> Option<u32> {
        self.ids.get(key).copied()
    }

    /// Reverse lookup. Out-of-range ids resolve to `None`.
    pub fn resolve(&self, id: u32) -> Option<&str> {
        self.keys.get(id as usize).map(|k| k.as_ref())
    }

    /// Keys in id order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.keys.iter().map(|k| k.as_ref())
    }

    /// Union-insert every key of `shard` (in the shard's id order) and return the remap table
    /// `shard id -> id in self`.
    pub fn absorb(&mut self, shard: &Dictionary) -> Vec<u32> {
        shard.keys.iter().map(|k| self.get_or_add(k)).collect()
    }

    /// Merge shard dictionaries in the given order.
    ///
    /// The result only depends on shard order and each shard's first-seen order.
    pub fn merge<'a>(shards: impl IntoIterator<Item = &'a Dictionary>) -> Dictionary {
        let mut merged = Dictionary::new();
        for shard in shards {
            merged.absorb(shard);
        }
        merged
    }
}

/// Rewrite a shard-local id through a remap table produced by [`Dictionary::absorb`].
#[inline]
pub fn remap_id(remap: &[u32], id: u32) -> u32 {
    debug_assert!(
        (id as usize) < remap.len(),
        "id {id} outside a remap table of {} entries",
        remap.len()
    );
    remap.get(id as usize).copied().unwrap_or(id)
}

/// A family of dictionaries owned by one backend (or one ingestion shard).
pub trait DictionarySet: Clone + Default + Send + Sync + 'static {
    /// Per-dictionary remap tables produced by [`DictionarySet::absorb`].
    type Remap: Send + Sync;

    fn absorb(&mut self, shard: &Self) -> Self::Remap;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IncidentDictionaries {
    pub region: Dictionary,
    pub cause: Dictionary,
}

#[derive(Clone, Debug, Default)]
pub struct IncidentRemap {
    pub region: Vec<u32>,
    pub cause: Vec<u32>,
}

impl DictionarySet for IncidentDictionaries {
    type Remap = IncidentRemap;

    fn absorb(&mut self, shard: &Self) -> IncidentRemap {
        IncidentRemap {
            region: self.region.absorb(&shard.region),
            cause: self.cause.absorb(&shard.cause),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PopulationDictionaries {
    pub country_name: Dictionary,
    pub country_code: Dictionary,
    /// Indicator name and code joined as `name|code`.
    pub indicator: Dictionary,
}

#[derive(Clone, Debug, Default)]
pub struct PopulationRemap {
    pub country_name: Vec<u32>,
    pub country_code: Vec<u32>,
    pub indicator: Vec<u32>,
}

impl DictionarySet for PopulationDictionaries {
    type Remap = PopulationRemap;

    fn absorb(&mut self, shard: &Self) -> PopulationRemap {
        PopulationRemap {
            country_name: self.country_name.absorb(&shard.country_name),
            country_code: self.country_code.absorb(&shard.country_code),
            indicator: self.indicator.absorb(&shard.indicator),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StationDictionaries {
    pub parameter: Dictionary,
    pub unit: Dictionary,
    pub site: Dictionary,
    pub agency: Dictionary,
    pub source: Dictionary,
}

#[derive(Clone, Debug, Default)]
pub struct StationRemap {
    pub parameter: Vec<u32>,
    pub unit: Vec<u32>,
    pub site: Vec<u32>,
    pub agency: Vec<u32>,
    pub source: Vec<u32>,
}

impl DictionarySet for StationDictionaries {
    type Remap = StationRemap;

    fn absorb(&mut self, shard: &Self) -> StationRemap {
        StationRemap {
            parameter: self.parameter.absorb(&shard.parameter),
            unit: self.unit.absorb(&shard.unit),
            site: self.site.absorb(&shard.site),
            agency: self.agency.absorb(&shard.agency),
            source: self.source.absorb(&shard.source),
        }
    }
}

/// Borrowed view over whichever dictionary set a backend owns.
#[derive(Clone, Copy, Debug)]
pub enum DictionariesRef<'a> {
    Incident(&'a IncidentDictionaries),
    Population(&'a PopulationDictionaries),
    Station(&'a StationDictionaries),
}

impl<'a> DictionariesRef<'a> {
    /// Every dictionary of the set, labelled by field name.
    pub fn named(&self) -> Vec<(&'static str, &'a Dictionary)> {
        match *self {
            DictionariesRef::Incident(d) => vec![("region", &d.region), ("cause", &d.cause)],
            DictionariesRef::Population(d) => vec![
                ("country_name", &d.country_name),
                ("country_code", &d.country_code),
                ("indicator", &d.indicator),
            ],
            DictionariesRef::Station(d) => vec![
                ("parameter", &d.parameter),
                ("unit", &d.unit),
                ("site", &d.site),
                ("agency", &d.agency),
                ("source", &d.source),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn remap_rewrites_shard_ids() {
        let mut merged = Dictionary::new();
        merged.get_or_add("LNU");
        let mut shard = Dictionary::new();
        shard.get_or_add("FKU");
        shard.get_or_add("LNU");
        let remap = merged.absorb(&shard);
        assert_eq!(remap_id(&remap, 0), 1);
        assert_eq!(remap_id(&remap, 1), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "outside a remap table")]
    fn remap_rejects_ids_from_another_shard() {
        remap_id(&[0, 1], 2);
    }

    #[test]
    fn ids_are_dense_in_first_seen_order() {
        let mut dict = Dictionary::new();
        assert_eq!(dict.get_or_add("PM2.5"), 0);
        assert_eq!(dict.get_or_add("OZONE"), 1);
        assert_eq!(dict.get_or_add("PM2.5"), 0);
        assert_eq!(dict.get_or_add("NO2"), 2);
        assert_eq!(dict.len(), 3);
        assert_eq!(dict.iter().collect::<Vec<_>>(), vec!["PM2.5", "OZONE", "NO2"]);
    }

    #[test]
    fn resolve_out_of_range_is_none() {
        let mut dict = Dictionary::new();
        dict.get_or_add("a");
        assert_eq!(dict.resolve(0), Some("a"));
        assert_eq!(dict.resolve(1), None);
        assert_eq!(dict.resolve(u32::MAX), None);
    }

    #[test]
    fn absorb_returns_remap_into_merged_ids() {
        let mut merged = Dictionary::new();
        merged.get_or_add("x");
        merged.get_or_add("y");

        let mut shard = Dictionary::new();
        shard.get_or_add("y");
        shard.get_or_add("z");

        let remap = merged.absorb(&shard);
        assert_eq!(remap, vec![1, 2]);
        assert_eq!(merged.resolve(remap_id(&remap, 1)), Some("z"));
    }

    #[test]
    fn merge_depends_only_on_shard_order() {
        let build = |keys: &[&str]| {
            let mut d = Dictionary::new();
            for k in keys {
                d.get_or_add(k);
            }
            d
        };
        let a = build(&["b", "a"]);
        let b = build(&["c", "a", "d"]);

        let merged = Dictionary::merge([&a, &b]);
        assert_eq!(merged.iter().collect::<Vec<_>>(), vec!["b", "a", "c", "d"]);

        let again = Dictionary::merge([&a, &b]);
        assert_eq!(merged, again);

        let swapped = Dictionary::merge([&b, &a]);
        assert_eq!(swapped.iter().collect::<Vec<_>>(), vec!["c", "a", "d", "b"]);
    }

    #[test]
    fn merging_shards_matches_serial_interning() {
        let chunks: [&[&str]; 3] = [&["k1", "k2"], &["k2", "k3"], &["k1", "k4"]];

        let mut serial = Dictionary::new();
        for chunk in chunks {
            for k in chunk {
                serial.get_or_add(k);
            }
        }

        let shards: Vec<Dictionary> = chunks
            .iter()
            .map(|chunk| {
                let mut d = Dictionary::new();
                for k in *chunk {
                    d.get_or_add(k);
                }
                d
            })
            .collect();

        assert_eq!(Dictionary::merge(shards.iter()), serial);
    }

    proptest! {
        #[test]
        fn get_or_add_is_stable_and_reversible(keys in proptest::collection::vec("[a-e]{0,3}", 0..64)) {
            let mut dict = Dictionary::new();
            let ids: Vec<u32> = keys.iter().map(|k| dict.get_or_add(k)).collect();

            for (k, id) in keys.iter().zip(&ids) {
                prop_assert_eq!(dict.get_or_add(k), *id);
                prop_assert_eq!(dict.resolve(*id), Some(k.as_str()));
            }
            for (i, a) in keys.iter().enumerate() {
                for (j, b) in keys.iter().enumerate() {
                    if a != b {
                        prop_assert_ne!(ids[i], ids[j]);
                    }
                }
            }
            prop_assert!(ids.iter().all(|id| (*id as usize) < dict.len()));
        }
    }
}
