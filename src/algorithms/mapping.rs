use crate::models::RatingRecord;
use std::collections::HashMap;

/// Result of translating a raw identifier into the training index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lookup {
    Known(usize),
    Unknown,
}

impl Lookup {
    pub fn is_known(self) -> bool {
        matches!(self, Lookup::Known(_))
    }
}

/// Dense zero-based indices for the distinct identifiers of one entity kind,
/// assigned in first-seen order. Frozen once built.
#[derive(Debug, Clone, Default)]
pub struct IdentifierMap {
    index: HashMap<String, usize>,
}

impl IdentifierMap {
    pub fn from_ids<'a, I>(ids: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut map = Self::default();
        for id in ids {
            if !map.index.contains_key(id) {
                let next = map.index.len();
                map.index.insert(id.to_string(), next);
            }
        }
        map
    }

    pub fn lookup(&self, id: &str) -> Lookup {
        match self.index.get(id) {
            Some(&index) => Lookup::Known(index),
            None => Lookup::Unknown,
        }
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

/// User and item maps built from the same training set.
#[derive(Debug, Clone, Default)]
pub struct EntityMaps {
    pub users: IdentifierMap,
    pub items: IdentifierMap,
}

impl EntityMaps {
    pub fn from_training(training: &[RatingRecord]) -> Self {
        Self {
            users: IdentifierMap::from_ids(training.iter().map(|r| r.user_id.as_str())),
            items: IdentifierMap::from_ids(training.iter().map(|r| r.item_id.as_str())),
        }
    }

    pub fn lookup_pair(&self, user_id: &str, item_id: &str) -> (Lookup, Lookup) {
        (self.users.lookup(user_id), self.items.lookup(item_id))
    }

    /// Translates training records. Every id is known by construction.
    pub fn index_training(&self, training: &[RatingRecord]) -> Vec<IndexedRating> {
        training
            .iter()
            .filter_map(|record| match self.lookup_pair(&record.user_id, &record.item_id) {
                (Lookup::Known(user), Lookup::Known(item)) => Some(IndexedRating {
                    user,
                    item,
                    rating: record.rating,
                }),
                _ => None,
            })
            .collect()
    }

    pub fn index_validation(&self, validation: &[RatingRecord]) -> Vec<ValidationSample> {
        validation
            .iter()
            .map(|record| {
                let (user, item) = self.lookup_pair(&record.user_id, &record.item_id);
                ValidationSample {
                    user,
                    item,
                    rating: record.rating,
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedRating {
    pub user: usize,
    pub item: usize,
    pub rating: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidationSample {
    pub user: Lookup,
    pub item: Lookup,
    pub rating: f64,
}
