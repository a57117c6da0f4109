//! Single-writer reduction of scanned records into survivors.

use super::AggregateStats;
use crate::core::metadata::FileRecord;
use crossbeam_channel::Receiver;
use std::collections::hash_map::Entry;
use std::collections::HashMap;

/// Whether `incoming` should replace the current survivor of its group.
///
/// Having a creation time beats not having one. With equal metadata
/// status the larger file wins. Exact ties keep the existing survivor.
pub fn should_replace(incoming: &FileRecord, existing: &FileRecord) -> bool {
    match (incoming.has_metadata(), existing.has_metadata()) {
        (true, false) => true,
        (false, true) => false,
        _ => incoming.size > existing.size,
    }
}

/// What the reducer did with an offered record
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// First record of its group
    Inserted,
    /// Became the survivor; carries the record it displaced
    Replaced(FileRecord),
    /// Lost to the current survivor
    Rejected(FileRecord),
}

/// Final, read-only mapping from group key to survivor
#[derive(Debug, Clone, Default)]
pub struct SurvivorMap {
    survivors: HashMap<String, FileRecord>,
}

impl SurvivorMap {
    pub fn get(&self, key: &str) -> Option<&FileRecord> {
        self.survivors.get(key)
    }

    pub fn len(&self) -> usize {
        self.survivors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.survivors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FileRecord)> {
        self.survivors.iter()
    }

    pub fn records(&self) -> impl Iterator<Item = &FileRecord> {
        self.survivors.values()
    }

    /// Survivors ordered by path, for stable output
    pub fn sorted(&self) -> Vec<&FileRecord> {
        let mut records: Vec<_> = self.survivors.values().collect();
        records.sort_by(|a, b| a.path.cmp(&b.path));
        records
    }
}

/// The reducer's final snapshot
#[derive(Debug, Clone, Default)]
pub struct Reduction {
    pub survivors: SurvivorMap,
    pub stats: AggregateStats,
}

/// Folds records into one survivor per group.
///
/// Owned by a single consumer. The stats always agree with the map.
#[derive(Debug, Default)]
pub struct DedupReducer {
    dedup: bool,
    survivors: HashMap<String, FileRecord>,
    stats: AggregateStats,
}

impl DedupReducer {
    /// Create a reducer. With `dedup` off every record is its own group.
    pub fn new(dedup: bool) -> Self {
        Self {
            dedup,
            survivors: HashMap::new(),
            stats: AggregateStats::default(),
        }
    }

    /// Key a record is grouped under
    fn key_for(&self, record: &FileRecord) -> String {
        if self.dedup {
            record.group_key.clone()
        } else {
            record.path.to_string_lossy().into_owned()
        }
    }

    /// Reduce one record
    pub fn offer(&mut self, record: FileRecord) -> Decision {
        let key = self.key_for(&record);
        self.stats.record_seen(&record);

        match self.survivors.entry(key) {
            Entry::Vacant(slot) => {
                self.stats.add_survivor(&record);
                slot.insert(record);
                Decision::Inserted
            }
            Entry::Occupied(mut slot) => {
                if self.dedup && should_replace(&record, slot.get()) {
                    self.stats.remove_survivor(slot.get());
                    self.stats.add_survivor(&record);
                    Decision::Replaced(slot.insert(record))
                } else {
                    Decision::Rejected(record)
                }
            }
        }
    }

    /// Drain a results queue until every sender has gone away
    pub fn consume(mut self, records: &Receiver<FileRecord>) -> Reduction {
        for record in records.iter() {
            match self.offer(record) {
                Decision::Replaced(previous) => {
                    tracing::trace!("{} replaced as survivor", previous.path.display());
                }
                Decision::Rejected(rejected) => {
                    tracing::trace!("{} is a duplicate", rejected.path.display());
                }
                Decision::Inserted => {}
            }
        }
        self.finish()
    }

    /// Current totals
    pub fn stats(&self) -> &AggregateStats {
        &self.stats
    }

    /// Freeze the reducer into its final snapshot
    pub fn finish(self) -> Reduction {
        Reduction {
            survivors: SurvivorMap {
                survivors: self.survivors,
            },
            stats: self.stats,
        }
    }
}
