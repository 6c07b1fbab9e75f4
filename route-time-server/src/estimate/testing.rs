//! In-memory timing corpus for tests.

use std::cell::Cell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::domain::{DayCode, StopId};

use super::store::{Partition, TimingCorpus};

/// Timing corpus held in memory, counting partition reads.
#[derive(Default)]
pub struct MemoryCorpus {
    partitions: HashMap<PathBuf, Partition>,
    reads: Cell<usize>,
}

impl MemoryCorpus {
    /// Record a raw sample for `origin → dest` on `day` at `hour`.
    pub fn insert(&mut self, day: DayCode, hour: u8, origin: &str, dest: &str, secs: f64) {
        let path = self.partition_path(day, hour, StopId::from(origin).prefix());
        self.partitions
            .entry(path)
            .or_default()
            .entry(origin.to_string())
            .or_default()
            .insert(dest.to_string(), secs);
    }

    /// Record the same sample for every hour of every day.
    pub fn insert_everywhere(&mut self, origin: &str, dest: &str, secs: f64) {
        for day in DayCode::ALL {
            for hour in 0..24 {
                self.insert(day, hour, origin, dest, secs);
            }
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.get()
    }
}

impl TimingCorpus for MemoryCorpus {
    fn partition_path(&self, day: DayCode, hour: u8, prefix: &str) -> PathBuf {
        PathBuf::from(format!("{}/{:02}/{}", day.code(), hour, prefix))
    }

    fn read_partition(&self, path: &Path) -> Option<Partition> {
        self.reads.set(self.reads.get() + 1);
        self.partitions.get(path).cloned()
    }
}

/// Build stop ids from string literals.
pub fn stops(ids: &[&str]) -> Vec<StopId> {
    ids.iter().map(|id| StopId::from(*id)).collect()
}
