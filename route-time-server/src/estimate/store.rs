//! Segment travel-time lookups over the historical timing corpus.
//!
//! The corpus is partitioned by day, hour and the first two characters of
//! the origin stop id. A [`SegmentStore`] reads each partition at most once
//! and keeps it for the lifetime of the store, which is one estimation.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, trace};

use crate::domain::{DayCode, StopId};

/// Parsed partition: origin stop id → destination stop id → seconds.
pub type Partition = HashMap<String, HashMap<String, f64>>;

/// Read access to the timing corpus.
pub trait TimingCorpus {
    /// Location of the partition holding samples for origins starting with
    /// `prefix`, on `day` at `hour`.
    fn partition_path(&self, day: DayCode, hour: u8, prefix: &str) -> PathBuf;

    /// Read and parse one partition. `None` when missing or unreadable.
    fn read_partition(&self, path: &Path) -> Option<Partition>;
}

/// Timing corpus stored as JSON files under a root directory.
///
/// Layout: `<root>/<day code>/<HH>/<prefix>.json`.
#[derive(Debug, Clone)]
pub struct FileCorpus {
    root: PathBuf,
}

impl FileCorpus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TimingCorpus for FileCorpus {
    fn partition_path(&self, day: DayCode, hour: u8, prefix: &str) -> PathBuf {
        self.root
            .join(day.code())
            .join(format!("{hour:02}"))
            .join(format!("{prefix}.json"))
    }

    fn read_partition(&self, path: &Path) -> Option<Partition> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                trace!(path = %path.display(), "no partition");
                return None;
            }
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unreadable partition");
                return None;
            }
        };

        match parse_partition(&bytes) {
            Ok(partition) => Some(partition),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unparseable partition");
                None
            }
        }
    }
}

/// Parse partition JSON, dropping any non-numeric sample.
///
/// An origin whose value is not an object is skipped; the rest of the
/// partition is kept.
pub fn parse_partition(bytes: &[u8]) -> Result<Partition, serde_json::Error> {
    let raw: HashMap<String, Value> = serde_json::from_slice(bytes)?;
    Ok(raw
        .into_iter()
        .filter_map(|(origin, dests)| {
            let Value::Object(dests) = dests else {
                trace!(origin = %origin, "skipping malformed origin");
                return None;
            };
            let samples = dests
                .into_iter()
                .filter_map(|(dest, secs)| secs.as_f64().map(|s| (dest, s)))
                .collect();
            Some((origin, samples))
        })
        .collect())
}

/// Read-through cache of corpus partitions for a single estimation.
///
/// Not shared between requests; drop it when the estimation is done.
pub struct SegmentStore<'c, C: ?Sized> {
    corpus: &'c C,
    partitions: HashMap<PathBuf, Option<Partition>>,
}

impl<'c, C: TimingCorpus + ?Sized> SegmentStore<'c, C> {
    pub fn new(corpus: &'c C) -> Self {
        Self {
            corpus,
            partitions: HashMap::new(),
        }
    }

    /// Known travel time in seconds from `origin` to `dest` on `day` at `hour`.
    ///
    /// Missing partitions, missing pairs and non-positive samples are all
    /// reported as `None`.
    pub fn lookup(&mut self, day: DayCode, hour: u8, origin: &StopId, dest: &StopId) -> Option<f64> {
        let corpus = self.corpus;
        let path = corpus.partition_path(day, hour, origin.prefix());
        let partition = self
            .partitions
            .entry(path)
            .or_insert_with_key(|path| corpus.read_partition(path));

        partition
            .as_ref()?
            .get(origin.as_str())?
            .get(dest.as_str())
            .copied()
            .filter(|secs| *secs > 0.0)
    }

    /// Number of partitions read so far, present or not.
    pub fn partitions_read(&self) -> usize {
        self.partitions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimate::testing::MemoryCorpus;
    use tempfile::tempdir;

    fn write(root: &Path, day: &str, hour: &str, prefix: &str, contents: &str) {
        let dir = root.join(day).join(hour);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{prefix}.json")), contents).unwrap();
    }

    #[test]
    fn partition_path_layout() {
        let corpus = FileCorpus::new("/data/times_hourly");
        assert_eq!(
            corpus.partition_path(DayCode::Monday, 7, "AB"),
            PathBuf::from("/data/times_hourly/1/07/AB.json")
        );
        assert_eq!(
            corpus.partition_path(DayCode::Sunday, 23, "9F"),
            PathBuf::from("/data/times_hourly/0/23/9F.json")
        );
    }

    #[test]
    fn reads_samples_from_disk() {
        let dir = tempdir().unwrap();
        write(dir.path(), "1", "08", "AB", r#"{"AB01": {"CD02": 95.5, "CD03": 0}}"#);

        let corpus = FileCorpus::new(dir.path());
        let mut store = SegmentStore::new(&corpus);
        let ab01 = StopId::from("AB01");

        assert_eq!(
            store.lookup(DayCode::Monday, 8, &ab01, &StopId::from("CD02")),
            Some(95.5)
        );
        // zero is not a sample
        assert_eq!(
            store.lookup(DayCode::Monday, 8, &ab01, &StopId::from("CD03")),
            None
        );
        assert_eq!(
            store.lookup(DayCode::Monday, 8, &ab01, &StopId::from("ZZ99")),
            None
        );
        // other hour, other day
        assert_eq!(
            store.lookup(DayCode::Monday, 9, &ab01, &StopId::from("CD02")),
            None
        );
        assert_eq!(
            store.lookup(DayCode::Tuesday, 8, &ab01, &StopId::from("CD02")),
            None
        );
    }

    #[test]
    fn unparseable_partition_is_absent() {
        let dir = tempdir().unwrap();
        write(dir.path(), "2", "10", "AB", "{not json");

        let corpus = FileCorpus::new(dir.path());
        let mut store = SegmentStore::new(&corpus);
        assert_eq!(
            store.lookup(DayCode::Tuesday, 10, &StopId::from("AB01"), &StopId::from("CD02")),
            None
        );
    }

    #[test]
    fn non_numeric_samples_are_dropped() {
        let partition =
            parse_partition(br#"{"AB01": {"CD02": "fast", "CD03": null, "CD04": 61}}"#).unwrap();
        let dests = &partition["AB01"];
        assert_eq!(dests.len(), 1);
        assert_eq!(dests["CD04"], 61.0);
    }

    #[test]
    fn malformed_origin_keeps_other_origins() {
        let contents = r#"{"AB01": {"CD02": 95.5}, "AB99": [1, 2], "AB98": "x"}"#;

        let partition = parse_partition(contents.as_bytes()).unwrap();
        assert_eq!(partition.len(), 1);
        assert_eq!(partition["AB01"]["CD02"], 95.5);

        let dir = tempdir().unwrap();
        write(dir.path(), "1", "08", "AB", contents);
        let corpus = FileCorpus::new(dir.path());
        let mut store = SegmentStore::new(&corpus);
        assert_eq!(
            store.lookup(DayCode::Monday, 8, &StopId::from("AB01"), &StopId::from("CD02")),
            Some(95.5)
        );
        assert_eq!(
            store.lookup(DayCode::Monday, 8, &StopId::from("AB99"), &StopId::from("CD02")),
            None
        );
    }

    #[test]
    fn negative_samples_are_absent() {
        let mut corpus = MemoryCorpus::default();
        corpus.insert(DayCode::Friday, 17, "AB01", "AB02", -30.0);

        let mut store = SegmentStore::new(&corpus);
        assert_eq!(
            store.lookup(DayCode::Friday, 17, &StopId::from("AB01"), &StopId::from("AB02")),
            None
        );
    }

    #[test]
    fn each_partition_is_read_once() {
        let mut corpus = MemoryCorpus::default();
        corpus.insert(DayCode::Monday, 8, "AB01", "AB02", 60.0);
        corpus.insert(DayCode::Monday, 8, "AB02", "AB03", 70.0);

        let mut store = SegmentStore::new(&corpus);
        let (a, b, c) = (StopId::from("AB01"), StopId::from("AB02"), StopId::from("AB03"));

        assert_eq!(store.lookup(DayCode::Monday, 8, &a, &b), Some(60.0));
        assert_eq!(store.lookup(DayCode::Monday, 8, &b, &c), Some(70.0));
        assert_eq!(store.lookup(DayCode::Monday, 8, &a, &b), Some(60.0));
        assert_eq!(corpus.reads(), 1);

        // a missing partition is remembered too
        assert_eq!(store.lookup(DayCode::Monday, 9, &a, &b), None);
        assert_eq!(store.lookup(DayCode::Monday, 9, &a, &b), None);
        assert_eq!(corpus.reads(), 2);
        assert_eq!(store.partitions_read(), 2);
    }
}
