//! Streaming JSON record reader.
//!
//! The ingestion source writes one top-level JSON array holding every record
//! of a day, which can run to several GB.  [`for_each_record`] walks the array
//! element by element with a serde `SeqAccess` visitor, so at most one record
//! is held in memory at a time.
//!
//! Elements that are valid JSON but do not decode as a
//! [`TrajectoryRecord`] (missing fields, non-numeric strings) are skipped and
//! counted in [`LoadStats::malformed`].  Invalid JSON aborts the stream.

use std::fmt;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::de::{Deserializer, SeqAccess, Visitor};

use crate::{AggregateResult, TrajectoryRecord};

/// Counts reported by [`for_each_record`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Records decoded and passed to the callback.
    pub records:   u64,
    /// Array elements that failed to decode as a record.
    pub malformed: u64,
}

/// Stream every record of a top-level JSON array into `f`.
pub fn for_each_record<R, F>(reader: R, f: F) -> AggregateResult<LoadStats>
where
    R: Read,
    F: FnMut(TrajectoryRecord),
{
    let mut de = serde_json::Deserializer::from_reader(reader);
    let stats = (&mut de).deserialize_seq(RecordVisitor { f })?;
    de.end()?;
    if stats.malformed > 0 {
        log::debug!("skipped {} malformed records", stats.malformed);
    }
    Ok(stats)
}

/// Load every record from a JSON file.
pub fn load_records_json(path: &Path) -> AggregateResult<Vec<TrajectoryRecord>> {
    let file = std::fs::File::open(path)?;
    load_records_reader(BufReader::new(file))
}

/// Like [`load_records_json`] but accepts any `Read` source.
pub fn load_records_reader<R: Read>(reader: R) -> AggregateResult<Vec<TrajectoryRecord>> {
    let mut records = Vec::new();
    for_each_record(reader, |r| records.push(r))?;
    Ok(records)
}

// ── Visitor ───────────────────────────────────────────────────────────────────

struct RecordVisitor<F> {
    f: F,
}

impl<'de, F: FnMut(TrajectoryRecord)> Visitor<'de> for RecordVisitor<F> {
    type Value = LoadStats;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("an array of trajectory records")
    }

    fn visit_seq<A: SeqAccess<'de>>(mut self, mut seq: A) -> Result<LoadStats, A::Error> {
        let mut stats = LoadStats::default();
        while let Some(value) = seq.next_element::<serde_json::Value>()? {
            match serde_json::from_value::<TrajectoryRecord>(value) {
                Ok(record) => {
                    stats.records += 1;
                    (self.f)(record);
                }
                Err(e) => {
                    stats.malformed += 1;
                    log::trace!("malformed record: {e}");
                }
            }
        }
        Ok(stats)
    }
}
