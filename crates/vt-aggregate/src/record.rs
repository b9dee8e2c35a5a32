//! Raw trajectory records as emitted by the ingestion source.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "first_timestamp": 1668600000.04,
//!   "last_timestamp":  1668600012.00,
//!   "direction": -1,
//!   "length": 15.2,
//!   "timestamp":  [1668600000.04, 1668600000.08, ...],
//!   "x_position": [309850.1, 309846.9, ...],
//!   "y_position": [30.4, 30.5, ...]
//! }
//! ```
//!
//! Numeric values may be JSON numbers or numeric strings.  Unknown fields are
//! ignored.  `x_position` is in feet, `y_position` in feet from the median.

use serde::de::{self, Deserializer};
use serde::Deserialize;

/// One vehicle's observed path fragment.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct TrajectoryRecord {
    #[serde(deserialize_with = "number")]
    pub first_timestamp: f64,
    #[serde(deserialize_with = "number")]
    pub last_timestamp:  f64,
    #[serde(deserialize_with = "integer")]
    pub direction:       i32,
    #[serde(deserialize_with = "number")]
    pub length:          f64,
    #[serde(default, deserialize_with = "numbers")]
    pub timestamp:       Vec<f64>,
    #[serde(default, deserialize_with = "numbers")]
    pub x_position:      Vec<f64>,
    #[serde(default, deserialize_with = "numbers")]
    pub y_position:      Vec<f64>,
}

impl TrajectoryRecord {
    /// Build a record from `(timestamp, x_feet, y_feet)` samples.  First and
    /// last timestamps are taken from the samples.
    pub fn from_samples(direction: i32, length: f64, samples: &[(f64, f64, f64)]) -> Self {
        let timestamp: Vec<f64> = samples.iter().map(|s| s.0).collect();
        Self {
            first_timestamp: timestamp.first().copied().unwrap_or(f64::NAN),
            last_timestamp:  timestamp.last().copied().unwrap_or(f64::NAN),
            direction,
            length,
            x_position: samples.iter().map(|s| s.1).collect(),
            y_position: samples.iter().map(|s| s.2).collect(),
            timestamp,
        }
    }

    /// Number of samples, or `None` if the three arrays disagree in length.
    pub fn sample_count(&self) -> Option<usize> {
        let n = self.timestamp.len();
        (self.x_position.len() == n && self.y_position.len() == n).then_some(n)
    }

    /// `(timestamp, x_position, y_position)` triples.
    pub fn samples(&self) -> impl Iterator<Item = (f64, f64, f64)> + '_ {
        self.timestamp
            .iter()
            .zip(&self.x_position)
            .zip(&self.y_position)
            .map(|((&t, &x), &y)| (t, x, y))
    }
}

// ── Lenient numeric decoding ──────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum Numeric {
    Num(f64),
    Str(String),
}

impl Numeric {
    fn value<E: de::Error>(self) -> Result<f64, E> {
        match self {
            Numeric::Num(v) => Ok(v),
            Numeric::Str(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| E::custom(format!("invalid numeric value {s:?}"))),
        }
    }
}

fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    Numeric::deserialize(d)?.value()
}

fn integer<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    let v = number(d)?;
    if !v.is_finite() {
        return Err(de::Error::custom(format!("invalid integer value {v}")));
    }
    Ok(v.trunc() as i32)
}

fn numbers<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<f64>, D::Error> {
    Vec::<Numeric>::deserialize(d)?
        .into_iter()
        .map(Numeric::value)
        .collect()
}
