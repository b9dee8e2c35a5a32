//! `vt-aggregate` — trajectory ingestion and Edie's-box aggregation.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                    |
//! |------------|-------------------------------------------------------------|
//! | [`record`] | `TrajectoryRecord` (one vehicle's observed fragment)        |
//! | [`loader`] | Streaming JSON-array reader: `for_each_record`, `load_*`    |
//! | [`edie`]   | `BoxAggregator`, `aggregate`, `aggregate_reader`            |
//! | [`error`]  | `AggregateError`, `AggregateResult<T>`                      |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                   |
//! |------------|----------------------------------------------------------|
//! | `parallel` | Enables `aggregate_par` and `aggregate_reader_par`.       |

pub mod edie;
pub mod error;
pub mod loader;
pub mod record;


pub use edie::{AggregateStats, BoxAggregator, DEFAULT_CHUNK_SIZE, aggregate, aggregate_reader};
#[cfg(feature = "parallel")]
pub use edie::{aggregate_par, aggregate_reader_par};
pub use error::{AggregateError, AggregateResult};
pub use loader::{LoadStats, for_each_record, load_records_json, load_records_reader};
pub use record::TrajectoryRecord;
