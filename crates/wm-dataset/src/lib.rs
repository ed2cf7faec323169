//! Wavemill Dataset — turn aggregated eval JSONL into labeled routing examples.
//!
//! Malformed lines and records without a prompt are skipped; one bad line never aborts
//! a load. Output order follows input order.

pub mod builder;
pub mod jsonl;
pub mod summary;

pub use builder::{split_examples, truncate_prompt, BuildOutcome, DatasetBuilder};
pub use jsonl::{parse_line, parse_record, parse_records, LineRejection};
pub use summary::LabelDistribution;
