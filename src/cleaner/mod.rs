mod dates;
mod dedup;
mod engine;

// Re-export public API
pub use dates::{normalize_datetime, parse_datetime};
pub use dedup::drop_duplicate_rows;
pub use engine::{clean_batch, CleanOutcome};
