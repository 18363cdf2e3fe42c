mod summary_store;

pub use summary_store::{SummaryStore, UpsertResult, UpsertStats};
