pub mod types;

pub use types::{completion, Completion, DestroyOptions, SyncBackend, SyncOutcome, SyncVerb};
