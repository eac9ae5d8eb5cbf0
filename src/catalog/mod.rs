pub mod sqlite;

pub use sqlite::{CatalogStorage, SaveOutcome};
