pub mod fetcher;
pub mod traits;

pub use fetcher::{FileSource, HttpSource, source_for};
pub use traits::ListingSource;
