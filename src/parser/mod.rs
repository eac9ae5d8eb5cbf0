pub mod feed_parser;

pub use feed_parser::{FeedParser, Parser};
