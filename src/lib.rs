pub mod analyzer;
pub mod catalog;
pub mod config;
pub mod extract;
pub mod filter;
pub mod logging;
pub mod model;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod source;
pub mod utils;
