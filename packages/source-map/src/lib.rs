//! Source Map
//!
//! Encoding, decoding and querying of revision 3 source maps.
//!
//! The [`SourceMapGenerator`] accumulates mappings and serializes them into
//! the compact base64 VLQ wire form. The [`SourceMapConsumer`] parses that
//! form back (either a basic map or an indexed map made of sections) and
//! answers position queries in both directions.

pub mod array_set;
pub mod base64;
pub mod binary_search;
pub mod compare;
pub mod consumer;
pub mod error;
pub mod generator;
pub mod mapping;
pub mod mapping_list;
pub mod raw_source_map;
pub mod util;
pub mod vlq;

pub use binary_search::Bias;
pub use consumer::{
    BasicSourceMapConsumer, Consumer, IndexedSourceMapConsumer, MappingIter, Order,
    SourceMapConsumer,
};
pub use error::{Result, SourceMapError};
pub use generator::{SourceMapGenerator, SourceMapGeneratorOptions};
pub use mapping::{GeneratedPosition, Mapping, OriginalPosition, Position};
pub use raw_source_map::{RawOffset, RawSection, RawSourceMap};

// https://sourcemaps.info/spec.html
pub const VERSION: u32 = 3;
