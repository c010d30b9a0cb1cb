//! Source Map Consumer
//!
//! Reads a source map and answers queries about original and generated
//! positions. A basic map carries its own mappings; an indexed map is a list
//! of sections, each holding a complete map placed at an offset of the
//! generated file.

mod basic;
mod indexed;

pub use basic::BasicSourceMapConsumer;
pub use indexed::IndexedSourceMapConsumer;

use crate::array_set::ArraySet;
use crate::binary_search::{search, Bias};
use crate::compare::{compare_by_generated_positions_deflated, compare_by_original_positions};
use crate::error::{Result, SourceMapError};
use crate::generator::SourceMapGenerator;
use crate::mapping::{GeneratedPosition, Mapping, OriginalPosition, ParsedMapping, Position};
use crate::raw_source_map::RawSourceMap;
use crate::util;

/// The order in which `each_mapping` visits mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    /// Sorted by generated line, then column.
    #[default]
    Generated,
    /// Sorted by source, then original line and column.
    Original,
}

/// Queries shared by every kind of source map consumer.
pub trait Consumer {
    /// The generated file this source map is associated with.
    fn file(&self) -> Option<&str>;

    fn source_root(&self) -> Option<&str>;

    /// The list of original sources, resolved against the source root.
    fn sources(&self) -> Vec<String>;

    /// Whether every source has its content embedded in the map.
    fn has_contents_of_all_sources(&self) -> bool;

    /// The original source content for `source`. A source without content
    /// yields `Ok(None)`; an unknown source is an error unless
    /// `null_on_missing` is set.
    fn source_content_for(&self, source: &str, null_on_missing: bool) -> Result<Option<&str>>;

    /// The original source, line, column and name for a generated position.
    /// Lines are 1-based and columns 0-based.
    fn original_position_for(
        &self,
        line: u32,
        column: u32,
        bias: Bias,
    ) -> Result<OriginalPosition>;

    /// The generated line and column for an original source position.
    fn generated_position_for(
        &self,
        source: &str,
        line: u32,
        column: u32,
        bias: Bias,
    ) -> Result<GeneratedPosition>;

    /// Every generated position mapped to the given original line, and
    /// column when one is given. Without a column, a line with no mappings
    /// yields the mappings of the closest following line instead.
    fn all_generated_positions_for(
        &self,
        source: &str,
        line: u32,
        column: Option<u32>,
    ) -> Result<Vec<GeneratedPosition>>;

    /// Iterate over each mapping in the given order.
    fn each_mapping(&self, order: Order) -> Result<MappingIter<'_>>;
}

#[derive(Debug)]
pub enum SourceMapConsumer {
    Basic(BasicSourceMapConsumer),
    Indexed(IndexedSourceMapConsumer),
}

impl SourceMapConsumer {
    /// Builds a consumer from a parsed source map; a map with `sections` is
    /// indexed, anything else is basic.
    pub fn new(raw: RawSourceMap) -> Result<Self> {
        if raw.sections.is_some() {
            Ok(SourceMapConsumer::Indexed(IndexedSourceMapConsumer::new(raw)?))
        } else {
            Ok(SourceMapConsumer::Basic(BasicSourceMapConsumer::new(raw)?))
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        SourceMapConsumer::new(RawSourceMap::from_json(json)?)
    }

    /// Snapshot the mappings of a generator into a basic consumer.
    pub fn from_generator(generator: &mut SourceMapGenerator) -> Self {
        SourceMapConsumer::Basic(BasicSourceMapConsumer::from_generator(generator))
    }

    pub fn as_basic_mut(&mut self) -> Option<&mut BasicSourceMapConsumer> {
        match self {
            SourceMapConsumer::Basic(basic) => Some(basic),
            SourceMapConsumer::Indexed(_) => None,
        }
    }

    /// Whether `source` is one of this map's sources, before root resolution.
    pub(crate) fn has_source(&self, source: &str) -> bool {
        match self {
            SourceMapConsumer::Basic(basic) => basic.has_source(source),
            SourceMapConsumer::Indexed(indexed) => indexed.has_source(source),
        }
    }

    fn inner(&self) -> &dyn Consumer {
        match self {
            SourceMapConsumer::Basic(basic) => basic,
            SourceMapConsumer::Indexed(indexed) => indexed,
        }
    }
}

impl Consumer for SourceMapConsumer {
    fn file(&self) -> Option<&str> {
        self.inner().file()
    }

    fn source_root(&self) -> Option<&str> {
        self.inner().source_root()
    }

    fn sources(&self) -> Vec<String> {
        self.inner().sources()
    }

    fn has_contents_of_all_sources(&self) -> bool {
        self.inner().has_contents_of_all_sources()
    }

    fn source_content_for(&self, source: &str, null_on_missing: bool) -> Result<Option<&str>> {
        self.inner().source_content_for(source, null_on_missing)
    }

    fn original_position_for(
        &self,
        line: u32,
        column: u32,
        bias: Bias,
    ) -> Result<OriginalPosition> {
        self.inner().original_position_for(line, column, bias)
    }

    fn generated_position_for(
        &self,
        source: &str,
        line: u32,
        column: u32,
        bias: Bias,
    ) -> Result<GeneratedPosition> {
        self.inner().generated_position_for(source, line, column, bias)
    }

    fn all_generated_positions_for(
        &self,
        source: &str,
        line: u32,
        column: Option<u32>,
    ) -> Result<Vec<GeneratedPosition>> {
        self.inner().all_generated_positions_for(source, line, column)
    }

    fn each_mapping(&self, order: Order) -> Result<MappingIter<'_>> {
        self.inner().each_mapping(order)
    }
}

pub(crate) fn check_line(line: u32) -> Result<()> {
    if line < 1 {
        return Err(SourceMapError::InvalidPosition(format!(
            "Line must be greater than or equal to 1, got {}",
            line
        )));
    }
    Ok(())
}

/// The decoded mappings of a consumer, in both sort orders.
#[derive(Debug, Clone, Default)]
pub(crate) struct ParsedMappings {
    generated: Vec<ParsedMapping>,
    original: Vec<ParsedMapping>,
    // `original[i]` is a copy of `generated[original_to_generated[i]]`
    original_to_generated: Vec<usize>,
}

impl ParsedMappings {
    pub fn new(mut generated: Vec<ParsedMapping>) -> Self {
        generated.sort_by(|a, b| compare_by_generated_positions_deflated(a, b, false));

        let mut original: Vec<(usize, ParsedMapping)> = generated
            .iter()
            .copied()
            .enumerate()
            .filter(|(_, mapping)| mapping.source.is_some())
            .collect();
        original.sort_by(|(_, a), (_, b)| compare_by_original_positions(a, b, false));
        let (original_to_generated, original) = original.into_iter().unzip();

        ParsedMappings {
            generated,
            original,
            original_to_generated,
        }
    }

    pub fn ordered(&self, order: Order) -> &[ParsedMapping] {
        match order {
            Order::Generated => &self.generated,
            Order::Original => &self.original,
        }
    }

    /// The mapping at or nearest to a generated position, on the same line.
    pub fn find_generated(&self, line: u32, column: u32, bias: Bias) -> Option<&ParsedMapping> {
        let needle = ParsedMapping::at_generated(line, column);
        let index = search(
            &needle,
            &self.generated,
            |a, b| compare_by_generated_positions_deflated(a, b, true),
            bias,
        )?;
        let mapping = &self.generated[index];
        (mapping.generated_line == line).then_some(mapping)
    }

    /// The mapping at or nearest to an original position, in the same source.
    pub fn find_original(
        &self,
        source: u32,
        line: u32,
        column: u32,
        bias: Bias,
    ) -> Option<&ParsedMapping> {
        let needle = ParsedMapping::original_needle(source, line, column);
        let index = search(
            &needle,
            &self.original,
            |a, b| compare_by_original_positions(a, b, true),
            bias,
        )?;
        let mapping = &self.original[index];
        (mapping.source == Some(source)).then_some(mapping)
    }

    pub fn all_generated_positions_for(
        &self,
        source: u32,
        line: u32,
        column: Option<u32>,
    ) -> Vec<GeneratedPosition> {
        let needle = ParsedMapping::original_needle(source, line, column.unwrap_or(0));
        let Some(start) = search(
            &needle,
            &self.original,
            |a, b| compare_by_original_positions(a, b, true),
            Bias::LeastUpperBound,
        ) else {
            return Vec::new();
        };

        let found = self.original[start];
        // Without a column, take every mapping of the line that was found,
        // which may be a later line than the one asked for.
        let same_position = |mapping: &ParsedMapping| match column {
            None => mapping.original_line == found.original_line,
            Some(_) => {
                mapping.original_line == Some(line)
                    && mapping.original_column == found.original_column
            }
        };

        self.original[start..]
            .iter()
            .take_while(|mapping| mapping.source == Some(source) && same_position(mapping))
            .map(|mapping| GeneratedPosition {
                line: Some(mapping.generated_line),
                column: Some(mapping.generated_column),
                last_column: mapping.last_generated_column,
            })
            .collect()
    }

    /// Sets the last generated column of every mapping: one before the next
    /// mapping on the same line, or `u32::MAX` for the last one of a line.
    pub fn compute_column_spans(&mut self) {
        for index in 0..self.generated.len() {
            let line = self.generated[index].generated_line;
            let last_column = match self.generated.get(index + 1) {
                Some(next) if next.generated_line == line => {
                    next.generated_column.saturating_sub(1)
                }
                _ => u32::MAX,
            };
            self.generated[index].last_generated_column = Some(last_column);
        }

        for (mapping, &index) in self.original.iter_mut().zip(&self.original_to_generated) {
            mapping.last_generated_column = self.generated[index].last_generated_column;
        }
    }
}

/// Iterator over the mappings of a consumer, with sources and names spelled
/// out. Sources are resolved against the source root.
pub struct MappingIter<'a> {
    mappings: std::slice::Iter<'a, ParsedMapping>,
    sources: &'a ArraySet<String>,
    names: &'a ArraySet<String>,
    source_root: Option<&'a str>,
}

impl<'a> MappingIter<'a> {
    pub(crate) fn new(
        mappings: &'a [ParsedMapping],
        sources: &'a ArraySet<String>,
        names: &'a ArraySet<String>,
        source_root: Option<&'a str>,
    ) -> Self {
        MappingIter {
            mappings: mappings.iter(),
            sources,
            names,
            source_root,
        }
    }
}

impl Iterator for MappingIter<'_> {
    type Item = Mapping;

    fn next(&mut self) -> Option<Mapping> {
        let mapping = self.mappings.next()?;
        let source = mapping
            .source
            .and_then(|index| self.sources.at(index as usize))
            .map(|source| match self.source_root {
                Some(root) => util::join(root, source),
                None => source.clone(),
            });
        let original = match (mapping.original_line, mapping.original_column) {
            (Some(line), Some(column)) => Some(Position::new(line, column)),
            _ => None,
        };
        let name = mapping
            .name
            .and_then(|index| self.names.at(index as usize))
            .cloned();

        Some(Mapping {
            generated: Position::new(mapping.generated_line, mapping.generated_column),
            original,
            source,
            name,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.mappings.size_hint()
    }
}
