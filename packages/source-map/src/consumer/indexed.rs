//! Indexed Source Map Consumer
//!
//! An indexed source map is a list of sections. Each section holds a complete
//! source map whose generated positions start at the section's offset. Queries
//! are routed to the section covering the position and translated back.

use once_cell::unsync::OnceCell;

use super::{check_line, Consumer, MappingIter, Order, ParsedMappings, SourceMapConsumer};
use crate::array_set::ArraySet;
use crate::binary_search::{search, Bias};
use crate::error::{Result, SourceMapError};
use crate::mapping::{GeneratedPosition, OriginalPosition, ParsedMapping, Position};
use crate::raw_source_map::RawSourceMap;
use crate::VERSION;

#[derive(Debug)]
struct Section {
    /// 1-based line and 0-based column of the section's first position.
    start: Position,
    consumer: SourceMapConsumer,
}

impl Section {
    /// Converts a position local to the section into a global one.
    fn to_global(&self, line: u32, column: u32) -> Result<(u32, u32)> {
        let global_column = if line == 1 {
            column.checked_add(self.start.column)
        } else {
            Some(column)
        };
        let global_line = line.checked_add(self.start.line - 1);

        match (global_line, global_column) {
            (Some(line), Some(column)) => Ok((line, column)),
            _ => Err(SourceMapError::decode(format!(
                "Position {}:{} of the section at {}:{} is out of range",
                line, column, self.start.line, self.start.column
            ))),
        }
    }
}

/// Mappings of every section merged into global positions, with their own
/// source and name tables.
#[derive(Debug)]
struct MergedMappings {
    sources: ArraySet<String>,
    names: ArraySet<String>,
    mappings: ParsedMappings,
}

#[derive(Debug)]
pub struct IndexedSourceMapConsumer {
    file: Option<String>,
    sections: Vec<Section>,
    // Section starts, kept apart for the binary search.
    starts: Vec<Position>,
    merged: OnceCell<MergedMappings>,
}

fn compare_starts(a: &Position, b: &Position) -> std::cmp::Ordering {
    a.line.cmp(&b.line).then_with(|| a.column.cmp(&b.column))
}

impl IndexedSourceMapConsumer {
    pub fn new(raw: RawSourceMap) -> Result<Self> {
        if raw.version != VERSION {
            return Err(SourceMapError::UnsupportedVersion(raw.version));
        }

        let raw_sections = raw.sections.unwrap_or_default();
        let mut sections = Vec::with_capacity(raw_sections.len());
        let mut last_offset: Option<Position> = None;

        for raw_section in raw_sections {
            if let Some(url) = raw_section.url {
                return Err(SourceMapError::UnsupportedSectionUrl(url));
            }

            let offset = Position::new(raw_section.offset.line, raw_section.offset.column);
            if let Some(last) = last_offset {
                if compare_starts(&offset, &last).is_lt() {
                    return Err(SourceMapError::SectionOrdering);
                }
            }
            last_offset = Some(offset);

            let map = raw_section.map.ok_or_else(|| {
                SourceMapError::decode("A section must have either a map or a url")
            })?;

            let start_line = offset.line.checked_add(1).ok_or_else(|| {
                SourceMapError::decode(format!(
                    "Section offset line {} is out of range",
                    offset.line
                ))
            })?;
            sections.push(Section {
                start: Position::new(start_line, offset.column),
                consumer: SourceMapConsumer::new(*map)?,
            });
        }

        tracing::debug!(sections = sections.len(), "created indexed source map consumer");

        let starts = sections.iter().map(|section| section.start).collect();
        Ok(IndexedSourceMapConsumer {
            file: raw.file,
            sections,
            starts,
            merged: OnceCell::new(),
        })
    }

    pub(crate) fn has_source(&self, source: &str) -> bool {
        self.sections
            .iter()
            .any(|section| section.consumer.has_source(source))
    }

    fn merged(&self) -> Result<&MergedMappings> {
        self.merged.get_or_try_init(|| self.merge_sections())
    }

    /// Collects the mappings of every section, re-interning sources and names
    /// and shifting generated positions by the section offset.
    fn merge_sections(&self) -> Result<MergedMappings> {
        let mut sources = ArraySet::new();
        let mut names = ArraySet::new();
        let mut generated = Vec::new();

        for section in &self.sections {
            for mapping in section.consumer.each_mapping(Order::Generated)? {
                let (line, column) =
                    section.to_global(mapping.generated.line, mapping.generated.column)?;
                let mut parsed = ParsedMapping::at_generated(line, column);

                if let Some(source) = mapping.source {
                    parsed.source = Some(intern(&mut sources, source));
                    parsed.original_line = mapping.original.map(|p| p.line);
                    parsed.original_column = mapping.original.map(|p| p.column);
                    parsed.name = mapping.name.map(|name| intern(&mut names, name));
                }

                generated.push(parsed);
            }
        }

        tracing::debug!(
            sections = self.sections.len(),
            mappings = generated.len(),
            "merged indexed source map sections"
        );

        Ok(MergedMappings {
            sources,
            names,
            mappings: ParsedMappings::new(generated),
        })
    }
}

fn intern(set: &mut ArraySet<String>, value: String) -> u32 {
    if let Some(index) = set.index_of(value.as_str()) {
        return index as u32;
    }
    set.add(value, false);
    (set.len() - 1) as u32
}

impl Consumer for IndexedSourceMapConsumer {
    fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    fn source_root(&self) -> Option<&str> {
        None
    }

    fn sources(&self) -> Vec<String> {
        self.sections
            .iter()
            .flat_map(|section| section.consumer.sources())
            .collect()
    }

    fn has_contents_of_all_sources(&self) -> bool {
        self.sections
            .iter()
            .all(|section| section.consumer.has_contents_of_all_sources())
    }

    fn source_content_for(&self, source: &str, null_on_missing: bool) -> Result<Option<&str>> {
        for section in &self.sections {
            if let Some(content) = section.consumer.source_content_for(source, true)? {
                return Ok(Some(content));
            }
        }

        if null_on_missing {
            Ok(None)
        } else {
            Err(SourceMapError::MissingSourceContent(source.to_string()))
        }
    }

    fn original_position_for(
        &self,
        line: u32,
        column: u32,
        bias: Bias,
    ) -> Result<OriginalPosition> {
        check_line(line)?;

        // Find the section containing the generated position we're trying to
        // map to an original position.
        let needle = Position::new(line, column);
        let Some(index) = search(&needle, &self.starts, compare_starts, Bias::GreatestLowerBound)
        else {
            return Ok(OriginalPosition::default());
        };

        let section = &self.sections[index];
        let local_line = line - (section.start.line - 1);
        let local_column = if line == section.start.line {
            column - section.start.column
        } else {
            column
        };
        section
            .consumer
            .original_position_for(local_line, local_column, bias)
    }

    fn generated_position_for(
        &self,
        source: &str,
        line: u32,
        column: u32,
        bias: Bias,
    ) -> Result<GeneratedPosition> {
        check_line(line)?;

        for section in &self.sections {
            // Only consider this section if the requested source is in the
            // list of sources of the consumer.
            if !section.consumer.has_source(source) {
                continue;
            }

            let found = section
                .consumer
                .generated_position_for(source, line, column, bias)?;
            if let (Some(local_line), Some(local_column)) = (found.line, found.column) {
                let (global_line, global_column) = section.to_global(local_line, local_column)?;
                let shift = global_column - local_column;
                return Ok(GeneratedPosition {
                    line: Some(global_line),
                    column: Some(global_column),
                    last_column: found.last_column.map(|last| last.saturating_add(shift)),
                });
            }
        }

        Ok(GeneratedPosition::default())
    }

    fn all_generated_positions_for(
        &self,
        source: &str,
        line: u32,
        column: Option<u32>,
    ) -> Result<Vec<GeneratedPosition>> {
        check_line(line)?;
        let merged = self.merged()?;
        let Some(source_index) = merged.sources.index_of(source) else {
            return Ok(Vec::new());
        };

        Ok(merged
            .mappings
            .all_generated_positions_for(source_index as u32, line, column))
    }

    fn each_mapping(&self, order: Order) -> Result<MappingIter<'_>> {
        let merged = self.merged()?;
        Ok(MappingIter::new(
            merged.mappings.ordered(order),
            &merged.sources,
            &merged.names,
            None,
        ))
    }
}
