//! Basic Source Map Consumer
//!
//! A consumer for a single, non-sectioned source map. The `mappings` string is
//! decoded on the first query that needs it.

use std::collections::HashMap;

use once_cell::unsync::OnceCell;
use smallvec::SmallVec;

use super::{check_line, Consumer, MappingIter, Order, ParsedMappings};
use crate::array_set::ArraySet;
use crate::binary_search::Bias;
use crate::error::{Result, SourceMapError};
use crate::generator::SourceMapGenerator;
use crate::mapping::{GeneratedPosition, OriginalPosition, ParsedMapping};
use crate::raw_source_map::RawSourceMap;
use crate::util;
use crate::vlq;
use crate::VERSION;

type Segment = SmallVec<[i64; 5]>;

#[derive(Debug)]
pub struct BasicSourceMapConsumer {
    file: Option<String>,
    source_root: Option<String>,
    sources: ArraySet<String>,
    names: ArraySet<String>,
    sources_content: Option<Vec<Option<String>>>,
    mappings: String,
    parsed: OnceCell<ParsedMappings>,
}

impl BasicSourceMapConsumer {
    pub fn new(raw: RawSourceMap) -> Result<Self> {
        if raw.version != VERSION {
            return Err(SourceMapError::UnsupportedVersion(raw.version));
        }

        let source_root = raw.source_root;
        let root_is_absolute = source_root.as_deref().is_some_and(util::is_absolute);
        let sources = raw.sources.iter().map(|source| {
            let source = util::normalize(source);
            // Absolute sources are stored relative to an absolute source root.
            match &source_root {
                Some(root) if root_is_absolute && util::is_absolute(&source) => {
                    util::relative(root, &source)
                }
                _ => source,
            }
        });

        // Some producers repeat sources and names, keep every slot so that
        // the indices in `mappings` stay valid.
        let sources = ArraySet::from_array(sources, true);
        let names = ArraySet::from_array(raw.names, true);

        Ok(BasicSourceMapConsumer {
            file: raw.file,
            source_root,
            sources,
            names,
            sources_content: raw.sources_content,
            mappings: raw.mappings,
            parsed: OnceCell::new(),
        })
    }

    /// Create a consumer from the current state of a generator.
    pub fn from_generator(generator: &mut SourceMapGenerator) -> Self {
        let file = generator.file().map(str::to_string);
        let source_root = generator.source_root().map(str::to_string);

        let (mappings, sources, names) = generator.sorted_parts();
        let sources = ArraySet::from_array(sources.to_array(), true);
        let names = ArraySet::from_array(names.to_array(), true);

        // Copy each mapping into interned form; the generator keeps its own.
        let generated = mappings
            .iter()
            .map(|mapping| {
                let mut parsed =
                    ParsedMapping::at_generated(mapping.generated.line, mapping.generated.column);
                if let Some(source) = &mapping.source {
                    parsed.source = sources.index_of(source.as_str()).map(|i| i as u32);
                    parsed.original_line = mapping.original.map(|p| p.line);
                    parsed.original_column = mapping.original.map(|p| p.column);
                    parsed.name = mapping
                        .name
                        .as_deref()
                        .and_then(|name| names.index_of(name))
                        .map(|i| i as u32);
                }
                parsed
            })
            .collect();

        let sources_content = Some(generator.generate_sources_content(&sources.to_array()));

        let parsed = OnceCell::with_value(ParsedMappings::new(generated));

        BasicSourceMapConsumer {
            file,
            source_root,
            sources,
            names,
            sources_content,
            mappings: String::new(),
            parsed,
        }
    }

    pub fn sources_content(&self) -> Option<&[Option<String>]> {
        self.sources_content.as_deref()
    }

    /// Fills in the last generated column of every mapping. Positions
    /// returned afterwards carry `last_column`.
    pub fn compute_column_spans(&mut self) -> Result<()> {
        self.parsed()?;
        if let Some(parsed) = self.parsed.get_mut() {
            parsed.compute_column_spans();
        }
        Ok(())
    }

    pub(crate) fn has_source(&self, source: &str) -> bool {
        self.sources.has(self.relative_to_root(source).as_str())
    }

    fn relative_to_root(&self, source: &str) -> String {
        match &self.source_root {
            Some(root) => util::relative(root, source),
            None => source.to_string(),
        }
    }

    fn source_at(&self, index: u32) -> Option<String> {
        let source = self.sources.at(index as usize)?;
        Some(match &self.source_root {
            Some(root) => util::join(root, source),
            None => source.clone(),
        })
    }

    fn parsed(&self) -> Result<&ParsedMappings> {
        self.parsed.get_or_try_init(|| self.parse_mappings())
    }

    /// Decodes the `mappings` string. Repeated segments are decoded once.
    fn parse_mappings(&self) -> Result<ParsedMappings> {
        let input = self.mappings.as_bytes();
        let mut generated_mappings = Vec::new();
        let mut cached_segments: HashMap<&[u8], Segment> = HashMap::new();

        let mut generated_line: u32 = 1;
        let mut previous_generated_column: i64 = 0;
        let mut previous_original_line: i64 = 0;
        let mut previous_original_column: i64 = 0;
        let mut previous_source: i64 = 0;
        let mut previous_name: i64 = 0;

        let mut index = 0;
        while index < input.len() {
            match input[index] {
                b';' => {
                    generated_line = generated_line.checked_add(1).ok_or_else(|| {
                        SourceMapError::decode("Too many generated lines in mappings")
                    })?;
                    previous_generated_column = 0;
                    index += 1;
                }
                b',' => index += 1,
                _ => {
                    let end = input[index..]
                        .iter()
                        .position(|&b| b == b';' || b == b',')
                        .map_or(input.len(), |offset| index + offset);
                    let text = &input[index..end];
                    index = end;

                    let segment = match cached_segments.get(text) {
                        Some(segment) => segment.clone(),
                        None => {
                            let segment = decode_segment(text)?;
                            cached_segments.insert(text, segment.clone());
                            segment
                        }
                    };

                    let mut mapping = ParsedMapping::at_generated(generated_line, 0);
                    previous_generated_column += segment[0];
                    mapping.generated_column =
                        to_index(previous_generated_column, "generated column")?;

                    if segment.len() > 1 {
                        previous_source += segment[1];
                        let source = to_index(previous_source, "source index")?;
                        if source as usize >= self.sources.len() {
                            return Err(SourceMapError::decode(format!(
                                "Source index {} is out of range",
                                source
                            )));
                        }
                        mapping.source = Some(source);

                        // lines are stored 0-based
                        previous_original_line += segment[2];
                        let original_line = to_index(previous_original_line, "original line")?;
                        mapping.original_line =
                            Some(original_line.checked_add(1).ok_or_else(|| {
                                SourceMapError::decode(format!(
                                    "Invalid original line in mappings: {}",
                                    previous_original_line
                                ))
                            })?);

                        previous_original_column += segment[3];
                        mapping.original_column =
                            Some(to_index(previous_original_column, "original column")?);

                        if segment.len() > 4 {
                            previous_name += segment[4];
                            let name = to_index(previous_name, "name index")?;
                            if name as usize >= self.names.len() {
                                return Err(SourceMapError::decode(format!(
                                    "Name index {} is out of range",
                                    name
                                )));
                            }
                            mapping.name = Some(name);
                        }
                    }

                    generated_mappings.push(mapping);
                }
            }
        }

        tracing::debug!(
            mappings = generated_mappings.len(),
            distinct_segments = cached_segments.len(),
            lines = generated_line,
            "parsed source map mappings"
        );

        Ok(ParsedMappings::new(generated_mappings))
    }
}

fn decode_segment(text: &[u8]) -> Result<Segment> {
    let mut segment = Segment::new();
    let mut index = 0;
    while index < text.len() {
        let (value, rest) = vlq::decode(text, index)?;
        segment.push(value);
        index = rest;
    }

    match segment.len() {
        2 => Err(SourceMapError::decode("Found a source, but no line and column")),
        3 => Err(SourceMapError::decode("Found a source and line, but no column")),
        _ => Ok(segment),
    }
}

fn to_index(value: i64, what: &str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| SourceMapError::decode(format!("Invalid {} in mappings: {}", what, value)))
}

impl Consumer for BasicSourceMapConsumer {
    fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    fn source_root(&self) -> Option<&str> {
        self.source_root.as_deref()
    }

    fn sources(&self) -> Vec<String> {
        (0..self.sources.len() as u32)
            .filter_map(|index| self.source_at(index))
            .collect()
    }

    fn has_contents_of_all_sources(&self) -> bool {
        match &self.sources_content {
            Some(contents) => {
                contents.len() >= self.sources.len() && contents.iter().all(Option::is_some)
            }
            None => false,
        }
    }

    fn source_content_for(&self, source: &str, null_on_missing: bool) -> Result<Option<&str>> {
        let Some(contents) = &self.sources_content else {
            return Ok(None);
        };
        let content_at = |index: usize| contents.get(index).and_then(|c| c.as_deref());

        let source = self.relative_to_root(source);
        if let Some(index) = self.sources.index_of(source.as_str()) {
            return Ok(content_at(index));
        }

        if let Some(url) = self.source_root.as_deref().and_then(util::url_parse) {
            // Sources may be stored as absolute paths under a file:// root.
            if url.scheme.as_deref() == Some("file") {
                if let Some(index) = source
                    .strip_prefix("file://")
                    .and_then(|path| self.sources.index_of(path))
                {
                    return Ok(content_at(index));
                }
            }

            if url.path.as_deref().map_or(true, |path| path == "/") {
                if let Some(index) = self.sources.index_of(format!("/{}", source).as_str()) {
                    return Ok(content_at(index));
                }
            }
        }

        if null_on_missing {
            Ok(None)
        } else {
            Err(SourceMapError::MissingSourceContent(source))
        }
    }

    fn original_position_for(
        &self,
        line: u32,
        column: u32,
        bias: Bias,
    ) -> Result<OriginalPosition> {
        check_line(line)?;
        let Some(mapping) = self.parsed()?.find_generated(line, column, bias) else {
            return Ok(OriginalPosition::default());
        };

        Ok(OriginalPosition {
            source: mapping.source.and_then(|index| self.source_at(index)),
            line: mapping.original_line,
            column: mapping.original_column,
            name: mapping
                .name
                .and_then(|index| self.names.at(index as usize))
                .cloned(),
        })
    }

    fn generated_position_for(
        &self,
        source: &str,
        line: u32,
        column: u32,
        bias: Bias,
    ) -> Result<GeneratedPosition> {
        check_line(line)?;
        let source = self.relative_to_root(source);
        let Some(source_index) = self.sources.index_of(source.as_str()) else {
            return Ok(GeneratedPosition::default());
        };

        let found = self
            .parsed()?
            .find_original(source_index as u32, line, column, bias);
        Ok(match found {
            Some(mapping) => GeneratedPosition {
                line: Some(mapping.generated_line),
                column: Some(mapping.generated_column),
                last_column: mapping.last_generated_column,
            },
            None => GeneratedPosition::default(),
        })
    }

    fn all_generated_positions_for(
        &self,
        source: &str,
        line: u32,
        column: Option<u32>,
    ) -> Result<Vec<GeneratedPosition>> {
        check_line(line)?;
        let source = self.relative_to_root(source);
        let Some(source_index) = self.sources.index_of(source.as_str()) else {
            return Ok(Vec::new());
        };

        Ok(self
            .parsed()?
            .all_generated_positions_for(source_index as u32, line, column))
    }

    fn each_mapping(&self, order: Order) -> Result<MappingIter<'_>> {
        Ok(MappingIter::new(
            self.parsed()?.ordered(order),
            &self.sources,
            &self.names,
            self.source_root.as_deref(),
        ))
    }
}
