//! Source Map Generator
//!
//! Accumulates mappings from generated positions to original positions and
//! serializes them into a revision 3 source map.

use std::cmp::Ordering;

use ::base64::engine::general_purpose::STANDARD;
use ::base64::Engine as _;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::array_set::ArraySet;
use crate::binary_search::Bias;
use crate::compare::compare_by_generated_positions_inflated;
use crate::consumer::{Consumer, Order};
use crate::error::{Result, SourceMapError};
use crate::mapping::{Mapping, Position};
use crate::mapping_list::MappingList;
use crate::raw_source_map::RawSourceMap;
use crate::util;
use crate::vlq;
use crate::VERSION;

const JS_B64_PREFIX: &str = "# sourceMappingURL=data:application/json;charset=utf-8;base64,";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourceMapGeneratorOptions {
    /// The filename of the generated source.
    pub file: Option<String>,
    /// A root for all relative URLs in this source map.
    pub source_root: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SourceMapGenerator {
    file: Option<String>,
    source_root: Option<String>,
    sources: ArraySet<String>,
    names: ArraySet<String>,
    mappings: MappingList,
    sources_contents: Option<IndexMap<String, String>>,
}

impl SourceMapGenerator {
    pub fn new(file: Option<String>, source_root: Option<String>) -> Self {
        SourceMapGenerator::with_options(SourceMapGeneratorOptions { file, source_root })
    }

    pub fn with_options(options: SourceMapGeneratorOptions) -> Self {
        SourceMapGenerator {
            file: options.file,
            source_root: options.source_root,
            ..Default::default()
        }
    }

    /// Creates a new generator holding the mappings and source contents of
    /// an existing source map.
    pub fn from_source_map<C: Consumer + ?Sized>(consumer: &C) -> Result<Self> {
        let source_root = consumer.source_root().map(str::to_string);
        let mut generator =
            SourceMapGenerator::new(consumer.file().map(str::to_string), source_root.clone());

        for mapping in consumer.each_mapping(Order::Generated)? {
            let mut new_mapping = Mapping::generated_only(mapping.generated);
            if let Some(source) = mapping.source {
                new_mapping.source = Some(match &source_root {
                    Some(root) => util::relative(root, &source),
                    None => source,
                });
                new_mapping.original = mapping.original;
                new_mapping.name = mapping.name;
            }
            generator.add_mapping(new_mapping);
        }

        for source in consumer.sources() {
            if let Some(content) = consumer.source_content_for(&source, true)? {
                generator.set_source_content(&source, Some(content.to_string()));
            }
        }

        Ok(generator)
    }

    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn source_root(&self) -> Option<&str> {
        self.source_root.as_deref()
    }

    /// Add a single mapping from original source line and column to the
    /// generated source's line and column for this source map.
    pub fn add_mapping(&mut self, mapping: Mapping) {
        if let Some(source) = &mapping.source {
            self.sources.add(source.clone(), false);
        }
        if let Some(name) = &mapping.name {
            self.names.add(name.clone(), false);
        }
        self.mappings.add(mapping);
    }

    /// Set the source content for a source file. `None` removes it.
    pub fn set_source_content(&mut self, source_file: &str, content: Option<String>) {
        let source = self.relative_to_root(source_file);

        match content {
            Some(content) => {
                self.sources_contents
                    .get_or_insert_with(IndexMap::new)
                    .insert(source, content);
            }
            None => {
                let now_empty = match self.sources_contents.as_mut() {
                    Some(contents) => {
                        contents.shift_remove(&source);
                        contents.is_empty()
                    }
                    None => false,
                };
                if now_empty {
                    self.sources_contents = None;
                }
            }
        }
    }

    /// Applies the mappings of a sub-source-map for a specific source file to
    /// this source map. Each mapping to `source_file` is rewritten using the
    /// supplied map.
    ///
    /// `source_file` defaults to the supplied map's `file`. Relative sources
    /// of the supplied map are resolved against `source_map_path` when it is
    /// given, which is the path of that map relative to this one.
    pub fn apply_source_map<C: Consumer + ?Sized>(
        &mut self,
        consumer: &C,
        source_file: Option<&str>,
        source_map_path: Option<&str>,
    ) -> Result<()> {
        let source_file = source_file
            .or(consumer.file())
            .ok_or(SourceMapError::MissingFileForApply)?;
        let source_file = self.relative_to_root(source_file);
        let resolve = |source: String| {
            let source = match source_map_path {
                Some(path) => util::join(path, &source),
                None => source,
            };
            self.relative_to_root(&source)
        };

        // Query every affected mapping before touching any of them.
        let mut rewrites = Vec::with_capacity(self.mappings.len());
        for mapping in self.mappings.unsorted_iter() {
            let rewrite = match (&mapping.source, mapping.original) {
                (Some(source), Some(original)) if *source == source_file => {
                    let upstream = consumer.original_position_for(
                        original.line,
                        original.column,
                        Bias::GreatestLowerBound,
                    )?;
                    match (upstream.source, upstream.line, upstream.column) {
                        (Some(source), Some(line), Some(column)) => Some((
                            resolve(source),
                            Position::new(line, column),
                            upstream.name,
                        )),
                        _ => None,
                    }
                }
                _ => None,
            };
            rewrites.push(rewrite);
        }

        let rewritten = rewrites.iter().filter(|r| r.is_some()).count();
        if rewritten > 0 {
            let mut rewrites = rewrites.into_iter();
            self.mappings.update_each(|mapping| {
                if let Some(Some((source, original, name))) = rewrites.next() {
                    mapping.source = Some(source);
                    mapping.original = Some(original);
                    if name.is_some() {
                        mapping.name = name;
                    }
                }
            });
        }

        let mut sources = ArraySet::new();
        let mut names = ArraySet::new();
        for mapping in self.mappings.unsorted_iter() {
            if let Some(source) = &mapping.source {
                sources.add(source.clone(), false);
            }
            if let Some(name) = &mapping.name {
                names.add(name.clone(), false);
            }
        }
        self.sources = sources;
        self.names = names;

        // Copy the source contents of the applied map.
        for source in consumer.sources() {
            if let Some(content) = consumer.source_content_for(&source, true)? {
                let source = match source_map_path {
                    Some(path) => util::join(path, &source),
                    None => source,
                };
                self.set_source_content(&source, Some(content.to_string()));
            }
        }

        tracing::debug!(
            source_file = %source_file,
            rewritten,
            "applied source map"
        );
        Ok(())
    }

    fn relative_to_root(&self, source: &str) -> String {
        match &self.source_root {
            Some(root) => util::relative(root, source),
            None => source.to_string(),
        }
    }

    /// Serialize the accumulated mappings in to the stream of base 64 VLQs
    /// specified by the source map format.
    fn serialize_mappings(&mut self) -> String {
        let mut previous_generated_column: i64 = 0;
        let mut previous_generated_line: u32 = 1;
        let mut previous_original_column: i64 = 0;
        let mut previous_original_line: i64 = 0;
        let mut previous_name: i64 = 0;
        let mut previous_source: i64 = 0;
        let mut result = String::new();

        let sources = &self.sources;
        let names = &self.names;
        let mappings = self.mappings.to_array();

        for (i, mapping) in mappings.iter().enumerate() {
            let generated_line = mapping.generated.line.max(1);
            if generated_line != previous_generated_line {
                previous_generated_column = 0;
                while previous_generated_line < generated_line {
                    result.push(';');
                    previous_generated_line += 1;
                }
            } else if i > 0 {
                if compare_by_generated_positions_inflated(mapping, &mappings[i - 1])
                    == Ordering::Equal
                {
                    continue;
                }
                result.push(',');
            }

            let generated_column = mapping.generated.column as i64;
            vlq::encode_into(generated_column - previous_generated_column, &mut result);
            previous_generated_column = generated_column;

            let source_index = mapping.source.as_deref().and_then(|s| sources.index_of(s));
            if let (Some(source_index), Some(original)) = (source_index, mapping.original) {
                let source_index = source_index as i64;
                vlq::encode_into(source_index - previous_source, &mut result);
                previous_source = source_index;

                // lines are stored 0-based in source map version 3
                let original_line = original.line as i64 - 1;
                vlq::encode_into(original_line - previous_original_line, &mut result);
                previous_original_line = original_line;

                let original_column = original.column as i64;
                vlq::encode_into(original_column - previous_original_column, &mut result);
                previous_original_column = original_column;

                if let Some(name_index) = mapping.name.as_deref().and_then(|n| names.index_of(n)) {
                    let name_index = name_index as i64;
                    vlq::encode_into(name_index - previous_name, &mut result);
                    previous_name = name_index;
                }
            }
        }

        tracing::trace!(mappings = mappings.len(), "serialized mappings");
        result
    }

    /// The content of each source, looked up relative to the source root.
    pub(crate) fn generate_sources_content(&self, sources: &[String]) -> Vec<Option<String>> {
        sources
            .iter()
            .map(|source| {
                let contents = self.sources_contents.as_ref()?;
                contents.get(&self.relative_to_root(source)).cloned()
            })
            .collect()
    }

    /// The mappings sorted by generated position, with the tables their
    /// sources and names are interned in.
    pub(crate) fn sorted_parts(&mut self) -> (&[Mapping], &ArraySet<String>, &ArraySet<String>) {
        (self.mappings.to_array(), &self.sources, &self.names)
    }

    /// Externalize the source map.
    pub fn to_json(&mut self) -> RawSourceMap {
        let mappings = self.serialize_mappings();
        let sources = self.sources.to_array();
        let sources_content = self
            .sources_contents
            .is_some()
            .then(|| self.generate_sources_content(&sources));

        RawSourceMap {
            version: VERSION,
            file: self.file.clone(),
            source_root: self.source_root.clone(),
            sources,
            names: self.names.to_array(),
            mappings,
            sources_content,
            sections: None,
        }
    }

    pub fn to_json_string(&mut self) -> Result<String> {
        self.to_json().to_json_string()
    }

    /// A `//# sourceMappingURL` comment embedding the map as a data URI.
    pub fn to_inline_comment(&mut self) -> Result<String> {
        let json = self.to_json_string()?;
        Ok(format!("//{}{}", JS_B64_PREFIX, STANDARD.encode(json)))
    }
}

impl std::fmt::Display for SourceMapGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut snapshot = self.clone();
        let json = snapshot.to_json_string().map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}
