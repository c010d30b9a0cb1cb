//! Shared Test Maps
//!
//! A mapping of two functions from `one.js` and `two.js` into a minified
//! `min.js`, in several variants.
//!
//! one.js:
//!
//! ```text
//!  ONE.foo = function (bar) {
//!    return baz(bar);
//!  };
//! ```
//!
//! two.js:
//!
//! ```text
//!  TWO.inc = function (n) {
//!    return n + 1;
//!  };
//! ```
//!
//! min.js:
//!
//! ```text
//!  ONE.foo=function(a){return baz(a);};
//!  TWO.inc=function(a){return a+1;};
//! ```

#![allow(dead_code)]

use source_map::{
    Bias, Consumer, RawOffset, RawSection, RawSourceMap, SourceMapConsumer, VERSION,
};

pub const MAPPINGS: &str =
    "CAAC,IAAI,IAAM,SAAUA,GAClB,OAAOC,IAAID;CCDb,IAAI,IAAM,SAAUE,GAClB,OAAOA";
pub const ONE_JS: &str = " ONE.foo = function (bar) {\n   return baz(bar);\n };";
pub const TWO_JS: &str = " TWO.inc = function (n) {\n   return n + 1;\n };";

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub fn test_map() -> RawSourceMap {
    RawSourceMap {
        version: VERSION,
        file: Some("min.js".to_string()),
        source_root: Some("/the/root".to_string()),
        sources: strings(&["one.js", "two.js"]),
        names: strings(&["bar", "baz", "n"]),
        mappings: MAPPINGS.to_string(),
        sources_content: None,
        sections: None,
    }
}

pub fn test_map_no_source_root() -> RawSourceMap {
    RawSourceMap {
        source_root: None,
        ..test_map()
    }
}

pub fn test_map_empty_source_root() -> RawSourceMap {
    RawSourceMap {
        source_root: Some(String::new()),
        ..test_map()
    }
}

pub fn test_map_with_sources_content() -> RawSourceMap {
    RawSourceMap {
        sources_content: Some(vec![Some(ONE_JS.to_string()), Some(TWO_JS.to_string())]),
        ..test_map()
    }
}

pub fn test_map_relative_sources() -> RawSourceMap {
    RawSourceMap {
        sources: strings(&["./one.js", "./two.js"]),
        ..test_map_with_sources_content()
    }
}

pub fn empty_map() -> RawSourceMap {
    RawSourceMap {
        version: VERSION,
        file: Some("min.js".to_string()),
        ..Default::default()
    }
}

fn section(line: u32, map: RawSourceMap) -> RawSection {
    RawSection {
        offset: RawOffset { line, column: 0 },
        url: None,
        map: Some(Box::new(map)),
    }
}

fn section_map(
    source: &str,
    content: &str,
    names: &[&str],
    mappings: &str,
    root: &str,
) -> RawSourceMap {
    RawSourceMap {
        version: VERSION,
        file: Some("min.js".to_string()),
        source_root: Some(root.to_string()),
        sources: strings(&[source]),
        names: strings(names),
        mappings: mappings.to_string(),
        sources_content: Some(vec![Some(content.to_string())]),
        sections: None,
    }
}

fn indexed_map_with_roots(first_root: &str, second_root: &str) -> RawSourceMap {
    RawSourceMap {
        version: VERSION,
        file: Some("min.js".to_string()),
        sections: Some(vec![
            section(
                0,
                section_map(
                    "one.js",
                    ONE_JS,
                    &["bar", "baz"],
                    "CAAC,IAAI,IAAM,SAAUA,GAClB,OAAOC,IAAID",
                    first_root,
                ),
            ),
            section(
                1,
                section_map(
                    "two.js",
                    TWO_JS,
                    &["n"],
                    "CAAC,IAAI,IAAM,SAAUA,GAClB,OAAOA",
                    second_root,
                ),
            ),
        ]),
        ..Default::default()
    }
}

/// The same mapping as `test_map`, in the indexed format.
pub fn indexed_test_map() -> RawSourceMap {
    indexed_map_with_roots("/the/root", "/the/root")
}

pub fn indexed_test_map_different_source_roots() -> RawSourceMap {
    indexed_map_with_roots("/the/root", "/different/root")
}

/// One expected correspondence between a generated and an original position.
#[derive(Debug, Clone, Copy)]
pub struct Expected<'a> {
    pub generated: (u32, u32),
    pub source: &'a str,
    pub original: (u32, u32),
    pub name: Option<&'a str>,
}

pub const fn expected<'a>(
    generated: (u32, u32),
    source: &'a str,
    original: (u32, u32),
    name: Option<&'a str>,
) -> Expected<'a> {
    Expected {
        generated,
        source,
        original,
        name,
    }
}

/// Every exact mapping of `test_map`, with sources under `/the/root`.
pub const EXACT_MAPPINGS: [Expected<'static>; 13] = [
    expected((1, 1), "/the/root/one.js", (1, 1), None),
    expected((1, 5), "/the/root/one.js", (1, 5), None),
    expected((1, 9), "/the/root/one.js", (1, 11), None),
    expected((1, 18), "/the/root/one.js", (1, 21), Some("bar")),
    expected((1, 21), "/the/root/one.js", (2, 3), None),
    expected((1, 28), "/the/root/one.js", (2, 10), Some("baz")),
    expected((1, 32), "/the/root/one.js", (2, 14), Some("bar")),
    expected((2, 1), "/the/root/two.js", (1, 1), None),
    expected((2, 5), "/the/root/two.js", (1, 5), None),
    expected((2, 9), "/the/root/two.js", (1, 11), None),
    expected((2, 18), "/the/root/two.js", (1, 21), Some("n")),
    expected((2, 21), "/the/root/two.js", (2, 3), None),
    expected((2, 28), "/the/root/two.js", (2, 10), Some("n")),
];

pub fn consumer(raw: RawSourceMap) -> SourceMapConsumer {
    SourceMapConsumer::new(raw).unwrap()
}

/// Checks that the generated position maps to the original one.
pub fn assert_original_position(map: &impl Consumer, mapping: &Expected<'_>, bias: Bias) {
    let (line, column) = mapping.generated;
    let found = map.original_position_for(line, column, bias).unwrap();
    assert_eq!(found.source.as_deref(), Some(mapping.source), "source of {:?}", mapping);
    assert_eq!(found.line, Some(mapping.original.0), "line of {:?}", mapping);
    assert_eq!(found.column, Some(mapping.original.1), "column of {:?}", mapping);
    assert_eq!(found.name.as_deref(), mapping.name, "name of {:?}", mapping);
}

/// Checks that the original position maps to the generated one.
pub fn assert_generated_position(map: &impl Consumer, mapping: &Expected<'_>, bias: Bias) {
    let (line, column) = mapping.original;
    let found = map
        .generated_position_for(mapping.source, line, column, bias)
        .unwrap();
    assert_eq!(found.line, Some(mapping.generated.0), "line of {:?}", mapping);
    assert_eq!(found.column, Some(mapping.generated.1), "column of {:?}", mapping);
}

/// Checks both directions of an exact mapping.
pub fn assert_mapping(map: &impl Consumer, mapping: &Expected<'_>) {
    assert_original_position(map, mapping, Bias::GreatestLowerBound);
    assert_generated_position(map, mapping, Bias::GreatestLowerBound);
}

/// Checks that `each_mapping` in generated order never goes backwards.
pub fn assert_generated_order(map: &impl Consumer) {
    let mut previous = (0, 0);
    for mapping in map.each_mapping(source_map::Order::Generated).unwrap() {
        let current = (mapping.generated.line, mapping.generated.column);
        assert!(current >= previous, "{:?} came after {:?}", current, previous);
        previous = current;
    }
}

/// Checks that `each_mapping` in original order is sorted by source, then
/// original position.
pub fn assert_original_order(map: &impl Consumer) {
    let mut previous: Option<(String, u32, u32)> = None;
    for mapping in map.each_mapping(source_map::Order::Original).unwrap() {
        let original = mapping.original.unwrap();
        let current = (mapping.source.unwrap(), original.line, original.column);
        if let Some(previous) = &previous {
            assert!(&current >= previous, "{:?} came after {:?}", current, previous);
        }
        previous = Some(current);
    }
}

/// Compares two maps field by field. Source contents are only compared when
/// `actual` has them.
pub fn assert_equal_maps(actual: &RawSourceMap, expected: &RawSourceMap) {
    assert_eq!(actual.version, expected.version, "version mismatch");
    assert_eq!(actual.file, expected.file, "file mismatch");
    assert_eq!(actual.names, expected.names, "names mismatch");
    assert_eq!(actual.sources, expected.sources, "sources mismatch");
    assert_eq!(actual.source_root, expected.source_root, "sourceRoot mismatch");
    assert_eq!(actual.mappings, expected.mappings, "mappings mismatch");
    if actual.sources_content.is_some() {
        assert_eq!(
            actual.sources_content, expected.sources_content,
            "sourcesContent mismatch"
        );
    }
}

/// Routes `tracing` output of the library to the test harness. Filtered with
/// `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
