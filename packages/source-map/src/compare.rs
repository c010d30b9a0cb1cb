//! Total orders over mappings
//!
//! Nullable integer fields compare as if a missing value were zero, so a
//! missing line equals line 0 and sorts before every real line.

use std::cmp::Ordering;

use crate::mapping::{Mapping, ParsedMapping};

fn compare_nullable(a: Option<u32>, b: Option<u32>) -> Ordering {
    a.unwrap_or(0).cmp(&b.unwrap_or(0))
}

/// Orders by original position first. With `only_compare_original` the
/// comparison stops after the original column.
pub(crate) fn compare_by_original_positions(
    a: &ParsedMapping,
    b: &ParsedMapping,
    only_compare_original: bool,
) -> Ordering {
    let cmp = compare_nullable(a.source, b.source)
        .then_with(|| compare_nullable(a.original_line, b.original_line))
        .then_with(|| compare_nullable(a.original_column, b.original_column));
    if cmp != Ordering::Equal || only_compare_original {
        return cmp;
    }

    a.generated_column
        .cmp(&b.generated_column)
        .then_with(|| a.generated_line.cmp(&b.generated_line))
        .then_with(|| compare_nullable(a.name, b.name))
}

/// Orders by generated position first, comparing interned source and name
/// indices. With `only_compare_generated` the comparison stops after the
/// generated column.
pub(crate) fn compare_by_generated_positions_deflated(
    a: &ParsedMapping,
    b: &ParsedMapping,
    only_compare_generated: bool,
) -> Ordering {
    let cmp = a
        .generated_line
        .cmp(&b.generated_line)
        .then_with(|| a.generated_column.cmp(&b.generated_column));
    if cmp != Ordering::Equal || only_compare_generated {
        return cmp;
    }

    compare_nullable(a.source, b.source)
        .then_with(|| compare_nullable(a.original_line, b.original_line))
        .then_with(|| compare_nullable(a.original_column, b.original_column))
        .then_with(|| compare_nullable(a.name, b.name))
}

/// Orders materialized mappings by generated position, then by the source
/// and name strings. A missing string sorts before any present one.
pub fn compare_by_generated_positions_inflated(a: &Mapping, b: &Mapping) -> Ordering {
    let line = |m: &Mapping| m.original.map(|p| p.line);
    let column = |m: &Mapping| m.original.map(|p| p.column);

    a.generated
        .line
        .cmp(&b.generated.line)
        .then_with(|| a.generated.column.cmp(&b.generated.column))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| compare_nullable(line(a), line(b)))
        .then_with(|| compare_nullable(column(a), column(b)))
        .then_with(|| a.name.cmp(&b.name))
}
