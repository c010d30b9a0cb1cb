//! Mapping types shared by the generator and the consumers.

/// A 1-based line and 0-based column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

/// A mapping with its source and name spelled out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mapping {
    pub generated: Position,
    pub original: Option<Position>,
    pub source: Option<String>,
    pub name: Option<String>,
}

impl Mapping {
    /// A mapping that only marks a generated position.
    pub fn generated_only(generated: Position) -> Self {
        Mapping {
            generated,
            original: None,
            source: None,
            name: None,
        }
    }

    pub fn new(generated: Position, original: Position, source: impl Into<String>) -> Self {
        Mapping {
            generated,
            original: Some(original),
            source: Some(source.into()),
            name: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// The answer of `original_position_for`. Every field is `None` when no
/// mapping covers the queried position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OriginalPosition {
    pub source: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub name: Option<String>,
}

/// The answer of `generated_position_for` and the entries of
/// `all_generated_positions_for`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratedPosition {
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub last_column: Option<u32>,
}

/// A decoded mapping whose source and name are indices into the consumer's
/// tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ParsedMapping {
    pub generated_line: u32,
    pub generated_column: u32,
    pub last_generated_column: Option<u32>,
    pub source: Option<u32>,
    pub original_line: Option<u32>,
    pub original_column: Option<u32>,
    pub name: Option<u32>,
}

impl ParsedMapping {
    pub fn at_generated(line: u32, column: u32) -> Self {
        ParsedMapping {
            generated_line: line,
            generated_column: column,
            ..Default::default()
        }
    }

    pub fn original_needle(source: u32, line: u32, column: u32) -> Self {
        ParsedMapping {
            source: Some(source),
            original_line: Some(line),
            original_column: Some(column),
            ..Default::default()
        }
    }
}
