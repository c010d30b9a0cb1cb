//! A buffer of mappings that only sorts itself when the mappings were not
//! added in generated order.

use std::cmp::Ordering;

use crate::compare::compare_by_generated_positions_inflated;
use crate::mapping::Mapping;

/// Determine whether `b` is after `a` with respect to generated position.
fn generated_position_after(a: &Mapping, b: &Mapping) -> bool {
    let (line_a, line_b) = (a.generated.line, b.generated.line);
    let (column_a, column_b) = (a.generated.column, b.generated.column);
    line_b > line_a
        || (line_b == line_a && column_b >= column_a)
        || compare_by_generated_positions_inflated(a, b) != Ordering::Greater
}

#[derive(Debug, Clone)]
pub struct MappingList {
    array: Vec<Mapping>,
    sorted: bool,
    // `None` sorts before any mapping.
    last: Option<Mapping>,
}

impl Default for MappingList {
    fn default() -> Self {
        MappingList::new()
    }
}

impl MappingList {
    pub fn new() -> Self {
        MappingList {
            array: Vec::new(),
            sorted: true,
            last: None,
        }
    }

    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    /// Add the given mapping, remembering whether the order is still sorted.
    pub fn add(&mut self, mapping: Mapping) {
        let in_order = match &self.last {
            Some(last) => generated_position_after(last, &mapping),
            None => true,
        };
        if in_order {
            self.last = Some(mapping.clone());
        } else {
            self.sorted = false;
        }
        self.array.push(mapping);
    }

    /// Iterate over the mappings in insertion order, or in sorted order if a
    /// previous `to_array` already sorted them.
    pub fn unsorted_iter(&self) -> std::slice::Iter<'_, Mapping> {
        self.array.iter()
    }

    /// Rewrites every mapping in place. The buffer is re-sorted on the next
    /// `to_array` since the rewrite may change the tie order.
    pub fn update_each<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut Mapping),
    {
        self.array.iter_mut().for_each(&mut f);
        if self.array.len() > 1 {
            self.sorted = false;
        }
    }

    /// The mappings sorted by generated position. Sorting is stable and only
    /// happens when an out of order mapping was added since the last call.
    pub fn to_array(&mut self) -> &[Mapping] {
        if !self.sorted {
            self.array.sort_by(compare_by_generated_positions_inflated);
            self.sorted = true;
        }
        &self.array
    }
}
