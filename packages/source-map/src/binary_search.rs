//! Nearest-match binary search

use std::cmp::Ordering;

/// Which neighbour to return when the needle is not found exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Bias {
    /// The closest element smaller than the needle.
    #[default]
    GreatestLowerBound,
    /// The closest element larger than the needle.
    LeastUpperBound,
}

/// Searches the sorted `haystack` for `needle`.
///
/// Returns the index of an exact match, or of the nearest element in the
/// direction of `bias`, or `None` when there is no such element. When several
/// elements compare equal, the lowest index among them is returned.
pub fn search<T, F>(needle: &T, haystack: &[T], compare: F, bias: Bias) -> Option<usize>
where
    F: Fn(&T, &T) -> Ordering,
{
    if haystack.is_empty() {
        return None;
    }

    let mut index = nearest(needle, haystack, &compare, bias)?;

    // We have found either the exact element, or the next-closest element to
    // the one we are searching for. There may be several elements equal to
    // it, so walk back to the first.
    while index > 0 && compare(&haystack[index], &haystack[index - 1]) == Ordering::Equal {
        index -= 1;
    }

    Some(index)
}

/// Narrows `(low, high)` until the needle is found or the bounds are
/// adjacent. `low` starts one before the first element and `high` one past
/// the last.
fn nearest<T, F>(needle: &T, haystack: &[T], compare: &F, bias: Bias) -> Option<usize>
where
    F: Fn(&T, &T) -> Ordering,
{
    let mut low: isize = -1;
    let mut high: isize = haystack.len() as isize;

    loop {
        let mid = (high - low) / 2 + low;
        match compare(needle, &haystack[mid as usize]) {
            Ordering::Equal => return Some(mid as usize),
            Ordering::Greater => {
                if high - mid > 1 {
                    low = mid;
                    continue;
                }
                return match bias {
                    Bias::LeastUpperBound => {
                        (high < haystack.len() as isize).then_some(high as usize)
                    }
                    Bias::GreatestLowerBound => Some(mid as usize),
                };
            }
            Ordering::Less => {
                if mid - low > 1 {
                    high = mid;
                    continue;
                }
                return match bias {
                    Bias::LeastUpperBound => Some(mid as usize),
                    Bias::GreatestLowerBound => (low >= 0).then_some(low as usize),
                };
            }
        }
    }
}
