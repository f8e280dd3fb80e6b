//! Resumable iteration over compiled index ranges.
//!
//! A group array such as `[1, 4, 8, 11, 7, 3, 5, 5]` holds `(start, end)`
//! pairs. Iterating it yields `1, 2, 3, 4, 8, 9, 10, 11, 7, 6, 5, 4, 3, 5`:
//! each pair counts from `start` towards `end` inclusive, up or down.

use std::fmt;

use curvekit_core::error::{CurveError, Result};
use curvekit_core::traits::Validate;

/// Position of an [`IndexSequencer`]: the even index of the current pair in
/// the group array and the steps already taken within that pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub pair_cursor: usize,
    pub offset: usize,
}

/// Cursor over the control-point indices a curve consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSequencer {
    group: Vec<i64>,
    cursor: Cursor,
}

impl IndexSequencer {
    /// Build from `(start, end)` pairs. At least one pair is required.
    pub fn new(pairs: &[(i64, i64)]) -> Result<Self> {
        if pairs.is_empty() {
            return Err(CurveError::invalid_argument("at least one index range required"));
        }
        let group = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();
        Ok(Self {
            group,
            cursor: Cursor::default(),
        })
    }

    /// Build from a flat group array of even, non-zero length.
    pub fn from_group_array(group: &[i64]) -> Result<Self> {
        if group.is_empty() {
            return Err(CurveError::invalid_argument("group array length cannot be 0"));
        }
        if group.len() % 2 != 0 {
            return Err(CurveError::invalid_argument("group array must have even length"));
        }
        Ok(Self {
            group: group.to_vec(),
            cursor: Cursor::default(),
        })
    }

    /// The single range `start..=end`.
    pub fn range(start: i64, end: i64) -> Self {
        Self {
            group: vec![start, end],
            cursor: Cursor::default(),
        }
    }

    /// Every index of a store holding `count` points, in order.
    pub fn all(count: usize) -> Result<Self> {
        if count == 0 {
            return Err(CurveError::invalid_argument("count > 0 required"));
        }
        Ok(Self::range(0, count as i64 - 1))
    }

    pub fn has_next(&self) -> bool {
        self.cursor.pair_cursor < self.group.len()
    }

    /// Return to the first index.
    pub fn reset(&mut self) {
        self.cursor = Cursor::default();
    }

    /// Resume from an explicit position. `pair_cursor` must be even and at
    /// most the group length; `offset` must stay within that pair's span.
    pub fn set(&mut self, pair_cursor: usize, offset: usize) -> Result<()> {
        if pair_cursor % 2 != 0 {
            return Err(CurveError::invalid_argument(format!(
                "pair cursor must be even, got {pair_cursor}"
            )));
        }
        let span = match self.group.get(pair_cursor..pair_cursor.saturating_add(2)) {
            Some(pair) => pair[0].abs_diff(pair[1]),
            None if pair_cursor == self.group.len() => 0,
            None => {
                return Err(CurveError::invalid_argument(format!(
                    "pair cursor {pair_cursor} past group length {}",
                    self.group.len()
                )))
            }
        };
        if offset as u64 > span {
            return Err(CurveError::invalid_argument(format!(
                "offset {offset} exceeds span {span} of pair {pair_cursor}"
            )));
        }
        self.cursor = Cursor { pair_cursor, offset };
        Ok(())
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Same as [`IndexSequencer::cursor`]; pairs with [`IndexSequencer::restore`].
    pub fn save(&self) -> Cursor {
        self.cursor
    }

    pub fn restore(&mut self, cursor: Cursor) {
        self.cursor = cursor;
    }

    /// Number of indices produced from the initial position, saturating at
    /// `usize::MAX`.
    pub fn total_length(&self) -> usize {
        self.group
            .chunks_exact(2)
            .map(|pair| {
                usize::try_from(pair[0].abs_diff(pair[1]))
                    .unwrap_or(usize::MAX)
                    .saturating_add(1)
            })
            .fold(0usize, usize::saturating_add)
    }

    /// Whether every produced index falls within `[min, max)`.
    pub fn is_in_range(&self, min: i64, max: i64) -> bool {
        self.group.iter().all(|&v| v >= min && v < max)
    }

    pub fn group_len(&self) -> usize {
        self.group.len()
    }

    pub fn group_value(&self, index: usize) -> Option<i64> {
        self.group.get(index).copied()
    }

    pub fn copy_group_array(&self) -> Vec<i64> {
        self.group.clone()
    }
}

impl Iterator for IndexSequencer {
    type Item = i64;

    fn next(&mut self) -> Option<i64> {
        let i = self.cursor.pair_cursor;
        let (start, end) = (*self.group.get(i)?, *self.group.get(i + 1)?);
        let offset = self.cursor.offset as u64;

        // offset never exceeds the pair's span, so the result lies between
        // start and end even when the span is wider than i64::MAX
        let (value, done) = if start <= end {
            let v = start.wrapping_add_unsigned(offset);
            (v, v >= end)
        } else {
            let v = start.wrapping_sub_unsigned(offset);
            (v, v <= end)
        };

        if done {
            self.cursor = Cursor {
                pair_cursor: i + 2,
                offset: 0,
            };
        } else {
            self.cursor.offset = self.cursor.offset.saturating_add(1);
        }
        Some(value)
    }
}

impl Validate for IndexSequencer {
    fn validate(&self) -> Result<()> {
        if self.group.is_empty() || self.group.len() % 2 != 0 {
            return Err(CurveError::invalid_state(format!(
                "malformed group array of length {}",
                self.group.len()
            )));
        }
        Ok(())
    }
}

impl fmt::Display for IndexSequencer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, pair) in self.group.chunks_exact(2).enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}:{}", pair[0], pair[1])?;
        }
        Ok(())
    }
}
