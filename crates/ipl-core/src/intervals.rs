//! Style intervals produced by analysis passes.
//!
//! The engine does not store or render styles. It only produces `[start, end)` char-offset
//! intervals tagged with a [`StyleId`]; the host maps ids to colors.

use serde::Serialize;

/// Style ID type
pub type StyleId = u32;

/// Style id for error-severity diagnostic underlines.
pub const DIAGNOSTIC_ERROR_STYLE_ID: StyleId = 0x0400_0001;
/// Style id for warning-severity diagnostic underlines.
pub const DIAGNOSTIC_WARNING_STYLE_ID: StyleId = 0x0400_0002;
/// Style id for info-severity diagnostic underlines.
pub const DIAGNOSTIC_INFO_STYLE_ID: StyleId = 0x0400_0003;

/// Style layer ID
///
/// Used to distinguish style sources (syntax highlighting, diagnostic underlines), allowing
/// replacement/clearing of one layer without affecting the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct StyleLayerId(pub u32);

impl StyleLayerId {
    /// Create a style layer id from a raw numeric identifier.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// IPL token highlighting layer.
    pub const IPL_SYNTAX: Self = Self(2);

    /// Diagnostic underline layer.
    pub const DIAGNOSTICS: Self = Self(4);
}

/// Interval structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interval {
    /// Start char offset
    pub start: usize,
    /// End char offset (exclusive)
    pub end: usize,
    /// Style ID
    pub style_id: StyleId,
}

impl Interval {
    /// Create a new interval with `[start, end)` offsets and a style id.
    pub fn new(start: usize, end: usize, style_id: StyleId) -> Self {
        Self {
            start,
            end,
            style_id,
        }
    }

    /// Check if interval contains a specific position
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Check if two intervals overlap
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_contains_is_half_open() {
        let interval = Interval::new(2, 5, 1);
        assert!(interval.contains(2));
        assert!(interval.contains(4));
        assert!(!interval.contains(5));
    }

    #[test]
    fn test_interval_overlaps() {
        let a = Interval::new(0, 4, 1);
        assert!(a.overlaps(&Interval::new(3, 6, 1)));
        assert!(!a.overlaps(&Interval::new(4, 6, 1)));
    }
}
