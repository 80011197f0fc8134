//! Work-breakdown-structure codes.
//!
//! A WBS code such as `2.1.3` is both a task's identity and its position in
//! the tree: the parent of `2.1.3` is `2.1`. Nothing here looks at the tree
//! itself, so the builder and the tree operations can share it.

use std::cmp::Ordering;
use std::fmt;

/// A parsed WBS code: one integer per dot-separated segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WbsCode {
    segments: Vec<u32>,
}

impl WbsCode {
    /// Parse a dotted code. Every segment must be a run of ASCII digits;
    /// surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }

        let mut segments = Vec::new();
        for part in trimmed.split('.') {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            segments.push(part.parse().ok()?);
        }
        Some(Self { segments })
    }

    pub fn segments(&self) -> &[u32] {
        &self.segments
    }

    /// The code with its last segment dropped, if there is one.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.len() < 2 {
            return None;
        }
        Some(Self {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }
}

impl fmt::Display for WbsCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{seg}")?;
        }
        Ok(())
    }
}

// Segment-wise numeric: 1.2 < 1.10 < 2, and a parent sorts before its children.
impl Ord for WbsCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.segments.cmp(&other.segments)
    }
}

impl PartialOrd for WbsCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Parent key of a raw WBS string: everything before the last dot.
///
/// Pure string convention, no tree lookup. Returns `None` for top-level
/// codes and for empty parents (`".1"`).
pub fn parent_key(wbs: &str) -> Option<&str> {
    let (parent, _) = wbs.rsplit_once('.')?;
    if parent.is_empty() { None } else { Some(parent) }
}

/// Compare two raw WBS strings. Parseable codes sort numerically and ahead
/// of unparseable ones, which fall back to plain string order.
pub fn compare(a: &str, b: &str) -> Ordering {
    match (WbsCode::parse(a), WbsCode::parse(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
