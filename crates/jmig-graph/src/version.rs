//! Version parsing and declared-constraint evaluation
//!
//! Versions compare component-wise on their numeric prefix:
//! - `-qualifier` suffixes are dropped (`6.0.0-M1` == `6.0.0`)
//! - non-numeric components count as 0
//! - missing components count as 0 (`6.0` == `6.0.0`)

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Dotted numeric version
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Version {
    parts: Vec<u64>,
}

impl Version {
    /// Parse leniently; never fails
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let parts = text
            .trim()
            .split('.')
            .map(|part| {
                let numeric = part.split('-').next().unwrap_or_default();
                numeric.parse::<u64>().unwrap_or(0)
            })
            .collect();
        Self { parts }
    }

    /// First component
    #[inline]
    #[must_use]
    pub fn major(&self) -> u64 {
        self.parts.first().copied().unwrap_or(0)
    }

    /// Component at `index`, 0 when absent
    #[inline]
    #[must_use]
    pub fn component(&self, index: usize) -> u64 {
        self.parts.get(index).copied().unwrap_or(0)
    }

    /// Whether this version is at least `minimum`
    #[inline]
    #[must_use]
    pub fn at_least(&self, minimum: &str) -> bool {
        *self >= Self::parse(minimum)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.parts.len().max(other.parts.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ord| *ord != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: Vec<String> = self.parts.iter().map(ToString::to_string).collect();
        f.write_str(&text.join("."))
    }
}

/// One bound of a version range
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bound {
    /// Bound value
    pub version: Version,
    /// Whether the bound itself is allowed
    pub inclusive: bool,
}

/// Interval between optional bounds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRange {
    /// Lower bound, unbounded when `None`
    pub lower: Option<Bound>,
    /// Upper bound, unbounded when `None`
    pub upper: Option<Bound>,
}

impl VersionRange {
    /// Whether `version` lies inside the interval
    #[must_use]
    pub fn contains(&self, version: &Version) -> bool {
        let above = self.lower.as_ref().map_or(true, |b| {
            if b.inclusive {
                *version >= b.version
            } else {
                *version > b.version
            }
        });
        let below = self.upper.as_ref().map_or(true, |b| {
            if b.inclusive {
                *version <= b.version
            } else {
                *version < b.version
            }
        });
        above && below
    }
}

/// Declared version as written in a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VersionConstraint {
    /// A single pinned version
    Exact(Version),
    /// Union of Maven-style ranges
    Ranges(Vec<VersionRange>),
    /// Placeholder, property reference or blank
    Unresolved,
}

static RANGE_GROUP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([\[(])\s*([^,\])]*)\s*(?:,\s*([^\])]*))?\s*([\])])").expect("valid regex literal")
});

impl VersionConstraint {
    /// Parse declared version text
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() || text == crate::artifact::UNKNOWN_VERSION || text.contains("${") {
            return Self::Unresolved;
        }
        if !text.starts_with('[') && !text.starts_with('(') {
            return Self::Exact(Version::parse(text));
        }

        let mut ranges = Vec::new();
        for caps in RANGE_GROUP.captures_iter(text) {
            let open_inclusive = &caps[1] == "[";
            let close_inclusive = &caps[4] == "]";
            let first = caps.get(2).map_or("", |m| m.as_str().trim());
            match caps.get(3) {
                // `[1.5]` pins a single version
                None => {
                    if first.is_empty() {
                        continue;
                    }
                    let bound = Bound {
                        version: Version::parse(first),
                        inclusive: true,
                    };
                    ranges.push(VersionRange {
                        lower: Some(bound.clone()),
                        upper: Some(bound),
                    });
                }
                Some(second) => {
                    let second = second.as_str().trim();
                    let lower = (!first.is_empty()).then(|| Bound {
                        version: Version::parse(first),
                        inclusive: open_inclusive,
                    });
                    let upper = (!second.is_empty()).then(|| Bound {
                        version: Version::parse(second),
                        inclusive: close_inclusive,
                    });
                    ranges.push(VersionRange { lower, upper });
                }
            }
        }

        if ranges.is_empty() {
            Self::Unresolved
        } else {
            Self::Ranges(ranges)
        }
    }

    /// Whether `version` satisfies the constraint
    ///
    /// An exact declaration is a soft requirement and allows any version;
    /// `Unresolved` allows nothing because it cannot be evaluated.
    #[must_use]
    pub fn allows(&self, version: &Version) -> bool {
        match self {
            Self::Exact(_) => true,
            Self::Ranges(ranges) => ranges.iter().any(|r| r.contains(version)),
            Self::Unresolved => false,
        }
    }

    /// Whether the constraint is a hard range
    #[inline]
    #[must_use]
    pub fn is_range(&self) -> bool {
        matches!(self, Self::Ranges(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compare_ignores_qualifiers_and_padding() {
        assert_eq!(Version::parse("6.0"), Version::parse("6.0.0"));
        assert_eq!(Version::parse("6.0.0-M1"), Version::parse("6.0.0"));
        assert!(Version::parse("5.3.27") < Version::parse("6.0.0"));
        assert!(Version::parse("3.1.0").at_least("3.0.0"));
        assert_eq!(Version::parse("x.2"), Version::parse("0.2"));
    }

    #[test]
    fn major_component() {
        assert_eq!(Version::parse("4.0.1").major(), 4);
        assert_eq!(Version::parse("").major(), 0);
    }

    #[test]
    fn parse_ranges() {
        let c = VersionConstraint::parse("[1.0,2.0)");
        assert!(c.allows(&Version::parse("1.0")));
        assert!(c.allows(&Version::parse("1.9.9")));
        assert!(!c.allows(&Version::parse("2.0")));

        let open = VersionConstraint::parse("[3.0,)");
        assert!(open.allows(&Version::parse("99")));
        assert!(!open.allows(&Version::parse("2.9")));

        let upper = VersionConstraint::parse("(,4.0]");
        assert!(upper.allows(&Version::parse("4.0")));
        assert!(!upper.allows(&Version::parse("4.0.1")));

        let pinned = VersionConstraint::parse("[1.5]");
        assert!(pinned.allows(&Version::parse("1.5.0")));
        assert!(!pinned.allows(&Version::parse("1.6")));
    }

    #[test]
    fn union_of_ranges() {
        let c = VersionConstraint::parse("[1.0,2.0),[3.0,4.0)");
        assert!(c.allows(&Version::parse("3.5")));
        assert!(!c.allows(&Version::parse("2.5")));
    }

    #[test]
    fn unresolved_and_exact() {
        assert_eq!(VersionConstraint::parse("${servlet.version}"), VersionConstraint::Unresolved);
        assert_eq!(VersionConstraint::parse("unknown"), VersionConstraint::Unresolved);
        assert!(matches!(VersionConstraint::parse("4.0.1"), VersionConstraint::Exact(_)));
        assert!(VersionConstraint::parse("4.0.1").allows(&Version::parse("6.0.0")));
    }
}
