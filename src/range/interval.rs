use super::{coerce, NpmRange};
use semver::{BuildMetadata, Comparator, Op, Prerelease, Version, VersionReq};
use std::cmp::Ordering;
use std::ops::Bound;

/// The set of versions a single comparator set admits, as `[lower, upper]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub lower: Bound<Version>,
    pub upper: Bound<Version>,
}

impl Interval {
    pub fn full() -> Self {
        Self { lower: Bound::Included(Version::new(0, 0, 0)), upper: Bound::Unbounded }
    }

    pub fn from_req(req: &VersionReq) -> Option<Self> {
        req.comparators
            .iter()
            .try_fold(Self::full(), |acc, c| Some(acc.intersect(Self::from_comparator(c)?)))
    }

    fn from_comparator(c: &Comparator) -> Option<Self> {
        let floor = Version {
            major: c.major,
            minor: c.minor.unwrap_or(0),
            patch: c.patch.unwrap_or(0),
            pre: c.pre.clone(),
            build: BuildMetadata::EMPTY,
        };
        // First version past a partial spec: `1` -> 2.0.0, `1.2` -> 1.3.0.
        let past_partial = match c.minor {
            None => Version::new(c.major + 1, 0, 0),
            Some(minor) => Version::new(c.major, minor + 1, 0),
        };
        let zero = Bound::Included(Version::new(0, 0, 0));
        let interval = match c.op {
            Op::Exact | Op::Wildcard => {
                if c.patch.is_some() {
                    Self { lower: Bound::Included(floor.clone()), upper: Bound::Included(floor) }
                } else {
                    Self { lower: Bound::Included(floor), upper: Bound::Excluded(past_partial) }
                }
            }
            Op::Greater => {
                if c.patch.is_some() {
                    Self { lower: Bound::Excluded(floor), upper: Bound::Unbounded }
                } else {
                    Self { lower: Bound::Included(past_partial), upper: Bound::Unbounded }
                }
            }
            Op::GreaterEq => Self { lower: Bound::Included(floor), upper: Bound::Unbounded },
            Op::Less => Self { lower: zero, upper: Bound::Excluded(floor) },
            Op::LessEq => {
                if c.patch.is_some() {
                    Self { lower: zero, upper: Bound::Included(floor) }
                } else {
                    Self { lower: zero, upper: Bound::Excluded(past_partial) }
                }
            }
            Op::Tilde => {
                let upper = match c.minor {
                    Some(minor) => Version::new(c.major, minor + 1, 0),
                    None => Version::new(c.major + 1, 0, 0),
                };
                Self { lower: Bound::Included(floor), upper: Bound::Excluded(upper) }
            }
            Op::Caret => {
                let upper = if c.major > 0 {
                    Version::new(c.major + 1, 0, 0)
                } else {
                    match (c.minor, c.patch) {
                        (None, _) => Version::new(1, 0, 0),
                        (Some(0), Some(patch)) => Version::new(0, 0, patch + 1),
                        (Some(minor), _) => Version::new(0, minor + 1, 0),
                    }
                };
                Self { lower: Bound::Included(floor), upper: Bound::Excluded(upper) }
            }
            _ => return None,
        };
        Some(interval)
    }

    pub fn intersect(self, other: Self) -> Self {
        let lower = if cmp_lower(&self.lower, &other.lower) == Ordering::Less {
            other.lower
        } else {
            self.lower
        };
        let upper = if cmp_upper(&self.upper, &other.upper) == Ordering::Greater {
            other.upper
        } else {
            self.upper
        };
        Self { lower, upper }
    }

    pub fn is_empty(&self) -> bool {
        match (&self.lower, &self.upper) {
            (_, Bound::Unbounded) | (Bound::Unbounded, _) => false,
            (Bound::Included(l), Bound::Included(h)) => l > h,
            (Bound::Included(l), Bound::Excluded(h))
            | (Bound::Excluded(l), Bound::Included(h))
            | (Bound::Excluded(l), Bound::Excluded(h)) => l >= h,
        }
    }

    /// Whether every version admitted by `other` is admitted by `self`.
    pub fn contains(&self, other: &Interval) -> bool {
        other.is_empty()
            || (cmp_lower(&self.lower, &other.lower) != Ordering::Greater
                && cmp_upper(&other.upper, &self.upper) != Ordering::Greater)
    }

    pub fn lowest(&self) -> Option<Version> {
        if self.is_empty() {
            return None;
        }
        match &self.lower {
            Bound::Included(v) => Some(v.clone()),
            Bound::Excluded(v) if v.pre.is_empty() => {
                Some(Version::new(v.major, v.minor, v.patch + 1))
            }
            Bound::Excluded(v) => Some(Version { pre: Prerelease::EMPTY, ..v.clone() }),
            Bound::Unbounded => Some(Version::new(0, 0, 0)),
        }
    }
}

// Included(v) starts lower than Excluded(v); Unbounded is -inf.
fn cmp_lower(a: &Bound<Version>, b: &Bound<Version>) -> Ordering {
    fn key(b: &Bound<Version>) -> Option<(&Version, u8)> {
        match b {
            Bound::Included(v) => Some((v, 0)),
            Bound::Excluded(v) => Some((v, 1)),
            Bound::Unbounded => None,
        }
    }
    match (key(a), key(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

// Excluded(v) ends lower than Included(v); Unbounded is +inf.
fn cmp_upper(a: &Bound<Version>, b: &Bound<Version>) -> Ordering {
    fn key(b: &Bound<Version>) -> Option<(&Version, u8)> {
        match b {
            Bound::Included(v) => Some((v, 1)),
            Bound::Excluded(v) => Some((v, 0)),
            Bound::Unbounded => None,
        }
    }
    match (key(a), key(b)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) => x.cmp(&y),
    }
}

/// Whether `sub` only admits versions that `dom` also admits.
///
/// Specifiers that are not version ranges (`file:`, `github:`, `catalog:`,
/// tags) are compared verbatim.
pub fn is_subset(sub: &str, dom: &str) -> bool {
    if coerce(sub).is_none() || coerce(dom).is_none() {
        return sub == dom;
    }
    let (Ok(sub_range), Ok(dom_range)) = (NpmRange::parse(sub), NpmRange::parse(dom)) else {
        return sub == dom;
    };
    let (Some(sub_sets), Some(dom_sets)) = (sub_range.intervals(), dom_range.intervals()) else {
        return sub == dom;
    };
    sub_sets.iter().all(|s| dom_sets.iter().any(|d| d.contains(s)))
}

/// Lowest version satisfying `range`, if any.
pub fn min_version(range: &str) -> Option<Version> {
    let parsed = NpmRange::parse(range).ok()?;
    parsed.intervals()?.iter().filter_map(Interval::lowest).min()
}
