use anyhow::{anyhow, bail, Result};
use semver::{Version, VersionReq};
use std::fmt;
use std::str::FromStr;

mod interval;

pub use interval::{is_subset, min_version};
pub(crate) use interval::Interval;

/// An npm version range: one or more comparator sets joined by `||`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmRange {
    raw: String,
    sets: Vec<VersionReq>,
}

impl NpmRange {
    pub fn parse(input: &str) -> Result<Self> {
        let raw = input.trim();
        if raw.is_empty() {
            bail!("empty version range");
        }
        let mut sets = Vec::new();
        for part in raw.split("||") {
            let part = part.trim();
            let norm = canonicalize_npm_range(part);
            let req = if norm == "*" {
                VersionReq::STAR
            } else {
                VersionReq::from_str(&norm).map_err(|e| {
                    anyhow!("invalid semver range '{}' (orig '{}'): {}", norm, part, e)
                })?
            };
            sets.push(req);
        }
        Ok(Self { raw: raw.to_string(), sets })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn sets(&self) -> &[VersionReq] {
        &self.sets
    }

    pub fn matches(&self, version: &Version) -> bool {
        self.sets.iter().any(|r| r.matches(version))
    }

    /// One interval per `||` alternative; `None` if an operator has no interval form.
    pub(crate) fn intervals(&self) -> Option<Vec<Interval>> {
        self.sets.iter().map(Interval::from_req).collect()
    }
}

impl fmt::Display for NpmRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Coerce `version` (e.g. `^0.77.0`, `~1.2`, `v18`) and test it against `range`.
pub fn satisfies(version: &str, range: &NpmRange) -> bool {
    coerce(version).map(|v| range.matches(&v)).unwrap_or(false)
}

/// npm-style coercion: the first run of up to three dot-separated numbers.
pub fn coerce(input: &str) -> Option<Version> {
    let bytes = input.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if !bytes[i].is_ascii_digit() || (i > 0 && bytes[i - 1].is_ascii_digit()) {
            i += 1;
            continue;
        }
        let mut parts = [0u64; 3];
        let mut count = 0;
        let mut j = i;
        loop {
            let start = j;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j - start > 16 {
                break;
            }
            match input[start..j].parse::<u64>() {
                Ok(n) => parts[count] = n,
                Err(_) => break,
            }
            count += 1;
            let continues = count < 3
                && j + 1 < bytes.len()
                && bytes[j] == b'.'
                && bytes[j + 1].is_ascii_digit();
            if !continues {
                break;
            }
            j += 1;
        }
        if count > 0 {
            return Some(Version::new(parts[0], parts[1], parts[2]));
        }
        i = j.max(i + 1);
    }
    None
}

/// Reduce every alternative of a range to `major.minor`, e.g. `^0.77.3 || 0.78` -> `0.77 || 0.78`.
pub fn drop_patch(range: &str) -> String {
    range
        .split("||")
        .map(|alt| {
            let alt = alt.trim();
            match coerce(alt) {
                Some(v) => format!("{}.{}", v.major, v.minor),
                None => alt.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" || ")
}

/// Rewrite a single npm comparator set (no `||`) into `semver::VersionReq` syntax.
pub fn canonicalize_npm_range(input: &str) -> String {
    let s = input.trim();
    if s.is_empty() || s == "*" || s.eq_ignore_ascii_case("x") {
        return "*".into();
    }

    // Alternatives are split by the caller.
    if s.contains("||") {
        return s.to_string();
    }

    // Hyphen range: "1.2.3 - 2.3.4" => ">=1.2.3, <=2.3.4"
    if let Some(idx) = s.find(" - ") {
        // require spaces around - to avoid confusion with prerelease
        let (a, b) = s.split_at(idx);
        let left = strip_v(a.trim());
        let right = strip_v(b[3..].trim());
        if is_version_like(left) && is_version_like(right) {
            return format!(">={left}, <={right}");
        }
    }

    let tokens: Vec<&str> = s.split_whitespace().collect();
    let mut comps: Vec<String> = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let t = tokens[i];
        if is_op(t) {
            if let Some(ver) = tokens.get(i + 1) {
                comps.push(format!("{t}{}", strip_v(ver)));
                i += 2;
                continue;
            }
            // dangling operator – let semver report it
            return s.to_string();
        }
        if let Some((op, rest)) = split_op(t) {
            comps.push(format!("{op}{}", strip_v(rest)));
            i += 1;
            continue;
        }
        let bare = strip_v(t);
        if is_version_like(bare) {
            comps.push(bare_comparator(bare));
            i += 1;
            continue;
        }
        // Unknown token – give up and return original
        return s.to_string();
    }
    comps.join(", ")
}

fn bare_comparator(t: &str) -> String {
    if Version::parse(t).is_ok() {
        return format!("={t}");
    }
    if t.contains('x') || t.contains('X') || t.contains('*') {
        return expand_wildcard(t);
    }
    let parts: Vec<&str> = t.split('.').collect();
    let nums: Vec<u64> = parts.iter().filter_map(|p| p.parse::<u64>().ok()).collect();
    if nums.len() != parts.len() {
        return t.to_string();
    }
    match nums.as_slice() {
        [maj] => format!(">={maj}.0.0, <{}.0.0", maj + 1),
        [maj, min] => format!(">={maj}.{min}.0, <{maj}.{}.0", min + 1),
        _ => format!("={t}"),
    }
}

fn expand_wildcard(pattern: &str) -> String {
    // Patterns: 1.x, 1.2.x, 1.* etc
    let parts: Vec<&str> = pattern.split('.').collect();
    let is_wild = |p: &str| p.eq_ignore_ascii_case("x") || p == "*";
    match parts.as_slice() {
        [maj, rest @ ..] if is_wild(maj) && rest.iter().all(|p| is_wild(p)) => "*".into(),
        [maj, min] if is_wild(min) => match maj.parse::<u64>() {
            Ok(maj) => format!(">={maj}.0.0, <{}.0.0", maj + 1),
            Err(_) => pattern.to_string(),
        },
        [maj, min, patch] if is_wild(patch) => {
            match (maj.parse::<u64>(), min.parse::<u64>()) {
                (Ok(maj), Ok(min)) => format!(">={maj}.{min}.0, <{maj}.{}.0", min + 1),
                (Ok(maj), Err(_)) if is_wild(min) => format!(">={maj}.0.0, <{}.0.0", maj + 1),
                _ => pattern.to_string(),
            }
        }
        _ => pattern.to_string(),
    }
}

fn is_op(t: &str) -> bool {
    matches!(t, ">" | "<" | ">=" | "<=" | "=" | "^" | "~")
}

fn split_op(t: &str) -> Option<(&str, &str)> {
    let end = t.find(|c: char| !matches!(c, '>' | '<' | '=' | '^' | '~'))?;
    if end == 0 {
        return None;
    }
    Some(t.split_at(end))
}

fn strip_v(t: &str) -> &str {
    match t.strip_prefix('v').or_else(|| t.strip_prefix('V')) {
        Some(rest) if rest.starts_with(|c: char| c.is_ascii_digit()) => rest,
        _ => t,
    }
}

fn is_version_like(t: &str) -> bool {
    let mut has_digit = false;
    for c in t.chars() {
        if c.is_ascii_digit() {
            has_digit = true;
            continue;
        }
        if !matches!(c, '.' | '-' | '+' | 'x' | 'X' | '*' | 'a'..='z' | 'A'..='Z') {
            return false;
        }
    }
    has_digit
}
