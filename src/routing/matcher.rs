//! Path template matching.
//!
//! # Responsibilities
//! - Compile `/api/v1/ClientData/{id}` style templates into segments
//! - Match a concrete path against a compiled template
//! - Capture `{name}` segments as path parameters
//!
//! # Design Decisions
//! - Literal segments compare ASCII case-insensitively
//! - A placeholder matches exactly one non-empty segment
//! - Anchored at both ends: segment counts must be equal
//! - Request paths are split on raw `/` first, then each segment is
//!   percent-decoded, so `%2F` never creates a new segment
//! - No regex, so matching is O(segments)

use std::borrow::Cow;
use std::fmt;

use percent_encoding::percent_decode_str;

/// One compiled segment of a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// A compiled path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
}

impl PathTemplate {
    /// Compile a template string.
    ///
    /// Only whole segments of the form `{name}` are placeholders; anything
    /// else (including `prefix{name}`) is literal text.
    pub fn new(template: impl Into<String>) -> Self {
        let raw = template.into();
        let segments = split_segments(&raw)
            .map(|segment| {
                match segment
                    .strip_prefix('{')
                    .and_then(|s| s.strip_suffix('}'))
                    .filter(|name| !name.is_empty())
                {
                    Some(name) => Segment::Param(name.to_string()),
                    None => Segment::Literal(segment.to_string()),
                }
            })
            .collect();
        Self { raw, segments }
    }

    /// The template as declared.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Names of the placeholders, in order.
    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Param(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Match `path` and capture placeholder values, or `None` on mismatch.
    pub fn capture(&self, path: &str) -> Option<PathParams> {
        if !path.starts_with('/') {
            return None;
        }

        let mut params = PathParams::default();
        let mut actual = split_segments(path);

        for expected in &self.segments {
            let segment = decode_segment(actual.next()?);
            match expected {
                Segment::Literal(literal) => {
                    if !literal.eq_ignore_ascii_case(&segment) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if segment.is_empty() {
                        return None;
                    }
                    params.insert(name.clone(), segment.into_owned());
                }
            }
        }

        // Anchored: leftover segments mean the path is longer than the template.
        if actual.next().is_some() {
            return None;
        }
        Some(params)
    }

    /// True if `path` matches this template.
    pub fn matches(&self, path: &str) -> bool {
        self.capture(path).is_some()
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Segments after the leading slash. `/` yields a single empty segment.
fn split_segments(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

/// Percent-decode one raw segment. Invalid UTF-8 is replaced, not rejected.
fn decode_segment(segment: &str) -> Cow<'_, str> {
    percent_decode_str(segment).decode_utf8_lossy()
}

/// Path parameters captured from a request, looked up case-insensitively.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathParams {
    entries: Vec<(String, String)>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a value. A name already present (ignoring case) is overwritten.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(&name)) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PathParams {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut params = PathParams::new();
        for (k, v) in iter {
            params.insert(k, v);
        }
        params
    }
}
