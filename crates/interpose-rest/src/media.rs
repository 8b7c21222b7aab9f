//! Media types and `Accept` header negotiation.
//!
//! A client's `Accept` header lists media ranges with optional weights:
//!
//! ```text
//! Accept: application/json;q=0.9, text/*;q=0.5, */*;q=0.1
//! ```
//!
//! [`negotiate`] picks, from an ordered list of supported [`MediaType`]s,
//! the one the client weights highest. Each supported type takes its weight
//! from the most specific range that matches it (exact beats `type/*` beats
//! `*/*`). Ties go to the earlier supported type, and when nothing is
//! acceptable the first supported type is used.

use std::fmt;

/// A representation the negotiator can produce, with every content type
/// that names it. The first content type is the canonical one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    name: String,
    content_types: Vec<String>,
}

impl MediaType {
    /// Creates a media type. `content_types` must not be empty; its first
    /// entry is the canonical content type.
    pub fn new<I, S>(name: impl Into<String>, content_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let content_types: Vec<String> = content_types
            .into_iter()
            .map(|s| s.into().to_ascii_lowercase())
            .collect();
        debug_assert!(!content_types.is_empty(), "media type needs a content type");
        Self {
            name: name.into(),
            content_types,
        }
    }

    /// `application/json`.
    pub fn json() -> Self {
        Self::new("json", ["application/json"])
    }

    /// `application/xml`, `text/xml`.
    pub fn xml() -> Self {
        Self::new("xml", ["application/xml", "text/xml"])
    }

    /// `application/yaml`, `application/x-yaml`, `text/yaml`.
    pub fn yaml() -> Self {
        Self::new("yaml", ["application/yaml", "application/x-yaml", "text/yaml"])
    }

    /// JSON, XML and YAML, in that order.
    pub fn defaults() -> Vec<MediaType> {
        vec![Self::json(), Self::xml(), Self::yaml()]
    }

    /// Short name, such as `json`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Canonical content type.
    pub fn content_type(&self) -> &str {
        self.content_types.first().map_or("", String::as_str)
    }

    /// Every content type naming this media type.
    pub fn content_types(&self) -> &[String] {
        &self.content_types
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.content_type())
    }
}

/// One media range of an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    kind: String,
    subtype: String,
    weight: f32,
}

impl MediaRange {
    /// The `q` weight, between 0 and 1.
    pub fn weight(&self) -> f32 {
        self.weight
    }

    /// How specifically this range matches `content_type`: 3 for an exact
    /// match, 2 for `type/*`, 1 for `*/*`.
    fn specificity(&self, content_type: &str) -> Option<u8> {
        let (kind, subtype) = content_type.split_once('/')?;
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", "*") => Some(1),
            (k, "*") if k == kind => Some(2),
            (k, s) if k == kind && s == subtype => Some(3),
            _ => None,
        }
    }
}

/// Parses an `Accept` header. Ranges that are not `type/subtype` are
/// skipped; a `q` parameter that does not parse counts as 0.
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    header.split(',').filter_map(parse_range).collect()
}

fn parse_range(raw: &str) -> Option<MediaRange> {
    let mut parts = raw.split(';');
    let essence = parts.next()?.trim().to_ascii_lowercase();
    let (kind, subtype) = essence.split_once('/')?;
    if kind.is_empty() || subtype.is_empty() {
        return None;
    }

    let mut weight = 1.0;
    for param in parts {
        if let Some((name, value)) = param.split_once('=') {
            if name.trim().eq_ignore_ascii_case("q") {
                weight = parse_weight(value.trim());
            }
        }
    }

    Some(MediaRange {
        kind: kind.to_string(),
        subtype: subtype.to_string(),
        weight,
    })
}

fn parse_weight(value: &str) -> f32 {
    match value.parse::<f32>() {
        Ok(q) if (0.0..=1.0).contains(&q) => q,
        _ => 0.0,
    }
}

/// Outcome of a negotiation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Negotiated<'a> {
    /// The selected media type.
    pub media_type: &'a MediaType,
    /// The content type to send: the one the client named, or the canonical
    /// one when it matched through a wildcard.
    pub content_type: &'a str,
    /// Weight the client gave it; 0 when nothing was acceptable.
    pub weight: f32,
}

/// Selects a media type from `supported` for the given `Accept` header.
///
/// Returns `None` only if `supported` is empty.
pub fn negotiate<'a>(accept: Option<&str>, supported: &'a [MediaType]) -> Option<Negotiated<'a>> {
    let first = supported.first()?;
    let fallback = Negotiated {
        media_type: first,
        content_type: first.content_type(),
        weight: 0.0,
    };

    let ranges = match accept.map(str::trim) {
        Some(header) if !header.is_empty() => parse_accept(header),
        _ => {
            return Some(Negotiated {
                weight: 1.0,
                ..fallback
            })
        }
    };

    let mut best: Option<Negotiated<'a>> = None;
    for media_type in supported {
        let Some((content_type, weight)) = weigh(media_type, &ranges) else {
            continue;
        };
        if weight <= 0.0 {
            continue;
        }
        if best.map_or(true, |b| weight > b.weight) {
            best = Some(Negotiated {
                media_type,
                content_type,
                weight,
            });
        }
    }
    Some(best.unwrap_or(fallback))
}

/// Weight the client gives `media_type`, and the content type it matched
/// on. The most specific matching range decides the weight.
fn weigh<'a>(media_type: &'a MediaType, ranges: &[MediaRange]) -> Option<(&'a str, f32)> {
    let mut best: Option<(u8, f32, &'a str)> = None;
    for (index, content_type) in media_type.content_types().iter().enumerate() {
        for range in ranges {
            let Some(specificity) = range.specificity(content_type) else {
                continue;
            };
            let sent = if specificity == 3 || index == 0 {
                content_type.as_str()
            } else {
                media_type.content_type()
            };
            let better = match best {
                None => true,
                Some((s, w, _)) => specificity > s || (specificity == s && range.weight > w),
            };
            if better {
                best = Some((specificity, range.weight, sent));
            }
        }
    }
    best.map(|(_, weight, content_type)| (content_type, weight))
}
