//! Service name matching.

use regex::Regex;
use std::fmt;

/// A regular expression matched against the full service name.
///
/// Patterns are anchored: `order\..*` matches `order.Create` but not
/// `legacy.order.Create`.
#[derive(Clone)]
pub struct ServicePattern {
    source: String,
    // None matches everything.
    regex: Option<Regex>,
}

impl ServicePattern {
    /// Compiles `pattern`, anchoring it at both ends.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        let regex = Regex::new(&format!("^(?:{pattern})$"))?;
        Ok(Self {
            source: pattern.to_string(),
            regex: Some(regex),
        })
    }

    /// A pattern matching every service.
    pub fn any() -> Self {
        Self {
            source: ".*".to_string(),
            regex: None,
        }
    }

    /// Returns true if `service` matches.
    pub fn matches(&self, service: &str) -> bool {
        self.regex.as_ref().map_or(true, |re| re.is_match(service))
    }

    /// The pattern as written by the user.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl Default for ServicePattern {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Debug for ServicePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServicePattern").field(&self.source).finish()
    }
}

impl PartialEq for ServicePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}
