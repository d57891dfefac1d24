//! Query cache keys

use std::fmt;

use serde::Serialize;

/// Hierarchical cache key, e.g. `["timesheet", "42"]`
///
/// Invalidation matches by prefix: invalidating `["teamTimesheets"]` hits
/// every `["teamTimesheets", <params>]` entry.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(root: impl Into<String>) -> Self {
        Self(vec![root.into()])
    }

    /// Append a segment
    pub fn with(mut self, segment: impl fmt::Display) -> Self {
        self.0.push(segment.to_string());
        self
    }

    /// Append a segment holding the JSON form of request parameters
    pub fn with_json<T: Serialize>(mut self, params: &T) -> Self {
        // Plain parameter structs always serialize; the fallback keeps the key distinct anyway
        let segment = serde_json::to_string(params).unwrap_or_else(|_| "<unserializable>".into());
        self.0.push(segment);
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn root(&self) -> &str {
        self.0.first().map(String::as_str).unwrap_or_default()
    }

    /// True when `prefix` matches the leading segments of this key
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Debug for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

impl From<&str> for QueryKey {
    fn from(root: &str) -> Self {
        Self::new(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_matching() {
        let key = QueryKey::new("timesheet").with(42);
        assert!(key.starts_with(&QueryKey::new("timesheet")));
        assert!(key.starts_with(&key));
        assert!(!key.starts_with(&QueryKey::new("timesheetHistory")));
        assert!(!QueryKey::new("timesheet").starts_with(&key));
        assert_eq!(key.to_string(), "timesheet/42");
        assert_eq!(key.root(), "timesheet");
    }

    #[test]
    fn test_json_segment_distinguishes_params() {
        #[derive(Serialize)]
        struct Params {
            page: u32,
        }
        let a = QueryKey::new("allEmployees").with_json(&Params { page: 0 });
        let b = QueryKey::new("allEmployees").with_json(&Params { page: 1 });
        assert_ne!(a, b);
        assert_eq!(a.segments()[1], r#"{"page":0}"#);
        assert!(b.starts_with(&"allEmployees".into()));
    }
}
