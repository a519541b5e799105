use std::fmt;

use serde::Serialize;
use url::form_urlencoded;

/// Ordered query-string parameters with `URLSearchParams` semantics: `set`
/// keeps the position of the first occurrence, `delete` drops every
/// occurrence, serialization is `application/x-www-form-urlencoded`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(input: &str) -> Self {
        let raw = input.trim().trim_start_matches('?');
        let pairs = form_urlencoded::parse(raw.as_bytes())
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        Self { pairs }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        match self.pairs.iter().position(|(k, _)| k == key) {
            Some(idx) => {
                self.pairs[idx].1 = value;
                let mut seen = false;
                self.pairs.retain(|(k, _)| {
                    if k != key {
                        return true;
                    }
                    let keep = !seen;
                    seen = true;
                    keep
                });
            }
            None => self.pairs.push((key.to_string(), value)),
        }
    }

    pub fn append(&mut self, key: &str, value: impl Into<String>) {
        self.pairs.push((key.to_string(), value.into()));
    }

    pub fn delete(&mut self, key: &str) {
        self.pairs.retain(|(k, _)| k != key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for QueryParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.pairs.iter() {
            serializer.append_pair(k, v);
        }
        f.write_str(&serializer.finish())
    }
}

/// The navigable address of the dashboard: a path plus its query string.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: String,
    pub query: QueryParams,
}

impl Default for Location {
    fn default() -> Self {
        Self::root()
    }
}

impl Location {
    pub fn root() -> Self {
        Self {
            path: "/".to_string(),
            query: QueryParams::new(),
        }
    }

    pub fn with_query(query: QueryParams) -> Self {
        Self {
            path: "/".to_string(),
            query,
        }
    }

    /// Accepts `/?a=b`, `?a=b`, `a=b` or a full `http(s)://` link; only the
    /// path and query are kept.
    pub fn parse(input: &str) -> Self {
        let raw = input.trim();
        if let Ok(url) = url::Url::parse(raw) {
            if url.has_host() {
                return Self {
                    path: url.path().to_string(),
                    query: QueryParams::parse(url.query().unwrap_or_default()),
                };
            }
        }
        match raw.split_once('?') {
            Some((path, query)) => Self {
                path: if path.is_empty() {
                    "/".to_string()
                } else {
                    path.to_string()
                },
                query: QueryParams::parse(query),
            },
            None if raw.starts_with('/') || raw.is_empty() => Self {
                path: if raw.is_empty() {
                    "/".to_string()
                } else {
                    raw.to_string()
                },
                query: QueryParams::new(),
            },
            None => Self::with_query(QueryParams::parse(raw)),
        }
    }

    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)?;
        if self.has_query() {
            write!(f, "?{}", self.query)?;
        }
        Ok(())
    }
}

/// Navigation entries, newest last. Never empty.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct History {
    entries: Vec<Location>,
}

impl History {
    pub fn new(initial: Location) -> Self {
        Self {
            entries: vec![initial],
        }
    }

    pub fn current(&self) -> &Location {
        &self.entries[self.entries.len() - 1]
    }

    pub fn push(&mut self, location: Location) {
        self.entries.push(location);
    }

    pub fn replace(&mut self, location: Location) {
        let last = self.entries.len() - 1;
        self.entries[last] = location;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn entries(&self) -> &[Location] {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_set_replaces_in_place_and_delete_removes_all() {
        let mut q = QueryParams::parse("a=1&b=2&a=3");
        q.set("a", "9");
        assert_eq!(q.to_string(), "a=9&b=2");
        q.append("b", "4");
        q.delete("b");
        assert_eq!(q.to_string(), "a=9");
    }

    #[test]
    fn query_encodes_commas_and_spaces_like_url_search_params() {
        let mut q = QueryParams::new();
        q.set("department", "Human Resources,Sales");
        assert_eq!(q.to_string(), "department=Human+Resources%2CSales");
        let back = QueryParams::parse(&q.to_string());
        assert_eq!(back.get("department"), Some("Human Resources,Sales"));
    }

    #[test]
    fn location_parse_variants() {
        let loc = Location::parse("/?status=Active&page=2");
        assert_eq!(loc.path, "/");
        assert_eq!(loc.query.get("page"), Some("2"));

        let loc = Location::parse("status=Inactive");
        assert_eq!(loc.path, "/");
        assert_eq!(loc.query.get("status"), Some("Inactive"));

        let loc = Location::parse("https://dash.example.com/employees?skills=Rust");
        assert_eq!(loc.path, "/employees");
        assert_eq!(loc.query.get("skills"), Some("Rust"));

        let loc = Location::parse("");
        assert_eq!(loc, Location::root());
    }

    #[test]
    fn location_display_omits_empty_query() {
        assert_eq!(Location::root().to_string(), "/");
        let loc = Location::parse("/?legalEntity=Acme");
        assert_eq!(loc.to_string(), "/?legalEntity=Acme");
    }

    #[test]
    fn history_replace_keeps_length_push_grows() {
        let mut h = History::new(Location::root());
        h.replace(Location::parse("/?a=1"));
        assert_eq!(h.len(), 1);
        h.push(Location::root());
        assert_eq!(h.len(), 2);
        assert_eq!(h.current(), &Location::root());
        assert_eq!(h.entries()[0].query.get("a"), Some("1"));
    }
}
